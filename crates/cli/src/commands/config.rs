use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use newsdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: &[(&str, String, Option<&str>)] = &[
        ("database.url", config.database.url.clone(), Some("NEWSDESK_DATABASE_URL")),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            Some("NEWSDESK_DATABASE_MAX_CONNECTIONS"),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            Some("NEWSDESK_DATABASE_TIMEOUT_SECS"),
        ),
        ("cache.ttl_secs", config.cache.ttl_secs.to_string(), Some("NEWSDESK_CACHE_TTL_SECS")),
        (
            "report.leaderboard_limit",
            config.report.leaderboard_limit.to_string(),
            Some("NEWSDESK_REPORT_LEADERBOARD_LIMIT"),
        ),
        (
            "report.default_window_days",
            config.report.default_window_days.to_string(),
            Some("NEWSDESK_REPORT_DEFAULT_WINDOW_DAYS"),
        ),
        ("logging.level", config.logging.level.clone(), Some("NEWSDESK_LOGGING_LEVEL")),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            Some("NEWSDESK_LOGGING_FORMAT"),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in fields {
        lines.push(render_line(
            key,
            value,
            field_source(key, *env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("newsdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/newsdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
