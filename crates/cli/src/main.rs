use std::process::ExitCode;

use newsdesk_core::config::{AppConfig, LoadOptions, LogFormat};

fn init_tracing(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn main() -> ExitCode {
    // Logging setup is best effort; an invalid config still reaches the
    // command layer, which reports it as a structured failure.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_tracing(&config);
    }

    newsdesk_cli::run()
}
