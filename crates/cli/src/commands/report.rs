use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::Args;

use newsdesk_core::config::{AppConfig, LoadOptions};
use newsdesk_core::{DateWindow, ReportFilters};
use newsdesk_db::stores::{SqlAuthorDirectory, SqlEventStore, SqlTrafficStore};
use newsdesk_db::connect;
use newsdesk_report::ReportService;

use crate::commands::CommandResult;

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(long, value_name = "YYYY-MM-DD", help = "First day of the report window")]
    pub from: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Last day of the report window")]
    pub to: Option<String>,
    #[arg(long, help = "Window length in days when --from/--to are omitted")]
    pub days: Option<u32>,
    #[arg(long, help = "Scope the report to one editor's notes (email)")]
    pub person: Option<String>,
    #[arg(long, help = "Narrow event-derived aggregates to one section")]
    pub section: Option<String>,
    #[arg(long, help = "Narrow people-derived aggregates to one country")]
    pub country: Option<String>,
}

pub fn run(args: &ReportArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let service = ReportService::new(
            Arc::new(SqlEventStore::new(pool.clone())),
            Arc::new(SqlTrafficStore::new(pool.clone())),
            Arc::new(SqlAuthorDirectory::new(pool.clone())),
            Duration::from_secs(config.cache.ttl_secs),
            config.report.leaderboard_limit,
        );

        let window = resolve_window(args, &config, &service)
            .await
            .map_err(|(class, message)| (class, message, 2u8))?;
        let filters = ReportFilters {
            person: args.person.clone(),
            section: args.section.clone(),
            country: args.country.clone(),
        };

        let overview = service
            .overview(&window, &filters)
            .await
            .map_err(|error| ("report_execution", error.to_string(), 5u8))?;
        let rendered = serde_json::to_string_pretty(&overview)
            .map_err(|error| ("serialization", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(rendered)
    });

    match result {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("report", error_class, message, exit_code)
        }
    }
}

/// Explicit bounds win; otherwise the window ends at the newest traffic day
/// (today when the database is empty) and spans the configured length.
async fn resolve_window(
    args: &ReportArgs,
    config: &AppConfig,
    service: &ReportService,
) -> Result<DateWindow, (&'static str, String)> {
    if let (Some(from), Some(to)) = (args.from.as_deref(), args.to.as_deref()) {
        let start = parse_day("--from", from)?;
        let end = parse_day("--to", to)?;
        return DateWindow::new(start, end)
            .map_err(|error| ("invalid_window", error.to_string()));
    }
    if args.from.is_some() != args.to.is_some() {
        return Err((
            "invalid_window",
            "--from and --to must be provided together".to_string(),
        ));
    }

    let end = service
        .latest_data_date()
        .await
        .map_err(|error| ("report_execution", error.to_string()))?
        .unwrap_or_else(|| Utc::now().date_naive());
    let days = args.days.unwrap_or(config.report.default_window_days).max(1);
    let start = end.checked_sub_days(chrono::Days::new(u64::from(days) - 1)).unwrap_or(end);

    DateWindow::new(start, end).map_err(|error| ("invalid_window", error.to_string()))
}

fn parse_day(flag: &str, value: &str) -> Result<NaiveDate, (&'static str, String)> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ("invalid_window", format!("{flag} expects a YYYY-MM-DD date, got `{value}`"))
    })
}
