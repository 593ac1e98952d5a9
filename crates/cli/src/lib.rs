pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::report::ReportArgs;

#[derive(Debug, Parser)]
#[command(
    name = "newsdesk",
    about = "Newsdesk operator CLI",
    long_about = "Operate Newsdesk migrations, demo seeding, config inspection, and report generation.",
    after_help = "Examples:\n  newsdesk migrate\n  newsdesk seed\n  newsdesk report --person carol@newsdesk.example\n  newsdesk report --from 2026-03-01 --to 2026-03-07"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo newsroom dataset and verify its contract")]
    Seed,
    #[command(about = "Print the full report overview as JSON for a window and optional filters")]
    Report(ReportArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Report(args) => commands::report::run(&args),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
