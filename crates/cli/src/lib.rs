pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "storepulse",
    about = "Storepulse operator CLI",
    long_about = "Run the daily insight batch, regenerate a user's insights, manage migrations and demo data, and inspect configuration.",
    after_help = "Examples:\n  storepulse migrate\n  storepulse daily\n  storepulse regenerate --user demo-user --date 2025-06-15"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo dataset ending on today's business date")]
    Seed,
    #[command(about = "Generate today's slot insights for every user, skipping users already done")]
    Daily,
    #[command(about = "Recompute and overwrite one user's insights for a calendar day")]
    Regenerate {
        #[arg(long, help = "User id to regenerate insights for")]
        user: String,
        #[arg(long, help = "Reference date (YYYY-MM-DD); defaults to today's business date")]
        date: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Daily => commands::daily::run(),
        Command::Regenerate { user, date } => commands::regenerate::run(&user, date.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
