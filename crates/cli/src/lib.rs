pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "goodhuman",
    about = "Good-human bot operator CLI",
    long_about = "Prepare and inspect the good-human bot's dedup database and configuration.",
    after_help = "Examples:\n  goodhuman migrate\n  goodhuman doctor --json\n  goodhuman stats"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Create the dedup tables if they are missing")]
    Migrate,
    #[command(about = "Validate config, welcome messages, and database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Count recorded replies and thanks")]
    Stats,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Stats => commands::stats::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
