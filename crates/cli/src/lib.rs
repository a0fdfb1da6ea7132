pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "braseiro",
    about = "Braseiro operator CLI",
    long_about = "Inspect braseiro configuration, run readiness checks, and replay \
                  customer dialogues offline.",
    after_help = "Examples:\n  braseiro doctor --json\n  braseiro config\n  braseiro simulate oi 1 1 2 2 1 Maria pix"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config and probe the order webhook and store status endpoints")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Replay a customer dialogue offline, one message per argument",
        after_help = "The store is treated as open and no orders are submitted."
    )]
    Simulate {
        #[arg(required = true, help = "Customer messages, in order")]
        messages: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let output = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Simulate { messages } => commands::simulate::run(&messages),
    };

    println!("{output}");
    ExitCode::SUCCESS
}
