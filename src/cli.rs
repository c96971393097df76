use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::archiver::config::StorageKind;
use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "slack-archive",
    version,
    about = "Incrementally archive Slack channel history into monthly text files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Archive every completed month not yet stored, newest first.
    Archive {
        /// Overrides the configured storage backend.
        #[arg(long, value_parser = clap::value_parser!(StorageKind))]
        storage: Option<StorageKind>,
        #[arg(long)]
        json: bool,
    },
    /// List the channels the token can see.
    Channels {
        #[arg(long)]
        json: bool,
    },
    /// Show resolved paths, configuration and local archive progress.
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn emit(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    if report.ok {
        Ok(())
    } else {
        Err(anyhow!("{} reported {} issue(s)", report.command, report.issues.len()))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Archive { storage, json } => {
            let report = commands::archive::run(&commands::archive::ArchiveOptions { storage })?;
            emit(&report, json)
        }
        Command::Channels { json } => emit(&commands::channels::run()?, json),
        Command::Status { json } => emit(&commands::status::run()?, json),
    }
}
