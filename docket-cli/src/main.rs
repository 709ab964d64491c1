#![allow(clippy::print_stdout)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{events::Events, keys::GenerateKey};
use docket::DataMapper;
use docket_cli::{
    calendar::Calendar,
    config::{DbType, resolve_database_url},
};
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::{
    fmt::{format, layer},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Subcommand, Debug)]
enum Subcommands {
    #[command(name = "genkey")]
    GenerateKey(GenerateKey),
    #[command(subcommand)]
    Events(Events),
}

#[derive(Parser, Debug)]
#[command(about = "Manage calendar events scoped to application keys")]
struct Args {
    /// The URL of the database. If left unset, will be pulled from the `DATABASE_URL` environment
    /// variable, a corresponding `.env` file, or the `docket_database_url` secret.
    #[arg(short, long, global = true, value_name = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log the statements sent to the database.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Subcommands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(if args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        })
        .with(layer().event_format(format().without_time().with_target(false).compact()))
        .init();

    match run(args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("Command execution failed: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> eyre::Result<()> {
    let Some(database_url) = resolve_database_url(args.database_url) else {
        return Err(eyre::eyre!(
            "Missing database URL, either set the `DATABASE_URL` environment variable, provide the `docket_database_url` secret, or specify it manually via --database-url [URL]"
        ));
    };

    if DbType::from_connection_string(&database_url).is_none() {
        return Err(eyre::eyre!(
            "Failed to determine database type from connection string, ensure it starts with either `mysql` or `sqlite`."
        ));
    }

    let calendar = Calendar::new(DataMapper::new(database_url));

    match args.command {
        Subcommands::GenerateKey(cmd) => cmd.run(&calendar).await,
        Subcommands::Events(cmd) => cmd.run(&calendar).await,
    }
}
