use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod init;
pub mod job;
pub mod migrate;
pub mod serve;
pub mod summary;
pub mod watch;

use crate::core::AppConfig;
use job::JobId;

#[derive(Subcommand)]
enum Command {
    /// Create the database and its schema
    Init {},
    /// Migrate the db schema
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Print the per-date tallies and recommendation of an event
    Summary {
        #[arg(long)]
        event_id: String,
        /// Print the summary as JSON
        #[arg(long, action, default_value = "false")]
        json: bool,
    },
    /// Poll an event and print its summary whenever it changes
    Watch {
        #[arg(long)]
        event_id: String,
        /// Read the local database instead of a running server
        #[arg(long, action, default_value = "false")]
        local: bool,
        /// Seconds between polls, defaults to the configured interval
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Run a periodic job
    Job {
        #[arg(long, value_enum)]
        id: JobId,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config.db_path).await?;
        }
        Some(Command::Migrate {}) => {
            migrate::run(&config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Summary { event_id, json }) => {
            summary::run(&event_id, json, &config.db_path).await?;
        }
        Some(Command::Watch {
            event_id,
            local,
            interval,
        }) => {
            watch::run(&event_id, local, interval, &config).await?;
        }
        Some(Command::Job { id }) => {
            job::run(id, &config).await?;
        }
        None => {}
    }

    Ok(())
}
