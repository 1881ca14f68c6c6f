use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod events;
pub mod serve;

use crate::core::{AppConfig, init_logging};

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Fetch one month of events and print them as JSON
    Events {
        #[arg(long)]
        calendar_id: String,
        #[arg(long)]
        year: i32,
        /// Month of the year (1-12)
        #[arg(long, allow_negative_numbers = true)]
        month: i32,
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

    // Local development keeps credentials in a .env file
    dotenvy::dotenv().ok();
    init_logging();
    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Events {
            calendar_id,
            year,
            month,
        }) => {
            events::run(&calendar_id, year, month, config).await?;
        }
        None => {}
    }

    Ok(())
}
