use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod init;
pub mod serve;
pub mod signup;

use crate::core::{AppConfig, StorageConfig};

#[derive(Subcommand)]
enum Command {
    /// Create the storage directory and the credential table
    Init {},
    /// Run the API server and chat page
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Chat with the advisor in the terminal
    Chat {},
    /// Create an account
    Signup {
        #[arg(long)]
        identifier: String,
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

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            let config = StorageConfig::from_env()?;
            init::run(&config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            // A missing API key stops startup here before anything
            // binds
            let config = AppConfig::from_env()?;
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat {}) => {
            let config = AppConfig::from_env()?;
            chat::run(config).await?;
        }
        Some(Command::Signup { identifier }) => {
            let config = StorageConfig::from_env()?;
            signup::run(&identifier, &config).await?;
        }
        None => {}
    }

    Ok(())
}
