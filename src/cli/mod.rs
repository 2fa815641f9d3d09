pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};

#[derive(Parser)]
#[command(name = "talearc")]
#[command(about = "TaleArc admin CLI - schema, registration keys and token housekeeping")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Database schema management")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },

    #[command(about = "Registration key management")]
    Keys {
        #[command(subcommand)]
        cmd: commands::keys::KeysCommands,
    },

    #[command(about = "Token blacklist housekeeping")]
    Tokens {
        #[command(subcommand)]
        cmd: commands::tokens::TokensCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = AppConfig::from_env()?;
    Ok(DatabaseManager::connect(&config.database).await?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let pool = connect().await?;

    match cli.command {
        Commands::Db { cmd } => commands::db::handle(cmd, &pool, output_format).await,
        Commands::Keys { cmd } => {
            commands::keys::handle(cmd, Arc::new(PgStore::new(pool)), output_format).await
        }
        Commands::Tokens { cmd } => {
            commands::tokens::handle(cmd, Arc::new(PgStore::new(pool)), output_format).await
        }
    }
}
