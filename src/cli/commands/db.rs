use clap::Subcommand;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create missing tables and indexes")]
    Init,

    #[command(about = "Check that the database answers")]
    Ping,
}

pub async fn handle(cmd: DbCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            DatabaseManager::init_schema(pool).await?;
            output_success(output_format, "Schema initialized", None)
        }
        DbCommands::Ping => {
            DatabaseManager::health_check(pool).await?;
            output_success(output_format, "Database reachable", None)
        }
    }
}
