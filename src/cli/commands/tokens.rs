use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::Store;
use crate::services::TokenBlacklistService;

#[derive(Subcommand)]
pub enum TokensCommands {
    #[command(about = "Delete blacklist entries whose tokens have expired")]
    Purge,
}

pub async fn handle(
    cmd: TokensCommands,
    store: Arc<dyn Store>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        TokensCommands::Purge => {
            let removed = TokenBlacklistService::new(store).purge_expired().await?;
            output_success(
                output_format,
                &format!("Purged {} expired token(s)", removed),
                Some(json!({ "removed": removed })),
            )
        }
    }
}
