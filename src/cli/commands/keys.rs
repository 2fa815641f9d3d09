use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::database::Store;

#[derive(Subcommand)]
pub enum KeysCommands {
    #[command(about = "Add unredeemed registration keys")]
    Add {
        #[arg(required = true, help = "One or more keys")]
        keys: Vec<String>,
    },

    #[command(about = "List registration keys and who redeemed them")]
    List,
}

pub async fn handle(
    cmd: KeysCommands,
    store: Arc<dyn Store>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        KeysCommands::Add { keys } => {
            let mut added = Vec::new();
            let mut existing = Vec::new();
            for key in keys {
                let key = key.trim().to_string();
                if key.is_empty() {
                    anyhow::bail!("registration keys must not be blank");
                }
                if store.insert_registration_key(&key).await? {
                    added.push(key);
                } else {
                    existing.push(key);
                }
            }

            if output_format == OutputFormat::Text {
                for key in &existing {
                    eprintln!("skipped {}: already exists", key);
                }
            }
            output_success(
                output_format,
                &format!("Added {} registration key(s)", added.len()),
                Some(json!({ "added": added, "existing": existing })),
            )
        }
        KeysCommands::List => {
            let keys = store.list_registration_keys().await?;
            if keys.is_empty() {
                return output_empty_collection(output_format, "keys", "No registration keys");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "keys": keys }))?);
                }
                OutputFormat::Text => {
                    println!("{:<32} {:<10} {}", "KEY", "USER", "USED AT");
                    println!("{}", "-".repeat(64));
                    for key in &keys {
                        let user = key
                            .user_id
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        let used_at = key
                            .used_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!("{:<32} {:<10} {}", key.key, user, used_at);
                    }
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::RegistrationKeyRepository;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn add_skips_existing_keys() {
        let store = Arc::new(MemoryStore::new());
        store.insert_registration_key("REG-1").await.unwrap();

        handle(
            KeysCommands::Add {
                keys: vec!["REG-1".to_string(), "REG-2".to_string()],
            },
            store.clone(),
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let keys = store.list_registration_keys().await.unwrap();
        let names: Vec<_> = keys.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(names, vec!["REG-1", "REG-2"]);
    }

    #[tokio::test]
    async fn add_rejects_blank_keys() {
        let store = Arc::new(MemoryStore::new());
        let result = handle(
            KeysCommands::Add {
                keys: vec!["  ".to_string()],
            },
            store,
            OutputFormat::Json,
        )
        .await;
        assert!(result.is_err());
    }
}
