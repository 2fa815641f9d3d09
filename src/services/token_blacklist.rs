use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::database::{DbResult, Store};

/// Revocation list for tokens that must stop working before they expire
#[derive(Clone)]
pub struct TokenBlacklistService {
    store: Arc<dyn Store>,
}

impl TokenBlacklistService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The entry lives until the token would have expired anyway
    pub async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        self.store.blacklist_token(token, expires_at).await
    }

    pub async fn is_revoked(&self, token: &str) -> DbResult<bool> {
        self.store.is_token_blacklisted(token, Utc::now()).await
    }

    pub async fn purge_expired(&self) -> DbResult<u64> {
        let removed = self.store.purge_expired_tokens(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "purged expired blacklist entries");
        } else {
            debug!("no expired blacklist entries");
        }
        Ok(removed)
    }

    /// Sweeps on a fixed interval for the life of the process. A failed
    /// sweep is logged and retried on the next tick.
    pub fn spawn_purge_task(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.purge_expired().await {
                    warn!(error = %e, "token blacklist purge failed");
                }
            }
        })
    }
}
