use std::sync::Arc;

use tracing::{debug, info};

use crate::database::{DbResult, Store};

/// Single-use keys gating account creation
#[derive(Clone)]
pub struct RegistrationKeyService {
    store: Arc<dyn Store>,
}

impl RegistrationKeyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// True iff the key exists and nobody has redeemed it
    pub async fn is_key_valid(&self, key: &str) -> DbResult<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let found = self.store.find_registration_key(key).await?;
        Ok(found.is_some_and(|k| !k.is_redeemed()))
    }

    /// A key that vanished or was redeemed in the meantime is left alone;
    /// the return value says whether this call redeemed it
    pub async fn mark_used(&self, key: &str, user_id: i32) -> DbResult<bool> {
        let redeemed = self.store.redeem_registration_key(key, user_id).await?;
        if redeemed {
            info!(user_id, "registration key redeemed");
        } else {
            debug!(user_id, "registration key no longer redeemable, skipped");
        }
        Ok(redeemed)
    }
}
