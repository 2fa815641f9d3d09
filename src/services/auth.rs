use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{Caller, PasswordHasher, TokenIssuer};
use crate::database::models::UserSummary;
use crate::database::{DatabaseError, Store};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::registration_keys::RegistrationKeyService;
use crate::services::token_blacklist::TokenBlacklistService;
use crate::services::validate::{Validator, USER_NAME_MAX};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
    pub registration_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Registration, login and session lifecycle
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    fn keys(&self) -> RegistrationKeyService {
        RegistrationKeyService::new(self.store.clone())
    }

    fn blacklist(&self) -> TokenBlacklistService {
        TokenBlacklistService::new(self.store.clone())
    }

    /// Key check, name check, hash, insert, then redeem. The key is redeemed
    /// only once the user row exists, so a failed registration leaves it usable.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserSummary> {
        Validator::new()
            .required("name", &request.name, USER_NAME_MAX)
            .check("password", !request.password.is_empty(), "must not be empty")
            .finish()?;

        let keys = self.keys();
        if !keys.is_key_valid(&request.registration_key).await? {
            warn!(name = %request.name, "registration rejected: invalid key");
            return Err(ServiceError::InvalidRegistrationKey);
        }

        if self.store.find_user_by_name(&request.name).await?.is_some() {
            warn!(name = %request.name, "registration rejected: name taken");
            return Err(ServiceError::DuplicateName);
        }

        let digest = self.hasher.hash(&request.password).await?;
        let user = match self.store.insert_user(&request.name, &digest).await {
            Ok(user) => user,
            Err(DatabaseError::UniqueViolation(_)) => {
                warn!(name = %request.name, "registration rejected: name taken");
                return Err(ServiceError::DuplicateName);
            }
            Err(e) => return Err(e.into()),
        };

        if !keys.mark_used(&request.registration_key, user.id).await? {
            warn!(
                user_id = user.id,
                name = %user.name,
                "registration key was redeemed concurrently; account created without redeeming it"
            );
        }

        info!(user_id = user.id, name = %user.name, "user registered");
        Ok(UserSummary::from(&user))
    }

    /// Every failure is the same 401; there is no lockout
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let Some(user) = self.store.find_user_by_name(&request.name).await? else {
            self.hasher.verify_placeholder(&request.password).await?;
            warn!(name = %request.name, "login failed: unknown user");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password).await? {
            warn!(name = %request.name, "login failed: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.name)?;
        info!(user_id = user.id, "user logged in");
        Ok(LoginResponse {
            token,
            user: UserSummary::from(&user),
        })
    }

    /// Re-reads the user; a token for a vanished user is no longer valid
    pub async fn user_info(&self, caller: &Caller) -> ServiceResult<UserSummary> {
        match self.store.find_user_by_id(caller.user_id).await? {
            Some(user) => Ok(UserSummary::from(&user)),
            None => {
                warn!(user_id = caller.user_id, "token refers to a missing user");
                Err(ServiceError::Unauthorized("user no longer exists".to_string()))
            }
        }
    }

    /// Revokes the presented token until its natural expiry
    pub async fn logout(&self, caller: &Caller) -> ServiceResult<()> {
        self.blacklist().revoke(&caller.token, caller.expires_at).await?;
        info!(user_id = caller.user_id, "user logged out, token revoked");
        Ok(())
    }
}
