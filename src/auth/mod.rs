pub mod password;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{HashError, PasswordHasher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, decimal
    pub sub: String,
    /// User name at issue time
    pub name: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, TokenError> {
        self.sub.parse().map_err(|_| TokenError::InvalidSubject(self.sub.clone()))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Identity resolved from a validated, unrevoked bearer token
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i32,
    pub user_name: String,
    /// Raw token, kept so logout can revoke it
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    #[error("Invalid token subject: {0}")]
    InvalidSubject(String),
}

/// Signs and verifies HS256 identity tokens with a fixed issuer and audience
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(security: &SecurityConfig) -> Result<Self, TokenError> {
        if security.jwt_secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let secret = security.jwt_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: security.jwt_issuer.clone(),
            audience: security.jwt_audience.clone(),
            lifetime: Duration::minutes(security.jwt_expiration_minutes),
        })
    }

    pub fn issue(&self, user_id: i32, user_name: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: user_name.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + self.lifetime).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Signature, issuer, audience and expiry are all checked with zero leeway
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "unit-test-secret-that-is-long-enough".to_string();
        config.security
    }

    #[test]
    fn issued_token_validates() {
        let issuer = TokenIssuer::new(&security()).unwrap();
        let token = issuer.issue(42, "alice").unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.iss, "talearc");
        assert_eq!(claims.aud, "talearc-api");
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = TokenIssuer::new(&security()).unwrap().issue(1, "a").unwrap();

        let mut other = security();
        other.jwt_secret = "a-completely-different-signing-secret".to_string();
        assert!(TokenIssuer::new(&other).unwrap().validate(&token).is_err());
    }

    #[test]
    fn rejects_wrong_audience_and_issuer() {
        let token = TokenIssuer::new(&security()).unwrap().issue(1, "a").unwrap();

        let mut wrong_aud = security();
        wrong_aud.jwt_audience = "someone-else".to_string();
        assert!(TokenIssuer::new(&wrong_aud).unwrap().validate(&token).is_err());

        let mut wrong_iss = security();
        wrong_iss.jwt_issuer = "someone-else".to_string();
        assert!(TokenIssuer::new(&wrong_iss).unwrap().validate(&token).is_err());
    }

    #[test]
    fn rejects_expired_token_without_skew() {
        let issuer = TokenIssuer::new(&security()).unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            name: "a".to_string(),
            iss: "talearc".to_string(),
            aud: "talearc-api".to_string(),
            exp: now - 1,
            iat: now - 3600,
        };
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(issuer.validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        let mut config = security();
        config.jwt_secret.clear();
        assert!(matches!(TokenIssuer::new(&config), Err(TokenError::MissingSecret)));
    }
}
