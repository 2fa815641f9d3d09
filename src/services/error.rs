use thiserror::Error;

use crate::auth::{HashError, TokenError};
use crate::database::DatabaseError;
use crate::error::FieldErrors;
use crate::services::chapter_content::ContentError;

/// Business-rule failures, mapped onto HTTP statuses by `ApiError`
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Direct lookup missed, or the row belongs to someone else
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A referenced parent is missing or not the caller's
    #[error("{0} not found or inaccessible")]
    InvalidParent(&'static str),

    #[error("invalid registration key")]
    InvalidRegistrationKey,

    #[error("user name already taken")]
    DuplicateName,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
