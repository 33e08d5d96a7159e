use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
