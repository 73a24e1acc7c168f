use gamemaster_shared::error::IdentityError;
use gamemaster_store::StoreError;
use thiserror::Error;

/// Errors from account, session and progress operations.
///
/// The display strings double as the on-screen notification text.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username must be at least {min} characters long!")]
    UsernameTooShort { min: usize },

    #[error("Username cannot contain spaces!")]
    UsernameHasWhitespace,

    #[error("Password cannot be empty!")]
    PasswordRequired,

    #[error("Username already taken!")]
    UsernameTaken,

    #[error("Email already registered!")]
    EmailTaken,

    #[error("Invalid username/email or password!")]
    InvalidCredentials,

    #[error("You need to be logged in to do that!")]
    NotLoggedIn,

    #[error("Can only link a federated account to username accounts!")]
    NotLocalAccount,

    #[error("This federated account is already linked to another user!")]
    FederatedAlreadyLinked,

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth state lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, AuthError>;
