use thiserror::Error;

/// Client-side credential rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 8 characters, with uppercase, lowercase, and a number")]
    WeakPassword,
    #[error("Password is required")]
    EmptyPassword,
}

/// Failure kinds reported by the auth backend, with the message shown to
/// the user for each.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Incorrect password")]
    WrongPassword,
    #[error("No account found with this email")]
    UserNotFound,
    #[error("An account already exists with this email")]
    EmailAlreadyInUse,
    #[error("Password is too weak")]
    WeakPassword,
    #[error("Network error. Please check your connection")]
    Network,
    #[error("Too many requests. Please try again later")]
    TooManyRequests,
    #[error("Authentication failed: {0}")]
    Other(String),
}
