//! Auth - the signed-in user and client-side credential checks.
//!
//! Authentication itself belongs to the backend. This module only carries
//! who is acting (recorded on every history entry) and rejects credentials
//! that could never succeed before they are sent anywhere.

mod credentials;
mod error;
mod session;

pub use credentials::{CredentialField, Credentials};
pub use error::{AuthFailure, CredentialError};
pub use session::{Session, User};
