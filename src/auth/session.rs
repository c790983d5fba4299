/// An authenticated backend user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}

/// The current sign-in state, driven by backend auth-state callbacks.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Recorded as the acting user when nobody is signed in or the user has no email.
    pub const UNKNOWN_ACTOR: &'static str = "unknown_user";

    /// Create a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// Apply an auth-state change from the backend.
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The identity written into history entries.
    pub fn actor(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.email.as_deref())
            .unwrap_or(Self::UNKNOWN_ACTOR)
    }
}
