use std::sync::OnceLock;

use regex::Regex;

use super::CredentialError;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
    })
}

fn password_charset() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z\d@$!%*?&]{8,}$").expect("password pattern compiles")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Email,
    Password,
}

/// Email and password as typed into a sign-in or sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_valid_email(email: &str) -> bool {
        email_pattern().is_match(email)
    }

    /// At least 8 characters from the allowed set, with an uppercase letter,
    /// a lowercase letter and a digit.
    pub fn is_valid_password(password: &str) -> bool {
        password_charset().is_match(password)
            && password.chars().any(|c| c.is_ascii_lowercase())
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }

    /// Check one field, as a form does on every keystroke.
    pub fn check(&self, field: CredentialField) -> Result<(), CredentialError> {
        match field {
            CredentialField::Email if !Self::is_valid_email(&self.email) => {
                Err(CredentialError::InvalidEmail)
            }
            CredentialField::Password if !Self::is_valid_password(&self.password) => {
                Err(CredentialError::WeakPassword)
            }
            _ => Ok(()),
        }
    }

    /// Validate both fields and return them trimmed, ready to submit.
    pub fn validate(&self) -> Result<Credentials, CredentialError> {
        let trimmed = Credentials::new(self.email.trim(), self.password.trim());
        if trimmed.password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        trimmed.check(CredentialField::Email)?;
        trimmed.check(CredentialField::Password)?;
        Ok(trimmed)
    }
}
