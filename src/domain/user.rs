//! User records and validated email addresses.

use super::{DomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidEmail`] when the value does not match
    /// `local@domain.tld`.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(normalized));
        if !is_valid {
            return Err(DomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier; `None` until persisted.
    #[serde(skip)]
    pub id: Option<UserId>,
    /// Unique email address.
    pub email: EmailAddress,
    /// Unique display handle, if chosen.
    pub username: Option<String>,
    /// Profile picture URL, if any.
    pub profile_picture: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Most recent sign-in, if the user ever signed in.
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an unsaved user registered now.
    #[must_use]
    pub fn new(email: EmailAddress, username: Option<String>, clock: &impl Clock) -> Self {
        Self {
            id: None,
            email,
            username,
            profile_picture: None,
            created_at: clock.utc(),
            last_login: None,
        }
    }

    /// Sets the profile picture URL.
    #[must_use]
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }
}

/// Partial update for a user; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement username.
    pub username: Option<String>,
    /// Replacement profile picture URL.
    pub profile_picture: Option<String>,
}

impl UserPatch {
    /// Sets the replacement email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the replacement username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the replacement profile picture URL.
    #[must_use]
    pub fn with_profile_picture(mut self, url: impl Into<String>) -> Self {
        self.profile_picture = Some(url.into());
        self
    }
}
