use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Whether an account belongs to a person or a business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    Individual,
    Business,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Individual => "individual",
            Classification::Business => "business",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Classification::Individual),
            "business" => Ok(Classification::Business),
            other => Err(format!("unknown user type '{other}'")),
        }
    }
}

/// How the account was first established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    Password,
    Google,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Password => "password",
            IdentityProvider::Google => "google",
        }
    }
}

impl FromStr for IdentityProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(IdentityProvider::Password),
            "google" => Ok(IdentityProvider::Google),
            other => Err(format!("unknown identity provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayName {
    #[serde(rename = "first_name")]
    pub first: String,
    #[serde(rename = "last_name")]
    pub last: String,
}

impl DisplayName {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Split a provider-supplied full name.
    ///
    /// The first whitespace-delimited token becomes the first name and the
    /// remaining tokens, joined by single spaces, become the last name.
    pub fn from_full_name(full_name: &str) -> Self {
        let mut parts = full_name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let last = parts.collect::<Vec<_>>().join(" ");
        Self { first, last }
    }
}

/// A local user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    /// Absent for accounts created through federated login
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(flatten)]
    pub display_name: DisplayName,
    #[serde(rename = "user_type")]
    pub classification: Classification,
    pub provider: IdentityProvider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    pub fn is_federated(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Payload for creating a user in a `CredentialStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub display_name: DisplayName,
    pub classification: Classification,
    pub provider: IdentityProvider,
}

impl NewUser {
    /// Materialize the record a store will persist
    pub fn into_identity(self, now: DateTime<Utc>) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            email: normalize_email(&self.email),
            password_hash: self.password_hash,
            display_name: self.display_name,
            classification: self.classification,
            provider: self.provider,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form used for lookups and uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
