use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

pub const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Google OAuth client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleProviderConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
    /// Per-request timeout of the HTTP client talking to Google
    pub http_timeout: Duration,
}

impl GoogleProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            scopes: GOOGLE_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// Access token returned by the provider's token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderToken(String);

impl ProviderToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self(access_token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderToken([redacted])")
    }
}

/// Profile asserted by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedProfile {
    pub email: String,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub email_verified: bool,
}

/// Body of Google's v3 userinfo endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleUserInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

impl From<GoogleUserInfo> for FederatedProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            email: info.email,
            display_name: info.name,
            picture_url: info.picture.filter(|p| !p.is_empty()),
            email_verified: info.email_verified,
        }
    }
}
