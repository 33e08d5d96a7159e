//! Federated identity client
//!
//! Drives the authorization-code exchange with the identity provider and
//! fetches the signed-in user's profile.

use crate::{error::*, models::*};
use async_trait::async_trait;
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client as HttpClient;
use tracing::{debug, instrument, warn};

#[async_trait]
pub trait FederatedIdentityClient: Send + Sync {
    /// URL the browser is sent to. Embeds `state` verbatim; performs no I/O.
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken>;

    /// Fetch the profile for `token`. Unverified emails are rejected.
    async fn fetch_profile(&self, token: &ProviderToken) -> Result<FederatedProfile>;
}

pub struct GoogleIdentityClient {
    oauth_client: BasicClient,
    http_client: HttpClient,
    scopes: Vec<String>,
    userinfo_url: String,
}

impl GoogleIdentityClient {
    pub fn new(config: GoogleProviderConfig) -> Result<Self> {
        let auth_url = AuthUrl::new(config.auth_url)
            .map_err(|e| OAuthError::InvalidConfig(format!("authorization endpoint: {e}")))?;
        let token_url = TokenUrl::new(config.token_url)
            .map_err(|e| OAuthError::InvalidConfig(format!("token endpoint: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_url)
            .map_err(|e| OAuthError::InvalidConfig(format!("redirect URL: {e}")))?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            auth_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        let http_client = HttpClient::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| OAuthError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            oauth_client,
            http_client,
            scopes: config.scopes,
            userinfo_url: config.userinfo_url,
        })
    }
}

#[async_trait]
impl FederatedIdentityClient for GoogleIdentityClient {
    fn authorization_url(&self, state: &str) -> String {
        let state = state.to_string();
        let (url, _) = self
            .oauth_client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "online")
            .url();
        url.to_string()
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken> {
        let response = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                warn!(error = %e, "Token endpoint rejected authorization code");
                OAuthError::ExchangeFailed(e.to_string())
            })?;

        debug!("Authorization code exchanged");
        Ok(ProviderToken::new(response.access_token().secret().clone()))
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, token: &ProviderToken) -> Result<FederatedProfile> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Userinfo endpoint returned error");
            return Err(OAuthError::ProfileFetchFailed(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| OAuthError::ProfileFetchFailed(format!("invalid userinfo body: {e}")))?;

        let profile = FederatedProfile::from(info);
        if !profile.email_verified {
            return Err(OAuthError::EmailUnverified);
        }
        Ok(profile)
    }
}
