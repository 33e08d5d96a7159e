//! Authentication flows
//!
//! Password registration and login, the federated login round trip, session
//! refresh and the signed-in user's profile.

use crate::{error::*, tokens::*};
use auth_identity::{
    is_valid_email, normalize_email, Classification, ClassificationRule, CredentialStore,
    DisplayName, IdentityConfig, IdentityProvider, NewUser, PasswordHasher, UserIdentity,
    UserProvisioner,
};
use auth_oauth::{FederatedIdentityClient, OAuthError, StateTokenRegistry};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub password_min_length: usize,
    pub password_max_length: usize,
    /// Upper bound on each call to the identity provider
    pub upstream_timeout: Duration,
}

impl OrchestratorConfig {
    pub fn from_identity_config(config: &IdentityConfig, upstream_timeout: Duration) -> Self {
        Self {
            password_min_length: config.password_min_length,
            password_max_length: config.password_max_length,
            upstream_timeout,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_identity_config(&IdentityConfig::default(), Duration::from_secs(10))
    }
}

/// Collaborators the orchestrator composes
pub struct AuthComponents {
    pub store: Arc<dyn CredentialStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sessions: Arc<dyn SessionTokenService>,
    pub provider: Arc<dyn FederatedIdentityClient>,
    pub states: Arc<StateTokenRegistry>,
    pub classification: Arc<dyn ClassificationRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_type: Option<Classification>,
}

/// Query parameters the identity provider sends back to the callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub session: IssuedToken,
    pub user: UserIdentity,
}

#[derive(Debug, Clone, Serialize)]
pub struct FederatedStart {
    pub authorization_url: String,
    pub state: String,
}

pub struct AuthOrchestrator {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    sessions: Arc<dyn SessionTokenService>,
    provider: Arc<dyn FederatedIdentityClient>,
    states: Arc<StateTokenRegistry>,
    classification: Arc<dyn ClassificationRule>,
    provisioner: UserProvisioner,
    config: OrchestratorConfig,
}

impl AuthOrchestrator {
    pub fn new(components: AuthComponents, config: OrchestratorConfig) -> Self {
        let provisioner =
            UserProvisioner::new(components.store.clone(), components.classification.clone());

        Self {
            store: components.store,
            hasher: components.hasher,
            sessions: components.sessions,
            provider: components.provider,
            states: components.states,
            classification: components.classification,
            provisioner,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionTokenService> {
        &self.sessions
    }

    fn validate_registration(&self, input: &RegisterInput) -> Result<String> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("invalid email address".to_string()));
        }

        let length = input.password.chars().count();
        if length < self.config.password_min_length || length > self.config.password_max_length {
            return Err(AuthError::Validation(format!(
                "password must be between {} and {} characters",
                self.config.password_min_length, self.config.password_max_length
            )));
        }

        Ok(email)
    }

    /// Create a password account and sign it in
    #[instrument(skip_all)]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthOutcome> {
        let email = self.validate_registration(&input)?;
        let password_hash = self.hasher.hash(&input.password).await?;

        let classification = input
            .user_type
            .unwrap_or_else(|| self.classification.classify(&email));

        let user = self
            .store
            .create(NewUser {
                email,
                password_hash: Some(password_hash),
                display_name: DisplayName::new(input.first_name.trim(), input.last_name.trim()),
                classification,
                provider: IdentityProvider::Password,
            })
            .await?;

        let session = self.sessions.issue(user.id)?;
        info!(user_id = %user.id, "User registered");
        Ok(AuthOutcome { session, user })
    }

    /// Every way a password login can fail looks the same to the caller
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        let user = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, stored_hash).await {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.sessions.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthOutcome { session, user })
    }

    /// Re-issue a session for a still-existing user
    pub async fn refresh(&self, session: &VerifiedSession) -> Result<IssuedToken> {
        let user = self.current_user(session).await?;
        Ok(self.sessions.issue(user.id)?)
    }

    /// Begin a federated login
    pub fn initiate(&self) -> FederatedStart {
        let state = self.states.issue();
        FederatedStart {
            authorization_url: self.provider.authorization_url(&state),
            state,
        }
    }

    /// Complete a federated login.
    ///
    /// The state token is consumed before anything else, so a callback that
    /// fails later cannot be replayed.
    #[instrument(skip_all)]
    pub async fn callback(&self, params: CallbackParams) -> Result<AuthOutcome> {
        let state = params.state.as_deref().unwrap_or_default();
        if state.is_empty() || !self.states.consume(state) {
            warn!("Federated callback with unknown or expired state");
            return Err(AuthError::InvalidState);
        }

        if let Some(error) = params.error.filter(|e| !e.is_empty()) {
            return Err(AuthError::ProviderDenied(error));
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        let token = self.bounded(self.provider.exchange_code(&code)).await?;
        let profile = self.bounded(self.provider.fetch_profile(&token)).await?;
        if !profile.email_verified {
            return Err(AuthError::EmailUnverified);
        }

        let user = self
            .provisioner
            .resolve(&profile.email, &profile.display_name)
            .await?;

        let session = self.sessions.issue(user.id)?;
        info!(user_id = %user.id, "Federated login completed");
        Ok(AuthOutcome { session, user })
    }

    pub async fn current_user(&self, session: &VerifiedSession) -> Result<UserIdentity> {
        self.store
            .find_by_id(session.user_id())
            .await?
            .ok_or(AuthError::UnknownSubject)
    }

    pub async fn update_profile(
        &self,
        session: &VerifiedSession,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserIdentity> {
        let display_name = DisplayName::new(first_name.trim(), last_name.trim());
        let user = self
            .store
            .update_display_name(session.user_id(), display_name)
            .await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, OAuthError>>,
    {
        match tokio::time::timeout(self.config.upstream_timeout, call).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                warn!(timeout = ?self.config.upstream_timeout, "Identity provider call timed out");
                Err(AuthError::UpstreamUnavailable(
                    "identity provider timed out".to_string(),
                ))
            }
        }
    }
}
