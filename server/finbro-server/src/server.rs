use crate::config::ServerConfig;
use anyhow::Context;
use auth_gateway::{
    AuthComponents, AuthOrchestrator, JwtSessionService, OrchestratorConfig, SessionConfig,
    SessionTokenService,
};
use auth_identity::{
    Argon2PasswordHasher, CredentialStore, DomainAllowlist, IdentityConfig,
    InMemoryCredentialStore, PgCredentialStore,
};
use auth_oauth::{GoogleIdentityClient, GoogleProviderConfig, StateTokenRegistry};
use error_common::{FinbroError, Result};
use std::sync::Arc;
use tracing::{info, warn};

const DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct FinbroServer {
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthOrchestrator>,
}

impl FinbroServer {
    /// Wire the production collaborators described by `config`
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let store: Arc<dyn CredentialStore> = match &config.database_url {
            Some(url) => {
                let store = PgCredentialStore::connect(url, DATABASE_MAX_CONNECTIONS)
                    .await
                    .map_err(|e| FinbroError::DatabaseError(e.to_string()))?;
                store
                    .migrate()
                    .await
                    .context("applying credential store migrations")?;
                info!("Using Postgres credential store");
                Arc::new(store)
            }
            None => {
                warn!("DATABASE_URL not set, users are kept in memory only");
                Arc::new(InMemoryCredentialStore::new())
            }
        };

        if config.google.client_id.is_empty() {
            warn!("GOOGLE_CLIENT_ID not set, federated login will fail at the provider");
        }

        let identity_config = IdentityConfig {
            business_domains: config.business_domains.clone(),
            ..IdentityConfig::default()
        };

        let hasher = Argon2PasswordHasher::new(&identity_config)
            .map_err(|e| FinbroError::ConfigError(e.to_string()))?;

        let provider = GoogleIdentityClient::new(GoogleProviderConfig::new(
            config.google.client_id.clone(),
            config.google.client_secret.clone(),
            config.google.redirect_url.clone(),
        ))
        .map_err(|e| FinbroError::ConfigError(e.to_string()))?;

        let sessions = JwtSessionService::new(SessionConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expiry,
        ));

        let components = AuthComponents {
            store,
            hasher: Arc::new(hasher),
            sessions: Arc::new(sessions),
            provider: Arc::new(provider),
            states: Arc::new(StateTokenRegistry::default()),
            classification: Arc::new(DomainAllowlist::new(&identity_config.business_domains)),
        };

        let orchestrator_config =
            OrchestratorConfig::from_identity_config(&identity_config, config.upstream_timeout);

        Ok(Self::from_parts(
            config,
            AuthOrchestrator::new(components, orchestrator_config),
        ))
    }

    /// Assemble a server around an already-built orchestrator
    pub fn from_parts(config: ServerConfig, auth: AuthOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionTokenService> {
        self.auth.sessions()
    }
}
