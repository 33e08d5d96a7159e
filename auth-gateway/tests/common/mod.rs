#![allow(dead_code)]

use async_trait::async_trait;
use auth_gateway::{
    AuthComponents, AuthOrchestrator, JwtSessionService, OrchestratorConfig, SessionConfig,
};
use auth_identity::{
    Argon2PasswordHasher, DomainAllowlist, InMemoryCredentialStore, ManualClock,
};
use auth_oauth::{
    FederatedIdentityClient, FederatedProfile, OAuthError, ProviderToken, StateTokenRegistry,
};
use chrono::Duration as ChronoDuration;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

#[derive(Clone)]
pub enum ProviderBehavior {
    Profile(FederatedProfile),
    ExchangeFails,
    Hangs,
}

/// Identity provider double that records what it was asked
pub struct FakeProvider {
    behavior: Mutex<ProviderBehavior>,
    pub exchanges: AtomicUsize,
    pub last_code: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn new(behavior: ProviderBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            exchanges: AtomicUsize::new(0),
            last_code: Mutex::new(None),
        }
    }

    pub fn set_behavior(&self, behavior: ProviderBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    fn behavior(&self) -> ProviderBehavior {
        self.behavior.lock().clone()
    }
}

#[async_trait]
impl FederatedIdentityClient for FakeProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/auth?state={state}&access_type=online")
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, OAuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock() = Some(code.to_string());

        match self.behavior() {
            ProviderBehavior::ExchangeFails => {
                Err(OAuthError::ExchangeFailed("invalid_grant".to_string()))
            }
            ProviderBehavior::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ProviderToken::new("late"))
            }
            ProviderBehavior::Profile(_) => Ok(ProviderToken::new(format!("token-for-{code}"))),
        }
    }

    async fn fetch_profile(&self, _token: &ProviderToken) -> Result<FederatedProfile, OAuthError> {
        match self.behavior() {
            ProviderBehavior::Profile(profile) => Ok(profile),
            _ => Err(OAuthError::ProfileFetchFailed("unreachable".to_string())),
        }
    }
}

pub fn profile(email: &str, name: &str, verified: bool) -> FederatedProfile {
    FederatedProfile {
        email: email.to_string(),
        display_name: name.to_string(),
        picture_url: None,
        email_verified: verified,
    }
}

pub struct Harness {
    pub orchestrator: AuthOrchestrator,
    pub store: Arc<InMemoryCredentialStore>,
    pub sessions: Arc<JwtSessionService>,
    pub states: Arc<StateTokenRegistry>,
    pub provider: Arc<FakeProvider>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(behavior: ProviderBehavior) -> Harness {
    harness_with_domains(behavior, &[])
}

pub fn harness_with_domains(behavior: ProviderBehavior, business_domains: &[&str]) -> Harness {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(InMemoryCredentialStore::with_clock(clock.clone()));
    let sessions = Arc::new(JwtSessionService::with_clock(
        SessionConfig::new(SECRET, ChronoDuration::hours(24)),
        clock.clone(),
    ));
    let states = Arc::new(StateTokenRegistry::new(ChronoDuration::minutes(5), clock.clone()));
    let provider = Arc::new(FakeProvider::new(behavior));

    let orchestrator = AuthOrchestrator::new(
        AuthComponents {
            store: store.clone(),
            hasher: Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).unwrap()),
            sessions: sessions.clone(),
            provider: provider.clone(),
            states: states.clone(),
            classification: Arc::new(DomainAllowlist::new(business_domains.iter().copied())),
        },
        OrchestratorConfig {
            upstream_timeout: Duration::from_millis(200),
            ..OrchestratorConfig::default()
        },
    );

    Harness {
        orchestrator,
        store,
        sessions,
        states,
        provider,
        clock,
    }
}
