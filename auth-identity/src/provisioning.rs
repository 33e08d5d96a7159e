//! Provisioning of federated identities
//!
//! A successful federated login must end with exactly one local user for the
//! verified email, no matter how many callbacks race for it.

use crate::{error::*, models::*, repository::CredentialStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Decides the classification of a user created from a federated profile
pub trait ClassificationRule: Send + Sync {
    fn classify(&self, email: &str) -> Classification;
}

/// Classifies users whose email domain is on the list as businesses
#[derive(Debug, Clone, Default)]
pub struct DomainAllowlist {
    domains: Vec<String>,
}

impl DomainAllowlist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().trim_start_matches('@').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }
}

impl ClassificationRule for DomainAllowlist {
    fn classify(&self, email: &str) -> Classification {
        let domain = email
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_lowercase())
            .unwrap_or_default();

        if self.domains.iter().any(|d| *d == domain) {
            Classification::Business
        } else {
            Classification::Individual
        }
    }
}

pub struct UserProvisioner {
    store: Arc<dyn CredentialStore>,
    rule: Arc<dyn ClassificationRule>,
}

impl UserProvisioner {
    pub fn new(store: Arc<dyn CredentialStore>, rule: Arc<dyn ClassificationRule>) -> Self {
        Self { store, rule }
    }

    /// Find or create the user for a verified federated email.
    ///
    /// An existing user is returned unchanged. A new one gets its display
    /// name from `full_name` and no password. If a concurrent call wins the
    /// insert, the winner's row is returned instead of an error.
    pub async fn resolve(&self, email: &str, full_name: &str) -> Result<UserIdentity> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(IdentityError::InvalidEmail);
        }

        if let Some(existing) = self.store.find_by_email(&email).await? {
            debug!(user_id = %existing.id, "Federated login matched existing user");
            return Ok(existing);
        }

        let new_user = NewUser {
            classification: self.rule.classify(&email),
            email: email.clone(),
            password_hash: None,
            display_name: DisplayName::from_full_name(full_name),
            provider: IdentityProvider::Google,
        };

        match self.store.create(new_user).await {
            Ok(user) => {
                info!(
                    user_id = %user.id,
                    classification = %user.classification,
                    "Provisioned federated user"
                );
                Ok(user)
            }
            Err(IdentityError::DuplicateEmail) => {
                debug!("Lost provisioning race, re-reading existing user");
                self.store
                    .find_by_email(&email)
                    .await?
                    .ok_or(IdentityError::UserNotFound)
            }
            Err(e) => Err(e),
        }
    }
}
