use crate::{clock::Clock, error::*, models::*, SystemClock};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence seam for user records.
///
/// Implementations must treat emails case-insensitively and reject a second
/// record for the same normalized email with `IdentityError::DuplicateEmail`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<UserIdentity>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>>;
    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: DisplayName,
    ) -> Result<UserIdentity>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserIdentity>,
    email_index: HashMap<String, Uuid>,
}

/// In-memory implementation for development/testing
pub struct InMemoryCredentialStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, user: NewUser) -> Result<UserIdentity> {
        let identity = user.into_identity(self.clock.now());

        let mut tables = self.tables.write();
        if tables.email_index.contains_key(&identity.email) {
            return Err(IdentityError::DuplicateEmail);
        }
        tables.email_index.insert(identity.email.clone(), identity.id);
        tables.users.insert(identity.id, identity.clone());

        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>> {
        let tables = self.tables.read();
        let user = tables
            .email_index
            .get(&normalize_email(email))
            .and_then(|id| tables.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserIdentity>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn update_display_name(
        &self,
        id: Uuid,
        display_name: DisplayName,
    ) -> Result<UserIdentity> {
        let mut tables = self.tables.write();
        let user = tables.users.get_mut(&id).ok_or(IdentityError::UserNotFound)?;
        user.display_name = display_name;
        user.updated_at = self.clock.now();
        Ok(user.clone())
    }
}
