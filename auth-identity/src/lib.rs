//! Identity management for the Finbro backend
//!
//! This crate owns everything the authentication flows need to know about a
//! local user:
//! - The `UserIdentity` record and its creation payload
//! - The `CredentialStore` seam with in-memory and Postgres implementations
//! - Argon2id password hashing and verification
//! - Idempotent provisioning of federated identities
//! - An injectable `Clock` so time-bounded logic can be tested
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_identity::{DomainAllowlist, InMemoryCredentialStore, UserProvisioner};
//! use std::sync::Arc;
//!
//! # async fn run() -> auth_identity::Result<()> {
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let rule = Arc::new(DomainAllowlist::new(["acme.com"]));
//! let provisioner = UserProvisioner::new(store, rule);
//!
//! let user = provisioner.resolve("Jane@Example.com", "Jane Doe").await?;
//! assert_eq!(user.email, "jane@example.com");
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod postgres;
pub mod provisioning;
pub mod repository;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::IdentityConfig;
pub use error::*;
pub use models::*;
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use postgres::PgCredentialStore;
pub use provisioning::{ClassificationRule, DomainAllowlist, UserProvisioner};
pub use repository::{CredentialStore, InMemoryCredentialStore};
pub use validation::{is_valid_email, MAX_EMAIL_LENGTH};
