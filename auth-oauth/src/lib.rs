//! Federated login support for the Finbro backend
//!
//! - `FederatedIdentityClient` with a Google implementation built on `oauth2`
//!   and `reqwest`
//! - `StateTokenRegistry`, the single-use CSRF tokens binding a login
//!   initiation to its callback
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_oauth::{
//!     FederatedIdentityClient, GoogleIdentityClient, GoogleProviderConfig, StateTokenRegistry,
//! };
//!
//! # fn run() -> auth_oauth::Result<()> {
//! let client = GoogleIdentityClient::new(GoogleProviderConfig::new(
//!     "client-id",
//!     "client-secret",
//!     "http://localhost:8081/api/v1/auth/google/callback",
//! ))?;
//! let states = StateTokenRegistry::default();
//!
//! let state = states.issue();
//! let url = client.authorization_url(&state);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod state;

pub use client::{FederatedIdentityClient, GoogleIdentityClient};
pub use error::*;
pub use models::*;
pub use state::{StateTokenRegistry, STATE_TOKEN_TTL_MINUTES};
