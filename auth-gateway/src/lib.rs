//! Session issuance and the public authentication flows of the Finbro backend
//!
//! `AuthOrchestrator` composes the credential store, password hasher,
//! identity provider client and state registry into:
//! - password registration and login
//! - the federated (Google) login round trip
//! - session refresh and profile access for a `VerifiedSession`
//!
//! Session tokens come from a `SessionTokenService`; `JwtSessionService`
//! signs them with HS256.

pub mod error;
pub mod orchestrator;
pub mod tokens;

pub use error::*;
pub use orchestrator::{
    AuthComponents, AuthOrchestrator, AuthOutcome, CallbackParams, FederatedStart,
    OrchestratorConfig, RegisterInput,
};
pub use tokens::{
    IssuedToken, JwtSessionService, SessionClaims, SessionConfig, SessionTokenError,
    SessionTokenService, VerifiedSession, SESSION_AUDIENCE, SESSION_ISSUER,
};
