//! Credential verification and token issuance behind two mutations,
//! `login` and `signup`, served over axum.
//!
//! Exposes the building blocks so the binary and the integration tests
//! assemble the same application.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
