//! Persistence of user credentials.
//!
//! [`CredentialStore`] is the only seam between the auth flow and storage.
//! Email uniqueness is the store's job: `create` must behave as an atomic
//! insert-if-absent and report a duplicate as [`StoreError::Conflict`].

use async_trait::async_trait;

use crate::models::user::{NewUser, User};

pub mod memory;
pub mod mysql;

pub use memory::InMemoryCredentialStore;
pub use mysql::MySqlCredentialStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists.
    #[error("duplicate email: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
}
