use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::user::{NewUser, User};

/// Process-local store keyed by email.
///
/// Used when no `DATABASE_URL` is configured and by the test suite.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<DashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        // The entry holds the shard lock, so check-and-insert is atomic.
        match self.users.entry(new_user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(new_user.email)),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    role: new_user.role,
                };
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }
}
