//! The login and signup flows.
//!
//! Both mutations follow the same shape: validate input, talk to the
//! [`CredentialStore`] under a timeout, hash or verify the password on the
//! blocking pool, then sign a token for the resulting user.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::AuthError;
use crate::handlers::jwt::TokenIssuer;
use crate::handlers::password::PasswordHasher;
use crate::models::user::{AuthPayload, NewUser, Role, User};
use crate::store::{CredentialStore, StoreError};

/// Request body of the signup mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            store_timeout,
        }
    }

    pub fn from_config(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self::new(
            store,
            PasswordHasher::new(config.bcrypt_cost),
            TokenIssuer::new(&config.jwt),
            config.store_timeout,
        )
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, AuthError> {
        require("email", email)?;
        require("password", password)?;
        let email = normalize_email(email);
        let email = email.as_str();

        let user = self
            .bounded("credential lookup", self.store.find_by_email(email))
            .await?;

        let Some(user) = user else {
            tracing::warn!(%email, reason = "no such user", "Login rejected");
            return Err(AuthError::Authentication);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::warn!(%email, user_id = %user.id, reason = "invalid password", "Login rejected");
            return Err(AuthError::Authentication);
        }

        let token = self.sign(&user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthPayload { token, user })
    }

    pub async fn signup(&self, mut input: SignupInput) -> Result<AuthPayload, AuthError> {
        input.email = normalize_email(&input.email);
        require("username", &input.username)?;
        require("email", &input.email)?;
        require("password", &input.password)?;
        if !input.email.contains('@') {
            return Err(AuthError::Validation(format!(
                "email `{}` is not a valid address",
                input.email
            )));
        }
        let role = input
            .role
            .parse::<Role>()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let password_hash = self.hash_password(input.password).await?;

        let new_user = NewUser {
            username: input.username,
            email: input.email,
            password_hash,
            role,
        };
        let user = self
            .bounded("credential insert", self.store.create(new_user))
            .await?;

        // The record is already committed; a signing failure leaves the
        // account in place without a token.
        let token = self.sign(&user.id).inspect_err(|_| {
            tracing::error!(user_id = %user.id, "User created but token issuance failed");
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");
        Ok(AuthPayload { token, user })
    }

    /// Resolve a bearer token to its user. Every failure is reported as
    /// [`AuthError::Authentication`] except store outages and timeouts.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.issuer.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AuthError::Authentication
        })?;

        self.bounded("user lookup", self.store.find_by_id(&claims.user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.user_id, "Token refers to a missing user");
                AuthError::Authentication
            })
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                tracing::error!(operation = op, timeout = ?self.store_timeout, "Store call timed out");
                Err(AuthError::Timeout(op))
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::Internal(format!("hashing error: {e}")))
    }

    async fn verify_password(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))
    }

    fn sign(&self, user_id: &str) -> Result<String, AuthError> {
        // Local HMAC with no I/O, so no timeout applies.
        self.issuer
            .sign(user_id)
            .map_err(|e| AuthError::Internal(format!("token generation error: {e}")))
    }
}

/// Emails are stored and looked up trimmed and ASCII-lowercased, so every
/// store sees `A@X.com` and `a@x.com` as the same address.
fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::config::JwtConfig;
    use crate::store::InMemoryCredentialStore;

    fn service_with(store: Arc<dyn CredentialStore>) -> AuthService {
        AuthService::new(
            store,
            PasswordHasher::new(4),
            TokenIssuer::new(&JwtConfig {
                secret: "unit-test-secret".into(),
                expiry_hours: None,
            }),
            Duration::from_millis(200),
        )
    }

    fn signup_input(role: &str) -> SignupInput {
        SignupInput {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "pw123".into(),
            role: role.into(),
        }
    }

    /// Store whose every call hangs longer than the service timeout.
    struct StalledStore;

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn create(&self, _new_user: NewUser) -> Result<User, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(StoreError::Backend("unreachable".into()))
        }
    }

    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn create(&self, _new_user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn signup_then_login_yields_same_user() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));

        let signed_up = service.signup(signup_input("USER")).await.unwrap();
        assert_eq!(signed_up.user.role, Role::User);
        assert_ne!(signed_up.user.password_hash, "pw123");

        let logged_in = service.login("a@x.com", "pw123").await.unwrap();
        assert_eq!(logged_in.user.id, signed_up.user.id);

        let claims = service.issuer().verify(&logged_in.token).unwrap();
        assert_eq!(claims.user_id, signed_up.user.id);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_identical() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        service.signup(signup_input("USER")).await.unwrap();

        let wrong_pw = service.login("a@x.com", "wrong").await.unwrap_err();
        let unknown = service.login("nobody@x.com", "pw123").await.unwrap_err();

        assert!(matches!(wrong_pw, AuthError::Authentication));
        assert!(matches!(unknown, AuthError::Authentication));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn invalid_role_fails_before_any_write() {
        let store = InMemoryCredentialStore::new();
        let service = service_with(Arc::new(store.clone()));

        let err = service.signup(signup_input("SUPERUSER")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m.contains("SUPERUSER")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));

        let err = service.login("", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let mut input = signup_input("USER");
        input.password = "   ".into();
        let err = service.signup(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let mut input = signup_input("USER");
        input.email = "not-an-address".into();
        let err = service.signup(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        service.signup(signup_input("USER")).await.unwrap();

        let err = service.signup(signup_input("ADMIN")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn email_case_does_not_split_identity() {
        let store = InMemoryCredentialStore::new();
        let service = service_with(Arc::new(store.clone()));
        let first = service.signup(signup_input("USER")).await.unwrap();
        assert_eq!(first.user.email, "a@x.com");

        let mut shouted = signup_input("USER");
        shouted.email = " A@X.com ".into();
        let err = service.signup(shouted).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
        assert_eq!(store.len(), 1);

        let logged_in = service.login("A@x.COM", "pw123").await.unwrap();
        assert_eq!(logged_in.user.id, first.user.id);
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let service = service_with(Arc::new(StalledStore));

        let err = service.login("a@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::Timeout("credential lookup")));

        let err = service.signup(signup_input("USER")).await.unwrap_err();
        assert!(matches!(err, AuthError::Timeout("credential insert")));
    }

    #[tokio::test]
    async fn unreachable_store_is_unavailable() {
        let service = service_with(Arc::new(DownStore));
        let err = service.login("a@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }

    #[tokio::test]
    async fn authenticate_resolves_token_to_user() {
        let service = service_with(Arc::new(InMemoryCredentialStore::new()));
        let payload = service.signup(signup_input("ADMIN")).await.unwrap();

        let user = service.authenticate(&payload.token).await.unwrap();
        assert_eq!(user.id, payload.user.id);
        assert_eq!(user.role, Role::Admin);

        let err = service.authenticate("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Authentication));
    }
}
