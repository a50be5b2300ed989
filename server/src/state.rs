use std::sync::Arc;

use crate::services::auth_service::AuthService;

/// Shared state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        AppState {
            auth: Arc::new(auth),
        }
    }
}
