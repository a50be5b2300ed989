use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_server::config::AppConfig;
use auth_server::services::auth_service::AuthService;
use auth_server::state::AppState;
use auth_server::store::{CredentialStore, InMemoryCredentialStore, MySqlCredentialStore};
use auth_server::{db, routes};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    tracing::info!(bind_addr = %config.bind_addr, jwt = ?config.jwt, "Loaded configuration");

    let store: Arc<dyn CredentialStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_db(url, config.store_timeout)
                .await
                .expect("Failed to connect to database");
            db::ensure_schema(&pool)
                .await
                .expect("Failed to prepare users table");
            tracing::info!("Using MySQL credential store");
            Arc::new(MySqlCredentialStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory only");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let state = AppState::new(AuthService::from_config(&config, store));
    let app = routes::app(state, config.client_url.as_deref());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, app).await.expect("Server error");
}
