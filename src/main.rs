use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use stylecast::auth::{self, Sessions};
use stylecast::config::StyleCastConfig;
use stylecast::models::{Role, User};
use stylecast::photos::PhotoClient;
use stylecast::store::Store;
use stylecast::weather::WeatherClient;
use stylecast::web::{self, AppState};

fn init_tracing(config: &StyleCastConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Create the admin account on first boot, when a password is configured.
async fn seed_admin(store: &Store, config: &StyleCastConfig) -> Result<()> {
    let Some(password) = &config.server.admin_password else {
        tracing::warn!("No admin password configured; admin routes stay unreachable");
        return Ok(());
    };

    if store.find_user("admin").await?.is_some() {
        return Ok(());
    }

    store
        .upsert_user(User {
            username: "admin".to_string(),
            password_hash: auth::hash_password(password)?,
            role: Role::Admin,
        })
        .await?;
    tracing::info!("Seeded admin account");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = StyleCastConfig::load()?;
    init_tracing(&config);

    let store = Store::open(&config.store.location)?;
    seed_admin(&store, &config).await?;

    let state = AppState {
        store,
        weather: Arc::new(WeatherClient::new(config.weather.clone())?),
        photos: Arc::new(PhotoClient::new(config.photos.clone())?),
        sessions: Sessions::default(),
        defaults: config.defaults.clone(),
    };

    web::run(state, config.server.port, &config.server.assets_dir).await
}
