use std::sync::Arc;

use tracing::info;

use abi::config::{Config, ServerConfig};
use abi::errors::Error;
use cache::Cache;
use db::DbRepo;
use notifier::Notifier;

use crate::api_utils::social::{FacebookClient, SocialGraph};
use crate::service::{Accounts, FriendGraph};

pub mod api_utils;
pub(crate) mod handlers;
pub(crate) mod routes;
pub mod service;
#[cfg(test)]
mod test_support;

pub use routes::app_routes;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DbRepo,
    pub cache: Arc<dyn Cache>,
    pub notifier: Notifier,
    pub friend_graph: FriendGraph,
    pub accounts: Accounts,
    pub jwt_secret: String,
}

impl AppState {
    /// postgres and redis as configured
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let db = DbRepo::new(config).await?;
        let cache = cache::cache(config)?;
        Self::with_stores(config, db, cache)
    }

    /// in-process repositories and cache; the push, sms and facebook
    /// collaborators are still the real ones
    pub fn memory(config: &Config) -> Result<Self, Error> {
        Self::with_stores(config, DbRepo::memory(), cache::memory())
    }

    fn with_stores(config: &Config, db: DbRepo, cache: Arc<dyn Cache>) -> Result<Self, Error> {
        let notifier = Notifier::from_config(config, db.clone())?;
        let social: Arc<dyn SocialGraph> = Arc::new(FacebookClient::new(&config.facebook));
        Ok(Self::from_parts(&config.server, db, cache, notifier, social))
    }

    pub fn from_parts(
        server: &ServerConfig,
        db: DbRepo,
        cache: Arc<dyn Cache>,
        notifier: Notifier,
        social: Arc<dyn SocialGraph>,
    ) -> Self {
        let friend_graph = FriendGraph::new(db.clone(), notifier.clone());
        let accounts = Accounts::new(
            db.clone(),
            cache.clone(),
            notifier.clone(),
            social,
            server.jwt_secret.clone(),
            server.token_days,
        );
        Self {
            db,
            cache,
            notifier,
            friend_graph,
            accounts,
            jwt_secret: server.jwt_secret.clone(),
        }
    }
}

/// Serves the api until the listener fails.
/// Marks every event past its expiry as expired; meant to run on a schedule.
pub async fn expire_events(config: &Config) -> Result<usize, Error> {
    let db = DbRepo::new(config).await?;
    let now = chrono::Utc::now().timestamp_millis();
    let expired = db.event.expire_events(now).await?;
    info!("expired {} events", expired.len());
    Ok(expired.len())
}

pub async fn start(config: Config, memory: bool) -> Result<(), Error> {
    let state = if memory {
        info!("using in-memory storage");
        AppState::memory(&config)?
    } else {
        AppState::new(&config).await?
    };
    let app = app_routes(state);
    let listener = tokio::net::TcpListener::bind(&config.server.server_url()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
