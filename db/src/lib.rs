use std::fmt::Debug;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use abi::config::Config;
use abi::errors::{Error, ErrorKind};

mod device;
mod event;
mod friend;
pub mod memory;
mod postgres;
mod user;

pub use device::DeviceRepo;
pub use event::EventRepo;
pub use friend::FriendRepo;
pub use user::UserRepo;

/// every repository the services need, behind trait objects
#[derive(Clone, Debug)]
pub struct DbRepo {
    pub user: Arc<dyn UserRepo>,
    pub friend: Arc<dyn FriendRepo>,
    pub device: Arc<dyn DeviceRepo>,
    pub event: Arc<dyn EventRepo>,
}

impl DbRepo {
    /// connect to postgres and bring the schema up to date
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db.max_connections)
            .connect(&config.db.url())
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::new(ErrorKind::DbError, e.to_string(), e))?;
        info!("database migrations applied");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self {
            user: Arc::new(postgres::PostgresUser::new(pool.clone())),
            friend: Arc::new(postgres::PostgresFriend::new(pool.clone())),
            device: Arc::new(postgres::PostgresDevice::new(pool.clone())),
            event: Arc::new(postgres::PostgresEvent::new(pool)),
        }
    }

    /// all four repositories share one in-process store
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryDb::default());
        Self {
            user: store.clone(),
            friend: store.clone(),
            device: store.clone(),
            event: store,
        }
    }
}
