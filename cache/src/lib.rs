use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use abi::config::Config;
use abi::errors::Error;

mod memory;
mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;

/// login codes live for ten minutes
pub const AUTH_CODE_EXPIRE: u64 = 600;

#[async_trait]
pub trait Cache: Sync + Send + Debug {
    /// save the login code sent to a phone, replacing any earlier one
    async fn save_auth_code(&self, phone: &str, code: &str) -> Result<(), Error>;

    /// get the login code, none once it expired
    async fn get_auth_code(&self, phone: &str) -> Result<Option<String>, Error>;

    /// delete the login code after a successful login
    async fn del_auth_code(&self, phone: &str) -> Result<(), Error>;
}

pub fn cache(config: &Config) -> Result<Arc<dyn Cache>, Error> {
    Ok(Arc::new(RedisCache::from_config(config)?))
}

pub fn memory() -> Arc<dyn Cache> {
    Arc::new(MemoryCache::default())
}
