use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use abi::config::Config;
use abi::errors::Error;

use crate::{Cache, AUTH_CODE_EXPIRE};

#[derive(Debug)]
pub struct RedisCache {
    client: redis::Client,
}

fn auth_code_key(phone: &str) -> String {
    format!("auth_code:{phone}")
}

impl RedisCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(redis::Client::open(config.redis.url())?))
    }

    async fn conn(&self) -> Result<MultiplexedConnection, Error> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn save_auth_code(&self, phone: &str, code: &str) -> Result<(), Error> {
        // SETEX replaces an earlier code and restarts its clock
        let _: () = self
            .conn()
            .await?
            .set_ex(auth_code_key(phone), code, AUTH_CODE_EXPIRE)
            .await?;
        Ok(())
    }

    async fn get_auth_code(&self, phone: &str) -> Result<Option<String>, Error> {
        Ok(self.conn().await?.get(auth_code_key(phone)).await?)
    }

    async fn del_auth_code(&self, phone: &str) -> Result<(), Error> {
        let _: () = self.conn().await?.del(auth_code_key(phone)).await?;
        Ok(())
    }
}
