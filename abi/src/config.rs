// server config, db config, redis config
// and the third-party collaborators: sms, push, facebook

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub redis: RedisConfig,
    pub product: ProductConfig,
    pub sms: SmsConfig,
    pub push: PushConfig,
    pub facebook: FacebookConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    #[serde(default = "default_token_days")]
    pub token_days: i64,
}

fn default_token_days() -> i64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_conn")]
    pub max_connections: u32,
}

fn default_conn() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    host: String,
    port: u16,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

/// Product wording used in sms bodies and push titles.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductConfig {
    pub name: String,
    pub app_link: String,
    /// shared invitation links are `{share_link_base}/{link_id}`
    pub share_link_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    #[serde(default = "default_twilio_api")]
    pub api_base: String,
    pub account: String,
    pub token: String,
    pub from: String,
}

fn default_twilio_api() -> String {
    String::from("https://api.twilio.com/2010-04-01")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushConfig {
    pub apns: ApnsConfig,
    pub gcm: GcmConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApnsConfig {
    pub endpoint: String,
    pub team_id: String,
    pub key_id: String,
    /// path of the .p8 signing key in PEM format
    pub key_path: String,
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GcmConfig {
    pub endpoint: String,
    pub server_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FacebookConfig {
    pub graph_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    25
}

impl Config {
    pub fn load(filename: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(filename)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

impl DbConfig {
    pub fn server_url(&self) -> String {
        if self.password.is_empty() {
            return format!("postgres://{}@{}:{}", self.user, self.host, self.port);
        }
        format!(
            "postgres://{}:{}@{}:{}",
            self.user, self.password, self.host, self.port
        )
    }
    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.database)
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self, https: bool) -> String {
        if https {
            format!("https://{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let config = Config::load("./fixtures/config.yml").unwrap();
        assert_eq!(config.db.host, "localhost");
        assert_eq!(config.db.port, 5432);
        assert_eq!(config.db.user, "postgres");
        assert_eq!(config.db.max_connections, 5);
        assert_eq!(config.product.name, "Rallytap");
        assert_eq!(config.product.app_link, "https://rallytap.com/app");
        assert_eq!(config.facebook.page_size, 25);
        assert_eq!(config.server.token_days, 30);
    }

    #[test]
    fn db_url_should_omit_empty_password() {
        let mut config = Config::load("./fixtures/config.yml").unwrap();
        config.db.password = String::new();
        assert_eq!(config.db.url(), "postgres://postgres@localhost:5432/rallytap");
    }

    #[test]
    fn missing_file_should_fail() {
        assert!(Config::load("./fixtures/nope.yml").is_err());
    }
}
