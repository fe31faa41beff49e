use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use abi::errors::Error;

use crate::{Cache, AUTH_CODE_EXPIRE};

/// Process-local cache for `--memory` runs and tests.
#[derive(Debug)]
pub struct MemoryCache {
    codes: DashMap<String, (String, Instant)>,
    ttl: Duration,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(AUTH_CODE_EXPIRE))
    }
}

impl MemoryCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            codes: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn save_auth_code(&self, phone: &str, code: &str) -> Result<(), Error> {
        self.codes
            .insert(phone.to_string(), (code.to_string(), Instant::now() + self.ttl));
        Ok(())
    }

    async fn get_auth_code(&self, phone: &str) -> Result<Option<String>, Error> {
        let expired = match self.codes.get(phone) {
            None => return Ok(None),
            Some(entry) => {
                let (code, deadline) = entry.value();
                if Instant::now() < *deadline {
                    return Ok(Some(code.clone()));
                }
                true
            }
        };
        if expired {
            debug!("auth code for {} expired", phone);
            self.codes.remove(phone);
        }
        Ok(None)
    }

    async fn del_auth_code(&self, phone: &str) -> Result<(), Error> {
        self.codes.remove(phone);
        Ok(())
    }
}
