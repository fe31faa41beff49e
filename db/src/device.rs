use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::Device;

#[async_trait]
pub trait DeviceRepo: Send + Sync + Debug {
    /// insert or re-point by (platform, registration_id); the flag is true for a new row
    async fn upsert(&self, device: &Device) -> Result<(Device, bool)>;

    /// active devices of every listed identity
    async fn list_for_users(&self, user_ids: &[String]) -> Result<Vec<Device>>;
}
