use async_trait::async_trait;

use abi::errors::Result;
use abi::model::Device;

use super::MemoryDb;
use crate::device::DeviceRepo;

#[async_trait]
impl DeviceRepo for MemoryDb {
    async fn upsert(&self, device: &Device) -> Result<(Device, bool)> {
        let mut tables = self.tables.lock().await;
        let existing = tables.devices.iter_mut().find(|d| {
            d.platform == device.platform && d.registration_id == device.registration_id
        });
        match existing {
            Some(found) => {
                found.user_id.clone_from(&device.user_id);
                if device.device_id.is_some() {
                    found.device_id.clone_from(&device.device_id);
                }
                if device.name.is_some() {
                    found.name.clone_from(&device.name);
                }
                found.active = true;
                Ok((found.clone(), false))
            }
            None => {
                tables.devices.push(device.clone());
                Ok((device.clone(), true))
            }
        }
    }

    async fn list_for_users(&self, user_ids: &[String]) -> Result<Vec<Device>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .devices
            .iter()
            .filter(|d| d.active && user_ids.contains(&d.user_id))
            .cloned()
            .collect())
    }
}
