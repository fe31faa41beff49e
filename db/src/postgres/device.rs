use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row};

use abi::errors::Result;
use abi::model::Device;

use crate::device::DeviceRepo;

#[derive(Debug)]
pub struct PostgresDevice {
    pool: PgPool,
}

impl PostgresDevice {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepo for PostgresDevice {
    async fn upsert(&self, device: &Device) -> Result<(Device, bool)> {
        // xmax is zero only for a freshly inserted tuple
        let row = sqlx::query(
            "INSERT INTO devices
                (id, user_id, platform, device_id, registration_id, name, active, create_time)
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
             ON CONFLICT (platform, registration_id)
             DO UPDATE
                SET user_id = EXCLUDED.user_id,
                    device_id = COALESCE(EXCLUDED.device_id, devices.device_id),
                    name = COALESCE(EXCLUDED.name, devices.name),
                    active = TRUE
             RETURNING *, (xmax = 0) AS inserted",
        )
        .bind(&device.id)
        .bind(&device.user_id)
        .bind(device.platform.as_str())
        .bind(&device.device_id)
        .bind(&device.registration_id)
        .bind(&device.name)
        .bind(device.create_time)
        .fetch_one(&self.pool)
        .await?;
        let inserted: bool = row.try_get("inserted")?;
        Ok((Device::from_row(&row)?, inserted))
    }

    async fn list_for_users(&self, user_ids: &[String]) -> Result<Vec<Device>> {
        let devices = sqlx::query_as(
            "SELECT * FROM devices WHERE user_id = ANY($1) AND active ORDER BY create_time",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(devices)
    }
}
