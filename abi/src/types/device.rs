use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::errors;
use crate::model::{Device, DeviceRegister, Platform};
use crate::types::Validator;

impl FromRow<'_, PgRow> for Device {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        let platform: String = row.try_get("platform")?;
        let platform = platform
            .parse::<Platform>()
            .map_err(|e| Error::ColumnDecode {
                index: "platform".to_string(),
                source: e.into(),
            })?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            platform,
            device_id: row.try_get("device_id")?,
            registration_id: row.try_get("registration_id")?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

impl Validator for DeviceRegister {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.registration_id.trim().is_empty() {
            return Err(errors::Error::bad_request("registration_id is empty"));
        }
        Ok(())
    }
}
