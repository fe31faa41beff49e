use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Apns,
    Gcm,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Apns => "apns",
            Platform::Gcm => "gcm",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apns" => Ok(Platform::Apns),
            "gcm" => Ok(Platform::Gcm),
            _ => Err(format!("Invalid platform: {}", s)),
        }
    }
}

/// a registered push endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    pub device_id: Option<String>,
    pub registration_id: String,
    pub name: Option<String>,
    pub active: bool,
    pub create_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRegister {
    pub registration_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Device {
    pub fn new(user_id: impl Into<String>, platform: Platform, register: DeviceRegister) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id: user_id.into(),
            platform,
            device_id: register.device_id,
            registration_id: register.registration_id,
            name: register.name,
            active: true,
            create_time: chrono::Utc::now().timestamp_millis(),
        }
    }
}
