use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::errors;
use crate::model::{
    AccessTokenRequest, AuthCodeRequest, ContactsRequest, GeoPoint, SessionRequest, SocialAccount,
    SocialProvider, User, UserPhone, UserUpdate,
};
use crate::types::Validator;
use crate::utils::is_valid_phone;

const MAX_USERNAME_LEN: usize = 32;

impl FromRow<'_, PgRow> for User {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        let lat: Option<f64> = row.try_get("lat")?;
        let lng: Option<f64> = row.try_get("lng")?;
        let location = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            image_url: row.try_get("image_url")?,
            username: row.try_get("username")?,
            location,
            points: row.try_get("points")?,
            create_time: row.try_get("create_time")?,
            update_time: row.try_get("update_time")?,
        })
    }
}

impl FromRow<'_, PgRow> for UserPhone {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(UserPhone {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            phone: row.try_get("phone")?,
        })
    }
}

impl FromRow<'_, PgRow> for SocialAccount {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        let provider: i16 = row.try_get("provider")?;
        let provider = SocialProvider::try_from(provider).map_err(|_| Error::ColumnDecode {
            index: "provider".to_string(),
            source: format!("unknown social provider {}", provider).into(),
        })?;
        Ok(SocialAccount {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            provider,
            uid: row.try_get("uid")?,
            profile: row.try_get("profile")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

impl Validator for AuthCodeRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if !is_valid_phone(&self.phone) {
            return Err(errors::Error::bad_request("invalid phone number"));
        }
        Ok(())
    }
}

impl Validator for SessionRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if !is_valid_phone(&self.phone) {
            return Err(errors::Error::bad_request("invalid phone number"));
        }
        if self.code.is_empty() {
            return Err(errors::Error::bad_request("code is empty"));
        }
        Ok(())
    }
}

impl Validator for AccessTokenRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.access_token.trim().is_empty() {
            return Err(errors::Error::bad_request("access_token is empty"));
        }
        Ok(())
    }
}

impl Validator for ContactsRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if let Some(contact) = self.contacts.iter().find(|c| !is_valid_phone(&c.phone)) {
            return Err(errors::Error::bad_request(format!(
                "invalid phone number: {}",
                contact.phone
            )));
        }
        Ok(())
    }
}

impl Validator for UserUpdate {
    fn validate(&self) -> Result<(), errors::Error> {
        if let Some(username) = &self.username {
            let valid = !username.is_empty()
                && username.chars().count() <= MAX_USERNAME_LEN
                && username
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            if !valid {
                return Err(errors::Error::bad_request("invalid username"));
            }
        }
        Ok(())
    }
}
