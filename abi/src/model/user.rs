use serde::{Deserialize, Serialize};

/// every identity starts with this score
pub const DEFAULT_POINTS: i32 = 100;

pub struct Points;

/// score awards; saving an event pays its saver and, when someone else
/// saves it, its creator
impl Points {
    pub const SAVED_EVENT: i32 = 1;
    pub const SENT_INVITATION: i32 = 5;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// An account. Identities created from a friend's contact list have a name
/// and a phone but no username until they sign up themselves.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub username: Option<String>,
    pub location: Option<GeoPoint>,
    pub points: i32,
    pub create_time: i64,
    pub update_time: i64,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            first_name: None,
            last_name: None,
            email: None,
            image_url: None,
            username: None,
            location: None,
            points: DEFAULT_POINTS,
            create_time: 0,
            update_time: 0,
        }
    }
}

impl User {
    pub fn new(name: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: nanoid::nanoid!(),
            name,
            create_time: now,
            update_time: now,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Someone",
        }
    }

    /// `Name (@username)`, or just the name when no username was chosen yet
    pub fn mention(&self) -> String {
        match self.username.as_deref() {
            Some(username) => format!("{} (@{})", self.display_name(), username),
            None => self.display_name().to_string(),
        }
    }

    /// contact-imported identities never picked a username
    pub fn is_shadow(&self) -> bool {
        self.username.is_none()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct UserPhone {
    pub id: String,
    pub user_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum SocialProvider {
    Facebook = 1,
}

impl TryFrom<i16> for SocialProvider {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SocialProvider::Facebook),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SocialAccount {
    pub id: String,
    pub user_id: String,
    pub provider: SocialProvider,
    pub uid: String,
    pub profile: serde_json::Value,
    pub create_time: i64,
}

/// profile as returned by the social-login provider
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SocialProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCodeRequest {
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: User,
    pub authtoken: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsRequest {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserWithPhone {
    pub user: User,
    pub phone: String,
}
