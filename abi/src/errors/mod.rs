use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownError,
    DbError,
    ConfigReadError,
    ConfigParseError,
    NotFound,
    InternalServer,
    BodyParsing,
    PathParsing,
    UnAuthorized,
    Forbidden,
    Conflict,
    BadRequest,
    ParseError,
    RedisError,
    IOError,
    ReqwestError,
    Unavailable,
    CodeIsInvalid,
    TokenError,
}

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            details: None,
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn internal(error: impl StdError + 'static + Send + Sync) -> Self {
        Self {
            kind: ErrorKind::InternalServer,
            details: Some(error.to_string()),
            source: Some(Box::new(error)),
        }
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InternalServer, details)
    }

    #[inline]
    pub fn unauthorized(
        error: impl StdError + 'static + Send + Sync,
        details: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnAuthorized, details, error)
    }

    #[inline]
    pub fn unauthorized_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::UnAuthorized, details)
    }

    #[inline]
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Forbidden, details)
    }

    #[inline]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Conflict, details)
    }

    #[inline]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BadRequest, details)
    }

    /// a third-party api answered with a non-success status
    #[inline]
    pub fn unavailable(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Unavailable, details)
    }

    #[inline]
    pub fn code_invalid(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::CodeIsInvalid, details)
    }

    #[inline]
    pub fn not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound)
    }

    #[inline]
    pub fn not_found_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }

    #[inline]
    pub fn path_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::PathParsing, details)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::BodyParsing
            | ErrorKind::PathParsing
            | ErrorKind::BadRequest
            | ErrorKind::CodeIsInvalid => StatusCode::BAD_REQUEST,
            ErrorKind::UnAuthorized | ErrorKind::TokenError => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UnknownError
            | ErrorKind::DbError
            | ErrorKind::ConfigReadError
            | ErrorKind::ConfigParseError
            | ErrorKind::InternalServer
            | ErrorKind::ParseError
            | ErrorKind::RedisError
            | ErrorKind::IOError
            | ErrorKind::ReqwestError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!("http request api error: {:?}", self);
        }
        (status_code, Json(self)).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value.to_string(), value)
    }
}

impl From<redis::RedisError> for Error {
    fn from(value: redis::RedisError) -> Self {
        Self::new(ErrorKind::RedisError, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParseError, value.to_string(), value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::new(ErrorKind::ReqwestError, value.to_string(), value)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::new(ErrorKind::TokenError, value.to_string(), value)
    }
}

// unique violations become Conflict; missing rows and dangling references become NotFound
impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::RowNotFound => Self::new(ErrorKind::NotFound, value.to_string(), value),
            sqlx::Error::Database(db_err) => {
                let kind = match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => ErrorKind::Conflict,
                    Some(FOREIGN_KEY_VIOLATION) => ErrorKind::NotFound,
                    _ => ErrorKind::DbError,
                };
                let details = db_err.message().to_string();
                Self::new(kind, details, value)
            }
            _ => Self::new(ErrorKind::DbError, value.to_string(), value),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::ParseError, value.to_string(), value)
    }
}
