use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::{async_trait, http::StatusCode};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use abi::errors::Error;

use crate::AppState;

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER: &str = "Bearer";
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, days: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: sub.into(),
            exp: now + days * SECONDS_PER_DAY,
            iat: now,
        }
    }
}

/// HS256 token whose subject is the identity id
pub fn gen_token(user_id: &str, secret: &str, days: i64) -> Result<String, Error> {
    let claims = Claims::new(user_id, days);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Error::internal)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| Error::unauthorized(err, "invalid token"))
}

/// The authenticated caller: the `sub` of a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let unauthorized = |details: &str| {
            (
                StatusCode::UNAUTHORIZED,
                Error::unauthorized_with_details(details),
            )
        };

        let header = parts
            .headers
            .get(AUTHORIZATION_HEADER)
            .ok_or_else(|| unauthorized("missing authorization header"))?
            .to_str()
            .map_err(|_| unauthorized("malformed authorization header"))?;

        let token = match header.split_once(' ') {
            Some((scheme, token)) if scheme == BEARER && !token.trim().is_empty() => token.trim(),
            _ => return Err(unauthorized("expected a bearer token")),
        };

        let claims = verify_token(token, &app_state.jwt_secret).map_err(|err| {
            debug!("rejected token: {}", err);
            (StatusCode::UNAUTHORIZED, err)
        })?;
        Ok(Self(claims.sub))
    }
}
