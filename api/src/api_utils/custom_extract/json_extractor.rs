use abi::errors::Error;
use abi::types::Validator;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
};

/// `axum::Json` with our error body on rejection
pub struct JsonExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonExtractor<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err((
                rejection.status(),
                Error::body_parsing(rejection.body_text()),
            )),
        }
    }
}

/// Same as [`JsonExtractor`] but runs the body's [`Validator`] before the
/// handler sees it.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: Validator,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonExtractor(value) = JsonExtractor::<T>::from_request(req, state).await?;
        value.validate().map_err(|err| (err.status_code(), err))?;
        Ok(Self(value))
    }
}
