use abi::errors::Error;
use axum::{
    async_trait,
    extract::{path::ErrorKind, rejection::PathRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

/// `axum::extract::Path` with our error body on rejection
pub struct PathExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathExtractor<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(PathRejection::FailedToDeserializePathParams(inner)) => {
                let kind = inner.into_kind();
                match &kind {
                    // a handler asked for a type paths cannot carry
                    ErrorKind::UnsupportedType { .. } => Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Error::internal_with_details(kind.to_string()),
                    )),
                    ErrorKind::ParseErrorAtKey { key, .. }
                    | ErrorKind::InvalidUtf8InPathParam { key } => Err((
                        StatusCode::BAD_REQUEST,
                        Error::path_parsing(format!("{key}: {kind}")),
                    )),
                    _ => Err((StatusCode::BAD_REQUEST, Error::path_parsing(kind.to_string()))),
                }
            }
            Err(rejection) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Error::internal_with_details(format!("Unhandled path rejection: {rejection}")),
            )),
        }
    }
}
