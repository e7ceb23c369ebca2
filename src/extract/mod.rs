//! JSON extractor and responder that report failures as [`ParsingFailure`]s
//!
//! Unlike `axum::Json`, neither type answers the client on its own: failures
//! travel out of the handler and are turned into a response by an
//! [`ExceptionLayer`](crate::exception::ExceptionLayer).

use crate::exception::ParsingFailure;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Request body decoded from JSON
///
/// `serde_json` reports positions inline (`"expected `,` or `}` at line 3
/// column 3"`) rather than after a line break, so the page shown to the
/// client keeps them. They point into the client's own payload and carry no
/// server-side detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Error)]
pub enum JsonBodyRejection {
    /// The body was read but is not valid JSON for the target type
    #[error(transparent)]
    Parse(#[from] ParsingFailure),

    /// The body could not be read at all
    #[error(transparent)]
    Body(#[from] BytesRejection),
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        match self {
            JsonBodyRejection::Parse(failure) => failure.into_response(),
            JsonBodyRejection::Body(rejection) => rejection.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let value = serde_json::from_slice(&bytes).map_err(ParsingFailure::deserialization)?;
        Ok(JsonBody(value))
    }
}

/// Response body encoded as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponse<T>(pub T);

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                bytes,
            )
                .into_response(),
            Err(e) => ParsingFailure::generation(e).into_response(),
        }
    }
}
