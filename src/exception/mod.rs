use axum::http::request::Parts;
use axum::response::Response;

pub mod classify;
pub mod failure;
pub mod json;
pub mod layer;
pub mod logger;
pub mod render;
pub mod sanitize;

pub use classify::{Classification, Classifier, DeveloperMisuse, PrefixMatcher};
pub use failure::{FailureKind, ParsingFailure};
pub use json::{ContentType, ErrorResponse, JsonProcessingFilter};
pub use layer::{ExceptionLayer, ExceptionMiddleware};
pub use logger::{FailureLogger, NoopLogger, TracingLogger};
pub use render::{ErrorPageRenderer, UnbrandedErrorPage};
pub use sanitize::strip_location;

/// Context for exception handling
///
/// Read-only view of the request that produced the failure. Filters may
/// hand it to collaborators but never classify on it.
pub struct ArgumentsHost<'a> {
    request: &'a Parts,
}

impl<'a> ArgumentsHost<'a> {
    pub fn new(request: &'a Parts) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &'a Parts {
        self.request
    }
}

/// The ExceptionFilter trait
///
/// Filters handle parsing failures raised during request processing.
/// They must return a valid Response and must not panic.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch a failure and return a response
    fn catch(&self, failure: &ParsingFailure, host: &ArgumentsHost<'_>) -> Response;
}
