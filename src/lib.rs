//! # jsonfault
//!
//! Turns JSON parsing and generation failures raised while handling a
//! request into safe HTTP responses for axum services.
//!
//! A failure is attributed either to the service or to the caller:
//!
//! - **Server defects**: the service failed to produce JSON, or a target
//!   type cannot be constructed. The client gets an empty 500; operators get
//!   a `warn`/`error` log with the full diagnostic chain.
//! - **Client errors**: the request body is malformed. The client gets a 400
//!   HTML page with the first line of the parser message only; the full
//!   message is logged at `debug`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::post};
//! use jsonfault::config::{ConfigService, FilterConfig};
//! use jsonfault::exception::{ExceptionLayer, JsonProcessingFilter};
//! use jsonfault::extract::{JsonBody, JsonResponse};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Order {
//!     id: u64,
//! }
//!
//! async fn create(JsonBody(order): JsonBody<Order>) -> JsonResponse<Order> {
//!     JsonResponse(order)
//! }
//!
//! # fn main() -> jsonfault::Result<()> {
//! let config = FilterConfig::load(&ConfigService::new())?;
//! let app: Router = Router::new()
//!     .route("/orders", post(create))
//!     .layer(ExceptionLayer::new(JsonProcessingFilter::from_config(&config)));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod exception;
pub mod extract;

pub use error::{JsonFaultError, RenderError, Result};
pub use exception::{
    Classification, ErrorResponse, ExceptionFilter, ExceptionLayer, FailureKind,
    JsonProcessingFilter, ParsingFailure,
};

/// Prelude module for convenient imports
///
/// ```
/// use jsonfault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, FilterConfig};
    pub use crate::error::{JsonFaultError, RenderError, Result};
    pub use crate::exception::{
        ArgumentsHost, Classification, Classifier, DeveloperMisuse, ErrorPageRenderer,
        ErrorResponse, ExceptionFilter, ExceptionLayer, FailureKind, FailureLogger,
        JsonProcessingFilter, ParsingFailure, PrefixMatcher, strip_location,
    };
    pub use crate::extract::{JsonBody, JsonResponse};
}
