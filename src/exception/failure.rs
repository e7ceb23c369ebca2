use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

/// Which direction of the payload conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Producing output from an internal value
    Generation,
    /// Reading the request body
    Deserialization,
}

type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// A failure caught while converting a payload to or from JSON.
///
/// The value is cheap to clone so it can travel inside response extensions
/// from the handler to the [`ExceptionLayer`](crate::exception::ExceptionLayer).
#[derive(Clone)]
pub struct ParsingFailure {
    kind: FailureKind,
    message: Option<String>,
    source: Option<SharedError>,
}

impl ParsingFailure {
    pub fn new(kind: FailureKind, message: Option<String>) -> Self {
        Self {
            kind,
            message,
            source: None,
        }
    }

    /// Wrap a serialization error. The error's `Display` becomes the message.
    pub fn generation<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_error(FailureKind::Generation, error)
    }

    /// Wrap a deserialization error. The error's `Display` becomes the message.
    pub fn deserialization<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::from_error(FailureKind::Deserialization, error)
    }

    fn from_error<E>(kind: FailureKind, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            kind,
            message: Some(error.to_string()),
            source: Some(Arc::new(error)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Raw diagnostic text. Never expose this to a client unsanitized.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Full diagnostic chain: the message followed by every nested cause.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut cause = self.source.as_deref().and_then(|e| e.source());
        while let Some(err) = cause {
            out.push_str(": ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

impl fmt::Debug for ParsingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsingFailure")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

impl fmt::Display for ParsingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => write!(f, "{} failure without a message", self.kind),
        }
    }
}

impl Error for ParsingFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

/// Handlers may return a `ParsingFailure` directly. Without an
/// [`ExceptionLayer`](crate::exception::ExceptionLayer) in the stack the
/// client sees an opaque 500; the layer replaces it with the filtered response.
impl IntoResponse for ParsingFailure {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}
