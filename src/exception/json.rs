use crate::config::FilterConfig;
use crate::error::RenderError;
use crate::exception::classify::{Classification, Classifier, DeveloperMisuse};
use crate::exception::failure::{FailureKind, ParsingFailure};
use crate::exception::logger::{FailureLogger, TracingLogger};
use crate::exception::render::{ErrorPageRenderer, UnbrandedErrorPage};
use crate::exception::sanitize::strip_location;
use crate::exception::{ArgumentsHost, ExceptionFilter};
use axum::{
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::Level;

const PAGE_CAPACITY: usize = 4096;

/// Whether an [`ErrorResponse`] carries a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// No body, no `Content-Type` header
    None,
    /// `text/html; charset=utf-8`
    Html,
}

/// The response produced for a caught [`ParsingFailure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub content_type: ContentType,
    pub body: Option<String>,
}

impl ErrorResponse {
    /// Opaque 500 with an empty body
    pub fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: ContentType::None,
            body: None,
        }
    }

    pub fn html(status: StatusCode, page: String) -> Self {
        Self {
            status,
            content_type: ContentType::Html,
            body: Some(page),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match (self.content_type, self.body) {
            (ContentType::Html, Some(page)) => (self.status, Html(page)).into_response(),
            _ => self.status.into_response(),
        }
    }
}

/// Translates JSON parsing failures into HTTP responses.
///
/// Failures caused by the service (generation errors, unconstructible target
/// types) become an empty 500 and are logged loudly. Everything else is the
/// caller's fault and becomes a 400 error page showing only the first line
/// of the parser message.
///
/// # Example
/// ```
/// use jsonfault::exception::{FailureKind, JsonProcessingFilter, ParsingFailure};
/// use axum::http::{Request, StatusCode};
///
/// let filter = JsonProcessingFilter::new();
/// let (parts, _) = Request::new(()).into_parts();
/// let failure = ParsingFailure::new(
///     FailureKind::Deserialization,
///     Some("Unexpected token\n at [Source: body; line: 3, column: 8]".into()),
/// );
///
/// let response = filter.handle(&failure, &parts);
/// assert_eq!(response.status, StatusCode::BAD_REQUEST);
/// assert!(!response.body.unwrap().contains("Source"));
/// ```
#[derive(Clone)]
pub struct JsonProcessingFilter {
    classifier: Classifier,
    renderer: Arc<dyn ErrorPageRenderer>,
    logger: Arc<dyn FailureLogger>,
    show_details: bool,
}

impl Default for JsonProcessingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonProcessingFilter {
    pub fn new() -> Self {
        Self {
            classifier: Classifier::default(),
            renderer: Arc::new(UnbrandedErrorPage),
            logger: Arc::new(TracingLogger),
            show_details: false,
        }
    }

    /// Build a filter from loaded configuration
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new()
            .with_misuse(config.misuse_matcher())
            .with_show_details(config.show_details)
    }

    pub fn with_misuse(mut self, misuse: impl DeveloperMisuse) -> Self {
        self.classifier = Classifier::new(misuse);
        self
    }

    pub fn with_renderer(mut self, renderer: impl ErrorPageRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_logger(mut self, logger: impl FailureLogger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_show_details(mut self, show_details: bool) -> Self {
        self.show_details = show_details;
        self
    }

    pub fn classify(&self, failure: &ParsingFailure) -> Classification {
        self.classifier.classify(failure)
    }

    /// Classify and respond in one step
    pub fn handle(&self, failure: &ParsingFailure, request: &Parts) -> ErrorResponse {
        self.respond(failure, self.classify(failure), request)
    }

    /// Build the response for an already classified failure.
    ///
    /// Never fails: a page that cannot be rendered degrades to an empty 500.
    pub fn respond(
        &self,
        failure: &ParsingFailure,
        classification: Classification,
        request: &Parts,
    ) -> ErrorResponse {
        match classification {
            Classification::ServerDefect => {
                match failure.kind() {
                    FailureKind::Generation => {
                        self.logger.log(Level::WARN, failure, "Error generating JSON")
                    }
                    FailureKind::Deserialization => self.logger.log(
                        Level::ERROR,
                        failure,
                        "Unable to deserialize the specific type",
                    ),
                }
                ErrorResponse::server_error()
            }
            Classification::ClientError => {
                self.logger.log(Level::DEBUG, failure, "Unable to process JSON");
                match self.render_page(failure, request) {
                    Ok(page) => ErrorResponse::html(StatusCode::BAD_REQUEST, page),
                    Err(e) => {
                        self.logger.log_render_failure(
                            Level::DEBUG,
                            &e,
                            "Unable to output error message",
                        );
                        ErrorResponse::server_error()
                    }
                }
            }
        }
    }

    fn render_page(&self, failure: &ParsingFailure, request: &Parts) -> Result<String, RenderError> {
        let message = strip_location(failure.message().unwrap_or_default());
        let mut page = Vec::with_capacity(PAGE_CAPACITY);
        self.renderer.render_error_page(
            request,
            &mut page,
            StatusCode::BAD_REQUEST,
            message,
            self.show_details,
        )?;
        Ok(String::from_utf8(page)?)
    }
}

impl ExceptionFilter for JsonProcessingFilter {
    fn catch(&self, failure: &ParsingFailure, host: &ArgumentsHost<'_>) -> Response {
        self.handle(failure, host.request()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::classify::NO_SUITABLE_CONSTRUCTOR;
    use crate::exception::logger::testing::{RecordingLogger, capture_events};
    use axum::http::{Request, header};
    use std::io::Write;

    fn parts() -> Parts {
        Request::builder()
            .uri("/orders")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn failure(kind: FailureKind, message: &str) -> ParsingFailure {
        ParsingFailure::new(kind, Some(message.to_string()))
    }

    fn filter_with(logger: &RecordingLogger) -> JsonProcessingFilter {
        JsonProcessingFilter::new().with_logger(logger.clone())
    }

    struct FailingRenderer;

    impl ErrorPageRenderer for FailingRenderer {
        fn render_error_page(
            &self,
            _: &Parts,
            writer: &mut dyn Write,
            _: StatusCode,
            _: &str,
            _: bool,
        ) -> Result<(), RenderError> {
            writer.write_all(b"<html>")?;
            Err(std::io::Error::other("broken pipe").into())
        }
    }

    #[test]
    fn test_generation_failure_is_opaque_500() {
        let logger = RecordingLogger::default();
        let filter = filter_with(&logger);
        for message in ["", "Bad token\n at [Source: x]", NO_SUITABLE_CONSTRUCTOR, "secret"] {
            let response = filter.handle(&failure(FailureKind::Generation, message), &parts());
            assert_eq!(response, ErrorResponse::server_error());
        }

        let entries = logger.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|(level, msg, _)| {
            *level == Level::WARN && msg == "Error generating JSON"
        }));
    }

    #[test]
    fn test_default_logger_levels_follow_fault() {
        let filter = JsonProcessingFilter::new();
        let cases = [
            (FailureKind::Generation, "Bad token", Level::WARN, "Error generating JSON"),
            (
                FailureKind::Deserialization,
                "No suitable constructor found for type X",
                Level::ERROR,
                "Unable to deserialize the specific type",
            ),
            (FailureKind::Deserialization, "Bad token", Level::DEBUG, "Unable to process JSON"),
        ];

        for (kind, message, level, summary) in cases {
            let events = capture_events(|| {
                filter.handle(&failure(kind, message), &parts());
            });
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].level, level);
            assert_eq!(events[0].field("message"), Some(summary));
            assert_eq!(events[0].field("error"), Some(message));
        }

        let filter = JsonProcessingFilter::new().with_renderer(FailingRenderer);
        let events = capture_events(|| {
            filter.handle(&failure(FailureKind::Deserialization, "Bad token"), &parts());
        });
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.level == Level::DEBUG));
        assert_eq!(events[1].field("message"), Some("Unable to output error message"));
    }

    #[test]
    fn test_missing_constructor_is_opaque_500() {
        let logger = RecordingLogger::default();
        let filter = filter_with(&logger);

        for message in [NO_SUITABLE_CONSTRUCTOR, "No suitable constructor found for type X"] {
            let response =
                filter.handle(&failure(FailureKind::Deserialization, message), &parts());
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.content_type, ContentType::None);
            assert!(response.body.is_none());
        }

        let entries = logger.entries();
        assert_eq!(entries[0].0, Level::ERROR);
        assert_eq!(entries[0].1, "Unable to deserialize the specific type");
        assert_eq!(entries[1].2, "No suitable constructor found for type X");
    }

    #[test]
    fn test_malformed_body_is_sanitized_400() {
        let logger = RecordingLogger::default();
        let filter = filter_with(&logger);
        let raw = "Unexpected character ('}' (code 125))\n at [Source: org.acme.Order@1f; line: 3, column: 8]";

        let response = filter.handle(&failure(FailureKind::Deserialization, raw), &parts());
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.content_type, ContentType::Html);

        let body = response.body.unwrap();
        assert!(body.contains("Unexpected character"));
        assert!(!body.contains("Source"));
        assert!(!body.contains("org.acme.Order"));
        assert!(!body.contains("column: 8"));

        // The full message stays in the logs only
        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Level::DEBUG);
        assert_eq!(entries[0].1, "Unable to process JSON");
        assert_eq!(entries[0].2, raw);
    }

    #[test]
    fn test_body_never_leaks_past_first_line() {
        let filter = JsonProcessingFilter::new().with_logger(RecordingLogger::default());
        let samples = [
            ("Bad token", "\n at [Source: foo; line: 1]"),
            ("  trailing  ", "\r\nline: 9, column: 1 internal.Type"),
            ("", "\nonly-detail-xyz"),
        ];
        for (head, tail) in samples {
            let raw = format!("{}{}", head, tail);
            let response = filter.handle(&failure(FailureKind::Deserialization, &raw), &parts());
            let body = response.body.unwrap();
            let after_break = tail.trim_start_matches(['\r', '\n']);
            assert!(!body.contains(after_break), "leaked {:?}", after_break);
        }
    }

    #[test]
    fn test_empty_message_renders_empty_400() {
        let filter = JsonProcessingFilter::new().with_logger(RecordingLogger::default());
        let response = filter.handle(&failure(FailureKind::Deserialization, ""), &parts());
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.unwrap().contains("<pre></pre>"));
    }

    #[test]
    fn test_absent_message_renders_empty_400() {
        let filter = JsonProcessingFilter::new().with_logger(RecordingLogger::default());
        let response =
            filter.handle(&ParsingFailure::new(FailureKind::Deserialization, None), &parts());
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.unwrap().contains("<pre></pre>"));
    }

    #[test]
    fn test_render_failure_falls_back_to_500() {
        let logger = RecordingLogger::default();
        let filter = filter_with(&logger).with_renderer(FailingRenderer);

        let response =
            filter.handle(&failure(FailureKind::Deserialization, "Bad token"), &parts());
        assert_eq!(response, ErrorResponse::server_error());

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].0, Level::DEBUG);
        assert_eq!(entries[1].1, "Unable to output error message");
        assert!(entries[1].2.contains("broken pipe"));
    }

    #[test]
    fn test_show_details_reaches_renderer() {
        let filter = JsonProcessingFilter::new()
            .with_logger(RecordingLogger::default())
            .with_show_details(true);
        let response = filter.handle(&failure(FailureKind::Deserialization, "Bad"), &parts());
        assert!(response.body.unwrap().contains("Problem accessing /orders."));
    }

    #[test]
    fn test_into_response_headers() {
        let response = ErrorResponse::server_error().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());

        let response = ErrorResponse::html(StatusCode::BAD_REQUEST, "<html></html>".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_concurrent_use() {
        let filter = Arc::new(JsonProcessingFilter::new().with_logger(RecordingLogger::default()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let filter = Arc::clone(&filter);
                std::thread::spawn(move || {
                    let kind = if i % 2 == 0 {
                        FailureKind::Generation
                    } else {
                        FailureKind::Deserialization
                    };
                    let response = filter.handle(&failure(kind, "Bad token"), &parts());
                    (kind, response.status)
                })
            })
            .collect();

        for handle in handles {
            let (kind, status) = handle.join().unwrap();
            match kind {
                FailureKind::Generation => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
                FailureKind::Deserialization => assert_eq!(status, StatusCode::BAD_REQUEST),
            }
        }
    }
}
