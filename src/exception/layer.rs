use crate::exception::failure::ParsingFailure;
use crate::exception::{ArgumentsHost, ExceptionFilter};
use axum::{
    body::Body,
    http::{Request, request::Parts},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer that hands parsing failures raised by handlers to a filter
///
/// # Example
/// ```
/// use axum::{Router, routing::post};
/// use jsonfault::exception::{ExceptionLayer, JsonProcessingFilter};
/// use jsonfault::extract::JsonBody;
///
/// async fn create(JsonBody(order): JsonBody<serde_json::Value>) -> String {
///     order.to_string()
/// }
///
/// let app: Router = Router::new()
///     .route("/orders", post(create))
///     .layer(ExceptionLayer::new(JsonProcessingFilter::new()));
/// ```
pub struct ExceptionLayer<F> {
    filter: Arc<F>,
}

impl<F> Clone for ExceptionLayer<F> {
    fn clone(&self) -> Self {
        Self {
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<F: ExceptionFilter> ExceptionLayer<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    pub fn from_shared(filter: Arc<F>) -> Self {
        Self { filter }
    }
}

impl<S, F> Layer<S> for ExceptionLayer<F> {
    type Service = ExceptionMiddleware<S, F>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

pub struct ExceptionMiddleware<S, F> {
    inner: S,
    filter: Arc<F>,
}

impl<S: Clone, F> Clone for ExceptionMiddleware<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<S, F> Service<Request<Body>> for ExceptionMiddleware<S, F>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    F: ExceptionFilter,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = Arc::clone(&self.filter);
        let head = snapshot(&request);

        // The clone may not be ready; keep the one poll_ready was called on
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            match response.extensions_mut().remove::<ParsingFailure>() {
                Some(failure) => {
                    tracing::debug!(
                        method = %head.method,
                        uri = %head.uri,
                        kind = %failure.kind(),
                        "Intercepted parsing failure"
                    );
                    Ok(filter.catch(&failure, &ArgumentsHost::new(&head)))
                }
                None => Ok(response),
            }
        })
    }
}

/// Copy the request head; the body moves into the handler
fn snapshot(request: &Request<Body>) -> Parts {
    let (mut head, ()) = Request::new(()).into_parts();
    head.method = request.method().clone();
    head.uri = request.uri().clone();
    head.version = request.version();
    head.headers = request.headers().clone();
    head
}
