//! Per-hop logging middleware.
//!
//! Every request handed to the transport gets an `http_hop` span; outcomes
//! are logged with their status and elapsed time.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer adding hop logging to a transport.
///
/// # Example
///
/// ```ignore
/// use lightnet::{HttpManager, middleware::LoggingLayer};
///
/// let manager = HttpManager::builder()
///     .layer(LoggingLayer::debug())
///     .build()?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of [`LoggingLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Request headers and body sizes at debug level.
    Debug,
    /// One line per request and outcome.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Info-level logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level logging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Transport wrapper produced by [`LoggingLayer`].
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;
        let span = span!(Level::INFO, "http_hop", %method, %url);

        if level == LogLevel::Debug {
            let body_len = request.body().map_or(0, Bytes::len);
            span.in_scope(|| debug!(headers = ?request.headers(), body_len, "sending request"));
        } else {
            span.in_scope(|| info!("sending request"));
        }

        // Swap in the ready clone, leaving a fresh clone for the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_success() || response.is_redirect() => {
                        info!(status = response.status(), elapsed_ms, "response received");
                    }
                    Ok(response) => {
                        warn!(status = response.status(), elapsed_ms, "unexpected status");
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "transport failed");
                    }
                }
                if level == LogLevel::Debug
                    && let Ok(response) = &result
                {
                    debug!(headers = ?response.headers(), body_len = response.body().len(), "response detail");
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use tower::ServiceExt;

    use super::*;
    use crate::{HeaderMap, Method};

    #[test]
    fn logging_layer_levels() {
        assert_eq!(LoggingLayer::new().level(), LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level(), LogLevel::Debug);
    }

    #[tokio::test]
    async fn passes_outcomes_through() {
        let service = tower::service_fn(|request: Request<Bytes>| async move {
            if request.url().path() == "/fail" {
                Err(Error::connection("refused"))
            } else {
                Ok(Response::new(404, HeaderMap::new(), Bytes::new()))
            }
        });
        let logged = LoggingLayer::debug().layer(service);

        let url = url::Url::parse("http://h.com/ok").expect("url");
        let response = logged
            .clone()
            .oneshot(Request::builder(Method::Get, url).build())
            .await
            .expect("response");
        assert_eq!(response.status(), 404);

        let url = url::Url::parse("http://h.com/fail").expect("url");
        let result = logged.oneshot(Request::builder(Method::Get, url).build()).await;
        assert!(result.is_err_and(|e| e.is_connection()));
    }
}
