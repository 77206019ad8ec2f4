//! Transport seam: anything that turns one [`Request`] into one
//! [`Response`].
//!
//! The manager only ever talks to a [`BoxedTransport`], so the default
//! hyper transport, a mock built with `tower::service_fn`, or a layered stack
//! are interchangeable.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::ServiceExt;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::connector::https_connector;
use crate::{Error, HeaderMap, Request, Response, Result};

/// Type-erased transport service.
pub type BoxedTransport = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by transports.
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// `Sync` handle over a [`BoxedTransport`].
///
/// Every call clones the boxed service under the lock and drives the clone,
/// so concurrent calls never hold the lock across an await.
#[derive(Clone)]
pub(crate) struct SharedTransport {
    inner: Arc<Mutex<BoxedTransport>>,
}

impl SharedTransport {
    pub(crate) fn new(service: BoxedTransport) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    pub(crate) fn call(&self, request: Request<Bytes>) -> TransportFuture {
        let service = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(service.oneshot(request))
    }
}

/// Default transport: hyper-util over rustls, HTTP/1.1, no connection reuse.
///
/// Each hop opens its own connection and drops it when the response body has
/// been read (or on any error path).
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport whose TCP connect is bounded by `connect_timeout`.
    #[must_use]
    pub fn new(connect_timeout: Duration) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(https_connector(connect_timeout));

        Self { inner }
    }

    fn build_hyper_request(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::connection(format!("invalid request: {e}")))
    }

    /// Collect response headers, keeping every value of repeated headers.
    fn extract_headers(headers: &http::HeaderMap) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                map.entry(name.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }
        map
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = Self::build_hyper_request(request)?;

        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(|e| Error::connection(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }
}

impl Service<Request<Bytes>> for HyperTransport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = TransportFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await })
    }
}
