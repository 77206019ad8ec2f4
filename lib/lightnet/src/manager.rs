//! Request execution engine.
//!
//! [`HttpManager`] turns a [`RequestDescriptor`] into one terminal outcome.
//! Every hop prepares a wire request (scheme check, explicit headers,
//! replayed tracked headers, `User-Agent`, verb setup), hands it to the
//! transport under the configured timeout, then either succeeds on 2xx,
//! follows a 301/302/303 with the same verb, body and headers, or fails.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::looper::Looper;
use crate::middleware::LoggingLayer;
use crate::transport::{BoxedTransport, HyperTransport, SharedTransport};
use crate::{
    APPLICATION_JSON, Call, Error, HeaderTracker, KeyValueStore, MemoryStore, Method,
    RequestDescriptor, Request, Response, Result, is_non_empty_object, to_json,
};

/// Name of the main looper created when none is supplied.
pub const MAIN_LOOPER: &str = "main";

const SCHEME_ERROR: &str = "Url must begin with http:// or https://";

/// Executes resolved requests.
///
/// Cheap to clone: clones share the transport, the header tracker, the main
/// looper and the spawned-task counter.
#[derive(Clone)]
pub struct HttpManager {
    inner: Arc<Inner>,
}

struct Inner {
    transport: SharedTransport,
    tracker: Arc<HeaderTracker>,
    config: ClientConfig,
    runtime: Handle,
    main_looper: Looper,
    spawned: AtomicUsize,
}

impl fmt::Debug for HttpManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpManager")
            .field("config", &self.inner.config)
            .field("main_looper", &self.inner.main_looper)
            .field("spawned_tasks", &self.spawned_tasks())
            .finish_non_exhaustive()
    }
}

impl HttpManager {
    /// Create a manager with the default transport and an in-memory store,
    /// on the current tokio runtime.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new manager builder.
    #[must_use]
    pub fn builder() -> HttpManagerBuilder {
        HttpManagerBuilder::default()
    }

    /// Manager configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Shared tracked header store.
    #[must_use]
    pub fn tracker(&self) -> &Arc<HeaderTracker> {
        &self.inner.tracker
    }

    /// Looper receiving callbacks whose origin is gone.
    #[must_use]
    pub fn main_looper(&self) -> &Looper {
        &self.inner.main_looper
    }

    /// Number of tasks spawned by calls so far.
    #[must_use]
    pub fn spawned_tasks(&self) -> usize {
        self.inner.spawned.load(Ordering::SeqCst)
    }

    /// Bind a descriptor to this manager.
    pub fn call(&self, descriptor: RequestDescriptor) -> Call {
        Call::new(self.clone(), descriptor)
    }

    /// GET `url`.
    pub fn get(&self, url: impl Into<String>) -> Call {
        self.call(RequestDescriptor::get(url).build())
    }

    /// POST `url` with an optional JSON body.
    pub fn post(&self, url: impl Into<String>, body: Option<Value>) -> Call {
        self.call(RequestDescriptor::post(url, body).build())
    }

    pub(crate) fn spawn_task<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.spawned.fetch_add(1, Ordering::SeqCst);
        self.inner.runtime.spawn(future)
    }

    /// Run the full redirect chain of one call.
    pub(crate) async fn perform(&self, descriptor: &RequestDescriptor) -> Result<Response<String>> {
        let max = self.inner.config.max_redirects;
        let mut url = descriptor.url().to_string();
        let mut redirects = 0;

        loop {
            let request = self.prepare(descriptor, &url)?;
            let current = request.url().clone();
            let response = self.send_hop(request).await?;

            match response.status() {
                200..=299 => {
                    self.inner
                        .tracker
                        .capture(response.headers(), descriptor.tracking());
                    return Ok(response.into_text_lines());
                }
                301..=303 => {
                    if redirects >= max {
                        return Err(Error::TooManyRedirects {
                            count: redirects + 1,
                            max,
                        });
                    }
                    let location = response.header("location").ok_or_else(|| {
                        Error::InvalidRedirect(format!(
                            "status {} without Location header",
                            response.status()
                        ))
                    })?;
                    let next = resolve_redirect_url(&current, location)?;
                    redirects += 1;
                    debug!(from = %current, to = %next, redirects, "following redirect");
                    url = next.into();
                }
                status => {
                    debug!(url = %current, status, "unexpected response status");
                    return Err(Error::http(status, format!("Invalid response code: {status}")));
                }
            }
        }
    }

    /// Build the wire request of one hop.
    fn prepare(&self, descriptor: &RequestDescriptor, url: &str) -> Result<Request<Bytes>> {
        if !has_http_scheme(url) {
            return Err(Error::configuration(SCHEME_ERROR));
        }
        let url = Url::parse(url)?;

        let method = descriptor.method();
        let body = match (method, descriptor.body()) {
            (Method::Post, Some(body)) if is_non_empty_object(body) => Some(to_json(body)?),
            _ => None,
        };

        let mut request = Request::from_parts(method, url, descriptor.headers().clone(), body);
        self.inner.tracker.apply(&mut request, descriptor.tracking());
        if let Some(user_agent) = self.inner.config.normalized_user_agent() {
            request.set_header(http::header::USER_AGENT.as_str(), user_agent);
        }
        match method {
            Method::Get => request.set_header(http::header::ACCEPT.as_str(), APPLICATION_JSON),
            Method::Post if request.body().is_some() => {
                request.set_header(http::header::CONTENT_TYPE.as_str(), APPLICATION_JSON);
            }
            Method::Post => {}
        }

        Ok(request)
    }

    async fn send_hop(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        tokio::time::timeout(self.inner.config.timeout, self.inner.transport.call(request))
            .await
            .map_err(|_| Error::Timeout)?
    }
}

/// `true` when the lowercase URL mentions `http://` or `https://`.
fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("http://") || lower.contains("https://")
}

/// Resolve a `Location` value against the URL of the hop that returned it.
fn resolve_redirect_url(base: &Url, location: &str) -> Result<Url> {
    base.join(location)
        .map_err(|e| Error::InvalidRedirect(format!("bad Location '{location}': {e}")))
}

type LayerFn = Arc<dyn Fn(BoxedTransport) -> BoxedTransport + Send + Sync>;

/// Builder for [`HttpManager`].
///
/// # Example
///
/// ```ignore
/// use lightnet::{HttpManager, JsonFileStore};
/// use std::{sync::Arc, time::Duration};
///
/// let manager = HttpManager::builder()
///     .timeout(Duration::from_secs(5))
///     .store(Arc::new(JsonFileStore::new("headers.json")))
///     .with_logging()
///     .build()?;
/// ```
#[derive(Default)]
pub struct HttpManagerBuilder {
    config: ClientConfigBuilder,
    transport: Option<BoxedTransport>,
    layers: Vec<LayerFn>,
    store: Option<Arc<dyn KeyValueStore>>,
    runtime: Option<Handle>,
    main_looper: Option<Looper>,
}

impl fmt::Debug for HttpManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpManagerBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("layers_count", &self.layers.len())
            .field("store", &self.store)
            .field("main_looper", &self.main_looper)
            .finish_non_exhaustive()
    }
}

impl HttpManagerBuilder {
    /// Set the per-hop timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the redirect hop limit.
    #[must_use]
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config = self.config.max_redirects(max);
        self
    }

    /// Set the `User-Agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        let mut builder = ClientConfig::builder()
            .timeout(config.timeout)
            .max_redirects(config.max_redirects);
        builder = match config.user_agent {
            Some(user_agent) => builder.user_agent(user_agent),
            None => builder.without_user_agent(),
        };
        self.config = builder;
        self
    }

    /// Use a custom transport instead of [`HyperTransport`].
    #[must_use]
    pub fn transport<S>(mut self, transport: S) -> Self
    where
        S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        self.transport = Some(BoxCloneService::new(transport));
        self
    }

    /// Wrap the transport in a Tower layer.
    ///
    /// Layers are applied in order: first added = innermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedTransport> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send + 'static,
    {
        self.layers
            .push(Arc::new(move |service| BoxCloneService::new(layer.layer(service))));
        self
    }

    /// Log every hop at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log every hop at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Persist tracked headers through `store` (in memory by default).
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Spawn calls on `runtime` instead of the current one.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Use `looper` as the fallback for callbacks whose origin is gone.
    ///
    /// Without one, the manager creates a looper named [`MAIN_LOOPER`] and
    /// drives it on its runtime.
    #[must_use]
    pub fn main_looper(mut self, looper: Looper) -> Self {
        self.main_looper = Some(looper);
        self
    }

    /// Build the manager.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no runtime was given and none is
    /// current.
    pub fn build(self) -> Result<HttpManager> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .map_err(|e| Error::configuration(format!("no tokio runtime available: {e}")))?,
        };
        let config = self.config.build();

        let mut transport = self
            .transport
            .unwrap_or_else(|| BoxCloneService::new(HyperTransport::new(config.timeout)));
        for layer_fn in self.layers {
            transport = layer_fn(transport);
        }

        let main_looper = self.main_looper.unwrap_or_else(|| {
            let (looper, runner) = Looper::new(MAIN_LOOPER);
            runtime.spawn(runner.run());
            looper
        });
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>);

        Ok(HttpManager {
            inner: Arc::new(Inner {
                transport: SharedTransport::new(transport),
                tracker: Arc::new(HeaderTracker::new(store)),
                config,
                runtime,
                main_looper,
                spawned: AtomicUsize::new(0),
            }),
        })
    }
}
