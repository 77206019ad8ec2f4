//! Lightweight HTTP access layer with declarative request bindings.
//!
//! Declare an API as a trait, resolve each call into a request descriptor,
//! and execute it with redirect following and tracked header replay.
//!
//! # Example
//!
//! ```ignore
//! use lightnet::prelude::*;
//!
//! #[network_api(url = "https://api.example.com")]
//! pub trait SessionApi {
//!     #[post("/login")]
//!     #[track_header(group = "session", read_key = "x-session")]
//!     fn login(&self, #[body] credentials: serde_json::Value) -> lightnet::Result<Call>;
//!
//!     #[get("/items/{id}")]
//!     #[track_header(group = "session", read_key = "x-session")]
//!     fn item(&self, #[path] id: u64) -> lightnet::Result<Call>;
//! }
//!
//! let manager = HttpManager::builder().with_logging().build()?;
//! let api = SessionApiClient::new(manager);
//!
//! api.login(serde_json::json!({"user": "ada"}))?.send().await?;
//! let item = api.item(42)?.send().await?;
//! println!("{}", item.body());
//! ```

mod call;
mod config;
mod connector;
mod executable;
mod looper;
mod manager;
pub mod middleware;
mod network;
pub mod prelude;
mod state;
mod transport;

pub use call::{Call, NetworkResponse, PendingCall};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT,
    normalize_user_agent,
};
pub use executable::NetworkExecutable;
pub use looper::{Looper, LooperRunner, Task};
pub use manager::{HttpManager, HttpManagerBuilder, MAIN_LOOPER};
pub use network::LightNetwork;
pub use state::{ConnectivityProvider, FixedConnectivity, NetworkInfo, NetworkTransport, State};
pub use transport::{BoxedTransport, HyperTransport, TransportFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types (also used by macro-generated code)
pub use lightnet_core::{
    APPLICATION_JSON, Arg, DEFAULT_TRACK_GROUP, DEFAULT_TRACK_READ_KEY, Error, ErrorKind,
    HEADER_DELIMITER, HeaderMap, HeaderTracker, JsonFileStore, KeyValueStore, MemoryStore, Method,
    Operation, ParamRole, PathParam, QueryParam, QueryParams, Request, RequestBuilder,
    RequestDescriptor, RequestDescriptorBuilder, Response, Result, TRACKER_NAMESPACE, ToArg,
    TrackHeader, TrackedHeaders, UrlTemplate, VerbMarker, encode_component, from_json, group_key,
    is_non_empty_object, resolve, to_json,
};

// Re-export http types for status codes and headers
pub use lightnet_core::{StatusCode, header};

// Re-export macros
pub use lightnet_macro::network_api;
