//! Core types for the lightnet HTTP access layer.
//!
//! This crate holds everything that does not touch the network:
//! - [`Error`] and [`Result`] - Error handling
//! - [`Method`] - Supported HTTP verbs
//! - [`UrlTemplate`], [`PathParam`], [`QueryParam`] - URL template engine
//! - [`Operation`], [`ParamRole`], [`TrackHeader`] - Declared operations
//! - [`Arg`] and [`ToArg`] - Call-time arguments
//! - [`resolve`] and [`RequestDescriptor`] - Request resolution
//! - [`Request`] and [`Response`] - Wire request/response types
//! - [`KeyValueStore`] and [`HeaderTracker`] - Tracked header replay

mod arg;
mod body;
mod descriptor;
mod error;
mod method;
mod operation;
pub mod prelude;
mod request;
mod resolve;
mod response;
mod store;
mod template;
mod tracker;

pub use arg::{Arg, ToArg};
pub use body::{APPLICATION_JSON, from_json, is_non_empty_object, to_json};
pub use descriptor::{RequestDescriptor, RequestDescriptorBuilder};
pub use error::{Error, ErrorKind, Result};
pub use method::Method;
pub use operation::{
    DEFAULT_TRACK_GROUP, DEFAULT_TRACK_READ_KEY, Operation, ParamRole, TrackHeader, VerbMarker,
};
pub use request::{Request, RequestBuilder};
pub use resolve::resolve;
pub use response::{HeaderMap, Response};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tracker::{
    HEADER_DELIMITER, HeaderTracker, TRACKER_NAMESPACE, TrackedHeaders, group_key,
};
pub use template::{PathParam, QueryParam, QueryParams, UrlTemplate, encode_component};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
