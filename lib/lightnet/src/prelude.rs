//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lightnet::prelude::*;
//! ```

pub use crate::{
    Arg, Call, ClientConfig, Error, ErrorKind, HttpManager, LightNetwork, Looper, Method,
    NetworkExecutable, NetworkResponse, Operation, PendingCall, RequestDescriptor, Response,
    Result, State, StatusCode, ToArg, TrackHeader, network_api,
};
pub use serde::{Deserialize, Serialize};
