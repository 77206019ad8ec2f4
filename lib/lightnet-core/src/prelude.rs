//! Prelude module for convenient imports.
//!
//! ```ignore
//! use lightnet_core::prelude::*;
//! ```

pub use crate::{
    Arg, Error, ErrorKind, HeaderTracker, KeyValueStore, Method, Operation, ParamRole,
    RequestDescriptor, Response, Result, ToArg, TrackHeader, VerbMarker, resolve,
};
