//! Declared operations.
//!
//! An [`Operation`] is the static description of one API method: its verb
//! declaration, relative path template, ordered parameter roles and optional
//! header tracking directive. The `#[network_api]` macro emits one `static`
//! per trait method; operations can also be written by hand:
//!
//! ```
//! use lightnet_core::{Operation, ParamRole, TrackHeader, VerbMarker};
//!
//! static GET_USER: Operation = Operation::tracked(
//!     "get_user",
//!     &[VerbMarker::get("/users/{id}")],
//!     &[ParamRole::Path("id"), ParamRole::Query("fields")],
//!     TrackHeader::DEFAULT,
//! );
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::Method;

/// Default tracked header group.
pub const DEFAULT_TRACK_GROUP: &str = "Global";

/// Default response header read-key.
pub const DEFAULT_TRACK_READ_KEY: &str = "x-TrackHeader";

/// One verb declaration (`#[get("/path")]`, `#[post("/path")]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbMarker {
    /// Declared HTTP method.
    pub method: Method,
    /// Relative path template, appended to the global base URL.
    pub path: &'static str,
}

impl VerbMarker {
    /// A GET declaration.
    #[must_use]
    pub const fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
        }
    }

    /// A POST declaration.
    #[must_use]
    pub const fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
        }
    }
}

/// The role a parameter plays in building the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRole {
    /// Replaces the `{name}` placeholder of the path template.
    Path(&'static str),
    /// Single query parameter with the given key.
    Query(&'static str),
    /// Mapping expanded into one query parameter per entry.
    QueryMap,
    /// JSON object sent as the POST body.
    Body,
    /// A role this resolver does not know; the argument is skipped.
    Unrecognized(&'static str),
}

impl fmt::Display for ParamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(name) => write!(f, "path({name})"),
            Self::Query(key) => write!(f, "query({key})"),
            Self::QueryMap => write!(f, "query_map"),
            Self::Body => write!(f, "body"),
            Self::Unrecognized(label) => write!(f, "unrecognized({label})"),
        }
    }
}

/// Header tracking directive: replay response headers within a group.
///
/// Response headers whose name contains `read_key` (case-insensitive) are
/// persisted under `group` and sent again with every request of that group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackHeader {
    group: Cow<'static, str>,
    read_key: Cow<'static, str>,
}

impl TrackHeader {
    /// The `"Global"` group tracking `x-TrackHeader` headers.
    pub const DEFAULT: Self = Self::from_static(DEFAULT_TRACK_GROUP, DEFAULT_TRACK_READ_KEY);

    /// Create a directive from static strings (usable in `const` context).
    #[must_use]
    pub const fn from_static(group: &'static str, read_key: &'static str) -> Self {
        Self {
            group: Cow::Borrowed(group),
            read_key: Cow::Borrowed(read_key),
        }
    }

    /// Create a directive.
    #[must_use]
    pub fn new(group: impl Into<String>, read_key: impl Into<String>) -> Self {
        Self {
            group: Cow::Owned(group.into()),
            read_key: Cow::Owned(read_key.into()),
        }
    }

    /// The isolation group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The response header read-key.
    #[must_use]
    pub fn read_key(&self) -> &str {
        &self.read_key
    }
}

impl Default for TrackHeader {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A declared request template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Method name, used in logs.
    pub name: &'static str,
    /// Every verb declaration found on the method. Resolution requires
    /// exactly one.
    pub verbs: &'static [VerbMarker],
    /// Parameter roles, in declaration order.
    pub params: &'static [ParamRole],
    /// Optional header tracking directive.
    pub track_header: Option<TrackHeader>,
}

impl Operation {
    /// Create an operation without header tracking.
    #[must_use]
    pub const fn new(
        name: &'static str,
        verbs: &'static [VerbMarker],
        params: &'static [ParamRole],
    ) -> Self {
        Self {
            name,
            verbs,
            params,
            track_header: None,
        }
    }

    /// Create an operation replaying headers of the given tracking group.
    #[must_use]
    pub const fn tracked(
        name: &'static str,
        verbs: &'static [VerbMarker],
        params: &'static [ParamRole],
        track_header: TrackHeader,
    ) -> Self {
        Self {
            name,
            verbs,
            params,
            track_header: Some(track_header),
        }
    }
}
