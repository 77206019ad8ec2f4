//! URL template engine.
//!
//! A [`UrlTemplate`] merges a base URL, ordered path substitutions and a set
//! of query parameters into the final URL string:
//!
//! ```
//! use lightnet_core::{PathParam, QueryParam, UrlTemplate};
//!
//! let url = UrlTemplate::new("https://api.example.com/v1/{id}")
//!     .unwrap()
//!     .path_param(PathParam::new("id", "42"))
//!     .query_param(QueryParam::new("q", "a b"))
//!     .build();
//!
//! assert_eq!(url, "https://api.example.com/v1/42?q=a%20b");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::warn;

use crate::{Error, Result};

/// Characters left untouched when encoding a URL component.
///
/// Everything except ASCII alphanumerics and `_-!.~'()*` is escaped.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'!')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Percent-encode a single URL component (path value, query key or value).
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

// ============================================================================
// Path Parameters
// ============================================================================

/// A path substitution: every `{name}` in the URL is replaced by `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    placeholder: String,
    value: String,
}

impl PathParam {
    /// Create a path parameter.
    ///
    /// The placeholder is normalized to its bracketed `{name}` form unless it
    /// already is. An empty placeholder never matches anything.
    #[must_use]
    pub fn new(placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        let placeholder = if placeholder.is_empty() {
            warn!("path parameter with an empty placeholder is ignored");
            placeholder
        } else if placeholder.starts_with('{') && placeholder.ends_with('}') {
            placeholder
        } else {
            format!("{{{placeholder}}}")
        };

        Self {
            placeholder,
            value: value.into(),
        }
    }

    /// The bracketed placeholder, as searched in the URL.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The raw (not yet encoded) replacement value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    fn apply(&self, url: &str) -> String {
        if self.placeholder.is_empty() {
            return url.to_string();
        }
        url.replace(&self.placeholder, &encode_component(&self.value))
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// A query parameter.
///
/// Equality and hashing only consider the key: two parameters with the same
/// key are the same parameter, whatever their values.
#[derive(Debug, Clone)]
pub struct QueryParam {
    key: String,
    value: String,
}

impl QueryParam {
    /// Create a query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parameter key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parameter value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// A parameter is only valid with a non-empty key.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty()
    }
}

impl PartialEq for QueryParam {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for QueryParam {}

impl Hash for QueryParam {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            encode_component(&self.key),
            encode_component(&self.value)
        )
    }
}

/// A set of query parameters keyed by parameter name.
///
/// Adding a parameter whose key is already present replaces the stored value
/// (last write wins) while the key keeps the position of its first insertion,
/// so the rendered query string is deterministic.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; invalid parameters are dropped with a warning.
    pub fn insert(&mut self, param: QueryParam) -> &mut Self {
        if !param.is_valid() {
            warn!(value = %param.value, "dropping query parameter with an empty key");
            return self;
        }

        if let Some(existing) = self.params.iter_mut().find(|p| **p == param) {
            existing.value = param.value;
        } else {
            self.params.push(param);
        }
        self
    }

    /// Add several parameters.
    pub fn extend(&mut self, params: impl IntoIterator<Item = QueryParam>) -> &mut Self {
        for param in params {
            self.insert(param);
        }
        self
    }

    /// Value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(QueryParam::value)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `true` when no valid parameter was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryParam> {
        self.params.iter()
    }
}

/// Two sets are equal when they render the same query string: same keys,
/// same values, same order.
impl PartialEq for QueryParams {
    fn eq(&self, other: &Self) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.key == b.key && a.value == b.value)
    }
}

impl Eq for QueryParams {}

impl fmt::Display for QueryParams {
    /// Renders `k=v` pairs joined with `&`, without the leading `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<T: IntoIterator<Item = QueryParam>>(iter: T) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

// ============================================================================
// URL Template
// ============================================================================

/// A base URL with pending path substitutions and query parameters.
///
/// The base URL holds protocol, host and path but no query string. A single
/// trailing `/` is dropped so that `https://host/v1` and `https://host/v1/`
/// resolve identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    base_url: String,
    path_params: Vec<PathParam>,
    query_params: QueryParams,
}

impl UrlTemplate {
    /// Create a template from its base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is empty.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into();
        if base_url.is_empty() {
            return Err(Error::configuration("base URL cannot be empty"));
        }
        if base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            base_url,
            path_params: Vec::new(),
            query_params: QueryParams::new(),
        })
    }

    /// Add a path substitution (applied in insertion order).
    pub fn add_path_param(&mut self, param: PathParam) -> &mut Self {
        self.path_params.push(param);
        self
    }

    /// Add a query parameter.
    pub fn add_query_param(&mut self, param: QueryParam) -> &mut Self {
        self.query_params.insert(param);
        self
    }

    /// Builder-style [`Self::add_path_param`].
    #[must_use]
    pub fn path_param(mut self, param: PathParam) -> Self {
        self.add_path_param(param);
        self
    }

    /// Builder-style [`Self::add_query_param`].
    #[must_use]
    pub fn query_param(mut self, param: QueryParam) -> Self {
        self.add_query_param(param);
        self
    }

    /// The normalized base URL, before substitution.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The accumulated query parameters.
    #[must_use]
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// Produce the final URL string.
    #[must_use]
    pub fn build(&self) -> String {
        let mut url = self
            .path_params
            .iter()
            .fold(self.base_url.clone(), |url, param| param.apply(&url));

        if !self.query_params.is_empty() {
            url.push('?');
            url.push_str(&self.query_params.to_string());
        }
        url
    }
}
