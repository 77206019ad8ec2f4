//! Resolved request descriptors.

use std::collections::HashMap;

use serde_json::Value;

use crate::request::insert_header;
use crate::{Method, TrackHeader};

/// A fully resolved request, ready for execution.
///
/// Produced by [`crate::resolve`] or built directly with
/// [`RequestDescriptor::get`] / [`RequestDescriptor::post`]. It is immutable
/// once built and consumed by execution.
///
/// ```
/// use lightnet_core::{RequestDescriptor, TrackHeader};
///
/// let descriptor = RequestDescriptor::get("https://api.example.com/me")
///     .header("Authorization", "Bearer token")
///     .track_header(TrackHeader::default())
///     .build();
///
/// assert_eq!(descriptor.url(), "https://api.example.com/me");
/// assert_eq!(descriptor.tracking().map(TrackHeader::group), Some("Global"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    body: Option<Value>,
    headers: HashMap<String, String>,
    track_header: Option<TrackHeader>,
}

impl RequestDescriptor {
    /// Start a GET descriptor.
    #[must_use]
    pub fn get(url: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new(Method::Get, url.into())
    }

    /// Start a POST descriptor with an optional JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Option<Value>) -> RequestDescriptorBuilder {
        let mut builder = RequestDescriptorBuilder::new(Method::Post, url.into());
        builder.body = body;
        builder
    }

    /// Verb.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Resolved URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Explicit request headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header tracking directive, if any.
    #[must_use]
    pub const fn tracking(&self) -> Option<&TrackHeader> {
        self.track_header.as_ref()
    }
}

/// Builder for [`RequestDescriptor`].
#[derive(Debug, Clone)]
pub struct RequestDescriptorBuilder {
    method: Method,
    url: String,
    body: Option<Value>,
    headers: HashMap<String, String>,
    track_header: Option<TrackHeader>,
}

impl RequestDescriptorBuilder {
    fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            body: None,
            headers: HashMap::new(),
            track_header: None,
        }
    }

    /// Add an explicit header, replacing any same-named one.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Add several explicit headers.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            insert_header(&mut self.headers, name.into(), value.into());
        }
        self
    }

    /// Set the JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replay and capture headers of the given group.
    #[must_use]
    pub fn track_header(mut self, track_header: TrackHeader) -> Self {
        self.track_header = Some(track_header);
        self
    }

    /// Set or clear the tracking directive.
    #[must_use]
    pub fn tracking(mut self, track_header: Option<TrackHeader>) -> Self {
        self.track_header = track_header;
        self
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> RequestDescriptor {
        RequestDescriptor {
            method: self.method,
            url: self.url,
            body: self.body,
            headers: self.headers,
            track_header: self.track_header,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_descriptor() {
        let descriptor = RequestDescriptor::post("http://h.com/login", Some(json!({"u": "a"})))
            .headers([("X-A", "1"), ("x-a", "2")])
            .build();

        assert_eq!(descriptor.method(), Method::Post);
        assert_eq!(descriptor.body(), Some(&json!({"u": "a"})));
        assert_eq!(descriptor.headers().len(), 1);
        assert_eq!(descriptor.headers().get("x-a").map(String::as_str), Some("2"));
        assert!(descriptor.tracking().is_none());
    }
}
