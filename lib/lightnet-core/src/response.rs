//! HTTP response handling.
//!
//! [`Response`] gives access to status, the full multi-valued header map and
//! the body. The transport produces `Response<Bytes>`; calls deliver
//! `Response<String>` whose body was read line by line.
//!
//! # Example
//!
//! ```ignore
//! let user: User = response.json()?;
//! ```

use std::collections::HashMap;

use bytes::Bytes;

/// Multi-valued header map, keyed by header name.
pub type HeaderMap = HashMap<String, Vec<String>>;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HeaderMap,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers with every value received.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, ignoring ASCII case in the name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a header, ignoring ASCII case in the name.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HeaderMap, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is one of the followed redirects: 301, 302 or 303.
    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        matches!(self.status, 301..=303)
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            status: self.status,
            headers: self.headers,
            body: f(self.body),
        }
    }
}

impl Response<Bytes> {
    /// Read the body as text, one line at a time, terminating every line
    /// with `\n`.
    ///
    /// A line ends at `\n`, `\r\n` or a lone `\r`; invalid UTF-8 is replaced
    /// lossily. An empty body yields an empty string.
    #[must_use]
    pub fn into_text_lines(self) -> Response<String> {
        self.map_body(|body| read_lines(&body))
    }
}

impl Response<String> {
    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(self.body.as_bytes())
    }
}

fn read_lines(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut out = String::with_capacity(text.len() + 1);
    let mut rest: &str = &text;
    while !rest.is_empty() {
        let Some(end) = rest.find(['\r', '\n']) else {
            out.push_str(rest);
            out.push('\n');
            break;
        };
        let (line, tail) = rest.split_at(end);
        out.push_str(line);
        out.push('\n');
        rest = tail
            .strip_prefix("\r\n")
            .or_else(|| tail.get(1..))
            .unwrap_or_default();
    }
    out
}
