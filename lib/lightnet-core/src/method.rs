//! HTTP method types.

use derive_more::Display;

/// HTTP request method supported by declared operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST method - send a JSON body.
    #[display("POST")]
    Post,
}

impl Method {
    /// Returns `true` if requests with this method carry a body.
    #[must_use]
    pub const fn supports_body(&self) -> bool {
        matches!(self, Self::Post)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        match method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            other => Err(crate::Error::configuration(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}
