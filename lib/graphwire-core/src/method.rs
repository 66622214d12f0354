//! HTTP method types.

use derive_more::Display;

/// HTTP method used to send a GraphQL operation.
///
/// GraphQL over HTTP only ever uses `GET` (side-effect free queries) or `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - the body is embedded as URL query parameters.
    #[display("GET")]
    Get,
    /// POST method - the body is sent as JSON.
    #[display("POST")]
    Post,
}

impl Method {
    /// Returns `true` if the method is safe (does not modify resources).
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Get)
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
