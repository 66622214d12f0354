//! Transport-level HTTP response.
//!
//! [`Response`] is what the transport collaborator hands back: status, headers
//! and the raw body bytes. The chain keeps the head (`Response<()>`) and the raw
//! bytes separately in [`crate::HttpResponse`].

use std::collections::HashMap;

use bytes::Bytes;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
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

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Split into the response head (status and headers) and the body.
    #[must_use]
    pub fn into_head(self) -> (Response<()>, B) {
        let Self {
            status,
            headers,
            body,
        } = self;
        (
            Response {
                status,
                headers,
                body: (),
            },
            body,
        )
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

}
