//! Response state accumulated while a request travels through the chain.

use bytes::Bytes;
use derive_more::Display;

use crate::Response;

/// Where the response state was filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum FetchSource {
    /// Read from the cache.
    #[display("cache")]
    Cache,
    /// Fetched over the network.
    #[default]
    #[display("network")]
    Network,
}

/// Response state for one attempt.
///
/// Starts empty; stages fill the transport head, the raw bytes and, once
/// decoded, the parsed value.
#[derive(Debug)]
pub struct HttpResponse<P> {
    http_response: Option<Response<()>>,
    raw_data: Option<Bytes>,
    parsed_response: Option<P>,
    source: FetchSource,
}

impl<P> Default for HttpResponse<P> {
    fn default() -> Self {
        Self {
            http_response: None,
            raw_data: None,
            parsed_response: None,
            source: FetchSource::default(),
        }
    }
}

impl<P> HttpResponse<P> {
    /// Creates an empty response state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport response head (status and headers).
    #[must_use]
    pub const fn http_response(&self) -> Option<&Response<()>> {
        self.http_response.as_ref()
    }

    /// Raw response bytes.
    #[must_use]
    pub const fn raw_data(&self) -> Option<&Bytes> {
        self.raw_data.as_ref()
    }

    /// Parsed value, once a parsing stage produced it.
    #[must_use]
    pub const fn parsed_response(&self) -> Option<&P> {
        self.parsed_response.as_ref()
    }

    /// Provenance of the state.
    #[must_use]
    pub const fn source(&self) -> FetchSource {
        self.source
    }

    /// Store a transport response, splitting head and raw bytes.
    pub fn set_transport_response(&mut self, response: Response<Bytes>, source: FetchSource) {
        let (head, body) = response.into_head();
        self.http_response = Some(head);
        self.raw_data = Some(body);
        self.source = source;
    }

    /// Store the parsed value.
    pub fn set_parsed_response(&mut self, parsed: P) {
        self.parsed_response = Some(parsed);
    }

    /// Set the provenance.
    pub fn set_source(&mut self, source: FetchSource) {
        self.source = source;
    }

    /// Take the parsed value out, leaving `None`.
    pub fn take_parsed_response(&mut self) -> Option<P> {
        self.parsed_response.take()
    }

    /// Take the transport head and raw bytes out, leaving `None`.
    pub fn take_raw(&mut self) -> (Option<Response<()>>, Option<Bytes>) {
        (self.http_response.take(), self.raw_data.take())
    }
}
