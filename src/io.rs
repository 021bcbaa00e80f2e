use crate::{
    api_defaults,
    http::{Headers, Request},
    Result,
};
use std::sync::Arc;

/// A trait for the HTTP protocol. Implementors take a `Request` and return
/// the remote's `Response`. An `Err` means the network attempt itself was
/// rejected (offline, DNS failure, timeout); HTTP error statuses are still
/// `Ok` responses. Clients can do real HTTP calls or mock the responses for
/// testing purposes.
pub trait HttpRunner {
    fn fetch(&self, request: &Request) -> Result<Response>;
}

impl<R: HttpRunner + ?Sized> HttpRunner for Arc<R> {
    fn fetch(&self, request: &Request) -> Result<Response> {
        (**self).fetch(request)
    }
}

/// Snapshot of an HTTP response. Stored in the cache as is and only ever
/// replaced as a whole.
#[derive(Clone, Debug, Builder, PartialEq)]
pub struct Response {
    #[builder(default)]
    pub status: u16,
    #[builder(setter(into), default)]
    pub status_text: String,
    #[builder(default)]
    pub headers: Headers,
    #[builder(setter(into), default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Synthetic response for a sub-resource that is neither reachable nor
    /// cached.
    pub fn service_unavailable() -> Self {
        let mut headers = Headers::new();
        headers.set("content-type", "text/plain; charset=utf-8");
        Response {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            headers,
            body: api_defaults::OFFLINE_BODY.as_bytes().to_vec(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|s| s.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
