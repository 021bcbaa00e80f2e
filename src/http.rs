use crate::error::SWError;
use crate::io::{HttpRunner, Response};
use crate::time::Seconds;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map, HashMap};
use std::fmt::{self, Display, Formatter};

/// Network runner backed by `ureq`. Every HTTP status is a successful fetch;
/// only transport failures (DNS, refused connection, timeout) are errors.
pub struct Client {
    agent: ureq::Agent,
}

impl Client {
    pub fn new(timeout: Seconds) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout.as_timeout())
            .http_status_as_error(false)
            .build();
        Client {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn without_body(&self, request: &Request) -> Result<Response> {
        let builder = match request.method {
            Method::HEAD => self.agent.head(request.url()),
            Method::DELETE => self.agent.delete(request.url()),
            _ => self.agent.get(request.url()),
        };
        let builder = request
            .headers()
            .iter()
            .fold(builder, |req, (key, value)| req.header(key.as_str(), value.as_str()));
        match builder.call() {
            Ok(response) => into_response(response),
            Err(err) => Err(SWError::HttpTransportError(format!("{}: {err}", request.url())).into()),
        }
    }

    fn with_body(&self, request: &Request) -> Result<Response> {
        let builder = match request.method {
            Method::PUT => self.agent.put(request.url()),
            Method::PATCH => self.agent.patch(request.url()),
            _ => self.agent.post(request.url()),
        };
        let builder = request
            .headers()
            .iter()
            .fold(builder, |req, (key, value)| req.header(key.as_str(), value.as_str()));
        let body = request.body.as_deref().unwrap_or_default();
        match builder.send(body) {
            Ok(response) => into_response(response),
            Err(err) => Err(SWError::HttpTransportError(format!("{}: {err}", request.url())).into()),
        }
    }
}

fn into_response(mut response: ureq::http::Response<ureq::Body>) -> Result<Response> {
    let status = response.status();
    // Grab headers so they can be replayed from the cache.
    let headers = response
        .headers()
        .iter()
        .fold(Headers::new(), |mut headers, (name, value)| {
            if let Ok(value) = value.to_str() {
                headers.set(name.as_str(), value);
            }
            headers
        });
    // Responses are passed through whole, media files included.
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|err| SWError::HttpTransportError(err.to_string()))?;
    let response = Response::builder()
        .status(status.as_u16())
        .status_text(status.canonical_reason().unwrap_or_default())
        .headers(headers)
        .body(body)
        .build()?;
    Ok(response)
}

impl HttpRunner for Client {
    fn fetch(&self, request: &Request) -> Result<Response> {
        if !request.is_http() {
            return Err(SWError::UnsupportedScheme(request.url().to_string()).into());
        }
        match request.method {
            Method::GET | Method::HEAD | Method::DELETE => self.without_body(request),
            Method::POST | Method::PUT | Method::PATCH => self.with_body(request),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let method = match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        write!(f, "{method}")
    }
}

impl TryFrom<&str> for Method {
    type Error = SWError;

    fn try_from(method: &str) -> std::result::Result<Self, Self::Error> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(SWError::ConfigurationError(format!(
                "Unknown HTTP method: {method}"
            ))),
        }
    }
}

/// How the page issued the request. `Navigate` is a top-level document load;
/// everything else is a sub-resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    /// Header names are stored lower-cased.
    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(&key.to_lowercase())
    }

    pub fn iter(&self) -> hash_map::Iter<String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct Request {
    #[builder(default)]
    pub method: Method,
    #[builder(setter(into))]
    url: String,
    #[builder(default)]
    pub mode: RequestMode,
    #[builder(default)]
    headers: Headers,
    #[builder(setter(into, strip_option), default)]
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn new(url: &str, method: Method) -> Self {
        Request {
            method,
            url: url.to_string(),
            mode: RequestMode::default(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Request::new(url, Method::GET)
    }

    pub fn navigate(url: &str) -> Self {
        Request {
            mode: RequestMode::Navigate,
            ..Request::get(url)
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key, value);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn scheme(&self) -> Option<String> {
        self.url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_lowercase())
    }

    pub fn is_http(&self) -> bool {
        matches!(self.scheme().as_deref(), Some("http") | Some("https"))
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method, &self.url)
    }
}

/// Identity of a cached entry: method plus absolute URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: Method, url: &str) -> Self {
        RequestKey {
            method,
            url: url.to_string(),
        }
    }

    pub fn get(url: &str) -> Self {
        RequestKey::new(Method::GET, url)
    }
}

impl Display for RequestKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Join `path` onto `origin`. Absolute URLs are returned as they are.
pub fn resolve_url(origin: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}
