//! Request capability.
//!
//! # Responsibilities
//! - Expose method, URI path and context-stripped path to the dispatcher
//! - Expose query parameters, headers and cookies to handlers
//! - Build an owned request snapshot from axum request parts
//!
//! # Design Decisions
//! - The dispatcher depends on the `RequestContext` trait only
//! - `DispatchRequest` owns its data so it can outlive the transport request

use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Read access to an incoming request.
pub trait RequestContext {
    fn method(&self) -> &Method;

    /// Full request path, including any context prefix.
    fn uri_path(&self) -> &str;

    /// Prefix under which the application is mounted; empty when mounted at the root.
    fn context_path(&self) -> &str {
        ""
    }

    /// Request path with the context prefix stripped.
    fn path(&self) -> &str {
        let uri = self.uri_path();
        let context = self.context_path();
        if context.is_empty() {
            return uri;
        }
        match uri.strip_prefix(context) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => uri,
        }
    }

    fn param(&self, name: &str) -> Option<&str>;

    fn param_names(&self) -> Vec<&str>;

    fn header(&self, name: &str) -> Option<&str>;

    fn cookie(&self, name: &str) -> Option<&str>;
}

/// Owned request snapshot.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    method: Method,
    uri_path: String,
    context_path: String,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
}

impl DispatchRequest {
    /// `uri` may carry a query string, which becomes the request parameters.
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        Self {
            method,
            uri_path: path.to_string(),
            context_path: String::new(),
            params: parse_query(query),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
        }
    }

    /// Snapshot of an axum request.
    pub fn from_parts(parts: &Parts, context_path: &str) -> Self {
        let mut request = Self {
            method: parts.method.clone(),
            uri_path: parts.uri.path().to_string(),
            context_path: context_path.to_string(),
            params: parse_query(parts.uri.query().unwrap_or_default()),
            headers: parts.headers.clone(),
            cookies: Vec::new(),
        };
        request.cookies = parse_cookies(&request.headers);
        request
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Add a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            self.headers.append(name, value);
            self.cookies = parse_cookies(&self.headers);
        }
        self
    }
}

impl RequestContext for DispatchRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn uri_path(&self) -> &str {
        &self.uri_path
    }

    fn context_path(&self) -> &str {
        &self.context_path
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn param_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.params.iter().map(|(key, _)| key.as_str()).collect();
        names.dedup();
        names
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_query_params_are_decoded() {
        let request = DispatchRequest::new(Method::GET, "/search?q=hello+world&page=2");
        assert_eq!(request.path(), "/search");
        assert_eq!(request.param("q"), Some("hello world"));
        assert_eq!(request.param("page"), Some("2"));
        assert_eq!(request.param_names(), vec!["q", "page"]);
    }

    #[test]
    fn test_context_path_is_stripped() {
        let request = DispatchRequest::new(Method::GET, "/app/index").with_context_path("/app");
        assert_eq!(request.uri_path(), "/app/index");
        assert_eq!(request.path(), "/index");

        let root = DispatchRequest::new(Method::GET, "/app").with_context_path("/app");
        assert_eq!(root.path(), "/");

        // "/application" is not under "/app"
        let other = DispatchRequest::new(Method::GET, "/application").with_context_path("/app");
        assert_eq!(other.path(), "/application");
    }

    #[test]
    fn test_from_parts_reads_headers_and_cookies() {
        let request = Request::builder()
            .method("DELETE")
            .uri("http://example.com/ctx/restapi?id=7")
            .header("Cookie", "session=abc; theme=dark")
            .header("X-Trace", "t-1")
            .body(Body::empty())
            .unwrap();
        let (parts, _) = request.into_parts();

        let request = DispatchRequest::from_parts(&parts, "/ctx");
        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.path(), "/restapi");
        assert_eq!(request.param("id"), Some("7"));
        assert_eq!(request.header("x-trace"), Some("t-1"));
        assert_eq!(request.cookie("theme"), Some("dark"));
        assert_eq!(request.cookie("missing"), None);
    }
}
