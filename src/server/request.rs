use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::fmt;
use std::io::{self, Cursor, Read};
use tracing::{debug, info};

/// Everything about a request except its body.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl Default for RequestHead {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: None,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestHead {
    /// Header value as text; non-UTF-8 values read as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// `application/json`, optionally followed by parameters.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct == "application/json" || ct.starts_with("application/json;"))
    }

    /// Query string pairs, percent-decoded.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

/// Request body as a byte stream, read at most once.
pub struct Body {
    reader: Box<dyn Read + Send>,
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_reader(Cursor::new(bytes.into()))
    }

    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Drain the stream.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body { .. }")
    }
}

/// A request as the dispatcher sees it.
#[derive(Debug)]
pub struct Request {
    pub head: RequestHead,
    pub body: Body,
}

impl Request {
    /// Build a request from a method and a path that may carry a query string.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (target, None),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            head: RequestHead {
                method,
                path: path.to_string(),
                query,
                headers: HeaderMap::new(),
            },
            body: Body::empty(),
        }
    }

    /// Add a header; invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.head.headers.append(name, value);
        }
        self
    }

    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// JSON body with a matching content type.
    #[must_use]
    pub fn json(self, value: &serde_json::Value) -> Self {
        self.header("content-type", "application/json")
            .body(Body::from_bytes(value.to_string()))
    }

    /// Urlencoded form body with a matching content type.
    #[must_use]
    pub fn form(self, encoded: &str) -> Self {
        self.header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from_bytes(encoded.to_string()))
    }
}

/// Convert a `may_minihttp` request, reading its body fully.
pub fn parse_request(req: may_minihttp::Request) -> io::Result<Request> {
    // R1: Method and target
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let target = req.path().to_string();

    // R2: Headers extracted
    let mut headers = HeaderMap::new();
    for h in req.headers() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(h.name.as_bytes()),
            HeaderValue::from_bytes(h.value),
        ) {
            headers.append(name, value);
        }
    }
    debug!(header_count = headers.len(), "Headers extracted");

    // R3: Body read
    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;

    let mut parsed = Request::new(method, &target);
    parsed.head.headers = headers;
    parsed.body = Body::from_bytes(body);

    info!(
        method = %parsed.head.method,
        path = %parsed.head.path,
        "HTTP request parsed"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_split() {
        let req = Request::new(Method::GET, "/foo/bar?x=1&y=2");
        assert_eq!(req.head.path, "/foo/bar");
        assert_eq!(
            req.head.query_pairs(),
            vec![("x".into(), "1".into()), ("y".into(), "2".into())]
        );
    }

    #[test]
    fn test_json_detection() {
        let plain = Request::new(Method::POST, "/").header("Content-Type", "application/json");
        assert!(plain.head.is_json());
        let charset = Request::new(Method::POST, "/")
            .header("Content-Type", "application/json; charset=utf-8");
        assert!(charset.head.is_json());
        let other = Request::new(Method::POST, "/").header("Content-Type", "application/jsonx");
        assert!(!other.head.is_json());
        assert!(!Request::new(Method::POST, "/").head.is_json());
    }
}
