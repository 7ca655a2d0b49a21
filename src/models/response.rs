//! Response specifications handed to the stub engine.

use serde::Serialize;

use crate::error::{FixtureError, Result};

/// A concrete HTTP response a stub answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl ResponseSpec {
    /// Empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// 200 response with a literal body.
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// 200 response with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| FixtureError::InvalidResponse(e.to_string()))?;
        Ok(Self::body(body).with_header("content-type", "application/json"))
    }

    /// Parse a raw HTTP response capture (e.g. the output of `curl -is`).
    ///
    /// Accepts CRLF or LF line endings. The status line and headers must be
    /// UTF-8; everything after the first blank line is kept as body bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the status line is missing or malformed.
    pub fn raw(capture: impl AsRef<[u8]>) -> Result<Self> {
        let (head, body) = split_head(capture.as_ref());
        let head = std::str::from_utf8(head).map_err(|e| {
            FixtureError::InvalidResponse(format!("headers are not UTF-8: {e}"))
        })?;
        let mut lines = head.lines();

        let status_line = lines
            .next()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| FixtureError::InvalidResponse("missing status line".to_string()))?;
        let status = parse_status_line(status_line)?;

        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();

        Ok(Self {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn split_head(capture: &[u8]) -> (&[u8], &[u8]) {
    let crlf = find(capture, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(capture, b"\n\n").map(|i| (i, 2));

    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((idx, sep)) => (&capture[..idx], &capture[idx + sep..]),
        None => (capture, &capture[capture.len()..]),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err(FixtureError::InvalidResponse(format!(
            "expected an HTTP status line, found '{line}'"
        )));
    }

    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..1000).contains(code))
        .ok_or_else(|| FixtureError::InvalidResponse(format!("invalid status in '{line}'")))
}

impl From<&str> for ResponseSpec {
    fn from(body: &str) -> Self {
        Self::body(body)
    }
}

impl From<String> for ResponseSpec {
    fn from(body: String) -> Self {
        Self::body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_defaults_to_ok() {
        let response = ResponseSpec::from("Hello World");
        assert_eq!(response.status, 200);
        assert!(response.headers.is_empty());
        assert_eq!(response.body_text(), "Hello World");
    }

    #[test]
    fn test_json_sets_content_type() {
        let response = ResponseSpec::json(&serde_json::json!({"ok": true})).unwrap();
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body_text(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_raw_parses_crlf_capture() {
        let raw = "HTTP/1.1 404 Not Found\r\n\
                   Content-Type: text/plain\r\n\
                   X-Trace: a:b\r\n\r\n\
                   missing\r\n";
        let response = ResponseSpec::raw(raw).unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("x-trace"), Some("a:b"));
        assert_eq!(response.body_text(), "missing\r\n");
    }

    #[test]
    fn test_raw_parses_lf_capture_and_http2_status_line() {
        let raw = "HTTP/2 201\ncontent-type: application/json\n\n{\"id\": 1}";
        let response = ResponseSpec::raw(raw).unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body_text(), "{\"id\": 1}");
    }

    #[test]
    fn test_raw_without_body() {
        let response = ResponseSpec::raw("HTTP/1.1 204 No Content\r\n").unwrap();
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_raw_keeps_binary_body_bytes() {
        let mut capture = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\n\r\n".to_vec();
        let payload = [0x89, b'P', b'N', b'G', 0xff, 0xfe, 0x00, b'\n', b'\n', 0x80];
        capture.extend_from_slice(&payload);

        let response = ResponseSpec::raw(&capture).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("image/png"));
        assert_eq!(response.body, payload);
    }

    #[test]
    fn test_raw_rejects_non_utf8_headers() {
        let capture = b"HTTP/1.1 200 OK\r\nX-Bad: \xff\r\n\r\nbody";
        let err = ResponseSpec::raw(capture).unwrap_err();
        assert!(matches!(err, FixtureError::InvalidResponse(_)));
    }

    #[test]
    fn test_raw_rejects_non_http_text() {
        let err = ResponseSpec::raw("Hello World").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidResponse(_)));

        let err = ResponseSpec::raw("").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidResponse(_)));

        let err = ResponseSpec::raw("HTTP/1.1 abc\r\n\r\n").unwrap_err();
        assert!(matches!(err, FixtureError::InvalidResponse(_)));
    }
}
