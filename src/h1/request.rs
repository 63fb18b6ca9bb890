//! Wire-level types for a single HTTP/1.x request/response pair.

use std::net::SocketAddr;

use bytes::{Bytes, BytesMut};

/// Request-line HTTP version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    /// Whether this version keeps a connection alive by default, absent any
    /// overriding `Connection` field.
    #[must_use]
    pub fn keepalive_by_default(self) -> bool {
        matches!(self, Version::Http11)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// What, if anything, `Transfer-Encoding` asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// No `Transfer-Encoding` field present.
    None,
    /// `Transfer-Encoding: chunked`. Decoding chunked request bodies is out
    /// of scope for this engine; requests that declare it are rejected
    /// with 411 rather than silently mishandled.
    Chunked,
    /// Any other `Transfer-Encoding` value.
    Unsupported,
}

/// A single header field, name and value kept as owned strings since both
/// are produced by copying out of a buffer that is about to be reused or
/// freed.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// Fields the engine itself inspects to drive body/keepalive/dispatch
/// decisions, parsed out of the raw field list once during header
/// dispatch. See [`crate::h1::fields`].
#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    pub host: Option<String>,
    pub content_length: Option<u64>,
    pub transfer_encoding: TransferEncoding,
    /// `true` if an explicit `Connection: close` was seen.
    pub connection_close: bool,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
}

impl Default for TransferEncoding {
    fn default() -> Self {
        TransferEncoding::None
    }
}

/// A parsed request line plus header fields. The body, if any, is read
/// separately into [`Request::body`] once the engine has decided how much
/// of it to expect.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// The request-target exactly as sent, e.g. `/a/b?x=1`.
    pub target: String,
    /// `target` with any query string stripped.
    pub path: String,
    /// `target`'s query string, without the leading `?`. Empty if absent.
    pub args: String,
    pub version: Version,
    pub fields: Vec<Field>,
    pub parsed: ParsedFields,
    pub content_length: Option<u64>,
    pub body: Option<Bytes>,
    pub peer_addr: SocketAddr,
    /// Resolved lazily by the reactor; `None` until something asks for it.
    pub local_addr: Option<SocketAddr>,
}

impl Request {
    /// Build a request from a parsed request line and header field list.
    /// Splits `target` into `path`/`args` and dispatches the field list
    /// into [`ParsedFields`] via [`crate::h1::fields::dispatch`].
    #[must_use]
    pub fn new(
        method: String,
        target: String,
        version: Version,
        fields: Vec<Field>,
        peer_addr: SocketAddr,
    ) -> Self {
        let (path, args) = match target.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (target.clone(), String::new()),
        };
        let parsed = crate::h1::fields::dispatch(&fields);
        let content_length = parsed.content_length;
        Self {
            method,
            target,
            path,
            args,
            version,
            fields,
            parsed,
            content_length,
            body: None,
            peer_addr,
            local_addr: None,
        }
    }
}

/// The response an application builds for a [`Request`]. `body` is built
/// up by the application and handed back to the engine, which frames it
/// (chunked or fixed-length) during `SendBody`.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub fields: Vec<Field>,
    pub body: BytesMut,
    /// If set, the engine ignores `status`'s default keepalive behavior
    /// and closes or keeps alive exactly as told. Left unset, keepalive
    /// follows the request version's default.
    pub close: Option<bool>,
}

impl Response {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            fields: Vec::new(),
            body: BytesMut::new(),
            close: None,
        }
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_keepalive_defaults() {
        assert!(Version::Http11.keepalive_by_default());
        assert!(!Version::Http10.keepalive_by_default());
    }

    #[test]
    fn response_push_field() {
        let mut r = Response::new(200);
        r.push_field("X-Test", "1");
        assert_eq!(r.fields[0].name, "X-Test");
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn target_with_query_splits_path_and_args() {
        let req = Request::new(
            "GET".to_string(),
            "/a/b?x=1&y=2".to_string(),
            Version::Http11,
            Vec::new(),
            addr(),
        );
        assert_eq!(req.path, "/a/b");
        assert_eq!(req.args, "x=1&y=2");
    }

    #[test]
    fn target_without_query_has_empty_args() {
        let req = Request::new(
            "GET".to_string(),
            "/a/b".to_string(),
            Version::Http11,
            Vec::new(),
            addr(),
        );
        assert_eq!(req.path, "/a/b");
        assert_eq!(req.args, "");
    }

    #[test]
    fn new_dispatches_fields_into_parsed() {
        let req = Request::new(
            "POST".to_string(),
            "/".to_string(),
            Version::Http11,
            vec![Field {
                name: "Content-Length".to_string(),
                value: "10".to_string(),
            }],
            addr(),
        );
        assert_eq!(req.content_length, Some(10));
        assert_eq!(req.local_addr, None);
    }
}
