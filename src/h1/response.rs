//! Response header serialisation and body-framing decisions.
//!
//! [`framing`] decides, once per request, whether the body will be
//! `Content-Length`-delimited (the application set the field itself),
//! `Transfer-Encoding: chunked`-framed, or — on HTTP/1.0 with neither —
//! sent as bare bytes followed by a forced connection close. [`serialize_header`]
//! then writes the status line, the application's fields, and the
//! connection/framing lines the engine itself owns.

use bytes::{BufMut, BytesMut};

use crate::h1::request::{Field, Response, Version};
use crate::h1::status::status_line;

/// How the body of this response will be delimited, and whether the
/// connection survives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    pub chunked: bool,
    pub keepalive: bool,
}

fn has_content_length(fields: &[Field]) -> bool {
    fields.iter().any(|f| f.name.eq_ignore_ascii_case("content-length"))
}

/// Decide how to frame `resp`'s body for a request of `version`, honoring
/// any explicit override the application set via [`Response::close`] and
/// whether the request asked for `Connection: close`.
///
/// - A response with its own `Content-Length` field is length-delimited;
///   keepalive follows the requested default.
/// - Without one, HTTP/1.1 falls back to chunked framing; HTTP/1.0 has no
///   way to delimit an unbounded body at all, so the connection is forced
///   closed instead (scenario in spec §8.5).
#[must_use]
pub fn framing(resp: &Response, version: Version, requested_keepalive: bool) -> Framing {
    if has_content_length(&resp.fields) {
        return Framing {
            chunked: false,
            keepalive: resp.close.map_or(requested_keepalive, |close| !close),
        };
    }
    match version {
        Version::Http11 => Framing {
            chunked: true,
            keepalive: resp.close.map_or(requested_keepalive, |close| !close),
        },
        Version::Http10 => Framing {
            chunked: false,
            keepalive: false,
        },
    }
}

/// Serialise the status line, application fields, and the engine's own
/// `Connection`/`Transfer-Encoding` lines into `buf`. Does not write the
/// body; for chunked framing the header block is deliberately left
/// without its own trailing blank line (see [`crate::h1::chunked`]).
pub fn serialize_header(resp: &Response, version: Version, framing: Framing, buf: &mut BytesMut) {
    buf.put_slice(status_line(resp.status).as_bytes());
    for field in &resp.fields {
        buf.put_slice(field.name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(field.value.as_bytes());
        buf.put_slice(b"\r\n");
    }
    let default_keepalive = version.keepalive_by_default();
    if framing.keepalive != default_keepalive {
        if framing.keepalive {
            buf.put_slice(b"Connection: keep-alive\r\n");
        } else {
            buf.put_slice(b"Connection: close\r\n");
        }
    }
    if framing.chunked {
        buf.put_slice(b"Transfer-Encoding: chunked\r\n");
    } else {
        buf.put_slice(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(status: u16) -> Response {
        Response::new(status)
    }

    #[test]
    fn framing_prefers_content_length_when_present() {
        let mut r = resp(200);
        r.push_field("Content-Length", "5");
        let f = framing(&r, Version::Http11, true);
        assert!(!f.chunked);
        assert!(f.keepalive);
    }

    #[test]
    fn http11_without_content_length_is_chunked() {
        let r = resp(200);
        let f = framing(&r, Version::Http11, true);
        assert!(f.chunked);
        assert!(f.keepalive);
    }

    #[test]
    fn http10_without_content_length_forces_close() {
        let r = resp(200);
        let f = framing(&r, Version::Http10, false);
        assert!(!f.chunked);
        assert!(!f.keepalive);
    }

    #[test]
    fn response_close_override_wins_over_request_default() {
        let mut r = resp(200);
        r.push_field("Content-Length", "0");
        r.close = Some(true); // explicit request to close
        let f = framing(&r, Version::Http11, true);
        assert!(!f.keepalive);
    }

    #[test]
    fn connection_header_omitted_when_it_matches_the_default() {
        let mut r = resp(200);
        r.push_field("Content-Length", "0");
        let f = framing(&r, Version::Http11, true);
        let mut buf = BytesMut::new();
        serialize_header(&r, Version::Http11, f, &mut buf);
        assert!(!String::from_utf8_lossy(&buf).contains("Connection:"));
    }

    #[test]
    fn connection_close_emitted_when_it_disagrees_with_default() {
        let mut r = resp(200);
        r.push_field("Content-Length", "0");
        let f = framing(&r, Version::Http11, false);
        let mut buf = BytesMut::new();
        serialize_header(&r, Version::Http11, f, &mut buf);
        assert!(String::from_utf8_lossy(&buf).contains("Connection: close\r\n"));
    }

    #[test]
    fn chunked_header_has_no_trailing_blank_line() {
        let r = resp(200);
        let f = framing(&r, Version::Http11, true);
        let mut buf = BytesMut::new();
        serialize_header(&r, Version::Http11, f, &mut buf);
        assert!(String::from_utf8_lossy(&buf).ends_with("Transfer-Encoding: chunked\r\n"));
    }

    #[test]
    fn status_line_and_fields_appear_in_order() {
        let mut r = resp(404);
        r.push_field("Content-Length", "0");
        r.push_field("X-Test", "1");
        let f = framing(&r, Version::Http11, true);
        let mut buf = BytesMut::new();
        serialize_header(&r, Version::Http11, f, &mut buf);
        let text = String::from_utf8_lossy(&buf);
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 0\r\nX-Test: 1\r\n"));
    }
}
