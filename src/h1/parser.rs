//! Drives the external request-line/header tokenizer (`httparse`) and
//! turns its output into this crate's own [`Field`]/[`Version`] types.
//!
//! This module *is* the "H1 parser driver" of spec §2: it owns the
//! `init`/`parse` call pattern (one `httparse::Request` per attempt, fed
//! the buffer accumulated so far) but never decides what to do with a
//! parsed request — that's [`crate::h1::state`]'s job.

use thiserror::Error;

use crate::h1::request::{Field, Version};

/// Headers buffer size handed to `httparse`. A request with more header
/// lines than this fails with [`ParseError::TooManyHeaders`] rather than
/// growing, matching the fixed-size header arrays the tokenizer this is
/// modeled on uses internally.
const MAX_HEADERS: usize = 64;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed request line or header syntax.
    #[error("malformed request line or headers")]
    BadRequest,
    /// HTTP version token the engine doesn't understand (not 1.0/1.1).
    #[error("unsupported HTTP version")]
    UnsupportedVersion,
    /// More header lines than `httparse` was given room for.
    #[error("too many header fields")]
    TooManyHeaders,
}

/// A successfully parsed request line plus its header fields.
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: Version,
    pub fields: Vec<Field>,
}

/// Result of one `parse` attempt against the bytes accumulated so far.
pub enum ParseOutcome {
    /// A complete request line and header block were found; `consumed` is
    /// the number of bytes of `buf` they occupied (the body, if any,
    /// starts at that offset).
    Done {
        request: RequestLine,
        consumed: usize,
    },
    /// Not enough bytes yet to know; the caller should read more and
    /// retry, or grow the header buffer if it's already full.
    Again,
    Error(ParseError),
}

/// Attempt to parse a complete request line + header block out of `buf`.
#[must_use]
pub fn parse(buf: &[u8]) -> ParseOutcome {
    let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut header_storage);
    match req.parse(buf) {
        Ok(httparse::Status::Complete(consumed)) => {
            let version = match req.version {
                Some(0) => Version::Http10,
                Some(1) => Version::Http11,
                _ => return ParseOutcome::Error(ParseError::UnsupportedVersion),
            };
            let method = req.method.unwrap_or_default().to_string();
            let target = req.path.unwrap_or_default().to_string();
            let fields = req
                .headers
                .iter()
                .map(|h| Field {
                    name: h.name.to_string(),
                    value: String::from_utf8_lossy(h.value).into_owned(),
                })
                .collect();
            ParseOutcome::Done {
                request: RequestLine {
                    method,
                    target,
                    version,
                    fields,
                },
                consumed,
            }
        }
        Ok(httparse::Status::Partial) => ParseOutcome::Again,
        Err(httparse::Error::TooManyHeaders) => ParseOutcome::Error(ParseError::TooManyHeaders),
        Err(httparse::Error::Version) => ParseOutcome::Error(ParseError::UnsupportedVersion),
        Err(_) => ParseOutcome::Error(ParseError::BadRequest),
    }
}
