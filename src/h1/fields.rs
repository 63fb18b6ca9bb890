//! Header-field dispatch: a handful of field names the engine itself
//! cares about (`Connection`, `Transfer-Encoding`, `Host`, `Cookie`,
//! `Content-Type`, `Content-Length`) get picked out of the field list by a
//! name hash and folded into [`ParsedFields`](crate::h1::request::ParsedFields)
//! as the header block is parsed, one pass, no further scanning needed
//! once the full field list is dispatched.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::h1::request::{Field, ParsedFields, TransferEncoding};

type Handler = fn(&mut ParsedFields, &str);

fn connection(parsed: &mut ParsedFields, value: &str) {
    if value.eq_ignore_ascii_case("close") {
        parsed.connection_close = true;
    }
}

fn transfer_encoding(parsed: &mut ParsedFields, value: &str) {
    parsed.transfer_encoding = if value.eq_ignore_ascii_case("chunked") {
        TransferEncoding::Chunked
    } else {
        TransferEncoding::Unsupported
    };
}

fn host(parsed: &mut ParsedFields, value: &str) {
    parsed.host = Some(value.to_owned());
}

fn cookie(parsed: &mut ParsedFields, value: &str) {
    parsed.cookie = Some(value.to_owned());
}

fn content_type(parsed: &mut ParsedFields, value: &str) {
    parsed.content_type = Some(value.to_owned());
}

fn content_length(parsed: &mut ParsedFields, value: &str) {
    // An unparsable Content-Length is left as None; the caller treats a
    // missing length the same as an absent field (no body expected).
    parsed.content_length = value.trim().parse().ok();
}

static FIELDS: LazyLock<HashMap<&'static str, Handler>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Handler> = HashMap::new();
    m.insert("connection", connection);
    m.insert("transfer-encoding", transfer_encoding);
    m.insert("host", host);
    m.insert("cookie", cookie);
    m.insert("content-type", content_type);
    m.insert("content-length", content_length);
    m
});

/// Run every field in `fields` through the dispatch table, building up a
/// [`ParsedFields`].
#[must_use]
pub fn dispatch(fields: &[Field]) -> ParsedFields {
    let mut parsed = ParsedFields::default();
    for field in fields {
        if let Some(handler) = lookup(&field.name) {
            handler(&mut parsed, &field.value);
        }
    }
    parsed
}

fn lookup(name: &str) -> Option<Handler> {
    // Field names arrive with whatever case the client sent; the lookup
    // table is keyed lowercase, so compare case-insensitively without
    // allocating for the common short-name case.
    let mut buf = [0u8; 32];
    if name.len() > buf.len() {
        return None;
    }
    for (dst, src) in buf.iter_mut().zip(name.bytes()) {
        *dst = src.to_ascii_lowercase();
    }
    std::str::from_utf8(&buf[..name.len()])
        .ok()
        .and_then(|lower| FIELDS.get(lower))
        .copied()
}
