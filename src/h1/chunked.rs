//! Chunked transfer-encoding framing for outbound bodies.
//!
//! A flush of `size` body bytes gets a `"\r\n{size in lowercase hex}\r\n"`
//! header prepended — but only if `size > 0`; a zero-byte non-final flush
//! needs no header at all. The very last flush additionally gets the
//! `"\r\n0\r\n\r\n"` terminator appended. There's no chunk trailer support;
//! that's out of scope.

use bytes::{BufMut, BytesMut};

const TERMINATOR: &[u8] = b"\r\n0\r\n\r\n";

/// Frame one flush of body data. `is_final` marks the last flush of a
/// response, which gets the zero-length terminating chunk appended.
#[must_use]
pub fn frame(data: &[u8], is_final: bool) -> BytesMut {
    let mut out = BytesMut::with_capacity(data.len() + 32);
    if !data.is_empty() {
        out.put_slice(format!("\r\n{:x}\r\n", data.len()).as_bytes());
        out.put_slice(data);
    }
    if is_final {
        out.put_slice(TERMINATOR);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_final_chunk_has_header_and_no_terminator() {
        let out = frame(b"hello", false);
        assert_eq!(&out[..], b"\r\n5\r\nhello".as_slice());
    }

    #[test]
    fn final_chunk_appends_terminator() {
        let out = frame(b"hi", true);
        assert_eq!(&out[..], b"\r\n2\r\nhi\r\n0\r\n\r\n".as_slice());
    }

    #[test]
    fn empty_final_flush_is_just_the_terminator() {
        let out = frame(b"", true);
        assert_eq!(&out[..], TERMINATOR);
    }

    #[test]
    fn empty_non_final_flush_produces_nothing() {
        let out = frame(b"", false);
        assert!(out.is_empty());
    }

    #[test]
    fn chunk_size_is_lowercase_hex() {
        let out = frame(&vec![0u8; 255], false);
        assert!(out.starts_with(b"\r\nff\r\n"));
    }
}
