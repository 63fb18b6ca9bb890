//! Status-line text for every status code the engine itself ever sets,
//! plus a fallback formatter for whatever an application hands back.
//!
//! Verbatim from the reason phrases this protocol engine is modeled on,
//! including the placeholder-only lines for 418-430 (no standard reason
//! phrase is assigned to them here).

const SUCCESS: &[&str] = &[
    "HTTP/1.1 200 OK\r\n",
    "HTTP/1.1 201 Created\r\n",
    "HTTP/1.1 202 Accepted\r\n",
    "HTTP/1.1 203 Non-Authoritative Information\r\n",
    "HTTP/1.1 204 No Content\r\n",
    "HTTP/1.1 205 Reset Content\r\n",
    "HTTP/1.1 206 Partial Content\r\n",
];

const REDIRECTION: &[&str] = &[
    "HTTP/1.1 300 Multiple Choices\r\n",
    "HTTP/1.1 301 Moved Permanently\r\n",
    "HTTP/1.1 302 Found\r\n",
    "HTTP/1.1 303 See Other\r\n",
    "HTTP/1.1 304 Not Modified\r\n",
];

const CLIENT_ERROR: &[&str] = &[
    "HTTP/1.1 400 Bad Request\r\n",
    "HTTP/1.1 401 Unauthorized\r\n",
    "HTTP/1.1 402 Payment Required\r\n",
    "HTTP/1.1 403 Forbidden\r\n",
    "HTTP/1.1 404 Not Found\r\n",
    "HTTP/1.1 405 Method Not Allowed\r\n",
    "HTTP/1.1 406 Not Acceptable\r\n",
    "HTTP/1.1 407 Proxy Authentication Required\r\n",
    "HTTP/1.1 408 Request Timeout\r\n",
    "HTTP/1.1 409 Conflict\r\n",
    "HTTP/1.1 410 Gone\r\n",
    "HTTP/1.1 411 Length Required\r\n",
    "HTTP/1.1 412 Precondition Failed\r\n",
    "HTTP/1.1 413 Payload Too Large\r\n",
    "HTTP/1.1 414 URI Too Long\r\n",
    "HTTP/1.1 415 Unsupported Media Type\r\n",
    "HTTP/1.1 416 Range Not Satisfiable\r\n",
    "HTTP/1.1 417 Expectation Failed\r\n",
    "HTTP/1.1 418\r\n",
    "HTTP/1.1 419\r\n",
    "HTTP/1.1 420\r\n",
    "HTTP/1.1 421\r\n",
    "HTTP/1.1 422\r\n",
    "HTTP/1.1 423\r\n",
    "HTTP/1.1 424\r\n",
    "HTTP/1.1 425\r\n",
    "HTTP/1.1 426\r\n",
    "HTTP/1.1 427\r\n",
    "HTTP/1.1 428\r\n",
    "HTTP/1.1 429\r\n",
    "HTTP/1.1 430\r\n",
    "HTTP/1.1 431 Request Header Fields Too Large\r\n",
];

const SERVER_ERROR: &[&str] = &[
    "HTTP/1.1 500 Internal Server Error\r\n",
    "HTTP/1.1 501 Not Implemented\r\n",
    "HTTP/1.1 502 Bad Gateway\r\n",
    "HTTP/1.1 503 Service Unavailable\r\n",
    "HTTP/1.1 504 Gateway Timeout\r\n",
    "HTTP/1.1 505 HTTP Version Not Supported\r\n",
];

/// The status line (including trailing CRLF) for `code`, looked up in the
/// tables above when known, or synthesized as `HTTP/1.1 NNN\r\n` otherwise.
#[must_use]
pub fn status_line(code: u16) -> std::borrow::Cow<'static, str> {
    let table = match code {
        200..=299 => Some((SUCCESS, 200)),
        300..=399 => Some((REDIRECTION, 300)),
        400..=499 => Some((CLIENT_ERROR, 400)),
        500..=599 => Some((SERVER_ERROR, 500)),
        _ => None,
    };
    if let Some((table, base)) = table {
        let idx = (code - base) as usize;
        if let Some(line) = table.get(idx) {
            return std::borrow::Cow::Borrowed(line);
        }
    }
    std::borrow::Cow::Owned(format!("HTTP/1.1 {code:03}\r\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_use_the_table() {
        assert_eq!(status_line(200), "HTTP/1.1 200 OK\r\n");
        assert_eq!(status_line(404), "HTTP/1.1 404 Not Found\r\n");
        assert_eq!(
            status_line(431),
            "HTTP/1.1 431 Request Header Fields Too Large\r\n"
        );
        assert_eq!(status_line(505), "HTTP/1.1 505 HTTP Version Not Supported\r\n");
    }

    #[test]
    fn placeholder_codes_have_no_reason_phrase() {
        assert_eq!(status_line(422), "HTTP/1.1 422\r\n");
    }

    #[test]
    fn unknown_codes_fall_back_to_synthesized_line() {
        assert_eq!(status_line(599), "HTTP/1.1 599\r\n");
        assert_eq!(status_line(999), "HTTP/1.1 999\r\n");
        assert_eq!(status_line(150), "HTTP/1.1 150\r\n");
    }
}
