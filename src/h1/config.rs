//! Per-listener socket configuration consumed by the connection engine.
//!
//! Mirrors the subset of `nxt_socket_conf_t` the H1 engine actually reads
//! (`joint->socket_conf->header_buffer_size` and its neighbors throughout
//! `nxt_h1proto.c`); the rest of that struct (TLS, listen address) belongs
//! to the out-of-scope reactor/listener layer.

use std::time::Duration;

/// Socket-level tunables the connection engine reads when sizing buffers
/// and arming timers. Loaded by value, not reparsed per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConfig {
    /// Initial header buffer size.
    pub header_buffer_size: usize,
    /// Size of each buffer minted once the initial header buffer fills.
    pub large_header_buffer_size: usize,
    /// Hard cap on how many large header buffers a connection may grow
    /// through before the request is rejected with 431.
    pub large_header_buffers: usize,
    /// Largest `Content-Length` the engine will allocate a body buffer for.
    pub max_body_size: u64,
    /// Timeout while waiting for the first byte of a new request.
    pub idle_timeout: Duration,
    /// Timeout while reading/growing the header buffer.
    pub header_read_timeout: Duration,
    /// Timeout while reading the body, reset on every partial read.
    pub body_read_timeout: Duration,
    /// Timeout while writing the response, reset on every partial write.
    pub send_timeout: Duration,
}

impl Default for SocketConfig {
    /// The same defaults the protocol engine this is modeled on ships:
    /// an 8 KiB header buffer, up to 16 large (8 KiB) growth buffers, and a
    /// 2 MiB body cap.
    fn default() -> Self {
        Self {
            header_buffer_size: 8 * 1024,
            large_header_buffer_size: 8 * 1024,
            large_header_buffers: 16,
            max_body_size: 2 * 1024 * 1024,
            idle_timeout: Duration::from_secs(180),
            header_read_timeout: Duration::from_secs(30),
            body_read_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(30),
        }
    }
}

impl SocketConfig {
    /// Total header bytes a connection may accumulate before 431 fires:
    /// the initial buffer plus every large buffer it's allowed to grow
    /// into.
    #[must_use]
    pub fn max_header_bytes(&self) -> usize {
        self.header_buffer_size + self.large_header_buffers * self.large_header_buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_constants() {
        let cfg = SocketConfig::default();
        assert_eq!(cfg.header_buffer_size, 8192);
        assert_eq!(cfg.large_header_buffers, 16);
        assert_eq!(cfg.max_body_size, 2 * 1024 * 1024);
    }

    #[test]
    fn max_header_bytes_sums_initial_and_growth() {
        let cfg = SocketConfig {
            header_buffer_size: 100,
            large_header_buffer_size: 50,
            large_header_buffers: 3,
            ..SocketConfig::default()
        };
        assert_eq!(cfg.max_header_bytes(), 100 + 3 * 50);
    }
}
