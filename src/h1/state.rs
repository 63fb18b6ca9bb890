//! The per-connection HTTP/1.1 state machine.
//!
//! [`H1State`] drives one connection from [`State::Idle`] through header
//! read, body read, application hand-off, response send, and finally
//! either [`State::Keepalive`] (loop back to [`State::ReadHeader`]) or
//! [`State::Close`]. It owns no I/O itself — it's generic over [`Conn`],
//! a minimal non-blocking read/write trait standing in for the real
//! event-driven reactor (out of scope for this crate; see spec.md §1).
//! A caller (the reactor) drives it by calling `on_readable`/`on_writable`
//! when the underlying socket becomes ready, `on_timeout` when an armed
//! timer fires, and `respond` once the application has built a
//! [`Response`].
//!
//! Two implementation choices depart from a literal transliteration,
//! matching the alternative the design notes explicitly offer (spec.md
//! §9, "Handler chains"):
//!
//! - Header buffer growth is modeled as one `BytesMut` whose capacity is
//!   grown in `large_header_buffer_size` increments up to the configured
//!   cap, rather than a chain of discrete fixed buffers — `BytesMut`
//!   already owns the copy-on-grow the original's buffer-chain-and-copy
//!   scheme exists to implement by hand.
//! - `Send-Header`/`Send-Body` are collapsed into one composed output
//!   buffer (the application hands back a complete `Response`, not a
//!   stream), with `header_len` marking the boundary so the state still
//!   visibly passes through both states for the duration of one write
//!   loop.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use crate::h1::chunked;
use crate::h1::config::SocketConfig;
use crate::h1::parser::{self, ParseError, ParseOutcome};
use crate::h1::request::{Request, Response, TransferEncoding, Version};
use crate::h1::response;

/// Non-blocking connection I/O, provided by the reactor this engine plugs
/// into. `read`/`write` follow [`std::io::Read`]/[`std::io::Write`]
/// conventions: `Ok(0)` means the peer closed its half, and
/// `Err(ErrorKind::WouldBlock)` means "nothing to do right now, call me
/// again once the reactor says this connection is ready."
pub trait Conn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
    /// Best-effort hint: more bytes are already known to be waiting
    /// without having to wait for another reactor readiness event. Used
    /// only to decide, on a keepalive reset, whether to re-enter
    /// `Read-Header` immediately or fall back to `Idle`.
    fn is_readable(&self) -> bool;
    /// Enable `TCP_NODELAY`. Called at most once per connection, on the
    /// first keepalive transition.
    fn set_nodelay(&mut self);
}

/// Connection state, named after the table in spec.md §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    ReadHeader,
    Dispatch,
    ReadBody,
    AwaitApp,
    SendHeader,
    SendBody,
    RequestClose,
    Keepalive,
    Close,
}

/// Which configured interval applies to the current state, for a reactor
/// to arm/reset a timer against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKey {
    Idle,
    HeaderRead,
    BodyRead,
    Send,
}

/// What a handler did. `Suspended` means the engine registered a read,
/// write, or wait for the application and returned; `Closed` means the
/// connection is done and the reactor should tear it down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Suspended,
    Closed,
}

fn would_block(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
}

/// Per-connection H1 protocol state.
pub struct H1State<C> {
    conn: C,
    config: SocketConfig,
    state: State,
    peer_addr: SocketAddr,
    header_buf: BytesMut,
    large_buffers_used: usize,
    request: Option<Request>,
    body_buf: Option<BytesMut>,
    body_target: usize,
    keepalive: bool,
    tcp_nodelay_set: bool,
    out_buf: BytesMut,
    out_pos: usize,
    header_len: usize,
}

impl<C: Conn> H1State<C> {
    #[must_use]
    pub fn new(conn: C, config: SocketConfig, peer_addr: SocketAddr) -> Self {
        let header_buf = BytesMut::with_capacity(config.header_buffer_size);
        Self {
            conn,
            config,
            state: State::Idle,
            peer_addr,
            header_buf,
            large_buffers_used: 0,
            request: None,
            body_buf: None,
            body_target: 0,
            keepalive: false,
            tcp_nodelay_set: false,
            out_buf: BytesMut::new(),
            out_pos: 0,
            header_len: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn conn(&self) -> &C {
        &self.conn
    }

    /// The timeout a reactor should currently have armed for this
    /// connection, if any.
    #[must_use]
    pub fn current_timeout(&self) -> Option<(TimeoutKey, Duration)> {
        match self.state {
            State::Idle => Some((TimeoutKey::Idle, self.config.idle_timeout)),
            State::ReadHeader => Some((TimeoutKey::HeaderRead, self.config.header_read_timeout)),
            State::ReadBody => Some((TimeoutKey::BodyRead, self.config.body_read_timeout)),
            State::SendHeader | State::SendBody => Some((TimeoutKey::Send, self.config.send_timeout)),
            _ => None,
        }
    }

    fn current_header_limit(&self) -> usize {
        self.config.header_buffer_size + self.large_buffers_used * self.config.large_header_buffer_size
    }

    /// The reactor calls this when the socket becomes readable.
    pub fn on_readable(&mut self) -> Progress {
        match self.state {
            State::Idle => {
                self.state = State::ReadHeader;
                self.read_header_loop()
            }
            State::ReadHeader => self.read_header_loop(),
            State::ReadBody => self.read_body_loop(),
            _ => Progress::Continue,
        }
    }

    /// The reactor calls this when the socket becomes writable.
    pub fn on_writable(&mut self) -> Progress {
        match self.state {
            State::SendHeader | State::SendBody => self.flush_output(),
            _ => Progress::Continue,
        }
    }

    /// The reactor calls this when the timer named by `key` fires.
    /// Timers for `BodyRead`/`Send` are expected to be re-armed by the
    /// reactor after every partial-progress `Suspended` return, per
    /// spec.md §4.6 (`timer_autoreset`).
    pub fn on_timeout(&mut self, key: TimeoutKey) -> Progress {
        match (self.state, key) {
            (State::Idle, TimeoutKey::Idle) => {
                trace!("idle timeout, closing");
                self.close()
            }
            (State::ReadHeader, TimeoutKey::HeaderRead) => {
                warn!("header read timeout");
                self.fail_with(408)
            }
            (State::ReadBody, TimeoutKey::BodyRead) => {
                warn!("body read timeout");
                self.fail_with(408)
            }
            (State::SendHeader | State::SendBody, TimeoutKey::Send) => {
                warn!("send timeout, no way to recover the response");
                self.close()
            }
            _ => Progress::Continue,
        }
    }

    /// The application calls this once it has built a [`Response`] for
    /// the currently active request (i.e. while `state() == AwaitApp`).
    pub fn respond(&mut self, resp: Response) -> Progress {
        let req = self
            .request
            .as_ref()
            .expect("respond called without an active request");
        let version = req.version;
        let requested_keepalive = self.keepalive;
        self.begin_response(version, requested_keepalive, resp);
        self.flush_output()
    }

    /// A transport error (read or write failed outright, not just
    /// `WouldBlock`) was observed by the reactor. Funnels into the same
    /// close path timeouts and peer-EOF use (spec.md §5, "Cancellation").
    pub fn on_error(&mut self) -> Progress {
        self.on_peer_close()
    }

    /// Explicit close request (e.g. the reactor is shutting down). If a
    /// request is active, it gets a best-effort response first.
    pub fn close(&mut self) -> Progress {
        if self.state != State::Close {
            debug!(?self.state, "closing connection");
        }
        self.state = State::Close;
        Progress::Closed
    }

    fn on_peer_close(&mut self) -> Progress {
        let mid_response = matches!(self.state, State::SendHeader | State::SendBody);
        if self.request.is_some() && !mid_response {
            return self.fail_with(500);
        }
        self.close()
    }

    fn read_header_loop(&mut self) -> Progress {
        loop {
            match parser::parse(&self.header_buf) {
                ParseOutcome::Done { request, consumed } => {
                    let mut buf = std::mem::take(&mut self.header_buf);
                    let tail = buf.split_off(consumed);
                    self.header_buf = tail;
                    let req = Request::new(
                        request.method,
                        request.target,
                        request.version,
                        request.fields,
                        self.peer_addr,
                    );
                    trace!(method = %req.method, target = %req.target, "request parsed");
                    self.request = Some(req);
                    return self.dispatch();
                }
                ParseOutcome::Error(e) => {
                    let status = match e {
                        ParseError::BadRequest => 400,
                        ParseError::UnsupportedVersion => 505,
                        ParseError::TooManyHeaders => 431,
                    };
                    warn!(?e, "header parse error");
                    return self.fail_with(status);
                }
                ParseOutcome::Again => {
                    if self.header_buf.len() >= self.current_header_limit() {
                        if self.large_buffers_used >= self.config.large_header_buffers {
                            warn!("header growth cap exceeded");
                            return self.fail_with(431);
                        }
                        self.large_buffers_used += 1;
                        trace!(large_buffers_used = self.large_buffers_used, "growing header buffer");
                        continue;
                    }
                    match self.read_more_header_bytes() {
                        Ok(0) => return self.on_peer_close(),
                        Ok(_) => continue,
                        Err(e) if would_block(&e) => return Progress::Suspended,
                        Err(_) => return self.on_peer_close(),
                    }
                }
            }
        }
    }

    fn read_more_header_bytes(&mut self) -> io::Result<usize> {
        let limit = self.current_header_limit();
        let room = limit.saturating_sub(self.header_buf.len()).max(1);
        let mut tmp = vec![0u8; room];
        let n = self.conn.read(&mut tmp)?;
        self.header_buf.extend_from_slice(&tmp[..n]);
        Ok(n)
    }

    fn dispatch(&mut self) -> Progress {
        self.state = State::Dispatch;
        let req = self.request.as_ref().expect("dispatch without request");
        let default_keepalive = req.version.keepalive_by_default();
        self.keepalive = if req.parsed.connection_close {
            false
        } else {
            default_keepalive
        };

        match req.parsed.transfer_encoding {
            TransferEncoding::Chunked => return self.fail_with(411),
            TransferEncoding::Unsupported => return self.fail_with(501),
            TransferEncoding::None => {}
        }

        let content_length = req.content_length.unwrap_or(0);
        if content_length == 0 {
            self.state = State::AwaitApp;
            return Progress::Suspended;
        }
        if content_length > self.config.max_body_size {
            self.keepalive = false;
            return self.fail_with(413);
        }

        let mut tail = std::mem::take(&mut self.header_buf);
        let take = (content_length as usize).min(tail.len());
        let body_part = tail.split_to(take);
        self.header_buf = tail;

        let mut body_buf = BytesMut::with_capacity(content_length as usize);
        body_buf.extend_from_slice(&body_part);
        let complete = body_buf.len() as u64 == content_length;
        self.body_buf = Some(body_buf);
        self.body_target = content_length as usize;

        if complete {
            self.finish_body();
            self.state = State::AwaitApp;
            Progress::Suspended
        } else {
            self.state = State::ReadBody;
            self.read_body_loop()
        }
    }

    fn read_body_loop(&mut self) -> Progress {
        loop {
            let have = self.body_buf.as_ref().map_or(0, BytesMut::len);
            if have >= self.body_target {
                self.finish_body();
                self.state = State::AwaitApp;
                return Progress::Suspended;
            }
            let room = self.body_target - have;
            let mut tmp = vec![0u8; room];
            match self.conn.read(&mut tmp) {
                Ok(0) => return self.on_peer_close(),
                Ok(n) => {
                    self.body_buf.as_mut().expect("body_buf set in dispatch").extend_from_slice(&tmp[..n]);
                }
                Err(e) if would_block(&e) => return Progress::Suspended,
                Err(_) => return self.on_peer_close(),
            }
        }
    }

    fn finish_body(&mut self) {
        if let Some(buf) = self.body_buf.take() {
            if let Some(req) = self.request.as_mut() {
                req.body = Some(buf.freeze());
            }
        }
    }

    fn begin_response(&mut self, version: Version, requested_keepalive: bool, resp: Response) {
        let framing = response::framing(&resp, version, requested_keepalive);
        self.keepalive = framing.keepalive;
        let mut buf = BytesMut::new();
        response::serialize_header(&resp, version, framing, &mut buf);
        self.header_len = buf.len();
        if framing.chunked {
            buf.unsplit(chunked::frame(&resp.body, true));
        } else {
            buf.extend_from_slice(&resp.body);
        }
        self.out_buf = buf;
        self.out_pos = 0;
        self.state = State::SendHeader;
    }

    fn fail_with(&mut self, status: u16) -> Progress {
        let version = self.request.as_ref().map_or(Version::Http11, |r| r.version);
        let mut resp = Response::new(status);
        resp.push_field("Content-Length", "0");
        resp.close = Some(true);
        self.begin_response(version, false, resp);
        self.flush_output()
    }

    fn flush_output(&mut self) -> Progress {
        loop {
            if self.out_pos >= self.out_buf.len() {
                return self.request_close();
            }
            if self.state == State::SendHeader && self.out_pos >= self.header_len {
                self.state = State::SendBody;
            }
            match self.conn.write(&self.out_buf[self.out_pos..]) {
                Ok(0) => return self.on_peer_close(),
                Ok(n) => self.out_pos += n,
                Err(e) if would_block(&e) => return Progress::Suspended,
                Err(_) => return self.on_peer_close(),
            }
        }
    }

    fn request_close(&mut self) -> Progress {
        self.state = State::RequestClose;
        if self.keepalive {
            self.enter_keepalive()
        } else {
            self.close()
        }
    }

    fn enter_keepalive(&mut self) -> Progress {
        self.request = None;
        self.body_buf = None;
        self.body_target = 0;
        self.large_buffers_used = 0;
        self.out_buf = BytesMut::new();
        self.out_pos = 0;
        self.header_len = 0;

        if !self.tcp_nodelay_set {
            self.conn.set_nodelay();
            self.tcp_nodelay_set = true;
        }

        self.state = State::Keepalive;
        if !self.header_buf.is_empty() {
            trace!("pipelined bytes present, re-parsing synchronously");
            self.state = State::ReadHeader;
            self.read_header_loop()
        } else if self.conn.is_readable() {
            self.state = State::ReadHeader;
            self.on_readable()
        } else {
            self.state = State::Idle;
            Progress::Suspended
        }
    }
}
