//! An arena-free, allocation-light HTTP/1.1 connection engine: parse a
//! request line and headers, decide how (or whether) to read a body,
//! hand the request to an application, and frame whatever response
//! comes back. See [`state::H1State`] for the state machine that ties
//! the rest of this module together.

pub mod chunked;
pub mod config;
pub mod fields;
pub mod parser;
pub mod request;
pub mod response;
pub mod state;
pub mod status;

pub use config::SocketConfig;
pub use request::{Field, ParsedFields, Request, Response, TransferEncoding, Version};
pub use state::{Conn, H1State, Progress, State, TimeoutKey};
