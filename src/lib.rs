//! `h1edge` - an arena-backed HTTP/1.1 connection engine and a JSON-like
//! configuration value tree.
//!
//! # Modules
//!
//! - [`arena`]: the bump allocator [`conf`] allocates its value trees from.
//! - [`conf`]: parse/print/edit a textual configuration tree.
//! - [`h1`]: drive a single HTTP/1.1 connection's state machine.
//!
//! # Example
//!
//! ```rust
//! use h1edge::arena::Arena;
//! use h1edge::conf::{parse, print, Style};
//!
//! let arena = Arena::new();
//! let tree = parse(br#"{"a":1,"b":[true,null]}"#, &arena).unwrap();
//! assert_eq!(print(&tree, Style::Compact), r#"{"a":1,"b":[true,null]}"#);
//! ```

pub mod arena;
pub mod conf;
pub mod h1;

pub use arena::Arena;
pub use conf::{Action, ConfError, EditError, Member, OpChain, OpNode, ShortStr, Str, Style, Value};
pub use h1::{Conn, H1State, Progress, Request, Response, SocketConfig, State, TimeoutKey};

/// Crate version, exposed the way the engine this is modeled on exposes its
/// own build identifier.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
