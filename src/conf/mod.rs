//! A JSON-like configuration value tree: parse bytes into an arena-backed
//! [`Value`], print it back out, and apply single-path structural edits
//! without mutating the original tree.

pub mod edit;
pub mod parser;
pub mod printer;
pub mod value;

pub use edit::{edit, Action, EditError, OpChain, OpNode};
pub use parser::{parse, djb_hash, ConfError};
pub use printer::{emit_into, print, size, Style};
pub use value::{Member, ShortStr, Str, Value, SHORT_STR_LEN};
