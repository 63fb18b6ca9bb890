//! Structural edits against a [`Value`] tree.
//!
//! An edit names a slash-delimited path and an optional replacement value
//! (`None` means delete). [`compile`] walks the *old* tree to resolve that
//! path into a chain of [`OpNode`]s — one `Pass` per intermediate object
//! level, terminated by a `Create`, `Replace`, or `Delete` — without
//! touching the tree itself. [`apply`] then deep-clones the old tree once,
//! consuming the chain as it goes: every member not on the path is copied
//! verbatim, and the one member the chain names is created, replaced, or
//! dropped. A compiled chain is single-use; apply it once, against the
//! tree it was compiled from.

use crate::arena::Arena;
use crate::conf::value::{Member, Str, Value};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum EditError {
    /// A non-terminal path segment doesn't exist, or the terminal segment
    /// doesn't exist for a delete.
    #[error("path segment not found")]
    Declined,
    /// A `Pass`, `Replace`, `Delete` or `Create` op landed on a value that
    /// isn't an object; edits only compose against objects.
    #[error("edit target is not an object")]
    NotAnObject,
}

pub type Result<T> = std::result::Result<T, EditError>;

/// What to do at one index of an object's member array.
pub enum Action<'a> {
    /// Copy this member's value as-is but keep walking into it with `next`.
    Pass(&'a OpNode<'a>),
    /// Append a brand new member (always at the end, never at the path's
    /// nominal position — matching how the original clone algorithm this
    /// is grounded on appends created members).
    Create(Member<'a>),
    /// Replace this member's value, keeping its name.
    Replace(Value<'a>),
    /// Drop this member entirely.
    Delete,
}

/// One node of a compiled edit chain.
pub struct OpNode<'a> {
    /// Index into the *old* object's member array this op concerns.
    /// Meaningless for `Create`, which always appends.
    pub index: usize,
    pub action: Action<'a>,
}

/// A compiled, not-yet-applied edit.
pub type OpChain<'a> = &'a OpNode<'a>;

fn member_index(value: &Value<'_>, name: &str) -> Option<usize> {
    match value {
        Value::Object(members) => members.iter().position(|m| m.name.as_str() == name),
        _ => None,
    }
}

/// Compile `path` (which must start with `/`) against `root` into an edit
/// chain. `new_value: None` compiles a delete; `Some(v)` compiles a
/// replace (if the path already exists) or a create (if it doesn't).
///
/// Does not allocate anything but the chain itself (into `arena`) — it
/// only ever reads `root`.
pub fn compile<'a>(
    root: &Value<'_>,
    path: &str,
    new_value: Option<Value<'a>>,
    arena: &'a Arena,
) -> Result<OpChain<'a>> {
    assert!(path.starts_with('/'), "edit path must start with '/'");
    trace!(path, "compiling edit op chain");
    let tokens: Vec<&str> = path[1..].split('/').collect();
    compile_segment(root, &tokens, new_value, arena)
}

fn compile_segment<'a>(
    object: &Value<'_>,
    tokens: &[&str],
    new_value: Option<Value<'a>>,
    arena: &'a Arena,
) -> Result<OpChain<'a>> {
    let token = tokens[0];
    let found = member_index(object, token);

    if tokens.len() > 1 {
        let idx = found.ok_or_else(|| {
            trace!(segment = token, "edit path segment not found, declining");
            EditError::Declined
        })?;
        let members = object.as_object().expect("member_index found an index");
        let sub = compile_segment(&members[idx].value, &tokens[1..], new_value, arena)?;
        return Ok(arena.alloc(OpNode {
            index: idx,
            action: Action::Pass(sub),
        }));
    }

    match new_value {
        None => {
            let idx = found.ok_or_else(|| {
                trace!(segment = token, "delete target not found, declining");
                EditError::Declined
            })?;
            Ok(arena.alloc(OpNode {
                index: idx,
                action: Action::Delete,
            }))
        }
        Some(v) => match found {
            Some(idx) => Ok(arena.alloc(OpNode {
                index: idx,
                action: Action::Replace(v),
            })),
            None => {
                let name = Str::new(arena, token);
                Ok(arena.alloc(OpNode {
                    index: 0,
                    action: Action::Create(Member { name, value: v }),
                }))
            }
        },
    }
}

/// Apply a compiled chain to `root`, producing an entirely new tree
/// allocated out of `arena`. `root` is read only; nothing in the result
/// borrows from it.
pub fn apply<'new>(root: &Value<'_>, op: OpChain<'_>, arena: &'new Arena) -> Result<Value<'new>> {
    clone(root, Some(op), arena)
}

/// Compile and apply in one step.
pub fn edit<'new>(
    root: &Value<'_>,
    path: &str,
    new_value: Option<Value<'new>>,
    arena: &'new Arena,
) -> Result<Value<'new>> {
    let op = compile(root, path, new_value, arena)?;
    apply(root, op, arena)
}

fn clone<'new>(value: &Value<'_>, op: Option<OpChain<'_>>, arena: &'new Arena) -> Result<Value<'new>> {
    if op.is_some() && !matches!(value, Value::Object(_)) {
        return Err(EditError::NotAnObject);
    }
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Number(f) => Ok(Value::Number(*f)),
        Value::Str(s) => Ok(Value::Str(Str::new(arena, s.as_str()))),
        Value::Array(elems) => {
            let mut out = Vec::with_capacity(elems.len());
            for e in *elems {
                out.push(clone(e, None, arena)?);
            }
            Ok(Value::Array(arena.alloc_slice_copy(&out)))
        }
        Value::Object(members) => clone_object(members, op, arena),
    }
}

fn clone_object<'new>(
    members: &[Member<'_>],
    op: Option<OpChain<'_>>,
    arena: &'new Arena,
) -> Result<Value<'new>> {
    let Some(node) = op else {
        let mut out = Vec::with_capacity(members.len());
        for m in members {
            out.push(clone_member(m, None, arena)?);
        }
        return Ok(Value::Object(arena.alloc_slice_copy(&out)));
    };

    let mut out = Vec::with_capacity(members.len() + 1);
    match &node.action {
        Action::Pass(sub) => {
            for (i, m) in members.iter().enumerate() {
                let op_here = if i == node.index { Some(*sub) } else { None };
                out.push(clone_member(m, op_here, arena)?);
            }
        }
        Action::Replace(new_val) => {
            for (i, m) in members.iter().enumerate() {
                if i == node.index {
                    out.push(Member {
                        name: Str::new(arena, m.name.as_str()),
                        value: clone(new_val, None, arena)?,
                    });
                } else {
                    out.push(clone_member(m, None, arena)?);
                }
            }
        }
        Action::Delete => {
            for (i, m) in members.iter().enumerate() {
                if i != node.index {
                    out.push(clone_member(m, None, arena)?);
                }
            }
        }
        Action::Create(new_member) => {
            for m in members {
                out.push(clone_member(m, None, arena)?);
            }
            out.push(Member {
                name: Str::new(arena, new_member.name.as_str()),
                value: clone(&new_member.value, None, arena)?,
            });
        }
    }
    Ok(Value::Object(arena.alloc_slice_copy(&out)))
}

fn clone_member<'new>(
    m: &Member<'_>,
    op: Option<OpChain<'_>>,
    arena: &'new Arena,
) -> Result<Member<'new>> {
    Ok(Member {
        name: Str::new(arena, m.name.as_str()),
        value: clone(&m.value, op, arena)?,
    })
}
