//! Serialises a [`Value`] tree back to text, in compact or pretty style.
//!
//! Both the "how many bytes would this take" pass and the actual byte-emit
//! pass run the exact same recursive walk over a [`Sink`] — a `Measure`
//! sink just counts, an `Emit` sink writes into a caller buffer — so the
//! two phases can never drift apart the way two hand-duplicated passes
//! might. `print` ties them together: size, allocate, emit, done.

use crate::conf::value::{Member, Value};
use tracing::trace;

/// Output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// No whitespace at all.
    Compact,
    /// CRLF line breaks, tab indentation, and a blank line between a
    /// non-empty nested array/object and the sibling that follows it.
    Pretty,
}

/// Per-print transient state for [`Style::Pretty`]: current nesting depth
/// and whether the value just closed was a non-empty nested container
/// (which asks for a blank line before the next sibling).
struct Pretty {
    level: usize,
    more_space: bool,
}

trait Sink {
    fn write(&mut self, bytes: &[u8]);
}

struct Measure(usize);

impl Sink for Measure {
    fn write(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

struct Emit<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl Sink for Emit<'_> {
    fn write(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

fn pretty_ctx(style: Style) -> Option<Pretty> {
    match style {
        Style::Compact => None,
        Style::Pretty => Some(Pretty {
            level: 0,
            more_space: false,
        }),
    }
}

fn newline(sink: &mut dyn Sink) {
    sink.write(b"\r\n");
}

fn indent(sink: &mut dyn Sink, level: usize) {
    for _ in 0..level {
        sink.write(b"\t");
    }
}

/// Bytes required to print `value` in `style`.
#[must_use]
pub fn size(value: &Value<'_>, style: Style) -> usize {
    let mut sink = Measure(0);
    let mut pretty = pretty_ctx(style);
    print_value(&mut sink, value, &mut pretty);
    sink.0
}

/// Emit `value` into `buf` (which must be exactly [`size`] bytes long),
/// returning the number of bytes written.
pub fn emit_into(value: &Value<'_>, style: Style, buf: &mut [u8]) -> usize {
    let mut sink = Emit { buf, pos: 0 };
    let mut pretty = pretty_ctx(style);
    print_value(&mut sink, value, &mut pretty);
    sink.pos
}

/// Print `value` to a freshly allocated `String`.
#[must_use]
pub fn print(value: &Value<'_>, style: Style) -> String {
    let len = size(value, style);
    trace!(bytes = len, ?style, "sizing pass complete, emitting");
    let mut buf = vec![0u8; len];
    let written = emit_into(value, style, &mut buf);
    debug_assert_eq!(written, len, "size/emit phase disagreed on byte count");
    String::from_utf8(buf).expect("printer only ever emits escaped UTF-8")
}

fn print_value(sink: &mut dyn Sink, value: &Value<'_>, pretty: &mut Option<Pretty>) {
    match value {
        Value::Null => sink.write(b"null"),
        Value::Bool(true) => sink.write(b"true"),
        Value::Bool(false) => sink.write(b"false"),
        Value::Int(n) => sink.write(n.to_string().as_bytes()),
        // Reserved: the parser never produces this variant (see
        // conf::parser's float rejection), and printing it is a no-op
        // rather than a panic so a hand-built tree containing one still
        // serialises (just without that field).
        Value::Number(_) => {}
        Value::Str(s) => print_string(sink, s.as_str()),
        Value::Array(elems) => print_array(sink, elems, pretty),
        Value::Object(members) => print_object(sink, members, pretty),
    }
}

fn print_string(sink: &mut dyn Sink, s: &str) {
    sink.write(b"\"");
    let bytes = s.as_bytes();
    let mut run_start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: Option<&[u8]> = match b {
            b'\\' => Some(b"\\\\"),
            b'"' => Some(b"\\\""),
            b'\n' => Some(b"\\n"),
            b'\r' => Some(b"\\r"),
            b'\t' => Some(b"\\t"),
            0x08 => Some(b"\\b"),
            0x0C => Some(b"\\f"),
            0x00..=0x1F => None, // handled below, needs formatting
            _ => continue,
        };
        if run_start < i {
            sink.write(&bytes[run_start..i]);
        }
        match escape {
            Some(e) => sink.write(e),
            None => sink.write(format!("\\u00{b:02X}").as_bytes()),
        }
        run_start = i + 1;
    }
    if run_start < bytes.len() {
        sink.write(&bytes[run_start..]);
    }
    sink.write(b"\"");
}

fn print_array(sink: &mut dyn Sink, elems: &[Value<'_>], pretty: &mut Option<Pretty>) {
    sink.write(b"[");
    if let Some((first, rest)) = elems.split_first() {
        if let Some(p) = pretty {
            newline(sink);
            p.level += 1;
            indent(sink, p.level);
        }
        print_value(sink, first, pretty);
        for e in rest {
            sink.write(b",");
            if let Some(p) = pretty {
                newline(sink);
                indent(sink, p.level);
                p.more_space = false;
            }
            print_value(sink, e, pretty);
        }
        if let Some(p) = pretty {
            newline(sink);
            p.level -= 1;
            indent(sink, p.level);
            p.more_space = true;
        }
    }
    sink.write(b"]");
}

fn print_object(sink: &mut dyn Sink, members: &[Member<'_>], pretty: &mut Option<Pretty>) {
    sink.write(b"{");
    if !members.is_empty() {
        if let Some(p) = pretty {
            newline(sink);
            p.level += 1;
        }
        let last = members.len() - 1;
        for (i, m) in members.iter().enumerate() {
            if let Some(p) = pretty {
                indent(sink, p.level);
            }
            print_string(sink, m.name.as_str());
            sink.write(b":");
            if pretty.is_some() {
                sink.write(b" ");
            }
            print_value(sink, &m.value, pretty);
            if i != last {
                sink.write(b",");
                if let Some(p) = pretty {
                    newline(sink);
                    if p.more_space {
                        p.more_space = false;
                        newline(sink);
                    }
                }
            }
        }
        if let Some(p) = pretty {
            newline(sink);
            p.level -= 1;
            indent(sink, p.level);
            p.more_space = true;
        }
    }
    sink.write(b"}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::conf::parser::parse;

    fn roundtrip(input: &[u8]) {
        let arena = Arena::new();
        let v = parse(input, &arena).unwrap();
        let printed = print(&v, Style::Compact);
        let arena2 = Arena::new();
        let v2 = parse(printed.as_bytes(), &arena2).unwrap();
        assert_eq!(v, v2, "round-trip mismatch for {printed:?}");
    }

    #[test]
    fn compact_scalars() {
        let arena = Arena::new();
        assert_eq!(print(&Value::Null, Style::Compact), "null");
        assert_eq!(print(&Value::Bool(true), Style::Compact), "true");
        assert_eq!(print(&Value::Bool(false), Style::Compact), "false");
        assert_eq!(print(&Value::Int(-42), Style::Compact), "-42");
        let v = parse(br#""hi""#, &arena).unwrap();
        assert_eq!(print(&v, Style::Compact), "\"hi\"");
    }

    #[test]
    fn escapes_control_and_quote_bytes() {
        let arena = Arena::new();
        let v = parse(br#""line1\nline2\t\"q\"""#, &arena).unwrap();
        assert_eq!(print(&v, Style::Compact), "\"line1\\nline2\\t\\\"q\\\"\"");
        let v2 = parse(b"\"a\\u0001b\"", &arena).unwrap();
        assert_eq!(print(&v2, Style::Compact), "\"a\\u0001b\"");
    }

    #[test]
    fn size_matches_emit_for_nested_structures() {
        let arena = Arena::new();
        let v = parse(br#"{"a":1,"b":[true,null,"x"],"c":{"d":[1,2,3]}}"#, &arena).unwrap();
        for style in [Style::Compact, Style::Pretty] {
            let expected = size(&v, style);
            let mut buf = vec![0u8; expected];
            let written = emit_into(&v, style, &mut buf);
            assert_eq!(written, expected);
        }
    }

    #[test]
    fn pretty_no_trailing_blank_line_when_last_member_is_array() {
        let arena = Arena::new();
        let v = parse(br#"{"a":1,"b":[true,null,"x"]}"#, &arena).unwrap();
        let pretty = print(&v, Style::Pretty);
        // "b"'s value is a non-empty array and it is the last member, so no
        // blank line should appear after it, only the closing brace line.
        assert!(!pretty.trim_end().ends_with("\r\n\r\n\t}"));
        assert!(pretty.ends_with('}'));
    }

    #[test]
    fn pretty_inserts_blank_line_between_nested_siblings() {
        let arena = Arena::new();
        let v = parse(br#"{"a":{"x":1},"b":2}"#, &arena).unwrap();
        let pretty = print(&v, Style::Pretty);
        // "a" is a non-empty nested object and is followed by a sibling
        // ("b"), so exactly one blank line should separate them.
        assert!(pretty.contains("}\r\n\r\n\t\"b\""));
    }

    #[test]
    fn round_trips_scalars_and_containers() {
        roundtrip(b"null");
        roundtrip(b"true");
        roundtrip(b"42");
        roundtrip(b"\"hello world, this is longer than fourteen bytes\"");
        roundtrip(br#"{"a":1,"b":[true,null,"x"]}"#);
        roundtrip(br#"[[1,2],[3,4],{}]"#);
    }

    #[test]
    fn short_and_long_string_print_identically() {
        let arena = Arena::new();
        let short = Value::Str(crate::conf::value::Str::new(&arena, "short"));
        let long = Value::Str(crate::conf::value::Str::new(
            &arena,
            "this is definitely longer than fourteen bytes",
        ));
        assert_eq!(
            print(&short, Style::Compact),
            format!("\"{}\"", "short")
        );
        assert_eq!(
            print(&long, Style::Compact),
            "\"this is definitely longer than fourteen bytes\""
        );
    }
}
