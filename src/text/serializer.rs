//! Incremental text JSON serializer (`spec.md` §4.7).
//!
//! Mirrors the parser's non-recursive design: a stack of frames walks
//! the value tree without recursing, so serializing a deeply nested
//! value never grows the Rust call stack. Each call to `write` drains
//! the frame stack and appends encoded bytes to the caller's buffer; a
//! caller that wants to interleave I/O can stop checking after any call
//! that returns `true` and resume later.

use crate::container::Container;
use crate::custom::CustomValue;
use crate::value::{KeyValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn escape_into(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for b in s.bytes() {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x00..=0x1F => {
                out.extend_from_slice(format!("\\u{:04x}", b).as_bytes());
            }
            _ => out.push(b),
        }
    }
    out.push(b'"');
}

/// The number text a bare double/int gets serialized as. Stored `Num`
/// text is emitted verbatim elsewhere; this only covers `Int`/`UInt`/
/// `Float` literals constructed directly rather than parsed.
fn format_float(f: f64, out: &mut Vec<u8>) {
    if f.is_nan() {
        out.extend_from_slice(b"null");
    } else if f.is_infinite() {
        escape_into(if f > 0.0 { "\u{221E}" } else { "-\u{221E}" }, out);
    } else {
        out.extend_from_slice(format!("{f}").as_bytes());
    }
}

enum Frame {
    Value(Value),
    /// Emitting array elements: next index to visit, and whether a `,`
    /// is due before it.
    ArrBody { items: crate::container::Container<Value>, next: usize },
    /// Emitting object entries.
    ObjBody { pairs: crate::container::Container<KeyValue>, next: usize },
    Raw(&'static [u8]),
}

/// The incremental serializer. Construct with [`TextSerializer::new`],
/// seed it with a value via [`TextSerializer::start`], then call
/// [`TextSerializer::write`] until it returns `false`.
pub struct TextSerializer {
    frames: Vec<Frame>,
    memo: HashMap<usize, Value>,
}

impl TextSerializer {
    pub fn new() -> Self {
        TextSerializer {
            frames: Vec::new(),
            memo: HashMap::new(),
        }
    }

    /// Begin serializing `value`. Replaces any in-progress run.
    pub fn start(&mut self, value: &Value) {
        self.frames.clear();
        self.frames.push(Frame::Value(value.clone()));
    }

    /// Appends as much encoded output as one frame-step produces to
    /// `out`, returning whether more remains (call again).
    pub fn write(&mut self, out: &mut Vec<u8>) -> bool {
        match self.frames.pop() {
            None => false,
            Some(frame) => {
                self.emit(frame, out);
                !self.frames.is_empty()
            }
        }
    }

    fn custom_projection(&mut self, c: &Arc<dyn CustomValue>) -> Value {
        let key = Arc::as_ptr(c) as *const () as usize;
        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }
        let projected = c.to_json();
        self.memo.insert(key, projected.clone());
        projected
    }

    fn emit(&mut self, frame: Frame, out: &mut Vec<u8>) {
        match frame {
            Frame::Raw(bytes) => out.extend_from_slice(bytes),
            Frame::Value(v) => self.emit_value(v, out),
            Frame::ArrBody { items, next } => {
                if next > 0 {
                    out.push(b',');
                }
                if next < items.len() {
                    let rest_pending = next + 1 < items.len();
                    let this_item = items.as_slice()[next].clone();
                    if rest_pending {
                        self.frames.push(Frame::ArrBody { items, next: next + 1 });
                    } else {
                        self.frames.push(Frame::Raw(b"]"));
                    }
                    self.frames.push(Frame::Value(this_item));
                } else {
                    out.push(b']');
                }
            }
            Frame::ObjBody { pairs, next } => {
                if next > 0 {
                    out.push(b',');
                }
                if next < pairs.len() {
                    let kv = &pairs.as_slice()[next];
                    escape_into(kv.key.as_str(), out);
                    out.push(b':');
                    let value = kv.value.clone();
                    let rest_pending = next + 1 < pairs.len();
                    if rest_pending {
                        self.frames.push(Frame::ObjBody { pairs, next: next + 1 });
                    } else {
                        self.frames.push(Frame::Raw(b"}"));
                    }
                    self.frames.push(Frame::Value(value));
                } else {
                    out.push(b'}');
                }
            }
        }
    }

    fn emit_value(&mut self, v: Value, out: &mut Vec<u8>) {
        match v {
            // Array/object bodies filter Undefined elements out before
            // ever pushing a Frame::Value for them, so this arm only
            // ever runs for a top-level Undefined, which serializes as
            // `null` (`spec.md` §4.7, §6.2).
            Value::Undefined => out.extend_from_slice(b"null"),
            Value::Null => out.extend_from_slice(b"null"),
            Value::Bool(true) => out.extend_from_slice(b"true"),
            Value::Bool(false) => out.extend_from_slice(b"false"),
            Value::Int(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Value::UInt(u) => out.extend_from_slice(u.to_string().as_bytes()),
            Value::Float(f) => format_float(f, out),
            Value::Str(s) => escape_into(s.as_str(), out),
            // Number text is authoritative and already validated JSON
            // grammar; emit verbatim (`spec.md` §3.3).
            Value::Num(s) => out.extend_from_slice(s.as_str().as_bytes()),
            Value::EmptyArray => out.extend_from_slice(b"[]"),
            Value::EmptyObject => out.extend_from_slice(b"{}"),
            Value::Array(items) => {
                out.push(b'[');
                // Filter undefined elements up front rather than while
                // walking: the comma between rendered elements depends on
                // how many actually render, not on raw position, and
                // `undefined` is skipped with no separator at all
                // (`spec.md` §3.6, §4.7).
                if items.as_slice().iter().any(Value::is_undefined) {
                    let kept: Vec<Value> = items
                        .as_slice()
                        .iter()
                        .filter(|v| !v.is_undefined())
                        .cloned()
                        .collect();
                    self.frames.push(Frame::ArrBody {
                        items: Container::from_vec(kept),
                        next: 0,
                    });
                } else {
                    self.frames.push(Frame::ArrBody { items, next: 0 });
                }
            }
            Value::Object(pairs) => {
                out.push(b'{');
                if pairs.as_slice().iter().any(|kv| kv.value.is_undefined()) {
                    let kept: Vec<KeyValue> = pairs
                        .as_slice()
                        .iter()
                        .filter(|kv| !kv.value.is_undefined())
                        .cloned()
                        .collect();
                    self.frames.push(Frame::ObjBody {
                        pairs: Container::from_vec(kept),
                        next: 0,
                    });
                } else {
                    self.frames.push(Frame::ObjBody { pairs, next: 0 });
                }
            }
            Value::Custom(c) => {
                let projected = self.custom_projection(&c);
                self.emit_value(projected, out);
            }
        }
    }
}

impl Default for TextSerializer {
    fn default() -> Self {
        Self::new()
    }
}
