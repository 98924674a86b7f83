//! Incremental binary TLV serializer (`spec.md` §4.8).
//!
//! Mirrors [`crate::text::serializer::TextSerializer`]'s frame-stack
//! design; the terminal encodings differ per `spec.md` §4.8/§6.3. Unlike
//! the text serializer, `undefined` is never elided here — every array
//! element and object entry renders its own header byte, `undefined`
//! included, because the binary format carries no comma/bracket
//! grammar to lean on for "this slot is absent".

use super::{
    minimal_be_bytes, zigzag, TAG_ARRAY, TAG_BOOL, TAG_EMPTY_ARRAY, TAG_EMPTY_OBJECT, TAG_FLOAT,
    TAG_INT, TAG_NULL, TAG_NUM, TAG_OBJECT, TAG_STR, TAG_UINT, TAG_UNDEFINED,
};
use crate::container::Container;
use crate::custom::CustomValue;
use crate::value::{KeyValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn header(tag: u8, arg: u8) -> u8 {
    (tag << 3) | (arg & 0b111)
}

/// Emits a length/magnitude/count-prefixed payload: header byte carrying
/// `tag` and `byte_count - 1`, then the big-endian bytes, then `body`.
fn emit_length_prefixed(tag: u8, n: u64, body: &[u8], out: &mut Vec<u8>) {
    let be = minimal_be_bytes(n);
    out.push(header(tag, (be.len() - 1) as u8));
    out.extend_from_slice(&be);
    out.extend_from_slice(body);
}

enum Frame {
    Value(Value),
    ArrBody { items: Container<Value>, next: usize },
    /// `next` indexes the pair; emitting the key (as a string value)
    /// before the value for each one.
    ObjBody { pairs: Container<KeyValue>, next: usize, emitting_key: bool },
}

/// The incremental binary serializer. Same usage shape as
/// [`crate::text::serializer::TextSerializer`]: [`BinarySerializer::start`]
/// then [`BinarySerializer::write`] until it returns `false`.
pub struct BinarySerializer {
    frames: Vec<Frame>,
    memo: HashMap<usize, Value>,
}

impl BinarySerializer {
    pub fn new() -> Self {
        BinarySerializer {
            frames: Vec::new(),
            memo: HashMap::new(),
        }
    }

    pub fn start(&mut self, value: &Value) {
        self.frames.clear();
        self.frames.push(Frame::Value(value.clone()));
    }

    /// Appends as much output as one frame-step produces to `out`,
    /// returning whether more remains.
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
            Frame::Value(v) => self.emit_value(v, out),
            Frame::ArrBody { items, next } => {
                if next < items.len() {
                    let item = items.as_slice()[next].clone();
                    self.frames.push(Frame::ArrBody { items, next: next + 1 });
                    self.frames.push(Frame::Value(item));
                }
                // next == items.len(): nothing left to push, frame drops.
            }
            Frame::ObjBody { pairs, next, emitting_key } => {
                if next >= pairs.len() {
                    return;
                }
                if emitting_key {
                    let key_value = Value::from(pairs.as_slice()[next].key.as_str());
                    self.frames.push(Frame::ObjBody { pairs, next, emitting_key: false });
                    self.frames.push(Frame::Value(key_value));
                } else {
                    let value = pairs.as_slice()[next].value.clone();
                    self.frames.push(Frame::ObjBody { pairs, next: next + 1, emitting_key: true });
                    self.frames.push(Frame::Value(value));
                }
            }
        }
    }

    fn emit_value(&mut self, v: Value, out: &mut Vec<u8>) {
        match v {
            Value::Undefined => out.push(header(TAG_UNDEFINED, 0)),
            Value::Null => out.push(header(TAG_NULL, 0)),
            Value::Bool(b) => out.push(header(TAG_BOOL, b as u8)),
            Value::Int(i) => emit_length_prefixed(TAG_INT, zigzag(i), &[], out),
            Value::UInt(u) => emit_length_prefixed(TAG_UINT, u, &[], out),
            Value::Float(f) => {
                out.push(header(TAG_FLOAT, 0));
                out.extend_from_slice(&f.to_le_bytes());
            }
            Value::Str(s) => {
                let bytes = s.as_str().as_bytes();
                emit_length_prefixed(TAG_STR, bytes.len() as u64, bytes, out);
            }
            Value::Num(s) => {
                let bytes = s.as_str().as_bytes();
                emit_length_prefixed(TAG_NUM, bytes.len() as u64, bytes, out);
            }
            Value::EmptyArray => out.push(header(TAG_EMPTY_ARRAY, 0)),
            Value::EmptyObject => out.push(header(TAG_EMPTY_OBJECT, 0)),
            Value::Array(items) => {
                let be = minimal_be_bytes(items.len() as u64);
                out.push(header(TAG_ARRAY, (be.len() - 1) as u8));
                out.extend_from_slice(&be);
                self.frames.push(Frame::ArrBody { items, next: 0 });
            }
            Value::Object(pairs) => {
                let be = minimal_be_bytes(pairs.len() as u64);
                out.push(header(TAG_OBJECT, (be.len() - 1) as u8));
                out.extend_from_slice(&be);
                self.frames.push(Frame::ObjBody { pairs, next: 0, emitting_key: true });
            }
            Value::Custom(c) => {
                let projected = self.custom_projection(&c);
                self.emit_value(projected, out);
            }
        }
    }
}

impl Default for BinarySerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::unbinarize;
    use crate::value::KeyValue;

    fn run(v: &Value) -> Vec<u8> {
        let mut s = BinarySerializer::new();
        s.start(v);
        let mut out = Vec::new();
        while s.write(&mut out) {}
        out
    }

    #[test]
    fn scalars_round_trip() {
        for v in [
            Value::Undefined,
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(-12345),
            Value::UInt(99999),
            Value::Float(3.5),
        ] {
            let bytes = run(&v);
            assert_eq!(unbinarize(&bytes).unwrap(), v);
        }
    }

    #[test]
    fn undefined_is_not_elided_inside_containers() {
        let v = Value::array(vec![Value::from(1), Value::Undefined, Value::from(2)]);
        let bytes = run(&v);
        let back = unbinarize(&bytes).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.array_len(), 3);
    }

    #[test]
    fn object_round_trips_with_sorted_keys() {
        let v = Value::object(vec![
            KeyValue::new("b", 1),
            KeyValue::new("a", "hello"),
            KeyValue::new("c", Value::number_from_text("3.50")),
        ]);
        let bytes = run(&v);
        assert_eq!(unbinarize(&bytes).unwrap(), v);
    }

    #[test]
    fn re_encoding_the_decoded_value_is_byte_identical() {
        let v = Value::object(vec![
            KeyValue::new("aaa", Value::array(vec![Value::from(1), Value::from(2), Value::from(3)])),
            KeyValue::new("m1", 42),
        ]);
        let once = run(&v);
        let back = unbinarize(&once).unwrap();
        let twice = run(&back);
        assert_eq!(once, twice);
    }

    #[test]
    fn custom_value_projects_through_serialization() {
        #[derive(Debug)]
        struct Tag;
        impl CustomValue for Tag {
            fn type_name(&self) -> &str {
                "Tag"
            }
            fn to_json(&self) -> Value {
                Value::from(7)
            }
        }
        let v = Value::custom(Arc::new(Tag));
        let bytes = run(&v);
        assert_eq!(unbinarize(&bytes).unwrap(), Value::from(7));
    }
}
