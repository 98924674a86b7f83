//! Incremental binary TLV parser (`spec.md` §4.6).
//!
//! Structured exactly like [`crate::text::parser::TextParser`]: a stack
//! of frames, no recursion, `write(chunk) -> need_more`. Binary framing
//! removes the one ambiguity the text parser has to work around (a bare
//! number has no natural terminator) because every payload is
//! length-prefixed — there's no "look but don't consume" case here.

use super::{unzigzag, TAG_ARRAY, TAG_BOOL, TAG_EMPTY_ARRAY, TAG_EMPTY_OBJECT, TAG_FLOAT, TAG_INT,
            TAG_NULL, TAG_NUM, TAG_OBJECT, TAG_STR, TAG_UINT, TAG_UNDEFINED};
use crate::error::{Error, ParseError};
use crate::key::Key;
use crate::value::{KeyValue, Value};

#[derive(Debug, Clone, Copy)]
enum BytesKind {
    Str,
    Num,
    Float,
}

#[derive(Debug)]
struct ArrBodyState {
    remaining: usize,
    items: Vec<Value>,
}

#[derive(Debug)]
enum ObjMode {
    AwaitingKey,
    ParsingKey,
    AwaitingValue(Key),
}

#[derive(Debug)]
struct ObjBodyState {
    remaining: usize,
    pairs: Vec<KeyValue>,
    mode: ObjMode,
}

#[derive(Debug)]
enum Frame {
    Header,
    LenPrefix { tag: u8, need: usize, collected: Vec<u8> },
    Bytes { kind: BytesKind, remaining: usize, collected: Vec<u8> },
    ArrBody(ArrBodyState),
    ObjBody(ObjBodyState),
}

enum StepOutcome {
    Continue,
    Replace(Frame),
    PushChild(Frame),
    Complete(Value),
    NeedMore,
}

pub struct BinaryParser<F = fn(Value) -> Value>
where
    F: FnMut(Value) -> Value,
{
    buf: Vec<u8>,
    cursor: usize,
    eof: bool,
    frames: Vec<Frame>,
    result: Option<Value>,
    error: Option<ParseError>,
    preprocess: F,
}

impl BinaryParser<fn(Value) -> Value> {
    pub fn new() -> Self {
        Self::with_hook(|v| v)
    }
}

impl Default for BinaryParser<fn(Value) -> Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnMut(Value) -> Value> BinaryParser<F> {
    pub fn with_hook(hook: F) -> Self {
        BinaryParser {
            buf: Vec::new(),
            cursor: 0,
            eof: false,
            frames: vec![Frame::Header],
            result: None,
            error: None,
            preprocess: hook,
        }
    }

    pub fn write(&mut self, chunk: &[u8]) -> bool {
        if self.result.is_some() || self.error.is_some() {
            return false;
        }
        if chunk.is_empty() {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(chunk);
        }
        loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    self.error = Some(ParseError::new(self.cursor, e));
                    break;
                }
            }
        }
        self.result.is_none() && self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> Value {
        self.result.unwrap_or(Value::Undefined)
    }

    pub fn unprocessed(&self) -> &[u8] {
        &self.buf[self.cursor.min(self.buf.len())..]
    }

    fn attach(&mut self, value: Value) {
        let value = (self.preprocess)(value);
        match self.frames.last_mut() {
            None => self.result = Some(value),
            Some(Frame::ArrBody(a)) => a.items.push(value),
            Some(Frame::ObjBody(o)) => {
                let mode = std::mem::replace(&mut o.mode, ObjMode::AwaitingKey);
                match mode {
                    ObjMode::ParsingKey => {
                        let key = Key::new(value.get_string_or(""));
                        o.mode = ObjMode::AwaitingValue(key);
                    }
                    ObjMode::AwaitingValue(key) => {
                        o.pairs.push(KeyValue { key, value });
                        o.remaining -= 1;
                        o.mode = ObjMode::AwaitingKey;
                    }
                    other => o.mode = other,
                }
            }
            _ => {}
        }
    }

    fn step(&mut self) -> Result<bool, Error> {
        if self.frames.is_empty() {
            return Ok(false);
        }
        let mut frame = self.frames.pop().unwrap();
        let outcome = self.drive(&mut frame)?;
        match outcome {
            StepOutcome::NeedMore => {
                self.frames.push(frame);
                Ok(false)
            }
            StepOutcome::Continue => {
                self.frames.push(frame);
                Ok(true)
            }
            StepOutcome::Replace(new_frame) => {
                self.frames.push(new_frame);
                Ok(true)
            }
            StepOutcome::PushChild(child) => {
                self.frames.push(frame);
                self.frames.push(child);
                Ok(true)
            }
            StepOutcome::Complete(value) => {
                self.attach(value);
                Ok(true)
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(None)
            };
        }
        let b = self.buf[self.cursor];
        self.cursor += 1;
        Ok(Some(b))
    }

    fn drive(&mut self, frame: &mut Frame) -> Result<StepOutcome, Error> {
        match frame {
            Frame::Header => self.drive_header(),
            Frame::LenPrefix { tag, need, collected } => self.drive_len_prefix(*tag, *need, collected),
            Frame::Bytes { kind, remaining, collected } => self.drive_bytes(*kind, remaining, collected),
            Frame::ArrBody(a) => self.drive_arr(a),
            Frame::ObjBody(o) => self.drive_obj(o),
        }
    }

    fn drive_header(&mut self) -> Result<StepOutcome, Error> {
        let b = match self.next_byte()? {
            Some(b) => b,
            None => return Ok(StepOutcome::NeedMore),
        };
        let tag = b >> 3;
        let arg = b & 0b111;
        let out = match tag {
            TAG_UNDEFINED => StepOutcome::Complete(Value::Undefined),
            TAG_NULL => StepOutcome::Complete(Value::Null),
            TAG_BOOL => StepOutcome::Complete(Value::Bool(arg != 0)),
            TAG_EMPTY_ARRAY => StepOutcome::Complete(Value::EmptyArray),
            TAG_EMPTY_OBJECT => StepOutcome::Complete(Value::EmptyObject),
            TAG_FLOAT => StepOutcome::Replace(Frame::Bytes {
                kind: BytesKind::Float,
                remaining: 8,
                collected: Vec::with_capacity(8),
            }),
            TAG_INT | TAG_UINT | TAG_STR | TAG_NUM | TAG_ARRAY | TAG_OBJECT => {
                let need = arg as usize + 1;
                StepOutcome::Replace(Frame::LenPrefix {
                    tag,
                    need,
                    collected: Vec::with_capacity(need),
                })
            }
            other => return Err(Error::InvalidBinaryTag { tag: other }),
        };
        Ok(out)
    }

    fn drive_len_prefix(&mut self, tag: u8, need: usize, collected: &mut Vec<u8>) -> Result<StepOutcome, Error> {
        if collected.len() < need {
            match self.next_byte()? {
                Some(b) => collected.push(b),
                None => return Ok(StepOutcome::NeedMore),
            }
            if collected.len() < need {
                return Ok(StepOutcome::Continue);
            }
        }
        let mut n: u64 = 0;
        for &byte in collected.iter() {
            n = (n << 8) | byte as u64;
        }
        let out = match tag {
            TAG_INT => StepOutcome::Complete(Value::Int(unzigzag(n))),
            TAG_UINT => StepOutcome::Complete(Value::UInt(n)),
            TAG_STR => {
                let remaining = usize::try_from(n).map_err(|_| Error::LengthOverflow)?;
                StepOutcome::Replace(Frame::Bytes {
                    kind: BytesKind::Str,
                    remaining,
                    collected: Vec::with_capacity(remaining),
                })
            }
            TAG_NUM => {
                let remaining = usize::try_from(n).map_err(|_| Error::LengthOverflow)?;
                StepOutcome::Replace(Frame::Bytes {
                    kind: BytesKind::Num,
                    remaining,
                    collected: Vec::with_capacity(remaining),
                })
            }
            TAG_ARRAY => {
                let remaining = usize::try_from(n).map_err(|_| Error::LengthOverflow)?;
                if remaining == 0 {
                    StepOutcome::Complete(Value::array(Vec::new()))
                } else {
                    StepOutcome::Replace(Frame::ArrBody(ArrBodyState {
                        remaining,
                        items: Vec::with_capacity(remaining),
                    }))
                }
            }
            TAG_OBJECT => {
                let remaining = usize::try_from(n).map_err(|_| Error::LengthOverflow)?;
                if remaining == 0 {
                    StepOutcome::Complete(Value::object(Vec::new()))
                } else {
                    StepOutcome::Replace(Frame::ObjBody(ObjBodyState {
                        remaining,
                        pairs: Vec::with_capacity(remaining),
                        mode: ObjMode::AwaitingKey,
                    }))
                }
            }
            other => return Err(Error::InvalidBinaryTag { tag: other }),
        };
        Ok(out)
    }

    fn drive_bytes(&mut self, kind: BytesKind, remaining: &mut usize, collected: &mut Vec<u8>) -> Result<StepOutcome, Error> {
        if *remaining == 0 {
            return Self::finish_bytes(kind, collected);
        }
        match self.next_byte()? {
            Some(b) => {
                collected.push(b);
                *remaining -= 1;
            }
            None => return Ok(StepOutcome::NeedMore),
        }
        if *remaining == 0 {
            Self::finish_bytes(kind, collected)
        } else {
            Ok(StepOutcome::Continue)
        }
    }

    fn finish_bytes(kind: BytesKind, collected: &mut Vec<u8>) -> Result<StepOutcome, Error> {
        match kind {
            BytesKind::Str => {
                let s = String::from_utf8(std::mem::take(collected)).map_err(|_| Error::InvalidUtf8)?;
                Ok(StepOutcome::Complete(Value::from(s)))
            }
            BytesKind::Num => {
                let s = String::from_utf8(std::mem::take(collected)).map_err(|_| Error::InvalidUtf8)?;
                Ok(StepOutcome::Complete(Value::number_from_text(s)))
            }
            BytesKind::Float => {
                let bytes: [u8; 8] = collected.as_slice().try_into().map_err(|_| Error::TruncatedBinary)?;
                Ok(StepOutcome::Complete(Value::Float(f64::from_le_bytes(bytes))))
            }
        }
    }

    fn drive_arr(&mut self, a: &mut ArrBodyState) -> Result<StepOutcome, Error> {
        if a.remaining == 0 {
            let items = std::mem::take(&mut a.items);
            return Ok(StepOutcome::Complete(Value::array(items)));
        }
        a.remaining -= 1;
        Ok(StepOutcome::PushChild(Frame::Header))
    }

    fn drive_obj(&mut self, o: &mut ObjBodyState) -> Result<StepOutcome, Error> {
        match &o.mode {
            ObjMode::AwaitingKey => {
                if o.remaining == 0 {
                    let pairs = std::mem::take(&mut o.pairs);
                    Ok(StepOutcome::Complete(Value::object(pairs)))
                } else {
                    o.mode = ObjMode::ParsingKey;
                    Ok(StepOutcome::PushChild(Frame::Header))
                }
            }
            ObjMode::AwaitingValue(_) => Ok(StepOutcome::PushChild(Frame::Header)),
            ObjMode::ParsingKey => {
                unreachable!("object frame driven while a key is still being decoded")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::binarize;

    #[test]
    fn decodes_scalars() {
        let mut p = BinaryParser::new();
        p.write(&binarize(&Value::from(true)));
        p.write(&[]);
        assert_eq!(p.into_result(), Value::Bool(true));
    }

    #[test]
    fn splitting_binary_input_at_any_byte_boundary_yields_the_same_result() {
        let v = Value::object(vec![KeyValue::new(
            "k",
            Value::array(vec![Value::from(-7), Value::from(3.25), Value::from("s")]),
        )]);
        let bytes = binarize(&v);
        for split in 0..bytes.len() {
            let mut p = BinaryParser::new();
            p.write(&bytes[..split]);
            p.write(&bytes[split..]);
            p.write(&[]);
            assert_eq!(p.into_result(), v, "split at byte {split}");
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        let mut p = BinaryParser::new();
        p.write(&[31 << 3]);
        p.write(&[]);
        assert!(p.is_error());
    }
}
