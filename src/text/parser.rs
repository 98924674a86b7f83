//! Incremental text JSON parser (`spec.md` §4.5).
//!
//! A pushdown automaton driven entirely by `write`: the caller hands in
//! bytes whenever they have them, in whatever sizes arrive off the wire,
//! and the parser makes as much progress as the buffered input allows
//! before reporting back whether it needs more. There is no recursion —
//! nesting lives in `frames`, one entry per array/object/string/number/
//! literal currently open.

use crate::error::{Error, ParseError};
use crate::key::Key;
use crate::value::{KeyValue, Value};

fn is_json_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Bytes the number state keeps accumulating without yet knowing whether
/// the run is well-formed — includes the three continuation bytes of the
/// UTF-8 encoding of `∞`, which the number state accepts bare alongside
/// ordinary digits (`spec.md` §6.2).
fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E' | 0xE2 | 0x88 | 0x9E)
}

fn validate_number_text(s: &str) -> bool {
    if s == "\u{221E}" || s == "-\u{221E}" {
        return true;
    }
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return false;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

fn push_scalar_utf8(acc: &mut Vec<u8>, code_point: u32) {
    // A lone surrogate has no valid scalar value; per `spec.md` §9 we
    // drop it rather than emit `U+FFFD`, since the source encoding gives
    // no signal for which replacement convention it intends.
    if let Some(c) = char::from_u32(code_point) {
        let mut buf = [0u8; 4];
        acc.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }
}

#[derive(Debug)]
enum StrSub {
    Plain,
    Escape,
    Unicode { digits_seen: u8, value: u16 },
}

#[derive(Debug)]
struct StrState {
    acc: Vec<u8>,
    sub: StrSub,
    high_surrogate: Option<u16>,
}

impl StrState {
    fn new() -> Self {
        StrState {
            acc: Vec::new(),
            sub: StrSub::Plain,
            high_surrogate: None,
        }
    }
}

#[derive(Debug)]
struct CheckState {
    expected: &'static [u8],
    matched: usize,
    value: Value,
}

#[derive(Debug)]
struct ArrState {
    items: Vec<Value>,
    awaiting_comma: bool,
}

impl ArrState {
    fn new() -> Self {
        ArrState {
            items: Vec::new(),
            awaiting_comma: false,
        }
    }
}

#[derive(Debug)]
enum ObjMode {
    /// Start of object, or just after `{`: a `"` opens a key, or `}` closes.
    KeyOrClose,
    /// Just after a comma: only a `"` is legal, trailing commas aren't.
    KeyOnly,
    /// A key string is being parsed; the next attached child is that key.
    ParsingKey,
    /// The key is known; waiting for `:`.
    AwaitingColon(Key),
    /// Waiting for the value that follows `:`.
    AwaitingValue(Key),
    /// A complete pair was just appended; expect `,` or `}`.
    AfterValue,
}

#[derive(Debug)]
struct ObjState {
    pairs: Vec<KeyValue>,
    mode: ObjMode,
}

impl ObjState {
    fn new() -> Self {
        ObjState {
            pairs: Vec::new(),
            mode: ObjMode::KeyOrClose,
        }
    }
}

#[derive(Debug)]
enum Frame {
    Detect,
    Str(StrState),
    Num(Vec<u8>),
    Check(CheckState),
    Arr(ArrState),
    Obj(ObjState),
}

enum StepOutcome {
    /// Made progress; the frame stays on top, call `step` again.
    Continue,
    /// The frame (an empty `Detect`) turned out to be a concrete kind.
    Replace(Frame),
    /// The frame pushed a child frame to parse a nested value/key.
    PushChild(Frame),
    /// The frame finished; `attach` installs the value into its parent.
    Complete(Value),
    /// No bytes are available and we're not at end of input.
    NeedMore,
}

/// The incremental pushdown parser itself (`spec.md` §4.5).
///
/// `F` is a preprocessor hook run over every value as it's emitted,
/// before being installed into its parent (or becoming the final
/// result) — identity by default.
pub struct TextParser<F = fn(Value) -> Value>
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

impl TextParser<fn(Value) -> Value> {
    pub fn new() -> Self {
        Self::with_hook(|v| v)
    }
}

impl Default for TextParser<fn(Value) -> Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnMut(Value) -> Value> TextParser<F> {
    pub fn with_hook(hook: F) -> Self {
        TextParser {
            buf: Vec::new(),
            cursor: 0,
            eof: false,
            frames: vec![Frame::Detect],
            result: None,
            error: None,
            preprocess: hook,
        }
    }

    /// Feed another chunk of input. An empty chunk tells the parser no
    /// more input is coming, which is how a bare top-level number or
    /// literal at end-of-stream (with no trailing delimiter to look at)
    /// gets to finalize — an interface detail `spec.md` leaves implicit;
    /// see `DESIGN.md`.
    ///
    /// Returns whether more input is required: `false` once a result or
    /// an error is available.
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
                    let offset = self.cursor;
                    self.error = Some(ParseError::new(offset, e));
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

    /// Consumes the parser, returning the parsed value or `Undefined` if
    /// parsing never completed (`spec.md` §6.1).
    pub fn into_result(self) -> Value {
        self.result.unwrap_or(Value::Undefined)
    }

    /// The tail of the buffered input beyond the last consumed byte —
    /// e.g. bytes following a complete top-level value in a
    /// stream-multiplexed payload (`spec.md` §4.5).
    pub fn unprocessed(&self) -> &[u8] {
        &self.buf[self.cursor.min(self.buf.len())..]
    }

    fn attach(&mut self, value: Value) {
        let value = (self.preprocess)(value);
        match self.frames.last_mut() {
            None => self.result = Some(value),
            Some(Frame::Arr(a)) => a.items.push(value),
            Some(Frame::Obj(o)) => {
                let mode = std::mem::replace(&mut o.mode, ObjMode::AfterValue);
                match mode {
                    ObjMode::ParsingKey => {
                        let key = Key::new(value.get_string_or(""));
                        o.mode = ObjMode::AwaitingColon(key);
                    }
                    ObjMode::AwaitingValue(key) => {
                        o.pairs.push(KeyValue { key, value });
                        o.mode = ObjMode::AfterValue;
                    }
                    other => o.mode = other,
                }
            }
            _ => {}
        }
    }

    /// Runs one step of the automaton: makes whatever progress is
    /// possible against the buffered input, returns `Ok(true)` if it
    /// should be called again, `Ok(false)` if blocked on more input (or
    /// finished), `Err` on a malformed byte.
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

    fn skip_ws(&mut self) {
        while self.cursor < self.buf.len() && is_json_ws(self.buf[self.cursor]) {
            self.cursor += 1;
        }
    }

    fn drive(&mut self, frame: &mut Frame) -> Result<StepOutcome, Error> {
        match frame {
            Frame::Detect => self.drive_detect(),
            Frame::Str(s) => self.drive_str(s),
            Frame::Num(acc) => self.drive_num(acc),
            Frame::Check(c) => self.drive_check(c),
            Frame::Arr(a) => self.drive_arr(a),
            Frame::Obj(o) => self.drive_obj(o),
        }
    }

    fn drive_detect(&mut self) -> Result<StepOutcome, Error> {
        self.skip_ws();
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(StepOutcome::NeedMore)
            };
        }
        let b = self.buf[self.cursor];
        let out = match b {
            b'[' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Arr(ArrState::new()))
            }
            b'{' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Obj(ObjState::new()))
            }
            b'"' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Str(StrState::new()))
            }
            b't' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Check(CheckState {
                    expected: b"true",
                    matched: 1,
                    value: Value::Bool(true),
                }))
            }
            b'f' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Check(CheckState {
                    expected: b"false",
                    matched: 1,
                    value: Value::Bool(false),
                }))
            }
            b'n' => {
                self.cursor += 1;
                StepOutcome::Replace(Frame::Check(CheckState {
                    expected: b"null",
                    matched: 1,
                    value: Value::Null,
                }))
            }
            b'0'..=b'9' | b'+' | b'-' | 0xE2 => StepOutcome::Replace(Frame::Num(Vec::new())),
            other => return Err(Error::UnexpectedByte { byte: other }),
        };
        Ok(out)
    }

    fn drive_check(&mut self, c: &mut CheckState) -> Result<StepOutcome, Error> {
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(StepOutcome::NeedMore)
            };
        }
        let b = self.buf[self.cursor];
        if b != c.expected[c.matched] {
            return Err(Error::UnexpectedByte { byte: b });
        }
        self.cursor += 1;
        c.matched += 1;
        if c.matched == c.expected.len() {
            Ok(StepOutcome::Complete(c.value.clone()))
        } else {
            Ok(StepOutcome::Continue)
        }
    }

    fn drive_num(&mut self, acc: &mut Vec<u8>) -> Result<StepOutcome, Error> {
        if self.cursor >= self.buf.len() {
            if self.eof {
                return self.finish_number(&acc[..]);
            }
            return Ok(StepOutcome::NeedMore);
        }
        let b = self.buf[self.cursor];
        if is_number_byte(b) {
            acc.push(b);
            self.cursor += 1;
            Ok(StepOutcome::Continue)
        } else {
            // Look but don't consume: the terminator byte belongs to
            // whatever comes next (a separator, a closer, or nothing).
            self.finish_number(&acc[..])
        }
    }

    fn finish_number(&self, acc: &[u8]) -> Result<StepOutcome, Error> {
        let text = std::str::from_utf8(acc).map_err(|_| Error::InvalidNumber)?;
        if validate_number_text(text) {
            Ok(StepOutcome::Complete(Value::number_from_text(text)))
        } else {
            Err(Error::InvalidNumber)
        }
    }

    fn drive_str(&mut self, s: &mut StrState) -> Result<StepOutcome, Error> {
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(StepOutcome::NeedMore)
            };
        }
        let b = self.buf[self.cursor];
        self.cursor += 1;
        match &mut s.sub {
            StrSub::Plain => {
                if b == b'"' {
                    let text = String::from_utf8(std::mem::take(&mut s.acc))
                        .map_err(|_| Error::InvalidUtf8)?;
                    return Ok(StepOutcome::Complete(Value::from(text)));
                }
                if b == b'\\' {
                    s.sub = StrSub::Escape;
                } else {
                    s.acc.push(b);
                }
            }
            StrSub::Escape => {
                s.sub = StrSub::Plain;
                match b {
                    b'"' => s.acc.push(b'"'),
                    b'\\' => s.acc.push(b'\\'),
                    b'/' => s.acc.push(b'/'),
                    b'b' => s.acc.push(0x08),
                    b'f' => s.acc.push(0x0C),
                    b'n' => s.acc.push(b'\n'),
                    b'r' => s.acc.push(b'\r'),
                    b't' => s.acc.push(b'\t'),
                    b'u' => {
                        s.sub = StrSub::Unicode {
                            digits_seen: 0,
                            value: 0,
                        }
                    }
                    // Any other escaped byte is silently skipped: it's
                    // consumed, but contributes nothing to the output
                    // (`spec.md` §4.5).
                    _ => {}
                }
            }
            StrSub::Unicode { digits_seen, value } => {
                let nibble = match b {
                    b'0'..=b'9' => b - b'0',
                    b'a'..=b'f' => b - b'a' + 10,
                    b'A'..=b'F' => b - b'A' + 10,
                    _ => return Err(Error::InvalidEscape),
                };
                *value = (*value << 4) | nibble as u16;
                *digits_seen += 1;
                if *digits_seen == 4 {
                    let unit = *value;
                    s.sub = StrSub::Plain;
                    if let Some(high) = s.high_surrogate.take() {
                        if (0xDC00..=0xDFFF).contains(&unit) {
                            let combined =
                                0x10000 + (((high - 0xD800) as u32) << 10) + (unit - 0xDC00) as u32;
                            push_scalar_utf8(&mut s.acc, combined);
                        } else {
                            push_scalar_utf8(&mut s.acc, high as u32);
                            push_scalar_utf8(&mut s.acc, unit as u32);
                        }
                    } else if (0xD800..=0xDBFF).contains(&unit) {
                        s.high_surrogate = Some(unit);
                    } else {
                        push_scalar_utf8(&mut s.acc, unit as u32);
                    }
                }
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn drive_arr(&mut self, a: &mut ArrState) -> Result<StepOutcome, Error> {
        self.skip_ws();
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(StepOutcome::NeedMore)
            };
        }
        let b = self.buf[self.cursor];
        if !a.awaiting_comma {
            if b == b']' {
                self.cursor += 1;
                let items = std::mem::take(&mut a.items);
                return Ok(StepOutcome::Complete(Value::array(items)));
            }
            a.awaiting_comma = true;
            Ok(StepOutcome::PushChild(Frame::Detect))
        } else if b == b',' {
            self.cursor += 1;
            a.awaiting_comma = false;
            Ok(StepOutcome::Continue)
        } else if b == b']' {
            self.cursor += 1;
            let items = std::mem::take(&mut a.items);
            Ok(StepOutcome::Complete(Value::array(items)))
        } else {
            Err(Error::UnexpectedByte { byte: b })
        }
    }

    fn drive_obj(&mut self, o: &mut ObjState) -> Result<StepOutcome, Error> {
        self.skip_ws();
        if self.cursor >= self.buf.len() {
            return if self.eof {
                Err(Error::UnexpectedEof)
            } else {
                Ok(StepOutcome::NeedMore)
            };
        }
        let b = self.buf[self.cursor];
        match &o.mode {
            ObjMode::KeyOrClose => {
                if b == b'"' {
                    self.cursor += 1;
                    o.mode = ObjMode::ParsingKey;
                    Ok(StepOutcome::PushChild(Frame::Str(StrState::new())))
                } else if b == b'}' {
                    self.cursor += 1;
                    let pairs = std::mem::take(&mut o.pairs);
                    Ok(StepOutcome::Complete(Value::object(pairs)))
                } else {
                    Err(Error::UnexpectedByte { byte: b })
                }
            }
            ObjMode::KeyOnly => {
                if b == b'"' {
                    self.cursor += 1;
                    o.mode = ObjMode::ParsingKey;
                    Ok(StepOutcome::PushChild(Frame::Str(StrState::new())))
                } else {
                    Err(Error::UnexpectedByte { byte: b })
                }
            }
            ObjMode::AwaitingColon(key) => {
                if b == b':' {
                    self.cursor += 1;
                    let key = key.clone();
                    o.mode = ObjMode::AwaitingValue(key);
                    Ok(StepOutcome::PushChild(Frame::Detect))
                } else {
                    Err(Error::UnexpectedByte { byte: b })
                }
            }
            ObjMode::AfterValue => {
                if b == b',' {
                    self.cursor += 1;
                    o.mode = ObjMode::KeyOnly;
                    Ok(StepOutcome::Continue)
                } else if b == b'}' {
                    self.cursor += 1;
                    let pairs = std::mem::take(&mut o.pairs);
                    Ok(StepOutcome::Complete(Value::object(pairs)))
                } else {
                    Err(Error::UnexpectedByte { byte: b })
                }
            }
            ObjMode::ParsingKey | ObjMode::AwaitingValue(_) => {
                // These are markers for `attach`, consulted only while a
                // child frame is on top of the stack; `drive_obj` never
                // runs with the object itself on top in these modes.
                unreachable!("object frame driven while awaiting a child result")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> TextParser {
        let mut p = TextParser::new();
        p.write(input.as_bytes());
        p.write(&[]);
        p
    }

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_all("true").into_result(), Value::Bool(true));
        assert_eq!(parse_all("false").into_result(), Value::Bool(false));
        assert_eq!(parse_all("null").into_result(), Value::Null);
    }

    #[test]
    fn parses_number_text_verbatim() {
        let v = parse_all("  -12.50e1 ").into_result();
        assert_eq!(v.get_string_or(""), "-12.50e1");
        assert_eq!(v.get_double(), -125.0);
    }

    #[test]
    fn parses_infinity_sentinel_bare() {
        let v = parse_all("-\u{221E}").into_result();
        assert_eq!(v.get_double(), f64::NEG_INFINITY);
    }

    #[test]
    fn parses_nested_array_and_object() {
        let v = parse_all(r#"{"a":[1,2,{"b":true}]}"#).into_result();
        assert_eq!(v.get("a").get_index(0).get_int(), 1);
        assert_eq!(v.get("a").get_index(2).get("b"), &Value::Bool(true));
    }

    #[test]
    fn object_keys_come_out_sorted_regardless_of_input_order() {
        let v = parse_all(r#"{"z":1,"a":2}"#).into_result();
        let keys: Vec<&str> = v.keys().iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn decodes_surrogate_pair_escape() {
        let v = parse_all(r#""😀""#).into_result();
        assert_eq!(v.get_string_or(""), "\u{1F600}");
    }

    #[test]
    fn decodes_basic_escapes() {
        let v = parse_all(r#""a\tb\nc\"d""#).into_result();
        assert_eq!(v.get_string_or(""), "a\tb\nc\"d");
    }

    #[test]
    fn number_stops_at_terminator_leaving_it_unprocessed() {
        let mut p = TextParser::new();
        p.write(b"123x");
        assert_eq!(p.unprocessed(), b"x");
        p.write(&[]);
        assert_eq!(p.into_result().get_int(), 123);
    }

    #[test]
    fn errors_on_malformed_literal() {
        let mut p = TextParser::new();
        p.write(b"tru3");
        p.write(&[]);
        assert!(p.is_error());
    }

    #[test]
    fn splitting_input_at_any_byte_boundary_yields_the_same_result() {
        let input = r#"{"name":"café","nums":[1,2.5,-3e2],"ok":true}"#;
        let whole = {
            let mut p = TextParser::new();
            p.write(input.as_bytes());
            p.write(&[]);
            p.into_result()
        };
        for split in 0..input.len() {
            let mut p = TextParser::new();
            p.write(&input.as_bytes()[..split]);
            p.write(&input.as_bytes()[split..]);
            p.write(&[]);
            assert_eq!(p.into_result(), whole, "split at byte {split}");
        }
    }

    #[test]
    fn empty_containers_parse_to_canonical_empty() {
        assert_eq!(parse_all("[]").into_result(), Value::EmptyArray);
        assert_eq!(parse_all("{}").into_result(), Value::EmptyObject);
    }

    #[test]
    fn preprocessor_hook_runs_on_every_emitted_value() {
        let mut count = 0usize;
        let mut p = TextParser::with_hook(|v| {
            count += 1;
            v
        });
        p.write(r#"[1,2,3]"#.as_bytes());
        p.write(&[]);
        let _ = p.into_result();
        // 3 elements + the array itself.
        assert_eq!(count, 4);
    }
}
