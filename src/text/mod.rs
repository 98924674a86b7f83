//! Incremental text JSON parsing and serialization (`spec.md` §4.5, §4.7).

pub mod parser;
pub mod serializer;

pub use parser::TextParser;
pub use serializer::TextSerializer;

use crate::error::ParseError;
use crate::value::Value;

/// One-shot parse of a complete text JSON buffer (`spec.md` §6.1).
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut p = TextParser::new();
    p.write(text.as_bytes());
    p.write(&[]);
    if let Some(e) = p.error() {
        return Err(e.clone());
    }
    Ok(p.into_result())
}

/// One-shot serialize to a `String` (`spec.md` §6.1).
pub fn stringify(value: &Value) -> String {
    let mut s = TextSerializer::new();
    s.start(value);
    let mut out = Vec::new();
    while s.write(&mut out) {}
    String::from_utf8(out).expect("serializer only emits valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::KeyValue;

    #[test]
    fn parse_then_stringify_round_trips_sorted_object() {
        let v = parse(r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(stringify(&v), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn parse_rejects_garbage_with_offset() {
        let err = parse("not json").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn stringify_elides_undefined_array_elements() {
        let v = Value::array(vec![Value::from(1), Value::Undefined, Value::from(2)]);
        assert_eq!(stringify(&v), "[1,2]");
    }

    #[test]
    fn stringify_elides_undefined_object_entries() {
        let v = Value::object(vec![
            KeyValue::new("a", 1),
            KeyValue::new("b", Value::Undefined),
        ]);
        assert_eq!(stringify(&v), r#"{"a":1}"#);
    }
}
