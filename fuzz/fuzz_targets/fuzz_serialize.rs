#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use jsonvalue::{binarize, stringify, unbinarize, KeyValue, Value};
use libfuzzer_sys::fuzz_target;

/// Build an arbitrary value tree straight from fuzzer bytes, reaching
/// shapes text input can't — `Undefined` nested in containers, `NaN`
/// floats — so the serializers see input the parser-driven fuzzers
/// never produce.
fn arbitrary_value(u: &mut Unstructured, depth: u32) -> arbitrary::Result<Value> {
    if depth == 0 || u.is_empty() {
        return arbitrary_scalar(u);
    }
    match u.int_in_range(0..=5)? {
        0..=2 => arbitrary_scalar(u),
        3 => {
            let len = u.int_in_range(0..=6)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_value(u, depth - 1)?);
            }
            Ok(Value::array(items))
        }
        4 => {
            let len = u.int_in_range(0..=6)?;
            let mut pairs = Vec::with_capacity(len);
            for _ in 0..len {
                let key = String::arbitrary(u)?;
                let value = arbitrary_value(u, depth - 1)?;
                pairs.push(KeyValue::new(key, value));
            }
            Ok(Value::object(pairs))
        }
        _ => Ok(Value::Undefined),
    }
}

fn arbitrary_scalar(u: &mut Unstructured) -> arbitrary::Result<Value> {
    match u.int_in_range(0..=4)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::from(bool::arbitrary(u)?)),
        2 => Ok(Value::from(i64::arbitrary(u)?)),
        3 => Ok(Value::from(f64::arbitrary(u)?)),
        _ => Ok(Value::from(String::arbitrary(u)?)),
    }
}

/// Structural equality that treats `Undefined` as equal to itself and
/// `NaN` floats as equal by bit pattern. `Value`'s own `PartialEq`
/// deliberately can't do either (spec.md §3.6, §4.2), so a roundtrip
/// check over arbitrary generated trees needs its own notion of
/// "same shape" rather than the type's `==`.
fn deep_eq(a: &Value, b: &Value) -> bool {
    if a.is_undefined() || b.is_undefined() {
        return a.is_undefined() && b.is_undefined();
    }
    if a.is_array() || b.is_array() {
        return a.is_array()
            && b.is_array()
            && a.array_len() == b.array_len()
            && (0..a.array_len()).all(|i| deep_eq(a.get_index(i), b.get_index(i)));
    }
    if a.is_object() || b.is_object() {
        let ak = a.keys();
        let bk = b.keys();
        return a.is_object()
            && b.is_object()
            && ak.len() == bk.len()
            && ak.iter().zip(bk).all(|(x, y)| x.key == y.key && deep_eq(&x.value, &y.value));
    }
    if let (Some(x), Some(y)) = (as_f64_bits(a), as_f64_bits(b)) {
        return x == y;
    }
    a == b
}

fn as_f64_bits(v: &Value) -> Option<u64> {
    match v {
        Value::Float(f) => Some(f.to_bits()),
        _ => None,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let v = match arbitrary_value(&mut u, 4) {
        Ok(v) => v,
        Err(_) => return,
    };

    // Neither serializer may panic on any value the model can express.
    let text = stringify(&v);
    let bin = binarize(&v);

    // The binary codec is lossless for the whole value space, Undefined
    // included.
    let back = match unbinarize(&bin) {
        Ok(b) => b,
        Err(_) => panic!("unbinarize of binarize() output failed"),
    };
    assert!(deep_eq(&v, &back), "binary serialize/deserialize mismatch");

    // Text output must itself be parseable, independent of whether it
    // equals the source value (Undefined is elided, NaN becomes null).
    if jsonvalue::parse(&text).is_err() {
        panic!("stringify() produced text that fails to parse");
    }
});
