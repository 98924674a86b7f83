#![no_main]
use jsonvalue::Value;
use libfuzzer_sys::fuzz_target;

/// Recursively walk a value tree to force full decoding of nested
/// containers (arrays/objects hold lazily-unused data otherwise).
fn walk(v: &Value) {
    for i in 0..v.array_len() {
        walk(v.get_index(i));
    }
    for kv in v.keys() {
        walk(&kv.value);
    }
}

fuzz_target!(|data: &[u8]| {
    // The binary reader must never panic on arbitrary bytes, valid
    // header or not.
    if let Ok(v) = jsonvalue::unbinarize(data) {
        walk(&v);
    }
});
