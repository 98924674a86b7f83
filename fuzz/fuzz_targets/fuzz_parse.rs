#![no_main]
use jsonvalue::{parse, stringify};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let v = match parse(data) {
        Ok(v) => v,
        Err(_) => return,
    };

    // A value that parsed successfully must re-stringify to text that
    // parses back to an equal value: the text codec never silently
    // drops or reorders a valid document's content.
    let serialized = stringify(&v);
    let reparsed = match parse(&serialized) {
        Ok(r) => r,
        Err(_) => panic!("re-parse of stringify() output failed"),
    };

    assert_eq!(v, reparsed, "text parse/stringify roundtrip mismatch");
});
