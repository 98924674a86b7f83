#![no_main]
use jsonvalue::{binarize, parse, unbinarize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let v = match parse(data) {
        Ok(v) => v,
        Err(_) => return,
    };

    let bin = binarize(&v);
    let back = match unbinarize(&bin) {
        Ok(b) => b,
        Err(_) => panic!("unbinarize of binarize() output failed"),
    };

    assert_eq!(v, back, "binary roundtrip mismatch");

    // Re-encoding a decoded value must be byte-identical: the binary
    // codec carries no format choices (compression, key order) that a
    // second pass could make differently.
    assert_eq!(bin, binarize(&back), "re-encoding the decoded value changed its bytes");
});
