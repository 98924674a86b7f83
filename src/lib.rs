//! An immutable JSON value model with incremental text and binary-TLV
//! codecs, designed to be driven in bounded chunks by an external
//! coroutine/event loop rather than performing I/O itself.
//!
//! # Example
//!
//! ```rust
//! use jsonvalue::{parse, stringify, Value};
//!
//! let v = parse(r#"{"b": 1, "a": 2}"#).unwrap();
//! assert_eq!(v.get("a").get_int(), 2);
//! assert_eq!(stringify(&v), r#"{"a":2,"b":1}"#);
//! ```

mod container;
mod custom;
mod error;
mod key;
mod strings;
mod transform;
mod value;

pub mod binary;
pub mod text;

pub use container::{Container, ContainerBuilder};
pub use custom::CustomValue;
pub use error::{Error, ParseError, Result};
pub use key::Key;
pub use strings::JsonStr;
pub use value::{KeyValue, LogicalType, StorageTag, Value, UNDEFINED};

pub use binary::{binarize, unbinarize, BinaryParser, BinarySerializer};
pub use text::{parse, stringify, TextParser, TextSerializer};
