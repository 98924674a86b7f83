//! Extension point letting a user-defined opaque entity masquerade as a
//! `Value` variant (`spec.md` §2 "Custom value hook", §9).
//!
//! A capability interface with sensible defaults, per §9: most custom
//! values only need to implement `to_json` (their serialization
//! projection); everything else falls back to a leaf-like default.

use crate::value::{LogicalType, Value};
use std::fmt;

pub trait CustomValue: fmt::Debug + Send + Sync {
    /// A human-readable type name, used only for diagnostics.
    fn type_name(&self) -> &str;

    /// Which of the seven logical types this value reports as
    /// (`spec.md` §9) — independent of how it projects to JSON, though
    /// most implementations will just forward to `to_json().logical_type()`.
    fn logical_type(&self) -> LogicalType {
        self.to_json().logical_type()
    }

    /// The JSON projection used by both serializers. This is the one
    /// method every custom value must provide.
    fn to_json(&self) -> Value;

    /// String rendering, defaulting to the projection's own string
    /// coercion (e.g. a custom duration value might render "5s" here
    /// while projecting as a number of seconds for `to_json`).
    fn to_display_string(&self) -> String {
        self.to_json().get_string_or("")
    }

    /// If this custom value behaves as a string leaf.
    fn get_string(&self) -> &str {
        ""
    }

    /// If this custom value behaves as a container, its element count.
    fn size(&self) -> usize {
        0
    }

    fn get_by_index(&self, _index: usize) -> Value {
        Value::Undefined
    }

    fn get_by_key(&self, _key: &str) -> Value {
        Value::Undefined
    }

    /// Structural equality is opt-in. The default is `false`: two
    /// distinct custom values never compare equal unless the
    /// implementation says otherwise. Identity (same `Arc` allocation)
    /// is checked separately by `Value`'s `PartialEq` before this is
    /// ever consulted, which is what makes identity the real default.
    fn equals(&self, _other: &dyn CustomValue) -> bool {
        false
    }
}
