//! Structural transforms (`spec.md` §4.4). Every transform here produces
//! a brand new `Value` sharing no *mutable* state with the receiver —
//! the backing `Container`s may still share read-only allocations with
//! unrelated `Value`s, which is the point of reference counting.

use crate::container::ContainerBuilder;
use crate::key::Key;
use crate::value::{KeyValue, Value};

impl Value {
    fn array_slice(&self) -> &[Value] {
        match self {
            Value::Array(c) => c.as_slice(),
            _ => &[],
        }
    }
    fn object_slice(&self) -> &[KeyValue] {
        match self {
            Value::Object(c) => c.as_slice(),
            _ => &[],
        }
    }

    /// `map` with `Value -> Value`: yields an array, dropping any
    /// element the function maps to `Undefined`.
    pub fn map_to_array<F: Fn(&Value) -> Value>(&self, f: F) -> Value {
        let mut out = ContainerBuilder::with_capacity(self.array_slice().len());
        for item in self.array_slice() {
            let mapped = f(item);
            if !mapped.is_undefined() {
                out.push(mapped);
            }
        }
        if out.is_empty() {
            Value::EmptyArray
        } else {
            Value::Array(out.freeze())
        }
    }

    /// `map` with `Value -> KeyValue`: yields a sorted object, dropping
    /// entries whose value is `Undefined`.
    pub fn map_to_object<F: Fn(&Value) -> KeyValue>(&self, f: F) -> Value {
        let mut pairs: Vec<KeyValue> = self
            .array_slice()
            .iter()
            .map(f)
            .filter(|kv| !kv.value.is_undefined())
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        Value::object(pairs)
    }

    /// `map` with `KeyValue -> KeyValue`: yields a sorted object,
    /// dropping entries whose new value is `Undefined`.
    pub fn map_entries_to_object<F: Fn(&KeyValue) -> KeyValue>(&self, f: F) -> Value {
        let mut pairs: Vec<KeyValue> = self
            .object_slice()
            .iter()
            .map(f)
            .filter(|kv| !kv.value.is_undefined())
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        Value::object(pairs)
    }

    /// `map` with `KeyValue -> Value`: yields an array.
    pub fn map_entries_to_array<F: Fn(&KeyValue) -> Value>(&self, f: F) -> Value {
        let mapped: Vec<Value> = self
            .object_slice()
            .iter()
            .map(f)
            .filter(|v| !v.is_undefined())
            .collect();
        Value::array(mapped)
    }

    /// Keep array elements for which `pred` is true.
    pub fn filter<F: Fn(&Value) -> bool>(&self, pred: F) -> Value {
        Value::array(self.array_slice().iter().filter(|v| pred(v)).cloned())
    }

    /// Keep object entries for which `pred` is true.
    pub fn filter_entries<F: Fn(&KeyValue) -> bool>(&self, pred: F) -> Value {
        Value::object(
            self.object_slice()
                .iter()
                .filter(|kv| pred(kv))
                .cloned(),
        )
    }

    /// Removes `[from, to)` and inserts `new_items` at that position.
    /// Returns `(result, removed)`, the removed elements as their own
    /// array — the one bug the source has here (`spec.md` §9 point 4,
    /// constructing the removed range from a dangling iterator instead
    /// of a real container) does not reproduce in this implementation:
    /// the removed slice is cloned into its own `Container` up front.
    pub fn splice(&self, from: usize, to: usize, new_items: impl IntoIterator<Item = Value>) -> (Value, Value) {
        let src = self.array_slice();
        let from = from.min(src.len());
        let to = to.clamp(from, src.len());

        let removed = Value::array(src[from..to].iter().cloned());

        let mut out = ContainerBuilder::with_capacity(src.len() - (to - from));
        for v in &src[..from] {
            out.push(v.clone());
        }
        for v in new_items {
            out.push(v);
        }
        for v in &src[to..] {
            out.push(v.clone());
        }
        let result = if out.is_empty() {
            Value::EmptyArray
        } else {
            Value::Array(out.freeze())
        };
        (result, removed)
    }

    pub fn insert(&self, at: usize, value: Value) -> Value {
        self.splice(at, at, std::iter::once(value)).0
    }

    pub fn erase(&self, at: usize) -> Value {
        self.splice(at, at + 1, std::iter::empty()).0
    }

    pub fn append(&self, value: Value) -> Value {
        let len = self.array_slice().len();
        self.splice(len, len, std::iter::once(value)).0
    }

    /// A read-only copy of `[from, to)`, without removing it from `self`.
    pub fn slice(&self, from: usize, to: usize) -> Value {
        let src = self.array_slice();
        let from = from.min(src.len());
        let to = to.clamp(from, src.len());
        Value::array(src[from..to].iter().cloned())
    }

    /// Merges two sorted objects. `other` wins on key collision; if
    /// `other`'s value for a colliding key is `Undefined`, the key is
    /// deleted from the result. Keys present in only one side are kept
    /// (`spec.md` §4.4).
    pub fn merge_keys(&self, other: &Value) -> Value {
        let a = self.object_slice();
        let b = other.object_slice();
        let mut out = ContainerBuilder::with_capacity(a.len() + b.len());

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].key.cmp(&b[j].key) {
                std::cmp::Ordering::Less => {
                    out.push(a[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    if !b[j].value.is_undefined() {
                        out.push(b[j].clone());
                    }
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    if !b[j].value.is_undefined() {
                        out.push(b[j].clone());
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        for kv in &a[i..] {
            out.push(kv.clone());
        }
        for kv in &b[j..] {
            if !kv.value.is_undefined() {
                out.push(kv.clone());
            }
        }
        if out.is_empty() {
            Value::EmptyObject
        } else {
            Value::Object(out.freeze())
        }
    }

    /// Equivalent to `merge_keys` after constructing and sorting `list`
    /// into an object (`spec.md` §4.4).
    pub fn set_keys<I: IntoIterator<Item = (Key, Value)>>(&self, list: I) -> Value {
        let pairs = list.into_iter().map(|(k, v)| KeyValue { key: k, value: v });
        self.merge_keys(&Value::object(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn arr(items: &[i64]) -> Value {
        Value::array(items.iter().map(|&i| Value::from(i)))
    }

    #[test]
    fn map_skips_undefined_outputs() {
        let v = arr(&[1, 2, 3]);
        let mapped = v.map_to_array(|x| {
            if x.get_int() % 2 == 0 {
                Value::Undefined
            } else {
                Value::from(x.get_int() * 10)
            }
        });
        assert_eq!(mapped, arr(&[10, 30]));
    }

    #[test]
    fn map_identity_on_array_without_undefined() {
        let v = arr(&[1, 2, 3]);
        let mapped = v.map_to_array(|x| x.clone());
        assert_eq!(mapped, v);
    }

    #[test]
    fn filter_excludes_string_that_reads_as_even() {
        let v = Value::array(vec![
            Value::from(1),
            Value::from(2),
            Value::from(3),
            Value::from("4"),
            Value::from(5),
            Value::from(6),
            Value::from(7),
            Value::from(8),
            Value::from(9),
            Value::from(10),
        ]);
        let odd = v.filter(|x| x.get_int() % 2 != 0);
        assert_eq!(odd, arr(&[1, 3, 5, 7, 9]));
    }

    #[test]
    fn splice_returns_result_and_removed() {
        let v = arr(&[1, 2, 3, 4, 5]);
        let (result, removed) = v.splice(1, 3, vec![Value::from(99)]);
        assert_eq!(result, arr(&[1, 99, 4, 5]));
        assert_eq!(removed, arr(&[2, 3]));
    }

    #[test]
    fn merge_keys_deletes_on_undefined_rhs() {
        let a = Value::object(vec![
            KeyValue::new("a", 1),
            KeyValue::new("b", 2),
            KeyValue::new("c", 3),
        ]);
        let b = Value::object(vec![KeyValue::new("b", Value::Undefined), KeyValue::new("d", 4)]);
        let merged = a.merge_keys(&b);
        let keys: Vec<&str> = merged.keys().iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
    }

    #[test]
    fn merge_keys_rhs_wins_on_collision() {
        let a = Value::object(vec![KeyValue::new("a", 1)]);
        let b = Value::object(vec![KeyValue::new("a", 2)]);
        let merged = a.merge_keys(&b);
        assert_eq!(merged.get("a").get_int(), 2);
    }

    #[test]
    fn set_keys_builds_then_merges() {
        let a = Value::object(vec![KeyValue::new("a", 1)]);
        let merged = a.set_keys(vec![(Key::from("b"), Value::from(2))]);
        assert_eq!(merged.get("a").get_int(), 1);
        assert_eq!(merged.get("b").get_int(), 2);
    }
}
