//! Object keys: strings with a total order, so objects can be stored
//! sorted and searched with `binary_search` (`spec.md` §3.4, §4.3).

use crate::strings::JsonStr;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Key(JsonStr);

impl Key {
    pub fn new(s: impl Into<JsonStr>) -> Self {
        Key(s.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lexicographic byte comparison of the UTF-8 key, which is what
        // `str`'s own `Ord` already does.
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic_by_byte() {
        let mut keys = vec![Key::from("b"), Key::from("a"), Key::from("c")];
        keys.sort();
        let strs: Vec<&str> = keys.iter().map(Key::as_str).collect();
        assert_eq!(strs, vec!["a", "b", "c"]);
    }
}
