//! Core data model types.
//!
//! Rows flow through the pipeline as [`RawRecord`]s (header-keyed strings) and come out as
//! [`ParsedRecord`]s, whose two fields are named by [`ParsedRecord::FIELDS`].

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Which backend implements the parse-and-transform pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Backend {
    /// Compiled, performance-oriented engine.
    Native,
    /// Generic keyed-row engine that suspends cooperatively while it works.
    Interpreted,
}

impl Backend {
    /// Both backends, in slot order.
    pub const ALL: [Backend; 2] = [Backend::Native, Backend::Interpreted];

    pub(crate) fn slot(self) -> usize {
        match self {
            Backend::Native => 0,
            Backend::Interpreted => 1,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native => f.write_str("Native"),
            Backend::Interpreted => f.write_str("Interpreted"),
        }
    }
}

/// One data row keyed by trimmed header token.
///
/// Keys missing from a short row are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell. If `key` is already present the existing value is kept.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rec = RawRecord::new();
        for (k, v) in iter {
            rec.insert(k, v);
        }
        rec
    }
}

/// The semantic output unit: an age and its Fibonacci number, or neither.
///
/// Both fields are stored as a single optional pair, so a record with only one of them set cannot
/// be constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParsedRecord {
    value: Option<(u64, u64)>,
}

impl ParsedRecord {
    /// Canonical field names, in declaration order.
    pub const FIELDS: [&'static str; 2] = ["age", "fib_age"];

    pub fn new(age: u64, fib_age: u64) -> Self {
        Self {
            value: Some((age, fib_age)),
        }
    }

    /// A record whose `age` was absent or could not be coerced.
    pub fn null() -> Self {
        Self { value: None }
    }

    pub fn age(&self) -> Option<u64> {
        self.value.map(|(age, _)| age)
    }

    pub fn fib_age(&self) -> Option<u64> {
        self.value.map(|(_, fib)| fib)
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Both fields in [`Self::FIELDS`] order.
    pub fn fields(&self) -> [Option<u64>; 2] {
        [self.age(), self.fib_age()]
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ParsedRecord", 2)?;
        s.serialize_field("age", &self.age())?;
        s.serialize_field("fib_age", &self.fib_age())?;
        s.end()
    }
}
