//! Per-row field coercion: `age` in, `{age, fib_age}` out.

use crate::ingestion::ParseOptions;
use crate::types::{ParsedRecord, RawRecord};

use super::fib::fib;

/// Header key holding the numeric input field.
pub const AGE_KEY: &str = "age";

/// Transform one keyed row into a [`ParsedRecord`] with default options.
///
/// Never fails: a missing `age`, or one that is not a non-negative base-10 integer whose Fibonacci
/// number fits in 64 bits, yields [`ParsedRecord::null`].
pub fn transform(row: &RawRecord) -> ParsedRecord {
    transform_with(row, &ParseOptions::default())
}

/// [`transform`] honoring [`ParseOptions::trim_values`].
pub fn transform_with(row: &RawRecord, options: &ParseOptions) -> ParsedRecord {
    row.get(AGE_KEY)
        .map_or_else(ParsedRecord::null, |raw| coerce_age(raw, options))
}

/// Coerce a single `age` cell.
pub fn coerce_age(raw: &str, options: &ParseOptions) -> ParsedRecord {
    derive(parse_age(raw, options))
}

/// Byte-level variant of [`coerce_age`] used by the native engine.
pub fn coerce_age_bytes(raw: &[u8], options: &ParseOptions) -> ParsedRecord {
    derive(parse_age_bytes(raw, options))
}

/// Parse an `age` cell as a non-negative base-10 integer.
pub fn parse_age(raw: &str, options: &ParseOptions) -> Option<u64> {
    options.value(raw).parse::<u64>().ok()
}

pub fn parse_age_bytes(raw: &[u8], options: &ParseOptions) -> Option<u64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|raw| parse_age(raw, options))
}

/// Build the output record for an already parsed age.
pub fn derive(age: Option<u64>) -> ParsedRecord {
    match age.and_then(|age| fib(age).map(|fib_age| (age, fib_age))) {
        Some((age, fib_age)) => ParsedRecord::new(age, fib_age),
        None => ParsedRecord::null(),
    }
}

/// Row counts for a batch of transformed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Total rows produced.
    pub rows: usize,
    /// Rows whose `age` was coerced to null.
    pub null_rows: usize,
}

impl TransformStats {
    pub fn from_records(records: &[ParsedRecord]) -> Self {
        Self {
            rows: records.len(),
            null_rows: records.iter().filter(|r| r.is_null()).count(),
        }
    }
}
