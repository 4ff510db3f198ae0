//! Field transformation.
//!
//! The processing layer turns header-keyed rows produced by [`crate::ingestion`] into
//! [`crate::types::ParsedRecord`]s:
//!
//! - [`transform()`]: look up `age`, coerce it, derive `fib_age`
//! - [`transform_with()`]: the same, honoring [`crate::ingestion::ParseOptions::trim_values`]
//! - [`fib()`]: checked Fibonacci numbers
//!
//! ## Example
//!
//! ```rust
//! use csv_backend_bench::processing::transform;
//! use csv_backend_bench::types::{ParsedRecord, RawRecord};
//!
//! let row: RawRecord = [("age", "10")].into_iter().collect();
//! assert_eq!(transform(&row), ParsedRecord::new(10, 55));
//!
//! let bad: RawRecord = [("age", "ten")].into_iter().collect();
//! assert!(transform(&bad).is_null());
//! ```

pub mod fib;
pub mod transform;

pub use fib::{fib, MAX_FIB_INPUT};
pub use transform::{
    coerce_age, coerce_age_bytes, derive, parse_age, parse_age_bytes, transform, transform_with,
    TransformStats, AGE_KEY,
};
