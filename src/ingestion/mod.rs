//! Record parsing.
//!
//! [`parse_records`] turns raw CSV text into a lazy sequence of header-keyed
//! [`crate::types::RawRecord`]s. Tokenizer settings live in [`ParseOptions`].

pub mod csv;

pub use self::csv::{parse_records, ParseOptions, RawRecords};
