//! `csv-backend-bench` parses CSV text, derives a Fibonacci column from each row's `age`, and times
//! the same work on two interchangeable backends so their output and speed can be compared.
//!
//! The primary entrypoint is [`execution::Harness`], which runs one backend per call and keeps the
//! latest [`execution::BenchmarkResult`] for each.
//!
//! ## Pipeline
//!
//! - [`ingestion`]: CSV text → header-keyed [`types::RawRecord`]s. The first non-empty line is the
//!   header (tokens trimmed), blank lines are skipped, RFC4180 quoting is honored.
//! - [`processing`]: `age` → [`types::ParsedRecord`] `{age, fib_age}`. Missing, non-numeric,
//!   negative, or overflowing ages produce a record with both fields null; rows are never dropped.
//! - [`backend`]: [`backend::NativeBackend`] (byte-level, worker pool, must be loaded first) and
//!   [`backend::InterpretedBackend`] (keyed rows, cooperative). Same input, same records.
//! - [`execution`]: the timing harness plus observer hooks for logging and alerts.
//! - [`projection`]: display columns and a plain-text record table.
//!
//! ## Quick example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use csv_backend_bench::backend::{BackendLoader, InterpretedBackend, NativeBackend};
//! use csv_backend_bench::execution::Harness;
//!
//! let native = Arc::new(NativeBackend::default());
//! native.load().unwrap();
//! let mut harness = Harness::new(native, InterpretedBackend::default());
//!
//! let cmp = harness.compare_blocking("name,age\nAda,10\nBob,n/a\n");
//! assert!(cmp.records_match());
//! assert_eq!(cmp.native.records[0].fib_age(), Some(55));
//! println!("{}", cmp.native.summary());
//! println!("{}", cmp.interpreted.summary());
//! ```
//!
//! ## Observability
//!
//! Attach a [`execution::HarnessObserver`] through [`execution::HarnessOptions`]. Failures are
//! classified by [`RunSeverity`]: missing input and an unready backend are `Warning`, unusable CSV
//! is `Error`, and a backend failure (including a panic) is `Critical`.

pub mod backend;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod processing;
pub mod projection;
pub mod types;

pub use error::{
    BackendError, BackendResult, LoadError, ParseError, ParseResult, RunError, RunSeverity,
};
