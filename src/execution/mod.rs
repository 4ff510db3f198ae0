//! Benchmark harness: run a backend, time it, package the outcome.
//!
//! The [`Harness`] owns one result slot per [`Backend`]. Each [`Harness::run`]:
//!
//! - clears the slot for the chosen backend
//! - checks preconditions (non-empty input, backend ready) without starting the timer
//! - times the backend call with a monotonic clock, stopping it whatever the outcome
//! - stores a [`BenchmarkResult`] whose status is always `Success` or `Failure`
//!
//! Failures never escape as errors or panics; they are recorded in the result and, if an observer
//! is configured, reported to it.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use csv_backend_bench::backend::{BackendLoader, InterpretedBackend, NativeBackend};
//! use csv_backend_bench::execution::Harness;
//! use csv_backend_bench::types::{Backend, ParsedRecord};
//!
//! let native = Arc::new(NativeBackend::default());
//! native.load().unwrap();
//!
//! let mut harness = Harness::new(native, InterpretedBackend::default());
//! let result = harness.run_blocking("age\n5\n\n7\nabc\n", Backend::Native);
//!
//! assert!(result.status.is_success());
//! assert_eq!(
//!     result.records,
//!     vec![ParsedRecord::new(5, 5), ParsedRecord::new(7, 13), ParsedRecord::null()]
//! );
//! assert_eq!(result.columns(), vec!["age", "fib_age"]);
//! ```

mod observer;

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use futures::FutureExt;
use serde::Serialize;

use crate::backend::{InterpretedBackend, NativeBackend, ParseBackend, Readiness};
use crate::error::{RunError, RunSeverity};
use crate::processing::TransformStats;
use crate::projection::{self, RecordTable};
use crate::types::{Backend, ParsedRecord};

pub use observer::{
    CompositeObserver, FileObserver, HarnessObserver, RunContext, RunStats, StdErrObserver,
};

/// Options controlling harness reporting.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct HarnessOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn HarnessObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: RunSeverity,
}

impl fmt::Debug for HarnessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: RunSeverity::Critical,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure(RunError),
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&RunError> {
        match self {
            RunStatus::Success => None,
            RunStatus::Failure(e) => Some(e),
        }
    }
}

/// Everything one run produced. Replaced wholesale by the next run on the same slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub backend: Backend,
    /// Empty unless the run succeeded.
    pub records: Vec<ParsedRecord>,
    /// Time spent in the backend; `None` when a precondition failed before timing started.
    pub elapsed: Option<Duration>,
    pub status: RunStatus,
}

#[derive(Serialize)]
struct ResultView<'a> {
    backend: Backend,
    status: &'static str,
    message: Option<String>,
    elapsed_ms: Option<f64>,
    columns: Vec<&'static str>,
    records: &'a [ParsedRecord],
}

impl BenchmarkResult {
    fn success(backend: Backend, records: Vec<ParsedRecord>, elapsed: Duration) -> Self {
        Self {
            backend,
            records,
            elapsed: Some(elapsed),
            status: RunStatus::Success,
        }
    }

    fn failure(backend: Backend, elapsed: Option<Duration>, error: RunError) -> Self {
        Self {
            backend,
            records: Vec::new(),
            elapsed,
            status: RunStatus::Failure(error),
        }
    }

    /// Elapsed milliseconds rounded to two decimals.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.elapsed.map(observer::round_ms)
    }

    /// Display columns for [`Self::records`].
    pub fn columns(&self) -> Vec<&'static str> {
        projection::columns(&self.records)
    }

    /// Text grid of [`Self::records`].
    pub fn table(&self) -> RecordTable {
        projection::to_table(&self.records)
    }

    pub fn stats(&self) -> TransformStats {
        TransformStats::from_records(&self.records)
    }

    /// One-line status message for display.
    pub fn summary(&self) -> String {
        match &self.status {
            RunStatus::Success => format!(
                "Parsed successfully in {:.2} ms using {}.",
                self.elapsed_ms().unwrap_or_default(),
                self.backend
            ),
            RunStatus::Failure(err) => format!("Error parsing CSV using {}: {err}", self.backend),
        }
    }

    /// Serialize the result (backend, status, timing, columns, records) as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let (status, message) = match &self.status {
            RunStatus::Success => ("success", None),
            RunStatus::Failure(err) => ("failure", Some(err.to_string())),
        };
        serde_json::to_string(&ResultView {
            backend: self.backend,
            status,
            message,
            elapsed_ms: self.elapsed_ms(),
            columns: self.columns(),
            records: &self.records,
        })
    }
}

/// Results of running both backends on the same input.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendComparison {
    pub native: BenchmarkResult,
    pub interpreted: BenchmarkResult,
}

impl BackendComparison {
    /// Both runs succeeded and produced value-equal record sequences.
    pub fn records_match(&self) -> bool {
        self.native.status.is_success()
            && self.interpreted.status.is_success()
            && self.native.records == self.interpreted.records
    }

    /// How many times faster the native run was. `None` unless both runs succeeded.
    pub fn speedup(&self) -> Option<f64> {
        if !(self.native.status.is_success() && self.interpreted.status.is_success()) {
            return None;
        }
        let native = self.native.elapsed?.as_secs_f64();
        let interpreted = self.interpreted.elapsed?.as_secs_f64();
        (native > 0.0).then(|| interpreted / native)
    }
}

/// Runs backends and keeps the latest result per backend.
pub struct Harness {
    native: Arc<dyn ParseBackend>,
    interpreted: Arc<dyn ParseBackend>,
    options: HarnessOptions,
    results: [Option<BenchmarkResult>; 2],
}

impl Harness {
    /// Create a harness over the shared native backend and an interpreted backend.
    pub fn new(native: Arc<NativeBackend>, interpreted: InterpretedBackend) -> Self {
        Self::with_backends(native, Arc::new(interpreted))
    }

    /// Create a harness over arbitrary implementations of the two slots.
    ///
    /// # Panics
    ///
    /// Panics if a backend reports a [`ParseBackend::kind`] that does not match its slot.
    pub fn with_backends(native: Arc<dyn ParseBackend>, interpreted: Arc<dyn ParseBackend>) -> Self {
        assert!(
            native.kind() == Backend::Native,
            "native slot given a {} backend",
            native.kind()
        );
        assert!(
            interpreted.kind() == Backend::Interpreted,
            "interpreted slot given a {} backend",
            interpreted.kind()
        );
        Self {
            native,
            interpreted,
            options: HarnessOptions::default(),
            results: [None, None],
        }
    }

    /// Attach reporting options.
    pub fn with_options(mut self, options: HarnessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self, backend: Backend) -> &dyn ParseBackend {
        match backend {
            Backend::Native => self.native.as_ref(),
            Backend::Interpreted => self.interpreted.as_ref(),
        }
    }

    /// The most recent result for `backend`, if it has been run.
    pub fn last_result(&self, backend: Backend) -> Option<&BenchmarkResult> {
        self.results[backend.slot()].as_ref()
    }

    /// Run `backend` on `text` and store the result in its slot.
    pub async fn run(&mut self, text: &str, backend: Backend) -> &BenchmarkResult {
        let slot = backend.slot();
        self.results[slot] = None;

        let result = self.execute(text, backend).await;
        let ctx = RunContext {
            backend,
            input_bytes: text.len(),
            elapsed: result.elapsed,
        };
        self.report(&ctx, &result);
        self.results[slot].insert(result)
    }

    /// [`Self::run`] driven to completion on the current thread.
    pub fn run_blocking(&mut self, text: &str, backend: Backend) -> &BenchmarkResult {
        block_on(self.run(text, backend))
    }

    /// Run both backends on `text`, native first.
    pub async fn compare(&mut self, text: &str) -> BackendComparison {
        let native = self.run(text, Backend::Native).await.clone();
        let interpreted = self.run(text, Backend::Interpreted).await.clone();
        BackendComparison {
            native,
            interpreted,
        }
    }

    pub fn compare_blocking(&mut self, text: &str) -> BackendComparison {
        block_on(self.compare(text))
    }

    async fn execute(&self, text: &str, backend: Backend) -> BenchmarkResult {
        if text.is_empty() {
            return BenchmarkResult::failure(backend, None, RunError::InputMissing);
        }
        let engine = self.backend(backend);
        let state = engine.readiness();
        if state != Readiness::Ready {
            return BenchmarkResult::failure(backend, None, RunError::BackendNotReady { state });
        }

        let start = Instant::now();
        // `parse` itself runs inside the guarded future so eager work is covered too.
        let outcome = AssertUnwindSafe(async { engine.parse(text).await })
            .catch_unwind()
            .await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(records)) => BenchmarkResult::success(backend, records, elapsed),
            Ok(Err(e)) => BenchmarkResult::failure(backend, Some(elapsed), e.into()),
            Err(payload) => BenchmarkResult::failure(
                backend,
                Some(elapsed),
                RunError::BackendExecution(panic_message(payload.as_ref())),
            ),
        }
    }

    fn report(&self, ctx: &RunContext, result: &BenchmarkResult) {
        let Some(obs) = &self.options.observer else {
            return;
        };
        match &result.status {
            RunStatus::Success => {
                let stats = result.stats();
                obs.on_success(
                    ctx,
                    RunStats {
                        records: stats.rows,
                        null_records: stats.null_rows,
                    },
                );
            }
            RunStatus::Failure(err) => {
                let sev = err.severity();
                obs.on_failure(ctx, sev, err);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(ctx, sev, err);
                }
            }
        }
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("native_readiness", &self.native.readiness())
            .field("options", &self.options)
            .field("native_result", &self.results[0].is_some())
            .field("interpreted_result", &self.results[1].is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("backend panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("backend panicked: {s}")
    } else {
        "backend panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendLoader;
    use crate::error::BackendResult;
    use futures::future::BoxFuture;

    fn ready_harness() -> Harness {
        let native = Arc::new(NativeBackend::default());
        native.load().unwrap();
        Harness::new(native, InterpretedBackend::default())
    }

    #[test]
    fn empty_input_fails_fast_without_timing() {
        let mut harness = ready_harness();
        for backend in Backend::ALL {
            let result = harness.run_blocking("", backend);
            assert_eq!(result.status, RunStatus::Failure(RunError::InputMissing));
            assert_eq!(result.elapsed, None);
            assert!(result.records.is_empty());
        }
    }

    #[test]
    fn unloaded_native_backend_is_reported_not_raised() {
        let mut harness = Harness::new(Arc::new(NativeBackend::default()), InterpretedBackend::default());
        let result = harness.run_blocking("age\n1\n", Backend::Native);
        assert_eq!(
            result.status,
            RunStatus::Failure(RunError::BackendNotReady {
                state: Readiness::Uninitialized
            })
        );
        assert_eq!(result.elapsed_ms(), None);

        // The interpreted slot has no load step.
        assert!(harness.run_blocking("age\n1\n", Backend::Interpreted).status.is_success());
    }

    #[test]
    fn slots_are_independent_and_replaced_wholesale() {
        let mut harness = ready_harness();
        harness.run_blocking("age\n5\n", Backend::Native);
        harness.run_blocking("age\n6\n7\n", Backend::Interpreted);

        assert_eq!(
            harness.last_result(Backend::Native).unwrap().records,
            vec![ParsedRecord::new(5, 5)]
        );
        assert_eq!(harness.last_result(Backend::Interpreted).unwrap().records.len(), 2);

        harness.run_blocking("", Backend::Native);
        let native = harness.last_result(Backend::Native).unwrap();
        assert!(native.records.is_empty());
        assert!(!native.status.is_success());
        assert_eq!(harness.last_result(Backend::Interpreted).unwrap().records.len(), 2);
    }

    #[test]
    fn parse_failure_keeps_timing() {
        let mut harness = ready_harness();
        let result = harness.run_blocking("\n\n", Backend::Interpreted);
        assert!(matches!(result.status, RunStatus::Failure(RunError::Parse(_))));
        assert!(result.elapsed.is_some());
    }

    struct Panicking;

    impl ParseBackend for Panicking {
        fn kind(&self) -> Backend {
            Backend::Interpreted
        }

        fn parse<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, BackendResult<Vec<ParsedRecord>>> {
            async {
                let rows: Vec<ParsedRecord> = Vec::new();
                if rows.is_empty() {
                    panic!("boom");
                }
                Ok(rows)
            }
            .boxed()
        }
    }

    #[test]
    fn backend_panic_becomes_failure() {
        let native = Arc::new(NativeBackend::default());
        let mut harness = Harness::with_backends(native, Arc::new(Panicking));
        let result = harness.run_blocking("age\n1\n", Backend::Interpreted);
        assert_eq!(
            result.status,
            RunStatus::Failure(RunError::BackendExecution("backend panicked: boom".to_string()))
        );
    }

    /// Panics while building its future, before anything is polled.
    struct PanicsOnCall;

    impl ParseBackend for PanicsOnCall {
        fn kind(&self) -> Backend {
            Backend::Interpreted
        }

        fn parse<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, BackendResult<Vec<ParsedRecord>>> {
            panic!("eager boom")
        }
    }

    #[test]
    fn backend_panicking_before_its_future_exists_becomes_failure() {
        let native = Arc::new(NativeBackend::default());
        native.load().unwrap();
        let mut harness = Harness::with_backends(native, Arc::new(PanicsOnCall));
        harness.run_blocking("age\n1\n", Backend::Native);

        let result = harness.run_blocking("age\n1\n", Backend::Interpreted).clone();
        assert_eq!(
            result.status,
            RunStatus::Failure(RunError::BackendExecution(
                "backend panicked: eager boom".to_string()
            ))
        );
        assert!(result.elapsed.is_some());
        assert_eq!(harness.last_result(Backend::Interpreted), Some(&result));
        assert!(harness.last_result(Backend::Native).unwrap().status.is_success());
    }

    #[test]
    #[should_panic(expected = "native slot given a Interpreted backend")]
    fn mismatched_slot_is_rejected() {
        let _ = Harness::with_backends(Arc::new(Panicking), Arc::new(InterpretedBackend::default()));
    }

    #[test]
    fn summary_and_json_describe_the_run() {
        let mut harness = ready_harness();
        let result = harness.run_blocking("age\n5\nx\n", Backend::Native).clone();
        assert!(result.summary().starts_with("Parsed successfully in "));
        assert!(result.summary().ends_with(" ms using Native."));

        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["backend"], "Native");
        assert_eq!(json["status"], "success");
        assert_eq!(json["columns"], serde_json::json!(["age", "fib_age"]));
        assert_eq!(
            json["records"],
            serde_json::json!([{"age": 5, "fib_age": 5}, {"age": null, "fib_age": null}])
        );

        assert_eq!(result.table().to_string().lines().nth(2), Some("   5 |       5"));

        let failed = harness.run_blocking("", Backend::Interpreted);
        assert_eq!(
            failed.summary(),
            "Error parsing CSV using Interpreted: no input text supplied"
        );
    }
}
