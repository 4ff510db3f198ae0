use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::error::{RunError, RunSeverity};
use crate::types::Backend;

/// Context about a finished harness run, passed to every callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Slot the run was dispatched to.
    pub backend: Backend,
    /// Size of the input text.
    pub input_bytes: usize,
    /// Time spent inside the backend. `None` when a precondition failed and nothing was timed.
    pub elapsed: Option<Duration>,
}

impl RunContext {
    /// [`Self::elapsed`] in milliseconds, rounded to two decimals.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.elapsed.map(round_ms)
    }
}

/// Record counts reported on a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Number of produced records.
    pub records: usize,
    /// Records whose `age` was coerced to null.
    pub null_records: usize,
}

/// Observer interface for harness outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait HarnessObserver: Send + Sync {
    /// Called when a run succeeds.
    fn on_success(&self, _ctx: &RunContext, _stats: RunStats) {}

    /// Called when a run fails.
    fn on_failure(&self, _ctx: &RunContext, _severity: RunSeverity, _error: &RunError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each member, in insertion order.
#[derive(Default)]
pub struct CompositeObserver {
    members: Vec<Arc<dyn HarnessObserver>>,
}

impl CompositeObserver {
    pub fn new(members: Vec<Arc<dyn HarnessObserver>>) -> Self {
        Self { members }
    }

    /// Add a member; builder style.
    pub fn with(mut self, member: Arc<dyn HarnessObserver>) -> Self {
        self.members.push(member);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Arc<dyn HarnessObserver>> for CompositeObserver {
    fn from_iter<I: IntoIterator<Item = Arc<dyn HarnessObserver>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("members", &self.members.len())
            .finish()
    }
}

impl HarnessObserver for CompositeObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        self.members.iter().for_each(|m| m.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        self.members
            .iter()
            .for_each(|m| m.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        self.members
            .iter()
            .for_each(|m| m.on_alert(ctx, severity, error));
    }
}

/// Writes one `key=value` line per run to stderr.
///
/// ```text
/// csv-backend-bench ok backend=Native bytes=24 elapsed_ms=0.31 records=3 nulls=1
/// csv-backend-bench error backend=Interpreted bytes=2 elapsed_ms=0.02 err="parse error: ..."
/// csv-backend-bench ALERT critical backend=Native bytes=9 elapsed_ms=1.50 err="..."
/// ```
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn prefix(ctx: &RunContext) -> String {
        let elapsed = ctx
            .elapsed_ms()
            .map_or_else(|| "-".to_string(), |ms| format!("{ms:.2}"));
        format!(
            "backend={} bytes={} elapsed_ms={elapsed}",
            ctx.backend, ctx.input_bytes
        )
    }

    pub(crate) fn success_line(ctx: &RunContext, stats: RunStats) -> String {
        format!(
            "csv-backend-bench ok {} records={} nulls={}",
            Self::prefix(ctx),
            stats.records,
            stats.null_records
        )
    }

    pub(crate) fn failure_line(
        alert: bool,
        ctx: &RunContext,
        severity: RunSeverity,
        error: &RunError,
    ) -> String {
        format!(
            "csv-backend-bench {}{} {} err={:?}",
            if alert { "ALERT " } else { "" },
            severity.as_str(),
            Self::prefix(ctx),
            error.to_string()
        )
    }
}

impl HarnessObserver for StdErrObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        eprintln!("{}", Self::success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        eprintln!("{}", Self::failure_line(false, ctx, severity, error));
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        eprintln!("{}", Self::failure_line(true, ctx, severity, error));
    }
}

/// Appends run events to a local file, one JSON object per line.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, event: serde_json::Value) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{event}");
        }
    }

    fn failure_event(
        kind: &str,
        ctx: &RunContext,
        severity: RunSeverity,
        error: &RunError,
    ) -> serde_json::Value {
        json!({
            "ts": unix_ts(),
            "event": kind,
            "severity": severity.as_str(),
            "backend": ctx.backend,
            "bytes": ctx.input_bytes,
            "elapsed_ms": ctx.elapsed_ms(),
            "error": error.to_string(),
        })
    }
}

impl HarnessObserver for FileObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        self.append(json!({
            "ts": unix_ts(),
            "event": "ok",
            "backend": ctx.backend,
            "bytes": ctx.input_bytes,
            "records": stats.records,
            "null_records": stats.null_records,
            "elapsed_ms": ctx.elapsed_ms(),
        }));
    }

    fn on_failure(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        self.append(Self::failure_event("fail", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &RunContext, severity: RunSeverity, error: &RunError) {
        self.append(Self::failure_event("alert", ctx, severity, error));
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

/// Milliseconds rounded to two decimals.
pub(crate) fn round_ms(d: Duration) -> f64 {
    (millis(d) * 100.0).round() / 100.0
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
