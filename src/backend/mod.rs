//! Interchangeable parse-and-transform backends.
//!
//! Both backends take raw CSV text and return one [`ParsedRecord`] per data row, in input order.
//! For equal input they return equal records; only their speed differs.
//!
//! - [`NativeBackend`]: positional byte-level tokenizer plus a worker pool. Must be loaded (see
//!   [`BackendLoader`]) before it can be invoked.
//! - [`InterpretedBackend`]: the generic keyed-row pipeline
//!   ([`crate::ingestion::parse_records`] then [`crate::processing::transform`]). Always ready, and
//!   yields to the executor while it works.

mod interpreted;
mod native;
mod readiness;

use futures::future::BoxFuture;

use crate::error::{BackendResult, LoadError};
use crate::types::{Backend, ParsedRecord};

pub use interpreted::{InterpretedBackend, InterpretedOptions};
pub use native::{NativeBackend, NativeOptions};
pub use readiness::{Readiness, ReadinessCell};

/// Uniform contract satisfied by every backend.
pub trait ParseBackend: Send + Sync {
    /// Which slot this backend fills.
    fn kind(&self) -> Backend;

    /// Current lifecycle state. Backends without a load step are always ready.
    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Parse and transform `text`.
    fn parse<'a>(&'a self, text: &'a str) -> BoxFuture<'a, BackendResult<Vec<ParsedRecord>>>;
}

/// Startup hook driven by whoever owns process initialization.
pub trait BackendLoader {
    /// Perform the one-time load. Calling it more than once is an error.
    fn load(&self) -> Result<(), LoadError>;

    /// Synchronous readiness query.
    fn is_ready(&self) -> bool;
}
