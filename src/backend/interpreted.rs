use std::task::Poll;

use futures::future::{poll_fn, BoxFuture, FutureExt};

use crate::error::BackendResult;
use crate::ingestion::{parse_records, ParseOptions};
use crate::processing::transform_with;
use crate::types::{Backend, ParsedRecord};

use super::ParseBackend;

/// Configuration for the [`InterpretedBackend`].
#[derive(Debug, Clone)]
pub struct InterpretedOptions {
    /// Tokenizer settings.
    pub parse: ParseOptions,
    /// Yield to the executor after this many rows. `0` disables periodic yields; the call still
    /// yields once before it starts.
    pub yield_every: usize,
}

impl Default for InterpretedOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            yield_every: 1_024,
        }
    }
}

/// Library-based backend running the generic keyed-row pipeline.
///
/// Every row is materialized as a [`crate::types::RawRecord`] and looked up by key, the same way a
/// dynamic CSV library hands rows to user code.
#[derive(Debug, Clone, Default)]
pub struct InterpretedBackend {
    opts: InterpretedOptions,
}

impl InterpretedBackend {
    pub fn new(opts: InterpretedOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &InterpretedOptions {
        &self.opts
    }

    /// Parse and transform `text`, suspending cooperatively along the way.
    pub async fn parse_async(&self, text: &str) -> BackendResult<Vec<ParsedRecord>> {
        yield_now().await;

        let rows = parse_records(text, &self.opts.parse)?;
        let mut out = Vec::new();
        for (i, row) in rows.enumerate() {
            if self.opts.yield_every > 0 && i > 0 && i % self.opts.yield_every == 0 {
                yield_now().await;
            }
            out.push(transform_with(&row?, &self.opts.parse));
        }
        Ok(out)
    }
}

impl ParseBackend for InterpretedBackend {
    fn kind(&self) -> Backend {
        Backend::Interpreted
    }

    fn parse<'a>(&'a self, text: &'a str) -> BoxFuture<'a, BackendResult<Vec<ParsedRecord>>> {
        self.parse_async(text).boxed()
    }
}

/// Returns `Pending` once (waking itself) and `Ready` on the next poll.
async fn yield_now() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}
