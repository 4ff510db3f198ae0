use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::LoadError;

/// Lifecycle of a backend that must be loaded before use.
///
/// Transitions are `Uninitialized -> Loading -> Ready | Failed`, each taken at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl Readiness {
    fn as_u8(self) -> u8 {
        match self {
            Readiness::Uninitialized => 0,
            Readiness::Loading => 1,
            Readiness::Ready => 2,
            Readiness::Failed => 3,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Readiness::Uninitialized,
            1 => Readiness::Loading,
            2 => Readiness::Ready,
            _ => Readiness::Failed,
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Readiness::Uninitialized => "uninitialized",
            Readiness::Loading => "loading",
            Readiness::Ready => "ready",
            Readiness::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Shared, lock-free holder of a [`Readiness`] state.
#[derive(Debug)]
pub struct ReadinessCell {
    state: AtomicU8,
}

impl ReadinessCell {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
        }
    }

    pub fn get(&self) -> Readiness {
        Readiness::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.get() == Readiness::Ready
    }

    /// `Uninitialized -> Loading`. Fails if a load was already started.
    pub fn begin_loading(&self) -> Result<(), LoadError> {
        self.transition(Readiness::Uninitialized, Readiness::Loading)
    }

    /// `Loading -> Ready`.
    pub fn mark_ready(&self) -> Result<(), LoadError> {
        self.transition(Readiness::Loading, Readiness::Ready)
    }

    /// `Loading -> Failed`.
    pub fn mark_failed(&self) -> Result<(), LoadError> {
        self.transition(Readiness::Loading, Readiness::Failed)
    }

    fn transition(&self, from: Readiness, to: Readiness) -> Result<(), LoadError> {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| LoadError::InvalidTransition {
                from: Readiness::from_u8(actual),
                to,
            })
    }
}

impl Default for ReadinessCell {
    fn default() -> Self {
        Self::new()
    }
}
