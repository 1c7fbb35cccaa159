//! Shared two-valued scene state
//!
//! One writer at a time, observed by every reader on its next read. Writes
//! are not queued: setting FORMED then CHAOS before a frame leaves the frame
//! seeing only CHAOS.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

/// Which configuration particles converge toward
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeState {
    Chaos = 0,
    #[default]
    Formed = 1,
}

impl TreeState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TreeState::Chaos,
            _ => TreeState::Formed,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TreeState::Chaos => TreeState::Formed,
            TreeState::Formed => TreeState::Chaos,
        }
    }
}

impl fmt::Display for TreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeState::Chaos => write!(f, "CHAOS"),
            TreeState::Formed => write!(f, "FORMED"),
        }
    }
}

struct SignalInner {
    state: AtomicU8,
    writes: AtomicU64,
}

/// Cloneable handle to the shared state
#[derive(Clone)]
pub struct StateSignal {
    inner: Arc<SignalInner>,
}

impl StateSignal {
    pub fn new(initial: TreeState) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                state: AtomicU8::new(initial as u8),
                writes: AtomicU64::new(0),
            }),
        }
    }

    pub fn get(&self) -> TreeState {
        TreeState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Store a new state, returning the one it replaced
    pub fn set(&self, state: TreeState) -> TreeState {
        let previous = self.inner.state.swap(state as u8, Ordering::AcqRel);
        self.inner.writes.fetch_add(1, Ordering::Relaxed);
        TreeState::from_u8(previous)
    }

    /// Number of writes so far, including ones that did not change the value
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }
}

impl Default for StateSignal {
    fn default() -> Self {
        Self::new(TreeState::default())
    }
}

impl fmt::Debug for StateSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSignal")
            .field("state", &self.get())
            .field("writes", &self.write_count())
            .finish()
    }
}
