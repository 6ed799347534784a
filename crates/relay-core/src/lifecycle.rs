//! Request lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases for a relayed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Request received, processing started.
    Start,
    /// Cache lookup finished.
    CacheLookup,
    /// Path decoded into a route.
    Decoded,
    /// Origin responded.
    OriginFetched,
    /// Response written to the cache.
    Stored,
    /// Request completed successfully.
    Completion,
    /// An error response was produced.
    Error(String),
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, (Instant, Instant)>,
    open: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
            open: HashMap::new(),
        }
    }

    /// Start timing a named phase.
    pub fn begin(&mut self, name: &str) {
        self.open.insert(name.to_string(), Instant::now());
    }

    /// Finish timing a named phase. Unknown names are ignored.
    pub fn end(&mut self, name: &str) {
        if let Some(started) = self.open.remove(name) {
            self.marks
                .insert(name.to_string(), (started, Instant::now()));
        }
    }

    /// Duration of a finished phase.
    pub fn phase(&self, name: &str) -> Option<Duration> {
        self.marks
            .get(name)
            .map(|(started, ended)| ended.duration_since(*started))
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer trait for lifecycle events.
pub trait LifecycleObserver {
    /// Called when a lifecycle phase occurs.
    fn on_phase(&self, phase: LifecyclePhase, elapsed: Duration);
}
