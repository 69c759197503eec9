/// Outcome of a list or watch round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Success,
    Error,
}

impl WatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchOutcome::Success => "success",
            WatchOutcome::Error => "error",
        }
    }
}

/// Receives list/watch events of the reflectors.
///
/// Implementations must be cheap; they are called from the watch loop.
pub trait WatchMetrics: Send + Sync {
    /// A full (re)list of `resource` finished.
    fn record_list(&self, resource: &str, outcome: WatchOutcome);

    /// A single watch event of `resource` was received.
    fn record_watch(&self, resource: &str, outcome: WatchOutcome);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl WatchMetrics for NoopMetrics {
    fn record_list(&self, _resource: &str, _outcome: WatchOutcome) {}
    fn record_watch(&self, _resource: &str, _outcome: WatchOutcome) {}
}
