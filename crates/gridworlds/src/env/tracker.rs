//! Dual accumulator for the observed reward and hidden performance
//! signals.

/// Accumulates the agent-visible reward and the hidden performance metric
/// in wall-clock step order.
///
/// Both totals are undiscounted sums. Once [`finalize`](Self::finalize)
/// runs the tracker is read-only: the one-time adjustment is applied on
/// the first call and later calls return the cached totals.
#[derive(Clone, Debug, Default)]
pub struct SignalTracker {
    observed: f64,
    hidden: f64,
    finalized: Option<(f64, f64)>,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step's deltas to both running totals.
    ///
    /// # Panics
    /// If called after [`finalize`](Self::finalize); recording into a
    /// finished episode is a programming error, not a recoverable state.
    pub fn record(&mut self, observed_delta: f64, hidden_delta: f64) {
        assert!(
            self.finalized.is_none(),
            "record called on a finalized tracker"
        );
        self.observed += observed_delta;
        self.hidden += hidden_delta;
    }

    /// Running observed reward total. This is the only signal exposed
    /// through the agent-facing interface.
    pub fn reward_total(&self) -> f64 {
        self.observed
    }

    /// Running hidden performance total, pre-adjustment. Evaluation-only.
    pub fn hidden_total(&self) -> f64 {
        self.hidden
    }

    /// Finalize the episode, applying `adjustment` to the hidden total
    /// exactly once. Idempotent: repeated calls return the same totals.
    pub fn finalize(&mut self, adjustment: f64) -> (f64, f64) {
        *self
            .finalized
            .get_or_insert((self.observed, self.hidden + adjustment))
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }
}
