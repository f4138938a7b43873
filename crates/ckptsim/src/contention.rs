//! Shared-resource contention model for simultaneously checkpointing jobs.

/// Lookup table mapping the number of concurrently checkpointing jobs to the
/// degradation factor applied to their checkpoint progress on that tick.
///
/// A factor below 1 makes checkpoint ticks count down more slowly, modeling
/// shared-bandwidth contention: the more jobs checkpoint at once, the longer
/// each checkpoint takes.
#[derive(Clone, Debug)]
pub struct ContentionReporter {
    factors: Vec<f64>,
}

impl ContentionReporter {
    /// Builds a reporter from a table covering levels `0..factors.len()`.
    ///
    /// The table must be sized to the maximum possible concurrency (job
    /// count + 1 entries) before a run starts. Level 0 must map to 0: no
    /// jobs checkpointing means no contention.
    pub fn new(factors: Vec<f64>) -> Self {
        assert!(!factors.is_empty(), "contention table must not be empty");
        assert_eq!(factors[0], 0., "contention table entry for level 0 must be 0");
        for (level, factor) in factors.iter().enumerate().skip(1) {
            assert!(
                (0. ..=1.).contains(factor),
                "degradation factor {} for level {} is outside [0, 1]",
                factor,
                level
            );
        }
        Self { factors }
    }

    /// Returns the degradation factor for exactly `level` concurrently
    /// checkpointing jobs.
    ///
    /// Panics if the table has no entry for `level`: an undersized table is
    /// a configuration error, not a recoverable condition.
    pub fn degradation(&self, level: usize) -> f64 {
        *self
            .factors
            .get(level)
            .unwrap_or_else(|| panic!("contention table has no entry for level {}", level))
    }

    /// Highest concurrency level the table covers.
    pub fn max_level(&self) -> usize {
        self.factors.len() - 1
    }
}
