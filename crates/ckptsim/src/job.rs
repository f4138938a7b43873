//! Per-job state machine and work accounting.

use rand::Rng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Checkpoint-interval policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Fixed intervals of exactly `alpha` ticks between checkpoints.
    Conventional,
    /// Each interval is drawn uniformly from `[alpha - beta/2, alpha + beta/2]`,
    /// staggering checkpoint timings across jobs to reduce the odds that many
    /// of them checkpoint on the same tick.
    Relaxed,
}

/// Current job activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Checkpointing,
}

/// A long-running compute job alternating between useful work and
/// checkpoint I/O.
///
/// The job starts Running with a conventional-length first interval
/// regardless of the run's mode. [`Machine`](crate::machine::Machine) drives
/// the state transitions; the job only keeps its countdown and counters.
#[derive(Clone, Debug)]
pub struct Job {
    alpha: f64,
    beta: f64,
    status: JobStatus,
    remaining_time: f64,
    // slowdown debt accumulated under contention, settled at the next
    // interval draw
    cumulative_degradation: f64,
    start_time: u64,
    useful_work: u64,
    io_time: u64,
    lost_work: u64,
    checkpoints: u64,
    // ticks accrued since the last entry into the current state, reclaimed
    // by failure rollback
    run_time: u64,
    cp_time: u64,
}

impl Job {
    /// Creates a job with compute interval `alpha` and checkpoint duration
    /// `beta`, both in ticks. Requires `alpha > 0` and `beta >= 0`; this is
    /// a construction contract, not a checked condition.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self::with_start_time(alpha, beta, 0)
    }

    /// Same as [`Job::new`], but the job stays idle until `start_time`.
    pub fn with_start_time(alpha: f64, beta: f64, start_time: u64) -> Self {
        Self {
            alpha,
            beta,
            status: JobStatus::Running,
            remaining_time: alpha,
            cumulative_degradation: 0.,
            start_time,
            useful_work: 0,
            io_time: 0,
            lost_work: 0,
            checkpoints: 0,
            run_time: 0,
            cp_time: 0,
        }
    }

    /// Consumes one tick of which only the `delta` fraction makes countdown
    /// progress (1 under no contention). The full tick is still counted as
    /// useful work or I/O time; the shortfall accumulates as degradation
    /// debt settled at the next interval draw.
    pub fn elapse(&mut self, delta: f64) {
        if self.remaining_time > 0. {
            self.remaining_time = (self.remaining_time - delta).max(0.);
            self.cumulative_degradation += 1. - delta;
        }
        match self.status {
            JobStatus::Running => {
                self.useful_work += 1;
                self.run_time += 1;
            }
            JobStatus::Checkpointing => {
                self.io_time += 1;
                self.cp_time += 1;
            }
        }
    }

    /// Whether the current interval has been fully consumed.
    pub fn is_due(&self) -> bool {
        self.remaining_time <= 0.
    }

    /// Running -> Checkpointing transition.
    pub fn begin_checkpoint(&mut self) {
        debug_assert_eq!(self.status, JobStatus::Running);
        self.status = JobStatus::Checkpointing;
        self.remaining_time = self.beta;
        self.checkpoints += 1;
        self.cp_time = 0;
    }

    /// Checkpointing -> Running transition with a fresh per-mode interval.
    pub fn complete_checkpoint(&mut self, mode: Mode, rng: &mut Pcg64) {
        debug_assert_eq!(self.status, JobStatus::Checkpointing);
        self.status = JobStatus::Running;
        self.run_time = 0;
        self.reset_remaining_time(mode, rng);
    }

    /// Rolls back everything accrued since the last state entry and restarts
    /// the current interval, modeling a whole-system failure that discards
    /// whatever was not yet durably checkpointed.
    pub fn fail(&mut self, mode: Mode, rng: &mut Pcg64) {
        match self.status {
            JobStatus::Running => {
                self.lost_work += self.run_time;
                self.useful_work -= self.run_time;
                self.run_time = 0;
                self.reset_remaining_time(mode, rng);
            }
            JobStatus::Checkpointing => {
                self.lost_work += self.cp_time;
                self.io_time -= self.cp_time;
                self.cp_time = 0;
                self.remaining_time = self.beta;
            }
        }
    }

    fn reset_remaining_time(&mut self, mode: Mode, rng: &mut Pcg64) {
        let interval = match mode {
            Mode::Conventional => self.alpha,
            Mode::Relaxed => rng
                .gen_range(self.alpha - self.beta * 0.5..=self.alpha + self.beta * 0.5)
                .trunc(),
        };
        self.remaining_time = (interval - self.cumulative_degradation).max(0.);
        self.cumulative_degradation = 0.;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Cumulative ticks spent productively Running since creation.
    pub fn useful_work(&self) -> u64 {
        self.useful_work
    }

    /// Cumulative ticks spent Checkpointing since creation.
    pub fn io_time(&self) -> u64 {
        self.io_time
    }

    /// Ticks discarded by failures.
    pub fn lost_work(&self) -> u64 {
        self.lost_work
    }

    /// Number of completed checkpoint entries.
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }
}
