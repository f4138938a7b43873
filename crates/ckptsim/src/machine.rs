//! Per-tick replica driver integrating contention and failures.

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::contention::ContentionReporter;
use crate::distribution::FailureEventGenerator;
use crate::job::{Job, JobStatus, Mode};

/// One replica's worth of simulation state: the job set, the contention
/// table, the failure schedule and the per-tick contention histogram.
///
/// A machine advances strictly one tick per [`Machine::elapse`] call; tick
/// N's job state depends only on tick N-1's outcome.
pub struct Machine {
    jobs: Vec<Job>,
    // indices into `jobs`, split by admission
    active: Vec<usize>,
    pending: Vec<usize>,
    contention: ContentionReporter,
    failures: FailureEventGenerator,
    contention_data: IndexMap<usize, u64>,
    simulation_time: u64,
    next_failure: u64,
    is_contention: bool,
    rng: Pcg64,
}

impl Machine {
    /// Builds a machine owning `jobs`. The contention table must cover every
    /// concurrency level up to the job count.
    pub fn new(
        jobs: Vec<Job>,
        contention: ContentionReporter,
        mut failures: FailureEventGenerator,
        is_contention: bool,
        seed: u64,
    ) -> Self {
        assert!(
            contention.max_level() >= jobs.len(),
            "contention table covers levels up to {} but the run has {} jobs",
            contention.max_level(),
            jobs.len()
        );
        let pending = (0..jobs.len()).collect();
        let next_failure = failures.next_failure();
        let mut machine = Self {
            jobs,
            active: Vec::new(),
            pending,
            contention,
            failures,
            contention_data: IndexMap::new(),
            simulation_time: 0,
            next_failure,
            is_contention,
            rng: Pcg64::seed_from_u64(seed),
        };
        machine.initialize_storage();
        machine
    }

    /// Resets the contention histogram to zero entries for every level in
    /// `[0, job_count]`, so levels never observed still appear in the output.
    pub fn initialize_storage(&mut self) {
        self.contention_data.clear();
        for level in 0..=self.jobs.len() {
            self.contention_data.insert(level, 0);
        }
    }

    /// Advances the whole replica by exactly one tick.
    ///
    /// A failure tick pre-empts ordinary progress entirely: every active job
    /// is rolled back and restarted, a new failure is scheduled, and neither
    /// admission, job advancement nor the histogram update happens.
    pub fn elapse(&mut self, mode: Mode) {
        if self.simulation_time == self.next_failure {
            for &idx in self.active.iter() {
                self.jobs[idx].fail(mode, &mut self.rng);
            }
            // a zero offset means the failure hits on the very next tick
            self.next_failure = self.simulation_time + 1 + self.failures.next_failure();
            self.simulation_time += 1;
            return;
        }

        let now = self.simulation_time;
        let mut i = 0;
        while i < self.pending.len() {
            if self.jobs[self.pending[i]].start_time() <= now {
                self.active.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }

        // Concurrency is snapshotted before any job advances, so the
        // degradation applied this tick reflects the level carried over from
        // the previous tick's outcome.
        let num_cp = self
            .active
            .iter()
            .filter(|&&idx| self.jobs[idx].status() == JobStatus::Checkpointing)
            .count();
        let delta = if self.is_contention {
            self.contention.degradation(num_cp)
        } else {
            1.
        };

        for &idx in self.active.iter() {
            let job = &mut self.jobs[idx];
            match job.status() {
                JobStatus::Running => {
                    // running jobs are never slowed
                    job.elapse(1.);
                    if job.is_due() {
                        job.begin_checkpoint();
                    }
                }
                JobStatus::Checkpointing => {
                    job.elapse(delta);
                    if job.is_due() {
                        job.complete_checkpoint(mode, &mut self.rng);
                    }
                }
            }
        }

        *self.contention_data.entry(num_cp).or_insert(0) += 1;
        self.simulation_time += 1;
    }

    /// Jobs in their original list order, admitted or not.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Ticks observed at each concurrency level so far.
    pub fn contention_data(&self) -> &IndexMap<usize, u64> {
        &self.contention_data
    }

    pub fn simulation_time(&self) -> u64 {
        self.simulation_time
    }
}
