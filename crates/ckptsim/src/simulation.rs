//! Replica simulation driver and the top-level simulator facade.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::config::Config;
use crate::contention::ContentionReporter;
use crate::distribution::{DistributionConfig, FailureEventGenerator};
use crate::job::{Job, Mode};
use crate::machine::Machine;
use crate::parallel::parallel_replica_simulation;
use crate::stats::Stats;

/// One independent replica: a [`Machine`] driven for a fixed tick budget.
///
/// Replicas share no mutable state; each owns its job list copy, its own
/// interval RNG and its own failure stream, all derived from the replica
/// seed.
pub struct CheckpointSimulation {
    machine: Machine,
    mode: Mode,
}

impl CheckpointSimulation {
    pub fn new(
        jobs: Vec<Job>,
        contention: ContentionReporter,
        failure_distribution: DistributionConfig,
        mtbf: f64,
        is_contention: bool,
        mode: Mode,
        seed: u64,
    ) -> Self {
        let mut seeder = Pcg64::seed_from_u64(seed);
        let failures = FailureEventGenerator::new(mtbf, failure_distribution, seeder.gen());
        let machine = Machine::new(jobs, contention, failures, is_contention, seeder.gen());
        Self { machine, mode }
    }

    /// Builds a replica from a resolved config, deep-copying the job list so
    /// no job instance is shared across replicas.
    pub fn from_config(config: &Config, mode: Mode, seed: u64) -> Self {
        Self::new(
            config.jobs.clone(),
            config.contention.clone(),
            config.failure_distribution,
            config.mtbf,
            config.is_contention,
            mode,
            seed,
        )
    }

    /// Drives the machine for `ticks` ticks, to completion, without
    /// preemption.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.machine.elapse(self.mode);
        }
    }

    /// Extracts the replica's output maps.
    pub fn stats(&self) -> Stats {
        let mut stats = Stats {
            contention_data: self.machine.contention_data().clone(),
            ..Default::default()
        };
        for (idx, job) in self.machine.jobs().iter().enumerate() {
            stats.useful_work.insert(idx, job.useful_work());
            stats.io_time.insert(idx, job.io_time());
            stats.lost_work.insert(idx, job.lost_work());
            stats.checkpoints.insert(idx, job.checkpoints());
        }
        stats
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }
}

/// Runs a configured experiment: `concurrency` independent replicas of the
/// job set executed in parallel, with their outputs merged into one
/// [`Stats`].
pub struct Simulator {
    config: Config,
}

impl Simulator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs every replica under the given checkpointing mode and merges the
    /// per-replica contention histograms and per-job work totals.
    pub fn run(&self, mode: Mode) -> Stats {
        parallel_replica_simulation(&self.config, mode)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
