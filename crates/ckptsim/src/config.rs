//! Run configuration, including the YAML-serializable raw form.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contention::ContentionReporter;
use crate::distribution::{default_distribution_resolver, DistributionConfig};
use crate::job::Job;

fn default_one() -> u32 {
    1
}

fn default_one_usize() -> usize {
    1
}

fn default_one_f64() -> f64 {
    1.
}

fn default_mean() -> f64 {
    25.
}

fn default_seed() -> u64 {
    123
}

/// YAML-serializable job specification.
#[derive(Clone, Serialize, Deserialize)]
pub struct RawJobConfig {
    /// Nominal compute interval before a checkpoint is due, in ticks.
    pub alpha: f64,
    /// Checkpoint duration in ticks.
    pub beta: f64,
    /// Tick at which the job becomes eligible to run.
    #[serde(default)]
    pub start_time: u64,
    /// Number of identical jobs created from this spec.
    #[serde(default = "default_one")]
    pub count: u32,
}

/// YAML-serializable distribution specification. An unknown `family` string
/// resolves to the exponential family (see
/// [`default_distribution_resolver`]).
#[derive(Clone, Serialize, Deserialize)]
pub struct RawDistributionConfig {
    #[serde(default)]
    pub family: String,
    #[serde(default = "default_mean")]
    pub mean: f64,
    #[serde(default = "default_one_f64")]
    pub alpha: f64,
    #[serde(default = "default_one_f64")]
    pub beta: f64,
    #[serde(default = "default_one_f64")]
    pub sigma: f64,
}

impl Default for RawDistributionConfig {
    fn default() -> Self {
        Self {
            family: String::new(),
            mean: default_mean(),
            alpha: 1.,
            beta: 1.,
            sigma: 1.,
        }
    }
}

/// YAML-serializable config.
#[derive(Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Total tick budget, split evenly across replicas.
    pub compute_time: u64,
    /// Replica count and worker pool width.
    #[serde(default = "default_one_usize")]
    pub concurrency: usize,
    /// Whether checkpoint progress degrades under contention.
    #[serde(default)]
    pub is_contention: bool,
    /// Mean time between failures, in ticks.
    pub mtbf: f64,
    #[serde(default)]
    pub failure_distribution: RawDistributionConfig,
    pub jobs: Vec<RawJobConfig>,
    /// Degradation factor per concurrency level, level 0 first. When empty,
    /// a unit table (no slowdown at any level) is synthesized.
    #[serde(default)]
    pub contention_table: Vec<f64>,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl RawConfig {
    pub fn from_yaml(path: &Path) -> Self {
        let f = File::open(path).unwrap();
        serde_yaml::from_reader(f).unwrap()
    }
}

/// Resolved run configuration consumed by the simulator.
#[derive(Clone)]
pub struct Config {
    pub compute_time: u64,
    pub concurrency: usize,
    pub is_contention: bool,
    pub mtbf: f64,
    pub failure_distribution: DistributionConfig,
    pub jobs: Vec<Job>,
    pub contention: ContentionReporter,
    pub seed: u64,
}

impl Config {
    /// Resolves and validates a raw config. Invalid configurations abort
    /// immediately; a run never starts with partially checked inputs.
    pub fn from_raw(raw: RawConfig) -> Self {
        assert!(raw.compute_time > 0, "compute_time must be positive");
        assert!(raw.concurrency >= 1, "concurrency must be at least 1");
        assert!(!raw.jobs.is_empty(), "at least one job is required");

        let mut jobs = Vec::new();
        for spec in &raw.jobs {
            for _ in 0..spec.count {
                jobs.push(Job::with_start_time(spec.alpha, spec.beta, spec.start_time));
            }
        }

        let table = if raw.contention_table.is_empty() {
            let mut table = vec![1.; jobs.len() + 1];
            table[0] = 0.;
            table
        } else {
            raw.contention_table
        };
        let contention = ContentionReporter::new(table);
        assert!(
            contention.max_level() >= jobs.len(),
            "contention table covers levels up to {} but the run has {} jobs",
            contention.max_level(),
            jobs.len()
        );

        let failure_distribution = DistributionConfig {
            name: default_distribution_resolver(&raw.failure_distribution.family),
            mean: raw.failure_distribution.mean,
            alpha: raw.failure_distribution.alpha,
            beta: raw.failure_distribution.beta,
            sigma: raw.failure_distribution.sigma,
        };

        Self {
            compute_time: raw.compute_time,
            concurrency: raw.concurrency,
            is_contention: raw.is_contention,
            mtbf: raw.mtbf,
            failure_distribution,
            jobs,
            contention,
            seed: raw.seed,
        }
    }

    pub fn from_yaml(path: &Path) -> Self {
        Self::from_raw(RawConfig::from_yaml(path))
    }
}
