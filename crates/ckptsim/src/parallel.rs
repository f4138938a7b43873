//! Utilities for running replicas in parallel.

use std::sync::mpsc::channel;

use itertools::izip;
use log::{debug, info};
use rand::prelude::*;
use rand_pcg::Pcg64;
use threadpool::ThreadPool;

use crate::config::Config;
use crate::job::Mode;
use crate::simulation::CheckpointSimulation;
use crate::stats::Stats;

/// Runs `config.concurrency` independent replicas in a thread pool with
/// `n_workers` worker threads and merges their outputs.
///
/// The total tick budget is split evenly across replicas; remainder ticks
/// are dropped from the aggregate rather than redistributed. Each replica
/// draws its own seed from a seeding generator, so random streams stay
/// independent across replicas while the whole run remains reproducible
/// from `config.seed`. The harness join-waits for every dispatched replica;
/// a panic inside one replica aborts the whole batch.
pub fn parallel_replica_simulation_n_workers(config: &Config, mode: Mode, n_workers: usize) -> Stats {
    let replicas = config.concurrency;
    let budget = config.compute_time / replicas as u64;
    let mut seeder = Pcg64::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..replicas).map(|_| seeder.gen()).collect();
    info!("dispatching {} replicas of {} ticks each", replicas, budget);

    let pool = ThreadPool::new(n_workers);
    let (tx, rx) = channel();
    for (id, seed) in izip!(0..replicas, seeds) {
        let tx = tx.clone();
        let config = config.clone();
        pool.execute(move || {
            let mut sim = CheckpointSimulation::from_config(&config, mode, seed);
            sim.run(budget);
            debug!("replica {} finished", id);
            tx.send(sim.stats()).unwrap();
        });
    }

    // Dropping the dispatch-side sender makes a replica panic surface as a
    // closed channel instead of a silent partial merge.
    drop(tx);
    let mut merged = Stats::default();
    for _ in 0..replicas {
        merged.merge(&rx.recv().expect("replica worker died before reporting stats"));
    }
    merged
}

/// Same as [`parallel_replica_simulation_n_workers`], with one worker per
/// replica.
pub fn parallel_replica_simulation(config: &Config, mode: Mode) -> Stats {
    parallel_replica_simulation_n_workers(config, mode, config.concurrency)
}
