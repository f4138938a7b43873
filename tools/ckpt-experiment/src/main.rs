//! Experiment runner comparing conventional and relaxed checkpointing.
//!
//! Runs both policies on the same configuration and prints the contention
//! histogram, contention score and per-job work totals for each; the
//! histograms can optionally be persisted as CSV.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Builder;
use log::info;
use rand::prelude::*;
use rand_pcg::Pcg64;

use ckptsim::config::{Config, RawConfig, RawDistributionConfig, RawJobConfig};
use ckptsim::job::Mode;
use ckptsim::simulation::Simulator;
use ckptsim::stats::Stats;

const HOUR: f64 = 3600.;

#[derive(Parser)]
#[command(about = "Compares conventional and relaxed checkpointing policies under contention and failures")]
struct Args {
    /// Path to a YAML run configuration; when omitted, the built-in
    /// reference workload is used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write per-level contention histograms to this CSV file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overrides the configured random seed.
    #[arg(short, long)]
    seed: Option<u64>,
}

/// The reference workload: 10 jobs with intervals and checkpoint durations
/// sampled from fixed lists, 50 hours of compute time, reciprocal-style
/// degradation table.
fn default_experiment(seed: u64) -> RawConfig {
    let intervals = [1.2 * HOUR, 1.7 * HOUR, 2.1 * HOUR, 2.8 * HOUR, 3.3 * HOUR, 4.7 * HOUR];
    let durations = [0.1 * HOUR, 0.2 * HOUR, 0.25 * HOUR, 0.3 * HOUR, 0.35 * HOUR, 0.4 * HOUR];
    let max_jobs = 10;
    let mut rng = Pcg64::seed_from_u64(seed);
    let jobs = (0..max_jobs)
        .map(|_| RawJobConfig {
            alpha: *intervals.choose(&mut rng).unwrap(),
            beta: *durations.choose(&mut rng).unwrap(),
            start_time: 0,
            count: 1,
        })
        .collect();
    let mut contention_table = vec![0.];
    contention_table.extend((1..=max_jobs).map(|level| 1. / level as f64));
    RawConfig {
        compute_time: (50. * HOUR) as u64,
        concurrency: 5,
        is_contention: true,
        mtbf: 20. * HOUR,
        failure_distribution: RawDistributionConfig::default(),
        jobs,
        contention_table,
        seed,
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Conventional => "conventional",
        Mode::Relaxed => "relaxed",
    }
}

fn print_results(name: &str, stats: &Stats, compute_time: u64) {
    println!("******************** {} ********************", name);
    for (level, ticks) in stats.contention_data.iter() {
        println!(
            "{:2} {:8} {:>8.3} %",
            level,
            ticks,
            *ticks as f64 * 100. / compute_time as f64
        );
    }
    println!("contention score: {:.4}", stats.contention_score(compute_time));
    println!("job   useful      io    lost  checkpoints");
    for (idx, useful) in stats.useful_work.iter() {
        println!(
            "{:3} {:8} {:7} {:7} {:12}",
            idx,
            useful,
            stats.io_time.get(idx).copied().unwrap_or(0),
            stats.lost_work.get(idx).copied().unwrap_or(0),
            stats.checkpoints.get(idx).copied().unwrap_or(0),
        );
    }
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
    let args = Args::parse();

    let mut raw = match &args.config {
        Some(path) => RawConfig::from_yaml(path),
        None => default_experiment(args.seed.unwrap_or(123)),
    };
    if let Some(seed) = args.seed {
        raw.seed = seed;
    }
    let config = Config::from_raw(raw);
    let compute_time = config.compute_time;
    info!(
        "{} jobs, {} ticks across {} replicas, contention {}",
        config.jobs.len(),
        config.compute_time,
        config.concurrency,
        if config.is_contention { "on" } else { "off" }
    );

    let simulator = Simulator::new(config);
    let mut writer = args.output.as_ref().map(|path| {
        let mut writer = csv::Writer::from_path(path).unwrap();
        writer.write_record(["mode", "level", "ticks"]).unwrap();
        writer
    });

    for mode in [Mode::Conventional, Mode::Relaxed] {
        let stats = simulator.run(mode);
        print_results(mode_name(mode), &stats, compute_time);
        if let Some(writer) = writer.as_mut() {
            for (level, ticks) in stats.contention_data.iter() {
                writer
                    .write_record([mode_name(mode).to_string(), level.to_string(), ticks.to_string()])
                    .unwrap();
            }
        }
    }
    if let Some(writer) = writer.as_mut() {
        writer.flush().unwrap();
    }
}
