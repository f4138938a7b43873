//! A discrete-event simulator for comparing checkpointing policies of
//! long-running compute jobs.
//!
//! Two policies are modeled: a conventional policy that checkpoints at fixed
//! intervals, and a relaxed policy that randomizes each interval to
//! desynchronize checkpoint timings across jobs. Both can be stressed with
//! shared-resource contention among simultaneously checkpointing jobs and
//! with randomly-timed whole-system failures that discard in-progress work.
//!
//! The entry point is [`simulation::Simulator`], which runs many independent
//! replicas of the configured job set in parallel and merges their per-tick
//! contention histograms and per-job work totals into a single
//! [`stats::Stats`].

pub mod config;
pub mod contention;
pub mod distribution;
pub mod job;
pub mod machine;
pub mod parallel;
pub mod simulation;
pub mod stats;
