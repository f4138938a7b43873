//! Merged replica outputs.

use indexmap::IndexMap;

/// Outputs of one simulated (mode, contention) configuration.
///
/// `contention_data` maps a concurrency level to the number of ticks observed
/// at that level, covering every level in `[0, job_count]`. The per-job maps
/// are keyed by the job's position in the original job list, which is stable
/// across replicas.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub contention_data: IndexMap<usize, u64>,
    pub useful_work: IndexMap<usize, u64>,
    pub io_time: IndexMap<usize, u64>,
    pub lost_work: IndexMap<usize, u64>,
    pub checkpoints: IndexMap<usize, u64>,
}

fn merge_map(into: &mut IndexMap<usize, u64>, from: &IndexMap<usize, u64>) {
    for (&k, &v) in from.iter() {
        *into.entry(k).or_insert(0) += v;
    }
}

impl Stats {
    /// Adds another replica's outputs into this one. The merge is a plain
    /// keyed sum, commutative and independent of replica completion order.
    pub fn merge(&mut self, other: &Stats) {
        merge_map(&mut self.contention_data, &other.contention_data);
        merge_map(&mut self.useful_work, &other.useful_work);
        merge_map(&mut self.io_time, &other.io_time);
        merge_map(&mut self.lost_work, &other.lost_work);
        merge_map(&mut self.checkpoints, &other.checkpoints);
    }

    /// Contention score for this configuration, given the nominal total tick
    /// budget: sum over levels above 0 of `(level - 1) * ticks_at_level`,
    /// normalized by the budget minus the ticks recorded at level 0.
    ///
    /// The normalization is a fixed scoring convention reproduced exactly;
    /// do not re-derive it.
    pub fn contention_score(&self, compute_time: u64) -> f64 {
        let idle = self.contention_data.get(&0).copied().unwrap_or(0);
        let adjusted = compute_time.saturating_sub(idle);
        if adjusted == 0 {
            return 0.;
        }
        self.contention_data
            .iter()
            .filter(|&(&level, _)| level > 0)
            .map(|(&level, &ticks)| (level - 1) as f64 * ticks as f64 / adjusted as f64)
            .sum()
    }

    /// Total ticks recorded in the contention histogram.
    pub fn recorded_ticks(&self) -> u64 {
        self.contention_data.values().sum()
    }
}
