//! Random-variate generation for checkpoint intervals and failure times.

use rand::prelude::*;
use rand_distr::{Exp, Gamma, Normal, Weibull};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use statrs::function::gamma::gamma;

/// Supported random-variate families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionType {
    Exponential,
    Weibull,
    Normal,
    Gamma,
}

/// Immutable description of a variate family and its parameters.
///
/// `mean` is the default target mean, overridable per draw. `alpha` is the
/// gamma shape, `beta` is the gamma scale and doubles as the weibull shape,
/// `sigma` is the normal standard deviation; each family reads only the
/// parameters it needs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub name: DistributionType,
    pub mean: f64,
    pub alpha: f64,
    pub beta: f64,
    pub sigma: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            name: DistributionType::Exponential,
            mean: 25.,
            alpha: 1.,
            beta: 1.,
            sigma: 1.,
        }
    }
}

/// Resolves a distribution family from its raw config name.
///
/// An unrecognized name resolves to the exponential family rather than
/// failing; this permissive default is retained from the reference behavior.
pub fn default_distribution_resolver(s: &str) -> DistributionType {
    match s.trim().to_lowercase().as_str() {
        "weibull" => DistributionType::Weibull,
        "normal" => DistributionType::Normal,
        "gamma" => DistributionType::Gamma,
        _ => DistributionType::Exponential,
    }
}

/// Draws event offsets from a configured [`DistributionConfig`].
pub struct EventGenerator {
    config: DistributionConfig,
    rng: Pcg64,
}

impl EventGenerator {
    pub fn new(config: DistributionConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Returns the next event time for the given target mean.
    ///
    /// The gamma family ignores `mean` and draws from its configured
    /// shape and scale. The normal family may return negative values; they
    /// are not clamped here.
    pub fn next_event(&mut self, mean: f64) -> f64 {
        match self.config.name {
            DistributionType::Exponential => Exp::new(1. / mean).unwrap().sample(&mut self.rng),
            DistributionType::Weibull => {
                let scale = mean / gamma(1. + 1. / self.config.beta);
                Weibull::new(scale, self.config.beta).unwrap().sample(&mut self.rng)
            }
            DistributionType::Normal => Normal::new(mean, self.config.sigma).unwrap().sample(&mut self.rng),
            DistributionType::Gamma => Gamma::new(self.config.alpha, self.config.beta)
                .unwrap()
                .sample(&mut self.rng),
        }
    }
}

/// [`EventGenerator`] with a fixed mean time between failures, producing
/// integer failure-tick offsets.
pub struct FailureEventGenerator {
    generator: EventGenerator,
    mtbf: f64,
}

impl FailureEventGenerator {
    pub fn new(mtbf: f64, config: DistributionConfig, seed: u64) -> Self {
        Self {
            generator: EventGenerator::new(config, seed),
            mtbf,
        }
    }

    /// Returns the offset in ticks until the next failure.
    ///
    /// The offset may legitimately be zero, meaning the failure hits on the
    /// very next tick; callers must schedule accordingly instead of assuming
    /// positive offsets. Negative draws (possible under the normal family)
    /// saturate to zero.
    pub fn next_failure(&mut self) -> u64 {
        self.generator.next_event(self.mtbf) as u64
    }
}
