//! Reward environment: draws the per-run reward table from a Bernoulli or
//! Gaussian distribution.

use arena_core::{ArenaError, ArenaResult, DistributionKind, DistributionParameters};
use ndarray::Array2;
use rand::Rng;
use tracing::debug;

const DEFAULT_GAUSSIAN_MEAN_UPPER_BOUND: f64 = 10.0;
const DEFAULT_GAUSSIAN_STD_DEV: f64 = 2.0;

/// Immutable `arm_count × try_count` matrix of reference draws.
#[derive(Debug, Clone)]
pub struct RewardTable {
    rewards: Array2<f64>,
}

impl RewardTable {
    pub fn arm_count(&self) -> usize {
        self.rewards.nrows()
    }

    pub fn try_count(&self) -> usize {
        self.rewards.ncols()
    }

    /// Reward arm `arm` yields on its `draw`-th reference draw.
    pub fn reward(&self, arm: usize, draw: usize) -> Option<f64> {
        self.rewards.get((arm, draw)).copied()
    }

    pub fn row(&self, arm: usize) -> Option<Vec<f64>> {
        (arm < self.arm_count()).then(|| self.rewards.row(arm).to_vec())
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.rewards
    }
}

#[derive(Debug, Clone)]
struct EnvironmentSettings {
    arm_count: usize,
    try_count: usize,
    distribution: String,
}

pub struct RewardEnvironment {
    settings: Option<EnvironmentSettings>,
    gaussian_mean_upper_bound: f64,
    gaussian_std_dev: f64,
    parameters: Option<DistributionParameters>,
}

impl RewardEnvironment {
    pub fn new() -> Self {
        Self {
            settings: None,
            gaussian_mean_upper_bound: DEFAULT_GAUSSIAN_MEAN_UPPER_BOUND,
            gaussian_std_dev: DEFAULT_GAUSSIAN_STD_DEV,
            parameters: None,
        }
    }

    /// Override the Gaussian mean range `[0, mean_upper_bound)` and the shared
    /// standard deviation. Validated on `generate`.
    pub fn with_gaussian(mut self, mean_upper_bound: f64, std_dev: f64) -> Self {
        self.gaussian_mean_upper_bound = mean_upper_bound;
        self.gaussian_std_dev = std_dev;
        self
    }

    /// Store the run settings. Nothing is validated until `generate`.
    pub fn configure(&mut self, arm_count: usize, try_count: usize, distribution: &str) {
        self.settings = Some(EnvironmentSettings {
            arm_count,
            try_count,
            distribution: distribution.to_string(),
        });
        self.parameters = None;
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ArenaResult<RewardTable> {
        let settings = self.settings.as_ref().ok_or_else(|| {
            ArenaError::Configuration("environment has not been configured".to_string())
        })?;
        if settings.arm_count == 0 {
            return Err(ArenaError::Configuration(
                "arm count must be positive".to_string(),
            ));
        }
        if settings.try_count == 0 {
            return Err(ArenaError::Configuration(
                "try count must be positive".to_string(),
            ));
        }
        let kind: DistributionKind = settings.distribution.parse()?;
        let (k, t) = (settings.arm_count, settings.try_count);

        let (rewards, parameters) = match kind {
            DistributionKind::Bernoulli => {
                let probabilities: Vec<f64> = (0..k).map(|_| rng.gen::<f64>()).collect();
                let rewards = Array2::from_shape_fn((k, t), |(arm, _)| {
                    if rng.gen::<f64>() < probabilities[arm] {
                        1.0
                    } else {
                        0.0
                    }
                });
                (rewards, DistributionParameters::Probabilities(probabilities))
            }
            DistributionKind::Gaussian => {
                let upper = self.gaussian_mean_upper_bound;
                let sigma = self.gaussian_std_dev;
                if !(upper.is_finite() && upper > 0.0) {
                    return Err(ArenaError::Configuration(format!(
                        "gaussian mean upper bound must be positive, got {upper}"
                    )));
                }
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(ArenaError::Configuration(format!(
                        "gaussian standard deviation must be positive, got {sigma}"
                    )));
                }
                let means: Vec<f64> = (0..k).map(|_| rng.gen::<f64>() * upper).collect();
                let rewards = Array2::from_shape_fn((k, t), |(arm, _)| {
                    means[arm] + sigma * standard_normal(&mut *rng)
                });
                (rewards, DistributionParameters::Means(means))
            }
        };

        debug!(arms = k, tries = t, distribution = %kind, "Reward table generated");
        self.parameters = Some(parameters);
        Ok(RewardTable { rewards })
    }

    /// Parameters of the last generated table.
    pub fn parameters(&self) -> Option<&DistributionParameters> {
        self.parameters.as_ref()
    }

    pub fn probabilities(&self) -> Option<&[f64]> {
        match &self.parameters {
            Some(DistributionParameters::Probabilities(p)) => Some(p),
            _ => None,
        }
    }

    pub fn means(&self) -> Option<&[f64]> {
        match &self.parameters {
            Some(DistributionParameters::Means(m)) => Some(m),
            _ => None,
        }
    }
}

impl Default for RewardEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Box–Muller transform. `u1` is redrawn while it is exactly zero so `ln`
/// stays finite.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let mut u1: f64 = rng.gen();
    while u1 == 0.0 {
        u1 = rng.gen();
    }
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
