//! Value-based selection: per-arm sample-mean estimates, greedy argmax.

use arena_core::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};

use crate::algorithm::{argmax, AlgorithmCore, BanditAlgorithm};

/// Zero-exploration value-based strategy.
pub type GreedyAlgorithm = ValueBasedAlgorithm;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawValueBased")]
pub struct ValueBasedAlgorithm {
    core: AlgorithmCore,
    estimates: Vec<f64>,
    initial_estimates: Vec<f64>,
}

impl ValueBasedAlgorithm {
    pub fn new(num_arms: usize, num_tries: usize) -> Self {
        Self {
            core: AlgorithmCore::new(num_arms, num_tries),
            estimates: vec![0.0; num_arms],
            initial_estimates: vec![0.0; num_arms],
        }
    }

    /// Seed the estimates with `expected_rewards_begin`, one value per arm.
    pub fn with_initial_estimates(
        num_arms: usize,
        num_tries: usize,
        expected_rewards_begin: Vec<f64>,
    ) -> ArenaResult<Self> {
        if expected_rewards_begin.len() != num_arms {
            return Err(ArenaError::InvalidShape(format!(
                "expected {num_arms} initial estimates, got {}",
                expected_rewards_begin.len()
            )));
        }
        Ok(Self {
            core: AlgorithmCore::new(num_arms, num_tries),
            estimates: expected_rewards_begin.clone(),
            initial_estimates: expected_rewards_begin,
        })
    }

    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    /// Arm with the highest estimate, lowest index on ties.
    pub fn greedy_arm(&self) -> usize {
        argmax(&self.estimates).unwrap_or(0)
    }
}

#[derive(Deserialize)]
struct RawValueBased {
    core: AlgorithmCore,
    estimates: Vec<f64>,
    initial_estimates: Vec<f64>,
}

impl TryFrom<RawValueBased> for ValueBasedAlgorithm {
    type Error = ArenaError;

    fn try_from(raw: RawValueBased) -> ArenaResult<Self> {
        let num_arms = raw.core.num_arms();
        if raw.estimates.len() != num_arms || raw.initial_estimates.len() != num_arms {
            return Err(ArenaError::InvalidShape(format!(
                "expected {num_arms} estimates, got {} current and {} initial",
                raw.estimates.len(),
                raw.initial_estimates.len()
            )));
        }
        Ok(Self {
            core: raw.core,
            estimates: raw.estimates,
            initial_estimates: raw.initial_estimates,
        })
    }
}

impl BanditAlgorithm for ValueBasedAlgorithm {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        Ok(self.greedy_arm())
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.core.record(arm, reward)?;
        let n = self.core.num_pulls()[arm] as f64;
        self.estimates[arm] += (reward - self.estimates[arm]) / n;
        Ok(())
    }

    fn reset(&mut self) {
        self.core.clear();
        self.estimates.clone_from(&self.initial_estimates);
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }
}
