use arena_core::{ArenaError, ArenaResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::{AlgorithmCore, BanditAlgorithm};

/// Softmax over preferences, shifted by the maximum before exponentiating.
pub fn softmax(preferences: &[f64]) -> Vec<f64> {
    if preferences.is_empty() {
        return Vec::new();
    }
    let max = preferences.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = preferences.iter().map(|p| (p - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Gradient bandit: stochastic softmax policy over learned preferences with a
/// running-average reward baseline.
#[derive(Debug, Clone)]
pub struct GradientBanditAlgorithm {
    core: AlgorithmCore,
    preferences: Vec<f64>,
    average_reward: f64,
    learning_rate: f64,
    rng: StdRng,
}

impl GradientBanditAlgorithm {
    pub fn new(
        num_arms: usize,
        num_tries: usize,
        learning_rate: f64,
        seed: u64,
    ) -> ArenaResult<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(ArenaError::InvalidRange {
                name: "learning_rate",
                value: learning_rate,
            });
        }
        Ok(Self {
            core: AlgorithmCore::new(num_arms, num_tries),
            preferences: vec![0.0; num_arms],
            average_reward: 0.0,
            learning_rate,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn preferences(&self) -> &[f64] {
        &self.preferences
    }

    pub fn average_reward(&self) -> f64 {
        self.average_reward
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Current policy over arms.
    pub fn probabilities(&self) -> Vec<f64> {
        softmax(&self.preferences)
    }
}

impl BanditAlgorithm for GradientBanditAlgorithm {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        let probabilities = self.probabilities();
        let u: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (arm, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return Ok(arm);
            }
        }
        Ok(probabilities.len().saturating_sub(1))
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        if !reward.is_finite() {
            return Err(ArenaError::InvalidReward(reward));
        }
        self.core.ensure_recordable(arm)?;

        let probabilities = self.probabilities();
        let advantage = self.learning_rate * (reward - self.average_reward);
        for (a, (preference, pi)) in self
            .preferences
            .iter_mut()
            .zip(probabilities.iter())
            .enumerate()
        {
            if a == arm {
                *preference += advantage * (1.0 - pi);
            } else {
                *preference -= advantage * pi;
            }
        }

        self.core.record(arm, reward)?;
        // Post-increment step: the first observation sets the baseline exactly.
        self.average_reward += (reward - self.average_reward) / self.core.step() as f64;
        Ok(())
    }

    fn reset(&mut self) {
        self.core.clear();
        self.preferences.iter_mut().for_each(|p| *p = 0.0);
        self.average_reward = 0.0;
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }
}
