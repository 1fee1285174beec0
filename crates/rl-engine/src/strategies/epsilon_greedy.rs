use arena_core::ArenaResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::value::ValueBasedAlgorithm;
use crate::algorithm::{AlgorithmCore, BanditAlgorithm};
use crate::providers::EpsilonProvider;

/// Explores a uniformly random arm with probability epsilon, otherwise
/// exploits the value estimates.
#[derive(Debug)]
pub struct EpsilonGreedyAlgorithm {
    values: ValueBasedAlgorithm,
    provider: Box<dyn EpsilonProvider>,
    rng: StdRng,
}

impl EpsilonGreedyAlgorithm {
    pub fn new(values: ValueBasedAlgorithm, provider: Box<dyn EpsilonProvider>, seed: u64) -> Self {
        Self {
            values,
            provider,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn estimates(&self) -> &[f64] {
        self.values.estimates()
    }

    pub fn current_epsilon(&self) -> f64 {
        let core = self.values.core();
        self.provider.epsilon(core.step(), core.num_tries())
    }
}

impl BanditAlgorithm for EpsilonGreedyAlgorithm {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        let epsilon = self.current_epsilon();
        if self.rng.gen::<f64>() < epsilon {
            let num_arms = self.values.core().num_arms();
            let arm = (self.rng.gen::<f64>() * num_arms as f64).floor() as usize;
            return Ok(arm.min(num_arms.saturating_sub(1)));
        }
        self.values.select_arm()
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.values.update(arm, reward)
    }

    fn reset(&mut self) {
        self.values.reset();
    }

    fn core(&self) -> &AlgorithmCore {
        self.values.core()
    }
}
