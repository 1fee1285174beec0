use arena_core::ArenaResult;

use super::value::ValueBasedAlgorithm;
use crate::algorithm::{argmax, AlgorithmCore, BanditAlgorithm};
use crate::providers::ExplorationProvider;

/// Upper-confidence-bound selection over the value estimates.
#[derive(Debug)]
pub struct UcbAlgorithm {
    values: ValueBasedAlgorithm,
    provider: Box<dyn ExplorationProvider>,
}

impl UcbAlgorithm {
    pub fn new(values: ValueBasedAlgorithm, provider: Box<dyn ExplorationProvider>) -> Self {
        Self { values, provider }
    }

    pub fn estimates(&self) -> &[f64] {
        self.values.estimates()
    }

    /// `Q[a] + c * sqrt(2 ln(max(1, step)) / n[a])` for every arm. Unpulled arms
    /// score infinity.
    pub fn scores(&self) -> Vec<f64> {
        let core = self.values.core();
        let c = self.provider.coefficient(core.step(), core.num_tries());
        let log_step = (core.step().max(1) as f64).ln();
        self.values
            .estimates()
            .iter()
            .zip(core.num_pulls())
            .map(|(&q, &n)| {
                if n == 0 {
                    f64::INFINITY
                } else {
                    q + c * (2.0 * log_step / n as f64).sqrt()
                }
            })
            .collect()
    }
}

impl BanditAlgorithm for UcbAlgorithm {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        if let Some(cold) = self.values.core().num_pulls().iter().position(|&n| n == 0) {
            return Ok(cold);
        }
        Ok(argmax(&self.scores()).unwrap_or(0))
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
