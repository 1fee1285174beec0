//! Concrete decision policies and the closed `Strategy` set the orchestrator
//! runs.

pub mod epsilon_greedy;
pub mod gradient;
pub mod manual;
pub mod ucb;
pub mod value;

pub use epsilon_greedy::EpsilonGreedyAlgorithm;
pub use gradient::{softmax, GradientBanditAlgorithm};
pub use manual::ManualAlgorithm;
pub use ucb::UcbAlgorithm;
pub use value::{GreedyAlgorithm, ValueBasedAlgorithm};

use arena_core::config::StrategyConfig;
use arena_core::{ArenaResult, StrategyKind};
use serde::{Deserialize, Serialize};

use crate::algorithm::{AlgorithmCore, BanditAlgorithm};

/// Optional construction parameters. Unset fields fall back to the
/// strategy defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub expected_rewards_begin: Option<Vec<f64>>,
    pub epsilon: Option<f64>,
    /// Final epsilon for a linearly decaying schedule.
    pub epsilon_end: Option<f64>,
    pub exploration: Option<f64>,
    /// Floor for a decaying UCB exploration coefficient.
    pub exploration_floor: Option<f64>,
    pub learning_rate: Option<f64>,
    pub seed: Option<u64>,
}

impl StrategyParams {
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            expected_rewards_begin: config.initial_estimates.clone(),
            epsilon: Some(config.epsilon),
            epsilon_end: config.epsilon_end,
            exploration: Some(config.exploration),
            exploration_floor: config.exploration_floor,
            learning_rate: Some(config.learning_rate),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug)]
pub enum Strategy {
    Manual(ManualAlgorithm),
    Greedy(GreedyAlgorithm),
    EpsilonGreedy(EpsilonGreedyAlgorithm),
    Ucb(UcbAlgorithm),
    GradientBandit(GradientBanditAlgorithm),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Manual(_) => StrategyKind::Manual,
            Self::Greedy(_) => StrategyKind::Greedy,
            Self::EpsilonGreedy(_) => StrategyKind::EpsilonGreedy,
            Self::Ucb(_) => StrategyKind::Ucb,
            Self::GradientBandit(_) => StrategyKind::GradientBandit,
        }
    }

    pub fn as_manual_mut(&mut self) -> Option<&mut ManualAlgorithm> {
        match self {
            Self::Manual(m) => Some(m),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn BanditAlgorithm {
        match self {
            Self::Manual(a) => a,
            Self::Greedy(a) => a,
            Self::EpsilonGreedy(a) => a,
            Self::Ucb(a) => a,
            Self::GradientBandit(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BanditAlgorithm {
        match self {
            Self::Manual(a) => a,
            Self::Greedy(a) => a,
            Self::EpsilonGreedy(a) => a,
            Self::Ucb(a) => a,
            Self::GradientBandit(a) => a,
        }
    }
}

impl BanditAlgorithm for Strategy {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        self.inner_mut().select_arm()
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.inner_mut().update(arm, reward)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn core(&self) -> &AlgorithmCore {
        self.inner().core()
    }
}
