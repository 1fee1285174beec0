//! Serializable snapshot of a run for display and reporting.

use arena_core::{ArmState, DistributionParameters, RunHandle, StrategyKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: StrategyKind,
    pub trials: usize,
    pub final_reward: f64,
    pub pulls_per_arm: Vec<usize>,
    /// Expected reward of always playing the best arm for `trials` trials,
    /// minus the reward actually collected.
    pub regret: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: RunHandle,
    pub parameters: DistributionParameters,
    pub best_arm: Option<usize>,
    pub manual_pulls: usize,
    pub complete: bool,
    pub arms: Vec<ArmState>,
    pub strategies: Vec<StrategyReport>,
    pub winners: Vec<StrategyKind>,
}

impl RunSummary {
    pub fn report(&self, strategy: StrategyKind) -> Option<&StrategyReport> {
        self.strategies.iter().find(|r| r.strategy == strategy)
    }
}
