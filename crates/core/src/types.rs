use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ArenaError;

/// Probability distribution the reward table is drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    Bernoulli,
    Gaussian,
}

impl DistributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bernoulli => "bernoulli",
            Self::Gaussian => "gaussian",
        }
    }
}

impl FromStr for DistributionKind {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bernoulli" => Ok(Self::Bernoulli),
            "gaussian" => Ok(Self::Gaussian),
            other => Err(ArenaError::Configuration(format!(
                "unrecognized distribution `{other}`"
            ))),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every strategy that can compete in a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Manual,
    Greedy,
    EpsilonGreedy,
    Ucb,
    GradientBandit,
}

impl StrategyKind {
    pub const ALL: &'static [StrategyKind] = &[
        Self::Manual,
        Self::Greedy,
        Self::EpsilonGreedy,
        Self::Ucb,
        Self::GradientBandit,
    ];

    /// Strategies that are simulated in batch at the start of a run.
    pub const AUTOMATED: &'static [StrategyKind] = &[
        Self::Greedy,
        Self::EpsilonGreedy,
        Self::Ucb,
        Self::GradientBandit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Greedy => "greedy",
            Self::EpsilonGreedy => "epsilon_greedy",
            Self::Ucb => "ucb",
            Self::GradientBandit => "gradient_bandit",
        }
    }

    pub fn is_automated(&self) -> bool {
        !matches!(self, Self::Manual)
    }
}

impl FromStr for StrategyKind {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ArenaError::UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of one arm, as seen by the manual player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArmState {
    pub index: usize,
    pub pulls: usize,
    pub last_reward: Option<f64>,
}

impl ArmState {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            pulls: 0,
            last_reward: None,
        }
    }
}

/// One manual pull, in the order it happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    /// 1-based trial number of the manual player.
    pub timestep: usize,
    pub arm: usize,
    pub reward: f64,
}

/// Result of a successful manual pull.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PullOutcome {
    pub timestep: usize,
    pub reward: f64,
}

/// Generated per-arm distribution parameters, kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "values")]
pub enum DistributionParameters {
    Probabilities(Vec<f64>),
    Means(Vec<f64>),
}

impl DistributionParameters {
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Probabilities(v) | Self::Means(v) => v,
        }
    }

    /// Index of the arm with the highest expected reward, lowest index on ties.
    pub fn best_arm(&self) -> Option<usize> {
        let values = self.values();
        let mut best: Option<usize> = None;
        for (i, v) in values.iter().enumerate() {
            match best {
                Some(b) if values[b] >= *v => {}
                _ => best = Some(i),
            }
        }
        best
    }
}

/// Identifies one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHandle {
    pub id: Uuid,
    pub arm_count: usize,
    pub try_count: usize,
    pub distribution: DistributionKind,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_parse() {
        assert_eq!(
            "Gaussian".parse::<DistributionKind>().unwrap(),
            DistributionKind::Gaussian
        );
        assert_eq!(
            " bernoulli ".parse::<DistributionKind>().unwrap(),
            DistributionKind::Bernoulli
        );
        assert!(matches!(
            "poisson".parse::<DistributionKind>(),
            Err(ArenaError::Configuration(_))
        ));
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), *kind);
        }
        assert!(matches!(
            "thompson".parse::<StrategyKind>(),
            Err(ArenaError::UnknownStrategy(_))
        ));
        assert!(!StrategyKind::AUTOMATED.contains(&StrategyKind::Manual));
    }

    #[test]
    fn test_best_arm_prefers_lowest_index_on_ties() {
        let params = DistributionParameters::Means(vec![1.0, 4.0, 4.0, 2.0]);
        assert_eq!(params.best_arm(), Some(1));
        assert_eq!(DistributionParameters::Probabilities(vec![]).best_arm(), None);
    }

    #[test]
    fn test_parameters_serialize_tagged() {
        let json =
            serde_json::to_value(DistributionParameters::Probabilities(vec![0.5])).unwrap();
        assert_eq!(json["kind"], "probabilities");
        assert_eq!(json["values"][0], 0.5);
    }
}
