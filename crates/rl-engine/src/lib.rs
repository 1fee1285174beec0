//! Bandit arena engine: reward environment, bandit strategies (Greedy,
//! Epsilon-Greedy, UCB, Gradient Bandit, Manual), strategy factory,
//! cumulative reward history and the simulation orchestrator.

pub mod algorithm;
pub mod environment;
pub mod factory;
pub mod history;
pub mod orchestrator;
pub mod providers;
pub mod strategies;
pub mod summary;

pub use algorithm::{AlgorithmCore, BanditAlgorithm};
pub use environment::{RewardEnvironment, RewardTable};
pub use factory::AlgorithmFactory;
pub use history::RewardHistory;
pub use orchestrator::SimulationOrchestrator;
pub use strategies::{Strategy, StrategyParams};
pub use summary::{RunSummary, StrategyReport};
