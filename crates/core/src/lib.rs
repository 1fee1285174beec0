//! Shared types, configuration and error taxonomy for the bandit arena.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ArenaError, ArenaResult};
pub use types::{
    ArmState, DistributionKind, DistributionParameters, LogEntry, PullOutcome, RunHandle,
    StrategyKind,
};
