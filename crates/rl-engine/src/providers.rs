//! Exploration schedules injected into Epsilon-Greedy and UCB.

use arena_core::{ArenaError, ArenaResult};
use std::fmt::Debug;

/// Exploration probability for epsilon-greedy selection.
pub trait EpsilonProvider: Debug + Send + Sync {
    /// Epsilon in `[0, 1]` for the given step of a `total_steps` horizon.
    fn epsilon(&self, step: usize, total_steps: usize) -> f64;
}

/// Exploration coefficient `c` for upper-confidence-bound selection.
pub trait ExplorationProvider: Debug + Send + Sync {
    fn coefficient(&self, step: usize, total_steps: usize) -> f64;
}

fn check_probability(name: &'static str, value: f64) -> ArenaResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ArenaError::InvalidRange { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> ArenaResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ArenaError::InvalidRange { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantEpsilon {
    value: f64,
}

impl ConstantEpsilon {
    pub fn new(value: f64) -> ArenaResult<Self> {
        Ok(Self {
            value: check_probability("epsilon", value)?,
        })
    }

    pub fn set_epsilon(&mut self, value: f64) -> ArenaResult<()> {
        self.value = check_probability("epsilon", value)?;
        Ok(())
    }
}

impl EpsilonProvider for ConstantEpsilon {
    fn epsilon(&self, _step: usize, _total_steps: usize) -> f64 {
        self.value
    }
}

/// Epsilon moving linearly from `start` at step 0 to `end` at the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecayEpsilon {
    start: f64,
    end: f64,
}

impl LinearDecayEpsilon {
    pub fn new(start: f64, end: f64) -> ArenaResult<Self> {
        Ok(Self {
            start: check_probability("epsilon_start", start)?,
            end: check_probability("epsilon_end", end)?,
        })
    }
}

impl EpsilonProvider for LinearDecayEpsilon {
    fn epsilon(&self, step: usize, total_steps: usize) -> f64 {
        let progress = (step as f64 / total_steps.max(1) as f64).clamp(0.0, 1.0);
        self.start + (self.end - self.start) * progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantExploration {
    value: f64,
}

impl ConstantExploration {
    pub fn new(value: f64) -> ArenaResult<Self> {
        Ok(Self {
            value: check_non_negative("exploration", value)?,
        })
    }

    pub fn set_coefficient(&mut self, value: f64) -> ArenaResult<()> {
        self.value = check_non_negative("exploration", value)?;
        Ok(())
    }
}

impl ExplorationProvider for ConstantExploration {
    fn coefficient(&self, _step: usize, _total_steps: usize) -> f64 {
        self.value
    }
}

/// `max(floor, initial / sqrt(1 + step))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayingExploration {
    initial: f64,
    floor: f64,
}

impl DecayingExploration {
    pub fn new(initial: f64, floor: f64) -> ArenaResult<Self> {
        let initial = check_non_negative("exploration_initial", initial)?;
        let floor = check_non_negative("exploration_floor", floor)?;
        if floor > initial {
            return Err(ArenaError::InvalidRange {
                name: "exploration_floor",
                value: floor,
            });
        }
        Ok(Self { initial, floor })
    }
}

impl ExplorationProvider for DecayingExploration {
    fn coefficient(&self, step: usize, _total_steps: usize) -> f64 {
        (self.initial / (1.0 + step as f64).sqrt()).max(self.floor)
    }
}
