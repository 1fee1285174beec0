//! Base bandit contract: the recording state every strategy shares and the
//! trait the orchestrator drives.

use arena_core::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};

/// Capability shared by every strategy: choose an arm, learn from the reward,
/// start over.
pub trait BanditAlgorithm {
    /// Choose the next arm. Records nothing.
    fn select_arm(&mut self) -> ArenaResult<usize>;

    /// Record `reward` for `arm` at the current step and advance the step.
    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()>;

    /// Return to the fresh state.
    fn reset(&mut self);

    /// Recording state shared by all strategies.
    fn core(&self) -> &AlgorithmCore;
}

/// Step-indexed record of arms chosen and rewards observed.
///
/// `selected_arms[t]` is written exactly once, at `t == step`, after which
/// `step` advances. Arm indices outside `[0, num_arms)` and steps past
/// `num_tries` are never written. Snapshots that break these rules are
/// rejected on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCore")]
pub struct AlgorithmCore {
    num_arms: usize,
    num_tries: usize,
    step: usize,
    selected_arms: Vec<Option<usize>>,
    observed_rewards: Vec<f64>,
    num_pulls: Vec<usize>,
}

impl AlgorithmCore {
    pub fn new(num_arms: usize, num_tries: usize) -> Self {
        Self {
            num_arms,
            num_tries,
            step: 0,
            selected_arms: vec![None; num_tries],
            observed_rewards: vec![0.0; num_tries],
            num_pulls: vec![0; num_arms],
        }
    }

    pub fn num_arms(&self) -> usize {
        self.num_arms
    }

    pub fn num_tries(&self) -> usize {
        self.num_tries
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_exhausted(&self) -> bool {
        self.step >= self.num_tries
    }

    pub fn num_pulls(&self) -> &[usize] {
        &self.num_pulls
    }

    pub fn selected_arms(&self) -> &[Option<usize>] {
        &self.selected_arms
    }

    /// Rewards observed so far, one per completed step.
    pub fn observed_rewards(&self) -> &[f64] {
        &self.observed_rewards[..self.step]
    }

    /// Check that `arm` could be recorded at the current step without
    /// recording it.
    pub fn ensure_recordable(&self, arm: usize) -> ArenaResult<()> {
        if arm >= self.num_arms {
            return Err(ArenaError::InvalidArm {
                arm,
                num_arms: self.num_arms,
            });
        }
        if self.is_exhausted() {
            return Err(ArenaError::ExhaustedTries {
                num_tries: self.num_tries,
            });
        }
        if self.selected_arms[self.step].is_some() {
            return Err(ArenaError::DuplicateRecord { step: self.step });
        }
        Ok(())
    }

    pub fn record(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.ensure_recordable(arm)?;
        self.selected_arms[self.step] = Some(arm);
        self.observed_rewards[self.step] = reward;
        self.num_pulls[arm] += 1;
        self.step += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.step = 0;
        self.selected_arms.iter_mut().for_each(|slot| *slot = None);
        self.observed_rewards.iter_mut().for_each(|r| *r = 0.0);
        self.num_pulls.iter_mut().for_each(|n| *n = 0);
    }
}

/// Unchecked wire form of [`AlgorithmCore`].
#[derive(Deserialize)]
struct RawCore {
    num_arms: usize,
    num_tries: usize,
    step: usize,
    selected_arms: Vec<Option<usize>>,
    observed_rewards: Vec<f64>,
    num_pulls: Vec<usize>,
}

impl TryFrom<RawCore> for AlgorithmCore {
    type Error = ArenaError;

    fn try_from(raw: RawCore) -> ArenaResult<Self> {
        if raw.selected_arms.len() != raw.num_tries
            || raw.observed_rewards.len() != raw.num_tries
            || raw.num_pulls.len() != raw.num_arms
        {
            return Err(ArenaError::InvalidShape(format!(
                "core snapshot for {} arms x {} tries has {} slots, {} rewards, {} pull counts",
                raw.num_arms,
                raw.num_tries,
                raw.selected_arms.len(),
                raw.observed_rewards.len(),
                raw.num_pulls.len()
            )));
        }
        if raw.step > raw.num_tries {
            return Err(ArenaError::InvalidInput(format!(
                "core snapshot step {} is past {} tries",
                raw.step, raw.num_tries
            )));
        }

        let mut pulls = vec![0usize; raw.num_arms];
        for (t, slot) in raw.selected_arms.iter().enumerate() {
            match (*slot, t < raw.step) {
                (Some(arm), true) if arm < raw.num_arms => pulls[arm] += 1,
                (None, false) => {}
                _ => {
                    return Err(ArenaError::InvalidInput(format!(
                        "core snapshot slot {t} is inconsistent with step {}",
                        raw.step
                    )))
                }
            }
        }
        if pulls != raw.num_pulls {
            return Err(ArenaError::InvalidInput(
                "core snapshot pull counts disagree with the recorded arms".to_string(),
            ));
        }

        Ok(Self {
            num_arms: raw.num_arms,
            num_tries: raw.num_tries,
            step: raw.step,
            selected_arms: raw.selected_arms,
            observed_rewards: raw.observed_rewards,
            num_pulls: raw.num_pulls,
        })
    }
}

impl BanditAlgorithm for AlgorithmCore {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        Err(ArenaError::NotImplemented("select_arm"))
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.record(arm, reward)
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn core(&self) -> &AlgorithmCore {
        self
    }
}

/// Index of the largest value, lowest index on ties. `None` for an empty slice.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_select_arm_not_implemented() {
        let mut core = AlgorithmCore::new(3, 5);
        assert!(matches!(
            core.select_arm(),
            Err(ArenaError::NotImplemented("select_arm"))
        ));
    }

    #[test]
    fn test_update_records_and_advances() {
        let mut core = AlgorithmCore::new(3, 4);
        core.update(2, 1.5).unwrap();
        core.update(0, 0.5).unwrap();
        core.update(2, 3.0).unwrap();

        assert_eq!(core.step(), 3);
        assert_eq!(core.num_pulls(), &[1, 0, 2]);
        assert_eq!(core.observed_rewards(), &[1.5, 0.5, 3.0]);
        assert_eq!(core.selected_arms(), &[Some(2), Some(0), Some(2), None]);
    }

    #[test]
    fn test_update_rejects_invalid_arm() {
        let mut core = AlgorithmCore::new(2, 4);
        assert!(matches!(
            core.update(2, 1.0),
            Err(ArenaError::InvalidArm { arm: 2, num_arms: 2 })
        ));
        assert_eq!(core.step(), 0);
        assert!(core.observed_rewards().is_empty());
    }

    #[test]
    fn test_update_rejects_past_horizon() {
        let mut core = AlgorithmCore::new(2, 2);
        core.update(0, 1.0).unwrap();
        core.update(1, 0.0).unwrap();
        assert!(core.is_exhausted());
        assert!(matches!(
            core.update(0, 1.0),
            Err(ArenaError::ExhaustedTries { num_tries: 2 })
        ));
        assert_eq!(core.num_pulls(), &[1, 1]);
    }

    #[test]
    fn test_reset_returns_to_fresh() {
        let mut core = AlgorithmCore::new(2, 3);
        core.update(1, 4.0).unwrap();
        core.reset();

        assert_eq!(core.step(), 0);
        assert_eq!(core.num_pulls(), &[0, 0]);
        assert!(core.selected_arms().iter().all(Option::is_none));
        assert!(core.observed_rewards().is_empty());
        core.update(0, 2.0).unwrap();
        assert_eq!(core.observed_rewards(), &[2.0]);
    }

    #[test]
    fn test_update_rejects_prewritten_slot() {
        let mut core = AlgorithmCore::new(2, 2);
        core.selected_arms[0] = Some(1);
        assert!(matches!(
            core.update(0, 1.0),
            Err(ArenaError::DuplicateRecord { step: 0 })
        ));
    }

    #[test]
    fn test_snapshot_round_trips_recorded_state() {
        let mut core = AlgorithmCore::new(2, 3);
        core.update(1, 2.5).unwrap();
        let json = serde_json::to_value(&core).unwrap();

        let mut restored: AlgorithmCore = serde_json::from_value(json).unwrap();
        assert_eq!(restored.step(), 1);
        assert_eq!(restored.observed_rewards(), &[2.5]);
        restored.update(0, 1.0).unwrap();
        assert_eq!(restored.num_pulls(), &[1, 1]);
    }

    #[test]
    fn test_malformed_snapshots_rejected() {
        let malformed = [
            // slot vectors shorter than the horizon
            serde_json::json!({
                "num_arms": 2, "num_tries": 3, "step": 0,
                "selected_arms": [], "observed_rewards": [], "num_pulls": [0, 0],
            }),
            // step past the horizon
            serde_json::json!({
                "num_arms": 2, "num_tries": 1, "step": 5,
                "selected_arms": [null], "observed_rewards": [0.0], "num_pulls": [0, 0],
            }),
            // written slot beyond the step
            serde_json::json!({
                "num_arms": 2, "num_tries": 2, "step": 0,
                "selected_arms": [1, null], "observed_rewards": [0.0, 0.0], "num_pulls": [0, 0],
            }),
            // empty slot before the step
            serde_json::json!({
                "num_arms": 2, "num_tries": 2, "step": 1,
                "selected_arms": [null, null], "observed_rewards": [0.0, 0.0], "num_pulls": [1, 0],
            }),
            // recorded arm out of range
            serde_json::json!({
                "num_arms": 2, "num_tries": 2, "step": 1,
                "selected_arms": [2, null], "observed_rewards": [1.0, 0.0], "num_pulls": [1, 0],
            }),
            // pull counts disagree with the slots
            serde_json::json!({
                "num_arms": 2, "num_tries": 2, "step": 1,
                "selected_arms": [0, null], "observed_rewards": [1.0, 0.0], "num_pulls": [0, 1],
            }),
        ];
        for snapshot in malformed {
            assert!(
                serde_json::from_value::<AlgorithmCore>(snapshot.clone()).is_err(),
                "accepted {snapshot}"
            );
        }
    }

    #[test]
    fn test_argmax_first_index_wins() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[0.0, 0.0, 0.0]), Some(0));
        assert_eq!(argmax(&[-5.0, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
