use arena_core::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};

use crate::algorithm::{AlgorithmCore, BanditAlgorithm};

/// Externally driven strategy: the caller queues the next arm, `select_arm`
/// hands it back exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawManual")]
pub struct ManualAlgorithm {
    core: AlgorithmCore,
    pending_arm: Option<usize>,
}

impl ManualAlgorithm {
    pub fn new(num_arms: usize, num_tries: usize) -> Self {
        Self {
            core: AlgorithmCore::new(num_arms, num_tries),
            pending_arm: None,
        }
    }

    pub fn set_next_arm(&mut self, arm: usize) -> ArenaResult<()> {
        if arm >= self.core.num_arms() {
            return Err(ArenaError::InvalidArm {
                arm,
                num_arms: self.core.num_arms(),
            });
        }
        self.pending_arm = Some(arm);
        Ok(())
    }

    pub fn pending_arm(&self) -> Option<usize> {
        self.pending_arm
    }
}

#[derive(Deserialize)]
struct RawManual {
    core: AlgorithmCore,
    pending_arm: Option<usize>,
}

impl TryFrom<RawManual> for ManualAlgorithm {
    type Error = ArenaError;

    fn try_from(raw: RawManual) -> ArenaResult<Self> {
        let mut manual = Self {
            core: raw.core,
            pending_arm: None,
        };
        if let Some(arm) = raw.pending_arm {
            manual.set_next_arm(arm)?;
        }
        Ok(manual)
    }
}

impl BanditAlgorithm for ManualAlgorithm {
    fn select_arm(&mut self) -> ArenaResult<usize> {
        self.pending_arm.take().ok_or(ArenaError::NoPendingArm)
    }

    fn update(&mut self, arm: usize, reward: f64) -> ArenaResult<()> {
        self.core.record(arm, reward)
    }

    fn reset(&mut self) {
        self.core.clear();
        self.pending_arm = None;
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_consumes_pending_arm() {
        let mut manual = ManualAlgorithm::new(3, 5);
        manual.set_next_arm(2).unwrap();
        assert_eq!(manual.select_arm().unwrap(), 2);
        assert!(manual.pending_arm().is_none());
        assert!(matches!(manual.select_arm(), Err(ArenaError::NoPendingArm)));
    }

    #[test]
    fn test_select_without_pending_fails() {
        let mut manual = ManualAlgorithm::new(3, 5);
        assert!(matches!(manual.select_arm(), Err(ArenaError::NoPendingArm)));
    }

    #[test]
    fn test_set_next_arm_validates_index() {
        let mut manual = ManualAlgorithm::new(3, 5);
        assert!(matches!(
            manual.set_next_arm(3),
            Err(ArenaError::InvalidArm { arm: 3, num_arms: 3 })
        ));
        assert!(manual.pending_arm().is_none());
    }

    #[test]
    fn test_snapshot_rejects_out_of_range_pending_arm() {
        let mut manual = ManualAlgorithm::new(2, 3);
        manual.set_next_arm(1).unwrap();
        let mut json = serde_json::to_value(&manual).unwrap();

        let mut restored: ManualAlgorithm = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored.select_arm().unwrap(), 1);

        json["pending_arm"] = serde_json::json!(7);
        assert!(serde_json::from_value::<ManualAlgorithm>(json).is_err());
    }

    #[test]
    fn test_reset_clears_pending_arm() {
        let mut manual = ManualAlgorithm::new(2, 5);
        manual.set_next_arm(1).unwrap();
        let arm = manual.select_arm().unwrap();
        manual.update(arm, 1.0).unwrap();
        manual.set_next_arm(0).unwrap();
        manual.reset();

        assert!(manual.pending_arm().is_none());
        assert_eq!(manual.core().step(), 0);
        assert_eq!(manual.core().num_pulls(), &[0, 0]);
    }
}
