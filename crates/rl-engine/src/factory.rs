//! Strategy factory: validated construction of strategies by name.

use std::collections::HashMap;

use arena_core::{ArenaError, ArenaResult, StrategyKind};
use tracing::{debug, warn};

use crate::algorithm::BanditAlgorithm;
use crate::providers::{
    ConstantEpsilon, ConstantExploration, DecayingExploration, EpsilonProvider,
    ExplorationProvider, LinearDecayEpsilon,
};
use crate::strategies::{
    EpsilonGreedyAlgorithm, GradientBanditAlgorithm, ManualAlgorithm, Strategy, StrategyParams,
    UcbAlgorithm, ValueBasedAlgorithm,
};

pub const DEFAULT_EPSILON: f64 = 0.1;
pub const DEFAULT_EXPLORATION: f64 = 1.0;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Builds a strategy for `(params, num_arms, num_tries)`.
pub type Constructor = fn(&StrategyParams, usize, usize) -> ArenaResult<Strategy>;

pub struct AlgorithmFactory {
    registry: HashMap<StrategyKind, Constructor>,
    strict: bool,
}

impl AlgorithmFactory {
    /// Empty registry. In non-strict mode unknown names are logged and
    /// ignored instead of failing.
    pub fn new(strict: bool) -> Self {
        Self {
            registry: HashMap::new(),
            strict,
        }
    }

    /// Registry with every built-in strategy.
    pub fn with_defaults(strict: bool) -> Self {
        let mut factory = Self::new(strict);
        for kind in StrategyKind::ALL {
            factory.registry.insert(*kind, Self::builtin(*kind));
        }
        factory
    }

    /// Built-in constructor for `kind`.
    pub fn builtin(kind: StrategyKind) -> Constructor {
        match kind {
            StrategyKind::Manual => build_manual,
            StrategyKind::Greedy => build_greedy,
            StrategyKind::EpsilonGreedy => build_epsilon_greedy,
            StrategyKind::Ucb => build_ucb,
            StrategyKind::GradientBandit => build_gradient_bandit,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register(&mut self, name: &str, ctor: Constructor) -> ArenaResult<()> {
        match name.parse::<StrategyKind>() {
            Ok(kind) => {
                if self.registry.insert(kind, ctor).is_some() {
                    debug!(strategy = name, "Replaced strategy constructor");
                }
                Ok(())
            }
            Err(e) if self.strict => Err(e),
            Err(_) => {
                warn!(strategy = name, "Ignoring registration of unknown strategy");
                Ok(())
            }
        }
    }

    pub fn registered(&self) -> Vec<StrategyKind> {
        let mut kinds: Vec<_> = self.registry.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Construct the strategy registered under `name`. Returns `Ok(None)` for
    /// unregistered names in non-strict mode.
    pub fn create(
        &self,
        name: &str,
        params: &StrategyParams,
        num_arms: usize,
        num_tries: usize,
    ) -> ArenaResult<Option<Strategy>> {
        let registered = name
            .parse::<StrategyKind>()
            .ok()
            .and_then(|kind| self.registry.get(&kind).map(|ctor| (kind, *ctor)));
        let (kind, ctor) = match registered {
            Some(entry) => entry,
            None if self.strict => return Err(ArenaError::UnknownStrategy(name.to_string())),
            None => {
                warn!(strategy = name, "Requested strategy is not registered");
                return Ok(None);
            }
        };

        if num_arms == 0 || num_tries == 0 {
            return Err(ArenaError::InvalidShape(format!(
                "arm and try counts must be positive, got {num_arms} arms and {num_tries} tries"
            )));
        }

        let strategy =
            ctor(params, num_arms, num_tries).map_err(|e| ArenaError::ConstructionFailed {
                name: name.to_string(),
                source: Box::new(e),
            })?;

        let violation = if strategy.kind() != kind {
            Some(format!("constructor produced `{}`", strategy.kind()))
        } else if strategy.core().num_arms() != num_arms {
            Some(format!(
                "expected {num_arms} arms, instance has {}",
                strategy.core().num_arms()
            ))
        } else if strategy.core().num_tries() != num_tries {
            Some(format!(
                "expected {num_tries} tries, instance has {}",
                strategy.core().num_tries()
            ))
        } else {
            None
        };
        if let Some(reason) = violation {
            return Err(ArenaError::ContractViolation {
                name: name.to_string(),
                reason,
            });
        }

        debug!(strategy = name, arms = num_arms, tries = num_tries, "Strategy created");
        Ok(Some(strategy))
    }
}

impl Default for AlgorithmFactory {
    fn default() -> Self {
        Self::with_defaults(true)
    }
}

fn seed_for(params: &StrategyParams) -> u64 {
    params.seed.unwrap_or_else(rand::random)
}

fn value_based(
    params: &StrategyParams,
    num_arms: usize,
    num_tries: usize,
) -> ArenaResult<ValueBasedAlgorithm> {
    match &params.expected_rewards_begin {
        Some(initial) => {
            ValueBasedAlgorithm::with_initial_estimates(num_arms, num_tries, initial.clone())
        }
        None => Ok(ValueBasedAlgorithm::new(num_arms, num_tries)),
    }
}

fn build_manual(_: &StrategyParams, num_arms: usize, num_tries: usize) -> ArenaResult<Strategy> {
    Ok(Strategy::Manual(ManualAlgorithm::new(num_arms, num_tries)))
}

fn build_greedy(
    params: &StrategyParams,
    num_arms: usize,
    num_tries: usize,
) -> ArenaResult<Strategy> {
    Ok(Strategy::Greedy(value_based(params, num_arms, num_tries)?))
}

fn build_epsilon_greedy(
    params: &StrategyParams,
    num_arms: usize,
    num_tries: usize,
) -> ArenaResult<Strategy> {
    let epsilon = params.epsilon.unwrap_or(DEFAULT_EPSILON);
    let provider: Box<dyn EpsilonProvider> = match params.epsilon_end {
        Some(end) => Box::new(LinearDecayEpsilon::new(epsilon, end)?),
        None => Box::new(ConstantEpsilon::new(epsilon)?),
    };
    Ok(Strategy::EpsilonGreedy(EpsilonGreedyAlgorithm::new(
        value_based(params, num_arms, num_tries)?,
        provider,
        seed_for(params),
    )))
}

fn build_ucb(params: &StrategyParams, num_arms: usize, num_tries: usize) -> ArenaResult<Strategy> {
    let exploration = params.exploration.unwrap_or(DEFAULT_EXPLORATION);
    let provider: Box<dyn ExplorationProvider> = match params.exploration_floor {
        Some(floor) => Box::new(DecayingExploration::new(exploration, floor)?),
        None => Box::new(ConstantExploration::new(exploration)?),
    };
    Ok(Strategy::Ucb(UcbAlgorithm::new(
        value_based(params, num_arms, num_tries)?,
        provider,
    )))
}

fn build_gradient_bandit(
    params: &StrategyParams,
    num_arms: usize,
    num_tries: usize,
) -> ArenaResult<Strategy> {
    Ok(Strategy::GradientBandit(GradientBanditAlgorithm::new(
        num_arms,
        num_tries,
        params.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
        seed_for(params),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_create_every_strategy() {
        let factory = AlgorithmFactory::with_defaults(true);
        assert_eq!(factory.registered(), StrategyKind::ALL.to_vec());

        for kind in StrategyKind::ALL {
            let strategy = factory
                .create(kind.as_str(), &StrategyParams::default(), 4, 20)
                .unwrap()
                .unwrap();
            assert_eq!(strategy.kind(), *kind);
            assert_eq!(strategy.core().num_arms(), 4);
            assert_eq!(strategy.core().num_tries(), 20);
        }
    }

    #[test]
    fn test_unknown_strategy_strict_and_lenient() {
        let strict = AlgorithmFactory::with_defaults(true);
        assert!(matches!(
            strict.create("thompson", &StrategyParams::default(), 2, 2),
            Err(ArenaError::UnknownStrategy(_))
        ));

        let lenient = AlgorithmFactory::with_defaults(false);
        assert!(lenient
            .create("thompson", &StrategyParams::default(), 2, 2)
            .unwrap()
            .is_none());

        let empty = AlgorithmFactory::new(false);
        assert!(empty
            .create("greedy", &StrategyParams::default(), 2, 2)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_register_rejects_unknown_names() {
        let mut strict = AlgorithmFactory::new(true);
        assert!(matches!(
            strict.register("softmax", build_manual),
            Err(ArenaError::UnknownStrategy(_))
        ));

        let mut lenient = AlgorithmFactory::new(false);
        lenient.register("softmax", build_manual).unwrap();
        assert!(lenient.registered().is_empty());
    }

    #[test]
    fn test_register_overwrites() {
        fn optimistic(_: &StrategyParams, k: usize, t: usize) -> ArenaResult<Strategy> {
            Ok(Strategy::Greedy(ValueBasedAlgorithm::with_initial_estimates(
                k,
                t,
                vec![5.0; k],
            )?))
        }

        let mut factory = AlgorithmFactory::with_defaults(true);
        factory.register("greedy", optimistic).unwrap();
        match factory
            .create("greedy", &StrategyParams::default(), 3, 5)
            .unwrap()
        {
            Some(Strategy::Greedy(greedy)) => assert_eq!(greedy.estimates(), &[5.0, 5.0, 5.0]),
            other => panic!("unexpected strategy {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_empty_shape() {
        let factory = AlgorithmFactory::default();
        assert!(matches!(
            factory.create("ucb", &StrategyParams::default(), 0, 10),
            Err(ArenaError::InvalidShape(_))
        ));
        assert!(matches!(
            factory.create("ucb", &StrategyParams::default(), 3, 0),
            Err(ArenaError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_constructor_errors_are_wrapped() {
        let factory = AlgorithmFactory::default();
        let params = StrategyParams {
            expected_rewards_begin: Some(vec![1.0, 2.0]),
            ..Default::default()
        };
        match factory.create("greedy", &params, 3, 10) {
            Err(ArenaError::ConstructionFailed { name, source }) => {
                assert_eq!(name, "greedy");
                assert!(matches!(*source, ArenaError::InvalidShape(_)));
            }
            other => panic!("unexpected result {other:?}"),
        }

        let params = StrategyParams {
            epsilon: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            factory.create("epsilon_greedy", &params, 3, 10),
            Err(ArenaError::ConstructionFailed { .. })
        ));
    }

    #[test]
    fn test_contract_violations() {
        fn wrong_kind(_: &StrategyParams, k: usize, t: usize) -> ArenaResult<Strategy> {
            Ok(Strategy::Manual(ManualAlgorithm::new(k, t)))
        }
        fn wrong_shape(_: &StrategyParams, k: usize, t: usize) -> ArenaResult<Strategy> {
            Ok(Strategy::Greedy(ValueBasedAlgorithm::new(k + 1, t)))
        }

        let mut factory = AlgorithmFactory::with_defaults(true);
        factory.register("ucb", wrong_kind).unwrap();
        factory.register("greedy", wrong_shape).unwrap();

        assert!(matches!(
            factory.create("ucb", &StrategyParams::default(), 2, 4),
            Err(ArenaError::ContractViolation { .. })
        ));
        assert!(matches!(
            factory.create("greedy", &StrategyParams::default(), 2, 4),
            Err(ArenaError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_exploration_floor_selects_decaying_coefficient() {
        let factory = AlgorithmFactory::default();
        let params = StrategyParams {
            exploration: Some(2.0),
            exploration_floor: Some(0.5),
            ..Default::default()
        };
        let mut strategy = factory.create("ucb", &params, 2, 20).unwrap().unwrap();
        strategy.update(0, 1.0).unwrap();
        strategy.update(1, 0.0).unwrap();

        let Strategy::Ucb(ucb) = &strategy else {
            panic!("unexpected strategy {strategy:?}");
        };
        // step 2: c = max(0.5, 2 / sqrt(3))
        let c = 2.0 / 3f64.sqrt();
        let bonus = c * (2.0 * 2f64.ln()).sqrt();
        let scores = ucb.scores();
        assert!((scores[0] - (1.0 + bonus)).abs() < 1e-12);
        assert!((scores[1] - bonus).abs() < 1e-12);

        let inverted = StrategyParams {
            exploration: Some(0.5),
            exploration_floor: Some(2.0),
            ..Default::default()
        };
        assert!(matches!(
            factory.create("ucb", &inverted, 2, 20),
            Err(ArenaError::ConstructionFailed { .. })
        ));
    }

    #[test]
    fn test_params_reach_strategies() {
        let factory = AlgorithmFactory::default();
        let params = StrategyParams {
            epsilon: Some(0.0),
            expected_rewards_begin: Some(vec![10.0, 50.0, 20.0]),
            seed: Some(1),
            ..Default::default()
        };
        let mut strategy = factory
            .create("epsilon_greedy", &params, 3, 10)
            .unwrap()
            .unwrap();
        for _ in 0..20 {
            assert_eq!(strategy.select_arm().unwrap(), 1);
        }
    }
}
