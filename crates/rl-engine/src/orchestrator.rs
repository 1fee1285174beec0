//! Simulation orchestrator: one reward table per run, batch simulation of the
//! automated strategies, pull-by-pull play for the manual strategy.

use std::collections::BTreeMap;

use arena_core::{
    AppConfig, ArenaError, ArenaResult, ArmState, DistributionKind, DistributionParameters,
    LogEntry, PullOutcome, RunHandle, StrategyKind,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::algorithm::BanditAlgorithm;
use crate::environment::{RewardEnvironment, RewardTable};
use crate::factory::AlgorithmFactory;
use crate::history::RewardHistory;
use crate::strategies::{Strategy, StrategyParams};
use crate::summary::{RunSummary, StrategyReport};

struct RunState {
    handle: RunHandle,
    table: RewardTable,
    parameters: DistributionParameters,
    arms: Vec<ArmState>,
    strategies: BTreeMap<StrategyKind, Strategy>,
    total_pulls: usize,
    total_reward: f64,
    logs: Vec<LogEntry>,
}

pub struct SimulationOrchestrator {
    environment: RewardEnvironment,
    factory: AlgorithmFactory,
    params: StrategyParams,
    history: RewardHistory,
    rng: StdRng,
    run: Option<RunState>,
}

impl SimulationOrchestrator {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_factory(
            config,
            AlgorithmFactory::with_defaults(config.strategies.strict_factory),
        )
    }

    pub fn with_factory(config: &AppConfig, factory: AlgorithmFactory) -> Self {
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            environment: RewardEnvironment::new().with_gaussian(
                config.simulation.gaussian_mean_upper_bound,
                config.simulation.gaussian_std_dev,
            ),
            factory,
            params: StrategyParams::from_config(&config.strategies),
            history: RewardHistory::new(StrategyKind::ALL.iter().map(|k| k.as_str())),
            rng,
            run: None,
        }
    }

    /// Start a fresh run. On error the orchestrator is left in its pre-run
    /// state.
    pub fn start_run(
        &mut self,
        arm_count: usize,
        try_count: usize,
        distribution: &str,
    ) -> ArenaResult<RunHandle> {
        self.reset_all();
        match self.build_run(arm_count, try_count, distribution) {
            Ok(run) => {
                let handle = run.handle.clone();
                info!(
                    run_id = %handle.id,
                    arms = arm_count,
                    tries = try_count,
                    distribution = %handle.distribution,
                    "Simulation run started"
                );
                self.run = Some(run);
                Ok(handle)
            }
            Err(e) => {
                warn!(error = %e, "Failed to start simulation run");
                self.reset_all();
                Err(e)
            }
        }
    }

    fn build_run(
        &mut self,
        arm_count: usize,
        try_count: usize,
        distribution: &str,
    ) -> ArenaResult<RunState> {
        self.environment.configure(arm_count, try_count, distribution);
        let table = self.environment.generate(&mut self.rng)?;
        let parameters = self.environment.parameters().cloned().ok_or_else(|| {
            ArenaError::Configuration("environment produced no parameters".to_string())
        })?;
        let distribution: DistributionKind = distribution.parse()?;

        let mut strategies = BTreeMap::new();
        for kind in StrategyKind::ALL {
            let params = self.params.clone().with_seed(self.rng.gen());
            match self
                .factory
                .create(kind.as_str(), &params, arm_count, try_count)?
            {
                Some(mut strategy) => {
                    strategy.reset();
                    strategies.insert(*kind, strategy);
                }
                None => warn!(strategy = %kind, "Strategy unavailable, skipping"),
            }
        }

        Self::simulate_automated(&mut strategies, &table, &mut self.history)?;

        Ok(RunState {
            handle: RunHandle {
                id: Uuid::new_v4(),
                arm_count,
                try_count,
                distribution,
                started_at: Utc::now(),
            },
            table,
            parameters,
            arms: (0..arm_count).map(ArmState::new).collect(),
            strategies,
            total_pulls: 0,
            total_reward: 0.0,
            logs: Vec::new(),
        })
    }

    /// Drive every automated strategy through the whole horizon. Trial `t`
    /// reads column `t` of the table.
    fn simulate_automated(
        strategies: &mut BTreeMap<StrategyKind, Strategy>,
        table: &RewardTable,
        history: &mut RewardHistory,
    ) -> ArenaResult<()> {
        for t in 0..table.try_count() {
            for strategy in strategies.values_mut().filter(|s| s.kind().is_automated()) {
                let arm = strategy.select_arm()?;
                let reward = table.reward(arm, t).ok_or(ArenaError::InvalidArm {
                    arm,
                    num_arms: table.arm_count(),
                })?;
                strategy.update(arm, reward)?;
            }
        }

        for (kind, strategy) in strategies.iter().filter(|(k, _)| k.is_automated()) {
            history.append(kind.as_str(), strategy.core().observed_rewards())?;
            debug!(
                strategy = %kind,
                total_reward = history.final_value(kind.as_str()).unwrap_or(0.0),
                "Automated strategy simulated"
            );
        }
        Ok(())
    }

    /// One manual pull of `arm`. Returns `Ok(None)` without changing anything
    /// when no run is active or the horizon is reached.
    ///
    /// The reward comes from the arm's own pull count, not the global trial
    /// number, so a manual player and an automated strategy see different
    /// draws of the same arm.
    pub fn pull(&mut self, arm: usize) -> ArenaResult<Option<PullOutcome>> {
        let Some(run) = self.run.as_mut() else {
            warn!(arm, "Pull ignored, no active run");
            return Ok(None);
        };
        if arm >= run.arms.len() {
            return Err(ArenaError::InvalidArm {
                arm,
                num_arms: run.arms.len(),
            });
        }
        let try_count = run.handle.try_count;
        if run.total_pulls >= try_count || run.arms[arm].pulls >= try_count {
            warn!(arm, "Pull ignored, horizon reached");
            return Ok(None);
        }
        let Some(manual) = run.strategies.get_mut(&StrategyKind::Manual) else {
            warn!(arm, "Pull ignored, manual strategy unavailable");
            return Ok(None);
        };

        let draw = run.arms[arm].pulls;
        let reward = run.table.reward(arm, draw).ok_or(ArenaError::ExhaustedTries {
            num_tries: try_count,
        })?;

        manual
            .as_manual_mut()
            .ok_or_else(|| ArenaError::ContractViolation {
                name: StrategyKind::Manual.to_string(),
                reason: "registered instance is not manual".to_string(),
            })?
            .set_next_arm(arm)?;
        let chosen = manual.select_arm()?;
        manual.update(chosen, reward)?;

        let state = &mut run.arms[arm];
        state.pulls += 1;
        state.last_reward = Some(reward);
        run.total_pulls += 1;
        run.total_reward += reward;
        let timestep = run.total_pulls;
        run.logs.push(LogEntry {
            timestep,
            arm,
            reward,
        });
        self.history
            .append(StrategyKind::Manual.as_str(), manual.core().observed_rewards())?;

        debug!(timestep, arm, reward, "Manual pull");
        if timestep == try_count {
            info!(total_reward = run.total_reward, "Manual horizon reached");
        }
        Ok(Some(PullOutcome { timestep, reward }))
    }

    /// Strategies whose final cumulative reward is the maximum. Several on a
    /// tie; empty when no run is active.
    pub fn compute_winner(&self) -> Vec<StrategyKind> {
        let Some(run) = &self.run else {
            return Vec::new();
        };
        let finals: Vec<(StrategyKind, f64)> = run
            .strategies
            .keys()
            .map(|kind| {
                (
                    *kind,
                    self.history.final_value(kind.as_str()).unwrap_or(0.0),
                )
            })
            .collect();
        let best = finals
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        finals
            .into_iter()
            .filter(|(_, v)| *v == best)
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Winners once the manual player has used the whole horizon.
    pub fn winners(&self) -> Option<Vec<StrategyKind>> {
        self.is_complete().then(|| self.compute_winner())
    }

    /// Drop the run and clear the history in place. Always succeeds.
    pub fn reset_all(&mut self) {
        if let Some(run) = self.run.take() {
            info!(run_id = %run.handle.id, "Simulation run reset");
        }
        self.history.reset();
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.total_pulls >= run.handle.try_count)
    }

    pub fn handle(&self) -> Option<&RunHandle> {
        self.run.as_ref().map(|run| &run.handle)
    }

    pub fn arms(&self) -> &[ArmState] {
        self.run
            .as_ref()
            .map(|run| run.arms.as_slice())
            .unwrap_or_default()
    }

    pub fn logs(&self) -> &[LogEntry] {
        self.run
            .as_ref()
            .map(|run| run.logs.as_slice())
            .unwrap_or_default()
    }

    pub fn total_pulls(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.total_pulls)
    }

    pub fn total_reward(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |run| run.total_reward)
    }

    pub fn history(&self) -> &RewardHistory {
        &self.history
    }

    pub fn series(&self, kind: StrategyKind) -> Option<&[f64]> {
        self.history.series(kind.as_str())
    }

    /// Per-arm success probabilities or means of the current run.
    pub fn parameters(&self) -> Option<&DistributionParameters> {
        self.run.as_ref().map(|run| &run.parameters)
    }

    pub fn table(&self) -> Option<&RewardTable> {
        self.run.as_ref().map(|run| &run.table)
    }

    pub fn strategy(&self, kind: StrategyKind) -> Option<&Strategy> {
        self.run.as_ref().and_then(|run| run.strategies.get(&kind))
    }

    pub fn summary(&self) -> Option<RunSummary> {
        let run = self.run.as_ref()?;
        let best_arm = run.parameters.best_arm();
        let best_value = best_arm
            .map(|arm| run.parameters.values()[arm])
            .unwrap_or(0.0);

        let strategies = run
            .strategies
            .iter()
            .map(|(kind, strategy)| {
                let trials = strategy.core().step();
                let final_reward = self.history.final_value(kind.as_str()).unwrap_or(0.0);
                StrategyReport {
                    strategy: *kind,
                    trials,
                    final_reward,
                    pulls_per_arm: strategy.core().num_pulls().to_vec(),
                    regret: trials as f64 * best_value - final_reward,
                }
            })
            .collect();

        Some(RunSummary {
            run: run.handle.clone(),
            parameters: run.parameters.clone(),
            best_arm,
            manual_pulls: run.total_pulls,
            complete: self.is_complete(),
            arms: run.arms.clone(),
            strategies,
            winners: self.compute_winner(),
        })
    }
}

impl Default for SimulationOrchestrator {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}
