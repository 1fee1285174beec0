use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `BANDIT_ARENA__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub strategies: StrategyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_arm_count")]
    pub arm_count: usize,
    #[serde(default = "default_try_count")]
    pub try_count: usize,
    #[serde(default = "default_distribution")]
    pub distribution: String,
    /// Seed for the run RNG. Runs are reproducible when set.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_gaussian_mean_upper_bound")]
    pub gaussian_mean_upper_bound: f64,
    #[serde(default = "default_gaussian_std_dev")]
    pub gaussian_std_dev: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// When set, epsilon decays linearly from `epsilon` to this value.
    #[serde(default)]
    pub epsilon_end: Option<f64>,
    #[serde(default = "default_exploration")]
    pub exploration: f64,
    /// When set, the UCB coefficient decays from `exploration` down to this floor.
    #[serde(default)]
    pub exploration_floor: Option<f64>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub initial_estimates: Option<Vec<f64>>,
    #[serde(default = "default_strict_factory")]
    pub strict_factory: bool,
}

// Default functions
fn default_arm_count() -> usize {
    10
}
fn default_try_count() -> usize {
    1000
}
fn default_distribution() -> String {
    "bernoulli".to_string()
}
fn default_gaussian_mean_upper_bound() -> f64 {
    10.0
}
fn default_gaussian_std_dev() -> f64 {
    2.0
}
fn default_epsilon() -> f64 {
    0.1
}
fn default_exploration() -> f64 {
    1.0
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_strict_factory() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arm_count: default_arm_count(),
            try_count: default_try_count(),
            distribution: default_distribution(),
            seed: None,
            gaussian_mean_upper_bound: default_gaussian_mean_upper_bound(),
            gaussian_std_dev: default_gaussian_std_dev(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            epsilon_end: None,
            exploration: default_exploration(),
            exploration_floor: None,
            learning_rate: default_learning_rate(),
            initial_estimates: None,
            strict_factory: default_strict_factory(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("BANDIT_ARENA")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("strategies.initial_estimates"),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
