use thiserror::Error;

pub type ArenaResult<T> = Result<T, ArenaError>;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid arm {arm}: expected an index below {num_arms}")]
    InvalidArm { arm: usize, num_arms: usize },

    #[error("All {num_tries} tries have already been recorded")]
    ExhaustedTries { num_tries: usize },

    #[error("Step {step} has already been recorded")]
    DuplicateRecord { step: usize },

    #[error("No pending arm to select")]
    NoPendingArm,

    #[error("Operation `{0}` is not implemented for this algorithm")]
    NotImplemented(&'static str),

    #[error("Invalid reward: {0}")]
    InvalidReward(f64),

    #[error("Value {value} is out of range for {name}")]
    InvalidRange { name: &'static str, value: f64 },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Unknown strategy `{0}`")]
    UnknownStrategy(String),

    #[error("Strategy `{name}` violates the algorithm contract: {reason}")]
    ContractViolation { name: String, reason: String },

    #[error("Failed to construct strategy `{name}`: {source}")]
    ConstructionFailed {
        name: String,
        #[source]
        source: Box<ArenaError>,
    },

    #[error("Unknown reward series `{0}`")]
    UnknownSeries(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
