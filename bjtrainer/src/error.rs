use thiserror::Error;

use crate::simulation::GamePhase;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{action} is only allowed in {allowed} phase, current phase is {current:?}")]
    WrongPhase {
        action: &'static str,
        allowed: &'static str,
        current: GamePhase,
    },

    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("the shoe has reached its cut card and must be shuffled first")]
    ShuffleRequired,

    /// The shoe ran dry in the middle of a deal. The penetration settings
    /// should make this impossible, so the round cannot continue.
    #[error("the shoe ran out of cards")]
    ShoeExhausted,

    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
