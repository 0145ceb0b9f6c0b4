use crate::roles::Role;
use crate::types::{Phase, PlayerId, Potion};

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Validation failures raised before any mutation is applied
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("cannot {action} while the game is in phase {phase:?}")]
    IllegalPhase { action: &'static str, phase: Phase },

    #[error("{0}")]
    WrongRoleOrPhase(String),

    #[error("role counts add up to {requested}, but the game has {players} players")]
    RoleCountMismatch { requested: u64, players: usize },

    #[error("at most {max} {role} allowed, got {requested}")]
    RoleLimitExceeded { role: Role, max: u32, requested: u64 },

    #[error("{0}")]
    AlreadyActed(String),

    #[error("the {0:?} potion was already used")]
    PotionAlreadyUsed(Potion),

    #[error("player {0} is not alive")]
    NotAlive(PlayerId),

    #[error("{0}")]
    InvalidAction(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl GameError {
    /// Stable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::IllegalPhase { .. } => "ILLEGAL_PHASE",
            GameError::WrongRoleOrPhase(_) => "WRONG_ROLE_OR_PHASE",
            GameError::RoleCountMismatch { .. } => "ROLE_COUNT_MISMATCH",
            GameError::RoleLimitExceeded { .. } => "ROLE_LIMIT_EXCEEDED",
            GameError::AlreadyActed(_) | GameError::PotionAlreadyUsed(_) => "ALREADY_ACTED",
            GameError::NotAlive(_) => "NOT_ALIVE",
            GameError::InvalidAction(_) => "INVALID_ACTION",
            GameError::InvariantViolation(_) => "INVARIANT_VIOLATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_potion_reuse_shares_already_acted_code() {
        assert_eq!(
            GameError::PotionAlreadyUsed(Potion::Healing).code(),
            GameError::AlreadyActed("voted".to_string()).code()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::IllegalPhase {
            action: "close joining",
            phase: Phase::Night,
        };
        assert_eq!(
            err.to_string(),
            "cannot close joining while the game is in phase Night"
        );

        let err = GameError::RoleCountMismatch {
            requested: 3,
            players: 4,
        };
        assert!(err.to_string().contains("add up to 3"));
    }
}
