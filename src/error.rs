use thiserror::Error;

/// Everything that can go wrong when a move is proposed.
///
/// Each variant carries the attempted move in coordinate notation and the
/// 1-based ply number, so a caller replaying a game can point at the exact
/// offending half-move. A failed move never changes board state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("move {mv} at ply {ply}: the game is already over")]
    GameOver { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: the source square is empty")]
    EmptySource { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: the piece does not belong to the side to move")]
    WrongTurn { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: impossible movement pattern for that piece")]
    InvalidPattern { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: the path or destination is blocked")]
    BlockedMove { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: the move would leave the own king in check")]
    MoveExposesOwnKing { mv: String, ply: u32 },

    #[error("move {mv} at ply {ply}: castling is not available ({reason})")]
    InvalidCastle {
        mv: String,
        ply: u32,
        reason: &'static str,
    },

    #[error("move {mv} at ply {ply}: invalid promotion")]
    InvalidPromotion { mv: String, ply: u32 },
}

impl MoveError {
    /// The attempted move, e.g. `e2e4` or `e7e8q`.
    pub fn attempted_move(&self) -> &str {
        match self {
            MoveError::GameOver { mv, .. }
            | MoveError::EmptySource { mv, .. }
            | MoveError::WrongTurn { mv, .. }
            | MoveError::InvalidPattern { mv, .. }
            | MoveError::BlockedMove { mv, .. }
            | MoveError::MoveExposesOwnKing { mv, .. }
            | MoveError::InvalidCastle { mv, .. }
            | MoveError::InvalidPromotion { mv, .. } => mv,
        }
    }

    /// The 1-based ply at which the move was attempted.
    pub fn ply(&self) -> u32 {
        match self {
            MoveError::GameOver { ply, .. }
            | MoveError::EmptySource { ply, .. }
            | MoveError::WrongTurn { ply, .. }
            | MoveError::InvalidPattern { ply, .. }
            | MoveError::BlockedMove { ply, .. }
            | MoveError::MoveExposesOwnKing { ply, .. }
            | MoveError::InvalidCastle { ply, .. }
            | MoveError::InvalidPromotion { ply, .. } => *ply,
        }
    }
}
