//! Error types for SGF game-info extraction

/// Errors raised while deriving a [`crate::GameInfo`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameInfoError {
    /// PB/PW からも指定からも victim 側の色が決まらなかった
    #[error("game doesn't have victim: path={path}, line_number={line_number}")]
    MissingVictim { path: String, line_number: usize },

    /// `b` / `w` 以外の色指定
    #[error("invalid color: {0:?} (expected \"b\" or \"w\")")]
    InvalidColor(String),
}

/// Result type for game-info extraction
pub type GameInfoResult<T> = Result<T, GameInfoError>;
