//! Error types for the notation tree and the PGN reader

use chess::RulesError;
use thiserror::Error;

use crate::ids::{NodeId, VariationId};
use crate::pgn::tokenizer::Position;

pub type TreeResult<T> = Result<T, TreeError>;

/// Failures of tree mutations and navigation. A failed call leaves the tree
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Illegal move {input}: {reason}")]
    IllegalMove { input: String, reason: String },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("{0} is not part of this tree")]
    DetachedNode(NodeId),

    #[error("{0} is not part of this tree")]
    UnknownVariation(VariationId),

    #[error("The main line cannot be deleted")]
    MainLineDeletion,

    #[error("The main line cannot be promoted")]
    MainLinePromotion,

    #[error("No move selected")]
    NoMoveSelected,

    #[error("Comment index {index} out of range ({len} comments)")]
    CommentIndex { index: usize, len: usize },

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("Invalid tag name {0:?}: only letters, digits and `_` are allowed")]
    InvalidTagName(String),
}

impl From<RulesError> for TreeError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove { input, reason } => Self::IllegalMove { input, reason },
            RulesError::InvalidPosition(reason) => Self::InvalidPosition(reason),
        }
    }
}

/// Failures while reading one game of PGN text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("Malformed comment at {position}: {reason}")]
    MalformedComment { position: Position, reason: String },

    #[error("Unexpected {found} at {position}, expected {expected}")]
    UnexpectedToken {
        position: Position,
        found: String,
        expected: String,
    },

    #[error("Illegal move {san} (move {move_index}) at {position} near `{context}`: {reason}")]
    IllegalMove {
        position: Position,
        /// Zero-based index of the move among all moves of the game.
        move_index: usize,
        san: String,
        context: String,
        reason: String,
    },

    #[error("Invalid FEN tag at {position}: {reason}")]
    InvalidPosition { position: Position, reason: String },
}

impl PgnError {
    /// Where in the input the problem was found.
    pub fn position(&self) -> Position {
        match self {
            Self::MalformedComment { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::IllegalMove { position, .. }
            | Self::InvalidPosition { position, .. } => *position,
        }
    }
}

/// A [`PgnError`] tagged with the zero-based index of the game it ended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Game {game_index}: {error}")]
pub struct GameError {
    pub game_index: usize,
    #[source]
    pub error: PgnError,
}
