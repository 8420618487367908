//! The rules-engine seam used by the notation tree.
//!
//! The tree never interprets chess itself: it hands a position and a move
//! request to a [`RulesEngine`] and stores whatever SAN and FEN come back.

use cozy_chess::Board;
use serde::{Deserialize, Serialize};

use crate::fen::{format_fen, parse_fen, START_FEN};
use crate::san::{format_san, parse_san};
use crate::types::{BoardSquare, PieceColor, PieceKind};
use crate::uci::{format_uci_move, resolve_coordinates};

/// A move as requested by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveInput {
    San(String),
    Coordinates {
        from: BoardSquare,
        to: BoardSquare,
        promotion: Option<PieceKind>,
    },
}

/// The outcome of a validated move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// Canonical SAN including check or mate suffix.
    pub san: String,
    /// Position after the move.
    pub fen: String,
    /// Side that made the move.
    pub color: PieceColor,
    /// Full-move number of the position the move was played from.
    pub move_number: u32,
}

/// Move validation and position computation.
///
/// Implementations must be pure: the same `(fen, input)` always yields the
/// same result.
pub trait RulesEngine: std::fmt::Debug + Send + Sync {
    /// FEN of the position a fresh game starts from.
    fn start_position(&self) -> String {
        START_FEN.to_string()
    }

    /// Check a FEN and return its normalized form.
    fn validate_position(&self, fen: &str) -> Result<String, RulesError>;

    /// Validate `input` in `fen` and compute the resulting position.
    fn play(&self, fen: &str, input: &MoveInput) -> Result<PlayedMove, RulesError>;
}

/// Standard chess rules backed by cozy-chess.
#[derive(Debug, Clone, Copy, Default)]
pub struct CozyRules;

impl RulesEngine for CozyRules {
    fn validate_position(&self, fen: &str) -> Result<String, RulesError> {
        let board = parse_fen(fen).map_err(|e| RulesError::InvalidPosition(e.to_string()))?;
        Ok(format_fen(&board))
    }

    fn play(&self, fen: &str, input: &MoveInput) -> Result<PlayedMove, RulesError> {
        let board: Board =
            parse_fen(fen).map_err(|e| RulesError::InvalidPosition(e.to_string()))?;

        let mv = match input {
            MoveInput::San(san) => parse_san(&board, san).map_err(|e| RulesError::IllegalMove {
                input: input.to_string(),
                reason: e.to_string(),
            })?,
            MoveInput::Coordinates {
                from,
                to,
                promotion,
            } => resolve_coordinates(
                &board,
                (*from).into(),
                (*to).into(),
                promotion.map(Into::into),
            )
            .ok_or_else(|| RulesError::IllegalMove {
                input: input.to_string(),
                reason: "not a legal move in this position".to_string(),
            })?,
        };

        let san = format_san(&board, mv);
        let mut after = board.clone();
        after.play_unchecked(mv);

        Ok(PlayedMove {
            san,
            fen: format_fen(&after),
            color: board.side_to_move().into(),
            move_number: u32::from(board.fullmove_number()),
        })
    }
}

impl From<&str> for MoveInput {
    fn from(san: &str) -> Self {
        Self::San(san.to_string())
    }
}

impl From<String> for MoveInput {
    fn from(san: String) -> Self {
        Self::San(san)
    }
}

impl std::fmt::Display for MoveInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::San(san) => write!(f, "{}", san),
            Self::Coordinates {
                from,
                to,
                promotion,
            } => f.write_str(&format_uci_move(cozy_chess::Move {
                from: (*from).into(),
                to: (*to).into(),
                promotion: promotion.map(Into::into),
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    #[error("Illegal move {input}: {reason}")]
    IllegalMove { input: String, reason: String },
}
