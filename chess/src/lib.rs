//! Rules-engine adapter for the notation core.
//!
//! Everything that needs actual chess knowledge (legality, SAN, FEN) lives
//! here, on top of `cozy-chess`. The notation crate only talks to the
//! [`RulesEngine`] trait and the project-owned types re-exported below.

pub mod analysis;
pub mod converters;
pub mod fen;
pub mod rules;
pub mod san;
pub mod types;
pub mod uci;

pub use analysis::Score;
pub use converters::*;
pub use fen::{format_fen, parse_fen, FenError, START_FEN};
pub use rules::{CozyRules, MoveInput, PlayedMove, RulesEngine, RulesError};
pub use san::{format_san, parse_san, SanError};
pub use types::{BoardSquare, PieceColor, PieceKind};
pub use uci::{convert_uci_castling_to_cozy, format_uci_move};
