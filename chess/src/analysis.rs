//! Engine evaluation scores as carried by move annotations.

use serde::{Deserialize, Serialize};

/// Engine evaluation score.
///
/// Centipawns: positive = White is better.
/// Mate: positive N = White mates in N moves,
/// negative N = Black mates in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}
