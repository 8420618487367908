//! Branching chess game records and their PGN text format.
//!
//! A [`NotationTree`] holds a main line with nested variations, per-move
//! annotations and a navigation cursor. [`pgn`] reads and writes the tree as
//! Portable Game Notation. Move legality is delegated to a
//! [`chess::RulesEngine`].

pub mod annotation;
pub mod error;
pub mod headers;
pub mod ids;
pub mod markup;
pub mod node;
pub mod outline;
pub mod pgn;
pub mod tree;

pub use annotation::{
    Annotation, Comment, CommentPosition, Evaluation, MarkColor, Nag, NagSet, VisualMark,
};
pub use error::{GameError, PgnError, TreeError, TreeResult};
pub use headers::{GameResult, Headers};
pub use ids::{NodeId, VariationId};
pub use node::{MoveNode, Variation};
pub use outline::{GameOutline, OutlineMove};
pub use pgn::{parse_game, parse_games, write_game, write_games, Position, WriterOptions};
pub use tree::NotationTree;
