//! PGN text format: tokenizer, parser and writer.

pub mod parser;
pub mod tokenizer;
pub mod writer;

pub use parser::{parse_game, parse_games, Parser};
pub use tokenizer::{Position, Spanned, Token, Tokenizer};
pub use writer::{write_game, write_games, WriterOptions};
