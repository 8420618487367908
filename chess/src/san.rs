//! Standard Algebraic Notation on top of cozy-chess move generation.
//!
//! cozy-chess encodes castling as "king captures own rook" (e1h1), so both
//! directions below special-case that encoding.

use cozy_chess::{Board, File, GameStatus, Move, Piece, Rank, Square};

use crate::converters::{
    file_index, file_to_char, format_piece_upper, format_square, parse_file, parse_piece,
    parse_rank, rank_to_char,
};

/// All legal moves in the position.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// Parse a SAN move against the given position.
///
/// Input is accepted leniently: check/mate suffixes and annotation glyphs are
/// ignored, `0-0` is read as `O-O`, the `=` before a promotion piece is
/// optional and over-specified origins (`Ng1f3`) are fine.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let body = san
        .trim()
        .trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'));
    if body.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);
    match body {
        "O-O" | "0-0" => return find_castle(board, &legal, true, san),
        "O-O-O" | "0-0-0" => return find_castle(board, &legal, false, san),
        _ => {}
    }

    let pattern =
        SanPattern::parse(body).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;
    let candidates: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|mv| pattern.matches(board, *mv))
        .collect();

    match candidates.as_slice() {
        [] => Err(SanError::NoLegalMove(san.to_string())),
        [mv] => Ok(*mv),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Format a legal move as SAN, including minimal disambiguation and a
/// trailing `+` or `#`.
pub fn format_san(board: &Board, mv: Move) -> String {
    let legal = legal_moves(board);
    let mut san = san_body(board, mv, &legal);

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won {
            '#'
        } else {
            '+'
        });
    }
    san
}

fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
}

fn find_castle(
    board: &Board,
    legal: &[Move],
    kingside: bool,
    san: &str,
) -> Result<Move, SanError> {
    legal
        .iter()
        .copied()
        .find(|mv| {
            is_castle(board, *mv) && (file_index(mv.to.file()) > file_index(mv.from.file())) == kingside
        })
        .ok_or_else(|| SanError::NoLegalMove(san.to_string()))
}

fn san_body(board: &Board, mv: Move, legal: &[Move]) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return crate::uci::format_uci_move(mv);
    };

    if is_castle(board, mv) {
        return if file_index(mv.to.file()) > file_index(mv.from.file()) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let capture = board.color_on(mv.to).is_some()
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    let mut san = String::new();
    if piece == Piece::Pawn {
        if capture {
            san.push(file_to_char(mv.from.file()));
            san.push('x');
        }
    } else {
        san.push(format_piece_upper(piece));

        let rivals: Vec<Square> = legal
            .iter()
            .filter(|other| {
                other.to == mv.to
                    && other.from != mv.from
                    && board.piece_on(other.from) == Some(piece)
                    && !is_castle(board, **other)
            })
            .map(|other| other.from)
            .collect();

        if !rivals.is_empty() {
            let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
            let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());
            if !shares_file {
                san.push(file_to_char(mv.from.file()));
            } else if !shares_rank {
                san.push(rank_to_char(mv.from.rank()));
            } else {
                san.push(file_to_char(mv.from.file()));
                san.push(rank_to_char(mv.from.rank()));
            }
        }

        if capture {
            san.push('x');
        }
    }

    san.push_str(&format_square(mv.to));
    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(format_piece_upper(promo));
    }
    san
}

/// The constraints a non-castling SAN string puts on a move.
struct SanPattern {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(body: &str) -> Option<Self> {
        let mut chars: Vec<char> = body
            .chars()
            .filter(|c| !matches!(c, 'x' | ':' | '-' | '='))
            .collect();

        let piece = match chars.first() {
            Some(&c) if matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N' | 'P') => {
                chars.remove(0);
                parse_piece(c)?
            }
            _ => Piece::Pawn,
        };

        let promotion = match chars.last() {
            Some(&c) if piece == Piece::Pawn && matches!(c, 'Q' | 'R' | 'B' | 'N') => {
                chars.pop();
                Some(parse_piece(c)?)
            }
            _ => None,
        };

        if chars.len() < 2 || chars.len() > 4 {
            return None;
        }
        let (origin, dest) = chars.split_at(chars.len() - 2);
        let to = Square::new(parse_file(dest[0])?, parse_rank(dest[1])?);

        let mut from_file = None;
        let mut from_rank = None;
        for &c in origin {
            if let Some(file) = parse_file(c) {
                if from_file.replace(file).is_some() {
                    return None;
                }
            } else if let Some(rank) = parse_rank(c) {
                if from_rank.replace(rank).is_some() {
                    return None;
                }
            } else {
                return None;
            }
        }

        Some(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        board.piece_on(mv.from) == Some(self.piece)
            && mv.to == self.to
            && !is_castle(board, mv)
            && self.from_file.map_or(true, |f| mv.from.file() == f)
            && self.from_rank.map_or(true, |r| mv.from.rank() == r)
            && mv.promotion == self.promotion
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
