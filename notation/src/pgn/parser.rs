//! Recursive-descent PGN reader producing [`NotationTree`]s.
//!
//! Variations are handled with an explicit stack instead of native
//! recursion, so nesting depth is bounded by memory only.

use std::collections::VecDeque;
use std::sync::Arc;

use chess::{CozyRules, RulesEngine};
use tracing::{debug, trace, warn};

use crate::annotation::{CommentPosition, Nag};
use crate::error::{GameError, PgnError, TreeError};
use crate::ids::NodeId;
use crate::markup::{split_comment, unescape_comment};
use crate::pgn::tokenizer::{Position, Spanned, Token, Tokenizer};
use crate::tree::NotationTree;

/// Tokens kept for the context of illegal-move errors.
const CONTEXT_TOKENS: usize = 6;

/// Parse the first game in `text`.
pub fn parse_game(text: &str) -> Result<NotationTree, PgnError> {
    let mut parser = Parser::new(text);
    match parser.next_game() {
        Some(result) => result,
        None => Err(PgnError::UnexpectedToken {
            position: Position::default(),
            found: "end of input".to_string(),
            expected: "a game".to_string(),
        }),
    }
}

/// Parse every game in `text`. A failing game does not stop later ones.
pub fn parse_games(text: &str) -> Vec<Result<NotationTree, GameError>> {
    Parser::new(text).collect()
}

/// Saved state of the enclosing line while a variation is read.
struct Frame {
    last_move: Option<NodeId>,
}

/// State of the movetext reader for one game.
#[derive(Default)]
struct Movetext {
    stack: Vec<Frame>,
    last_move: Option<NodeId>,
    /// Comments waiting for the next move.
    pending: Vec<(String, Position)>,
    number_pending: bool,
    /// Set right after `(`: the next move opens a variation.
    fresh_variation: bool,
    move_index: usize,
}

pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    peeked: Option<Spanned>,
    rules: Arc<dyn RulesEngine>,
    recent: VecDeque<usize>,
    in_movetext: bool,
    game_index: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_rules(input, Arc::new(CozyRules))
    }

    pub fn with_rules(input: &'a str, rules: Arc<dyn RulesEngine>) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            peeked: None,
            rules,
            recent: VecDeque::with_capacity(CONTEXT_TOKENS),
            in_movetext: false,
            game_index: 0,
        }
    }

    fn peek(&mut self) -> Result<&Spanned, PgnError> {
        let spanned = match self.peeked.take() {
            Some(spanned) => spanned,
            None => self.tokenizer.next_token()?,
        };
        Ok(self.peeked.insert(spanned))
    }

    fn advance(&mut self) -> Result<Spanned, PgnError> {
        let spanned = match self.peeked.take() {
            Some(spanned) => spanned,
            None => self.tokenizer.next_token()?,
        };
        if self.recent.len() == CONTEXT_TOKENS {
            self.recent.pop_front();
        }
        self.recent.push_back(spanned.position.offset);
        Ok(spanned)
    }

    /// Source text of the last few tokens, whitespace collapsed.
    fn context(&self) -> String {
        let start = self.recent.front().copied().unwrap_or(0);
        let end = self.tokenizer.offset();
        self.tokenizer.input()[start..end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Read the next game, or `None` once the input is exhausted.
    pub fn next_game(&mut self) -> Option<Result<NotationTree, PgnError>> {
        self.in_movetext = false;
        self.recent.clear();
        match self.peek() {
            Ok(Spanned {
                token: Token::Eof, ..
            }) => return None,
            Ok(_) => {}
            Err(err) => {
                self.recover();
                return Some(Err(err));
            }
        }

        match self.read_game() {
            Ok(tree) => Some(Ok(tree)),
            Err(err) => {
                self.recover();
                Some(Err(err))
            }
        }
    }

    /// Skip to the start of the next game: the next tag pair after some
    /// movetext, the end of input, or just past a result token.
    fn recover(&mut self) {
        loop {
            let in_movetext = self.in_movetext;
            let token = match self.peek() {
                Ok(spanned) => spanned.token.clone(),
                Err(err) => {
                    trace!(error = %err, "Skipping bad input");
                    continue;
                }
            };
            match token {
                Token::Eof => break,
                Token::Tag { .. } if in_movetext => break,
                Token::Result(_) => {
                    self.peeked = None;
                    break;
                }
                Token::Tag { .. } => {}
                _ => self.in_movetext = true,
            }
            trace!(token = %token.describe(), "Skipping token");
            self.peeked = None;
        }
    }

    fn read_game(&mut self) -> Result<NotationTree, PgnError> {
        let mut tags = Vec::new();
        while matches!(self.peek()?.token, Token::Tag { .. }) {
            if let Spanned {
                token: Token::Tag { name, value },
                position,
            } = self.advance()?
            {
                tags.push((name, value, position));
            }
        }
        self.in_movetext = true;

        let mut tree = match tags.iter().find(|(name, _, _)| name == "FEN") {
            Some((_, fen, position)) => {
                NotationTree::from_fen_with_rules(fen, Arc::clone(&self.rules)).map_err(|err| {
                    PgnError::InvalidPosition {
                        position: *position,
                        reason: err.to_string(),
                    }
                })?
            }
            None => NotationTree::with_rules(Arc::clone(&self.rules)),
        };
        for (name, value, position) in tags {
            tree.set_header(name, value)
                .map_err(|err| tree_error(err, position))?;
        }

        self.read_movetext(&mut tree)?;
        tree.reset();
        debug!(
            game = self.game_index,
            moves = tree.node_count(),
            "Parsed game"
        );
        Ok(tree)
    }

    fn read_movetext(&mut self, tree: &mut NotationTree) -> Result<(), PgnError> {
        let mut state = Movetext::default();

        loop {
            let spanned = self.peek()?.clone();
            let position = spanned.position;
            match spanned.token {
                Token::Tag { .. } | Token::Eof => {
                    if !state.stack.is_empty() {
                        return Err(unexpected(&spanned, "`)`"));
                    }
                    break;
                }
                Token::Result(result) => {
                    if !state.stack.is_empty() {
                        return Err(unexpected(&spanned, "`)`"));
                    }
                    self.advance()?;
                    tree.set_result(result);
                    break;
                }
                _ => {
                    self.advance()?;
                }
            }

            match spanned.token {
                Token::MoveNumber { .. } => state.number_pending = true,
                Token::San(ref san) => self.read_move(tree, &mut state, san, position)?,
                Token::NagSymbolic(ref symbol) => {
                    let nag = Nag::from_symbol(symbol)
                        .ok_or_else(|| unexpected(&spanned, "a known glyph"))?;
                    annotate_nag(tree, &state, nag, &spanned)?;
                }
                Token::NagNumeric(n) => annotate_nag(tree, &state, Nag(n), &spanned)?,
                Token::Comment(text) => {
                    if state.last_move.is_none() || state.number_pending {
                        state.pending.push((text, position));
                    } else {
                        attach_comment(tree, &text, CommentPosition::After, position)?;
                    }
                }
                Token::VariationOpen => {
                    let last_move = match state.last_move {
                        Some(id) if !state.number_pending => id,
                        _ => return Err(unexpected(&spanned, "a move before `(`")),
                    };
                    let branch_point = tree.node(last_move).and_then(|node| node.parent());
                    tree.go_to_node(branch_point)
                        .map_err(|err| tree_error(err, position))?;
                    state.stack.push(Frame {
                        last_move: state.last_move,
                    });
                    state.last_move = None;
                    state.fresh_variation = true;
                }
                Token::VariationClose => {
                    let frame = state
                        .stack
                        .pop()
                        .ok_or_else(|| unexpected(&spanned, "a move or a result"))?;
                    self.flush_pending(tree, &mut state)?;
                    tree.go_to_node(frame.last_move)
                        .map_err(|err| tree_error(err, position))?;
                    state.last_move = frame.last_move;
                    state.fresh_variation = false;
                    state.number_pending = false;
                }
                Token::Tag { .. } | Token::Result(_) | Token::Eof => {}
            }
        }

        self.flush_pending(tree, &mut state)
    }

    fn read_move(
        &mut self,
        tree: &mut NotationTree,
        state: &mut Movetext,
        san: &str,
        position: Position,
    ) -> Result<(), PgnError> {
        let id = tree
            .add_move(san, state.fresh_variation)
            .map_err(|err| PgnError::IllegalMove {
                position,
                move_index: state.move_index,
                san: san.to_string(),
                context: self.context(),
                reason: match err {
                    TreeError::IllegalMove { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;

        state.move_index += 1;
        state.last_move = Some(id);
        state.fresh_variation = false;
        state.number_pending = false;
        for (text, comment_position) in std::mem::take(&mut state.pending) {
            attach_comment(tree, &text, CommentPosition::Before, comment_position)?;
        }
        Ok(())
    }

    /// Comments left at the end of a line belong to its last move, or to
    /// the game prelude if the game has no moves at all.
    fn flush_pending(
        &mut self,
        tree: &mut NotationTree,
        state: &mut Movetext,
    ) -> Result<(), PgnError> {
        let pending = std::mem::take(&mut state.pending);
        match state.last_move {
            Some(_) => {
                for (text, position) in pending {
                    attach_comment(tree, &text, CommentPosition::After, position)?;
                }
            }
            None if tree.is_empty() => {
                for (raw, _) in pending {
                    let text = unescape_comment(&raw);
                    let text = text.trim();
                    if !text.is_empty() {
                        tree.push_prelude(text.to_string());
                    }
                }
            }
            None => {
                trace!(count = pending.len(), "Dropping comments of an empty variation")
            }
        }
        Ok(())
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<NotationTree, GameError>;

    fn next(&mut self) -> Option<Self::Item> {
        let game_index = self.game_index;
        let result = self.next_game()?;
        self.game_index += 1;
        Some(result.map_err(|error| {
            warn!(game = game_index, error = %error, "Skipping game");
            GameError { game_index, error }
        }))
    }
}

fn unexpected(spanned: &Spanned, expected: &str) -> PgnError {
    PgnError::UnexpectedToken {
        position: spanned.position,
        found: spanned.token.describe(),
        expected: expected.to_string(),
    }
}

fn tree_error(err: TreeError, position: Position) -> PgnError {
    PgnError::UnexpectedToken {
        position,
        found: err.to_string(),
        expected: "a consistent move tree".to_string(),
    }
}

fn annotate_nag(
    tree: &mut NotationTree,
    state: &Movetext,
    nag: Nag,
    spanned: &Spanned,
) -> Result<(), PgnError> {
    if state.last_move.is_none() {
        return Err(unexpected(spanned, "a move before the glyph"));
    }
    tree.add_nag(nag)
        .map(|_| ())
        .map_err(|err| tree_error(err, spanned.position))
}

/// Attach a comment to the current move, pulling out embedded commands.
fn attach_comment(
    tree: &mut NotationTree,
    raw: &str,
    placement: CommentPosition,
    position: Position,
) -> Result<(), PgnError> {
    let markup = split_comment(raw);
    let malformed = |err: TreeError| PgnError::MalformedComment {
        position,
        reason: err.to_string(),
    };

    if let Some(evaluation) = markup.evaluation {
        tree.set_evaluation(Some(evaluation)).map_err(malformed)?;
    }
    for mark in markup.marks {
        tree.add_visual_mark(mark).map_err(malformed)?;
    }
    if !markup.text.is_empty() {
        tree.add_comment(&markup.text, placement).map_err(malformed)?;
    }
    Ok(())
}
