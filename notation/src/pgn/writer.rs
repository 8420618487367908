//! PGN export.

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::annotation::{CommentPosition, Nag, VisualMark};
use crate::ids::NodeId;
use crate::markup::{escape_comment, render_commands};
use crate::node::MoveNode;
use crate::tree::NotationTree;

/// What to include in exported PGN and how to lay it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    pub include_variations: bool,
    pub include_comments: bool,
    pub include_nags: bool,
    /// Write evaluations as `[%eval ...]` comment commands.
    pub include_evaluations: bool,
    /// Write arrows and highlights as `[%cal ...]` / `[%csl ...]`.
    pub include_visual_marks: bool,
    /// Prefer `!?`, `±`, ... over `$5`, `$16`, ...
    pub symbolic_nags: bool,
    /// Soft wrap width. Tokens are never split.
    pub max_line_length: Option<usize>,
    /// Start every variation on its own, indented line.
    pub indent_variations: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            include_variations: true,
            include_comments: true,
            include_nags: true,
            include_evaluations: true,
            include_visual_marks: true,
            symbolic_nags: false,
            max_line_length: Some(80),
            indent_variations: false,
        }
    }
}

enum Piece {
    Word(String),
    /// Line break; following lines are indented for `depth`.
    Break { depth: usize },
}

/// Export one game: tag pairs, a blank line, then movetext and result.
pub fn write_game(tree: &NotationTree, options: &WriterOptions) -> String {
    let mut out = String::new();
    for (name, value) in tree.headers().export_order() {
        out.push_str(&format!("[{} \"{}\"]\n", name, escape_tag_value(value)));
    }
    out.push('\n');

    let mut pieces = Vec::new();
    if options.include_comments {
        for text in tree.prelude() {
            pieces.push(Piece::Word(comment_word(text)));
        }
    }
    let main_line = tree
        .variation(tree.main_line_id())
        .map(|line| line.moves().to_vec())
        .unwrap_or_default();
    write_line(tree, &main_line, 0, options, &mut pieces);
    pieces.push(Piece::Word(tree.result().to_string()));

    out.push_str(&layout(&pieces, options));
    out.push('\n');
    out
}

/// Export several games separated by blank lines.
pub fn write_games<'a>(
    trees: impl IntoIterator<Item = &'a NotationTree>,
    options: &WriterOptions,
) -> String {
    trees
        .into_iter()
        .map(|tree| write_game(tree, options))
        .collect::<Vec<_>>()
        .join("\n")
}

impl std::fmt::Display for NotationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&write_game(self, &WriterOptions::default()))
    }
}

fn write_line(
    tree: &NotationTree,
    moves: &[NodeId],
    depth: usize,
    options: &WriterOptions,
    pieces: &mut Vec<Piece>,
) {
    let mut show_number = true;
    for node in moves.iter().filter_map(|id| tree.node(*id)) {
        let annotation = node.annotation();
        let before: Vec<&str> = if options.include_comments {
            annotation
                .comments_at(CommentPosition::Before)
                .map(|comment| comment.text.as_str())
                .collect()
        } else {
            Vec::new()
        };

        if node.color() == PieceColor::White || show_number || !before.is_empty() {
            pieces.push(Piece::Word(move_number(node)));
        }
        for text in before {
            pieces.push(Piece::Word(comment_word(text)));
        }
        write_move(node, options, pieces);
        show_number = false;

        if !options.include_variations {
            continue;
        }
        for variation in node.variations().iter().filter_map(|id| tree.variation(*id)) {
            if variation.moves().is_empty() {
                continue;
            }
            if options.indent_variations {
                pieces.push(Piece::Break { depth: depth + 1 });
            }
            let start = pieces.len();
            write_line(tree, variation.moves(), depth + 1, options, pieces);
            wrap_in_parens(&mut pieces[start..]);
            if options.indent_variations {
                pieces.push(Piece::Break { depth });
            }
            show_number = true;
        }
    }
}

fn write_move(node: &MoveNode, options: &WriterOptions, pieces: &mut Vec<Piece>) {
    let annotation = node.annotation();
    let mut san = node.san().to_string();
    let mut nags: Vec<Nag> = if options.include_nags {
        annotation.nags.iter().collect()
    } else {
        Vec::new()
    };

    if options.symbolic_nags {
        if let Some(index) = nags.iter().position(|nag| nag.is_move_assessment()) {
            let glyph = nags.remove(index);
            san.push_str(glyph.symbol().unwrap_or_default());
        }
    }
    pieces.push(Piece::Word(san));

    for nag in nags {
        let word = match nag.symbol() {
            Some(symbol) if options.symbolic_nags => symbol.to_string(),
            _ => nag.to_string(),
        };
        pieces.push(Piece::Word(word));
    }

    let evaluation = annotation
        .evaluation
        .as_ref()
        .filter(|_| options.include_evaluations);
    let marks: &[VisualMark] = if options.include_visual_marks {
        annotation.visual_marks.as_slice()
    } else {
        &[]
    };
    if let Some(commands) = render_commands(evaluation, marks) {
        pieces.push(Piece::Word(format!("{{{}}}", commands)));
    }

    if options.include_comments {
        for comment in annotation.comments_at(CommentPosition::After) {
            pieces.push(Piece::Word(comment_word(&comment.text)));
        }
    }
}

fn move_number(node: &MoveNode) -> String {
    match node.color() {
        PieceColor::White => format!("{}.", node.move_number()),
        PieceColor::Black => format!("{}...", node.move_number()),
    }
}

fn wrap_in_parens(pieces: &mut [Piece]) {
    if let Some(Piece::Word(first)) = pieces.iter_mut().find(|p| matches!(p, Piece::Word(_))) {
        first.insert(0, '(');
    }
    if let Some(Piece::Word(last)) = pieces
        .iter_mut()
        .rev()
        .find(|p| matches!(p, Piece::Word(_)))
    {
        last.push(')');
    }
}

fn comment_word(text: &str) -> String {
    format!("{{{}}}", escape_comment(text))
}

fn escape_tag_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn layout(pieces: &[Piece], options: &WriterOptions) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    let mut indent = 0;
    let mut fresh_line = true;

    for piece in pieces {
        match piece {
            Piece::Break { depth } => {
                indent = depth * 2;
                if !fresh_line {
                    out.push('\n');
                    fresh_line = true;
                }
            }
            Piece::Word(word) => {
                let width = word.chars().count();
                let overflows = options
                    .max_line_length
                    .is_some_and(|max| max > 0 && line_len + 1 + width > max);
                if !fresh_line && overflows {
                    out.push('\n');
                    fresh_line = true;
                }
                if fresh_line {
                    out.push_str(&" ".repeat(indent));
                    line_len = indent;
                    fresh_line = false;
                } else {
                    out.push(' ');
                    line_len += 1;
                }
                out.push_str(word);
                line_len += width;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Evaluation, MarkColor};
    use crate::headers::GameResult;

    fn one_line() -> WriterOptions {
        WriterOptions {
            max_line_length: None,
            ..WriterOptions::default()
        }
    }

    fn movetext(tree: &NotationTree, options: &WriterOptions) -> String {
        let text = write_game(tree, options);
        text.split("\n\n").nth(1).unwrap_or_default().trim_end().to_string()
    }

    fn sample() -> NotationTree {
        let mut tree = NotationTree::new();
        for san in ["e4", "e5", "Nf3", "Nc6"] {
            tree.add_move(san, false).unwrap();
        }
        tree.go_back();
        tree.go_back();
        tree.add_move("Bc4", false).unwrap();
        tree.add_move("Nf6", false).unwrap();
        tree
    }

    #[test]
    fn test_headers_come_first() {
        let mut tree = NotationTree::new();
        tree.set_header("ECO", "C20").unwrap();
        tree.set_header("White", "A \"quoted\" name").unwrap();
        tree.set_result(GameResult::WhiteWins);
        let text = write_game(&tree, &one_line());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[Event \"?\"]");
        assert_eq!(lines[4], "[White \"A \\\"quoted\\\" name\"]");
        assert_eq!(lines[6], "[Result \"1-0\"]");
        assert_eq!(lines[7], "[ECO \"C20\"]");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "1-0");
    }

    #[test]
    fn test_variation_and_numbers() {
        assert_eq!(
            movetext(&sample(), &one_line()),
            "1. e4 e5 2. Nf3 (2. Bc4 Nf6) 2... Nc6 *"
        );
    }

    #[test]
    fn test_without_variations() {
        let options = WriterOptions {
            include_variations: false,
            ..one_line()
        };
        assert_eq!(movetext(&sample(), &options), "1. e4 e5 2. Nf3 Nc6 *");
    }

    #[test]
    fn test_annotations() {
        let mut tree = NotationTree::new();
        tree.add_move("e4", false).unwrap();
        tree.add_nag(Nag::GOOD_MOVE).unwrap();
        tree.add_nag(Nag(16)).unwrap();
        tree.add_comment("Best by test", CommentPosition::After)
            .unwrap();
        tree.set_evaluation(Some(Evaluation::centipawns(35).with_depth(18)))
            .unwrap();
        tree.add_visual_mark(VisualMark::Arrow {
            from: "e2".parse().unwrap(),
            to: "e4".parse().unwrap(),
            color: MarkColor::Green,
        })
        .unwrap();
        tree.add_move("e5", false).unwrap();
        tree.add_comment("Symmetric {reply}", CommentPosition::Before)
            .unwrap();

        assert_eq!(
            movetext(&tree, &one_line()),
            "1. e4 $1 $16 {[%eval 0.35,18] [%cal Ge2e4]} {Best by test} \
             1... {Symmetric \\{reply\\}} e5 *"
        );

        let symbolic = WriterOptions {
            symbolic_nags: true,
            include_evaluations: false,
            include_visual_marks: false,
            include_comments: false,
            ..one_line()
        };
        assert_eq!(movetext(&tree, &symbolic), "1. e4! ± e5 *");

        let bare = WriterOptions {
            include_nags: false,
            include_evaluations: false,
            include_visual_marks: false,
            include_comments: false,
            ..one_line()
        };
        assert_eq!(movetext(&tree, &bare), "1. e4 e5 *");
    }

    #[test]
    fn test_command_text_in_comment_is_escaped() {
        let mut tree = NotationTree::new();
        tree.add_move("e4", false).unwrap();
        tree.add_comment("[%eval 0.30] [%clk 0:01:00]", CommentPosition::After)
            .unwrap();
        tree.set_evaluation(Some(Evaluation::centipawns(-10))).unwrap();

        assert_eq!(
            movetext(&tree, &one_line()),
            "1. e4 {[%eval -0.10]} {[\\%eval 0.30] [%clk 0:01:00]} *"
        );
    }

    #[test]
    fn test_soft_wrap_never_splits_tokens() {
        let mut tree = NotationTree::new();
        for san in ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7"] {
            tree.add_move(san, false).unwrap();
        }
        let options = WriterOptions {
            max_line_length: Some(12),
            ..WriterOptions::default()
        };
        let text = movetext(&tree, &options);
        for line in text.lines() {
            assert!(line.chars().count() <= 12, "line too long: {line:?}");
        }
        let rejoined = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(
            rejoined,
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 *"
        );
    }

    #[test]
    fn test_indented_variations() {
        let options = WriterOptions {
            indent_variations: true,
            ..one_line()
        };
        assert_eq!(
            movetext(&sample(), &options),
            "1. e4 e5 2. Nf3\n  (2. Bc4 Nf6)\n2... Nc6 *"
        );
    }

    #[test]
    fn test_display_uses_defaults() {
        let tree = sample();
        assert_eq!(tree.to_string(), write_game(&tree, &WriterOptions::default()));
    }

    #[test]
    fn test_write_games_separates_with_blank_line() {
        let a = NotationTree::new();
        let b = NotationTree::new();
        let text = write_games([&a, &b], &WriterOptions::default());
        assert_eq!(text.matches("[Event \"?\"]").count(), 2);
        assert!(text.contains("*\n\n[Event"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: WriterOptions =
            serde_json::from_str(r#"{"symbolic_nags": true, "max_line_length": null}"#).unwrap();
        assert!(options.symbolic_nags);
        assert!(options.include_variations);
        assert_eq!(options.max_line_length, None);
    }
}
