//! A plain nested view of a game, free of ids.
//!
//! Two trees with the same moves, variation structure and annotations have
//! equal outlines regardless of how they were built, which makes outlines the
//! tool for comparing trees and for JSON output.

use chess::PieceColor;
use serde::Serialize;

use crate::annotation::{Comment, CommentPosition, Evaluation, Nag, VisualMark};
use crate::ids::NodeId;
use crate::tree::NotationTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOutline {
    /// Tags in export order.
    pub headers: Vec<(String, String)>,
    pub start_fen: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prelude: Vec<String>,
    pub moves: Vec<OutlineMove>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineMove {
    pub san: String,
    pub color: PieceColor,
    pub move_number: u32,
    /// `before` comments first, then `after` comments, each in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    /// Sorted by glyph number.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nags: Vec<Nag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    /// Arrows first, then highlights, each in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visual_marks: Vec<VisualMark>,
    /// Alternatives to this move, each a full line.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Vec<OutlineMove>>,
}

impl NotationTree {
    pub fn outline(&self) -> GameOutline {
        let main_line = self
            .variation(self.main_line_id())
            .map(|line| line.moves().to_vec())
            .unwrap_or_default();
        GameOutline {
            headers: self
                .headers()
                .export_order()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            start_fen: self.start_fen().to_string(),
            prelude: self.prelude().to_vec(),
            moves: outline_line(self, &main_line),
        }
    }
}

fn outline_line(tree: &NotationTree, moves: &[NodeId]) -> Vec<OutlineMove> {
    moves
        .iter()
        .filter_map(|id| tree.node(*id))
        .map(|node| {
            let annotation = node.annotation();
            OutlineMove {
                san: node.san().to_string(),
                color: node.color(),
                move_number: node.move_number(),
                comments: annotation
                    .comments_at(CommentPosition::Before)
                    .chain(annotation.comments_at(CommentPosition::After))
                    .cloned()
                    .collect(),
                nags: annotation.nags.sorted(),
                evaluation: annotation.evaluation,
                visual_marks: annotation
                    .visual_marks
                    .iter()
                    .filter(|mark| matches!(mark, VisualMark::Arrow { .. }))
                    .chain(
                        annotation
                            .visual_marks
                            .iter()
                            .filter(|mark| matches!(mark, VisualMark::Highlight { .. })),
                    )
                    .copied()
                    .collect(),
                variations: node
                    .variations()
                    .iter()
                    .filter_map(|id| tree.variation(*id))
                    .map(|variation| outline_line(tree, variation.moves()))
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_ignores_ids() {
        let build = || {
            let mut tree = NotationTree::new();
            tree.add_move("d4", false).unwrap();
            tree.add_nag(Nag(16)).unwrap();
            tree.add_nag(Nag::GOOD_MOVE).unwrap();
            tree.reset();
            tree.add_move("c4", false).unwrap();
            tree.add_comment("English", CommentPosition::After).unwrap();
            tree
        };
        let a = build();
        let b = build();
        assert_eq!(a.outline(), b.outline());

        let outline = a.outline();
        assert_eq!(outline.moves.len(), 1);
        assert_eq!(outline.moves[0].nags, vec![Nag(1), Nag(16)]);
        assert_eq!(outline.moves[0].variations[0][0].san, "c4");
    }

    #[test]
    fn test_outline_json() {
        let mut tree = NotationTree::new();
        tree.add_move("e4", false).unwrap();
        let json = serde_json::to_value(tree.outline()).unwrap();
        assert_eq!(json["moves"][0]["san"], "e4");
        assert_eq!(json["moves"][0]["color"], "white");
        assert_eq!(json["moves"][0]["move_number"], 1);
        assert!(json["moves"][0].get("variations").is_none());
    }
}
