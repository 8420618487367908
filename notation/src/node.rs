//! Move nodes and variations as stored in the tree arena.

use chess::PieceColor;

use crate::annotation::Annotation;
use crate::ids::{NodeId, VariationId};

/// One ply, reached from `parent` (or from the start position when `parent`
/// is `None`).
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub(crate) id: NodeId,
    pub(crate) san: String,
    pub(crate) color: PieceColor,
    pub(crate) move_number: u32,
    pub(crate) fen: String,
    pub(crate) annotation: Annotation,
    /// Variations that are alternatives to this move.
    pub(crate) variations: Vec<VariationId>,
    pub(crate) parent: Option<NodeId>,
    /// The variation whose move list contains this node.
    pub(crate) line: VariationId,
}

impl MoveNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn san(&self) -> &str {
        &self.san
    }

    pub fn color(&self) -> PieceColor {
        self.color
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// Position after this move.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Alternatives to this move, in order.
    pub fn variations(&self) -> &[VariationId] {
        &self.variations
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn line(&self) -> VariationId {
        self.line
    }
}

impl PartialEq for MoveNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MoveNode {}

/// An ordered move sequence.
#[derive(Debug, Clone)]
pub struct Variation {
    pub(crate) id: VariationId,
    pub(crate) is_main_line: bool,
    pub(crate) moves: Vec<NodeId>,
    /// The move this variation is an alternative to. `None` for the
    /// top-level main line.
    pub(crate) anchor: Option<NodeId>,
}

impl Variation {
    pub fn id(&self) -> VariationId {
        self.id
    }

    pub fn is_main_line(&self) -> bool {
        self.is_main_line
    }

    pub fn moves(&self) -> &[NodeId] {
        &self.moves
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }
}
