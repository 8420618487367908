//! The notation tree: an arena of move nodes with a navigation cursor.
//!
//! The arena sits behind an `Arc` and every node behind its own `Arc`.
//! Mutations go through `Arc::make_mut`, so cloning a tree is cheap and a
//! clone never observes changes made to the original (or the other way
//! round). Nodes that were not touched stay shared between the two.
//!
//! Variations are attached to the move they replace (the *anchor*). The
//! branch point of a variation is therefore the anchor's parent, and the
//! sibling group at a branch point is the line containing the anchor plus
//! the anchor's attached variations.

use std::collections::HashMap;
use std::sync::Arc;

use chess::{CozyRules, MoveInput, RulesEngine};
use tracing::debug;

use crate::annotation::{Annotation, Comment, CommentPosition, Evaluation, Nag, VisualMark};
use crate::error::{TreeError, TreeResult};
use crate::headers::{is_valid_tag_name, GameResult, Headers};
use crate::ids::{NodeId, VariationId};
use crate::node::{MoveNode, Variation};

#[derive(Debug, Clone, Default)]
struct Arena {
    nodes: HashMap<NodeId, Arc<MoveNode>>,
    variations: HashMap<VariationId, Arc<Variation>>,
}

/// A game record: headers, a main line with nested variations, and a cursor.
#[derive(Debug, Clone)]
pub struct NotationTree {
    arena: Arc<Arena>,
    main_line: VariationId,
    current: Option<NodeId>,
    /// The node `go_back` last left, so `go_forward` can return into a
    /// variation instead of the line it branches from.
    forward_hint: Option<NodeId>,
    headers: Headers,
    start_fen: String,
    prelude: Vec<String>,
    rules: Arc<dyn RulesEngine>,
    revision: u64,
}

impl Default for NotationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NotationTree {
    /// An empty game from the standard start position.
    pub fn new() -> Self {
        Self::with_rules(Arc::new(CozyRules))
    }

    /// An empty game validated by `rules`.
    pub fn with_rules(rules: Arc<dyn RulesEngine>) -> Self {
        let start_fen = rules.start_position();
        Self::build(rules, start_fen)
    }

    /// An empty game from a custom position. Sets the `FEN` and `SetUp`
    /// tags unless the position is the engine's start position.
    pub fn from_fen(fen: &str) -> TreeResult<Self> {
        Self::from_fen_with_rules(fen, Arc::new(CozyRules))
    }

    pub fn from_fen_with_rules(fen: &str, rules: Arc<dyn RulesEngine>) -> TreeResult<Self> {
        let start_fen = rules.validate_position(fen)?;
        let is_standard = start_fen == rules.start_position();
        let mut tree = Self::build(rules, start_fen);
        if !is_standard {
            tree.headers.set("SetUp", "1");
            tree.headers.set("FEN", tree.start_fen.clone());
        }
        Ok(tree)
    }

    fn build(rules: Arc<dyn RulesEngine>, start_fen: String) -> Self {
        let main = Variation {
            id: VariationId::next(),
            is_main_line: true,
            moves: Vec::new(),
            anchor: None,
        };
        let main_line = main.id;
        let mut arena = Arena::default();
        arena.variations.insert(main_line, Arc::new(main));

        Self {
            arena: Arc::new(arena),
            main_line,
            current: None,
            forward_hint: None,
            headers: Headers::default(),
            start_fen,
            prelude: Vec::new(),
            rules,
            revision: 0,
        }
    }

    // ---- read access ----

    pub fn node(&self, id: NodeId) -> Option<&MoveNode> {
        self.arena.nodes.get(&id).map(Arc::as_ref)
    }

    pub fn variation(&self, id: VariationId) -> Option<&Variation> {
        self.arena.variations.get(&id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.nodes.contains_key(&id)
    }

    /// The cursor. `None` is the start position.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn current_node(&self) -> Option<&MoveNode> {
        self.current.and_then(|id| self.node(id))
    }

    pub fn main_line_id(&self) -> VariationId {
        self.main_line
    }

    /// The top-level main line, without variations.
    pub fn main_line(&self) -> Vec<&MoveNode> {
        self.line_nodes(self.main_line)
    }

    /// The moves of one variation, in order.
    pub fn line_nodes(&self, id: VariationId) -> Vec<&MoveNode> {
        self.variation(id)
            .map(|variation| {
                variation
                    .moves
                    .iter()
                    .filter_map(|node| self.node(*node))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// Position at the cursor.
    pub fn current_fen(&self) -> &str {
        self.fen_at(self.current)
    }

    fn fen_at(&self, position: Option<NodeId>) -> &str {
        position
            .and_then(|id| self.node(id))
            .map(|node| node.fen.as_str())
            .unwrap_or(&self.start_fen)
    }

    /// The move played next from `position` along the line it belongs to.
    /// From the start position this is the first main-line move.
    pub fn continuation(&self, position: Option<NodeId>) -> Option<NodeId> {
        match position {
            None => self.variation(self.main_line)?.moves.first().copied(),
            Some(id) => {
                let node = self.node(id)?;
                let line = self.variation(node.line)?;
                if line.moves.last() == Some(&id) {
                    return None;
                }
                let index = line.moves.iter().position(|m| *m == id)?;
                line.moves.get(index + 1).copied()
            }
        }
    }

    /// Variations branching from `position`, i.e. the alternatives to its
    /// continuation.
    pub fn variations_at(&self, position: Option<NodeId>) -> &[VariationId] {
        self.continuation(position)
            .and_then(|id| self.node(id))
            .map(|node| node.variations.as_slice())
            .unwrap_or(&[])
    }

    /// Moves from the start position to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            let node = self.node(node_id).ok_or(TreeError::DetachedNode(node_id))?;
            path.push(node_id);
            cursor = node.parent;
        }
        path.reverse();
        Ok(path)
    }

    pub fn node_count(&self) -> usize {
        self.arena.nodes.len()
    }

    pub fn variation_count(&self) -> usize {
        self.arena.variations.len()
    }

    /// True if no move has been played.
    pub fn is_empty(&self) -> bool {
        self.arena.nodes.is_empty()
    }

    /// Bumped by every successful change, cursor moves included.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn rules(&self) -> &Arc<dyn RulesEngine> {
        &self.rules
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn set_current(&mut self, target: Option<NodeId>) {
        self.current = target;
        self.forward_hint = None;
    }

    fn arena_mut(&mut self) -> &mut Arena {
        Arc::make_mut(&mut self.arena)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut MoveNode> {
        self.arena_mut().nodes.get_mut(&id).map(Arc::make_mut)
    }

    fn variation_mut(&mut self, id: VariationId) -> Option<&mut Variation> {
        self.arena_mut().variations.get_mut(&id).map(Arc::make_mut)
    }

    // ---- headers ----

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Set a tag. Names outside `[A-Za-z0-9_]+` are rejected since they
    /// could not be read back.
    pub fn set_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> TreeResult<()> {
        let name = name.into();
        if !is_valid_tag_name(&name) {
            return Err(TreeError::InvalidTagName(name));
        }
        self.headers.set(name, value);
        self.touch();
        Ok(())
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let removed = self.headers.remove(name);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// The `Result` tag, `*` when missing or unrecognized.
    pub fn result(&self) -> GameResult {
        self.headers
            .get("Result")
            .and_then(GameResult::from_token)
            .unwrap_or_default()
    }

    pub fn set_result(&mut self, result: GameResult) {
        self.headers.set("Result", result.as_str());
        self.touch();
    }

    /// Comments of a game that has no moves.
    pub fn prelude(&self) -> &[String] {
        &self.prelude
    }

    pub(crate) fn push_prelude(&mut self, text: String) {
        self.prelude.push(text);
        self.touch();
    }

    // ---- navigation ----

    /// Move the cursor. `None` is the start position.
    pub fn go_to_node(&mut self, target: Option<NodeId>) -> TreeResult<()> {
        if let Some(id) = target {
            if !self.contains(id) {
                return Err(TreeError::DetachedNode(id));
            }
        }
        self.forward_hint = None;
        if self.current != target {
            self.current = target;
            self.touch();
        }
        Ok(())
    }

    /// One ply towards the start. Returns false at the start position.
    pub fn go_back(&mut self) -> bool {
        let Some(parent) = self.current_node().map(|node| node.parent) else {
            return false;
        };
        self.forward_hint = self.current;
        self.current = parent;
        self.touch();
        true
    }

    /// One ply forward. Right after `go_back` this returns to the node just
    /// left, even if it starts a variation; otherwise it follows the
    /// current line. Returns false at the end of the line.
    pub fn go_forward(&mut self) -> bool {
        let hinted = self
            .forward_hint
            .filter(|hint| self.node(*hint).is_some_and(|node| node.parent == self.current));
        match hinted.or_else(|| self.continuation(self.current)) {
            Some(next) => {
                self.set_current(Some(next));
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn is_at_start(&self) -> bool {
        self.current.is_none()
    }

    pub fn is_at_end(&self) -> bool {
        self.continuation(self.current).is_none()
    }

    pub fn reset(&mut self) {
        self.forward_hint = None;
        if self.current.is_some() {
            self.current = None;
            self.touch();
        }
    }

    // ---- moves ----

    /// Play a move from the cursor and move the cursor onto it.
    ///
    /// Unless `as_new_variation` is set, an existing continuation or
    /// variation starting with the same move is reused. Otherwise the move
    /// extends the current line if it has no continuation yet, or opens a
    /// new variation next to the continuation.
    pub fn add_move(
        &mut self,
        input: impl Into<MoveInput>,
        as_new_variation: bool,
    ) -> TreeResult<NodeId> {
        let input = input.into();
        let played = self.rules.play(self.current_fen(), &input)?;
        let continuation = self.continuation(self.current);

        if !as_new_variation {
            if let Some(existing) = self.matching_move(continuation, &played.san) {
                self.set_current(Some(existing));
                self.touch();
                return Ok(existing);
            }
        }

        let id = NodeId::next();
        let line = match continuation {
            Some(anchor) => {
                let variation = Variation {
                    id: VariationId::next(),
                    is_main_line: false,
                    moves: Vec::new(),
                    anchor: Some(anchor),
                };
                let variation_id = variation.id;
                self.arena_mut()
                    .variations
                    .insert(variation_id, Arc::new(variation));
                if let Some(anchor_node) = self.node_mut(anchor) {
                    anchor_node.variations.push(variation_id);
                }
                variation_id
            }
            None => self
                .current_node()
                .map(|node| node.line)
                .unwrap_or(self.main_line),
        };

        let node = MoveNode {
            id,
            san: played.san,
            color: played.color,
            move_number: played.move_number,
            fen: played.fen,
            annotation: Annotation::default(),
            variations: Vec::new(),
            parent: self.current,
            line,
        };
        debug!(node = %id, san = %node.san, line = %line, "Added move");
        self.arena_mut().nodes.insert(id, Arc::new(node));
        if let Some(variation) = self.variation_mut(line) {
            variation.moves.push(id);
        }

        self.set_current(Some(id));
        self.touch();
        Ok(id)
    }

    fn matching_move(&self, continuation: Option<NodeId>, san: &str) -> Option<NodeId> {
        let next = self.node(continuation?)?;
        if next.san == san {
            return Some(next.id);
        }
        next.variations
            .iter()
            .filter_map(|id| self.variation(*id))
            .filter_map(|variation| variation.moves.first())
            .find(|first| self.node(**first).is_some_and(|node| node.san == san))
            .copied()
    }

    /// Remove a variation and everything nested in it.
    ///
    /// If the cursor was inside, it moves to the variation's branch point.
    pub fn delete_variation(&mut self, id: VariationId) -> TreeResult<()> {
        let variation = self.variation(id).ok_or(TreeError::UnknownVariation(id))?;
        let anchor = variation.anchor.ok_or(TreeError::MainLineDeletion)?;
        let branch_point = self.node(anchor).and_then(|node| node.parent);

        let mut doomed_nodes = Vec::new();
        let mut doomed_variations = vec![id];
        let mut pending = vec![id];
        while let Some(variation_id) = pending.pop() {
            let Some(variation) = self.variation(variation_id) else {
                continue;
            };
            for node_id in &variation.moves {
                doomed_nodes.push(*node_id);
                if let Some(node) = self.node(*node_id) {
                    doomed_variations.extend(node.variations.iter().copied());
                    pending.extend(node.variations.iter().copied());
                }
            }
        }

        let cursor_inside = self
            .current
            .is_some_and(|current| doomed_nodes.contains(&current));

        let arena = self.arena_mut();
        for node_id in &doomed_nodes {
            arena.nodes.remove(node_id);
        }
        for variation_id in &doomed_variations {
            arena.variations.remove(variation_id);
        }
        if let Some(anchor_node) = self.node_mut(anchor) {
            anchor_node.variations.retain(|v| *v != id);
        }
        if cursor_inside {
            self.set_current(branch_point);
        }

        debug!(
            variation = %id,
            nodes = doomed_nodes.len(),
            variations = doomed_variations.len(),
            "Deleted variation"
        );
        self.touch();
        Ok(())
    }

    /// Swap a variation with the line it branches from, at that branch
    /// point only.
    ///
    /// The displaced moves become a new variation whose id is returned;
    /// promoting that id restores the previous arrangement. Node ids and the
    /// cursor are unaffected.
    pub fn promote_variation(&mut self, id: VariationId) -> TreeResult<VariationId> {
        let promoted = self.variation(id).ok_or(TreeError::UnknownVariation(id))?;
        let anchor = promoted.anchor.ok_or(TreeError::MainLinePromotion)?;
        let promoted_moves = promoted.moves.clone();
        let new_anchor = *promoted_moves
            .first()
            .ok_or(TreeError::UnknownVariation(id))?;

        let anchor_node = self.node(anchor).ok_or(TreeError::DetachedNode(anchor))?;
        let containing = anchor_node.line;
        let group = anchor_node.variations.clone();
        let line = self
            .variation(containing)
            .ok_or(TreeError::UnknownVariation(containing))?;
        let index = line
            .moves
            .iter()
            .position(|m| *m == anchor)
            .ok_or(TreeError::DetachedNode(anchor))?;
        let displaced = line.moves[index..].to_vec();

        let demoted_id = VariationId::next();
        let new_group: Vec<VariationId> = group
            .iter()
            .map(|v| if *v == id { demoted_id } else { *v })
            .collect();

        if let Some(line) = self.variation_mut(containing) {
            line.moves.truncate(index);
            line.moves.extend(promoted_moves.iter().copied());
        }
        let demoted = Variation {
            id: demoted_id,
            is_main_line: false,
            moves: displaced.clone(),
            anchor: Some(new_anchor),
        };
        let arena = self.arena_mut();
        arena.variations.remove(&id);
        arena.variations.insert(demoted_id, Arc::new(demoted));

        if let Some(node) = self.node_mut(anchor) {
            node.variations.clear();
        }
        if let Some(node) = self.node_mut(new_anchor) {
            node.variations = new_group.clone();
        }
        for sibling in new_group.iter().filter(|v| **v != demoted_id) {
            if let Some(variation) = self.variation_mut(*sibling) {
                variation.anchor = Some(new_anchor);
            }
        }
        for node_id in &promoted_moves {
            if let Some(node) = self.node_mut(*node_id) {
                node.line = containing;
            }
        }
        for node_id in &displaced {
            if let Some(node) = self.node_mut(*node_id) {
                node.line = demoted_id;
            }
        }

        debug!(promoted = %id, demoted = %demoted_id, "Promoted variation");
        self.touch();
        Ok(demoted_id)
    }

    // ---- annotations on the current move ----

    fn current_mut(&mut self) -> TreeResult<&mut MoveNode> {
        let id = self.current.ok_or(TreeError::NoMoveSelected)?;
        self.node_mut(id).ok_or(TreeError::DetachedNode(id))
    }

    /// Annotation of the current move, `None` at the start position.
    pub fn current_annotation(&self) -> Option<&Annotation> {
        self.current_node().map(|node| &node.annotation)
    }

    /// Append a comment to the current move and return its index.
    pub fn add_comment(&mut self, text: &str, position: CommentPosition) -> TreeResult<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TreeError::EmptyComment);
        }
        let node = self.current_mut()?;
        node.annotation.comments.push(Comment {
            text: text.to_string(),
            position,
        });
        let index = node.annotation.comments.len() - 1;
        self.touch();
        Ok(index)
    }

    pub fn update_comment(&mut self, index: usize, text: &str) -> TreeResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TreeError::EmptyComment);
        }
        self.check_comment_index(index)?;
        let node = self.current_mut()?;
        if let Some(comment) = node.annotation.comments.get_mut(index) {
            comment.text = text.to_string();
        }
        self.touch();
        Ok(())
    }

    /// Remove a comment. Later comments shift down by one.
    pub fn remove_comment(&mut self, index: usize) -> TreeResult<Comment> {
        self.check_comment_index(index)?;
        let removed = self.current_mut()?.annotation.comments.remove(index);
        self.touch();
        Ok(removed)
    }

    fn check_comment_index(&self, index: usize) -> TreeResult<()> {
        let annotation = self
            .current_annotation()
            .ok_or(TreeError::NoMoveSelected)?;
        let len = annotation.comments.len();
        if index >= len {
            return Err(TreeError::CommentIndex { index, len });
        }
        Ok(())
    }

    /// Returns false if the glyph was already present.
    pub fn add_nag(&mut self, nag: Nag) -> TreeResult<bool> {
        let present = self
            .current_annotation()
            .ok_or(TreeError::NoMoveSelected)?
            .nags
            .contains(nag);
        if present {
            return Ok(false);
        }
        self.current_mut()?.annotation.nags.insert(nag);
        self.touch();
        Ok(true)
    }

    /// Returns false if the glyph was absent.
    pub fn remove_nag(&mut self, nag: Nag) -> TreeResult<bool> {
        let present = self
            .current_annotation()
            .ok_or(TreeError::NoMoveSelected)?
            .nags
            .contains(nag);
        if !present {
            return Ok(false);
        }
        self.current_mut()?.annotation.nags.remove(nag);
        self.touch();
        Ok(true)
    }

    pub fn set_evaluation(&mut self, evaluation: Option<Evaluation>) -> TreeResult<()> {
        self.current_mut()?.annotation.evaluation = evaluation;
        self.touch();
        Ok(())
    }

    pub fn add_visual_mark(&mut self, mark: VisualMark) -> TreeResult<()> {
        self.current_mut()?.annotation.visual_marks.push(mark);
        self.touch();
        Ok(())
    }

    pub fn clear_visual_marks(&mut self) -> TreeResult<()> {
        self.current_mut()?.annotation.visual_marks.clear();
        self.touch();
        Ok(())
    }
}
