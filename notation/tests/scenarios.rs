use notation::{
    parse_game, write_game, CommentPosition, Nag, NotationTree, TreeError, WriterOptions,
};

fn sans(tree: &NotationTree) -> Vec<String> {
    tree.main_line()
        .into_iter()
        .map(|node| node.san().to_string())
        .collect()
}

fn play(tree: &mut NotationTree, moves: &[&str]) {
    for san in moves {
        tree.add_move(*san, false).unwrap();
    }
}

/// The concrete scenarios every implementation must satisfy.
mod scenario_tests {
    use super::*;

    #[test]
    fn variation_attaches_to_white_second_move() {
        let tree = parse_game("1. e4 e5 2. Nf3 (2. Bc4 Nc6) 2... Nc6 *").unwrap();
        assert_eq!(sans(&tree), vec!["e4", "e5", "Nf3", "Nc6"]);

        let nf3 = tree.main_line()[2];
        assert_eq!(nf3.variations().len(), 1);
        let variation = tree.variation(nf3.variations()[0]).unwrap();
        assert!(!variation.is_main_line());
        assert_eq!(tree.line_nodes(variation.id())[0].san(), "Bc4");
    }

    #[test]
    fn replaying_a_move_does_not_duplicate() {
        let mut tree = NotationTree::new();
        let first = tree.add_move("e4", false).unwrap();
        tree.reset();
        let second = tree.add_move("e4", false).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn add_then_remove_comment() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        tree.add_comment("Good opening", CommentPosition::After)
            .unwrap();
        tree.remove_comment(0).unwrap();
        assert!(tree.current_annotation().unwrap().comments.is_empty());
    }

    #[test]
    fn export_without_variations_reparses_as_main_line() {
        let tree = parse_game("1. e4 (1. d4 d5) 1... e5 2. Nf3 (2. f4 exf4) 2... Nc6 *").unwrap();
        let options = WriterOptions {
            include_variations: false,
            ..WriterOptions::default()
        };
        let text = write_game(&tree, &options);
        assert!(!text.contains('('));

        let reparsed = parse_game(&text).unwrap();
        assert_eq!(sans(&reparsed), sans(&tree));
        assert!(reparsed
            .main_line()
            .iter()
            .all(|node| node.variations().is_empty()));
    }

    #[test]
    fn deleting_only_variation_relocates_cursor() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4", "e5", "Nf3"]);
        tree.go_back();
        let bc4 = tree.add_move("Bc4", false).unwrap();
        let nf3 = tree.main_line()[2].id();
        let e5 = tree.main_line()[1].id();
        assert_eq!(tree.current(), Some(bc4));

        let variation = tree.node(nf3).unwrap().variations()[0];
        tree.delete_variation(variation).unwrap();

        assert!(tree.node(nf3).unwrap().variations().is_empty());
        assert_eq!(tree.current(), Some(e5));
        assert!(tree.node(bc4).is_none());
    }
}

mod navigation_tests {
    use super::*;

    #[test]
    fn go_to_current_is_a_no_op() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["d4", "d5"]);
        let before = tree.current();
        let revision = tree.revision();
        tree.go_to_node(before).unwrap();
        assert_eq!(tree.current(), before);
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn back_then_forward_returns_to_node() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4", "c5", "Nf3", "d6"]);
        tree.reset();
        tree.go_forward();
        tree.go_forward();
        let middle = tree.current();

        tree.go_back();
        tree.go_forward();
        assert_eq!(tree.current(), middle);
    }

    #[test]
    fn back_then_forward_inside_variation() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4", "e5", "Nf3"]);
        tree.reset();
        play(&mut tree, &["d4", "d5", "c4"]);
        tree.go_back();
        let d5 = tree.current();
        tree.go_back();
        tree.go_forward();
        assert_eq!(tree.current(), d5);
        assert_eq!(tree.current_node().unwrap().san(), "d5");
    }

    #[test]
    fn back_then_forward_from_first_move_of_variation() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4", "e5", "Nf3"]);
        tree.reset();
        let d4 = tree.add_move("d4", false).unwrap();
        tree.add_move("d5", false).unwrap();

        tree.go_to_node(Some(d4)).unwrap();
        assert!(tree.go_back());
        assert!(tree.is_at_start());
        assert!(tree.go_forward());
        assert_eq!(tree.current(), Some(d4));

        // Without a preceding step back, forward follows the main line.
        tree.reset();
        assert!(tree.go_forward());
        assert_eq!(tree.current_node().unwrap().san(), "e4");
    }

    #[test]
    fn back_then_forward_into_nested_variation() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4", "e5", "Nf3", "Nc6"]);
        let e5 = tree.main_line()[1].id();
        let nf3 = tree.main_line()[2].id();
        tree.go_to_node(Some(e5)).unwrap();
        let bc4 = tree.add_move("Bc4", false).unwrap();
        tree.add_move("Nf6", false).unwrap();

        tree.go_to_node(Some(bc4)).unwrap();
        tree.go_back();
        tree.go_forward();
        assert_eq!(tree.current(), Some(bc4));

        tree.go_back();
        let branch_point = tree.current();
        tree.go_to_node(branch_point).unwrap();
        tree.go_forward();
        assert_eq!(tree.current(), Some(nf3));
    }

    #[test]
    fn boundaries() {
        let mut tree = NotationTree::new();
        assert!(tree.is_at_start());
        assert!(!tree.go_back());
        play(&mut tree, &["e4"]);
        assert!(tree.is_at_end());
        assert!(!tree.go_forward());
        tree.reset();
        assert!(tree.is_at_start());
        assert!(!tree.is_at_end());
    }

    #[test]
    fn node_from_clone_source_is_detached_after_deletion() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        tree.reset();
        let d4 = tree.add_move("d4", false).unwrap();
        let snapshot = tree.clone();

        let variation = tree.node(d4).unwrap().line();
        tree.delete_variation(variation).unwrap();

        assert_eq!(
            tree.go_to_node(Some(d4)),
            Err(TreeError::DetachedNode(d4))
        );
        assert!(snapshot.node(d4).is_some());
    }

    #[test]
    fn current_fen_follows_cursor() {
        let mut tree = NotationTree::new();
        let start = tree.current_fen().to_string();
        play(&mut tree, &["e4"]);
        assert_ne!(tree.current_fen(), start);
        tree.reset();
        assert_eq!(tree.current_fen(), start);
    }
}

mod annotation_tests {
    use super::*;

    #[test]
    fn nag_added_twice_is_removed_once() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        tree.add_nag(Nag::BRILLIANT_MOVE).unwrap();
        tree.add_nag(Nag::BRILLIANT_MOVE).unwrap();
        assert_eq!(tree.current_annotation().unwrap().nags.len(), 1);

        tree.remove_nag(Nag::BRILLIANT_MOVE).unwrap();
        assert!(!tree
            .current_annotation()
            .unwrap()
            .nags
            .contains(Nag::BRILLIANT_MOVE));
    }

    #[test]
    fn symbolic_and_numeric_glyphs_are_the_same() {
        let symbolic = parse_game("1. e4!? *").unwrap();
        let numeric = parse_game("1. e4 $5 *").unwrap();
        assert_eq!(symbolic.outline(), numeric.outline());
    }

    #[test]
    fn comment_escapes_survive_export() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        tree.add_comment(r"braces {like} this and a \ slash", CommentPosition::After)
            .unwrap();
        let reparsed = parse_game(&write_game(&tree, &WriterOptions::default())).unwrap();
        assert_eq!(reparsed.outline(), tree.outline());
    }

    #[test]
    fn exported_headers_read_back() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        assert!(matches!(
            tree.set_header("White Elo", "2500"),
            Err(TreeError::InvalidTagName(_))
        ));
        tree.set_header("WhiteElo", "2500").unwrap();
        tree.set_header("Annotator", "a \"quoted\" \\ name").unwrap();

        let reparsed = parse_game(&write_game(&tree, &WriterOptions::default())).unwrap();
        assert_eq!(reparsed.headers(), tree.headers());
    }

    #[test]
    fn command_text_in_comments_stays_text() {
        let mut tree = NotationTree::new();
        play(&mut tree, &["e4"]);
        tree.add_comment("[%eval 0.30]", CommentPosition::After)
            .unwrap();
        tree.add_comment("try [%cal Ge2e4] and [%csl Rd4]", CommentPosition::Before)
            .unwrap();

        let exported = write_game(&tree, &WriterOptions::default());
        let reparsed = parse_game(&exported).unwrap();
        let e4 = reparsed.main_line()[0];
        assert_eq!(e4.annotation().evaluation, None);
        assert!(e4.annotation().visual_marks.is_empty());
        assert_eq!(reparsed.outline(), tree.outline());
    }

    #[test]
    fn command_text_in_prelude_stays_text() {
        let tree = parse_game("{[\\%eval 1.0] \\{quoted\\}} *").unwrap();
        assert_eq!(tree.prelude(), ["[%eval 1.0] {quoted}"]);

        let reparsed = parse_game(&write_game(&tree, &WriterOptions::default())).unwrap();
        assert_eq!(reparsed.prelude(), tree.prelude());
    }
}

mod mutation_tests {
    use super::*;

    #[test]
    fn promotion_is_an_involution() {
        let mut tree = parse_game("1. e4 e5 2. Nf3 (2. Bc4 Nf6 3. d3) (2. f4) 2... Nc6 3. Bb5 *")
            .unwrap();
        let original = tree.outline();
        let nf3 = tree.main_line()[2].id();
        let bc4_line = tree.node(nf3).unwrap().variations()[0];

        let demoted = tree.promote_variation(bc4_line).unwrap();
        let promoted = tree.outline();
        let main: Vec<_> = promoted.moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(main, vec!["e4", "e5", "Bc4", "Nf6", "d3"]);
        let alternatives: Vec<_> = promoted.moves[2]
            .variations
            .iter()
            .map(|line| line[0].san.as_str())
            .collect();
        assert_eq!(alternatives, vec!["Nf3", "f4"]);

        tree.promote_variation(demoted).unwrap();
        assert_eq!(tree.outline(), original);
    }

    #[test]
    fn promotion_does_not_cascade() {
        let mut tree =
            parse_game("1. e4 (1. d4 d5 (1... Nf6) 2. c4) 1... e5 *").unwrap();
        let e4 = tree.main_line()[0].id();
        let d4_line = tree.node(e4).unwrap().variations()[0];
        tree.promote_variation(d4_line).unwrap();

        let outline = tree.outline();
        let main: Vec<_> = outline.moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(main, vec!["d4", "d5", "c4"]);
        assert_eq!(outline.moves[1].variations[0][0].san, "Nf6");
    }

    #[test]
    fn clones_are_isolated() {
        let mut tree = parse_game("1. e4 e5 2. Nf3 *").unwrap();
        let snapshot = tree.clone();
        let before = snapshot.outline();

        let e5 = tree.main_line()[1].id();
        tree.go_to_node(Some(e5)).unwrap();
        tree.add_move("Bc4", false).unwrap();
        tree.add_comment("changed", CommentPosition::After).unwrap();

        assert_eq!(snapshot.outline(), before);
        assert_ne!(tree.outline(), before);
    }

    #[test]
    fn failed_mutations_leave_tree_unchanged() {
        let mut tree = parse_game("1. e4 e5 *").unwrap();
        let before = tree.outline();
        let revision = tree.revision();

        assert!(tree.add_move("Qxf7", false).is_err());
        assert_eq!(
            tree.delete_variation(tree.main_line_id()),
            Err(TreeError::MainLineDeletion)
        );
        assert_eq!(tree.outline(), before);
        assert_eq!(tree.revision(), revision);
    }
}
