//! Move annotations: comments, glyphs, evaluations and board markup.

use chess::{BoardSquare, Score};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Numeric Annotation Glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nag(pub u8);

/// Glyphs with a conventional symbol. `$n` and the symbol are the same NAG.
const SYMBOLS: &[(u8, &str)] = &[
    (1, "!"),
    (2, "?"),
    (3, "!!"),
    (4, "??"),
    (5, "!?"),
    (6, "?!"),
    (7, "□"),
    (10, "="),
    (13, "∞"),
    (14, "⩲"),
    (15, "⩱"),
    (16, "±"),
    (17, "∓"),
    (18, "+-"),
    (19, "-+"),
    (22, "⨀"),
    (32, "⟳"),
    (36, "→"),
    (40, "↑"),
    (132, "⇆"),
    (140, "∆"),
];

/// ASCII spellings accepted on input only.
const ALIASES: &[(u8, &str)] = &[(14, "+/="), (15, "=/+"), (16, "+/-"), (17, "-/+")];

impl Nag {
    pub const GOOD_MOVE: Self = Self(1);
    pub const MISTAKE: Self = Self(2);
    pub const BRILLIANT_MOVE: Self = Self(3);
    pub const BLUNDER: Self = Self(4);
    pub const SPECULATIVE_MOVE: Self = Self(5);
    pub const DUBIOUS_MOVE: Self = Self(6);

    /// Look up a symbolic glyph (`"!?"`, `"±"`, `"+/-"`, ...).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::symbol_table()
            .find(|(text, _)| *text == symbol)
            .map(|(_, nag)| nag)
    }

    /// The preferred symbol for this glyph, if it has one.
    pub fn symbol(self) -> Option<&'static str> {
        SYMBOLS
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, text)| *text)
    }

    /// `$1`..`$6`, the glyphs conventionally written right after the move.
    pub fn is_move_assessment(self) -> bool {
        (1..=6).contains(&self.0)
    }

    /// Every accepted symbolic spelling, preferred symbols first.
    pub(crate) fn symbol_table() -> impl Iterator<Item = (&'static str, Nag)> {
        SYMBOLS
            .iter()
            .chain(ALIASES.iter())
            .map(|(code, text)| (*text, Nag(*code)))
    }
}

impl std::fmt::Display for Nag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Insertion-ordered set of glyphs. Equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Nag>", into = "Vec<Nag>")]
pub struct NagSet(SmallVec<[Nag; 2]>);

impl NagSet {
    /// Returns false if the glyph was already present.
    pub fn insert(&mut self, nag: Nag) -> bool {
        if self.contains(nag) {
            return false;
        }
        self.0.push(nag);
        true
    }

    /// Returns false if the glyph was absent.
    pub fn remove(&mut self, nag: Nag) -> bool {
        let before = self.0.len();
        self.0.retain(|n| *n != nag);
        self.0.len() != before
    }

    pub fn contains(&self, nag: Nag) -> bool {
        self.0.contains(&nag)
    }

    pub fn iter(&self) -> impl Iterator<Item = Nag> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Glyphs in ascending numeric order.
    pub fn sorted(&self) -> Vec<Nag> {
        let mut nags = self.0.to_vec();
        nags.sort();
        nags
    }
}

impl PartialEq for NagSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|nag| other.contains(nag))
    }
}

impl Eq for NagSet {}

impl From<Vec<Nag>> for NagSet {
    fn from(nags: Vec<Nag>) -> Self {
        let mut set = NagSet::default();
        for nag in nags {
            set.insert(nag);
        }
        set
    }
}

impl From<NagSet> for Vec<Nag> {
    fn from(set: NagSet) -> Self {
        set.0.into_vec()
    }
}

/// Whether a comment belongs in front of its move or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub position: CommentPosition,
}

/// An engine evaluation attached to a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: Score,
    pub depth: Option<u32>,
}

impl Evaluation {
    pub fn centipawns(cp: i32) -> Self {
        Self {
            score: Score::Centipawns(cp),
            depth: None,
        }
    }

    pub fn mate(moves: i32) -> Self {
        Self {
            score: Score::Mate(moves),
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkColor {
    Green,
    Red,
    Yellow,
    Blue,
}

impl MarkColor {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'G' => Some(Self::Green),
            'R' => Some(Self::Red),
            'Y' => Some(Self::Yellow),
            'B' => Some(Self::Blue),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Green => 'G',
            Self::Red => 'R',
            Self::Yellow => 'Y',
            Self::Blue => 'B',
        }
    }
}

/// Board markup drawn over a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VisualMark {
    Arrow {
        from: BoardSquare,
        to: BoardSquare,
        color: MarkColor,
    },
    Highlight {
        square: BoardSquare,
        color: MarkColor,
    },
}

/// Everything attached to one move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub comments: Vec<Comment>,
    pub nags: NagSet,
    pub evaluation: Option<Evaluation>,
    pub visual_marks: Vec<VisualMark>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
            && self.nags.is_empty()
            && self.evaluation.is_none()
            && self.visual_marks.is_empty()
    }

    /// Comments at the given position, in order.
    pub fn comments_at(&self, position: CommentPosition) -> impl Iterator<Item = &Comment> {
        self.comments
            .iter()
            .filter(move |comment| comment.position == position)
    }
}
