//! Embedded comment commands: `[%eval ...]`, `[%cal ...]` and `[%csl ...]`.
//!
//! Evaluations and board markup travel inside ordinary PGN comments so that
//! readers which do not know them still see a valid comment.

use chess::{BoardSquare, Score};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, i32 as parse_i32, one_of, space0, space1, u32 as parse_u32},
    combinator::{map_opt, map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::annotation::{Evaluation, MarkColor, VisualMark};

/// A comment body split into plain text and recognized commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub text: String,
    pub evaluation: Option<Evaluation>,
    pub marks: Vec<VisualMark>,
}

enum Command {
    Eval(Evaluation),
    Marks(Vec<VisualMark>),
}

/// Pull every recognized command out of a comment body as written, escapes
/// intact, and resolve the escapes of the remaining text.
///
/// Unknown commands such as `[%clk 0:03:00]` stay in the text untouched.
pub fn split_comment(raw: &str) -> Markup {
    let mut markup = Markup::default();
    let mut text = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("[%") {
        text.push_str(&rest[..start]);
        match command(&rest[start..]) {
            Ok((remaining, Command::Eval(evaluation))) => {
                markup.evaluation = Some(evaluation);
                rest = remaining;
            }
            Ok((remaining, Command::Marks(marks))) => {
                markup.marks.extend(marks);
                rest = remaining;
            }
            Err(_) => {
                text.push_str("[%");
                rest = &rest[start + 2..];
            }
        }
    }
    text.push_str(rest);

    markup.text = unescape_comment(&text).trim().to_string();
    markup
}

/// Escape plain text for a `{...}` comment body.
///
/// `\`, `{` and `}` get a backslash, and so does the `%` of any `[%` that
/// would otherwise read back as a recognized command.
pub fn escape_comment(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for (index, c) in text.char_indices() {
        match c {
            '\\' | '{' | '}' => escaped.push('\\'),
            '%' if text[..index].ends_with('[') && command(&text[index - 1..]).is_ok() => {
                escaped.push('\\')
            }
            _ => {}
        }
        escaped.push(c);
    }
    escaped
}

/// Resolve `\\`, `\{`, `\}` and `\%`. A backslash before anything else is
/// kept as is.
pub fn unescape_comment(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next_if(|next| matches!(next, '\\' | '{' | '}' | '%')) {
                text.push(escaped);
                continue;
            }
        }
        text.push(c);
    }
    text
}

/// Render evaluation and marks as command text, or `None` if there is nothing
/// to write.
pub fn render_commands(evaluation: Option<&Evaluation>, marks: &[VisualMark]) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(evaluation) = evaluation {
        parts.push(format!("[%eval {}]", format_evaluation(evaluation)));
    }

    let arrows: Vec<String> = marks
        .iter()
        .filter_map(|mark| match mark {
            VisualMark::Arrow { from, to, color } => {
                Some(format!("{}{}{}", color.to_char(), from, to))
            }
            VisualMark::Highlight { .. } => None,
        })
        .collect();
    if !arrows.is_empty() {
        parts.push(format!("[%cal {}]", arrows.join(",")));
    }

    let highlights: Vec<String> = marks
        .iter()
        .filter_map(|mark| match mark {
            VisualMark::Highlight { square, color } => {
                Some(format!("{}{}", color.to_char(), square))
            }
            VisualMark::Arrow { .. } => None,
        })
        .collect();
    if !highlights.is_empty() {
        parts.push(format!("[%csl {}]", highlights.join(",")));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

/// `0.35`, `-1.20`, `#3`, `#-2`, optionally followed by `,depth`.
pub fn format_evaluation(evaluation: &Evaluation) -> String {
    let value = match evaluation.score {
        Score::Centipawns(cp) => format!("{:.2}", cp as f64 / 100.0),
        Score::Mate(moves) => format!("#{}", moves),
    };
    match evaluation.depth {
        Some(depth) => format!("{},{}", value, depth),
        None => value,
    }
}

fn command(input: &str) -> IResult<&str, Command> {
    delimited(
        tag("[%"),
        alt((eval_command, arrow_command, highlight_command)),
        preceded(space0, char(']')),
    )
    .parse(input)
}

fn eval_command(input: &str) -> IResult<&str, Command> {
    preceded((tag("eval"), space1), evaluation)
        .map(Command::Eval)
        .parse(input)
}

fn arrow_command(input: &str) -> IResult<&str, Command> {
    preceded((tag("cal"), space1), separated_list1(char(','), arrow))
        .map(Command::Marks)
        .parse(input)
}

fn highlight_command(input: &str) -> IResult<&str, Command> {
    preceded((tag("csl"), space1), separated_list1(char(','), highlight))
        .map(Command::Marks)
        .parse(input)
}

fn evaluation(input: &str) -> IResult<&str, Evaluation> {
    (alt((mate_score, pawn_score)), opt(depth))
        .map(|(score, depth)| Evaluation { score, depth })
        .parse(input)
}

fn mate_score(input: &str) -> IResult<&str, Score> {
    preceded(char('#'), parse_i32).map(Score::Mate).parse(input)
}

fn pawn_score(input: &str) -> IResult<&str, Score> {
    map_res(
        recognize((opt(one_of("+-")), digit1, opt((char('.'), digit1)))),
        |text: &str| {
            text.parse::<f64>()
                .map(|pawns| Score::Centipawns((pawns * 100.0).round() as i32))
        },
    )
    .parse(input)
}

fn depth(input: &str) -> IResult<&str, u32> {
    preceded(char(','), parse_u32).parse(input)
}

fn arrow(input: &str) -> IResult<&str, VisualMark> {
    (mark_color, square, square)
        .map(|(color, from, to)| VisualMark::Arrow { from, to, color })
        .parse(input)
}

fn highlight(input: &str) -> IResult<&str, VisualMark> {
    (mark_color, square)
        .map(|(color, square)| VisualMark::Highlight { square, color })
        .parse(input)
}

fn mark_color(input: &str) -> IResult<&str, MarkColor> {
    map_opt(one_of("GRYB"), MarkColor::from_char).parse(input)
}

fn square(input: &str) -> IResult<&str, BoardSquare> {
    map_res(
        recognize((one_of("abcdefgh"), one_of("12345678"))),
        str::parse::<BoardSquare>,
    )
    .parse(input)
}
