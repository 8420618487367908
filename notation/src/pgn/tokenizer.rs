//! Lexer for PGN text.
//!
//! Purely lexical: no move or grammar validation happens here. Every error
//! consumes at least one character, so a caller can keep pulling tokens after
//! a failure to resynchronize.

use serde::Serialize;

use crate::annotation::Nag;
use crate::error::PgnError;
use crate::headers::{is_tag_name_char, GameResult};
use crate::markup::escape_comment;

/// Location of a token in the input. Lines and columns start at 1; the
/// column counts characters, the offset counts bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Tag { name: String, value: String },
    /// `12.` or `12...`; `black_dots` is set for the ellipsis forms.
    MoveNumber { number: u32, black_dots: bool },
    San(String),
    NagSymbolic(String),
    NagNumeric(u8),
    /// Comment body as written, escapes intact and untrimmed. Line comments
    /// are escaped into the same form.
    Comment(String),
    VariationOpen,
    VariationClose,
    Result(GameResult),
    Eof,
}

impl Token {
    /// Short human description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Tag { name, .. } => format!("tag `{}`", name),
            Self::MoveNumber { number, .. } => format!("move number {}", number),
            Self::San(san) => format!("move `{}`", san),
            Self::NagSymbolic(symbol) => format!("glyph `{}`", symbol),
            Self::NagNumeric(n) => format!("glyph `${}`", n),
            Self::Comment(_) => "comment".to_string(),
            Self::VariationOpen => "`(`".to_string(),
            Self::VariationClose => "`)`".to_string(),
            Self::Result(result) => format!("result `{}`", result),
            Self::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    position: Position,
    at_line_start: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: Position::default(),
            at_line_start: true,
            done: false,
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
            self.at_line_start = true;
        } else {
            self.position.column += 1;
            self.at_line_start = false;
        }
        Some(c)
    }

    fn bump_str(&mut self, text: &str) {
        for _ in text.chars() {
            self.bump();
        }
    }

    fn skip_line(&mut self) -> &'a str {
        let start = self.position.offset;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        &self.input[start..self.position.offset]
    }

    /// Whitespace, stray move-number dots and `%` escape lines.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if self.at_line_start && c == '%' {
                self.skip_line();
            } else if c.is_whitespace() || c == '.' || c == '…' {
                self.bump();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, PgnError> {
        self.skip_trivia();
        let position = self.position;
        let token = match self.peek() {
            None => Token::Eof,
            Some(c) => self.read_token(c, position)?,
        };
        Ok(Spanned { token, position })
    }

    fn read_token(&mut self, c: char, position: Position) -> Result<Token, PgnError> {
        match c {
            '[' => self.read_tag(position),
            '{' => self.read_comment(position),
            ';' => {
                self.bump();
                Ok(Token::Comment(escape_comment(self.skip_line())))
            }
            '(' => {
                self.bump();
                Ok(Token::VariationOpen)
            }
            ')' => {
                self.bump();
                Ok(Token::VariationClose)
            }
            '*' => {
                self.bump();
                Ok(Token::Result(GameResult::Ongoing))
            }
            '$' => self.read_numeric_nag(position),
            '½' if self.rest().starts_with("½-½") => {
                self.bump_str("½-½");
                Ok(Token::Result(GameResult::Draw))
            }
            c if c.is_ascii_digit() => self.read_number(position),
            c if c.is_ascii_alphabetic() => Ok(self.read_san()),
            _ => match self.match_nag_symbol() {
                Some(symbol) => {
                    self.bump_str(symbol);
                    Ok(Token::NagSymbolic(symbol.to_string()))
                }
                None => {
                    self.bump();
                    Err(PgnError::UnexpectedToken {
                        position,
                        found: format!("`{}`", c),
                        expected: "a PGN token".to_string(),
                    })
                }
            },
        }
    }

    fn read_tag(&mut self, position: Position) -> Result<Token, PgnError> {
        self.bump();
        self.skip_spaces();

        let start = self.position.offset;
        while self.peek().is_some_and(is_tag_name_char) {
            self.bump();
        }
        let name = self.input[start..self.position.offset].to_string();
        if name.is_empty() {
            return Err(self.unexpected_here("a tag name"));
        }

        self.skip_spaces();
        if self.peek() != Some('"') {
            return Err(self.unexpected_here("`\"`"));
        }
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(PgnError::UnexpectedToken {
                        position,
                        found: "end of input".to_string(),
                        expected: "closing `\"` of tag value".to_string(),
                    })
                }
                Some('\\') if matches!(self.peek(), Some('"' | '\\')) => {
                    if let Some(escaped) = self.bump() {
                        value.push(escaped);
                    }
                }
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }

        self.skip_spaces();
        if self.peek() != Some(']') {
            return Err(self.unexpected_here("`]`"));
        }
        self.bump();
        Ok(Token::Tag { name, value })
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.bump();
        }
    }

    /// Error for the character at the cursor, which is consumed.
    fn unexpected_here(&mut self, expected: &str) -> PgnError {
        let position = self.position;
        let found = match self.bump() {
            Some(c) if c.is_whitespace() => "whitespace".to_string(),
            Some(c) => format!("`{}`", c),
            None => "end of input".to_string(),
        };
        PgnError::UnexpectedToken {
            position,
            found,
            expected: expected.to_string(),
        }
    }

    fn read_comment(&mut self, position: Position) -> Result<Token, PgnError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(PgnError::MalformedComment {
                        position,
                        reason: "missing closing `}`".to_string(),
                    })
                }
                Some('\\') if matches!(self.peek(), Some('{' | '}' | '\\')) => {
                    text.push('\\');
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                }
                Some('{') => {
                    return Err(PgnError::MalformedComment {
                        position,
                        reason: "unescaped `{` inside comment".to_string(),
                    })
                }
                Some('}') => return Ok(Token::Comment(text)),
                Some(c) => text.push(c),
            }
        }
    }

    fn read_numeric_nag(&mut self, position: Position) -> Result<Token, PgnError> {
        self.bump();
        let start = self.position.offset;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let digits = &self.input[start..self.position.offset];
        match digits.parse::<u8>() {
            Ok(n) => Ok(Token::NagNumeric(n)),
            Err(_) if digits.is_empty() => Err(self.unexpected_here("glyph number after `$`")),
            Err(_) => Err(PgnError::UnexpectedToken {
                position,
                found: format!("`${}`", digits),
                expected: "a glyph between $0 and $255".to_string(),
            }),
        }
    }

    fn read_number(&mut self, position: Position) -> Result<Token, PgnError> {
        const RESULTS: [(&str, GameResult); 3] = [
            ("1/2-1/2", GameResult::Draw),
            ("1-0", GameResult::WhiteWins),
            ("0-1", GameResult::BlackWins),
        ];
        for (text, result) in RESULTS {
            if self.rest().starts_with(text) {
                self.bump_str(text);
                return Ok(Token::Result(result));
            }
        }
        for (text, castle) in [("0-0-0", "O-O-O"), ("0-0", "O-O")] {
            if self.rest().starts_with(text) {
                self.bump_str(text);
                let mut san = castle.to_string();
                while let Some(c) = self.peek().filter(|c| matches!(*c, '+' | '#')) {
                    san.push(c);
                    self.bump();
                }
                return Ok(Token::San(san));
            }
        }

        let start = self.position.offset;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let digits = &self.input[start..self.position.offset];
        let number = digits.parse::<u32>().map_err(|_| PgnError::UnexpectedToken {
            position,
            found: format!("`{}`", digits),
            expected: "a move number".to_string(),
        })?;

        let mut dots = 0;
        let mut ellipsis = false;
        while let Some(c) = self.peek() {
            match c {
                '.' => dots += 1,
                '…' => ellipsis = true,
                _ => break,
            }
            self.bump();
        }

        Ok(Token::MoveNumber {
            number,
            black_dots: ellipsis || dots >= 2,
        })
    }

    fn read_san(&mut self) -> Token {
        let start = self.position.offset;
        while let Some(c) = self.peek() {
            let next = self.peek_second();
            let take = match c {
                c if c.is_ascii_alphanumeric() => true,
                '=' | '#' | 'x' | ':' | '@' => true,
                '+' => !matches!(next, Some('-' | '/' | '=')),
                '-' => next.is_some_and(|n| n.is_ascii_alphanumeric()),
                _ => false,
            };
            if !take {
                break;
            }
            self.bump();
        }
        Token::San(self.input[start..self.position.offset].to_string())
    }

    /// Longest symbolic glyph at the cursor.
    fn match_nag_symbol(&self) -> Option<&'static str> {
        let rest = self.rest();
        Nag::symbol_table()
            .map(|(symbol, _)| symbol)
            .filter(|symbol| rest.starts_with(symbol))
            .max_by_key(|symbol| symbol.len())
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned, PgnError>;

    /// Yields tokens up to and including `Eof`, then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        if matches!(
            result,
            Ok(Spanned {
                token: Token::Eof,
                ..
            })
        ) {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input)
            .map(|result| result.unwrap().token)
            .collect()
    }

    fn san(text: &str) -> Token {
        Token::San(text.to_string())
    }

    #[test]
    fn test_tags() {
        assert_eq!(
            tokens(r#"[Event "Casual \"blitz\""] [Site "C:\\chess"]"#),
            vec![
                Token::Tag {
                    name: "Event".into(),
                    value: "Casual \"blitz\"".into()
                },
                Token::Tag {
                    name: "Site".into(),
                    value: "C:\\chess".into()
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_move_numbers() {
        assert_eq!(
            tokens("1. e4 1... e5 2.Nf3 2…Nc6 3 Bb5"),
            vec![
                Token::MoveNumber {
                    number: 1,
                    black_dots: false
                },
                san("e4"),
                Token::MoveNumber {
                    number: 1,
                    black_dots: true
                },
                san("e5"),
                Token::MoveNumber {
                    number: 2,
                    black_dots: false
                },
                san("Nf3"),
                Token::MoveNumber {
                    number: 2,
                    black_dots: true
                },
                san("Nc6"),
                Token::MoveNumber {
                    number: 3,
                    black_dots: false
                },
                san("Bb5"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_san_forms() {
        assert_eq!(
            tokens("O-O-O exd8=Q+ Rxe1# 0-0 0-0-0+"),
            vec![
                san("O-O-O"),
                san("exd8=Q+"),
                san("Rxe1#"),
                san("O-O"),
                san("O-O-O+"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(
            tokens("e4!? Nf3?? $14 Qh5+- Bb5+/- ∞"),
            vec![
                san("e4"),
                Token::NagSymbolic("!?".into()),
                san("Nf3"),
                Token::NagSymbolic("??".into()),
                Token::NagNumeric(14),
                san("Qh5"),
                Token::NagSymbolic("+-".into()),
                san("Bb5"),
                Token::NagSymbolic("+/-".into()),
                Token::NagSymbolic("∞".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_check_before_glyph() {
        assert_eq!(
            tokens("Qh5+!"),
            vec![san("Qh5+"), Token::NagSymbolic("!".into()), Token::Eof]
        );
    }

    #[test]
    fn test_results() {
        assert_eq!(
            tokens("1-0 0-1 1/2-1/2 * ½-½"),
            vec![
                Token::Result(GameResult::WhiteWins),
                Token::Result(GameResult::BlackWins),
                Token::Result(GameResult::Draw),
                Token::Result(GameResult::Ongoing),
                Token::Result(GameResult::Draw),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_comments_and_escapes() {
        assert_eq!(
            tokens("{a \\} b \\{ c \\\\} ; rest of line\ne4"),
            vec![
                Token::Comment("a \\} b \\{ c \\\\".into()),
                Token::Comment(" rest of line".into()),
                san("e4"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_line_comment_is_plain_text() {
        assert_eq!(
            tokens("; {x} [%eval 1.0]\ne4"),
            vec![
                Token::Comment(" \\{x\\} [\\%eval 1.0]".into()),
                san("e4"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_escape_lines_are_skipped() {
        assert_eq!(
            tokens("% exported by some tool\ne4\n%skipped too\ne5"),
            vec![san("e4"), san("e5"), Token::Eof]
        );
    }

    #[test]
    fn test_variations() {
        assert_eq!(
            tokens("e4 (d4) e5"),
            vec![
                san("e4"),
                Token::VariationOpen,
                san("d4"),
                Token::VariationClose,
                san("e5"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unbalanced_comment() {
        let err = Tokenizer::new("e4 {never closed")
            .nth(1)
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, PgnError::MalformedComment { .. }));
        assert_eq!(err.position().column, 4);

        let err = Tokenizer::new("{outer {inner}}")
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, PgnError::MalformedComment { .. }));
    }

    #[test]
    fn test_positions() {
        let spanned: Vec<_> = Tokenizer::new("[Event \"x\"]\n1. e4")
            .map(Result::unwrap)
            .collect();
        assert_eq!(spanned[1].position.line, 2);
        assert_eq!(spanned[1].position.column, 1);
        assert_eq!(spanned[2].position.column, 4);
        assert_eq!(spanned[2].position.offset, 15);
    }

    #[test]
    fn test_errors_consume_input() {
        let mut tokenizer = Tokenizer::new("& e4");
        assert!(tokenizer.next_token().is_err());
        assert_eq!(tokenizer.next_token().unwrap().token, san("e4"));
    }

    #[test]
    fn test_nag_out_of_range() {
        let mut tokenizer = Tokenizer::new("$300 e4");
        assert!(tokenizer.next_token().is_err());
        assert_eq!(tokenizer.next_token().unwrap().token, san("e4"));
    }
}
