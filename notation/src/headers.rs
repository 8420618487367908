//! PGN tag pairs.

use serde::{Deserialize, Serialize};

/// The seven-tag roster with its placeholder values, in canonical order.
pub const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// Characters allowed in a tag name.
pub fn is_tag_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True if `name` can be written as a tag and read back.
pub fn is_valid_tag_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_tag_name_char)
}

/// Game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[default]
    #[serde(rename = "*")]
    Ongoing,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Ongoing => "*",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" | "½-½" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, case-sensitive tag-pair map.
///
/// A fresh map holds the seven-tag roster with placeholder values. Setting an
/// existing tag keeps its position; new tags are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(Vec<(String, String)>);

impl Default for Headers {
    fn default() -> Self {
        Self(
            SEVEN_TAG_ROSTER
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }
}

impl Headers {
    /// A map without any tags, not even the roster.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the previous value, if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tags in export order: the roster first, then everything else as
    /// inserted. Missing roster tags are filled with their placeholders.
    pub fn export_order(&self) -> Vec<(&str, &str)> {
        let mut tags: Vec<(&str, &str)> = SEVEN_TAG_ROSTER
            .iter()
            .map(|(name, placeholder)| (*name, self.get(name).unwrap_or(placeholder)))
            .collect();
        tags.extend(
            self.iter()
                .filter(|(name, _)| !SEVEN_TAG_ROSTER.iter().any(|(roster, _)| roster == name)),
        );
        tags
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_roster() {
        let headers = Headers::default();
        assert_eq!(headers.len(), 7);
        assert_eq!(headers.get("Date"), Some("????.??.??"));
        assert_eq!(headers.get("Result"), Some("*"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut headers = Headers::default();
        headers.set("White", "Kasparov");
        assert_eq!(headers.get("White"), Some("Kasparov"));
        assert_eq!(headers.get("white"), None);
    }

    #[test]
    fn test_set_keeps_position() {
        let mut headers = Headers::empty();
        headers.set("ECO", "C20");
        headers.set("Annotator", "me");
        assert_eq!(headers.set("ECO", "C21"), Some("C20".to_string()));
        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["ECO", "Annotator"]);
    }

    #[test]
    fn test_export_order_puts_roster_first() {
        let mut headers = Headers::empty();
        headers.set("ECO", "B01");
        headers.set("White", "Anand");
        let exported = headers.export_order();
        assert_eq!(exported[0], ("Event", "?"));
        assert_eq!(exported[4], ("White", "Anand"));
        assert_eq!(exported[7], ("ECO", "B01"));
        assert_eq!(exported.len(), 8);
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::default();
        assert_eq!(headers.remove("Site"), Some("?".to_string()));
        assert!(!headers.contains("Site"));
        assert_eq!(headers.remove("Site"), None);
    }

    #[test]
    fn test_tag_names() {
        assert!(is_valid_tag_name("WhiteElo"));
        assert!(is_valid_tag_name("Time_Control2"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("White Elo"));
        assert!(!is_valid_tag_name("Event\""));
        assert!(!is_valid_tag_name("Ménage"));
    }

    #[test]
    fn test_result_tokens() {
        assert_eq!(GameResult::from_token("1-0"), Some(GameResult::WhiteWins));
        assert_eq!(GameResult::from_token("½-½"), Some(GameResult::Draw));
        assert_eq!(GameResult::from_token("2-0"), None);
        assert_eq!(GameResult::Draw.to_string(), "1/2-1/2");
    }
}
