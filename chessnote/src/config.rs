//! Configuration for the chessnote CLI.
//!
//! Every value has a compile-time default and can be overridden at runtime via
//! a dedicated environment variable. Command-line flags take precedence over
//! both.

/// Default soft wrap width for exported movetext.
const DEFAULT_MAX_LINE_LENGTH: usize = 80;

/// Default `tracing` filter. Warnings cover skipped games.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Get the soft wrap width for exported movetext.
///
/// Priority:
/// 1. `CHESSNOTE_MAX_LINE_LENGTH` env variable if set (falls back to default
///    if the value cannot be parsed as a `usize`)
/// 2. `80` as fallback
///
/// A width of `0` disables wrapping and is returned as `None`.
pub fn get_max_line_length() -> Option<usize> {
    let width = match std::env::var("CHESSNOTE_MAX_LINE_LENGTH") {
        Ok(value) => parse_line_length(&value),
        Err(_) => DEFAULT_MAX_LINE_LENGTH,
    };
    (width > 0).then_some(width)
}

fn parse_line_length(value: &str) -> usize {
    value.trim().parse().unwrap_or(DEFAULT_MAX_LINE_LENGTH)
}

/// Get the `tracing` filter directive.
///
/// Priority:
/// 1. `CHESSNOTE_LOG` env variable if set
/// 2. `warn` as fallback
pub fn get_log_filter() -> String {
    if let Ok(filter) = std::env::var("CHESSNOTE_LOG") {
        return filter;
    }

    DEFAULT_LOG_FILTER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_max_line_length() {
        let width = get_max_line_length();
        match std::env::var("CHESSNOTE_MAX_LINE_LENGTH") {
            Ok(val) => {
                let expected = parse_line_length(&val);
                assert_eq!(width, (expected > 0).then_some(expected));
            }
            Err(_) => assert_eq!(width, Some(DEFAULT_MAX_LINE_LENGTH)),
        }
    }

    #[test]
    fn test_parse_line_length() {
        assert_eq!(parse_line_length("100"), 100);
        assert_eq!(parse_line_length(" 0 "), 0);
        assert_eq!(parse_line_length("wide"), DEFAULT_MAX_LINE_LENGTH);
    }

    #[test]
    fn test_get_log_filter() {
        let filter = get_log_filter();
        match std::env::var("CHESSNOTE_LOG") {
            Ok(val) => assert_eq!(filter, val),
            Err(_) => assert_eq!(filter, DEFAULT_LOG_FILTER),
        }
    }
}
