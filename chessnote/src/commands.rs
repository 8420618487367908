//! Subcommand implementations.
//!
//! Each command takes the PGN text and a writer so it can be exercised
//! without touching stdin or stdout.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use notation::{parse_games, write_games, GameError, NotationTree, WriterOptions};

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input file (or stdin) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("input contains no games")]
    NoGames,

    #[error("game {index} requested but input has {count} game(s)")]
    GameOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("failed to encode outline: {0}")]
    Json(#[from] serde_json::Error),

    /// `check` found invalid games; they have already been reported.
    #[error("{failed} of {total} game(s) failed to parse")]
    Invalid { failed: usize, total: usize },
}

/// Read a PGN file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(read_error)?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(read_error)
}

/// Report every game that fails to parse, one line each.
///
/// Returns the number of games read when all of them are valid.
pub fn check(text: &str, out: &mut impl Write) -> Result<usize, CliError> {
    let games = parse_games(text);
    if games.is_empty() {
        return Err(CliError::NoGames);
    }
    let total = games.len();
    let mut failed = 0;
    for game in &games {
        if let Err(err) = game {
            writeln!(out, "{}", err)?;
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(CliError::Invalid { failed, total });
    }
    writeln!(out, "{} game(s) ok", total)?;
    Ok(total)
}

/// Re-export every valid game; invalid games are skipped with a warning.
///
/// Returns the number of games written.
pub fn format(
    text: &str,
    options: &WriterOptions,
    out: &mut impl Write,
) -> Result<usize, CliError> {
    let trees: Vec<NotationTree> = parse_games(text)
        .into_iter()
        .filter_map(|game| match game {
            Ok(tree) => Some(tree),
            Err(err) => {
                tracing::warn!(%err, "Skipping game");
                None
            }
        })
        .collect();
    if trees.is_empty() {
        return Err(CliError::NoGames);
    }
    out.write_all(write_games(&trees, options).as_bytes())?;
    Ok(trees.len())
}

/// Print the outline of one game (zero-based `index`) as pretty JSON.
pub fn outline(text: &str, index: usize, out: &mut impl Write) -> Result<(), CliError> {
    let mut games = parse_games(text);
    let count = games.len();
    if index >= count {
        return Err(CliError::GameOutOfRange { index, count });
    }
    let tree = games.swap_remove(index)?;
    serde_json::to_writer_pretty(&mut *out, &tree.outline())?;
    writeln!(out)?;
    Ok(())
}
