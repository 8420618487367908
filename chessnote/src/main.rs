//! chessnote - command-line front end for PGN game records.
//!
//! Subcommands:
//!
//! 1. **`check <FILE>`**: parses every game and reports the ones that fail,
//!    one line each with the game index and line:column of the error.
//! 2. **`format <FILE>`**: re-exports every valid game with the chosen
//!    [`WriterOptions`].
//! 3. **`outline <FILE>`**: prints one game as a nested JSON outline.
//!
//! `-` reads from stdin. Runtime defaults come from [`config`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use notation::WriterOptions;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Top-level CLI arguments for chessnote.
#[derive(Parser)]
#[command(name = "chessnote", about = "Validate and reformat PGN game records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every game and report the ones that fail.
    Check {
        /// PGN file, or `-` for stdin.
        file: PathBuf,
    },
    /// Re-export every valid game to stdout.
    Format {
        /// PGN file, or `-` for stdin.
        file: PathBuf,
        #[command(flatten)]
        layout: FormatArgs,
    },
    /// Print a game as a JSON outline.
    Outline {
        /// PGN file, or `-` for stdin.
        file: PathBuf,
        /// Zero-based index of the game to print.
        #[arg(short, long, default_value_t = 0)]
        game: usize,
    },
}

/// Export switches for `format`.
#[derive(Args)]
struct FormatArgs {
    /// Drop all variations, keeping only the main line.
    #[arg(long)]
    no_variations: bool,
    /// Drop text comments.
    #[arg(long)]
    no_comments: bool,
    /// Drop numeric annotation glyphs.
    #[arg(long)]
    no_nags: bool,
    /// Drop `[%eval]` commands.
    #[arg(long)]
    no_evals: bool,
    /// Drop `[%cal]` and `[%csl]` commands.
    #[arg(long)]
    no_marks: bool,
    /// Write glyphs as `!`, `?!`, `±` instead of `$1`, `$6`, `$16`.
    #[arg(long)]
    symbolic_nags: bool,
    /// Put every variation on its own indented line.
    #[arg(long)]
    indent: bool,
    /// Soft wrap width; `0` disables wrapping.
    /// Defaults to `CHESSNOTE_MAX_LINE_LENGTH` or 80.
    #[arg(long, value_name = "N")]
    max_line_length: Option<usize>,
}

impl FormatArgs {
    fn writer_options(&self) -> WriterOptions {
        let max_line_length = match self.max_line_length {
            Some(0) => None,
            Some(width) => Some(width),
            None => config::get_max_line_length(),
        };
        WriterOptions {
            include_variations: !self.no_variations,
            include_comments: !self.no_comments,
            include_nags: !self.no_nags,
            include_evaluations: !self.no_evals,
            include_visual_marks: !self.no_marks,
            symbolic_nags: self.symbolic_nags,
            max_line_length,
            indent_variations: self.indent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(config::get_log_filter())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Check { file } => {
            let text = commands::read_input(&file)?;
            let games = commands::check(&text, &mut stdout)?;
            tracing::debug!(games, "Checked {}", file.display());
        }
        Commands::Format { file, layout } => {
            let text = commands::read_input(&file)?;
            let games = commands::format(&text, &layout.writer_options(), &mut stdout)?;
            tracing::debug!(games, "Formatted {}", file.display());
        }
        Commands::Outline { file, game } => {
            let text = commands::read_input(&file)?;
            commands::outline(&text, game, &mut stdout)?;
        }
    }

    Ok(())
}
