//! Command-line argument parsing
//!
//! ```text
//! token-highlight [--language L] [--css] FILE...
//! ```
//!
//! `-` reads standard input.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Highlight source files as HTML fragments
#[derive(Parser, Debug)]
#[command(
    name = "token-highlight",
    version,
    about = "Highlight source files as HTML fragments"
)]
pub struct CliArgs {
    /// Files to highlight (`-` for stdin)
    #[arg(value_name = "FILES")]
    pub paths: Vec<PathBuf>,

    /// Language to use instead of detecting one
    #[arg(short, long, value_name = "NAME")]
    pub language: Option<String>,

    /// Print the stylesheet for the generated classes
    #[arg(long)]
    pub css: bool,
}

/// Where one input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// Name used for grammar resolution
    pub fn name(&self) -> String {
        match self {
            Input::Stdin => String::new(),
            Input::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl CliArgs {
    /// Inputs in command-line order; no paths means stdin unless only the
    /// stylesheet was asked for
    pub fn inputs(&self) -> Vec<Input> {
        if self.paths.is_empty() {
            return if self.css { vec![] } else { vec![Input::Stdin] };
        }
        self.paths
            .iter()
            .map(|path| {
                if path.as_path() == Path::new("-") {
                    Input::Stdin
                } else {
                    Input::File(path.clone())
                }
            })
            .collect()
    }
}
