//! Token Highlight - streaming syntax highlighting to HTML fragments
//!
//! Resolves a grammar for a file, scans it into classified tokens, regroups
//! the tokens into lines and renders each line as class-annotated HTML.
//! Inputs that are too large or can't be scanned degrade to escaped text.

pub mod cache;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod format;
pub mod highlighter;
pub mod lines;
pub mod plain;
pub mod read_ahead;
pub mod resolver;
pub mod syntax;
pub mod theme;
pub mod tracing;

// Re-export commonly used types
pub use config::HighlightConfig;
pub use error::HighlightError;
pub use highlighter::{Highlighted, HighlightedFile, Highlighter};
pub use plain::escape_plain;
pub use resolver::GrammarResolver;
pub use syntax::{GrammarHandle, LexingEngine, Token, TreeSitterEngine};
pub use theme::Theme;
