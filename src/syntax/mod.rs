//! Syntax highlighting module
//!
//! Provides the lexing side of the pipeline:
//! - Language detection from names, file extensions, and content
//! - The [`LexingEngine`] capability interface
//! - A tree-sitter backed engine plus the plain-text fallback grammar
//!
//! ## Architecture
//!
//! ```text
//! GrammarResolver → LexingEngine::open_stream → TokenStream
//!                 → LineGroups → HtmlFormatter → Vec<String>
//! ```
//!
//! ## Supported Languages
//!
//! - Rust, Python, Go, PHP
//! - C, C++, Java, Bash
//! - Scheme/Racket, INI, XML

mod engine;
mod guess;
mod highlights;
mod languages;
mod plaintext;
mod treesitter;

pub use engine::{GrammarHandle, LexingEngine, TokenStream, FALLBACK_GRAMMAR};
pub use guess::guess_language;
pub use highlights::{
    css_class, highlight_id_for_name, HighlightId, LineGroup, Token, HIGHLIGHTS,
};
pub use languages::LanguageId;
pub use plaintext::PlainTextStream;
pub use treesitter::{TreeSitterEngine, DEFAULT_STREAM_LIMIT};
