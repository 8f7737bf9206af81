//! Lexing engine capability interface
//!
//! The pipeline never branches on which grammar it holds. Everything it needs
//! from a grammar database goes through [`LexingEngine`]: lookup by name,
//! filename matching, content guessing, and tokenization (whole-string or
//! streamed).

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use super::highlights::Token;
use crate::error::Result;

/// Raw name of the designated fallback grammar
pub const FALLBACK_GRAMMAR: &str = "fallback";

/// Lazy token source. `None` marks end of stream.
pub type TokenStream<'a> = Box<dyn Iterator<Item = Result<Token>> + 'a>;

/// Opaque handle to a resolved grammar.
///
/// Cloning is cheap and handles are shared freely across threads.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GrammarHandle {
    name: Arc<str>,
}

impl GrammarHandle {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Raw grammar name as registered in the engine
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_fallback(&self) -> bool {
        &*self.name == FALLBACK_GRAMMAR
    }
}

impl fmt::Debug for GrammarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrammarHandle({})", self.name)
    }
}

/// Grammar database and scanner
pub trait LexingEngine: Send + Sync {
    /// Look up a grammar by name or alias
    fn get_by_name(&self, name: &str) -> Option<GrammarHandle>;

    /// Match a grammar against a filename (extension or well-known name)
    fn match_by_filename(&self, filename: &str) -> Option<GrammarHandle>;

    /// Guess a language name from a content prefix and the filename
    fn guess_language(&self, filename: &str, sniff: &[u8]) -> Option<String>;

    /// The grammar that classifies everything as plain text
    fn fallback_grammar(&self) -> GrammarHandle;

    /// Tokenize a complete in-memory document
    fn tokenise(&self, grammar: &GrammarHandle, code: &str) -> Result<Vec<Token>>;

    /// Start scanning a byte stream.
    ///
    /// `primer` holds bytes already pulled from `source` and is emitted
    /// first. Fails with [`HighlightError::Unsupported`] when the grammar
    /// cannot stream, and with [`HighlightError::TooLarge`] (returning the
    /// consumed bytes) when a buffering engine hits its limit.
    ///
    /// [`HighlightError::Unsupported`]: crate::error::HighlightError::Unsupported
    /// [`HighlightError::TooLarge`]: crate::error::HighlightError::TooLarge
    fn open_stream<'a>(
        &'a self,
        grammar: &GrammarHandle,
        primer: &[u8],
        source: &'a mut dyn Read,
        block_size: usize,
        declared_size: usize,
    ) -> Result<TokenStream<'a>>;
}
