//! Tree-sitter backed lexing engine
//!
//! Owns one compiled highlight query per language. Parsers are created per
//! request since tree-sitter parsers are !Sync while the engine is shared
//! between threads.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::io::{ErrorKind, Read};
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

use super::engine::{GrammarHandle, LexingEngine, TokenStream, FALLBACK_GRAMMAR};
use super::guess;
use super::highlights::{highlight_id_for_name, HighlightId, Token};
use super::languages::LanguageId;
use super::plaintext::PlainTextStream;
use crate::error::{HighlightError, Result};

/// Default cap on how much of a stream is buffered for parsing (1 MiB)
pub const DEFAULT_STREAM_LIMIT: usize = 1024 * 1024;

// Built-in highlight queries shipped with the grammar crates
const RUST_HIGHLIGHTS: &str = tree_sitter_rust::HIGHLIGHTS_QUERY;

// Common languages
const PYTHON_HIGHLIGHTS: &str = tree_sitter_python::HIGHLIGHTS_QUERY;
const GO_HIGHLIGHTS: &str = tree_sitter_go::HIGHLIGHTS_QUERY;
const PHP_HIGHLIGHTS: &str = tree_sitter_php::HIGHLIGHTS_QUERY;

// Extended languages (some use HIGHLIGHT_QUERY singular)
const C_HIGHLIGHTS: &str = tree_sitter_c::HIGHLIGHT_QUERY;
const CPP_HIGHLIGHTS: &str = tree_sitter_cpp::HIGHLIGHT_QUERY;
const JAVA_HIGHLIGHTS: &str = tree_sitter_java::HIGHLIGHTS_QUERY;
const BASH_HIGHLIGHTS: &str = tree_sitter_bash::HIGHLIGHT_QUERY;

// Specialized languages
const SCHEME_HIGHLIGHTS: &str = tree_sitter_racket::HIGHLIGHTS_QUERY;
const INI_HIGHLIGHTS: &str = tree_sitter_ini::HIGHLIGHTS_QUERY;
const XML_HIGHLIGHTS: &str = tree_sitter_xml::XML_HIGHLIGHT_QUERY;

/// Sentinel for "no highlight" in the per-byte class map
const UNCLASSIFIED: HighlightId = HighlightId::MAX;

/// Grammar and compiled query for one language
struct Grammar {
    language: Language,
    /// `None` when the query failed to compile; such grammars can't stream
    query: Option<Query>,
}

/// Lexing engine over the bundled tree-sitter grammars
pub struct TreeSitterEngine {
    grammars: HashMap<LanguageId, Grammar>,
    stream_limit: usize,
}

impl TreeSitterEngine {
    /// Create an engine with every bundled language initialized
    pub fn new() -> Self {
        let mut engine = Self {
            grammars: HashMap::new(),
            stream_limit: DEFAULT_STREAM_LIMIT,
        };

        for &lang in LanguageId::HIGHLIGHTED {
            engine.init_language(lang);
        }

        engine
    }

    /// Cap the bytes buffered from a stream before parsing
    pub fn with_stream_limit(mut self, limit: usize) -> Self {
        self.stream_limit = limit;
        self
    }

    /// Initialize a language's grammar and query
    fn init_language(&mut self, lang: LanguageId) {
        let (language, highlights_scm): (Language, &str) = match lang {
            LanguageId::Rust => (tree_sitter_rust::LANGUAGE.into(), RUST_HIGHLIGHTS),
            // Common languages
            LanguageId::Python => (tree_sitter_python::LANGUAGE.into(), PYTHON_HIGHLIGHTS),
            LanguageId::Go => (tree_sitter_go::LANGUAGE.into(), GO_HIGHLIGHTS),
            LanguageId::Php => (tree_sitter_php::LANGUAGE_PHP.into(), PHP_HIGHLIGHTS),
            // Extended languages
            LanguageId::C => (tree_sitter_c::LANGUAGE.into(), C_HIGHLIGHTS),
            LanguageId::Cpp => (tree_sitter_cpp::LANGUAGE.into(), CPP_HIGHLIGHTS),
            LanguageId::Java => (tree_sitter_java::LANGUAGE.into(), JAVA_HIGHLIGHTS),
            LanguageId::Bash => (tree_sitter_bash::LANGUAGE.into(), BASH_HIGHLIGHTS),
            // Specialized languages
            LanguageId::Scheme => (tree_sitter_racket::LANGUAGE.into(), SCHEME_HIGHLIGHTS),
            LanguageId::Ini => (tree_sitter_ini::LANGUAGE.into(), INI_HIGHLIGHTS),
            LanguageId::Xml => (tree_sitter_xml::LANGUAGE_XML.into(), XML_HIGHLIGHTS),
            // The fallback grammar needs no parser
            LanguageId::PlainText => return,
        };

        // Create query (may fail if query syntax is invalid)
        let query = match Query::new(&language, highlights_scm) {
            Ok(query) => Some(query),
            Err(e) => {
                tracing::error!("Failed to compile query for {:?}: {:?}", lang, e);
                None
            }
        };

        self.grammars.insert(lang, Grammar { language, query });
    }

    /// Whether a grammar has a usable highlight query
    pub fn has_query(&self, lang: LanguageId) -> bool {
        self.grammars
            .get(&lang)
            .is_some_and(|grammar| grammar.query.is_some())
    }

    fn handle(lang: LanguageId) -> GrammarHandle {
        GrammarHandle::new(lang.name())
    }

    fn language_of(&self, grammar: &GrammarHandle) -> Option<LanguageId> {
        LanguageId::from_name(grammar.name())
    }

    /// Parse `source` and classify every byte
    fn classify(&self, lang: LanguageId, source: &str) -> Result<Vec<HighlightId>> {
        let grammar = self
            .grammars
            .get(&lang)
            .ok_or_else(|| HighlightError::Scan(format!("no grammar for {}", lang.name())))?;
        let query = grammar.query.as_ref().ok_or_else(|| {
            HighlightError::Scan(format!("no highlight query for {}", lang.name()))
        })?;

        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|e| HighlightError::Scan(format!("{}: {}", lang.name(), e)))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| HighlightError::Scan(format!("{}: parse failed", lang.name())))?;

        // Collect capture ranges, then paint outer to inner so nested nodes win.
        // For identical ranges the first pattern wins.
        let mut spans: Vec<(usize, usize, HighlightId)> = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(query, tree.root_node(), source.as_bytes());
        while let Some((query_match, capture_idx)) = captures.next() {
            let capture = &query_match.captures[*capture_idx];
            let capture_name = &query.capture_names()[capture.index as usize];

            let Some(highlight_id) = highlight_id_for_name(capture_name) else {
                continue; // Skip unknown captures
            };

            let node = capture.node;
            if node.start_byte() < node.end_byte() {
                spans.push((node.start_byte(), node.end_byte(), highlight_id));
            }
        }
        spans.sort_by_key(|&(start, end, _)| (start, Reverse(end)));

        let mut classes = vec![UNCLASSIFIED; source.len()];
        let mut last_range = None;
        for (start, end, highlight_id) in spans {
            if last_range == Some((start, end)) {
                continue;
            }
            last_range = Some((start, end));
            let end = end.min(classes.len());
            if start < end {
                classes[start..end].fill(highlight_id);
            }
        }

        Ok(classes)
    }

    /// Buffer the primer and the rest of `source`, bounded by the stream limit.
    ///
    /// Overflow hands back everything read so far in
    /// [`HighlightError::TooLarge`] so the caller can still escape it.
    fn read_source(&self, primer: &[u8], source: &mut dyn Read, block_size: usize) -> Result<String> {
        let mut buffer = primer.to_vec();
        let mut block = vec![0u8; block_size.max(1)];
        while buffer.len() <= self.stream_limit {
            let n = match source.read(&mut block) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HighlightError::source_read(buffer.len(), e)),
            };
            buffer.extend_from_slice(&block[..n]);
        }
        if buffer.len() > self.stream_limit {
            return Err(HighlightError::TooLarge {
                limit: self.stream_limit,
                buffered: buffer,
            });
        }

        Ok(match String::from_utf8(buffer) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

impl Default for TreeSitterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LexingEngine for TreeSitterEngine {
    fn get_by_name(&self, name: &str) -> Option<GrammarHandle> {
        let lang = LanguageId::from_name(name)?;
        if lang.has_highlighting() && !self.grammars.contains_key(&lang) {
            return None;
        }
        Some(Self::handle(lang))
    }

    fn match_by_filename(&self, filename: &str) -> Option<GrammarHandle> {
        let lang = LanguageId::from_path(Path::new(filename));
        if self.grammars.contains_key(&lang) {
            Some(Self::handle(lang))
        } else {
            None
        }
    }

    fn guess_language(&self, filename: &str, sniff: &[u8]) -> Option<String> {
        guess::guess_language(filename, sniff).map(str::to_string)
    }

    fn fallback_grammar(&self) -> GrammarHandle {
        GrammarHandle::new(FALLBACK_GRAMMAR)
    }

    fn tokenise(&self, grammar: &GrammarHandle, code: &str) -> Result<Vec<Token>> {
        match self.language_of(grammar) {
            Some(LanguageId::PlainText) => Ok(vec![Token::text(code)]),
            Some(lang) => {
                let classes = self.classify(lang, code)?;
                Ok(ClassifiedTokens::new(code.to_string(), classes).collect())
            }
            None => Err(HighlightError::Scan(format!(
                "unknown grammar {}",
                grammar.name()
            ))),
        }
    }

    fn open_stream<'a>(
        &'a self,
        grammar: &GrammarHandle,
        primer: &[u8],
        source: &'a mut dyn Read,
        block_size: usize,
        declared_size: usize,
    ) -> Result<TokenStream<'a>> {
        let lang = self
            .language_of(grammar)
            .ok_or_else(|| HighlightError::Unsupported(grammar.name().to_string()))?;

        if lang == LanguageId::PlainText {
            return Ok(Box::new(PlainTextStream::new(primer, source, block_size)));
        }
        if !self.has_query(lang) {
            return Err(HighlightError::Unsupported(grammar.name().to_string()));
        }

        tracing::debug!(
            "Scanning {} stream (declared {} bytes, primer {} bytes)",
            lang.name(),
            declared_size,
            primer.len()
        );
        let text = self.read_source(primer, source, block_size)?;
        let classes = self.classify(lang, &text)?;
        Ok(Box::new(ClassifiedTokens::new(text, classes).map(Ok::<Token, HighlightError>)))
    }
}

/// Lazily cuts classified source into tokens of uniform classification
struct ClassifiedTokens {
    source: String,
    classes: Vec<HighlightId>,
    pos: usize,
}

impl ClassifiedTokens {
    fn new(source: String, classes: Vec<HighlightId>) -> Self {
        Self {
            source,
            classes,
            pos: 0,
        }
    }
}

impl Iterator for ClassifiedTokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = self.pos;
        if start >= self.source.len() {
            return None;
        }

        let class = self.classes[start];
        let mut end = start + 1;
        // Only break runs on char boundaries
        while end < self.source.len()
            && (self.classes[end] == class || !self.source.is_char_boundary(end))
        {
            end += 1;
        }
        self.pos = end;

        let highlight = (class != UNCLASSIFIED).then_some(class);
        Some(Token::new(highlight, &self.source[start..end]))
    }
}
