//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use token_highlight::error::{HighlightError, Result};
use token_highlight::syntax::{
    highlight_id_for_name, GrammarHandle, LexingEngine, Token, TokenStream, FALLBACK_GRAMMAR,
};
use token_highlight::{HighlightConfig, Highlighter};

/// Grammar the mock engine knows but can't stream
pub const NO_STREAM: &str = "nostream";

const GRAMMARS: &[&str] = &["rust", "python", NO_STREAM, FALLBACK_GRAMMAR];

/// Call counters for every engine capability
#[derive(Debug, Default)]
pub struct Calls {
    pub get_by_name: AtomicUsize,
    pub match_by_filename: AtomicUsize,
    pub guess_language: AtomicUsize,
    pub tokenise: AtomicUsize,
    pub open_stream: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Calls made by grammar resolution
    pub fn resolution(&self) -> usize {
        Self::get(&self.get_by_name)
            + Self::get(&self.match_by_filename)
            + Self::get(&self.guess_language)
    }

    pub fn total(&self) -> usize {
        self.resolution() + Self::get(&self.tokenise) + Self::get(&self.open_stream)
    }
}

/// Tiny engine: `fn`, `def` and `let` are keywords, everything else is
/// unclassified. Streams are cut into `block_size` chunks.
#[derive(Debug, Default)]
pub struct CountingEngine {
    pub calls: Calls,
}

impl CountingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Split into words and separators, classifying keywords
pub fn toy_tokens(code: &str) -> Vec<Token> {
    let keyword = highlight_id_for_name("keyword");
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word = false;

    let flush = |tokens: &mut Vec<Token>, text: &str, word: bool| {
        if text.is_empty() {
            return;
        }
        let class = if word && matches!(text, "fn" | "def" | "let") {
            keyword
        } else {
            None
        };
        tokens.push(Token::new(class, text));
    };

    for (i, ch) in code.char_indices() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if i > start && is_word != in_word {
            flush(&mut tokens, &code[start..i], in_word);
            start = i;
        }
        in_word = is_word;
    }
    flush(&mut tokens, &code[start..], in_word);
    tokens
}

impl LexingEngine for CountingEngine {
    fn get_by_name(&self, name: &str) -> Option<GrammarHandle> {
        bump(&self.calls.get_by_name);
        let name = name.to_lowercase();
        GRAMMARS
            .iter()
            .find(|g| **g == name)
            .map(|g| GrammarHandle::new(*g))
    }

    fn match_by_filename(&self, filename: &str) -> Option<GrammarHandle> {
        bump(&self.calls.match_by_filename);
        let name = if filename.ends_with(".rs") {
            "rust"
        } else if filename.ends_with(".py") {
            "python"
        } else if filename.ends_with(".ns") {
            NO_STREAM
        } else {
            return None;
        };
        Some(GrammarHandle::new(name))
    }

    fn guess_language(&self, _filename: &str, sniff: &[u8]) -> Option<String> {
        bump(&self.calls.guess_language);
        sniff
            .starts_with(b"#!/usr/bin/env python")
            .then(|| "python".to_string())
    }

    fn fallback_grammar(&self) -> GrammarHandle {
        GrammarHandle::new(FALLBACK_GRAMMAR)
    }

    fn tokenise(&self, grammar: &GrammarHandle, code: &str) -> Result<Vec<Token>> {
        bump(&self.calls.tokenise);
        if grammar.name() == NO_STREAM {
            return Err(HighlightError::Scan("nostream can't tokenise".to_string()));
        }
        Ok(toy_tokens(code))
    }

    fn open_stream<'a>(
        &'a self,
        grammar: &GrammarHandle,
        primer: &[u8],
        source: &'a mut dyn Read,
        block_size: usize,
        _declared_size: usize,
    ) -> Result<TokenStream<'a>> {
        bump(&self.calls.open_stream);
        if grammar.name() == NO_STREAM {
            return Err(HighlightError::Unsupported(grammar.name().to_string()));
        }
        Ok(Box::new(ChunkStream {
            primer: Some(primer.to_vec()),
            source,
            block_size,
            read: 0,
            done: false,
        }))
    }
}

/// Yields the primer, then one unclassified token per block read
struct ChunkStream<'a> {
    primer: Option<Vec<u8>>,
    source: &'a mut dyn Read,
    block_size: usize,
    read: usize,
    done: bool,
}

impl Iterator for ChunkStream<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(primer) = self.primer.take() {
            if !primer.is_empty() {
                self.read += primer.len();
                return Some(Ok(Token::text(String::from_utf8_lossy(&primer))));
            }
        }
        if self.done {
            return None;
        }

        let mut block = vec![0u8; self.block_size];
        match self.source.read(&mut block) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                self.read += n;
                Some(Ok(Token::text(String::from_utf8_lossy(&block[..n]))))
            }
            Err(e) => {
                self.done = true;
                Some(Err(HighlightError::source_read(self.read, e)))
            }
        }
    }
}

/// Highlighter over a shared counting engine
pub fn counting_highlighter(
    config: HighlightConfig,
) -> (Highlighter<CountingEngine>, Arc<CountingEngine>) {
    let engine = CountingEngine::new();
    let highlighter = Highlighter::with_shared_engine(config, Arc::clone(&engine))
        .expect("valid test config");
    (highlighter, engine)
}

/// Reader that yields `data` then fails
pub struct FailingReader {
    data: io::Cursor<Vec<u8>>,
}

impl FailingReader {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: io::Cursor::new(data.to_vec()),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        }
        Ok(n)
    }
}

/// Reader that hands out at most one byte per call
pub struct ByteAtATime<R>(pub R);

impl<R: Read> Read for ByteAtATime<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.0.read(&mut buf[..1])
    }
}
