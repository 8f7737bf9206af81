//! Highlighting entry points
//!
//! ```text
//! highlight_text:   size check → resolve → tokenise → format_document
//! highlight_stream: size check → ReadFull → resolve (sniff on miss)
//!                   → open_stream → LineGroups → format per line
//! ```
//!
//! The whole-string path never fails: any problem yields escaped text and an
//! empty language name. The streaming path degrades when the grammar can't
//! stream or the stream outgrows the size limit; other failures propagate
//! and partial output is dropped.

use std::io::{Cursor, Read};
use std::sync::{Arc, OnceLock};

use crate::config::HighlightConfig;
use crate::error::{HighlightError, Result};
use crate::format::{escape_html, HtmlFormatter};
use crate::lines::LineGroups;
use crate::plain::escape_plain;
use crate::read_ahead::{ReadFull, ShortRead};
use crate::resolver::{display_name, GrammarResolver};
use crate::syntax::{GrammarHandle, LexingEngine, TreeSitterEngine};

/// A highlighted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub html: String,
    /// Display name of the grammar used, empty when not highlighted
    pub language: String,
}

/// A highlighted stream, one fragment per source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedFile {
    /// Each entry keeps its line's trailing `\n` when it had one
    pub lines: Vec<String>,
    /// Display name of the grammar used, empty when not highlighted
    pub language: String,
}

impl HighlightedFile {
    fn plain(lines: Vec<String>) -> Self {
        Self {
            lines,
            language: String::new(),
        }
    }
}

static GLOBAL: OnceLock<Highlighter> = OnceLock::new();

/// Highlighting context: configuration, grammar resolver and formatter
pub struct Highlighter<E = TreeSitterEngine> {
    config: HighlightConfig,
    resolver: GrammarResolver<E>,
    formatter: HtmlFormatter,
}

impl Highlighter<TreeSitterEngine> {
    /// Build with the bundled tree-sitter grammars
    pub fn from_config(config: HighlightConfig) -> Result<Self> {
        let engine = TreeSitterEngine::new().with_stream_limit(config.size_limit);
        Self::new(config, engine)
    }

    /// Process-wide instance, built from the user's config on first use.
    ///
    /// # Panics
    ///
    /// If the configuration can't produce a highlighter. There is nothing
    /// a caller could do to recover from that.
    pub fn global() -> &'static Highlighter {
        GLOBAL.get_or_init(|| {
            let config = HighlightConfig::load();
            Highlighter::from_config(config)
                .unwrap_or_else(|e| panic!("highlighter initialization failed: {}", e))
        })
    }
}

impl<E: LexingEngine> Highlighter<E> {
    pub fn new(config: HighlightConfig, engine: E) -> Result<Self> {
        Self::with_shared_engine(config, Arc::new(engine))
    }

    /// Build around an engine that is also used elsewhere
    pub fn with_shared_engine(config: HighlightConfig, engine: Arc<E>) -> Result<Self> {
        config.validate().map_err(HighlightError::Initialization)?;
        let resolver = GrammarResolver::new(engine, config.mapping.clone(), config.cache_capacity)?;

        Ok(Self {
            config,
            resolver,
            formatter: HtmlFormatter::new(),
        })
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn resolver(&self) -> &GrammarResolver<E> {
        &self.resolver
    }

    pub fn engine(&self) -> &E {
        self.resolver.engine()
    }

    /// Highlight a complete document.
    ///
    /// One trailing `\n` is dropped from the markup. Empty input (or a lone
    /// `\n`) gives `"\n"` without resolving a grammar.
    pub fn highlight_text(&self, filename: &str, language: Option<&str>, code: &str) -> Highlighted {
        if code.len() > self.config.size_limit {
            tracing::debug!(
                "{}: {} bytes exceeds the {} byte limit, not highlighting",
                filename,
                code.len(),
                self.config.size_limit
            );
            return Highlighted {
                html: escape_html(code),
                language: String::new(),
            };
        }

        if code.is_empty() || code == "\n" {
            return Highlighted {
                html: "\n".to_string(),
                language: String::new(),
            };
        }

        let sniff = &code.as_bytes()[..code.len().min(self.config.block_size)];
        let grammar = self.resolver.resolve(filename, language, Some(sniff));

        match self.render_document(&grammar, code) {
            Ok(html) => Highlighted {
                html,
                language: display_name(&grammar),
            },
            Err(e) => {
                tracing::error!("{}: {}", filename, e);
                Highlighted {
                    html: escape_html(code),
                    language: String::new(),
                }
            }
        }
    }

    /// Format a document with an already resolved grammar, degrading to
    /// escaped text when it can't be tokenised
    pub fn highlight_with_grammar(&self, grammar: &GrammarHandle, code: &str) -> String {
        self.render_document(grammar, code).unwrap_or_else(|e| {
            tracing::error!("{:?}: {}", grammar, e);
            escape_html(code)
        })
    }

    fn render_document(&self, grammar: &GrammarHandle, code: &str) -> Result<String> {
        let tokens = self.engine().tokenise(grammar, code)?;
        self.formatter.format_document(&tokens)
    }

    /// Highlight a byte stream line by line.
    ///
    /// `declared_size` is the caller's idea of the stream length; anything
    /// above the size limit is escaped without being scanned. A stream that
    /// turns out larger than the limit while scanning is escaped too. On
    /// error no lines are returned.
    pub fn highlight_stream<R: Read>(
        &self,
        filename: &str,
        language: Option<&str>,
        reader: R,
        declared_size: usize,
    ) -> Result<HighlightedFile> {
        if declared_size > self.config.size_limit {
            tracing::debug!(
                "{}: declared size {} exceeds the {} byte limit, not highlighting",
                filename,
                declared_size,
                self.config.size_limit
            );
            return Ok(HighlightedFile::plain(escape_plain(reader)?));
        }

        let mut reader = ReadFull::new(reader);
        let (grammar, primer) = match self.resolver.resolve_declared(filename, language) {
            Some(grammar) => (grammar, Vec::new()),
            None => {
                let mut window = vec![0u8; self.config.block_size];
                let n = reader
                    .read_full(&mut window)
                    .map_err(|ShortRead { read, source }| HighlightError::source_read(read, source))?;
                window.truncate(n);
                let grammar = self.resolver.resolve_detected(filename, Some(&window));
                (grammar, window)
            }
        };

        match self.scan_lines(&grammar, &primer, &mut reader, declared_size) {
            Ok(lines) => Ok(HighlightedFile {
                lines,
                language: display_name(&grammar),
            }),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}: {}, escaping instead", filename, e);
                let head = match e {
                    HighlightError::TooLarge { buffered, .. } => buffered,
                    _ => primer,
                };
                let rest = Cursor::new(head).chain(reader);
                Ok(HighlightedFile::plain(escape_plain(rest)?))
            }
            Err(e) => Err(e),
        }
    }

    fn scan_lines(
        &self,
        grammar: &GrammarHandle,
        primer: &[u8],
        source: &mut dyn Read,
        declared_size: usize,
    ) -> Result<Vec<String>> {
        let tokens = self.engine().open_stream(
            grammar,
            primer,
            source,
            self.config.block_size,
            declared_size,
        )?;

        let mut lines = Vec::new();
        for line in LineGroups::new(tokens) {
            let line = line?;
            lines.push(self.formatter.format(&line.tokens)?);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn highlighter() -> Highlighter {
        Highlighter::from_config(HighlightConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_initialization_error() {
        let config = HighlightConfig {
            cache_capacity: 0,
            ..HighlightConfig::default()
        };
        assert!(matches!(
            Highlighter::from_config(config),
            Err(HighlightError::Initialization(_))
        ));
    }

    #[test]
    fn test_rust_document() {
        let out = highlighter().highlight_text("a.rs", None, "fn main() {}\n");
        assert_eq!(out.language, "Rust");
        assert!(out.html.starts_with("<span class=\"k\">fn</span>"));
        assert!(!out.html.ends_with('\n'));
    }

    #[test]
    fn test_degenerate_documents() {
        let hl = highlighter();
        for code in ["", "\n"] {
            let out = hl.highlight_text("a.rs", None, code);
            assert_eq!(out.html, "\n");
            assert_eq!(out.language, "");
        }
        assert!(hl.resolver().cache().is_empty());
    }

    #[test]
    fn test_oversized_document_is_escaped() {
        let config = HighlightConfig {
            size_limit: 8,
            ..HighlightConfig::default()
        };
        let hl = Highlighter::from_config(config).unwrap();
        let out = hl.highlight_text("a.rs", None, "fn x() -> u8 { 1 }");
        assert_eq!(out.language, "");
        assert_eq!(out.html, "fn x() -&gt; u8 { 1 }");
    }

    #[test]
    fn test_plaintext_document() {
        let out = highlighter().highlight_text("notes.unknown", None, "a < b\n");
        assert_eq!(out.language, "Plaintext");
        assert_eq!(out.html, "a &lt; b");
    }

    #[test]
    fn test_highlight_with_grammar() {
        let hl = highlighter();
        let rust = hl.engine().get_by_name("rust").unwrap();
        let html = hl.highlight_with_grammar(&rust, "let x = 1;\n");
        assert!(html.contains("<span class=\"k\">let</span>"));

        let unknown = GrammarHandle::new("Cobol");
        assert_eq!(hl.highlight_with_grammar(&unknown, "<x>"), "&lt;x&gt;");
    }

    #[test]
    fn test_stream_lines() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let out = highlighter()
            .highlight_stream("main.rs", None, code.as_bytes(), code.len())
            .unwrap();
        assert_eq!(out.language, "Rust");
        assert_eq!(out.lines.len(), 3);
        assert!(out.lines.iter().all(|line| line.ends_with('\n')));
    }

    #[test]
    fn test_stream_sniffs_content() {
        let code = "#!/usr/bin/env python3\nprint('x')\n";
        let out = highlighter()
            .highlight_stream("tool", None, code.as_bytes(), code.len())
            .unwrap();
        assert_eq!(out.language, "Python");
        assert_eq!(out.lines.len(), 2);
    }

    #[test]
    fn test_stream_over_declared_limit() {
        let out = highlighter()
            .highlight_stream("a.rs", None, "<b>\n".as_bytes(), 2 * 1024 * 1024)
            .unwrap();
        assert_eq!(out.language, "");
        assert_eq!(out.lines, vec!["&lt;b&gt;\n"]);
    }

    #[test]
    fn test_stream_read_failure_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let source = "partial".as_bytes().chain(Broken);
        let err = highlighter()
            .highlight_stream("notes.unknown", None, source, 100)
            .unwrap_err();
        assert!(matches!(err, HighlightError::SourceRead { read: 7, .. }));
    }

    #[test]
    fn test_highlighter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Highlighter>();
    }
}
