//! Grammar resolution
//!
//! Picks the grammar for a file, first match wins:
//!
//! 1. explicit language name (retrying the part before `?`)
//! 2. extension mapping from the configuration
//! 3. cached result of an earlier detection for the same filename
//! 4. content sniffing
//! 5. filename matching
//! 6. the fallback grammar
//!
//! Steps 1-3 are cheap and never cached. Steps 4-6 run only when the cheap
//! ones miss, and their outcome is cached by filename.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::LexerCache;
use crate::error::Result;
use crate::syntax::{GrammarHandle, LexingEngine, FALLBACK_GRAMMAR};

/// Display name of the fallback grammar
pub const PLAINTEXT_DISPLAY_NAME: &str = "Plaintext";

/// Extension of the final path component, dot included.
///
/// Both `/` and `\` separate components on every platform. `a/b.tar.gz`
/// gives `.gz`, `Makefile` gives `""`, `.bashrc` gives `.bashrc`.
pub fn file_extension(filename: &str) -> &str {
    let base = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match filename[base..].rfind('.') {
        Some(dot) => &filename[base + dot..],
        None => "",
    }
}

/// Normalize a mapping key to its dotted form (`tmpl` and `.tmpl` both
/// become `.tmpl`)
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Title-case each word without lowering the rest of it
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace() || ch == '-' || ch == '_';
    }
    out
}

/// Human-readable name of a grammar
pub fn display_name(grammar: &GrammarHandle) -> String {
    if grammar.name() == FALLBACK_GRAMMAR {
        return PLAINTEXT_DISPLAY_NAME.to_string();
    }
    title_case(grammar.name())
}

/// Resolves grammars against an engine, an extension mapping and a cache
pub struct GrammarResolver<E> {
    engine: Arc<E>,
    /// Dotted extension to language name
    mapping: HashMap<String, String>,
    cache: LexerCache,
}

impl<E: LexingEngine> GrammarResolver<E> {
    pub fn new(
        engine: Arc<E>,
        mapping: HashMap<String, String>,
        cache_capacity: usize,
    ) -> Result<Self> {
        let mapping = mapping
            .into_iter()
            .map(|(ext, lang)| (normalize_extension(&ext), lang))
            .collect();

        Ok(Self {
            engine,
            mapping,
            cache: LexerCache::new(cache_capacity)?,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn cache(&self) -> &LexerCache {
        &self.cache
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }

    /// Run the full resolution order
    pub fn resolve(
        &self,
        filename: &str,
        language: Option<&str>,
        sniff: Option<&[u8]>,
    ) -> GrammarHandle {
        match self.resolve_declared(filename, language) {
            Some(grammar) => grammar,
            None => self.resolve_detected(filename, sniff),
        }
    }

    /// Steps that need no content: explicit name, mapping, cache
    pub fn resolve_declared(&self, filename: &str, language: Option<&str>) -> Option<GrammarHandle> {
        if let Some(lang) = language.filter(|l| !l.is_empty()) {
            if let Some(grammar) = self.by_explicit_name(lang) {
                tracing::trace!("{}: {:?} from explicit language {:?}", filename, grammar, lang);
                return Some(grammar);
            }
        }

        let ext = file_extension(filename);
        if let Some(mapped) = self.mapping.get(ext) {
            if let Some(grammar) = self.engine.get_by_name(mapped) {
                tracing::trace!("{}: {:?} from mapping {} -> {}", filename, grammar, ext, mapped);
                return Some(grammar);
            }
        }

        let cached = self.cache.get(filename);
        if let Some(grammar) = &cached {
            tracing::trace!("{}: {:?} from cache", filename, grammar);
        }
        cached
    }

    /// Steps that inspect the content or the filename; the result is cached
    pub fn resolve_detected(&self, filename: &str, sniff: Option<&[u8]>) -> GrammarHandle {
        let guessed = sniff.and_then(|window| {
            let name = self.engine.guess_language(filename, window)?;
            self.engine.get_by_name(&name)
        });

        let grammar = if let Some(grammar) = guessed {
            tracing::trace!("{}: {:?} from content", filename, grammar);
            grammar
        } else if let Some(grammar) = self.engine.match_by_filename(filename) {
            tracing::trace!("{}: {:?} from filename", filename, grammar);
            grammar
        } else {
            tracing::trace!("{}: no match, using fallback grammar", filename);
            self.engine.fallback_grammar()
        };

        self.cache.put(filename, grammar.clone());
        grammar
    }

    fn by_explicit_name(&self, lang: &str) -> Option<GrammarHandle> {
        if let Some(grammar) = self.engine.get_by_name(lang) {
            return Some(grammar);
        }
        // Tolerate names carrying a query suffix, e.g. "rust?linenos"
        match lang.find('?') {
            Some(idx) if idx > 0 => self.engine.get_by_name(&lang[..idx]),
            _ => None,
        }
    }
}
