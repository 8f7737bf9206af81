//! Content-based language guessing
//!
//! Used when neither an explicit language nor a mapped extension is
//! available. Looks at the filename, an interpreter line, document
//! markers, and editor modelines in a small prefix of the content.

use std::path::Path;

use super::languages::LanguageId;

/// Guess the language of `sniff`, a prefix of the file's content.
///
/// Returns the grammar name, or `None` when nothing conclusive was found.
/// Binary content (any NUL byte in the window) is never guessed.
pub fn guess_language(filename: &str, sniff: &[u8]) -> Option<&'static str> {
    let by_path = LanguageId::from_path(Path::new(filename));
    if by_path.has_highlighting() {
        return Some(by_path.name());
    }

    if sniff.contains(&0) {
        return None;
    }

    let text = String::from_utf8_lossy(sniff);
    let first_line = text.lines().next().unwrap_or("");

    from_shebang(first_line)
        .or_else(|| from_markers(&text))
        .or_else(|| from_modeline(&text))
        .map(|lang| lang.name())
}

/// `#!/usr/bin/env python3` style interpreter lines
fn from_shebang(line: &str) -> Option<LanguageId> {
    let rest = line.strip_prefix("#!")?;
    let mut parts = rest.split_whitespace();
    let mut interpreter = parts.next()?.rsplit('/').next()?;
    if interpreter == "env" {
        // Skip env flags such as `-S`
        interpreter = parts.find(|p| !p.starts_with('-'))?;
    }

    let base = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    let lang = match base {
        "python" | "pypy" => LanguageId::Python,
        "sh" | "bash" | "zsh" | "ksh" | "dash" | "ash" => LanguageId::Bash,
        "php" => LanguageId::Php,
        "racket" | "guile" | "scheme" | "csi" => LanguageId::Scheme,
        "rust-script" => LanguageId::Rust,
        _ => return None,
    };
    Some(lang)
}

/// Unambiguous document openers
fn from_markers(text: &str) -> Option<LanguageId> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?php") {
        Some(LanguageId::Php)
    } else if trimmed.starts_with("<?xml") {
        Some(LanguageId::Xml)
    } else if trimmed.starts_with("#lang racket") {
        Some(LanguageId::Scheme)
    } else {
        None
    }
}

/// Vim (`vim: set ft=rust:`) and Emacs (`-*- mode: python -*-`) modelines
fn from_modeline(text: &str) -> Option<LanguageId> {
    for line in text.lines().take(5) {
        if let Some(idx) = line.find("-*-") {
            let inner = &line[idx + 3..];
            let inner = inner.split("-*-").next().unwrap_or(inner);
            for field in inner.split(';') {
                let field = field.trim();
                let value = field
                    .strip_prefix("mode:")
                    .map(str::trim)
                    .unwrap_or(if field.contains(':') { "" } else { field });
                if let Some(lang) = LanguageId::from_name(value) {
                    return Some(lang).filter(LanguageId::has_highlighting);
                }
            }
        }

        for key in ["ft=", "filetype=", "syntax="] {
            if line.contains("vim:") || line.contains("vi:") {
                if let Some(idx) = line.find(key) {
                    let value: String = line[idx + key.len()..]
                        .chars()
                        .take_while(|c| c.is_ascii_alphanumeric() || *c == '+')
                        .collect();
                    if let Some(lang) = LanguageId::from_name(&value) {
                        return Some(lang).filter(LanguageId::has_highlighting);
                    }
                }
            }
        }
    }
    None
}
