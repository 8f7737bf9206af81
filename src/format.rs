//! HTML fragment rendering
//!
//! Output is bare markup: no `<pre>` wrapper, no line numbers, no inline
//! styles. Classified tokens become `<span class="…">` elements whose class
//! names match [`Theme::stylesheet`](crate::theme::Theme::stylesheet).

use std::fmt::Write as _;

use crate::error::{HighlightError, Result};
use crate::syntax::{css_class, Token};

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(ch),
        }
    }
}

/// Renders token sequences as class-annotated HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormatter;

impl HtmlFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render one line (or any token run) exactly, terminator included
    pub fn format(&self, tokens: &[Token]) -> Result<String> {
        let len: usize = tokens.iter().map(|t| t.text.len()).sum();
        let mut out = String::with_capacity(len * 2);

        for token in tokens {
            if token.text.is_empty() {
                continue;
            }
            match token.highlight {
                None => push_escaped(&mut out, &token.text),
                Some(id) => {
                    let class = css_class(id).ok_or_else(|| {
                        HighlightError::Format(format!("no style for highlight {}", id))
                    })?;
                    // Writing into a String can't fail
                    let _ = write!(out, "<span class=\"{}\">", class);
                    push_escaped(&mut out, &token.text);
                    out.push_str("</span>");
                }
            }
        }

        Ok(out)
    }

    /// Render a whole document, dropping one trailing line terminator
    pub fn format_document(&self, tokens: &[Token]) -> Result<String> {
        let mut html = self.format(tokens)?;
        strip_trailing_newline(&mut html);
        Ok(html)
    }
}

/// Remove a single trailing `\n`. Closing tags may follow it when the last
/// token ends with the terminator, in which case it is cut from inside.
fn strip_trailing_newline(html: &mut String) {
    if html.ends_with('\n') {
        html.pop();
        return;
    }
    if html.ends_with("\n</span>") {
        let cut = html.len() - "\n</span>".len();
        html.replace_range(cut..cut + 1, "");
        // A span that held only the terminator is now empty
        if let Some(start) = html[..cut].rfind("<span class=\"") {
            let tag_end = html[start..].find('>').map(|i| start + i + 1);
            if tag_end == Some(cut) {
                html.truncate(start);
            }
        }
    }
}
