//! Syntax highlighting data structures
//!
//! Defines capture names, tokens, and per-line token groups.

/// Capture names understood by the formatter and the Chroma-style CSS class
/// each renders with. Position in the table is the [`HighlightId`].
///
/// Captures not listed here fall back to their nearest dotted parent, so
/// `comment.documentation` renders as `comment`.
pub const HIGHLIGHTS: &[(&str, &str)] = &[
    ("attribute", "nd"),
    ("boolean", "kc"),
    ("comment", "c"),
    ("constant", "no"),
    ("constant.builtin", "kc"),
    ("constructor", "nc"),
    ("escape", "se"),
    ("function", "nf"),
    ("function.builtin", "nb"),
    ("function.macro", "fm"),
    ("function.method", "nf"),
    ("keyword", "k"),
    ("keyword.return", "k"),
    ("keyword.function", "kd"),
    ("keyword.operator", "ow"),
    ("label", "nl"),
    ("number", "m"),
    ("operator", "o"),
    ("property", "py"),
    ("punctuation", "p"),
    ("punctuation.bracket", "p"),
    ("punctuation.delimiter", "p"),
    ("punctuation.special", "p"),
    ("string", "s"),
    ("string.special", "sr"),
    ("tag", "nt"),
    ("tag.attribute", "na"),
    ("type", "kt"),
    ("type.builtin", "kt"),
    ("variable", "nv"),
    ("variable.builtin", "bp"),
    ("variable.parameter", "nv"),
];

/// Index into [`HIGHLIGHTS`]
pub type HighlightId = u16;

/// Look up highlight ID by capture name
pub fn highlight_id_for_name(name: &str) -> Option<HighlightId> {
    let mut current = name;
    loop {
        if let Some(pos) = HIGHLIGHTS.iter().position(|&(n, _)| n == current) {
            return Some(pos as HighlightId);
        }
        // "keyword.control.import" -> "keyword.control" -> "keyword"
        current = &current[..current.rfind('.')?];
    }
}

/// CSS class used when rendering a highlight
pub fn css_class(id: HighlightId) -> Option<&'static str> {
    HIGHLIGHTS.get(id as usize).map(|&(_, class)| class)
}

/// A classified fragment of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Index into [`HIGHLIGHTS`], `None` for unclassified text
    pub highlight: Option<HighlightId>,
    /// Source text covered by this token
    pub text: String,
}

impl Token {
    pub fn new(highlight: Option<HighlightId>, text: impl Into<String>) -> Self {
        Self {
            highlight,
            text: text.into(),
        }
    }

    /// Unclassified text
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(None, text)
    }

    /// Split after the first line terminator.
    ///
    /// Returns `(head, tail)` where `head` ends with `\n` and both carry this
    /// token's classification. `None` if the text contains no terminator.
    pub fn split_line(&self) -> Option<(Token, Token)> {
        let end = self.text.find('\n')? + 1;
        let (head, tail) = self.text.split_at(end);
        Some((
            Token::new(self.highlight, head),
            Token::new(self.highlight, tail),
        ))
    }
}

/// Tokens forming exactly one source line, terminator included when present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineGroup {
    pub tokens: Vec<Token>,
}

impl LineGroup {
    /// Concatenated text of the line
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// True if no token carries any text
    pub fn is_blank(&self) -> bool {
        self.tokens.iter().all(|t| t.text.is_empty())
    }
}
