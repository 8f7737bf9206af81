//! Language identification and detection
//!
//! Maps names, aliases, file extensions, and well-known filenames to
//! language IDs.

use std::path::Path;

/// Supported language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    Rust,
    // Common languages
    Python,
    Go,
    Php,
    // Extended languages
    C,
    Cpp,
    Java,
    Bash,
    // Specialized languages
    Scheme,
    Ini,
    Xml,
}

impl LanguageId {
    /// Every language with a grammar, in registration order
    pub const HIGHLIGHTED: &'static [LanguageId] = &[
        LanguageId::Rust,
        LanguageId::Python,
        LanguageId::Go,
        LanguageId::Php,
        LanguageId::C,
        LanguageId::Cpp,
        LanguageId::Java,
        LanguageId::Bash,
        LanguageId::Scheme,
        LanguageId::Ini,
        LanguageId::Xml,
    ];

    /// Detect language from file extension (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => LanguageId::Rust,
            "py" | "pyw" | "pyi" => LanguageId::Python,
            "go" => LanguageId::Go,
            "php" | "phtml" | "php3" | "php4" | "php5" => LanguageId::Php,
            "c" | "h" => LanguageId::C,
            "cc" | "cpp" | "cxx" | "c++" | "hh" | "hpp" | "hxx" | "h++" => LanguageId::Cpp,
            "java" => LanguageId::Java,
            "sh" | "bash" | "zsh" | "ksh" | "ebuild" => LanguageId::Bash,
            "rkt" | "scm" | "ss" | "sld" => LanguageId::Scheme,
            "ini" | "cfg" | "inf" | "properties" | "desktop" => LanguageId::Ini,
            "xml" | "xsd" | "xsl" | "xslt" | "svg" | "rss" | "plist" | "csproj" => LanguageId::Xml,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from a file path: well-known names first, then extension
    pub fn from_path(path: &Path) -> Self {
        let by_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(Self::from_file_name)
            .unwrap_or_default();
        if by_name != LanguageId::PlainText {
            return by_name;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Detect language from a bare file name that has no telling extension
    fn from_file_name(name: &str) -> Self {
        match name {
            ".bashrc" | ".bash_profile" | ".bash_logout" | ".profile" | ".zshrc" | ".zprofile"
            | "PKGBUILD" | "APKBUILD" => LanguageId::Bash,
            ".gitconfig" | ".editorconfig" | ".npmrc" | "setup.cfg" => LanguageId::Ini,
            _ => LanguageId::PlainText,
        }
    }

    /// Look up a language by name or alias (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let lang = match name.trim().to_lowercase().as_str() {
            "rust" | "rs" => LanguageId::Rust,
            "python" | "python3" | "py" => LanguageId::Python,
            "go" | "golang" => LanguageId::Go,
            "php" | "php3" | "php4" | "php5" => LanguageId::Php,
            "c" => LanguageId::C,
            "c++" | "cpp" | "cxx" => LanguageId::Cpp,
            "java" => LanguageId::Java,
            "bash" | "sh" | "shell" | "zsh" | "ksh" => LanguageId::Bash,
            "scheme" | "racket" | "rkt" => LanguageId::Scheme,
            "ini" | "cfg" | "dosini" => LanguageId::Ini,
            "xml" => LanguageId::Xml,
            "fallback" | "plaintext" | "text" | "plain" | "txt" => LanguageId::PlainText,
            _ => return None,
        };
        Some(lang)
    }

    /// Raw grammar name. The plain-text grammar is the designated fallback.
    pub fn name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "fallback",
            LanguageId::Rust => "Rust",
            LanguageId::Python => "Python",
            LanguageId::Go => "Go",
            LanguageId::Php => "PHP",
            LanguageId::C => "C",
            LanguageId::Cpp => "C++",
            LanguageId::Java => "Java",
            LanguageId::Bash => "Bash",
            LanguageId::Scheme => "Scheme",
            LanguageId::Ini => "INI",
            LanguageId::Xml => "XML",
        }
    }

    /// Check if this language has syntax highlighting support
    pub fn has_highlighting(&self) -> bool {
        !matches!(self, LanguageId::PlainText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(LanguageId::from_extension("rs"), LanguageId::Rust);
        assert_eq!(LanguageId::from_extension("RS"), LanguageId::Rust);
        assert_eq!(LanguageId::from_extension("py"), LanguageId::Python);
        assert_eq!(LanguageId::from_extension("hpp"), LanguageId::Cpp);
        assert_eq!(LanguageId::from_extension("h"), LanguageId::C);
        assert_eq!(LanguageId::from_extension("svg"), LanguageId::Xml);
        assert_eq!(LanguageId::from_extension("txt"), LanguageId::PlainText);
        assert_eq!(LanguageId::from_extension("unknown"), LanguageId::PlainText);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(LanguageId::from_path(Path::new("main.rs")), LanguageId::Rust);
        assert_eq!(
            LanguageId::from_path(Path::new("/path/to/script.sh")),
            LanguageId::Bash
        );
        assert_eq!(
            LanguageId::from_path(Path::new("home/user/.bashrc")),
            LanguageId::Bash
        );
        assert_eq!(
            LanguageId::from_path(Path::new("repo/.editorconfig")),
            LanguageId::Ini
        );
        assert_eq!(
            LanguageId::from_path(Path::new("no_extension")),
            LanguageId::PlainText
        );
    }

    #[test]
    fn test_from_name_accepts_aliases() {
        assert_eq!(LanguageId::from_name("Rust"), Some(LanguageId::Rust));
        assert_eq!(LanguageId::from_name("golang"), Some(LanguageId::Go));
        assert_eq!(LanguageId::from_name("C++"), Some(LanguageId::Cpp));
        assert_eq!(LanguageId::from_name(" shell "), Some(LanguageId::Bash));
        assert_eq!(LanguageId::from_name("fallback"), Some(LanguageId::PlainText));
        assert_eq!(LanguageId::from_name("cobol"), None);
    }

    #[test]
    fn test_name_round_trips_through_from_name() {
        for &lang in LanguageId::HIGHLIGHTED {
            assert_eq!(LanguageId::from_name(lang.name()), Some(lang));
        }
        assert_eq!(
            LanguageId::from_name(LanguageId::PlainText.name()),
            Some(LanguageId::PlainText)
        );
    }

    #[test]
    fn test_has_highlighting() {
        assert!(LanguageId::Rust.has_highlighting());
        assert!(!LanguageId::PlainText.has_highlighting());
    }
}
