//! Fixed syntax theme for rendered fragments
//!
//! The formatter only emits class names; colors live in a stylesheet built
//! from a YAML theme embedded at compile time.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;

pub const GITHUB_YAML: &str = include_str!("../themes/github.yaml");

/// Selector every rule is scoped under
pub const SCOPE_CLASS: &str = "chroma";

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        if !s.is_ascii() {
            return Err(format!("Invalid color format: {}", s));
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string());
        match s.len() {
            6 => Ok(Color {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            }),
            8 => Ok(Color {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }

    /// CSS color value
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f32 / 255.0
            )
        }
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub background: String,
    pub foreground: String,
    #[serde(default)]
    pub styles: BTreeMap<String, StyleData>,
}

/// Style of one CSS class (raw strings from YAML)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleData {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// Resolved style of one CSS class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    fn declarations(&self) -> String {
        let mut decls = Vec::new();
        if let Some(color) = self.color {
            decls.push(format!("color: {}", color.to_css()));
        }
        if let Some(background) = self.background {
            decls.push(format!("background-color: {}", background.to_css()));
        }
        if self.bold {
            decls.push("font-weight: bold".to_string());
        }
        if self.italic {
            decls.push("font-style: italic".to_string());
        }
        decls.join("; ")
    }
}

/// Resolved theme with parsed colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub foreground: Color,
    /// CSS class to style, ordered by class name
    pub styles: BTreeMap<String, Style>,
}

impl Theme {
    /// Load theme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let data: ThemeData =
            serde_yaml::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
        Self::from_data(data)
    }

    /// Convert raw theme data to resolved theme
    pub fn from_data(data: ThemeData) -> Result<Self, String> {
        let mut styles = BTreeMap::new();
        for (class, raw) in data.styles {
            let style = Style {
                color: raw.color.as_deref().map(Color::from_hex).transpose()?,
                background: raw.background.as_deref().map(Color::from_hex).transpose()?,
                bold: raw.bold,
                italic: raw.italic,
            };
            styles.insert(class, style);
        }

        Ok(Theme {
            name: data.name,
            background: Color::from_hex(&data.background)?,
            foreground: Color::from_hex(&data.foreground)?,
            styles,
        })
    }

    /// The built-in GitHub theme (YAML-backed with Rust fallback)
    pub fn github() -> Self {
        match Theme::from_yaml(GITHUB_YAML) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::error!("Embedded theme failed to parse: {}", e);
                Theme {
                    name: "GitHub".to_string(),
                    background: Color::rgb(0xFF, 0xFF, 0xFF),
                    foreground: Color::rgb(0x24, 0x29, 0x2E),
                    styles: BTreeMap::new(),
                }
            }
        }
    }

    pub fn style(&self, class: &str) -> Option<&Style> {
        self.styles.get(class)
    }

    /// CSS rules for every class the formatter can emit, scoped under
    /// `.chroma`
    pub fn stylesheet(&self) -> String {
        let mut css = String::new();
        let _ = writeln!(
            css,
            ".{} {{ color: {}; background-color: {}; }}",
            SCOPE_CLASS,
            self.foreground.to_css(),
            self.background.to_css()
        );
        for (class, style) in &self.styles {
            let decls = style.declarations();
            if decls.is_empty() {
                continue;
            }
            let _ = writeln!(css, ".{} .{} {{ {}; }}", SCOPE_CLASS, class, decls);
        }
        css
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::github()
    }
}
