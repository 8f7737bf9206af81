use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;

use token_highlight::cli::{CliArgs, Input};
use token_highlight::config::HighlightConfig;
use token_highlight::theme::Theme;
use token_highlight::{Highlighter, HighlightedFile};

fn highlight_input(
    highlighter: &Highlighter,
    input: &Input,
    language: Option<&str>,
) -> Result<HighlightedFile> {
    let name = input.name();
    match input {
        Input::Stdin => {
            // Unknown length; the engine's own buffer limit still applies
            let stdin = io::stdin().lock();
            Ok(highlighter.highlight_stream(&name, language, stdin, 0)?)
        }
        Input::File(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            let size = file
                .metadata()
                .with_context(|| format!("failed to stat {}", path.display()))?
                .len();
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            highlighter
                .highlight_stream(&name, language, file, size)
                .with_context(|| format!("failed to highlight {}", path.display()))
        }
    }
}

fn main() -> Result<()> {
    token_highlight::tracing::init();

    let args = CliArgs::parse();
    let config = HighlightConfig::load();
    let highlighter = Highlighter::from_config(config).context("invalid configuration")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.css {
        out.write_all(Theme::github().stylesheet().as_bytes())?;
    }

    let inputs = args.inputs();
    let with_headers = inputs.len() > 1;
    for input in &inputs {
        let file = highlight_input(&highlighter, input, args.language.as_deref())?;
        tracing::info!(
            "{}: {} lines ({})",
            input.name(),
            file.lines.len(),
            if file.language.is_empty() { "not highlighted" } else { file.language.as_str() }
        );

        if with_headers {
            writeln!(out, "<!-- {} -->", input.name())?;
        }
        for line in &file.lines {
            out.write_all(line.as_bytes())?;
        }
    }

    out.flush()?;
    Ok(())
}
