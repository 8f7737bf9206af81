//! Line-oriented log scanner used as highlighting input.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

/// Severity parsed from the first field of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown level {other:?}")),
        }
    }
}

/* Counts are kept per level; lines that fail to parse
   are tallied separately. */
#[derive(Default)]
pub struct Summary {
    counts: BTreeMap<Level, usize>,
    rejected: usize,
}

impl Summary {
    pub fn scan<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut summary = Summary::default();
        for line in reader.lines() {
            let line = line?;
            let first = line.split_whitespace().next().unwrap_or("");
            match first.parse::<Level>() {
                Ok(level) => *summary.counts.entry(level).or_insert(0) += 1,
                Err(_) => summary.rejected += 1,
            }
        }
        Ok(summary)
    }

    pub fn worst(&self) -> Option<Level> {
        self.counts.keys().next_back().copied()
    }
}

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let summary = Summary::scan(stdin.lock())?;
    for (level, count) in &summary.counts {
        println!("{:>5?}: {}", level, count);
    }
    if summary.rejected > 0 {
        eprintln!("{} lines <unparsed> & skipped", summary.rejected);
    }
    Ok(())
}
