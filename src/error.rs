//! Error types for the highlighting pipeline
//!
//! The whole-string path never surfaces these to callers (it degrades to
//! escaped plain text); the streaming path propagates them because a partial
//! line list would corrupt downstream rendering.

use thiserror::Error;

/// Errors produced while resolving, scanning, or formatting source text
#[derive(Debug, Error)]
pub enum HighlightError {
    /// The lexing engine rejected or could not tokenize the input
    #[error("can't tokenize code: {0}")]
    Scan(String),

    /// The formatter rejected a token sequence
    #[error("can't format code: {0}")]
    Format(String),

    /// The resolved grammar cannot scan a stream
    #[error("grammar {0:?} does not support streaming")]
    Unsupported(String),

    /// The stream grew past the size limit while being buffered. `buffered`
    /// holds every byte taken from the source so far.
    #[error("source exceeds the {limit} byte size limit")]
    TooLarge { limit: usize, buffered: Vec<u8> },

    /// The byte source failed after `read` bytes were consumed
    #[error("failed to read source after {read} bytes: {source}")]
    SourceRead {
        read: usize,
        #[source]
        source: std::io::Error,
    },

    /// Invalid construction parameters (fatal, not a per-request condition)
    #[error("failed to initialize highlighter: {0}")]
    Initialization(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HighlightError>;

impl HighlightError {
    /// Wrap an I/O failure that happened after `read` bytes were consumed
    pub fn source_read(read: usize, source: std::io::Error) -> Self {
        HighlightError::SourceRead { read, source }
    }

    /// Whether this failure should degrade to plain text rather than propagate
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HighlightError::Unsupported(_) | HighlightError::TooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_read_message_includes_byte_count() {
        let err = HighlightError::source_read(
            42,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        let msg = err.to_string();
        assert!(msg.contains("42"), "got: {}", msg);
        assert!(msg.contains("pipe closed"), "got: {}", msg);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(HighlightError::Unsupported("xml".into()).is_recoverable());
        let too_large = HighlightError::TooLarge {
            limit: 4,
            buffered: b"12345".to_vec(),
        };
        assert!(too_large.is_recoverable());
        assert_eq!(too_large.to_string(), "source exceeds the 4 byte size limit");
        assert!(!HighlightError::Scan("bad".into()).is_recoverable());
        assert!(!HighlightError::Format("bad".into()).is_recoverable());
    }
}
