//! Token stream for the fallback grammar
//!
//! Classifies everything as unclassified text. Unlike the tree-sitter
//! grammars it never holds more than one block of the source in memory.

use std::io::{ErrorKind, Read};

use super::highlights::Token;
use crate::error::{HighlightError, Result};

/// Block-by-block reader emitting one unclassified token per decoded block
pub struct PlainTextStream<'a> {
    source: &'a mut dyn Read,
    /// Primer first, then any bytes of a UTF-8 sequence split across blocks
    pending: Vec<u8>,
    block: Vec<u8>,
    read_total: usize,
    done: bool,
}

impl<'a> PlainTextStream<'a> {
    pub fn new(primer: &[u8], source: &'a mut dyn Read, block_size: usize) -> Self {
        Self {
            source,
            pending: primer.to_vec(),
            block: vec![0; block_size.max(1)],
            read_total: primer.len(),
            done: false,
        }
    }
}

impl Iterator for PlainTextStream<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                if self.pending.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut self.pending);
                return Some(Ok(Token::text(String::from_utf8_lossy(&rest))));
            }

            if let Some(text) = take_decodable(&mut self.pending) {
                return Some(Ok(Token::text(text)));
            }

            match self.source.read(&mut self.block) {
                Ok(0) => self.done = true,
                Ok(n) => {
                    self.read_total += n;
                    self.pending.extend_from_slice(&self.block[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    self.pending.clear();
                    return Some(Err(HighlightError::source_read(self.read_total, e)));
                }
            }
        }
    }
}

/// Drain the longest decodable prefix of `pending`.
///
/// An incomplete multi-byte sequence at the end stays behind for the next
/// block; invalid sequences are replaced.
fn take_decodable(pending: &mut Vec<u8>) -> Option<String> {
    let end = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) => match e.error_len() {
            Some(len) => e.valid_up_to() + len,
            None => e.valid_up_to(),
        },
    };
    if end == 0 {
        return None;
    }

    let text = String::from_utf8_lossy(&pending[..end]).into_owned();
    pending.drain(..end);
    Some(text)
}
