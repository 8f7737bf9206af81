//! Streaming token reassembly into lines
//!
//! Grammars emit tokens that may span several lines (block comments, string
//! literals) or end in the middle of one. [`LineGroups`] regroups a token
//! stream into one [`LineGroup`] per source line, splitting tokens at each
//! `\n` while keeping their classification.
//!
//! Invariants:
//! - Concatenating every group's text reproduces the input exactly.
//! - One group per `\n`, plus one for trailing content after the last `\n`.
//! - A clean end of input never produces an extra empty group.

use crate::error::Result;
use crate::syntax::{LineGroup, Token};

/// Lazy iterator of line groups over a token stream.
///
/// End of input is the token stream returning `None`. The first error from
/// the token stream is yielded once and ends iteration.
pub struct LineGroups<I> {
    tokens: I,
    /// Tokens of the current, incomplete line
    pending: Vec<Token>,
    /// Remainder of the last pulled token still to be split
    carry: Option<Token>,
    finished: bool,
}

impl<I> LineGroups<I>
where
    I: Iterator<Item = Result<Token>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            pending: Vec::with_capacity(5),
            carry: None,
            finished: false,
        }
    }

    fn take_line(&mut self) -> LineGroup {
        LineGroup {
            tokens: std::mem::replace(&mut self.pending, Vec::with_capacity(5)),
        }
    }
}

impl<I> Iterator for LineGroups<I>
where
    I: Iterator<Item = Result<Token>>,
{
    type Item = Result<LineGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.carry.take() {
                match token.split_line() {
                    Some((head, tail)) => {
                        self.pending.push(head);
                        self.carry = Some(tail);
                        return Some(Ok(self.take_line()));
                    }
                    None => {
                        if !token.text.is_empty() {
                            self.pending.push(token);
                        }
                    }
                }
            }

            if self.finished {
                return None;
            }

            match self.tokens.next() {
                Some(Ok(token)) => self.carry = Some(token),
                Some(Err(e)) => {
                    self.finished = true;
                    self.pending.clear();
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    let line = self.take_line();
                    if !line.is_blank() {
                        return Some(Ok(line));
                    }
                    return None;
                }
            }
        }
    }
}

impl<I> std::iter::FusedIterator for LineGroups<I> where I: Iterator<Item = Result<Token>> {}
