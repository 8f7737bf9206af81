//! Plain-text fallback rendering

use std::io::{BufRead, BufReader, Read};

use crate::error::{HighlightError, Result};
use crate::format::escape_html;

/// Split a byte source into `\n`-terminated lines and escape each one.
///
/// The terminator stays with its line; a final line without one is kept as
/// is. Invalid UTF-8 is replaced rather than rejected. A read failure fails
/// the whole call so callers never see a silently truncated listing.
pub fn escape_plain<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::with_capacity(256);
    let mut consumed = 0usize;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| HighlightError::source_read(consumed + buf.len(), e))?;
        if n == 0 {
            break;
        }
        consumed += n;
        lines.push(escape_html(&String::from_utf8_lossy(&buf)));
    }

    Ok(lines)
}
