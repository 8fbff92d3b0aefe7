//! Memory-Access Trace Reader.
//!
//! A trace is a text file with one request per line:
//!
//! ```text
//! r ffe04540
//! w 0x1f0a
//! ```
//!
//! The first token is the operation (`r` or `w`), the second a hexadecimal byte
//! address with an optional `0x` prefix. Blank lines are skipped. Any other line is a
//! fatal [`TraceError`] carrying its 1-based line number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::common::data::{Access, AccessType};
use crate::common::error::TraceError;

/// Iterator over the requests of a trace.
#[derive(Debug)]
pub struct TraceReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub const fn line(&self) -> usize {
        self.line
    }
}

/// Parses one non-blank trace line.
///
/// # Errors
///
/// Returns [`TraceError::UnknownOp`], [`TraceError::BadAddress`] or
/// [`TraceError::Malformed`] for the corresponding defects.
pub fn parse_line(line: usize, text: &str) -> Result<Access, TraceError> {
    let mut tokens = text.split_whitespace();
    let (Some(op), Some(addr), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(TraceError::Malformed {
            line,
            text: text.trim().to_string(),
        });
    };

    let mut chars = op.chars();
    let op_type = match (chars.next(), chars.next()) {
        (Some(c), None) => AccessType::from_char(c),
        _ => None,
    }
    .ok_or_else(|| TraceError::UnknownOp {
        line,
        op: op.to_string(),
    })?;

    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    let addr = u32::from_str_radix(digits, 16).map_err(|_| TraceError::BadAddress {
        line,
        text: addr.to_string(),
    })?;

    Ok(Access { op: op_type, addr })
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Access, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_line(self.line, &self.buf));
                }
                Err(e) => return Some(Err(TraceError::Io(e))),
            }
        }
    }
}
