/*!
 * Duplicate-group partitioning
 *
 * Walks the manifest buffer line by line and yields maximal runs of records
 * sharing one hash. The manifest is trusted to be grouped already; nothing is
 * sorted or indexed here, so groups come out strictly in manifest order.
 */

use std::borrow::Cow;

use crate::config::{MalformedPolicy, OverflowPolicy, ResolveConfig};
use crate::error::{DupError, ParseError, Result};
use crate::manifest::record::{parse_line, Record};

/// A contiguous run of records with equal hashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    hash: &'a [u8],
    members: Vec<Record<'a>>,
    start: usize,
    end: usize,
    first_line: usize,
    excess: usize,
}

impl<'a> Group<'a> {
    pub fn hash(&self) -> &'a [u8] {
        self.hash
    }

    pub fn hash_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.hash)
    }

    pub fn members(&self) -> &[Record<'a>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Byte offset of the group's first line
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the group; where the next scan begins
    pub fn end(&self) -> usize {
        self.end
    }

    /// 1-based line number of the group's first record
    pub fn first_line(&self) -> usize {
        self.first_line
    }

    /// Same-hash records dropped by truncation; left untouched on disk
    pub fn excess(&self) -> usize {
        self.excess
    }
}

/// Iterator over the duplicate groups of a manifest buffer.
///
/// Yields `Err(MalformedRecord)` for lines that break the grammar and
/// `Err(GroupOverflow)` for runs rejected by the overflow policy. Under
/// [`MalformedPolicy::Skip`] iteration continues past a malformed line;
/// otherwise the error is the last item.
pub struct Partitioner<'a> {
    buf: &'a [u8],
    terminator: &'a [u8],
    max_group_size: usize,
    on_overflow: OverflowPolicy,
    on_malformed: MalformedPolicy,
    cursor: usize,
    line_no: usize,
    pending: Option<DupError>,
    halted: bool,
}

impl<'a> Partitioner<'a> {
    pub fn new(buf: &'a [u8], config: &'a ResolveConfig) -> Self {
        Self {
            buf,
            terminator: config.path_terminator.as_bytes(),
            max_group_size: config.max_group_size,
            on_overflow: config.on_overflow,
            on_malformed: config.on_malformed,
            cursor: 0,
            line_no: 1,
            pending: None,
            halted: false,
        }
    }

    /// Current read position in the buffer
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn skips_malformed(&self) -> bool {
        self.on_malformed == MalformedPolicy::Skip
    }

    fn advance(&mut self, next: usize) {
        self.cursor = next;
        self.line_no += 1;
    }

    fn skip_blank_lines(&mut self) {
        while let Some((line, next)) = next_line(self.buf, self.cursor) {
            if !is_blank(line) {
                break;
            }
            self.advance(next);
        }
    }
}

impl<'a> Iterator for Partitioner<'a> {
    type Item = Result<Group<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            if !self.skips_malformed() {
                self.halted = true;
            }
            return Some(Err(err));
        }
        if self.halted {
            return None;
        }

        self.skip_blank_lines();
        let start = self.cursor;
        let first_line = self.line_no;
        let (line, next) = next_line(self.buf, start)?;

        let first = match parse_line(line, self.terminator) {
            Ok(record) => record,
            Err(reason) => {
                if self.skips_malformed() {
                    self.advance(next);
                } else {
                    self.halted = true;
                }
                return Some(Err(malformed(first_line, start, reason)));
            }
        };
        self.advance(next);

        let mut members = vec![first];
        while let Some((line, next)) = next_line(self.buf, self.cursor) {
            if is_blank(line) {
                break;
            }
            let record = match parse_line(line, self.terminator) {
                Ok(record) => record,
                Err(reason) => {
                    self.pending = Some(malformed(self.line_no, self.cursor, reason));
                    if self.skips_malformed() {
                        self.advance(next);
                    }
                    break;
                }
            };
            if record.hash() != first.hash() {
                break;
            }
            members.push(record);
            self.advance(next);
        }

        let mut excess = 0;
        if members.len() > self.max_group_size {
            match self.on_overflow {
                OverflowPolicy::Truncate => {
                    excess = members.len() - self.max_group_size;
                    members.truncate(self.max_group_size);
                }
                OverflowPolicy::Reject => {
                    self.halted = true;
                    self.pending = None;
                    self.cursor = start;
                    self.line_no = first_line;
                    return Some(Err(DupError::GroupOverflow {
                        hash: first.hash_str().into_owned(),
                        line: first_line,
                        members: members.len(),
                        limit: self.max_group_size,
                    }));
                }
            }
        }

        Some(Ok(Group {
            hash: first.hash(),
            members,
            start,
            end: self.cursor,
            first_line,
            excess,
        }))
    }
}

/// Check every line of a manifest against the record grammar.
///
/// Returns the number of records, or the first malformed line.
pub fn check_manifest(buf: &[u8], terminator: &[u8]) -> Result<usize> {
    let mut cursor = 0;
    let mut line_no = 1;
    let mut records = 0;

    while let Some((line, next)) = next_line(buf, cursor) {
        if !is_blank(line) {
            parse_line(line, terminator).map_err(|reason| malformed(line_no, cursor, reason))?;
            records += 1;
        }
        cursor = next;
        line_no += 1;
    }

    Ok(records)
}

/// Return the line starting at `pos` (newline excluded) and the offset after it
fn next_line(buf: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    if pos >= buf.len() {
        return None;
    }
    let rest = &buf[pos..];
    match rest.iter().position(|&b| b == b'\n') {
        Some(i) => Some((&rest[..i], pos + i + 1)),
        None => Some((rest, buf.len())),
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

fn malformed(line: usize, offset: usize, reason: ParseError) -> DupError {
    DupError::MalformedRecord {
        line,
        offset,
        reason,
    }
}
