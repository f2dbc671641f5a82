use super::{describe, stream_or_path};
use crate::error::{NeighbourerError, Result};
use crate::table::RawRow;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

/// Where input rows are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Self::Stdin => {
                debug!("Reading rows from standard input");
                Ok(Box::new(io::stdin().lock()))
            }
            Self::File(path) => {
                debug!("Reading rows from {}", path.display());
                let file = File::open(path).map_err(|e| {
                    NeighbourerError::from(e)
                        .with_context("cannot open input")
                        .with_path(path)
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn describe(&self) -> String {
        describe(self.path(), "<stdin>")
    }
}

impl FromStr for InputSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(stream_or_path(s).map_or(Self::Stdin, Self::File))
    }
}

/// Tokenise delimited text into rows
///
/// Every line, header included, becomes one [`RawRow`]; field counts are
/// left unchecked so the loader can decide what a short row means.
/// Surrounding whitespace is trimmed and blank lines are skipped. Rows keep
/// the physical line number they started on, blank lines included.
pub fn csv_rows<R: Read>(reader: R, delimiter: u8) -> impl Iterator<Item = Result<RawRow>> {
    let index = Rc::new(RefCell::new(LineIndex::new()));
    let counting = LineCounting {
        inner: reader,
        index: Rc::clone(&index),
    };

    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(counting)
        .into_records()
        .enumerate()
        .map(move |(idx, record)| {
            let record = record.map_err(NeighbourerError::from)?;
            // the record's position is where the reader stopped after the
            // previous row, which is before any blank lines it then skipped
            let line = record
                .position()
                .and_then(|p| index.borrow_mut().line_at(p.byte()))
                .unwrap_or(idx as u64 + 1);
            Ok(RawRow::from_fields(line, record.iter()))
        })
}

/// Start offsets of the non-empty lines read so far
#[derive(Debug)]
struct LineIndex {
    offset: u64,
    line: u64,
    line_start: u64,
    has_content: bool,
    starts: VecDeque<(u64, u64)>,
}

impl LineIndex {
    fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            line_start: 0,
            has_content: false,
            starts: VecDeque::new(),
        }
    }

    fn scan(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match byte {
                b'\n' => {
                    self.line += 1;
                    self.line_start = self.offset + 1;
                    self.has_content = false;
                }
                b'\r' => {}
                _ if !self.has_content => {
                    self.has_content = true;
                    self.starts.push_back((self.line_start, self.line));
                }
                _ => {}
            }
            self.offset += 1;
        }
    }

    /// Line number of the first non-empty line starting at or after `byte`
    ///
    /// Offsets must be queried in ascending order; earlier lines are dropped.
    fn line_at(&mut self, byte: u64) -> Option<u64> {
        while self.starts.front().is_some_and(|&(start, _)| start < byte) {
            self.starts.pop_front();
        }
        self.starts.front().map(|&(_, line)| line)
    }
}

/// Reader adapter feeding every byte it passes through to a [`LineIndex`]
struct LineCounting<R> {
    inner: R,
    index: Rc<RefCell<LineIndex>>,
}

impl<R: Read> Read for LineCounting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.index.borrow_mut().scan(&buf[..n]);
        Ok(n)
    }
}
