use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lazy stream of the values in one snapshot, one per line.
///
/// Yields `Err(MalformedValue)` for the first line that is not a finite
/// decimal number, then stops.
pub struct ValueReader<R> {
    path: PathBuf,
    lines: Lines<R>,
    line: usize,
    failed: bool,
}

impl ValueReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> ValueReader<R> {
    pub fn new<P: AsRef<Path>>(path: P, reader: R) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: reader.lines(),
            line: 0,
            failed: false,
        }
    }
}

fn parse_value(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl<R: BufRead> Iterator for ValueReader<R> {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let line = self.lines.next()?;
        self.line += 1;
        let item = match line {
            Ok(content) => parse_value(&content).ok_or_else(|| Error::MalformedValue {
                path: self.path.clone(),
                line: self.line,
                content,
            }),
            Err(e) => Err(Error::io(&self.path, e)),
        };
        self.failed = item.is_err();
        Some(item)
    }
}

/// Reads every value of a snapshot into memory.
pub fn read_values<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    ValueReader::open(path)?.collect()
}
