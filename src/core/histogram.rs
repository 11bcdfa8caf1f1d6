use crate::core::error::{HistError, Result};
use crate::core::io::SourceData;
use crate::core::model::{Histogram, HistogramResult, Source};
use memchr::memchr;
use std::io::{self, BufRead};

/// Turns one source into its histogram. Implementations must not touch any
/// state outside the returned result.
pub trait Build: Send + Sync {
    fn build(&self, source: &Source) -> Result<HistogramResult>;
}

/// Reads sources from the filesystem, plain or gzip-compressed.
pub struct FileBuilder {
    marker: char,
}

impl FileBuilder {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }
}

impl Build for FileBuilder {
    fn build(&self, source: &Source) -> Result<HistogramResult> {
        let counts = match SourceData::open(source.path())? {
            SourceData::Empty => Histogram::new(),
            SourceData::Mapped(m) => count_bytes(m.bytes(), self.marker),
            SourceData::Gzip(reader) => {
                count_reader(reader, self.marker).map_err(|e| HistError::SourceRead {
                    path: source.path().to_path_buf(),
                    source: e,
                })?
            }
        };
        Ok(HistogramResult {
            source: source.clone(),
            counts,
        })
    }
}

pub fn count_line(hist: &mut Histogram, line: &str, marker: char) {
    if line.starts_with(marker) {
        return;
    }
    for c in line.chars() {
        hist.add(c);
    }
}

pub fn count_lines<I, S>(lines: I, marker: char) -> Histogram
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hist = Histogram::new();
    for line in lines {
        count_line(&mut hist, line.as_ref(), marker);
    }
    hist
}

/// Counts a whole in-memory buffer. A final line without `\n` still counts.
pub fn count_bytes(bytes: &[u8], marker: char) -> Histogram {
    let mut hist = Histogram::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let (line, next) = match memchr(b'\n', rest) {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, &rest[rest.len()..]),
        };
        count_raw_line(&mut hist, line, marker);
        rest = next;
    }
    hist
}

pub fn count_reader<R: BufRead>(mut reader: R, marker: char) -> io::Result<Histogram> {
    let mut hist = Histogram::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        count_raw_line(&mut hist, line, marker);
    }
    Ok(hist)
}

/// Counts one undecoded line. Every byte that is not part of a valid UTF-8
/// sequence counts as one U+FFFD.
fn count_raw_line(hist: &mut Histogram, line: &[u8], marker: char) {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let mut encoded = [0u8; 4];
    if line.starts_with(marker.encode_utf8(&mut encoded).as_bytes()) {
        return;
    }
    let mut rest = line;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                text.chars().for_each(|c| hist.add(c));
                break;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                // SAFETY: `valid_up_to` bounds the longest valid prefix.
                let text = unsafe { std::str::from_utf8_unchecked(&rest[..valid]) };
                text.chars().for_each(|c| hist.add(c));
                let invalid = e.error_len().unwrap_or(rest.len() - valid);
                hist.add_n(char::REPLACEMENT_CHARACTER, invalid as u64);
                rest = &rest[valid + invalid..];
            }
        }
    }
}
