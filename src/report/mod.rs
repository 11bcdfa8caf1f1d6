use crate::core::model::Histogram;
use std::io::{self, Write};
use std::sync::Mutex;

pub mod text;
pub mod tsv;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Text,
    Tsv,
}

#[derive(Clone, Copy, Debug)]
pub struct ReportOptions {
    pub format: Format,
    pub sort: bool,
}

/// Serializes report blocks from many threads onto one writer. Each block is
/// rendered first and written under the lock, so blocks never interleave.
pub struct Reporter<W: Write + Send> {
    opts: ReportOptions,
    out: Mutex<W>,
}

impl<W: Write + Send> Reporter<W> {
    pub fn new(out: W, opts: ReportOptions) -> Self {
        Self {
            opts,
            out: Mutex::new(out),
        }
    }

    /// Writes the column header, if the format has one.
    pub fn begin(&self) -> io::Result<()> {
        match self.opts.format {
            Format::Text => Ok(()),
            Format::Tsv => self.write_locked(tsv::HEADER.as_bytes()),
        }
    }

    pub fn emit(&self, label: &str, hist: &Histogram) -> io::Result<()> {
        let entries = entries(hist, self.opts.sort);
        let mut buf = Vec::with_capacity(32 * (entries.len() + 1));
        match self.opts.format {
            Format::Text => text::write_block(&mut buf, label, &entries)?,
            Format::Tsv => tsv::write_rows(&mut buf, label, &entries)?,
        }
        self.write_locked(&buf)
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write_locked(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(bytes)?;
        out.flush()
    }
}

fn entries(hist: &Histogram, sort: bool) -> Vec<(char, u64)> {
    if sort {
        hist.sorted()
    } else {
        hist.iter().map(|(&c, &n)| (c, n)).collect()
    }
}

/// Renders a source label on one line. Only control characters are escaped,
/// so path separators stay as they are.
pub fn display_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_control() {
            out.push_str(&display_char(c));
        } else {
            out.push(c);
        }
    }
    out
}

/// Renders a character so that every entry stays on one line.
pub fn display_char(c: char) -> String {
    match c {
        '\t' => "\\t".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\\' => "\\\\".to_string(),
        c if c.is_control() => c.escape_unicode().to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn hist(pairs: &[(char, u64)]) -> Histogram {
        pairs.iter().copied().collect()
    }

    #[test]
    fn text_block_contains_every_entry() {
        let reporter = Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Text,
                sort: false,
            },
        );
        reporter
            .emit("data/a.fa", &hist(&[('A', 3), ('C', 2), ('G', 2), ('T', 2)]))
            .unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let mut lines = out.lines();

        assert_eq!(lines.next(), Some("data/a.fa"));
        let rest: HashSet<&str> = lines.collect();
        let expected: HashSet<&str> = [
            "Base A\tCount 3",
            "Base C\tCount 2",
            "Base G\tCount 2",
            "Base T\tCount 2",
        ]
        .into_iter()
        .collect();
        assert_eq!(rest, expected);
    }

    #[test]
    fn sorted_tsv_rows() {
        let reporter = Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Tsv,
                sort: true,
            },
        );
        reporter.begin().unwrap();
        reporter.emit("Totals", &hist(&[('T', 1), ('A', 4)])).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "source\tbase\tcount\nTotals\tA\t4\nTotals\tT\t1\n");
    }

    #[test]
    fn empty_histogram_is_header_only() {
        let reporter = Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Text,
                sort: true,
            },
        );
        reporter.emit("Totals", &Histogram::new()).unwrap();
        assert_eq!(reporter.into_inner(), b"Totals\n");
    }

    #[test]
    fn labels_with_tabs_keep_rows_intact() {
        let reporter = Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Tsv,
                sort: true,
            },
        );
        reporter.emit("odd\tname\n.fa", &hist(&[('A', 1)])).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "odd\\tname\\n.fa\tA\t1\n");
        assert_eq!(out.lines().count(), 1);
        assert_eq!(out.trim_end().split('\t').count(), 3);
    }

    #[test]
    fn text_labels_are_escaped_too() {
        let reporter = Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Text,
                sort: true,
            },
        );
        reporter.emit("dir\\a\rb.fa", &Histogram::new()).unwrap();
        assert_eq!(reporter.into_inner(), b"dir\\a\\rb.fa\n");
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(display_char('A'), "A");
        assert_eq!(display_char('\t'), "\\t");
        assert_eq!(display_char('\r'), "\\r");
        assert_eq!(display_char('\\'), "\\\\");
        assert_eq!(display_char('\u{1}'), "\\u{1}");
        assert_eq!(display_char(' '), " ");
        assert_eq!(display_char('ñ'), "ñ");
    }

    #[test]
    fn concurrent_blocks_do_not_interleave() {
        let reporter = Arc::new(Reporter::new(
            Vec::new(),
            ReportOptions {
                format: Format::Text,
                sort: true,
            },
        ));
        let counts = hist(&[('A', 1), ('C', 2), ('G', 3), ('T', 4)]);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reporter = Arc::clone(&reporter);
                let counts = counts.clone();
                thread::spawn(move || {
                    for j in 0..20 {
                        reporter.emit(&format!("src{}-{}", i, j), &counts).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let reporter = Arc::into_inner(reporter).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 8 * 20 * 5);
        for block in lines.chunks(5) {
            assert!(block[0].starts_with("src"));
            assert_eq!(
                &block[1..],
                &["Base A\tCount 1", "Base C\tCount 2", "Base G\tCount 3", "Base T\tCount 4"]
            );
        }
    }
}
