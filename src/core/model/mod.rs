use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::path::{Path, PathBuf};

pub const TOTALS_LABEL: &str = "Totals";

pub const DEFAULT_MARKER: char = '>';

/// One unit of input, identified by its path.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Source {
    path: PathBuf,
}

impl Source {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Character occurrence counts. Only observed characters are stored, so every
/// value is at least 1.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Histogram {
    counts: HashMap<char, u64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, c: char) {
        *self.counts.entry(c).or_insert(0) += 1;
    }

    pub fn add_n(&mut self, c: char, n: u64) {
        if n == 0 {
            return;
        }
        *self.counts.entry(c).or_insert(0) += n;
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (&c, &n) in &other.counts {
            self.add_n(c, n);
        }
    }

    pub fn get(&self, c: char) -> u64 {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries in map order, which is unspecified.
    pub fn iter(&self) -> hash_map::Iter<'_, char, u64> {
        self.counts.iter()
    }

    pub fn sorted(&self) -> Vec<(char, u64)> {
        let mut entries: Vec<(char, u64)> = self.counts.iter().map(|(&c, &n)| (c, n)).collect();
        entries.sort_unstable_by_key(|&(c, _)| c);
        entries
    }
}

impl FromIterator<(char, u64)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (char, u64)>>(iter: I) -> Self {
        let mut hist = Histogram::new();
        for (c, n) in iter {
            hist.add_n(c, n);
        }
        hist
    }
}

#[derive(Clone, Debug)]
pub struct HistogramResult {
    pub source: Source,
    pub counts: Histogram,
}

#[derive(Clone, Debug)]
pub struct TotalHistogram {
    pub counts: Histogram,
}

impl TotalHistogram {
    pub fn new() -> Self {
        Self {
            counts: Histogram::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        TOTALS_LABEL
    }

    pub fn absorb(&mut self, result: &HistogramResult) {
        self.counts.merge(&result.counts);
    }
}

/// What the aggregator does when a task reports a failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailurePolicy {
    Abort,
    Collect,
}

/// How many workers the aggregator starts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatch {
    PerSource,
    Bounded(usize),
}

impl Dispatch {
    pub fn workers(self, sources: usize) -> usize {
        match self {
            Dispatch::PerSource => sources,
            Dispatch::Bounded(n) => n.max(1).min(sources),
        }
    }
}
