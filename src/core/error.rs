use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistError {
    #[error("failed to enumerate sources in {}: {source}", dir.display())]
    Enumeration {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no source extensions configured")]
    NoExtensions,

    #[error("failed to open {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report for {label}: {source}")]
    Report {
        label: String,
        #[source]
        source: io::Error,
    },

    #[error("workers disconnected after {received} of {expected} results")]
    Disconnected { received: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, HistError>;
