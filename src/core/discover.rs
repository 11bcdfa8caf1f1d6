use crate::core::error::{HistError, Result};
use crate::core::model::Source;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Lists files under `dir` whose name ends in `.<ext>` for one of
/// `extensions`, sorted by path. A missing `dir` yields no sources. Links are
/// not followed during the walk; a matching link is listed unless it points to
/// a directory, and a dangling one fails later when it is opened.
pub fn discover(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<Source>> {
    if extensions.is_empty() {
        return Err(HistError::NoExtensions);
    }
    let suffixes: Vec<String> = extensions
        .iter()
        .map(|ext| format!(".{}", ext.trim_start_matches('.')))
        .collect();

    match std::fs::metadata(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("source directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(HistError::Enumeration {
                dir: dir.to_path_buf(),
                source,
            });
        }
        Ok(meta) if !meta.is_dir() => {
            return Err(HistError::Enumeration {
                dir: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }
        Ok(_) => {}
    }

    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut sources = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                return Err(HistError::Enumeration {
                    dir: dir.to_path_buf(),
                    source,
                });
            }
        };
        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }
        let name = entry.file_name().as_encoded_bytes();
        if !suffixes.iter().any(|s| name.ends_with(s.as_bytes())) {
            continue;
        }
        if file_type.is_symlink() && entry.path().is_dir() {
            debug!("skipping linked directory {}", entry.path().display());
            continue;
        }
        sources.push(Source::new(entry.into_path()));
    }
    sources.sort();
    Ok(sources)
}
