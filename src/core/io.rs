use crate::core::error::{HistError, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const GZIP_READ_BUF: usize = 1024 * 1024;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| HistError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| HistError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

/// An opened source, ready for line scanning.
pub enum SourceData {
    Empty,
    Mapped(MmapSource),
    Gzip(Box<dyn BufRead + Send>),
}

impl SourceData {
    pub fn open(path: &Path) -> Result<Self> {
        let len = std::fs::metadata(path)
            .map_err(|source| HistError::SourceOpen {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        match detect_input_kind(path)? {
            InputKind::Plain if len == 0 => Ok(SourceData::Empty),
            InputKind::Plain => Ok(SourceData::Mapped(MmapSource::open(path)?)),
            InputKind::Gzip => Ok(SourceData::Gzip(open_gzip_reader(path)?)),
        }
    }
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        if ext.eq_ignore_ascii_case("gz") {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file = File::open(path).map_err(|source| HistError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut magic = [0u8; 2];
    let n = read_up_to(&mut file, &mut magic).map_err(|source| HistError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

pub fn open_gzip_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|source| HistError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = MultiGzDecoder::new(BufReader::new(file));
    Ok(Box::new(BufReader::with_capacity(GZIP_READ_BUF, decoder)))
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
