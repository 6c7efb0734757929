//! File-based line source.
//!
//! Tails a log file the way `tail -F` does.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::LineSource;

/// A line source that follows a growing log file.
///
/// The source remembers the byte offset it has consumed and only returns
/// complete lines appended after it. A trailing partial line is held back
/// until its newline arrives. When the file shrinks (truncation or
/// rotation), reading restarts from the beginning.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    offset: u64,
    partial: Vec<u8>,
}

impl FileSource {
    /// Create a new file source for the given path, reading from the start.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            offset: 0,
            partial: Vec::new(),
        }
    }

    /// Returns the path being followed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Append everything written since the last offset to `partial`.
    fn read_new(&mut self) -> std::io::Result<()> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();

        if len < self.offset {
            tracing::info!(path = %self.path.display(), "log file shrank, reading from start");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(());
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let read = file.take(len - self.offset).read_to_end(&mut self.partial)?;
        self.offset += read as u64;
        Ok(())
    }
}

impl LineSource for FileSource {
    fn poll(&mut self) -> Vec<String> {
        match self.read_new() {
            Ok(()) => self.last_error = None,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return Vec::new();
            }
        }

        // Bytes after the last newline may end inside a multi-byte
        // character, so only complete lines are decoded.
        let Some(end) = self.partial.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.partial.split_off(end + 1);
        let complete = std::mem::replace(&mut self.partial, rest);

        complete
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line)))
            .filter(|l| !l.is_empty())
            .map(|l| l.into_owned())
            .collect()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
