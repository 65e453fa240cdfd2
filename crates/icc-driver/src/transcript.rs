//! Append-only capture of raw response batches.
//!
//! Each batch is written as a newline followed by its lines joined with
//! newlines, so a transcript can be replayed to build a driver simulator.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::DriverError;

/// Appends response batches to a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    path: Utf8PathBuf,
}

impl Transcript {
    /// Creates a transcript writing to `path`. The file is created on the
    /// first append.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The transcript file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Appends one response batch.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Transcript`] when the file cannot be opened or
    /// written.
    pub fn append(&self, lines: &[String]) -> Result<(), DriverError> {
        let record = format!("\n{}", lines.join("\n"));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(record.as_bytes()))
            .map_err(|source| DriverError::Transcript {
                path: self.path.clone(),
                source: Arc::new(source),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn transcript_in(dir: &TempDir) -> Transcript {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("transcript.txt"))
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path: {}", path.display()));
        Transcript::new(path)
    }

    #[rstest]
    fn appends_each_batch_after_a_newline() {
        let dir = TempDir::new().expect("temp dir");
        let transcript = transcript_in(&dir);

        transcript
            .append(&[String::from("ECHO OPEN CP1"), String::from("DONE 0")])
            .expect("first append");
        transcript
            .append(&[String::from("FAIL Invalid station")])
            .expect("second append");

        let content = fs::read_to_string(transcript.path()).expect("read transcript");
        assert_eq!(content, "\nECHO OPEN CP1\nDONE 0\nFAIL Invalid station");
    }

    #[rstest]
    fn reports_unwritable_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing").join("t.txt"))
            .unwrap_or_else(|path| panic!("non-UTF-8 temp path: {}", path.display()));
        let transcript = Transcript::new(path);

        let error = transcript
            .append(&[String::from("DONE 0")])
            .expect_err("missing directory should fail");

        assert!(matches!(error, DriverError::Transcript { .. }));
    }
}
