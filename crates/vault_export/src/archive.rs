use std::collections::HashSet;
use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::filename::{sanitize_name, split_extension};
use crate::SyntheticEntry;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accumulates entries into an in-memory zip container.
///
/// Stored names are unique: a name that collides (case-insensitively) with an
/// earlier entry gets a ` (n)` counter before its extension.
pub struct ArchiveAssembler {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    taken: HashSet<String>,
    entries: Vec<String>,
}

impl ArchiveAssembler {
    pub fn new(compression_level: i32) -> Self {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level));
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            taken: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Adds `bytes` under `name` and returns the name actually stored.
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<String, ArchiveError> {
        let stored = self.claim_name(&sanitize_name(name));
        self.writer.start_file(stored.clone(), self.options)?;
        self.writer.write_all(bytes)?;
        self.entries.push(stored.clone());
        Ok(stored)
    }

    pub fn add_synthetic_entry(&mut self, entry: &SyntheticEntry) -> Result<String, ArchiveError> {
        self.add_entry(&entry.name, entry.content.as_bytes())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the central directory and returns the finished archive.
    pub fn finalize(mut self) -> Result<Vec<u8>, ArchiveError> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn claim_name(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name);
        let mut counter = 2usize;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{stem} ({counter}).{ext}"),
                None => format!("{stem} ({counter})"),
            };
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
