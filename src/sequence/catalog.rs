use super::definition::Sequence;
use crate::error::SequenceLoadError;
use ahash::AHashMap;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// All sequences available to a conversation, keyed by `sequenceId`.
#[derive(Debug, Clone, Default)]
pub struct SequenceCatalog {
    pub(super) sequences: AHashMap<String, Sequence>,
}

impl SequenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sequence, replacing and returning any previous one with the same id.
    pub fn insert(&mut self, sequence: Sequence) -> Option<Sequence> {
        self.sequences
            .insert(sequence.sequence_id().to_string(), sequence)
    }

    pub fn get(&self, sequence_id: &str) -> Option<&Sequence> {
        self.sequences.get(sequence_id)
    }

    pub fn contains(&self, sequence_id: &str) -> bool {
        self.sequences.contains_key(sequence_id)
    }

    /// Sequence ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.sequences.keys().map(String::as_str).sorted().collect()
    }

    /// Sequences in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences
            .values()
            .sorted_by(|a, b| a.sequence_id().cmp(b.sequence_id()))
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Builds a catalog from already-parsed sequences, rejecting duplicate ids.
    pub fn from_sequences(
        sequences: impl IntoIterator<Item = Sequence>,
    ) -> Result<Self, SequenceLoadError> {
        let mut catalog = Self::new();
        for sequence in sequences {
            let id = sequence.sequence_id().to_string();
            if catalog.insert(sequence).is_some() {
                return Err(SequenceLoadError::DuplicateSequence(id));
            }
        }
        Ok(catalog)
    }

    /// Loads every `*.json` file in a directory (non-recursive), in file name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SequenceLoadError> {
        let files = sequence_files(dir.as_ref())?;
        Self::from_files(&files)
    }

    /// Loads the given sequence files.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, SequenceLoadError> {
        let sequences = paths
            .iter()
            .map(|path| {
                debug!(path = %path.display(), "Loading sequence file");
                Sequence::from_file(path)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_sequences(sequences)
    }
}

/// Lists the JSON files of a directory, sorted by path.
pub fn sequence_files(dir: &Path) -> Result<Vec<PathBuf>, SequenceLoadError> {
    let io_error = |e: std::io::Error| SequenceLoadError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
