use super::catalog::SequenceCatalog;
use super::definition::Sequence;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// Format version written into every packed catalog.
pub const CATALOG_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CatalogArtifact {
    format_version: u32,
    sequences: Vec<Sequence>,
}

impl SequenceCatalog {
    /// Encodes the catalog with the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let artifact = CatalogArtifact {
            format_version: CATALOG_FORMAT_VERSION,
            sequences: self.iter().cloned().collect(),
        };
        encode_to_vec(&artifact, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    /// Saves the packed catalog to a file.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        file.write_all(&bytes).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Loads a packed catalog from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let mut file = fs::File::open(path).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| ArtifactError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Decodes a packed catalog from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let (artifact, _): (CatalogArtifact, usize) =
            decode_from_slice(bytes, standard()).map_err(|e| ArtifactError::Decode(e.to_string()))?;
        if artifact.format_version != CATALOG_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: artifact.format_version,
                expected: CATALOG_FORMAT_VERSION,
            });
        }
        let mut catalog = Self::new();
        for sequence in artifact.sequences {
            catalog.insert(sequence);
        }
        Ok(catalog)
    }
}
