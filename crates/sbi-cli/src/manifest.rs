use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sbi_core::errors::ErrorInfo;
use sbi_core::{SbiError, SchemaVersion};

/// Structured manifest describing one completed simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema of the manifest payload.
    pub schema_version: SchemaVersion,
    /// Master seed used to derive all substreams.
    pub seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Number of simulation records produced.
    pub num_simulations: usize,
    /// Records file the manifest refers to.
    pub records_file: PathBuf,
    /// Canonical hash of the records file contents.
    pub records_hash: String,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SbiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SbiError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    #[allow(dead_code)]
    pub fn load(path: &Path) -> Result<Self, SbiError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SbiError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_roundtrips_through_disk() {
        let manifest = RunManifest {
            schema_version: SchemaVersion::default(),
            seed: 99,
            seed_label: Some("smoke".to_string()),
            num_simulations: 12,
            records_file: PathBuf::from("records.json"),
            records_hash: "abc123".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        manifest.write(&path).unwrap();
        let restored = RunManifest::load(&path).unwrap();
        assert_eq!(restored.seed, 99);
        assert_eq!(restored.records_hash, "abc123");
    }
}
