#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;

pub const MANIFEST_SCHEMA: &str = "intake.reference-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Parsed `intake.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
    #[serde(default)]
    pub lookups: Vec<LookupEntry>,
    #[serde(default)]
    pub boundaries: Option<BoundaryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    pub tables: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryEntry {
    pub path: String,
    #[serde(default = "default_region_field")]
    pub region_field: String,
    #[serde(default = "default_stratum_field")]
    pub stratum_field: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_region_field() -> String {
    "region".to_string()
}

fn default_stratum_field() -> String {
    "stratum".to_string()
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ReferenceError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReferenceError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ReferenceError::io(path, e)
        }
    })?;
    let manifest: Manifest = toml::from_str(&text).map_err(|e| ReferenceError::Toml {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

pub fn validate_manifest(manifest: &Manifest) -> Result<(), ReferenceError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(ReferenceError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(ReferenceError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut datasets = BTreeSet::new();
    for dataset in &manifest.datasets {
        if !datasets.insert(dataset.name.to_lowercase()) {
            return Err(ReferenceError::InvalidManifest {
                message: format!("duplicate dataset: {}", dataset.name),
            });
        }
        if dataset.tables.is_empty() {
            return Err(ReferenceError::InvalidManifest {
                message: format!("dataset {} lists no tables", dataset.name),
            });
        }
    }

    let mut lookups = BTreeSet::new();
    for lookup in &manifest.lookups {
        if !lookups.insert(lookup.name.to_lowercase()) {
            return Err(ReferenceError::DuplicateTable {
                name: lookup.name.clone(),
            });
        }
        validate_path(&lookup.path)?;
        if let Some(sha) = &lookup.sha256 {
            validate_sha(sha, &lookup.path)?;
        }
    }

    if let Some(boundaries) = &manifest.boundaries {
        validate_path(&boundaries.path)?;
        if let Some(sha) = &boundaries.sha256 {
            validate_sha(sha, &boundaries.path)?;
        }
    }
    Ok(())
}

fn validate_sha(sha: &str, path: &str) -> Result<(), ReferenceError> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReferenceError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_path(path: &str) -> Result<PathBuf, ReferenceError> {
    if path.contains('\\') {
        return Err(ReferenceError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(ReferenceError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ReferenceError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of the manifest directory".to_string(),
        });
    }
    Ok(p)
}
