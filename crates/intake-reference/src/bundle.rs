//! Loads everything a manifest describes into memory.

use std::path::{Path, PathBuf};

use intake_model::DatasetSpec;
use tracing::{debug, info};

use crate::boundary::{BoundaryLookup, StratumAliases};
use crate::csv_utils::read_reference_csv;
use crate::error::ReferenceError;
use crate::geojson::read_boundary_features;
use crate::hash::sha256_hex;
use crate::manifest::{Manifest, load_manifest, validate_path};
use crate::source::ReferenceStore;

/// Environment variable naming the manifest to load.
pub const CONFIG_ENV_VAR: &str = "INTAKE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "intake.toml";

/// `$INTAKE_CONFIG` when set, otherwise `intake.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Reference data and dataset registry for one or more validation runs.
#[derive(Debug, Clone)]
pub struct ReferenceBundle {
    pub manifest_dir: PathBuf,
    pub datasets: Vec<DatasetSpec>,
    pub store: ReferenceStore,
    pub boundaries: Option<BoundaryLookup>,
}

impl ReferenceBundle {
    pub fn load(manifest_path: &Path) -> Result<Self, ReferenceError> {
        let manifest = load_manifest(manifest_path)?;
        let manifest_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_manifest(&manifest, &manifest_dir)
    }

    pub fn from_manifest(manifest: &Manifest, manifest_dir: &Path) -> Result<Self, ReferenceError> {
        let datasets = manifest
            .datasets
            .iter()
            .map(|d| DatasetSpec {
                name: d.name.clone(),
                tables: d.tables.clone(),
                description: d.description.clone(),
            })
            .collect();

        let mut store = ReferenceStore::new();
        for lookup in &manifest.lookups {
            let path = manifest_dir.join(validate_path(&lookup.path)?);
            if let Some(expected) = &lookup.sha256 {
                verify_file(&path, expected)?;
            }
            let table = read_reference_csv(&lookup.name, &path)?;
            debug!(table = %lookup.name, rows = table.len(), "loaded reference table");
            store.insert(table)?;
        }

        let boundaries = match &manifest.boundaries {
            Some(entry) => {
                let path = manifest_dir.join(validate_path(&entry.path)?);
                if let Some(expected) = &entry.sha256 {
                    verify_file(&path, expected)?;
                }
                let features =
                    read_boundary_features(&path, &entry.region_field, &entry.stratum_field)?;
                let aliases: StratumAliases = entry.aliases.iter().collect();
                Some(BoundaryLookup::new(
                    features
                        .into_iter()
                        .map(|f| (f.region, f.stratum, f.boundary)),
                    aliases,
                ))
            }
            None => None,
        };

        info!(
            datasets = manifest.datasets.len(),
            lookups = store.len(),
            boundaries = boundaries.as_ref().map_or(0, BoundaryLookup::len),
            "loaded reference bundle"
        );

        Ok(Self {
            manifest_dir: manifest_dir.to_path_buf(),
            datasets,
            store,
            boundaries,
        })
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetSpec> {
        self.datasets
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

fn verify_file(path: &Path, expected: &str) -> Result<(), ReferenceError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ReferenceError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            ReferenceError::io(path, e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = expected.to_ascii_lowercase();
    if actual != expected {
        return Err(ReferenceError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}
