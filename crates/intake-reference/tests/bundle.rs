use std::fs;

use intake_reference::hash::sha256_hex;
use intake_reference::{GeoPoint, ReferenceBundle, ReferenceError, ReferenceSource};

const LOOKUP: &str = "Analyte,AnalyteClass\nCopper,Metal\nZinc,Metal\nPCB 153,PCB\n";

const STRATA: &str = r#"{"type":"FeatureCollection","features":[
  {"type":"Feature","properties":{"region":"Central","stratum":"Bays"},
   "geometry":{"type":"Polygon","coordinates":[[[-118.5,33.5],[-118.0,33.5],[-118.0,34.0],[-118.5,34.0],[-118.5,33.5]]]}}
]}"#;

fn write_manifest(dir: &std::path::Path, sha: Option<&str>) -> std::path::PathBuf {
    fs::create_dir_all(dir.join("lookups")).unwrap();
    fs::write(dir.join("lookups/lu_analytes.csv"), LOOKUP).unwrap();
    fs::write(dir.join("strata.geojson"), STRATA).unwrap();
    let sha_line = sha.map(|s| format!("sha256 = \"{s}\"\n")).unwrap_or_default();
    let manifest = format!(
        r#"
[manifest]
schema = "intake.reference-manifest"
schema_version = 1

[[datasets]]
name = "chemistry"
tables = ["tbl_chembatch", "tbl_chemresults"]

[[lookups]]
name = "lu_analytes"
path = "lookups/lu_analytes.csv"
{sha_line}
[boundaries]
path = "strata.geojson"

[boundaries.aliases]
Bay = "Bays"
"#
    );
    let path = dir.join("intake.toml");
    fs::write(&path, manifest).unwrap();
    path
}

#[test]
fn loads_lookups_boundaries_and_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let sha = sha256_hex(LOOKUP.as_bytes());
    let path = write_manifest(dir.path(), Some(&sha));

    let bundle = ReferenceBundle::load(&path).unwrap();

    let analytes = bundle.store.values("LU_ANALYTES", "analyte").unwrap();
    assert!(analytes.contains("PCB 153"));
    assert_eq!(analytes.len(), 3);

    let metals = bundle
        .store
        .values_where("lu_analytes", "analyte", &|row| {
            row.get("analyteclass").is_some_and(|c| c == "Metal")
        })
        .unwrap();
    assert_eq!(metals.len(), 2);

    let chemistry = bundle.dataset("Chemistry").unwrap();
    assert_eq!(chemistry.tables.len(), 2);

    let boundaries = bundle.boundaries.as_ref().unwrap();
    let bays = boundaries.get("Central", "Bay").unwrap();
    assert!(bays.contains_point(GeoPoint::new(-118.25, 33.75)));
}

#[test]
fn checksum_mismatch_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let wrong = "0".repeat(64);
    let path = write_manifest(dir.path(), Some(&wrong));

    let err = ReferenceBundle::load(&path).unwrap_err();
    assert!(matches!(err, ReferenceError::Sha256Mismatch { .. }), "{err}");
}

#[test]
fn unknown_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), None);
    let bundle = ReferenceBundle::load(&path).unwrap();

    let err = bundle.store.values("lu_analytes", "units").unwrap_err();
    assert!(matches!(err, ReferenceError::UnknownColumn { .. }));
}
