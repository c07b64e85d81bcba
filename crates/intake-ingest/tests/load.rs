use std::fs;

use intake_ingest::{IngestError, ROW_ID_COLUMN, TableSet, load_submission, row_ids};
use intake_model::RowId;
use polars::prelude::df;

#[test]
fn loads_requested_tables_with_row_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("tbl_chembatch.csv"),
        "Lab,PreparationBatchID\nA,1\nA,2\n",
    )
    .expect("write batch");
    fs::write(
        dir.path().join("TBL_CHEMRESULTS.CSV"),
        " Lab ,PreparationBatchID,Result\nA,1,0.5\n",
    )
    .expect("write results");

    let set = load_submission(dir.path(), &["tbl_chembatch", "tbl_chemresults", "tbl_other"])
        .expect("load");

    assert_eq!(set.len(), 2);
    let results = set.require("tbl_chemresults").expect("results");
    assert!(results.column("lab").is_ok());
    assert!(results.column(ROW_ID_COLUMN).is_ok());
    assert_eq!(
        row_ids(set.require("tbl_chembatch").expect("batch")).expect("ids"),
        vec![RowId(0), RowId(1)]
    );
    assert!(!set.contains("tbl_other"));
}

#[test]
fn duplicate_tables_are_rejected() {
    let mut set = TableSet::new();
    set.insert("t", df! { "a" => &[1i64] }.unwrap()).unwrap();
    let err = set.insert("T", df! { "a" => &[2i64] }.unwrap()).unwrap_err();
    assert!(matches!(err, IngestError::DuplicateTable { .. }));
}

#[test]
fn missing_table_is_a_typed_error() {
    let set = TableSet::new();
    assert!(matches!(
        set.require("tbl_grabevent"),
        Err(IngestError::MissingTable { .. })
    ));
}

#[test]
fn identified_frames_must_carry_the_column() {
    let mut set = TableSet::new();
    let err = set
        .insert_identified("t", df! { "a" => &[1i64] }.unwrap())
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingRowId { .. }));
}
