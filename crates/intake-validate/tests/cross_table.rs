use intake_ingest::assign_row_id;
use intake_model::RowId;
use intake_validate::{CheckError, TableRef, missing_matches, missing_matches_on};
use polars::prelude::*;

fn batch() -> DataFrame {
    let df = df! {
        "lab" => &["A"],
        "preparationbatchid" => &[1i64],
    }
    .unwrap();
    assign_row_id("tbl_chembatch", df).unwrap()
}

fn results() -> DataFrame {
    let df = df! {
        "lab" => &["A", "A", "A"],
        "preparationbatchid" => &[1i64, 2, 1],
    }
    .unwrap();
    assign_row_id("tbl_chemresults", df).unwrap()
}

const KEYS: &[&str] = &["lab", "preparationbatchid"];

#[test]
fn orphans_detected_in_both_directions() {
    let batch = batch();
    let results = results();
    let b = TableRef::new("tbl_chembatch", &batch);
    let r = TableRef::new("tbl_chemresults", &results);

    assert_eq!(missing_matches(r, b, KEYS).unwrap(), vec![RowId(1)]);
    assert!(missing_matches(b, r, KEYS).unwrap().is_empty());
}

#[test]
fn reflexive_match_is_empty() {
    let results = results();
    let r = TableRef::new("tbl_chemresults", &results);
    assert!(missing_matches(r, r, KEYS).unwrap().is_empty());
}

#[test]
fn null_matches_null() {
    let occupation = df! {
        "stationid" => &[Some("S1"), None],
        "samplingorganization" => &[None::<&str>, Some("Org")],
    }
    .unwrap();
    let occupation = assign_row_id("tbl_stationoccupation", occupation).unwrap();
    let grab = df! {
        "stationid" => &[Some("S1"), None, Some("S2")],
        "samplingorganization" => &[None::<&str>, Some("Org"), None],
    }
    .unwrap();
    let grab = assign_row_id("tbl_grabevent", grab).unwrap();

    let orphans = missing_matches(
        TableRef::new("tbl_grabevent", &grab),
        TableRef::new("tbl_stationoccupation", &occupation),
        &["stationid", "samplingorganization"],
    )
    .unwrap();
    assert_eq!(orphans, vec![RowId(2)]);
}

#[test]
fn renamed_keys_and_mixed_numeric_types() {
    let occupation = df! {
        "stationid" => &["S1", "S2"],
        "occupationdate" => &["2023-07-01", "2023-07-02"],
        "depth" => &[10.0, 12.5],
    }
    .unwrap();
    let occupation = assign_row_id("tbl_stationoccupation", occupation).unwrap();
    let grab = df! {
        "stationid" => &["S1", "S2", "S2"],
        "sampledate" => &["2023-07-01", "2023-07-03", "2023-07-02"],
        "depth" => &[10i64, 12, 12],
    }
    .unwrap();
    let grab = assign_row_id("tbl_grabevent", grab).unwrap();

    let orphans = missing_matches_on(
        TableRef::new("tbl_grabevent", &grab),
        TableRef::new("tbl_stationoccupation", &occupation),
        &[("stationid", "stationid"), ("sampledate", "occupationdate")],
    )
    .unwrap();
    assert_eq!(orphans, vec![RowId(1)]);

    // 10 and 10.0 render the same; 12 and 12.5 do not.
    let orphans = missing_matches(
        TableRef::new("tbl_grabevent", &grab),
        TableRef::new("tbl_stationoccupation", &occupation),
        &["depth"],
    )
    .unwrap();
    assert_eq!(orphans, vec![RowId(1), RowId(2)]);
}

#[test]
fn duplicate_targets_count_once_and_derived_frames_keep_ids() {
    let results = results();
    let mut batch = batch();
    batch = batch.vstack(&batch).unwrap();

    let mask = BooleanChunked::from_slice("m".into(), &[false, true, true]);
    let tail = results.filter(&mask).unwrap();
    let orphans = missing_matches(
        TableRef::new("tbl_chemresults", &tail),
        TableRef::new("tbl_chembatch", &batch),
        KEYS,
    )
    .unwrap();
    assert_eq!(orphans, vec![RowId(1)]);
}

#[test]
fn empty_key_list_is_rejected() {
    let results = results();
    let r = TableRef::new("tbl_chemresults", &results);
    assert!(matches!(
        missing_matches(r, r, &[]),
        Err(CheckError::InvalidArgument { .. })
    ));
}

#[test]
fn missing_target_column_names_the_target() {
    let results = results();
    let batch = df! { "lab" => &["A"] }.unwrap();
    let err = missing_matches(
        TableRef::new("tbl_chemresults", &results),
        TableRef::new("tbl_chembatch", &batch),
        KEYS,
    )
    .unwrap_err();
    match err {
        CheckError::MissingColumn { table, columns } => {
            assert_eq!(table, "tbl_chembatch");
            assert_eq!(columns, vec!["preparationbatchid"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
