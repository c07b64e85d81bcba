use intake_ingest::assign_row_id;
use intake_model::{Category, FindingRequest, RowId};
use intake_validate::{CheckError, RequireAnyPerGroup, RequiredPerGroup};
use polars::prelude::*;

const GROUP: &[&str] = &["analysisbatchid", "analyteclass"];

fn results() -> DataFrame {
    let df = df! {
        "analysisbatchid" => &["B1", "B1", "B2", "B1", "B3", "B3"],
        "analyteclass" => &["Metal", "Metal", "Metal", "PAH", "Metal", "Metal"],
        "sampletype" => &["Result", "Method blank", "Result", "Result", "Result", "Reference Material"],
    }
    .unwrap();
    assign_row_id("tbl_chemresults", df).unwrap()
}

fn request() -> FindingRequest {
    FindingRequest::error("tbl_chemresults", Category::MissingData).with_columns("SampleType")
}

#[test]
fn flags_whole_group_missing_required_values() {
    let df = results();
    let findings = RequiredPerGroup::new(GROUP, "sampletype", ["Result", "Method blank"])
        .with_filter(|row| row.str("analyteclass") == "Metal")
        .check("tbl_chemresults", &df, &request(), None)
        .unwrap();

    assert_eq!(findings.len(), 2);
    let b2 = &findings[0];
    assert_eq!(b2.rows().iter().copied().collect::<Vec<_>>(), vec![RowId(2)]);
    assert_eq!(b2.group().get("analysisbatchid").map(String::as_str), Some("B2"));
    let b3 = &findings[1];
    assert_eq!(b3.rows().iter().copied().collect::<Vec<_>>(), vec![RowId(4), RowId(5)]);
}

#[test]
fn superset_groups_are_not_flagged() {
    let df = results();
    let findings = RequiredPerGroup::new(GROUP, "sampletype", ["Result"])
        .check("tbl_chemresults", &df, &request(), None)
        .unwrap();
    assert!(findings.is_empty());
}

#[test]
fn empty_required_set_never_flags() {
    let df = results();
    let findings = RequiredPerGroup::new(GROUP, "sampletype", Vec::<String>::new())
        .check("tbl_chemresults", &df, &request(), None)
        .unwrap();
    assert!(findings.is_empty());
}

#[test]
fn filter_matching_nothing_means_rule_does_not_apply() {
    let df = results();
    let findings = RequiredPerGroup::new(GROUP, "sampletype", ["Matrix spike"])
        .with_filter(|row| row.str("analyteclass") == "PCB")
        .check("tbl_chemresults", &df, &request(), None)
        .unwrap();
    assert!(findings.is_empty());
}

#[test]
fn missing_category_column_is_an_authoring_error() {
    let df = results();
    let err = RequiredPerGroup::new(GROUP, "labreplicate", ["1"])
        .check("tbl_chemresults", &df, &request(), None)
        .unwrap_err();
    assert!(matches!(err, CheckError::MissingColumn { .. }));
}

#[test]
fn missing_sampletype_messages() {
    let df = df! {
        "analysisbatchid" => &["B1", "B1", "B2", "B1"],
        "analyteclass" => &["Metal", "Metal", "Metal", "PAH"],
        "sampletype" => &["Result", "Method blank", "Result", "Result"],
    }
    .unwrap();
    let df = assign_row_id("tbl_chemresults", df).unwrap();

    let findings = RequiredPerGroup::new(
        GROUP,
        "sampletype",
        ["Result", "Method blank", "Blank spike"],
    )
    .with_filter(|row| row.str("analyteclass") == "Metal")
    .check("tbl_chemresults", &df, &request(), None)
    .unwrap();

    let messages: Vec<&str> = findings.iter().map(|f| f.message()).collect();
    insta::assert_snapshot!(messages.join("\n"));
}

#[test]
fn batches_without_reference_material_are_flagged() {
    let df = results();
    let request = request().with_message("you are missing a Certified Reference Material");
    let findings = RequireAnyPerGroup::new(GROUP, &["sampletype"], |row| {
        row.contains_ci("sampletype", "reference")
    })
    .with_filter(|row| row.str("analyteclass") == "Metal")
    .check("tbl_chemresults", &df, &request, None)
    .unwrap();

    let flagged: Vec<Vec<RowId>> = findings
        .iter()
        .map(|f| f.rows().iter().copied().collect())
        .collect();
    assert_eq!(flagged, vec![vec![RowId(0), RowId(1)], vec![RowId(2)]]);
    assert_eq!(
        findings[0].message(),
        "For analysisbatchid B1 and analyteclass Metal, you are missing a Certified Reference Material"
    );
}
