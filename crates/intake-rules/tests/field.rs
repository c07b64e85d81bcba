use intake_ingest::TableSet;
use intake_model::{Category, Finding, RuleResult};
use intake_reference::{
    Boundary, BoundaryLookup, GeoPoint, Polygon, ReferenceStore, ReferenceTable, StratumAliases,
};
use intake_rules::{FIELD_GRAB, FIELD_TRAWL, engine_for};
use intake_validate::ValidationContext;
use polars::prelude::*;

fn square(x0: f64, y0: f64, size: f64) -> Boundary {
    Boundary::new(vec![Polygon::from_exterior(vec![
        GeoPoint::new(x0, y0),
        GeoPoint::new(x0 + size, y0),
        GeoPoint::new(x0 + size, y0 + size),
        GeoPoint::new(x0, y0 + size),
        GeoPoint::new(x0, y0),
    ])])
}

fn boundaries() -> BoundaryLookup {
    BoundaryLookup::new(
        vec![
            ("R1".to_string(), "Bays".to_string(), square(0.0, 0.0, 1.0)),
            ("R1".to_string(), "Shelf".to_string(), square(2.0, 0.0, 1.0)),
        ],
        StratumAliases::new(),
    )
}

fn reference() -> ReferenceStore {
    ReferenceStore::new()
        .with_table(ReferenceTable::from_records(
            "field_assignment_table",
            &["stationid", "region", "stratum", "targetlongitude", "targetlatitude"],
            &[
                &["S1", "R1", "Bays", "0.5", "0.5"],
                &["S2", "R1", "Shelf", "2.5", "0.5"],
                &["S3", "R1", "Ports", "", ""],
            ],
        ))
        .with_table(ReferenceTable::from_records(
            "lu_depthunits",
            &["depthunits"],
            &[&["m"]],
        ))
}

fn occupation() -> DataFrame {
    df! {
        "stationid" => &["S1", "S2", "S3"],
        "occupationdate" => &["2024-07-01", "2024-07-01", "2024-07-02"],
        "samplingorganization" => &["OrgA", "OrgA", "OrgA"],
        "occupationtime" => &["09:30:00", "25:00:00", "10:00:00"],
        "occupationdepthunits" => &["m", "ft", "M"],
    }
    .unwrap()
}

fn grab_tables() -> TableSet {
    let grab = df! {
        "stationid" => &["S1", "S2", "S9", "S3"],
        "sampledate" => &["2024-07-01", "2024-07-01", "2024-07-01", "2024-07-03"],
        "samplingorganization" => &["OrgA", "OrgA", "OrgA", "OrgA"],
        "sampletime" => &["09:45:00", "9:50:00", "10:61:00", "11:00:00"],
        "longitude" => &[0.5, 0.5, 0.5, 5.0],
        "latitude" => &[0.5, 0.5, 0.5, 5.0],
    }
    .unwrap();
    TableSet::new()
        .with_table("tbl_stationoccupation", occupation())
        .unwrap()
        .with_table("tbl_grabevent", grab)
        .unwrap()
}

fn rows_of(findings: &[Finding], table: &str, message_part: &str) -> Vec<u32> {
    let finding = findings
        .iter()
        .find(|f| f.table() == table && f.message().contains(message_part))
        .unwrap_or_else(|| panic!("no finding on {table} containing {message_part:?}"));
    finding.rows().iter().map(|r| r.get()).collect()
}

fn run(dataset: &str, tables: &TableSet, with_boundaries: bool) -> RuleResult {
    let store = reference();
    let lookup = boundaries();
    let mut ctx = ValidationContext::new("field-1", &store);
    if with_boundaries {
        ctx = ctx.with_boundaries(&lookup);
    }
    let run = engine_for(dataset).unwrap().run(&ctx, tables);
    assert!(run.failed_modules().next().is_none());
    run.combined()
}

#[test]
fn grab_checks_cover_logic_format_lookup_and_location() {
    let result = run(FIELD_GRAB, &grab_tables(), true);
    let grab = "tbl_grabevent";
    let occ = "tbl_stationoccupation";

    assert_eq!(rows_of(&result.errors, grab, "corresponding Occupation"), vec![2, 3]);
    assert_eq!(rows_of(&result.errors, occ, "OccupationTime"), vec![1]);
    assert_eq!(rows_of(&result.errors, occ, "OccupationDepthUnits"), vec![1]);
    assert_eq!(rows_of(&result.errors, grab, "SampleTime"), vec![2]);
    assert_eq!(rows_of(&result.errors, grab, "field assignment table"), vec![2]);
    assert_eq!(rows_of(&result.errors, grab, "outside of its assigned strata"), vec![1]);
    assert_eq!(rows_of(&result.errors, grab, "R1/Ports"), vec![3]);
    assert_eq!(result.error_count(), 7);

    assert_eq!(rows_of(&result.warnings, occ, "no matching Grab"), vec![2]);
    assert_eq!(rows_of(&result.warnings, grab, "Nominal Target"), vec![1]);
    assert_eq!(result.warning_count(), 2);
    assert!(
        result
            .warnings
            .iter()
            .any(|f| f.category() == Category::Location)
    );
}

#[test]
fn strata_checks_are_skipped_without_a_boundary_layer() {
    let result = run(FIELD_GRAB, &grab_tables(), false);

    assert_eq!(result.error_count(), 5);
    assert!(
        result
            .errors
            .iter()
            .all(|f| f.category() != Category::Location)
    );
}

#[test]
fn trawl_segment_leaving_its_stratum_is_flagged() {
    let occupation = df! {
        "stationid" => &["S1"],
        "occupationdate" => &["2024-07-01"],
        "samplingorganization" => &["OrgA"],
        "occupationtime" => &["08:00:00"],
        "occupationdepthunits" => &["m"],
        "collectiontype" => &["Trawl 10 Minutes"],
    }
    .unwrap();
    let trawl = df! {
        "stationid" => &["S1", "S1"],
        "sampledate" => &["2024-07-01", "2024-07-01"],
        "samplingorganization" => &["OrgA", "OrgA"],
        "starttime" => &["08:10:00", "08:30:00"],
        "endtime" => &["08:20:00", "8:45"],
        "startlongitude" => &[0.2, 0.5],
        "startlatitude" => &[0.2, 0.5],
        "endlongitude" => &[0.8, 2.5],
        "endlatitude" => &[0.8, 0.5],
    }
    .unwrap();
    let tables = TableSet::new()
        .with_table("tbl_stationoccupation", occupation)
        .unwrap()
        .with_table("tbl_trawlevent", trawl)
        .unwrap();

    let result = run(FIELD_TRAWL, &tables, true);

    assert_eq!(rows_of(&result.errors, "tbl_trawlevent", "EndTime"), vec![1]);
    assert_eq!(
        rows_of(&result.errors, "tbl_trawlevent", "outside of its assigned strata"),
        vec![1]
    );
    assert_eq!(result.error_count(), 2);
    assert_eq!(result.warning_count(), 0);
}

#[test]
fn trawl_line_far_from_target_is_warned() {
    let occupation = df! {
        "stationid" => &["S1"],
        "occupationdate" => &["2024-07-01"],
        "samplingorganization" => &["OrgA"],
        "occupationtime" => &["08:00:00"],
        "occupationdepthunits" => &["m"],
        "collectiontype" => &["Trawl 10 Minutes"],
    }
    .unwrap();
    let trawl = df! {
        "stationid" => &["S1", "S1"],
        "sampledate" => &["2024-07-01", "2024-07-01"],
        "samplingorganization" => &["OrgA", "OrgA"],
        "starttime" => &["08:10:00", "08:30:00"],
        "endtime" => &["08:20:00", "08:45:00"],
        "startlongitude" => &[0.4, 0.1],
        "startlatitude" => &[0.5, 0.1],
        "endlongitude" => &[0.6, 0.2],
        "endlatitude" => &[0.5, 0.1],
    }
    .unwrap();
    let tables = TableSet::new()
        .with_table("tbl_stationoccupation", occupation)
        .unwrap()
        .with_table("tbl_trawlevent", trawl)
        .unwrap();

    let result = run(FIELD_TRAWL, &tables, true);

    assert_eq!(result.error_count(), 0);
    assert_eq!(
        rows_of(&result.warnings, "tbl_trawlevent", "Nominal Target"),
        vec![1]
    );
    assert_eq!(result.warning_count(), 1);
}

#[test]
fn blank_grab_coordinates_are_reported_without_boundaries() {
    let grab = df! {
        "stationid" => &["S1", "S1"],
        "sampledate" => &["2024-07-01", "2024-07-01"],
        "samplingorganization" => &["OrgA", "OrgA"],
        "sampletime" => &["09:45:00", "09:55:00"],
        "longitude" => &[Some(0.5), Some(0.5)],
        "latitude" => &[Some(0.5), None],
    }
    .unwrap();
    let tables = TableSet::new()
        .with_table("tbl_stationoccupation", occupation())
        .unwrap()
        .with_table("tbl_grabevent", grab)
        .unwrap();

    for with_boundaries in [false, true] {
        let result = run(FIELD_GRAB, &tables, with_boundaries);
        assert_eq!(
            rows_of(&result.errors, "tbl_grabevent", "Missing Lat/Lon"),
            vec![1]
        );
        assert!(
            result
                .errors
                .iter()
                .any(|f| f.category() == Category::MissingData)
        );
    }
}

fn trawl_standard_tables() -> TableSet {
    let occupation = df! {
        "stationid" => &["S1", "S1"],
        "occupationdate" => &["2024-07-01", "2024-07-02"],
        "samplingorganization" => &["OrgA", "OrgA"],
        "occupationtime" => &["08:00:00", "08:00:00"],
        "occupationdepthunits" => &["m", "m"],
        "collectiontype" => &["Trawl 5 Minutes", "Trawl 10 Minutes"],
    }
    .unwrap();
    let trawl = df! {
        "stationid" => &["S1", "S1", "S1"],
        "sampledate" => &["2024-07-01", "2024-07-02", "2024-07-02"],
        "samplingorganization" => &["OrgA", "OrgA", "OrgA"],
        "starttime" => &["08:00:00", "09:00:00", "10:00:00"],
        "endtime" => &["08:12:00", "09:07:30", "10:10:00"],
        "startlongitude" => &[Some(0.5), Some(0.5), Some(0.5)],
        "startlatitude" => &[Some(0.5), Some(0.497), Some(0.497)],
        "endlongitude" => &[Some(0.5), Some(0.5), None],
        "endlatitude" => &[Some(0.501), Some(0.503), Some(0.503)],
    }
    .unwrap();
    TableSet::new()
        .with_table("tbl_stationoccupation", occupation)
        .unwrap()
        .with_table("tbl_trawlevent", trawl)
        .unwrap()
}

#[test]
fn trawl_duration_and_length_follow_the_collection_type() {
    let result = run(FIELD_TRAWL, &trawl_standard_tables(), false);
    let trawl = "tbl_trawlevent";

    assert_eq!(
        rows_of(&result.warnings, trawl, "5 minute trawl should be between"),
        vec![0]
    );
    assert_eq!(
        rows_of(&result.warnings, trawl, "5 minute trawl should be greater than 325 m"),
        vec![0]
    );
    assert_eq!(
        rows_of(&result.warnings, trawl, "10 minute trawl should be between 8 and 16"),
        vec![1]
    );
    assert_eq!(result.warning_count(), 3);

    assert_eq!(rows_of(&result.errors, trawl, "Missing Lat/Lon"), vec![2]);
    assert_eq!(result.error_count(), 1);
}
