//! Field sampling: station occupations with grab or trawl events.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveTime;
use polars::prelude::DataFrame;
use regex::Regex;
use tracing::debug;

use intake_common::parse_trimmed;
use intake_ingest::TableSet;
use intake_model::{Category, FindingRequest, RowId, RuleResult};
use intake_reference::{
    GeoPoint, ReferenceSource, ReferenceTable, distance_to_segment_m, haversine_m,
};
use intake_validate::{
    AssignmentColumns, CheckError, ColumnReader, Geometry, LookupOptions, Normalization,
    RowView, RuleModule, SpatialOutcome, TableRef, ValidationContext, flag_rows, in_assigned_region,
    invalid_lookup_rows, missing_matches_on,
};
use intake_validate::spatial::point;

pub const OCCUPATION: &str = "tbl_stationoccupation";
pub const GRAB: &str = "tbl_grabevent";
pub const TRAWL: &str = "tbl_trawlevent";
pub const ASSIGNMENT: &str = "field_assignment_table";
const DEPTH_UNITS: &str = "lu_depthunits";

/// Occupation and event records match on station, date, and organization.
const EVENT_KEYS: &[(&str, &str)] = &[
    ("stationid", "stationid"),
    ("sampledate", "occupationdate"),
    ("samplingorganization", "samplingorganization"),
];

const MAX_TARGET_DISTANCE_M: f64 = 100.0;

static TIME_24H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$").expect("Invalid time regex")
});

/// True for `H:MM:SS` or `HH:MM:SS` on a 24 hour clock.
pub fn is_valid_time(value: &str) -> bool {
    TIME_24H.is_match(value.trim())
}

/// Whole minutes between two same-day clock times, ignoring order.
///
/// `None` unless both values pass [`is_valid_time`].
pub fn minutes_between(start: &str, end: &str) -> Option<i64> {
    let parse = |value: &str| {
        if !is_valid_time(value) {
            return None;
        }
        NaiveTime::parse_from_str(value.trim(), "%H:%M:%S").ok()
    };
    Some((parse(end)? - parse(start)?).num_minutes().abs())
}

/// Expected duration and minimum length for one kind of trawl.
struct TrawlStandard {
    collection_type: &'static str,
    label: &'static str,
    min_minutes: i64,
    max_minutes: i64,
    min_length_m: f64,
}

const TRAWL_STANDARDS: &[TrawlStandard] = &[
    TrawlStandard {
        collection_type: "trawl 10 minutes",
        label: "10",
        min_minutes: 8,
        max_minutes: 16,
        min_length_m: 650.0,
    },
    TrawlStandard {
        collection_type: "trawl 5 minutes",
        label: "5",
        min_minutes: 4,
        max_minutes: 8,
        min_length_m: 325.0,
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldGrabModule;

impl RuleModule for FieldGrabModule {
    fn name(&self) -> &str {
        "field_grab"
    }

    fn tables(&self) -> &[&'static str] {
        &[OCCUPATION, GRAB]
    }

    fn check(&self, ctx: &ValidationContext<'_>, tables: &TableSet) -> Result<RuleResult, CheckError> {
        let occupation = tables.require(OCCUPATION)?;
        let grab = tables.require(GRAB)?;
        let mut out = RuleResult::new();

        check_event_logic(ctx, occupation, GRAB, grab, "Grab", &mut out)?;
        check_occupation(ctx, occupation, &mut out)?;
        check_time(ctx, GRAB, grab, "sampletime", "SampleTime", &mut out)?;

        let assignment = ctx.reference().require(ASSIGNMENT)?;
        check_assigned_station(ctx, GRAB, grab, assignment, &mut out)?;
        check_coordinates_present(
            ctx,
            GRAB,
            grab,
            &[("longitude", "latitude")],
            "Latitude, Longitude",
            &mut out,
        )?;
        check_target_distance(
            ctx,
            GRAB,
            grab,
            assignment,
            &["longitude", "latitude"],
            FindingRequest::warning(GRAB, Category::Location)
                .with_columns("Latitude, Longitude")
                .with_message("Grab Distance to Nominal Target > 100m"),
            |row, target| point(row, "longitude", "latitude").map(|p| haversine_m(p, target)),
            &mut out,
        )?;

        if let Some(boundaries) = ctx.boundaries() {
            let outcome = in_assigned_region(
                GRAB,
                grab,
                "stationid",
                Geometry::Point {
                    lon: "longitude",
                    lat: "latitude",
                },
                boundaries,
                assignment,
                AssignmentColumns::default(),
            )?;
            record_strata(ctx, GRAB, "Latitude, Longitude", &outcome, &mut out);
        } else {
            debug!("no boundary layer configured; skipping grab strata check");
        }
        Ok(out)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldTrawlModule;

impl RuleModule for FieldTrawlModule {
    fn name(&self) -> &str {
        "field_trawl"
    }

    fn tables(&self) -> &[&'static str] {
        &[OCCUPATION, TRAWL]
    }

    fn check(&self, ctx: &ValidationContext<'_>, tables: &TableSet) -> Result<RuleResult, CheckError> {
        let occupation = tables.require(OCCUPATION)?;
        let trawl = tables.require(TRAWL)?;
        let mut out = RuleResult::new();

        check_event_logic(ctx, occupation, TRAWL, trawl, "Trawl", &mut out)?;
        check_occupation(ctx, occupation, &mut out)?;
        check_time(ctx, TRAWL, trawl, "starttime", "StartTime", &mut out)?;
        check_time(ctx, TRAWL, trawl, "endtime", "EndTime", &mut out)?;

        let assignment = ctx.reference().require(ASSIGNMENT)?;
        check_assigned_station(ctx, TRAWL, trawl, assignment, &mut out)?;
        check_coordinates_present(
            ctx,
            TRAWL,
            trawl,
            &[("startlongitude", "startlatitude"), ("endlongitude", "endlatitude")],
            "StartLatitude, StartLongitude, EndLatitude, EndLongitude",
            &mut out,
        )?;
        check_trawl_standards(ctx, occupation, trawl, &mut out)?;
        check_target_distance(
            ctx,
            TRAWL,
            trawl,
            assignment,
            &["startlongitude", "startlatitude", "endlongitude", "endlatitude"],
            FindingRequest::warning(TRAWL, Category::Location)
                .with_columns("StartLatitude, StartLongitude, EndLatitude, EndLongitude")
                .with_message("Trawl line passes more than 100m from the Nominal Target"),
            |row, target| {
                let start = point(row, "startlongitude", "startlatitude")?;
                let end = point(row, "endlongitude", "endlatitude")?;
                Some(distance_to_segment_m(target, start, end))
            },
            &mut out,
        )?;

        if let Some(boundaries) = ctx.boundaries() {
            let outcome = in_assigned_region(
                TRAWL,
                trawl,
                "stationid",
                Geometry::Segment {
                    start_lon: "startlongitude",
                    start_lat: "startlatitude",
                    end_lon: "endlongitude",
                    end_lat: "endlatitude",
                },
                boundaries,
                assignment,
                AssignmentColumns::default(),
            )?;
            record_strata(
                ctx,
                TRAWL,
                "StartLatitude, StartLongitude, EndLatitude, EndLongitude",
                &outcome,
                &mut out,
            );
        } else {
            debug!("no boundary layer configured; skipping trawl strata check");
        }
        Ok(out)
    }
}

fn check_event_logic(
    ctx: &ValidationContext<'_>,
    occupation: &DataFrame,
    event_table: &str,
    events: &DataFrame,
    label: &str,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let occ = TableRef::new(OCCUPATION, occupation);
    let ev = TableRef::new(event_table, events);
    let reversed: Vec<(&str, &str)> = EVENT_KEYS.iter().map(|(e, o)| (*o, *e)).collect();

    out.extend([
        ctx.record(
            &FindingRequest::error(event_table, Category::Logic)
                .with_columns("StationID, SampleDate, SamplingOrganization")
                .with_message(format!(
                    "Each {label} record must have a corresponding Occupation record. Records are matched on StationID, SampleDate, and SamplingOrganization."
                )),
            missing_matches_on(ev, occ, EVENT_KEYS)?,
        ),
        ctx.record(
            &FindingRequest::warning(OCCUPATION, Category::Logic)
                .with_columns("StationID, OccupationDate, SamplingOrganization")
                .with_message(format!(
                    "This Occupation record has no matching {label} record. Records are matched on StationID, OccupationDate, and SamplingOrganization."
                )),
            missing_matches_on(occ, ev, &reversed)?,
        ),
    ]);
    Ok(())
}

fn check_occupation(
    ctx: &ValidationContext<'_>,
    occupation: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    check_time(ctx, OCCUPATION, occupation, "occupationtime", "OccupationTime", out)?;

    let units = ctx.reference().values(DEPTH_UNITS, "depthunits")?;
    let bad = invalid_lookup_rows(
        OCCUPATION,
        occupation,
        "occupationdepthunits",
        &units,
        &LookupOptions::default().with_normalization(Normalization::TrimCaseInsensitive),
    )?;
    out.extend([ctx.record(
        &FindingRequest::error(OCCUPATION, Category::Lookup)
            .with_columns("OccupationDepthUnits")
            .with_message("OccupationDepthUnits must be a depth unit from lu_depthunits (meters, not feet)"),
        bad,
    )]);
    Ok(())
}

fn check_time(
    ctx: &ValidationContext<'_>,
    table: &str,
    df: &DataFrame,
    column: &str,
    label: &str,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let request = FindingRequest::error(table, Category::Format)
        .with_columns(label)
        .with_message(format!(
            "The column {label} is not in a valid 24 hour clock format (HH:MM:SS)"
        ));
    out.extend([flag_rows(table, df, &[column], &request, ctx.sink(), |row| {
        !row.is_missing(column) && !is_valid_time(&row.str(column))
    })?]);
    Ok(())
}

fn check_assigned_station(
    ctx: &ValidationContext<'_>,
    table: &str,
    df: &DataFrame,
    assignment: &ReferenceTable,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let stations = assignment.values("stationid")?;
    let bad = invalid_lookup_rows(table, df, "stationid", &stations, &LookupOptions::default())?;
    out.extend([ctx.record(
        &FindingRequest::error(table, Category::Lookup)
            .with_columns("StationID")
            .with_message("Could not match submitted StationID to field assignment table"),
        bad,
    )]);
    Ok(())
}

/// Warn when an event lies more than 100 m from its station's nominal target.
///
/// `distance` measures one submitted row against the target, returning `None`
/// when the row's coordinates are unusable.
#[allow(clippy::too_many_arguments)]
fn check_target_distance(
    ctx: &ValidationContext<'_>,
    table: &str,
    df: &DataFrame,
    assignment: &ReferenceTable,
    coordinates: &[&str],
    request: FindingRequest,
    distance: impl Fn(&RowView<'_, '_>, GeoPoint) -> Option<f64>,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let mut targets: BTreeMap<&str, GeoPoint> = BTreeMap::new();
    for row in assignment.rows() {
        let coord = |column: &str| row.get(column).and_then(|v| parse_trimmed::<f64>(v));
        if let (Some(station), Some(lon), Some(lat)) = (
            row.get("stationid"),
            coord("targetlongitude"),
            coord("targetlatitude"),
        ) {
            targets.entry(station.as_str()).or_insert(GeoPoint::new(lon, lat));
        }
    }

    let mut required = vec!["stationid"];
    required.extend_from_slice(coordinates);
    let reader = ColumnReader::checked(table, df, &required)?;
    let mut far: Vec<RowId> = Vec::new();
    for row in reader.rows() {
        let Some(target) = targets.get(row.str("stationid").as_str()) else {
            continue;
        };
        if distance(&row, *target).is_some_and(|d| d > MAX_TARGET_DISTANCE_M) {
            far.push(row.row_id()?);
        }
    }
    out.extend([ctx.record(&request, far)]);
    Ok(())
}

/// Rows whose coordinates are blank or not numeric can't be placed at all.
fn check_coordinates_present(
    ctx: &ValidationContext<'_>,
    table: &str,
    df: &DataFrame,
    pairs: &[(&str, &str)],
    columns: &str,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let required: Vec<&str> = pairs.iter().flat_map(|(lon, lat)| [*lon, *lat]).collect();
    let request = FindingRequest::error(table, Category::MissingData)
        .with_columns(columns)
        .with_message("Missing Lat/Lon entries: coordinates must be present and numeric");
    out.extend([flag_rows(table, df, &required, &request, ctx.sink(), |row| {
        pairs.iter().any(|(lon, lat)| point(row, lon, lat).is_none())
    })?]);
    Ok(())
}

/// Warn when a trawl's duration or start-to-end length is off for the
/// collection type recorded on its occupation.
fn check_trawl_standards(
    ctx: &ValidationContext<'_>,
    occupation: &DataFrame,
    trawl: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let occ = ColumnReader::checked(
        OCCUPATION,
        occupation,
        &["stationid", "occupationdate", "samplingorganization", "collectiontype"],
    )?;
    let mut collection_types: BTreeMap<[String; 3], String> = BTreeMap::new();
    for row in occ.rows() {
        let key = [
            row.str("stationid"),
            row.str("occupationdate"),
            row.str("samplingorganization"),
        ];
        collection_types
            .entry(key)
            .or_insert_with(|| row.str("collectiontype").trim().to_lowercase());
    }

    let reader = ColumnReader::checked(
        TRAWL,
        trawl,
        &[
            "stationid",
            "sampledate",
            "samplingorganization",
            "starttime",
            "endtime",
            "startlongitude",
            "startlatitude",
            "endlongitude",
            "endlatitude",
        ],
    )?;
    let mut bad_time: Vec<Vec<RowId>> = vec![Vec::new(); TRAWL_STANDARDS.len()];
    let mut bad_length: Vec<Vec<RowId>> = vec![Vec::new(); TRAWL_STANDARDS.len()];
    for row in reader.rows() {
        let key = [
            row.str("stationid"),
            row.str("sampledate"),
            row.str("samplingorganization"),
        ];
        let Some(kind) = collection_types.get(&key) else {
            continue;
        };
        let Some(idx) = TRAWL_STANDARDS
            .iter()
            .position(|standard| standard.collection_type == kind.as_str())
        else {
            continue;
        };
        let standard = &TRAWL_STANDARDS[idx];

        if let Some(minutes) = minutes_between(&row.str("starttime"), &row.str("endtime"))
            && !(standard.min_minutes..=standard.max_minutes).contains(&minutes)
        {
            bad_time[idx].push(row.row_id()?);
        }
        if let (Some(start), Some(end)) = (
            point(&row, "startlongitude", "startlatitude"),
            point(&row, "endlongitude", "endlatitude"),
        ) && haversine_m(start, end) < standard.min_length_m
        {
            bad_length[idx].push(row.row_id()?);
        }
    }

    for ((standard, time_rows), length_rows) in TRAWL_STANDARDS.iter().zip(bad_time).zip(bad_length) {
        out.extend([
            ctx.record(
                &FindingRequest::warning(TRAWL, Category::Range)
                    .with_columns("StartTime, EndTime")
                    .with_message(format!(
                        "A {} minute trawl should be between {} and {} minutes",
                        standard.label, standard.min_minutes, standard.max_minutes
                    )),
                time_rows,
            ),
            ctx.record(
                &FindingRequest::warning(TRAWL, Category::Range)
                    .with_columns("StartLatitude, StartLongitude, EndLatitude, EndLongitude")
                    .with_message(format!(
                        "A {} minute trawl should be greater than {} m",
                        standard.label, standard.min_length_m
                    )),
                length_rows,
            ),
        ]);
    }
    Ok(())
}

fn record_strata(
    ctx: &ValidationContext<'_>,
    table: &str,
    columns: &str,
    outcome: &SpatialOutcome,
    out: &mut RuleResult,
) {
    let base = FindingRequest::error(table, Category::Location).with_columns(columns);
    let unresolved_keys: Vec<String> = outcome
        .unresolved_keys
        .iter()
        .map(|(region, stratum)| format!("{region}/{stratum}"))
        .collect();
    out.extend([
        ctx.record(
            &base
                .clone()
                .with_message("This station has lat, long outside of its assigned strata"),
            outcome.outside.iter().copied(),
        ),
        ctx.record(
            &base.with_message(format!(
                "No strata boundary is registered for this station's region and stratum ({}); the location could not be checked. Please contact the data manager.",
                unresolved_keys.join(", ")
            )),
            outcome.unresolved.iter().copied(),
        ),
    ]);
}
