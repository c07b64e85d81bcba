//! Point and segment containment against assigned boundaries.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use tracing::debug;

use intake_model::RowId;
use intake_reference::{BoundaryLookup, GeoPoint, ReferenceTable};

use crate::column_reader::{ColumnReader, RowView};
use crate::error::Result;

/// Coordinate columns of the checked table.
#[derive(Debug, Clone, Copy)]
pub enum Geometry<'a> {
    Point {
        lon: &'a str,
        lat: &'a str,
    },
    /// A line from start to end; all of it must be inside.
    Segment {
        start_lon: &'a str,
        start_lat: &'a str,
        end_lon: &'a str,
        end_lat: &'a str,
    },
}

impl<'a> Geometry<'a> {
    fn columns(&self) -> Vec<&'a str> {
        match *self {
            Self::Point { lon, lat } => vec![lon, lat],
            Self::Segment {
                start_lon,
                start_lat,
                end_lon,
                end_lat,
            } => vec![start_lon, start_lat, end_lon, end_lat],
        }
    }
}

/// Station, region and stratum columns of the assignment table.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentColumns<'a> {
    pub station: &'a str,
    pub region: &'a str,
    pub stratum: &'a str,
}

impl Default for AssignmentColumns<'_> {
    fn default() -> Self {
        Self {
            station: "stationid",
            region: "region",
            stratum: "stratum",
        }
    }
}

/// Rows that failed containment, by failure kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialOutcome {
    /// Boundary resolved, geometry not inside it.
    pub outside: Vec<RowId>,
    /// The row's (region, stratum) has no boundary.
    pub unresolved: Vec<RowId>,
    /// Distinct (region, stratum) pairs behind `unresolved`.
    pub unresolved_keys: BTreeSet<(String, String)>,
    /// The row's station is not in the assignment table.
    pub unassigned: Vec<RowId>,
    /// A coordinate is missing or not numeric.
    pub missing_coordinates: Vec<RowId>,
}

/// Check that each row's geometry lies within the boundary of its assigned
/// (region, stratum).
pub fn in_assigned_region(
    table: &str,
    df: &DataFrame,
    station_column: &str,
    geometry: Geometry<'_>,
    boundaries: &BoundaryLookup,
    assignment: &ReferenceTable,
    columns: AssignmentColumns<'_>,
) -> Result<SpatialOutcome> {
    let mut required = geometry.columns();
    required.push(station_column);
    let reader = ColumnReader::checked(table, df, &required)?;

    let mut assigned: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
    for row in assignment.rows() {
        let station = row.get(columns.station).map_or("", String::as_str);
        let region = row.get(columns.region).map_or("", String::as_str);
        let stratum = row.get(columns.stratum).map_or("", String::as_str);
        if !station.is_empty() {
            assigned.entry(station).or_insert((region, stratum));
        }
    }

    let mut outcome = SpatialOutcome::default();
    for row in reader.rows() {
        let row_id = row.row_id()?;
        let station = row.str(station_column);
        let Some(&(region, stratum)) = assigned.get(station.as_str()) else {
            outcome.unassigned.push(row_id);
            continue;
        };
        let Some(boundary) = boundaries.get(region, stratum) else {
            outcome.unresolved.push(row_id);
            outcome
                .unresolved_keys
                .insert((region.to_string(), stratum.to_string()));
            continue;
        };
        let inside = match geometry {
            Geometry::Point { lon, lat } => {
                point(&row, lon, lat).map(|p| boundary.contains_point(p))
            }
            Geometry::Segment {
                start_lon,
                start_lat,
                end_lon,
                end_lat,
            } => point(&row, start_lon, start_lat)
                .zip(point(&row, end_lon, end_lat))
                .map(|(a, b)| boundary.contains_segment(a, b)),
        };
        match inside {
            Some(true) => {}
            Some(false) => outcome.outside.push(row_id),
            None => outcome.missing_coordinates.push(row_id),
        }
    }

    debug!(
        table,
        outside = outcome.outside.len(),
        unresolved = outcome.unresolved.len(),
        unassigned = outcome.unassigned.len(),
        "spatial containment"
    );
    Ok(outcome)
}

/// Point read from a row's lon/lat columns, if both are finite numbers.
pub fn point(row: &RowView<'_, '_>, lon: &str, lat: &str) -> Option<GeoPoint> {
    let p = GeoPoint::new(row.f64(lon)?, row.f64(lat)?);
    p.is_finite().then_some(p)
}
