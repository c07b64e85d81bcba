//! Minimal GeoJSON FeatureCollection reader for Polygon and MultiPolygon
//! features.

use std::path::Path;

use serde_json::Value;

use crate::error::ReferenceError;
use crate::geometry::{Boundary, GeoPoint, Polygon};

/// A boundary feature with its region and stratum labels.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub region: String,
    pub stratum: String,
    pub boundary: Boundary,
}

pub fn read_boundary_features(
    path: &Path,
    region_field: &str,
    stratum_field: &str,
) -> Result<Vec<BoundaryFeature>, ReferenceError> {
    let text = std::fs::read_to_string(path).map_err(|e| ReferenceError::io(path, e))?;
    parse_boundary_features(&text, region_field, stratum_field).map_err(|message| {
        ReferenceError::GeoJson {
            path: path.to_path_buf(),
            message,
        }
    })
}

pub fn parse_boundary_features(
    text: &str,
    region_field: &str,
    stratum_field: &str,
) -> Result<Vec<BoundaryFeature>, String> {
    let root: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| "expected a FeatureCollection with a features array".to_string())?;

    let mut out = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let properties = feature.get("properties");
        let label = |field: &str| {
            properties
                .and_then(|p| p.get(field))
                .and_then(property_string)
                .ok_or_else(|| format!("feature {idx}: missing property '{field}'"))
        };
        let region = label(region_field)?;
        let stratum = label(stratum_field)?;

        let geometry = feature
            .get("geometry")
            .ok_or_else(|| format!("feature {idx}: missing geometry"))?;
        let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("");
        let coords = geometry
            .get("coordinates")
            .ok_or_else(|| format!("feature {idx}: missing coordinates"))?;
        let polygons = match kind {
            "Polygon" => vec![polygon(coords).map_err(|e| format!("feature {idx}: {e}"))?],
            "MultiPolygon" => coords
                .as_array()
                .ok_or_else(|| format!("feature {idx}: MultiPolygon coordinates must be an array"))?
                .iter()
                .map(polygon)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("feature {idx}: {e}"))?,
            other => return Err(format!("feature {idx}: unsupported geometry type '{other}'")),
        };
        out.push(BoundaryFeature {
            region,
            stratum,
            boundary: Boundary::new(polygons),
        });
    }
    Ok(out)
}

fn property_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn polygon(value: &Value) -> Result<Polygon, String> {
    let rings = value.as_array().ok_or("polygon must be an array of rings")?;
    let mut rings = rings.iter().map(ring);
    let exterior = rings.next().ok_or("polygon has no exterior ring")??;
    let holes = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, holes))
}

fn ring(value: &Value) -> Result<Vec<GeoPoint>, String> {
    let positions = value.as_array().ok_or("ring must be an array of positions")?;
    positions
        .iter()
        .map(|pos| {
            let lon = pos.get(0).and_then(Value::as_f64);
            let lat = pos.get(1).and_then(Value::as_f64);
            match (lon, lat) {
                (Some(lon), Some(lat)) => Ok(GeoPoint::new(lon, lat)),
                _ => Err("position must be [lon, lat]".to_string()),
            }
        })
        .collect()
}
