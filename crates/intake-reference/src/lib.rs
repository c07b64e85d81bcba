#![deny(unsafe_code)]

pub mod boundary;
pub mod bundle;
pub mod csv_utils;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod hash;
pub mod manifest;
pub mod source;
pub mod table;

pub use crate::boundary::{BoundaryKey, BoundaryLookup, StratumAliases};
pub use crate::bundle::{CONFIG_ENV_VAR, ReferenceBundle, default_config_path};
pub use crate::error::ReferenceError;
pub use crate::geometry::{
    Boundary, GeoPoint, Polygon, distance_to_segment_m, haversine_m,
};
pub use crate::manifest::Manifest;
pub use crate::source::{ReferenceSource, ReferenceStore};
pub use crate::table::{ReferenceRow, ReferenceTable};
