//! Planar containment and great-circle distance over lon/lat coordinates.
//!
//! Containment treats coordinates as planar, which matches how boundary
//! layers are authored. Distances use the haversine formula.

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A polygon with one exterior ring and zero or more holes.
///
/// Rings may be given closed (first point repeated) or open.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<GeoPoint>,
    holes: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> Self {
        Self { exterior, holes }
    }

    pub fn from_exterior(exterior: Vec<GeoPoint>) -> Self {
        Self::new(exterior, Vec::new())
    }

    pub fn exterior(&self) -> &[GeoPoint] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<GeoPoint>] {
        &self.holes
    }

    fn rings(&self) -> impl Iterator<Item = &[GeoPoint]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// True when `point` is inside or on the edge of this polygon.
    pub fn contains_point(&self, point: GeoPoint) -> bool {
        if self.rings().any(|ring| on_ring(ring, point)) {
            return true;
        }
        ring_contains(&self.exterior, point) && !self.holes.iter().any(|h| ring_contains(h, point))
    }

    /// True when the whole segment `a`..`b` lies within this polygon.
    pub fn contains_segment(&self, a: GeoPoint, b: GeoPoint) -> bool {
        if !self.contains_point(a) || !self.contains_point(b) {
            return false;
        }
        let crosses = self
            .rings()
            .flat_map(ring_edges)
            .any(|(p, q)| segments_cross(a, b, p, q));
        if crosses {
            return false;
        }
        // Catches segments that leave through a vertex without a proper crossing.
        let mid = GeoPoint::new((a.lon + b.lon) / 2.0, (a.lat + b.lat) / 2.0);
        self.contains_point(mid)
    }
}

/// A named area made of one or more polygons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundary {
    polygons: Vec<Polygon>,
}

impl Boundary {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn contains_point(&self, point: GeoPoint) -> bool {
        point.is_finite() && self.polygons.iter().any(|p| p.contains_point(point))
    }

    /// A segment is contained when a single member polygon contains all of it.
    pub fn contains_segment(&self, a: GeoPoint, b: GeoPoint) -> bool {
        a.is_finite()
            && b.is_finite()
            && self.polygons.iter().any(|p| p.contains_segment(a, b))
    }
}

fn ring_edges(ring: &[GeoPoint]) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

fn ring_contains(ring: &[GeoPoint], point: GeoPoint) -> bool {
    let mut inside = false;
    for (p, q) in ring_edges(ring) {
        if (p.lat > point.lat) != (q.lat > point.lat) {
            let x = p.lon + (point.lat - p.lat) * (q.lon - p.lon) / (q.lat - p.lat);
            if point.lon < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_ring(ring: &[GeoPoint], point: GeoPoint) -> bool {
    ring_edges(ring).any(|(p, q)| on_segment(p, q, point))
}

fn cross(o: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

fn on_segment(p: GeoPoint, q: GeoPoint, point: GeoPoint) -> bool {
    cross(p, q, point).abs() <= EPSILON
        && point.lon >= p.lon.min(q.lon) - EPSILON
        && point.lon <= p.lon.max(q.lon) + EPSILON
        && point.lat >= p.lat.min(q.lat) - EPSILON
        && point.lat <= p.lat.max(q.lat) + EPSILON
}

/// Proper crossing: each segment strictly straddles the other's line.
fn segments_cross(a: GeoPoint, b: GeoPoint, p: GeoPoint, q: GeoPoint) -> bool {
    let d1 = cross(p, q, a);
    let d2 = cross(p, q, b);
    let d3 = cross(a, b, p);
    let d4 = cross(a, b, q);
    ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
}

/// Great-circle distance between two points, in metres.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Distance in metres from `point` to the nearest point of segment `a`..`b`.
///
/// The nearest point is found by planar projection in degree space, then
/// measured with [`haversine_m`].
pub fn distance_to_segment_m(point: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let len2 = dx * dx + dy * dy;
    let nearest = if len2 <= EPSILON {
        a
    } else {
        let t = (((point.lon - a.lon) * dx + (point.lat - a.lat) * dy) / len2).clamp(0.0, 1.0);
        GeoPoint::new(a.lon + t * dx, a.lat + t * dy)
    };
    haversine_m(point, nearest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_exterior(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(0.0, 0.0),
        ])
    }

    #[test]
    fn point_containment_includes_edges() {
        let sq = square();
        assert!(sq.contains_point(GeoPoint::new(5.0, 5.0)));
        assert!(sq.contains_point(GeoPoint::new(0.0, 5.0)));
        assert!(!sq.contains_point(GeoPoint::new(11.0, 5.0)));
    }

    #[test]
    fn holes_exclude_points() {
        let hole = vec![
            GeoPoint::new(4.0, 4.0),
            GeoPoint::new(6.0, 4.0),
            GeoPoint::new(6.0, 6.0),
            GeoPoint::new(4.0, 6.0),
        ];
        let poly = Polygon::new(square().exterior().to_vec(), vec![hole]);
        assert!(!poly.contains_point(GeoPoint::new(5.0, 5.0)));
        assert!(poly.contains_point(GeoPoint::new(2.0, 2.0)));
    }

    #[test]
    fn segment_leaving_concave_polygon_is_outside() {
        // U shape: notch between x=4 and x=6 above y=5.
        let u = Polygon::from_exterior(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(10.0, 0.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(6.0, 10.0),
            GeoPoint::new(6.0, 5.0),
            GeoPoint::new(4.0, 5.0),
            GeoPoint::new(4.0, 10.0),
            GeoPoint::new(0.0, 10.0),
        ]);
        let a = GeoPoint::new(2.0, 8.0);
        let b = GeoPoint::new(8.0, 8.0);
        assert!(u.contains_point(a));
        assert!(u.contains_point(b));
        assert!(!u.contains_segment(a, b));
        assert!(u.contains_segment(GeoPoint::new(2.0, 2.0), GeoPoint::new(8.0, 2.0)));
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 1.0, "{d}");
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let beyond = GeoPoint::new(0.0, 2.0);
        let d = distance_to_segment_m(beyond, a, b);
        assert!((d - haversine_m(beyond, b)).abs() < 1e-6);
        assert!(distance_to_segment_m(GeoPoint::new(0.0, 0.5), a, b) < 1e-6);
    }
}
