//! Parsing of the comma-separated geometry parameters and the little bit of
//! spherical math the mock needs for clipping and focus distances.

use crate::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Parse `s` as exactly `n` comma-separated floats.
pub fn parse_floats(s: &str, n: usize) -> Option<Vec<f64>> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    (values.len() == n && values.iter().all(|v| v.is_finite())).then_some(values)
}

/// Parse `"lat,lng"`. Latitude must lie within [-90, 90]; longitude wraps.
pub fn parse_coordinates(s: &str) -> Option<Coordinates> {
    let v = parse_floats(s, 2)?;
    let (lat, lng) = (v[0], v[1]);
    if !(-90.0..=90.0).contains(&lat) {
        return None;
    }
    Some(Coordinates {
        lat,
        lng: wrap_lng(lng),
    })
}

/// Normalize a longitude into [-180, 180).
pub fn wrap_lng(lng: f64) -> f64 {
    if (-180.0..180.0).contains(&lng) {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// `south_lat,west_lng,north_lat,east_lng` with south < north and west < east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn parse(s: &str) -> Option<Self> {
        let v = parse_floats(s, 4)?;
        let bounds = Bounds {
            south: v[0],
            west: v[1],
            north: v[2],
            east: v[3],
        };
        let lat_ok = (-90.0..=90.0).contains(&bounds.south) && (-90.0..=90.0).contains(&bounds.north);
        (lat_ok && bounds.south < bounds.north && bounds.west < bounds.east).then_some(bounds)
    }

    pub fn contains(&self, c: Coordinates) -> bool {
        (self.south..=self.north).contains(&c.lat) && (self.west..=self.east).contains(&c.lng)
    }

    /// Length of the south-west to north-east diagonal.
    pub fn diagonal_km(&self) -> f64 {
        haversine_km(
            Coordinates { lat: self.south, lng: self.west },
            Coordinates { lat: self.north, lng: self.east },
        )
    }
}

/// `lat,lng,radius_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Coordinates,
    pub radius_km: f64,
}

impl Circle {
    pub fn parse(s: &str) -> Option<Self> {
        let v = parse_floats(s, 3)?;
        if !(-90.0..=90.0).contains(&v[0]) || v[2] <= 0.0 {
            return None;
        }
        Some(Circle {
            center: Coordinates {
                lat: v[0],
                lng: wrap_lng(v[1]),
            },
            radius_km: v[2],
        })
    }

    pub fn contains(&self, c: Coordinates) -> bool {
        haversine_km(self.center, c) <= self.radius_km
    }
}

/// A closed polygon of at least four and at most `MAX_POLYGON_POINTS` points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Coordinates>,
}

pub const MAX_POLYGON_POINTS: usize = 25;

impl Polygon {
    pub fn parse(s: &str) -> Option<Self> {
        let count = s.split(',').count();
        if count % 2 != 0 {
            return None;
        }
        let v = parse_floats(s, count)?;
        let points: Vec<Coordinates> = v
            .chunks(2)
            .map(|pair| Coordinates { lat: pair[0], lng: pair[1] })
            .collect();
        let closed = points.first() == points.last();
        (closed && (4..=MAX_POLYGON_POINTS).contains(&points.len())).then_some(Polygon { points })
    }

    /// Ray casting on the lng/lat plane.
    pub fn contains(&self, c: Coordinates) -> bool {
        let mut inside = false;
        for edge in self.points.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if (a.lat > c.lat) != (b.lat > c.lat) {
                let cross_lng = a.lng + (c.lat - a.lat) / (b.lat - a.lat) * (b.lng - a.lng);
                if c.lng < cross_lng {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Great-circle distance between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
