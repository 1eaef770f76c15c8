use geo::{BoundingRect, LineString};
use serde::{Deserialize, Serialize};

/// A WGS84 point, carried on the wire as `[lat, lng]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

impl From<LatLng> for geo::Coord<f64> {
    fn from(value: LatLng) -> Self {
        geo::Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Smallest box covering every coordinate; `None` when there is nothing to fit.
    pub fn from_coordinates(coordinates: &[LatLng]) -> Option<Self> {
        let line: LineString<f64> = coordinates.iter().copied().map(geo::Coord::from).collect();
        let rect = line.bounding_rect()?;
        Some(Self {
            south_west: LatLng::new(rect.min().y, rect.min().x),
            north_east: LatLng::new(rect.max().y, rect.max().x),
        })
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::map::geo::{LatLng, LatLngBounds};

    #[test]
    fn bounds_cover_all_points() {
        let points = [
            LatLng::new(40.71, -74.00),
            LatLng::new(40.72, -74.05),
            LatLng::new(40.69, -74.02),
        ];
        let bounds = LatLngBounds::from_coordinates(&points).expect("bounds");
        assert_eq!(bounds.south_west, LatLng::new(40.69, -74.05));
        assert_eq!(bounds.north_east, LatLng::new(40.72, -74.00));
        assert!(points.iter().all(|p| bounds.contains(*p)));
    }

    #[test]
    fn empty_path_has_no_bounds() {
        assert!(LatLngBounds::from_coordinates(&[]).is_none());
    }

    #[test]
    fn single_point_is_a_degenerate_box() {
        let point = LatLng::new(40.7128, -74.0060);
        let bounds = LatLngBounds::from_coordinates(&[point]).expect("bounds");
        assert_eq!(bounds.center(), point);
    }

    #[test]
    fn serializes_as_lat_lng_pair() {
        let encoded = serde_json::to_string(&LatLng::new(40.5, -74.25)).expect("encode");
        assert_eq!(encoded, "[40.5,-74.25]");
    }
}
