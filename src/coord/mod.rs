use crate::error::WorldMeshError;
use geo_types::Point;
use serde::Serialize;

/// Trait for types that can provide x/y coordinates.
///
/// Implemented for `(f64, f64)` tuples, `geo_types::Point<f64>` and [`GeoPosition`].
/// Following the GeoJSON axis order, x is the longitude and y is the latitude.
pub trait Coordinate {
    /// Returns the x-coordinate (longitude).
    fn x(&self) -> f64;
    /// Returns the y-coordinate (latitude).
    fn y(&self) -> f64;
}

impl Coordinate for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }
    fn y(&self) -> f64 {
        self.1
    }
}

impl Coordinate for Point<f64> {
    fn x(&self) -> f64 {
        Point::x(*self)
    }
    fn y(&self) -> f64 {
        Point::y(*self)
    }
}

impl Coordinate for GeoPosition {
    fn x(&self) -> f64 {
        self.longitude
    }
    fn y(&self) -> f64 {
        self.latitude
    }
}

/// A validated geographic position in decimal degrees.
///
/// Latitude is always within [-90, 90] and longitude within [-180, 180];
/// there is no way to build a `GeoPosition` that breaks this.
///
/// # Example
/// ```
/// use worldmesh_rs::GeoPosition;
///
/// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
/// let tokyo = GeoPosition::new(35.6581, 139.7414)?;
/// assert_eq!(tokyo.latitude(), 35.6581);
/// assert!(GeoPosition::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    /// Validates and builds a position. Fails with
    /// [`WorldMeshError::InvalidCoordinateRange`] outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WorldMeshError> {
        if !is_valid_lat_long(latitude, longitude) {
            return Err(WorldMeshError::InvalidCoordinateRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a position from an x/y coordinate (longitude, latitude).
    pub fn from_coordinate(coord: &impl Coordinate) -> Result<Self, WorldMeshError> {
        Self::new(coord.y(), coord.x())
    }

    /// Returns the latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Converts to a point (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// NaN fails both range checks.
pub(crate) fn is_valid_lat_long(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}
