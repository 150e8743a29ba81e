use crate::coord::{Coordinate, GeoPosition};
use crate::error::WorldMeshError;
use crate::geom::create_cell_polygon;
use crate::index::{
    Corner, GridCell, MeshLevel, decode_mesh_code, decode_place_code, encode_position,
};
use geo::Centroid;
use geo_types::{Geometry, LineString, Point, Polygon};
use serde::Serialize;
use std::collections::HashSet;

/// A single cell of the world grid mesh.
///
/// Each `MeshCell` pairs a mesh code with its level and the rectangle the
/// code denotes in WGS84 degrees.
///
/// # Example
///
/// ```
/// use worldmesh_rs::{MeshCell, MeshLevel};
///
/// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
/// // Tokyo Tower, as (longitude, latitude)
/// let cell = MeshCell::from_wgs84(&(139.7454, 35.6586), MeshLevel::Standard)?;
/// println!("Mesh code: {}", cell.id);
///
/// // The cell outline, ready for WKT or GeoJSON output
/// let polygon = cell.to_polygon();
/// assert_eq!(polygon.exterior().0.len(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshCell {
    /// Mesh code of this cell (6 to 13 digits depending on level)
    pub id: String,
    /// Resolution level of the code
    pub level: MeshLevel,
    /// Extent of the cell in decimal degrees
    pub bounds: GridCell,
}

impl MeshCell {
    /// Create a MeshCell from a mesh code. The level follows from the code length.
    ///
    /// # Example
    /// ```
    /// use worldmesh_rs::{MeshCell, MeshLevel};
    ///
    /// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
    /// let cell = MeshCell::from_mesh_code("20533935")?;
    /// assert_eq!(cell.level, MeshLevel::Secondary);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_mesh_code(code: &str) -> Result<Self, WorldMeshError> {
        let id = code.trim().to_string();
        let bounds = decode_mesh_code(&id)?;
        let level = MeshLevel::from_code_length(id.len())?;
        Ok(Self { id, level, bounds })
    }

    fn from_position(position: &GeoPosition, level: MeshLevel) -> Result<Self, WorldMeshError> {
        let id = encode_position(position, level);
        let bounds = decode_mesh_code(&id)?;
        Ok(Self { id, level, bounds })
    }

    /// Create a MeshCell from a WGS84 coordinate (x = longitude, y = latitude).
    ///
    /// # Example
    /// ```
    /// use worldmesh_rs::{MeshCell, MeshLevel};
    /// use geo_types::Point;
    ///
    /// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
    /// // From tuple
    /// let cell = MeshCell::from_wgs84(&(151.2093, -33.8688), MeshLevel::Eighth)?;
    /// // From Point
    /// let same = MeshCell::from_wgs84(&Point::new(151.2093, -33.8688), MeshLevel::Eighth)?;
    /// assert_eq!(cell.id, "6050516146232");
    /// assert_eq!(cell, same);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_wgs84(coord: &impl Coordinate, level: MeshLevel) -> Result<Self, WorldMeshError> {
        Self::from_position(&GeoPosition::from_coordinate(coord)?, level)
    }

    /// Create a MeshCell from a latitude/longitude pair.
    pub fn from_lat_long(
        latitude: f64,
        longitude: f64,
        level: MeshLevel,
    ) -> Result<Self, WorldMeshError> {
        Self::from_position(&GeoPosition::new(latitude, longitude)?, level)
    }

    /// Create the MeshCell that contains the position of a place code.
    pub fn from_place_code(code: &str, level: MeshLevel) -> Result<Self, WorldMeshError> {
        Self::from_position(&decode_place_code(code)?, level)
    }

    /// Create MeshCells along a LineString in WGS84 coordinates.
    ///
    /// Samples points every half cell height along each segment and returns
    /// the unique cells they fall in, in the order the line visits them.
    pub fn from_line_string(
        line: &LineString,
        level: MeshLevel,
    ) -> Result<Vec<Self>, WorldMeshError> {
        let step_size = level.cell_height() * 0.5;

        let mut seen: HashSet<String> = HashSet::new();
        let mut cells: Vec<MeshCell> = Vec::new();

        if let [only] = line.0.as_slice() {
            return Ok(vec![Self::from_wgs84(&Point::from(*only), level)?]);
        }

        for window in line.0.windows(2) {
            let start = &window[0];
            let end = &window[1];

            let dx = end.x - start.x;
            let dy = end.y - start.y;
            let segment_length = (dx * dx + dy * dy).sqrt();
            let steps = (segment_length / step_size).ceil() as usize;

            for i in 0..=steps {
                let t = if steps == 0 {
                    0.0
                } else {
                    i as f64 / steps as f64
                };
                let position = GeoPosition::new(start.y + t * dy, start.x + t * dx)?;
                let id = encode_position(&position, level);

                if seen.insert(id.clone()) {
                    let bounds = decode_mesh_code(&id)?;
                    cells.push(MeshCell { id, level, bounds });
                }
            }
        }

        Ok(cells)
    }

    /// Create MeshCells from an arbitrary `geo_types::Geometry` in WGS84.
    ///
    /// Points and polygon centroids produce a single cell; lines and
    /// collections may produce many.
    pub fn from_geometry(
        geom: Geometry<f64>,
        level: MeshLevel,
    ) -> Result<Vec<Self>, WorldMeshError> {
        match geom {
            Geometry::Point(pt) => Ok(vec![Self::from_wgs84(&pt, level)?]),
            Geometry::LineString(line) => Self::from_line_string(&line, level),
            Geometry::MultiLineString(mls) => {
                let mut all_cells = Vec::new();
                for line in mls.0 {
                    all_cells.extend(Self::from_line_string(&line, level)?);
                }
                Ok(all_cells)
            }
            Geometry::Polygon(poly) => poly
                .centroid()
                .map(|centroid| Self::from_wgs84(&centroid, level))
                .into_iter()
                .collect(),
            Geometry::MultiPolygon(mp) => mp
                .0
                .iter()
                .filter_map(|poly| poly.centroid())
                .map(|centroid| Self::from_wgs84(&centroid, level))
                .collect(),
            Geometry::MultiPoint(mp) => mp
                .0
                .iter()
                .map(|pt| Self::from_wgs84(pt, level))
                .collect(),
            Geometry::GeometryCollection(gc) => {
                let mut all_cells = Vec::new();
                for g in gc.0 {
                    all_cells.extend(Self::from_geometry(g, level)?);
                }
                Ok(all_cells)
            }
            _ => Err(WorldMeshError::GeometryParseError(
                "Unsupported geometry type".to_string(),
            )),
        }
    }

    /// Returns the centre of the cell (x = longitude, y = latitude).
    pub fn center(&self) -> Point<f64> {
        self.bounds.center()
    }

    /// Returns one corner of the cell (x = longitude, y = latitude).
    pub fn corner(&self, corner: Corner) -> Point<f64> {
        self.bounds.corner(corner)
    }

    /// Whether the coordinate (x = longitude, y = latitude) lies in this cell.
    pub fn contains(&self, coord: &impl Coordinate) -> bool {
        self.bounds.contains(coord)
    }

    /// Returns the enclosing cell one level coarser, or `None` at the 80 km level.
    pub fn parent(&self) -> Result<Option<Self>, WorldMeshError> {
        self.level
            .parent()
            .map(|level| Self::from_mesh_code(&self.id[..level.code_length()]))
            .transpose()
    }

    /// Converts this cell to a rectangular polygon.
    ///
    /// Returns a `geo_types::Polygon` running NW, NE, SE, SW and back to NW,
    /// suitable for spatial operations or GeoJSON export.
    pub fn to_polygon(&self) -> Polygon<f64> {
        create_cell_polygon(&self.bounds)
    }
}
