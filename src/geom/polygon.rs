use crate::index::{Corner, GridCell};
use geo_types::{Coord, LineString, Polygon};

/// Builds the closed outline of a grid cell, starting and ending at the
/// north-west corner and running clockwise (NW, NE, SE, SW, NW).
pub fn create_cell_polygon(cell: &GridCell) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
        Corner::NorthWest,
    ]
    .into_iter()
    .map(|corner| cell.corner(corner).0)
    .collect();

    Polygon::new(LineString::from(coords), vec![])
}
