//! # worldmesh-rs
//!
//! Converts latitude/longitude into two spatial identifiers and back: the
//! 128-bit ucode **place code** and the hierarchical **world grid mesh code**
//! (JIS X0410 compatible, extended to the whole globe).
//!
//! There are currently four main entry points.
//!
//! ### 1. Place codes
//!
//! ```
//! use worldmesh_rs::{decode_place_code, encode_place_code};
//!
//! # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
//! let code = encode_place_code(35.0, 135.0)?;
//! assert_eq!(code.to_string(), "00001b0000000003099cf02514300000");
//!
//! let position = decode_place_code("00001b0000000003099cf02514300000")?;
//! assert_eq!(position.latitude(), 35.0);
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. Mesh codes
//!
//! ```
//! use worldmesh_rs::{Corner, MeshLevel, decode_mesh_code, encode_mesh_code};
//!
//! # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
//! let code = encode_mesh_code(-33.8688, 151.2093, MeshLevel::Standard)?;
//! assert_eq!(code, "6050516146");
//!
//! let cell = decode_mesh_code(&code)?;
//! let north_west = cell.corner(Corner::NorthWest);
//! println!("({}, {})", north_west.y(), north_west.x());
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `MeshCell` - Single Cell Operations
//!
//! ```
//! use worldmesh_rs::{MeshCell, MeshLevel};
//!
//! # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
//! let cell = MeshCell::from_wgs84(&(139.7414, 35.6581), MeshLevel::Half)?;
//! println!("{}", cell.id);
//! let polygon = cell.to_polygon();
//! # Ok(())
//! # }
//! ```
//!
//! ### 4. `CsvToMesh` - CSV File Conversion
//!
//! Annotate CSV rows holding geometry (WKT or GeoJSON) or longitude/latitude
//! columns with mesh codes:
//!
//! ```no_run
//! use worldmesh_rs::{CsvMeshConfig, CsvToMesh, GeometryFormat, MeshLevel};
//!
//! let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Standard)
//!     .with_place_code()
//!     .with_cell_geometry(GeometryFormat::Wkt);
//!
//! "stations.csv".to_mesh_csv("output.csv", &config).unwrap();
//! ```
//!

pub mod cell;
pub mod coord;
pub mod error;
pub mod geom;
pub mod index;
pub mod io;

pub use cell::MeshCell;
pub use coord::{Coordinate, GeoPosition};
pub use error::WorldMeshError;
pub use geom::{create_cell_polygon, parse_geojson, parse_geometry, parse_wkt};
pub use index::{
    AUTHORITY_PREFIX, AUTHORITY_PREFIX_HEX, CELL_HEIGHTS, CELL_WIDTHS, Corner, GridCell,
    INVALID_PLACE_CODE, MAX_LEVEL, MESH_CODE_LENGTHS, MeshLevel, PLACE_CODE_LENGTH, PlaceCode,
    decode_mesh_code, decode_place_code, encode_mesh_code, encode_mesh_code_or_sentinel,
    encode_place_code, encode_place_code_or_sentinel, encode_position, mesh_code_corner,
    mesh_code_to_latlong, place_code_to_mesh_code,
};
pub use io::{CoordinateSource, CsvMeshConfig, CsvToMesh, GeometryFormat, csv_to_mesh_csv};

pub use geo_types;

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::point;

    #[test]
    fn test_end_to_end_workflow() -> Result<(), WorldMeshError> {
        let place_code = encode_place_code(35.6581, 139.7414)?;
        let position = decode_place_code(&place_code.to_string())?;
        assert!((position.latitude() - 35.6581).abs() < 1.0 / 36000.0);

        let mesh_code = place_code_to_mesh_code(&place_code.to_string(), MeshLevel::Eighth)?;
        assert_eq!(mesh_code, "2053393589343");

        let cell = MeshCell::from_mesh_code(&mesh_code)?;
        assert!(cell.contains(&position));
        assert_eq!(cell.to_polygon().exterior().coords().count(), 5);
        Ok(())
    }

    #[test]
    fn test_using_geo_types_macros() -> Result<(), WorldMeshError> {
        let pt = point! { x: -74.006, y: 40.7128 };
        let cell = MeshCell::from_wgs84(&pt, MeshLevel::Eighth)?;
        assert_eq!(cell.id, "3061740050322");

        let nw = mesh_code_to_latlong(&cell.id)?;
        assert_eq!(nw, mesh_code_corner(&cell.id, Corner::NorthWest)?);
        assert!(nw.x() <= pt.x() && nw.y() >= pt.y());
        Ok(())
    }

    #[test]
    fn test_sentinels_have_fixed_shapes() {
        assert_eq!(encode_place_code_or_sentinel(91.0, 0.0), INVALID_PLACE_CODE);
        assert_eq!(INVALID_PLACE_CODE.len(), 34);
        assert_eq!(
            encode_mesh_code_or_sentinel(0.0, 180.5, MeshLevel::Quarter),
            "999999999999"
        );
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert_eq!(
            decode_mesh_code("12345"),
            Err(WorldMeshError::UnsupportedCodeLength(5))
        );
        assert_eq!(
            decode_place_code("0000000000000000099cf02514300000"),
            Err(WorldMeshError::InvalidAuthorityPrefix)
        );
    }

    #[test]
    fn test_mesh_code_of_decoded_cell_center_is_stable() -> Result<(), WorldMeshError> {
        for code in ["205339", "20533935", "2053393589", "6050516146232", "8015100000111"] {
            let center = decode_mesh_code(code)?.center();
            let level = MeshLevel::from_code_length(code.len())?;
            assert_eq!(encode_mesh_code(center.y(), center.x(), level)?, code);
        }
        Ok(())
    }
}
