use crate::coord::Coordinate;
use crate::error::WorldMeshError;
use crate::index::constants::{
    CELL_UNITS, DECIMAL_SCALE, LATITUDE_UNITS_PER_DEGREE, LONGITUDE_UNITS_PER_DEGREE,
};
use crate::index::mesh_code::{MeshLevel, Octant};
use geo_types::Point;
use log::debug;
use serde::{Deserialize, Serialize};

/// Highest latitude band (90 degrees / 40 minutes).
const MAX_LATITUDE_BAND: u32 = 135;
/// Highest longitude degree digit pair in the far-east octants (180 - 100).
const MAX_FAR_EAST_DEGREE: u32 = 80;

/// A corner of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    SouthWest,
    NorthEast,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::SouthWest,
        Corner::NorthEast,
        Corner::SouthEast,
    ];
}

/// The rectangular extent of a mesh code, in decimal degrees.
///
/// Edges have at most 8 decimal places and always enclose the exact cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,
}

impl GridCell {
    /// Returns the requested corner as a point (x = longitude, y = latitude).
    pub fn corner(&self, corner: Corner) -> Point<f64> {
        match corner {
            Corner::NorthWest => Point::new(self.long_min, self.lat_max),
            Corner::SouthWest => Point::new(self.long_min, self.lat_min),
            Corner::NorthEast => Point::new(self.long_max, self.lat_max),
            Corner::SouthEast => Point::new(self.long_max, self.lat_min),
        }
    }

    /// Returns the midpoint of the cell (x = longitude, y = latitude).
    pub fn center(&self) -> Point<f64> {
        Point::new(
            (self.long_min + self.long_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Whether the coordinate lies inside the cell or on its edge.
    pub fn contains(&self, coord: &impl Coordinate) -> bool {
        (self.lat_min..=self.lat_max).contains(&coord.y())
            && (self.long_min..=self.long_max).contains(&coord.x())
    }
}

/// Digits of a mesh code after validation.
struct ParsedMeshCode {
    level: MeshLevel,
    octant: Octant,
    band: u32,
    degree: u32,
    /// `(latitude, longitude)` bin per level below the 80 km level.
    bins: Vec<(u32, u32)>,
}

fn number(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Reads the latitude band from characters 1-3, skipping leading zeros.
fn parse_latitude_band(code: &str) -> u32 {
    let group = &code[1..4];
    let digits = if group.starts_with("00") {
        &code[3..4]
    } else if group.starts_with('0') {
        &code[2..4]
    } else {
        group
    };
    if digits.len() < group.len() {
        debug!("Elided latitude band '{}' read as '{}'", group, digits);
    }
    number(digits)
}

/// Reads the longitude degree from characters 4-5, skipping a leading zero.
fn parse_longitude_degree(code: &str) -> u32 {
    if code.as_bytes()[4] == b'0' {
        number(&code[5..6])
    } else {
        number(&code[4..6])
    }
}

fn invalid(code: &str, reason: &str) -> WorldMeshError {
    WorldMeshError::InvalidMeshCode(format!("'{}': {}", code, reason))
}

fn parse_mesh_code(code: &str) -> Result<ParsedMeshCode, WorldMeshError> {
    let level = MeshLevel::from_code_length(code.len())?;

    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(code, "contains non-digit characters"));
    }
    let digit = |i: usize| u32::from(code.as_bytes()[i] - b'0');

    let octant =
        Octant::from_digit(digit(0)).ok_or_else(|| invalid(code, "octant digit must be 1-8"))?;

    let band = parse_latitude_band(code);
    let degree = parse_longitude_degree(code);
    if band > MAX_LATITUDE_BAND {
        return Err(invalid(code, "latitude band exceeds 90 degrees"));
    }
    if octant.far_east && degree > MAX_FAR_EAST_DEGREE {
        return Err(invalid(code, "longitude exceeds 180 degrees"));
    }

    let mut bins = Vec::with_capacity(level.index());
    if level >= MeshLevel::Secondary {
        let (q, v) = (digit(6), digit(7));
        if q > 7 || v > 7 {
            return Err(invalid(code, "10km digits must be 0-7"));
        }
        bins.push((q, v));
    }
    if level >= MeshLevel::Standard {
        bins.push((digit(8), digit(9)));
    }
    for i in 10..code.len() {
        let quadrant = digit(i);
        if !(1..=4).contains(&quadrant) {
            return Err(invalid(code, "quadrant digits must be 1-4"));
        }
        bins.push(((quadrant - 1) / 2, (quadrant - 1) % 2));
    }

    Ok(ParsedMeshCode {
        level,
        octant,
        band,
        degree,
        bins,
    })
}

/// Converts a distance from the equator or prime meridian, in finest-level
/// units, to degrees at 8 decimals. Inner edges are truncated and outer edges
/// rounded up, so the decimal cell always encloses the exact one.
fn units_to_degrees(units: u64, units_per_degree: u64, outer: bool) -> f64 {
    let scaled = units * DECIMAL_SCALE;
    let steps = if outer {
        scaled.div_ceil(units_per_degree)
    } else {
        scaled / units_per_degree
    };
    steps as f64 / DECIMAL_SCALE as f64
}

/// Returns `(min, max)` along one axis for a cell starting `low` units from
/// zero in the mirrored quadrant.
fn axis_edges(low: u64, size: u64, units_per_degree: u64, negative: bool) -> (f64, f64) {
    let inner = units_to_degrees(low, units_per_degree, false);
    let outer = units_to_degrees(low + size, units_per_degree, true);
    if !negative {
        (inner, outer)
    } else if inner == 0.0 {
        (-outer, 0.0)
    } else {
        (-outer, -inner)
    }
}

/// Decodes a mesh code into the cell it denotes.
///
/// # Process
///
/// 1. Checks the length (6, 8, 10, 11, 12 or 13 digits) and every digit
/// 2. Recovers the octant and reads the 80 km group, where leading zeros of
///    the latitude band and longitude degree are elided
/// 3. Counts the offset of the cell from the equator and prime meridian in
///    whole 125 m cells (1/960 degree of latitude, 1/640 degree of longitude)
/// 4. Converts each of the four edges once to 8 decimal places and mirrors
///    them back to the true hemisphere
///
/// Edges that are exact 8-decimal values (36.0, -12.35, 139.7375) come back
/// exactly. Others are truncated towards the equator or prime meridian on the
/// inner side and rounded away on the outer side.
///
/// # Example
/// ```
/// use worldmesh_rs::decode_mesh_code;
///
/// let cell = decode_mesh_code("2053393589").unwrap();
/// assert_eq!(cell.lat_min, 35.65);
/// assert_eq!(cell.long_min, 139.7375);
/// assert!(cell.lat_min < 35.6581 && 35.6581 < cell.lat_max);
/// ```
///
/// # Errors
///
/// - [`WorldMeshError::UnsupportedCodeLength`] - Length is not a valid level
/// - [`WorldMeshError::InvalidMeshCode`] - A digit is out of range for its position
pub fn decode_mesh_code(code: &str) -> Result<GridCell, WorldMeshError> {
    let parsed = parse_mesh_code(code.trim())?;
    let octant = parsed.octant;

    let degree = u64::from(parsed.degree) + octant.longitude_offset() as u64;
    let mut lat_low = u64::from(parsed.band) * CELL_UNITS[0];
    let mut long_low = degree * CELL_UNITS[0];
    for ((lat_bin, long_bin), units) in parsed.bins.iter().zip(&CELL_UNITS[1..]) {
        lat_low += u64::from(*lat_bin) * units;
        long_low += u64::from(*long_bin) * units;
    }

    let size = CELL_UNITS[parsed.level.index()];
    let (lat_min, lat_max) = axis_edges(lat_low, size, LATITUDE_UNITS_PER_DEGREE, octant.south);
    let (long_min, long_max) =
        axis_edges(long_low, size, LONGITUDE_UNITS_PER_DEGREE, octant.west);

    Ok(GridCell {
        lat_min,
        lat_max,
        long_min,
        long_max,
    })
}

/// Returns one corner of a mesh code's cell (x = longitude, y = latitude).
pub fn mesh_code_corner(code: &str, corner: Corner) -> Result<Point<f64>, WorldMeshError> {
    Ok(decode_mesh_code(code)?.corner(corner))
}

/// Returns the north-west corner of a mesh code's cell.
pub fn mesh_code_to_latlong(code: &str) -> Result<Point<f64>, WorldMeshError> {
    mesh_code_corner(code, Corner::NorthWest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::mesh_code::encode_mesh_code;

    fn assert_cell(cell: &GridCell, lat_max: f64, long_min: f64, lat_min: f64, long_max: f64) {
        assert_eq!(
            (cell.lat_max, cell.long_min, cell.lat_min, cell.long_max),
            (lat_max, long_min, lat_min, long_max)
        );
    }

    #[test]
    fn test_decode_north_east() -> Result<(), WorldMeshError> {
        assert_cell(&decode_mesh_code("205339")?, 36.0, 139.0, 35.33333333, 140.0);
        assert_cell(&decode_mesh_code("20533935")?, 35.66666667, 139.625, 35.58333333, 139.75);
        assert_cell(
            &decode_mesh_code("2053393589343")?,
            35.65833334,
            139.740625,
            35.65729166,
            139.7421875,
        );
        Ok(())
    }

    #[test]
    fn test_decode_south_west() -> Result<(), WorldMeshError> {
        assert_cell(&decode_mesh_code("801510")?, -10.0, -111.0, -10.66666667, -110.0);
        assert_cell(
            &decode_mesh_code("7034432183441")?,
            -22.90625,
            -43.1734375,
            -22.90729167,
            -43.171875,
        );
        assert_cell(&decode_mesh_code("7018224410")?, -12.34166666, -22.5125, -12.35, -22.5);
        Ok(())
    }

    #[test]
    fn test_decode_mixed_hemispheres() -> Result<(), WorldMeshError> {
        // Sydney: south, east, far east.
        assert_cell(
            &decode_mesh_code("6050516146232")?,
            -33.86875,
            151.2078125,
            -33.86979167,
            151.209375,
        );
        // New York: north, west.
        assert_cell(
            &decode_mesh_code("3061740050")?,
            40.71666667,
            -74.0125,
            40.70833333,
            -74.0,
        );
        assert_cell(
            &decode_mesh_code("3052174000111")?,
            35.00104167,
            -17.0015625,
            35.0,
            -17.0,
        );
        Ok(())
    }

    #[test]
    fn test_edges_at_the_equator_and_prime_meridian() -> Result<(), WorldMeshError> {
        let cell = decode_mesh_code("700000")?;
        assert_eq!(cell.lat_max.to_bits(), 0.0_f64.to_bits());
        assert_eq!(cell.long_max.to_bits(), 0.0_f64.to_bits());
        assert_eq!((cell.lat_min, cell.long_min), (-0.66666667, -1.0));
        Ok(())
    }

    #[test]
    fn test_corners() -> Result<(), WorldMeshError> {
        let code = "2053393589";
        let nw = mesh_code_corner(code, Corner::NorthWest)?;
        let sw = mesh_code_corner(code, Corner::SouthWest)?;
        let ne = mesh_code_corner(code, Corner::NorthEast)?;
        let se = mesh_code_corner(code, Corner::SouthEast)?;

        assert_eq!(mesh_code_to_latlong(code)?, nw);
        assert_eq!(nw, Point::new(139.7375, 35.65833334));
        assert_eq!(sw, Point::new(139.7375, 35.65));
        assert_eq!(ne, Point::new(139.75, 35.65833334));
        assert_eq!(se, Point::new(139.75, 35.65));
        Ok(())
    }

    #[test]
    fn test_unsupported_length() {
        assert_eq!(
            decode_mesh_code("12345"),
            Err(WorldMeshError::UnsupportedCodeLength(5))
        );
        assert_eq!(
            decode_mesh_code("205339358"),
            Err(WorldMeshError::UnsupportedCodeLength(9))
        );
        assert_eq!(
            decode_mesh_code(""),
            Err(WorldMeshError::UnsupportedCodeLength(0))
        );
    }

    #[test]
    fn test_invalid_digits() {
        for code in ["20533a", "005339", "905339", "20533995", "20533935895"] {
            assert!(
                matches!(decode_mesh_code(code), Err(WorldMeshError::InvalidMeshCode(_))),
                "{} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_elided_groups_parse_as_plain_numbers() {
        assert_eq!(parse_latitude_band("100705"), 7);
        assert_eq!(parse_latitude_band("107605"), 76);
        assert_eq!(parse_latitude_band("113580"), 135);
        assert_eq!(parse_longitude_degree("100705"), 5);
        assert_eq!(parse_longitude_degree("100745"), 45);
        assert_eq!(parse_longitude_degree("100700"), 0);
    }

    #[test]
    fn test_units_to_degrees() {
        // 34240 units of latitude is exactly 35 2/3 degrees.
        assert_eq!(units_to_degrees(34240, LATITUDE_UNITS_PER_DEGREE, false), 35.66666666);
        assert_eq!(units_to_degrees(34240, LATITUDE_UNITS_PER_DEGREE, true), 35.66666667);
        assert_eq!(units_to_degrees(34560, LATITUDE_UNITS_PER_DEGREE, true), 36.0);
        assert_eq!(units_to_degrees(11856, LATITUDE_UNITS_PER_DEGREE, false), 12.35);
        assert_eq!(units_to_degrees(1, LONGITUDE_UNITS_PER_DEGREE, true), 0.0015625);
    }

    #[test]
    fn test_cells_contain_points_on_grid_lines() -> Result<(), WorldMeshError> {
        let mut points = vec![(-12.35, -22.5), (35.0, -17.0), (35.0, 135.0), (-10.0, -110.0)];
        for band in (-134..=134).step_by(7) {
            for degree in (-179..=179).step_by(11) {
                points.push((band as f64 * 2.0 / 3.0, degree as f64));
            }
        }
        for (lat, long) in points {
            for level in MeshLevel::ALL {
                let code = encode_mesh_code(lat, long, level)?;
                let cell = decode_mesh_code(&code)?;
                assert!(
                    cell.contains(&(long, lat)),
                    "({}, {}) not in {} => {:?}",
                    lat,
                    long,
                    code,
                    cell
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_contains_point() -> Result<(), WorldMeshError> {
        let cell = decode_mesh_code("2053393589343")?;
        assert!(cell.contains(&(139.7414, 35.6581)));
        assert!(!cell.contains(&(139.7414, 35.7)));
        let center = cell.center();
        assert!(cell.contains(&center));
        Ok(())
    }
}
