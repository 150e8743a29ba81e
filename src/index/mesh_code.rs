use crate::coord::GeoPosition;
use crate::error::WorldMeshError;
use crate::index::constants::{
    CELL_HEIGHTS, CELL_WIDTHS, FAR_EAST_OFFSET, LATITUDE_STEPS, LONGITUDE_STEPS, MAX_LEVEL,
    MESH_CODE_LENGTHS,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolution level of a mesh code.
///
/// | Level | Variant     | Digits | Cell size (lat x long)   | Nominal |
/// |-------|-------------|--------|--------------------------|---------|
/// | 1     | `Primary`   | 6      | 40' x 1 deg              | 80 km   |
/// | 2     | `Secondary` | 8      | 5' x 7.5'                | 10 km   |
/// | 3     | `Standard`  | 10     | 30" x 45"                | 1 km    |
/// | 4     | `Half`      | 11     | 15" x 22.5"              | 500 m   |
/// | 5     | `Quarter`   | 12     | 7.5" x 11.25"            | 250 m   |
/// | 6     | `Eighth`    | 13     | 3.75" x 5.625"           | 125 m   |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum MeshLevel {
    Primary = 1,
    Secondary = 2,
    #[default]
    Standard = 3,
    Half = 4,
    Quarter = 5,
    Eighth = 6,
}

impl MeshLevel {
    /// Every level, coarsest first.
    pub const ALL: [MeshLevel; 6] = [
        MeshLevel::Primary,
        MeshLevel::Secondary,
        MeshLevel::Standard,
        MeshLevel::Half,
        MeshLevel::Quarter,
        MeshLevel::Eighth,
    ];

    /// Level number, 1 (80 km) to 6 (125 m).
    pub fn number(self) -> u8 {
        self as u8
    }

    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    /// Number of digits in a mesh code of this level.
    pub fn code_length(self) -> usize {
        MESH_CODE_LENGTHS[self.index()]
    }

    /// Returns the level whose codes have `len` digits.
    pub fn from_code_length(len: usize) -> Result<Self, WorldMeshError> {
        MESH_CODE_LENGTHS
            .iter()
            .position(|&l| l == len)
            .map(|i| Self::ALL[i])
            .ok_or(WorldMeshError::UnsupportedCodeLength(len))
    }

    /// Cell height in degrees of latitude.
    pub fn cell_height(self) -> f64 {
        CELL_HEIGHTS[self.index()]
    }

    /// Cell width in degrees of longitude.
    pub fn cell_width(self) -> f64 {
        CELL_WIDTHS[self.index()]
    }

    /// Next coarser level, `None` for [`MeshLevel::Primary`].
    pub fn parent(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Sentinel rendered instead of a code of this level for invalid input.
    pub fn sentinel(self) -> String {
        "9".repeat(self.code_length())
    }

    /// Nominal cell size.
    ///
    /// ```
    /// use worldmesh_rs::MeshLevel;
    ///
    /// assert_eq!(MeshLevel::Quarter.resolution(), "250m");
    /// ```
    pub fn resolution(self) -> &'static str {
        match self {
            MeshLevel::Primary => "80km",
            MeshLevel::Secondary => "10km",
            MeshLevel::Standard => "1km",
            MeshLevel::Half => "500m",
            MeshLevel::Quarter => "250m",
            MeshLevel::Eighth => "125m",
        }
    }
}

impl TryFrom<u8> for MeshLevel {
    type Error = WorldMeshError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if level == 0 || level > MAX_LEVEL {
            return Err(WorldMeshError::InvalidLevel(level));
        }
        Ok(Self::ALL[level as usize - 1])
    }
}

impl fmt::Display for MeshLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} ({})", self.number(), self.resolution())
    }
}

/// One of the eight outermost areas of the world grid.
///
/// The octant index is `4 * south + 2 * west + far_east`, and the leading
/// digit of a mesh code is that index plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Octant {
    pub south: bool,
    pub west: bool,
    pub far_east: bool,
}

impl Octant {
    pub fn of(position: &GeoPosition) -> Self {
        Self {
            south: position.latitude() < 0.0,
            west: position.longitude() < 0.0,
            far_east: position.longitude().abs() >= FAR_EAST_OFFSET,
        }
    }

    pub fn from_digit(digit: u32) -> Option<Self> {
        if !(1..=8).contains(&digit) {
            return None;
        }
        let index = digit - 1;
        Some(Self {
            south: index & 4 != 0,
            west: index & 2 != 0,
            far_east: index & 1 != 0,
        })
    }

    pub fn index(self) -> u32 {
        4 * self.south as u32 + 2 * self.west as u32 + self.far_east as u32
    }

    pub fn digit(self) -> u32 {
        self.index() + 1
    }

    /// Reflects a latitude into the northern hemisphere.
    pub fn mirror_latitude(self, latitude: f64) -> f64 {
        if self.south { -latitude } else { latitude }
    }

    /// Reflects a longitude into the eastern hemisphere.
    pub fn mirror_longitude(self, longitude: f64) -> f64 {
        if self.west { -longitude } else { longitude }
    }

    pub fn longitude_offset(self) -> f64 {
        if self.far_east { FAR_EAST_OFFSET } else { 0.0 }
    }
}

/// Splits `value` into one bin index per subdivision step.
fn subdivide(value: f64, steps: &[(f64, f64); 6]) -> [u32; 6] {
    let mut bins = [0u32; 6];
    let mut residual = value;
    for (bin, &(scale, width)) in bins.iter_mut().zip(steps) {
        let t = residual * scale / width;
        let index = t.floor();
        residual = (t - index) * width;
        *bin = index as u32;
    }
    bins
}

/// Computes the finest (13 digit) mesh code for a position.
///
/// # Process
///
/// 1. Picks the octant from the latitude sign, longitude sign and `|long| >= 100`
/// 2. Mirrors the position into the north-east quadrant
/// 3. Subdivides latitude and longitude independently, carrying the remainder
///    of each level into the next
/// 4. Writes the octant digit, the 3 digit latitude band, the 2 digit longitude
///    degree, the two 10 km digits, the two 1 km digits and three quadrant digits
fn encode_finest(position: &GeoPosition) -> String {
    let octant = Octant::of(position);
    let latitude = octant.mirror_latitude(position.latitude());
    let longitude = octant.mirror_longitude(position.longitude()) - octant.longitude_offset();

    let [p, q, r, s2u, s4u, s8u] = subdivide(latitude, &LATITUDE_STEPS);
    let [u, v, w, s2l, s4l, s8l] = subdivide(longitude, &LONGITUDE_STEPS);

    // Quadrants: 1 = SW, 2 = SE, 3 = NW, 4 = NE.
    let s2 = s2u * 2 + s2l + 1;
    let s4 = s4u * 2 + s4l + 1;
    let s8 = s8u * 2 + s8l + 1;

    format!(
        "{}{:03}{:02}{}{}{}{}{}{}{}",
        octant.digit(),
        p,
        u,
        q,
        v,
        r,
        w,
        s2,
        s4,
        s8
    )
}

/// Encodes a latitude/longitude pair as a mesh code of the given level.
///
/// Every coarser code is a prefix of every finer code for the same point.
///
/// # Example
/// ```
/// use worldmesh_rs::{encode_mesh_code, MeshLevel};
///
/// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
/// assert_eq!(encode_mesh_code(35.6581, 139.7414, MeshLevel::Primary)?, "205339");
/// assert_eq!(encode_mesh_code(35.6581, 139.7414, MeshLevel::Standard)?, "2053393589");
/// assert_eq!(encode_mesh_code(35.6581, 139.7414, MeshLevel::Eighth)?, "2053393589343");
/// # Ok(())
/// # }
/// ```
pub fn encode_mesh_code(
    latitude: f64,
    longitude: f64,
    level: MeshLevel,
) -> Result<String, WorldMeshError> {
    let position = GeoPosition::new(latitude, longitude)?;
    Ok(encode_position(&position, level))
}

/// Encodes an already validated position.
pub fn encode_position(position: &GeoPosition, level: MeshLevel) -> String {
    let mut code = encode_finest(position);
    code.truncate(level.code_length());
    code
}

/// Encodes a latitude/longitude pair, rendering all nines of the level's
/// length when the coordinate is out of range.
pub fn encode_mesh_code_or_sentinel(latitude: f64, longitude: f64, level: MeshLevel) -> String {
    match encode_mesh_code(latitude, longitude, level) {
        Ok(code) => code,
        Err(e) => {
            debug!("Rendering {} mesh code sentinel: {}", level, e);
            level.sentinel()
        }
    }
}
