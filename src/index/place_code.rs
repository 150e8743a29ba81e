use crate::coord::GeoPosition;
use crate::error::WorldMeshError;
use crate::index::constants::{
    AUTHORITY_PREFIX, AUTHORITY_PREFIX_HEX, INVALID_PLACE_CODE, LATITUDE_BITS, LATITUDE_SHIFT,
    LATITUDE_SIGN_SHIFT, LONGITUDE_BITS, LONGITUDE_SHIFT, LONGITUDE_SIGN_SHIFT,
    PLACE_CODE_LENGTH, PLACE_CODE_UNITS_PER_DEGREE,
};
use log::debug;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 128-bit place identification code (ucode) for a geographic position.
///
/// # Binary Format
///
/// Bits are listed most significant first:
///
/// | Bits    | Size | Field            | Description                                   |
/// |---------|------|------------------|-----------------------------------------------|
/// | 127-64  | 64   | Authority        | Fixed [`AUTHORITY_PREFIX`]                    |
/// | 63-62   | 2    | Reserved         | Always zero                                   |
/// | 61      | 1    | Latitude sign    | 1 when the latitude is negative               |
/// | 60-39   | 22   | Latitude         | `floor(abs(lat) * 36000)`, 0.1 arc-seconds    |
/// | 38      | 1    | Longitude sign   | 1 when the longitude is negative              |
/// | 37-15   | 23   | Longitude        | `floor(abs(long) * 36000)`, 0.1 arc-seconds   |
/// | 14-6    | 9    | Altitude         | Reserved, always zero                         |
/// | 5-0     | 6    | Item             | Reserved, always zero                         |
///
/// The code renders as 32 lowercase hex characters.
///
/// # Example
/// ```
/// use worldmesh_rs::{GeoPosition, PlaceCode};
///
/// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
/// let code = PlaceCode::from_position(&GeoPosition::new(35.0, 135.0)?);
/// assert_eq!(code.to_string(), "00001b0000000003099cf02514300000");
///
/// let parsed: PlaceCode = "00001B0000000003099CF02514300000".parse()?;
/// assert_eq!(parsed, code);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceCode(u128);

impl PlaceCode {
    /// Packs a position into a place code.
    pub fn from_position(position: &GeoPosition) -> Self {
        let (lat_sign, lat) = quantize(position.latitude());
        let (long_sign, long) = quantize(position.longitude());

        let lower = (lat_sign << LATITUDE_SIGN_SHIFT)
            | (lat << LATITUDE_SHIFT)
            | (long_sign << LONGITUDE_SIGN_SHIFT)
            | (long << LONGITUDE_SHIFT);

        Self(((AUTHORITY_PREFIX as u128) << 64) | lower as u128)
    }

    /// Unpacks the position stored in this code.
    ///
    /// Fails with [`WorldMeshError::InvalidCoordinateRange`] when the magnitude
    /// fields hold a value beyond 90 or 180 degrees.
    pub fn position(&self) -> Result<GeoPosition, WorldMeshError> {
        let lower = self.0 as u64;

        let latitude = dequantize(
            bit(lower, LATITUDE_SIGN_SHIFT),
            field(lower, LATITUDE_SHIFT, LATITUDE_BITS),
        );
        let longitude = dequantize(
            bit(lower, LONGITUDE_SIGN_SHIFT),
            field(lower, LONGITUDE_SHIFT, LONGITUDE_BITS),
        );

        GeoPosition::new(latitude, longitude)
    }

    /// Returns the raw 128-bit value.
    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for PlaceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for PlaceCode {
    type Err = WorldMeshError;

    /// Parses a rendered place code, accepting either case.
    ///
    /// # Errors
    ///
    /// - [`WorldMeshError::InvalidAuthorityPrefix`] - First 16 characters are not the authority prefix
    /// - [`WorldMeshError::InvalidPlaceCodeLength`] - Code is not 32 characters
    /// - [`WorldMeshError::InvalidPlaceCode`] - Code contains non-hex characters
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let code = code.trim().to_ascii_lowercase();

        match code.get(..AUTHORITY_PREFIX_HEX.len()) {
            Some(prefix) if prefix == AUTHORITY_PREFIX_HEX => {}
            _ => return Err(WorldMeshError::InvalidAuthorityPrefix),
        }

        if code.len() != PLACE_CODE_LENGTH {
            return Err(WorldMeshError::InvalidPlaceCodeLength(code.len()));
        }
        if !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WorldMeshError::InvalidPlaceCode(format!(
                "'{}' contains non-hex characters",
                code
            )));
        }

        let lower = u64::from_str_radix(&code[AUTHORITY_PREFIX_HEX.len()..], 16)
            .map_err(|e| WorldMeshError::InvalidPlaceCode(e.to_string()))?;

        Ok(Self(((AUTHORITY_PREFIX as u128) << 64) | lower as u128))
    }
}

impl Serialize for PlaceCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Encodes a latitude/longitude pair as a place code.
///
/// # Example
/// ```
/// use worldmesh_rs::{encode_place_code, WorldMeshError};
///
/// let code = encode_place_code(35.0, 135.0).unwrap();
/// assert_eq!(code.to_string(), "00001b0000000003099cf02514300000");
///
/// assert!(matches!(
///     encode_place_code(91.0, 0.0),
///     Err(WorldMeshError::InvalidCoordinateRange { .. })
/// ));
/// ```
pub fn encode_place_code(latitude: f64, longitude: f64) -> Result<PlaceCode, WorldMeshError> {
    let position = GeoPosition::new(latitude, longitude)?;
    Ok(PlaceCode::from_position(&position))
}

/// Encodes a latitude/longitude pair, rendering [`INVALID_PLACE_CODE`] when
/// the coordinate is out of range.
///
/// Callers that want "always a string" behaviour must compare against the
/// sentinel themselves.
pub fn encode_place_code_or_sentinel(latitude: f64, longitude: f64) -> String {
    match encode_place_code(latitude, longitude) {
        Ok(code) => code.to_string(),
        Err(e) => {
            debug!("Rendering place code sentinel: {}", e);
            INVALID_PLACE_CODE.to_string()
        }
    }
}

/// Decodes a rendered place code back to its position.
///
/// # Process
///
/// 1. Lowercases the code and checks the 16-character authority prefix
/// 2. Checks the length is 32 and every character is a hex digit
/// 3. Reads the lower 64 bits and extracts both sign flags and magnitudes
/// 4. Divides each magnitude by 36000 and applies its sign
///
/// # Example
/// ```
/// use worldmesh_rs::decode_place_code;
///
/// let pos = decode_place_code("00001b0000000003099cf02514300000").unwrap();
/// assert!((pos.latitude() - 35.0).abs() < 1e-4);
/// assert!((pos.longitude() - 135.0).abs() < 1e-4);
/// ```
pub fn decode_place_code(code: &str) -> Result<GeoPosition, WorldMeshError> {
    code.parse::<PlaceCode>()?.position()
}

/// Returns `(sign_flag, magnitude)` in tenths of an arc-second.
fn quantize(degrees: f64) -> (u64, u64) {
    let sign = if degrees < 0.0 { 1 } else { 0 };
    let magnitude = (degrees.abs() * 60.0 * 60.0 * 10.0).floor() as u64;
    (sign, magnitude)
}

fn dequantize(sign: u64, magnitude: u64) -> f64 {
    let degrees = magnitude as f64 / PLACE_CODE_UNITS_PER_DEGREE;
    if sign == 1 { -degrees } else { degrees }
}

fn bit(value: u64, shift: u32) -> u64 {
    (value >> shift) & 1
}

fn field(value: u64, shift: u32, bits: u32) -> u64 {
    (value >> shift) & ((1u64 << bits) - 1)
}
