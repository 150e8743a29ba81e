/// Error type for worldmesh-rs operations.
#[derive(Debug, PartialEq)]
pub enum WorldMeshError {
    /// Latitude must be within [-90, 90] and longitude within [-180, 180].
    InvalidCoordinateRange { latitude: f64, longitude: f64 },
    /// The place code does not start with the fixed authority prefix.
    InvalidAuthorityPrefix,
    /// The place code is not 32 hex characters long.
    InvalidPlaceCodeLength(usize),
    /// The place code contains non-hex characters.
    InvalidPlaceCode(String),
    /// The mesh code length is not one of 6, 8, 10, 11, 12 or 13.
    UnsupportedCodeLength(usize),
    /// The mesh code has the right length but an impossible digit.
    InvalidMeshCode(String),
    /// The mesh level is outside the valid range (1-6).
    InvalidLevel(u8),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    GeometryParseError(String),
    /// File I/O error.
    IoError(String),
    /// CSV parsing or writing error.
    CsvError(String),
}

impl std::fmt::Display for WorldMeshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldMeshError::InvalidCoordinateRange {
                latitude,
                longitude,
            } => write!(
                f,
                "Coordinate out of range: latitude {}, longitude {}",
                latitude, longitude
            ),
            WorldMeshError::InvalidAuthorityPrefix => {
                write!(f, "Not a place identification code: authority prefix mismatch")
            }
            WorldMeshError::InvalidPlaceCodeLength(len) => {
                write!(f, "Invalid place code length: {} (expected 32)", len)
            }
            WorldMeshError::InvalidPlaceCode(msg) => write!(f, "Invalid place code: {}", msg),
            WorldMeshError::UnsupportedCodeLength(len) => {
                write!(f, "Unsupported mesh code length: {}", len)
            }
            WorldMeshError::InvalidMeshCode(msg) => write!(f, "Invalid mesh code: {}", msg),
            WorldMeshError::InvalidLevel(level) => write!(f, "Invalid mesh level: {}", level),
            WorldMeshError::GeometryParseError(msg) => write!(f, "Geometry parse error: {}", msg),
            WorldMeshError::IoError(msg) => write!(f, "IO error: {}", msg),
            WorldMeshError::CsvError(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for WorldMeshError {}
