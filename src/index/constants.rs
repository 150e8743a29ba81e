/// Upper 64 bits of every place code: the identifier of the geospatial
/// authority of Japan (L1 to L3 of ITU-T H.642).
pub const AUTHORITY_PREFIX: u64 = 0x0000_1b00_0000_0003;

/// Hex rendering of [`AUTHORITY_PREFIX`], the first 16 characters of a place code.
pub const AUTHORITY_PREFIX_HEX: &str = "00001b0000000003";

/// Number of hex characters in a rendered place code.
pub const PLACE_CODE_LENGTH: usize = 32;

/// Rendered in place of a place code when the input coordinate is out of range.
/// Longer than a real code so it can never be mistaken for one.
pub const INVALID_PLACE_CODE: &str = "9999999999999999999999999999999999";

/// Tenths of an arc-second per degree.
pub(crate) const PLACE_CODE_UNITS_PER_DEGREE: f64 = 36000.0;

// Bit offsets within the lower 64 bits of a place code.
pub(crate) const LATITUDE_SIGN_SHIFT: u32 = 61;
pub(crate) const LATITUDE_SHIFT: u32 = 39;
pub(crate) const LATITUDE_BITS: u32 = 22;
pub(crate) const LONGITUDE_SIGN_SHIFT: u32 = 38;
pub(crate) const LONGITUDE_SHIFT: u32 = 15;
pub(crate) const LONGITUDE_BITS: u32 = 23;

/// Mesh code lengths for levels 1-6 (80km, 10km, 1km, 500m, 250m, 125m).
pub const MESH_CODE_LENGTHS: [usize; 6] = [6, 8, 10, 11, 12, 13];

/// Cell height in degrees of latitude for levels 1-6.
pub const CELL_HEIGHTS: [f64; 6] = [
    2.0 / 3.0,
    2.0 / 3.0 / 8.0,
    2.0 / 3.0 / 80.0,
    2.0 / 3.0 / 160.0,
    2.0 / 3.0 / 320.0,
    2.0 / 3.0 / 640.0,
];

/// Cell width in degrees of longitude for levels 1-6.
pub const CELL_WIDTHS: [f64; 6] = [1.0, 0.125, 0.0125, 0.00625, 0.003125, 0.0015625];

/// Longitude offset of the far-east octants (|longitude| >= 100).
pub(crate) const FAR_EAST_OFFSET: f64 = 100.0;

/// `(scale, width)` subdivision steps for latitude, one per level.
///
/// Each step computes `t = residual * scale / width`, takes `floor(t)` as the
/// bin and carries `(t - bin) * width` into the next step. The first step
/// turns degrees into 40 arc-minute bands, the rest work in minutes then seconds.
pub(crate) const LATITUDE_STEPS: [(f64, f64); 6] = [
    (60.0, 40.0),
    (1.0, 5.0),
    (60.0, 30.0),
    (1.0, 15.0),
    (1.0, 7.5),
    (1.0, 3.75),
];

/// `(scale, width)` subdivision steps for longitude, see [`LATITUDE_STEPS`].
pub(crate) const LONGITUDE_STEPS: [(f64, f64); 6] = [
    (1.0, 1.0),
    (60.0, 7.5),
    (60.0, 45.0),
    (1.0, 22.5),
    (1.0, 11.25),
    (1.0, 5.625),
];

/// Size of one cell in units of the finest level, for levels 1-6.
pub(crate) const CELL_UNITS: [u64; 6] = [640, 80, 8, 4, 2, 1];

// Finest-level cells per degree.
pub(crate) const LATITUDE_UNITS_PER_DEGREE: u64 = 960;
pub(crate) const LONGITUDE_UNITS_PER_DEGREE: u64 = 640;

/// Decoded edges are kept to this many steps per degree (8 decimals).
pub(crate) const DECIMAL_SCALE: u64 = 100_000_000;

/// Finest mesh level.
pub const MAX_LEVEL: u8 = 6;
