pub mod constants;
mod bridge;
mod mesh_code;
mod mesh_decode;
mod place_code;

pub use bridge::place_code_to_mesh_code;
pub use constants::{
    AUTHORITY_PREFIX, AUTHORITY_PREFIX_HEX, CELL_HEIGHTS, CELL_WIDTHS, INVALID_PLACE_CODE,
    MAX_LEVEL, MESH_CODE_LENGTHS, PLACE_CODE_LENGTH,
};
pub use mesh_code::{MeshLevel, encode_mesh_code, encode_mesh_code_or_sentinel, encode_position};
pub use mesh_decode::{Corner, GridCell, decode_mesh_code, mesh_code_corner, mesh_code_to_latlong};
pub use place_code::{
    PlaceCode, decode_place_code, encode_place_code, encode_place_code_or_sentinel,
};
