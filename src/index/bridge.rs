use crate::error::WorldMeshError;
use crate::index::mesh_code::{MeshLevel, encode_position};
use crate::index::place_code::decode_place_code;

/// Converts a place code to the mesh code of the cell containing it.
///
/// Errors from decoding the place code are returned unchanged.
///
/// # Example
/// ```
/// use worldmesh_rs::{MeshLevel, place_code_to_mesh_code};
///
/// # fn main() -> Result<(), worldmesh_rs::WorldMeshError> {
/// let code = place_code_to_mesh_code("00001b0000000003099cf02514300000", MeshLevel::Standard)?;
/// assert_eq!(code, "2052354000");
/// # Ok(())
/// # }
/// ```
pub fn place_code_to_mesh_code(code: &str, level: MeshLevel) -> Result<String, WorldMeshError> {
    let position = decode_place_code(code)?;
    Ok(encode_position(&position, level))
}
