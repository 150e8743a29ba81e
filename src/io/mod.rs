pub mod csv;

pub use csv::{CoordinateSource, CsvMeshConfig, CsvToMesh, GeometryFormat, csv_to_mesh_csv};
