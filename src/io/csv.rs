use crate::cell::MeshCell;
use crate::error::WorldMeshError;
use crate::geom::parse_geometry;
use crate::index::{INVALID_PLACE_CODE, MeshLevel, encode_place_code_or_sentinel};
use geo::Centroid;
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

enum SourceIndices {
    Geometry(usize),
    Coordinates { long_idx: usize, lat_idx: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text format (e.g., "POLYGON((...))")
    Wkt,
    /// GeoJSON format
    GeoJson,
}

#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// A single column containing WKT or GeoJSON geometry in WGS84
    GeometryColumn(String),
    /// Separate longitude and latitude columns in decimal degrees
    CoordinateColumns {
        long_column: String,
        lat_column: String,
    },
}

#[derive(Debug, Clone)]
pub struct CsvMeshConfig {
    pub source: CoordinateSource,
    pub exclude_columns: Vec<String>,
    pub level: MeshLevel,
    pub include_place_code: bool,
    pub include_cell_geometry: Option<GeometryFormat>,
}

impl CsvMeshConfig {
    /// Create config for a CSV with a geometry column (WKT or GeoJSON).
    ///
    /// # Example
    /// ```
    /// use worldmesh_rs::{CsvMeshConfig, MeshLevel};
    ///
    /// let config = CsvMeshConfig::new("geometry", MeshLevel::Standard);
    /// ```
    pub fn new(geometry_column: impl Into<String>, level: MeshLevel) -> Self {
        Self {
            source: CoordinateSource::GeometryColumn(geometry_column.into()),
            exclude_columns: Vec::new(),
            level,
            include_place_code: false,
            include_cell_geometry: None,
        }
    }

    /// Create config for a CSV with separate longitude/latitude columns.
    ///
    /// # Example
    /// ```
    /// use worldmesh_rs::{CsvMeshConfig, MeshLevel};
    ///
    /// let config = CsvMeshConfig::from_coords("Longitude", "Latitude", MeshLevel::Half)
    ///     .with_place_code();
    /// ```
    pub fn from_coords(
        long_column: impl Into<String>,
        lat_column: impl Into<String>,
        level: MeshLevel,
    ) -> Self {
        Self {
            source: CoordinateSource::CoordinateColumns {
                long_column: long_column.into(),
                lat_column: lat_column.into(),
            },
            exclude_columns: Vec::new(),
            level,
            include_place_code: false,
            include_cell_geometry: None,
        }
    }

    pub fn exclude(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    // Add a place_code column after mesh_code.
    pub fn with_place_code(mut self) -> Self {
        self.include_place_code = true;
        self
    }

    // Include the cell rectangle in output.
    pub fn with_cell_geometry(mut self, format: GeometryFormat) -> Self {
        self.include_cell_geometry = Some(format);
        self
    }
}

pub trait CsvToMesh {
    fn to_mesh_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvMeshConfig,
    ) -> Result<(), WorldMeshError>;
}

impl<P: AsRef<Path>> CsvToMesh for P {
    fn to_mesh_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvMeshConfig,
    ) -> Result<(), WorldMeshError> {
        csv_to_mesh_csv(self, output_path, config)
    }
}

fn polygon_to_wkt(polygon: &geo_types::Polygon<f64>) -> String {
    use wkt::ToWkt;
    polygon.wkt_string()
}

fn polygon_to_geojson(polygon: &geo_types::Polygon<f64>) -> String {
    let geom = geojson::Geometry::from(polygon);
    geom.to_string()
}

fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    role: &str,
) -> Result<usize, WorldMeshError> {
    if name.is_empty() {
        return Err(WorldMeshError::CsvError(format!(
            "{} column name cannot be empty",
            role
        )));
    }
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| WorldMeshError::CsvError(format!("{} column '{}' not found", role, name)))
}

fn parse_degrees(
    record: &csv::StringRecord,
    idx: usize,
    role: &str,
) -> Result<f64, WorldMeshError> {
    let value = record
        .get(idx)
        .ok_or_else(|| {
            WorldMeshError::CsvError(format!("Missing {} column at index {}", role, idx))
        })?
        .trim();
    value
        .parse()
        .map_err(|_| WorldMeshError::CsvError(format!("Invalid {}: '{}'", role, value)))
}

/// Annotates every row of a CSV file with the mesh code of its location.
///
/// Output columns are `mesh_code`, then `place_code` and `cell_geometry` when
/// enabled, then every input column except the source and excluded ones.
/// Geometry rows produce one output row per cell (lines may cross many).
/// Rows whose coordinates are out of range, or whose geometry is empty, keep
/// their data but get sentinel codes and an empty geometry. Streams output to minimize memory usage for
/// large files.
///
/// # Example with geometry column (WKT or GeoJSON)
///
/// ```no_run
/// use worldmesh_rs::{csv_to_mesh_csv, CsvMeshConfig, GeometryFormat, MeshLevel};
///
/// let config = CsvMeshConfig::new("geometry", MeshLevel::Standard)
///     .exclude(vec!["Geo Point".into()])
///     .with_cell_geometry(GeometryFormat::Wkt);
///
/// csv_to_mesh_csv("input.csv", "output.csv", &config).unwrap();
/// ```
///
/// # Example with coordinate columns
///
/// ```no_run
/// use worldmesh_rs::{csv_to_mesh_csv, CsvMeshConfig, MeshLevel};
///
/// let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Eighth).with_place_code();
///
/// csv_to_mesh_csv("stations.csv", "output.csv", &config).unwrap();
/// ```
pub fn csv_to_mesh_csv(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CsvMeshConfig,
) -> Result<(), WorldMeshError> {
    let file = File::open(csv_path).map_err(|e| WorldMeshError::IoError(e.to_string()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| WorldMeshError::CsvError(e.to_string()))?
        .clone();

    // Source columns never reach the output.
    let (source_indices, mut exclude_indices) = match &config.source {
        CoordinateSource::GeometryColumn(col) => {
            let idx = column_index(&headers, col, "Geometry")?;
            (SourceIndices::Geometry(idx), HashSet::from([idx]))
        }
        CoordinateSource::CoordinateColumns {
            long_column,
            lat_column,
        } => {
            let long_idx = column_index(&headers, long_column, "Longitude")?;
            let lat_idx = column_index(&headers, lat_column, "Latitude")?;
            (
                SourceIndices::Coordinates { long_idx, lat_idx },
                HashSet::from([long_idx, lat_idx]),
            )
        }
    };

    for col_name in &config.exclude_columns {
        if let Some(idx) = headers.iter().position(|h| h == col_name) {
            exclude_indices.insert(idx);
        }
    }

    let output_path = output_path.as_ref();
    let out_file =
        File::create(output_path).map_err(|e| WorldMeshError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row: Vec<&str> = vec!["mesh_code"];
    if config.include_place_code {
        header_row.push("place_code");
    }
    if config.include_cell_geometry.is_some() {
        header_row.push("cell_geometry");
    }
    for (i, h) in headers.iter().enumerate() {
        if !exclude_indices.contains(&i) {
            header_row.push(h);
        }
    }
    writer
        .write_record(&header_row)
        .map_err(|e| WorldMeshError::CsvError(e.to_string()))?;

    let mut rows_read = 0usize;
    let mut rows_written = 0usize;
    let mut sentinel_rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| WorldMeshError::CsvError(e.to_string()))?;
        rows_read += 1;

        let (cells, place_code) = match &source_indices {
            SourceIndices::Geometry(idx) => {
                let geom_str = record.get(*idx).ok_or_else(|| {
                    WorldMeshError::CsvError(format!("Missing geometry column at index {}", idx))
                })?;
                let geom = parse_geometry(geom_str)?;
                let place_code = geom.centroid().map_or_else(
                    || INVALID_PLACE_CODE.to_string(),
                    |c| encode_place_code_or_sentinel(c.y(), c.x()),
                );
                (MeshCell::from_geometry(geom, config.level), place_code)
            }
            SourceIndices::Coordinates { long_idx, lat_idx } => {
                let longitude = parse_degrees(&record, *long_idx, "longitude")?;
                let latitude = parse_degrees(&record, *lat_idx, "latitude")?;
                (
                    MeshCell::from_lat_long(latitude, longitude, config.level).map(|c| vec![c]),
                    encode_place_code_or_sentinel(latitude, longitude),
                )
            }
        };

        let cells: Vec<Option<MeshCell>> = match cells {
            Ok(cells) if cells.is_empty() => {
                warn!("Row {}: geometry covers no cells, writing sentinel codes", rows_read);
                sentinel_rows += 1;
                vec![None]
            }
            Ok(cells) => cells.into_iter().map(Some).collect(),
            Err(e @ WorldMeshError::InvalidCoordinateRange { .. }) => {
                warn!("Row {}: {}, writing sentinel codes", rows_read, e);
                sentinel_rows += 1;
                vec![None]
            }
            Err(e) => return Err(e),
        };

        for cell in cells {
            let mut row: Vec<String> = vec![
                cell.as_ref()
                    .map_or_else(|| config.level.sentinel(), |c| c.id.clone()),
            ];

            if config.include_place_code {
                row.push(place_code.clone());
            }

            if let Some(format) = config.include_cell_geometry {
                let geom_str = match &cell {
                    Some(cell) => {
                        let polygon = cell.to_polygon();
                        match format {
                            GeometryFormat::Wkt => polygon_to_wkt(&polygon),
                            GeometryFormat::GeoJson => polygon_to_geojson(&polygon),
                        }
                    }
                    None => String::new(),
                };
                row.push(geom_str);
            }

            for (i, field) in record.iter().enumerate() {
                if !exclude_indices.contains(&i) {
                    row.push(field.to_string());
                }
            }
            writer
                .write_record(&row)
                .map_err(|e| WorldMeshError::CsvError(e.to_string()))?;
            rows_written += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| WorldMeshError::IoError(e.to_string()))?;

    info!(
        "Wrote {} rows for {} input rows to {} ({} with sentinel codes)",
        rows_written,
        rows_read,
        output_path.display(),
        sentinel_rows
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_input(lines: &[&str]) -> Result<(TempDir, PathBuf, PathBuf), WorldMeshError> {
        let dir = tempdir().map_err(|e| WorldMeshError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("input.csv");
        let output_path = dir.path().join("output.csv");

        let mut file =
            File::create(&csv_path).map_err(|e| WorldMeshError::IoError(e.to_string()))?;
        for line in lines {
            writeln!(file, "{}", line).map_err(|e| WorldMeshError::IoError(e.to_string()))?;
        }
        Ok((dir, csv_path, output_path))
    }

    fn read_output(path: &Path) -> Result<Vec<Vec<String>>, WorldMeshError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| WorldMeshError::CsvError(e.to_string()))?;
        reader
            .records()
            .map(|r| {
                r.map(|record| record.iter().map(str::to_string).collect())
                    .map_err(|e| WorldMeshError::CsvError(e.to_string()))
            })
            .collect()
    }

    #[test]
    fn test_csv_from_coords() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "id,lon,lat,name",
            "1,139.7414,35.6581,Tokyo",
            "2,151.2093,-33.8688,Sydney",
        ])?;

        let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Eighth);
        csv_to_mesh_csv(&csv_path, &output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert_eq!(rows[0], vec!["mesh_code", "id", "name"]);
        assert_eq!(rows[1], vec!["2053393589343", "1", "Tokyo"]);
        assert_eq!(rows[2], vec!["6050516146232", "2", "Sydney"]);
        Ok(())
    }

    #[test]
    fn test_csv_with_place_code_and_exclusions() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "lat,lon,note,internal",
            "35.0,135.0,Akashi,x",
        ])?;

        let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Primary)
            .with_place_code()
            .exclude(vec!["internal".into(), "missing".into()]);
        csv_to_mesh_csv(&csv_path, &output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert_eq!(rows[0], vec!["mesh_code", "place_code", "note"]);
        assert_eq!(
            rows[1],
            vec!["205235", "00001b0000000003099cf02514300000", "Akashi"]
        );
        Ok(())
    }

    #[test]
    fn test_csv_out_of_range_rows_get_sentinels() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "lon,lat,name",
            "0.0,95.0,Nowhere",
            "-0.12,51.5,London",
        ])?;

        let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Standard)
            .with_place_code()
            .with_cell_geometry(GeometryFormat::Wkt);
        csv_path.to_mesh_csv(&output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "9999999999");
        assert_eq!(rows[1][1], INVALID_PLACE_CODE);
        assert_eq!(rows[1][2], "");
        assert_eq!(rows[1][3], "Nowhere");
        assert_eq!(rows[2][0], "3077002009");
        assert!(rows[2][2].starts_with("POLYGON"));
        Ok(())
    }

    #[test]
    fn test_csv_geometry_column_wkt_and_geojson() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "ASSET_ID,geometry",
            "A1,\"POINT(139.7414 35.6581)\"",
            "A2,\"{\"\"type\"\":\"\"Point\"\",\"\"coordinates\"\":[-0.12,51.5]}\"",
        ])?;

        let config = CsvMeshConfig::new("geometry", MeshLevel::Standard)
            .with_cell_geometry(GeometryFormat::GeoJson);
        csv_to_mesh_csv(&csv_path, &output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert_eq!(rows[0], vec!["mesh_code", "cell_geometry", "ASSET_ID"]);
        assert_eq!(rows[1][0], "2053393589");
        assert!(rows[1][1].contains("\"Polygon\""));
        assert_eq!(rows[1][2], "A1");
        assert_eq!(rows[2][0], "3077002009");
        Ok(())
    }

    #[test]
    fn test_csv_empty_geometry_keeps_its_row() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "ASSET_ID,geometry",
            "E1,\"{\"\"type\"\":\"\"LineString\"\",\"\"coordinates\"\":[]}\"",
            "A1,\"POINT(139.7414 35.6581)\"",
        ])?;

        let config = CsvMeshConfig::new("geometry", MeshLevel::Half)
            .with_place_code()
            .with_cell_geometry(GeometryFormat::Wkt);
        csv_to_mesh_csv(&csv_path, &output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            vec!["99999999999", INVALID_PLACE_CODE, "", "E1"]
        );
        assert_eq!(rows[2][0], "20533935893");
        assert_eq!(rows[2][3], "A1");
        Ok(())
    }

    #[test]
    fn test_csv_linestring_expands_to_many_rows()-> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&[
            "route,geometry",
            "R1,\"LINESTRING(139.7005 35.655, 139.7495 35.655)\"",
        ])?;

        let config = CsvMeshConfig::new("geometry", MeshLevel::Standard).with_place_code();
        csv_to_mesh_csv(&csv_path, &output_path, &config)?;

        let rows = read_output(&output_path)?;
        assert!(rows.len() > 2);
        // Every row carries the place code of the line's centroid.
        let place_code = &rows[1][1];
        for row in &rows[1..] {
            assert_eq!(&row[1], place_code);
            assert_eq!(row[2], "R1");
        }
        Ok(())
    }

    #[test]
    fn test_csv_missing_column() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&["x,y", "1,2"])?;

        let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Standard);
        assert!(matches!(
            csv_to_mesh_csv(&csv_path, &output_path, &config),
            Err(WorldMeshError::CsvError(_))
        ));

        let config = CsvMeshConfig::new("", MeshLevel::Standard);
        assert!(matches!(
            csv_to_mesh_csv(&csv_path, &output_path, &config),
            Err(WorldMeshError::CsvError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_csv_unparseable_coordinate() -> Result<(), WorldMeshError> {
        let (_dir, csv_path, output_path) = write_input(&["lon,lat", "abc,35.0"])?;

        let config = CsvMeshConfig::from_coords("lon", "lat", MeshLevel::Standard);
        assert_eq!(
            csv_to_mesh_csv(&csv_path, &output_path, &config),
            Err(WorldMeshError::CsvError("Invalid longitude: 'abc'".to_string()))
        );
        Ok(())
    }
}
