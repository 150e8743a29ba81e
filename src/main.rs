use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::{debug, error};
use serde_json::json;
use std::error::Error;
use std::process;
use worldmesh_rs::{
    Corner, CsvMeshConfig, GeometryFormat, MeshLevel, csv_to_mesh_csv, decode_mesh_code,
    decode_place_code, encode_mesh_code, encode_mesh_code_or_sentinel, encode_place_code,
    encode_place_code_or_sentinel, place_code_to_mesh_code,
};

fn latitude_arg() -> Arg {
    Arg::new("lat")
        .help("Latitude in decimal degrees (-90 to 90)")
        .value_name("LAT")
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .required(true)
        .index(1)
}

fn longitude_arg() -> Arg {
    Arg::new("long")
        .help("Longitude in decimal degrees (-180 to 180)")
        .value_name("LONG")
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .required(true)
        .index(2)
}

fn level_arg() -> Arg {
    Arg::new("level")
        .short('l')
        .long("level")
        .help("Mesh level: 1=80km 2=10km 3=1km 4=500m 5=250m 6=125m")
        .value_name("LEVEL")
        .value_parser(value_parser!(u8).range(1..=6))
        .default_value("3")
}

fn sentinel_arg() -> Arg {
    Arg::new("sentinel")
        .long("sentinel")
        .help("Print the all-nines sentinel instead of failing on out-of-range input")
        .action(ArgAction::SetTrue)
}

fn code_arg(help: &'static str) -> Arg {
    Arg::new("code")
        .help(help)
        .value_name("CODE")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("worldmesh")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert coordinates to world grid mesh codes and ucode place codes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("place-code")
                .about("Encode a coordinate as a 32 digit hex place code")
                .arg(latitude_arg())
                .arg(longitude_arg())
                .arg(sentinel_arg()),
        )
        .subcommand(
            Command::new("decode-place-code")
                .about("Decode a place code to latitude and longitude")
                .arg(code_arg("Place code (32 hex digits)")),
        )
        .subcommand(
            Command::new("mesh-code")
                .about("Encode a coordinate as a mesh code")
                .arg(latitude_arg())
                .arg(longitude_arg())
                .arg(level_arg())
                .arg(sentinel_arg()),
        )
        .subcommand(
            Command::new("decode-mesh-code")
                .about("Decode a mesh code to its cell, or one corner of it")
                .arg(code_arg("Mesh code (6, 8, 10, 11, 12 or 13 digits)"))
                .arg(
                    Arg::new("corner")
                        .long("corner")
                        .help("Print only this corner of the cell")
                        .value_name("CORNER")
                        .value_parser(["nw", "sw", "ne", "se"]),
                ),
        )
        .subcommand(
            Command::new("place-to-mesh")
                .about("Convert a place code to the mesh code containing it")
                .arg(code_arg("Place code (32 hex digits)"))
                .arg(level_arg()),
        )
        .subcommand(
            Command::new("csv")
                .about("Annotate each row of a CSV file with its mesh code")
                .arg(
                    Arg::new("input")
                        .help("Input CSV file")
                        .value_name("INPUT")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .help("Output CSV file")
                        .value_name("OUTPUT")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("geometry")
                        .long("geometry")
                        .help("Column holding WKT or GeoJSON geometry")
                        .value_name("COLUMN")
                        .conflicts_with_all(["long", "lat"]),
                )
                .arg(
                    Arg::new("long")
                        .long("long")
                        .help("Column holding longitude")
                        .value_name("COLUMN")
                        .requires("lat"),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .help("Column holding latitude")
                        .value_name("COLUMN")
                        .requires("long"),
                )
                .arg(level_arg())
                .arg(
                    Arg::new("place-code")
                        .long("place-code")
                        .help("Add a place_code column")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("cell-geometry")
                        .long("cell-geometry")
                        .help("Add the cell outline as a cell_geometry column")
                        .value_name("FORMAT")
                        .value_parser(["wkt", "geojson"]),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .help("Comma separated columns to leave out of the output")
                        .value_name("COLUMNS")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                ),
        )
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env).init();
}

fn arg<T: Clone + Send + Sync + 'static>(
    matches: &ArgMatches,
    id: &str,
) -> Result<T, Box<dyn Error>> {
    matches
        .get_one::<T>(id)
        .cloned()
        .ok_or_else(|| format!("missing argument '{}'", id).into())
}

fn level(matches: &ArgMatches) -> Result<MeshLevel, Box<dyn Error>> {
    Ok(MeshLevel::try_from(arg::<u8>(matches, "level")?)?)
}

fn parse_corner(name: &str) -> Result<Corner, Box<dyn Error>> {
    match name {
        "nw" => Ok(Corner::NorthWest),
        "sw" => Ok(Corner::SouthWest),
        "ne" => Ok(Corner::NorthEast),
        "se" => Ok(Corner::SouthEast),
        other => Err(format!("unknown corner '{}'", other).into()),
    }
}

fn csv_config(matches: &ArgMatches) -> Result<CsvMeshConfig, Box<dyn Error>> {
    let level = level(matches)?;
    let mut config = match (
        matches.get_one::<String>("geometry"),
        matches.get_one::<String>("long"),
        matches.get_one::<String>("lat"),
    ) {
        (Some(geometry), _, _) => CsvMeshConfig::new(geometry, level),
        (None, Some(long), Some(lat)) => CsvMeshConfig::from_coords(long, lat, level),
        _ => return Err("either --geometry or both --long and --lat are required".into()),
    };

    if let Some(columns) = matches.get_many::<String>("exclude") {
        config = config.exclude(columns.cloned().collect());
    }
    if matches.get_flag("place-code") {
        config = config.with_place_code();
    }
    match matches.get_one::<String>("cell-geometry").map(String::as_str) {
        Some("wkt") => config = config.with_cell_geometry(GeometryFormat::Wkt),
        Some("geojson") => config = config.with_cell_geometry(GeometryFormat::GeoJson),
        _ => {}
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    match matches.subcommand() {
        Some(("place-code", sub)) => {
            let (lat, long) = (arg::<f64>(sub, "lat")?, arg::<f64>(sub, "long")?);
            if sub.get_flag("sentinel") {
                println!("{}", encode_place_code_or_sentinel(lat, long));
            } else {
                println!("{}", encode_place_code(lat, long)?);
            }
        }
        Some(("decode-place-code", sub)) => {
            let position = decode_place_code(&arg::<String>(sub, "code")?)?;
            println!("{}", serde_json::to_string_pretty(&position)?);
        }
        Some(("mesh-code", sub)) => {
            let (lat, long) = (arg::<f64>(sub, "lat")?, arg::<f64>(sub, "long")?);
            let level = level(sub)?;
            if sub.get_flag("sentinel") {
                println!("{}", encode_mesh_code_or_sentinel(lat, long, level));
            } else {
                println!("{}", encode_mesh_code(lat, long, level)?);
            }
        }
        Some(("decode-mesh-code", sub)) => {
            let code = arg::<String>(sub, "code")?;
            let cell = decode_mesh_code(&code)?;
            let output = match sub.get_one::<String>("corner") {
                Some(name) => {
                    let point = cell.corner(parse_corner(name)?);
                    json!({ "latitude": point.y(), "longitude": point.x() })
                }
                None => {
                    let level = MeshLevel::from_code_length(code.trim().len())?;
                    json!({ "mesh_code": code.trim(), "level": level.number(), "cell": cell })
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(("place-to-mesh", sub)) => {
            let code = arg::<String>(sub, "code")?;
            println!("{}", place_code_to_mesh_code(&code, level(sub)?)?);
        }
        Some(("csv", sub)) => {
            let config = csv_config(sub)?;
            debug!("CSV conversion config: {:?}", config);
            csv_to_mesh_csv(
                arg::<String>(sub, "input")?,
                arg::<String>(sub, "output")?,
                &config,
            )?;
        }
        Some((name, _)) => return Err(format!("unknown command '{}'", name).into()),
        None => return Err("no command given".into()),
    }
    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    init_logger(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() -> Result<(), Box<dyn Error>> {
        let matches =
            cli().try_get_matches_from(["worldmesh", "mesh-code", "-10", "-110", "-l", "1"])?;
        let (_, sub) = matches.subcommand().ok_or("no subcommand")?;
        assert_eq!(arg::<f64>(sub, "lat")?, -10.0);
        assert_eq!(arg::<f64>(sub, "long")?, -110.0);
        assert_eq!(level(sub)?, MeshLevel::Primary);
        Ok(())
    }

    #[test]
    fn test_level_out_of_range_is_rejected() {
        assert!(
            cli()
                .try_get_matches_from(["worldmesh", "mesh-code", "35", "139", "--level", "7"])
                .is_err()
        );
    }

    #[test]
    fn test_csv_config_from_args() -> Result<(), Box<dyn Error>> {
        let matches = cli().try_get_matches_from([
            "worldmesh",
            "csv",
            "in.csv",
            "out.csv",
            "--long",
            "lon",
            "--lat",
            "lat",
            "--place-code",
            "--cell-geometry",
            "geojson",
            "--exclude",
            "a,b",
        ])?;
        let (_, sub) = matches.subcommand().ok_or("no subcommand")?;
        let config = csv_config(sub)?;

        assert_eq!(config.level, MeshLevel::Standard);
        assert!(config.include_place_code);
        assert_eq!(config.include_cell_geometry, Some(GeometryFormat::GeoJson));
        assert_eq!(config.exclude_columns, vec!["a".to_string(), "b".to_string()]);
        Ok(())
    }

    #[test]
    fn test_csv_requires_a_source() -> Result<(), Box<dyn Error>> {
        let matches = cli().try_get_matches_from(["worldmesh", "csv", "in.csv", "out.csv"])?;
        let (_, sub) = matches.subcommand().ok_or("no subcommand")?;
        assert!(csv_config(sub).is_err());

        assert!(
            cli()
                .try_get_matches_from([
                    "worldmesh", "csv", "in.csv", "out.csv", "--geometry", "g", "--lat", "y",
                ])
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn test_parse_corner() -> Result<(), Box<dyn Error>> {
        assert_eq!(parse_corner("se")?, Corner::SouthEast);
        assert!(parse_corner("up").is_err());
        Ok(())
    }
}
