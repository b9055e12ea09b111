use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::basics::{Adjustment, NearbySchema, PredicateCategories, SectorSchema};
use crate::scene::Scene;


/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// North direction in the ground plane as (x, z).
    #[serde(default)]
    pub north: Option<Vec<f64>>,
    /// Path of a JSON array of objects.
    #[serde(default)]
    pub scene: Option<String>,
    /// Only report relations with this subject id.
    #[serde(default)]
    pub subject: Option<String>,
    /// Only report relations to this object id.
    #[serde(default)]
    pub object: Option<String>,
    /// Print relations as JSON instead of sentences.
    #[serde(default)]
    pub json: bool,
    #[serde(skip)]
    pub print_config: bool,
    #[serde(default)]
    pub adjustment: Adjustment,
    #[serde(default)]
    pub deduce: PredicateCategories,
}

impl Settings {
    pub fn north_vector(&self) -> Option<Vector2<f64>> {
        match self.north.as_deref() {
            Some([x, z]) => Some(Vector2::new(*x, *z)),
            _ => None,
        }
    }

    /// An empty scene using these settings.
    pub fn build_scene(&self) -> Result<Scene> {
        Ok(Scene::with_settings(
            self.adjustment,
            self.deduce,
            self.north_vector(),
        )?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Error serializing configuration")
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings: Config = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Load the local or default config file, then apply environment variables
/// (e.g. `SPATIAL_ADJUSTMENT__MAX_GAP=0.05`) and command line arguments.
pub fn load_config() -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        log::info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        log::info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings: Config = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(
            Environment::with_prefix("spatial")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    // Parse command-line arguments and override values
    let args = CliArgs::parse();
    apply_args(&mut config, args);

    validate_config(&config)?;

    log::debug!("{:#?}", config);

    Ok(config)
}

fn apply_args(config: &mut Settings, args: CliArgs) {
    let adjustment = &mut config.adjustment;
    if let Some(gap) = args.max_gap {
        adjustment.max_gap = gap;
    }
    if let Some(angle) = args.max_angle {
        adjustment.set_yaw(angle);
    }
    if let Some(schema) = args.sector_schema {
        adjustment.sector_schema = schema;
    }
    if let Some(factor) = args.sector_factor {
        adjustment.sector_factor = factor;
    }
    if let Some(limit) = args.sector_limit {
        adjustment.sector_limit = limit;
    }
    if let Some(schema) = args.nearby_schema {
        adjustment.nearby_schema = schema;
    }
    if let Some(factor) = args.nearby_factor {
        adjustment.nearby_factor = factor;
    }
    if let Some(limit) = args.nearby_limit {
        adjustment.nearby_limit = limit;
    }
    if let Some(ratio) = args.long_ratio {
        adjustment.long_ratio = ratio;
    }
    if let Some(ratio) = args.thin_ratio {
        adjustment.thin_ratio = ratio;
    }
    if let Some(categories) = args.deduce {
        config.deduce = PredicateCategories::from_names(&categories);
    }
    if let Some(scene) = args.scene {
        config.scene = Some(scene);
    }
    if let Some(subject) = args.subject {
        config.subject = Some(subject);
    }
    if let Some(object) = args.object {
        config.object = Some(object);
    }
    config.json |= args.json;
    config.print_config = args.print_config;
}

/// Retrieve the project root directory.
///
/// 1. If `CARGO_MANIFEST_DIR` is set (running through cargo), use it.
/// 2. If `SPATIAL_ROOT_DIR` is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or
///    any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("SPATIAL_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

fn validate_config(config: &Settings) -> Result<()> {
    config.adjustment.validate()?;
    if let Some(north) = &config.north {
        if north.len() != 2 {
            return Err(anyhow!("North must have two components (x, z), got {:?}", north));
        }
        if north.iter().all(|v| *v == 0.0) {
            return Err(anyhow!("North must not be the zero vector"));
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "Spatial Reasoner - qualitative relations between oriented 3D boxes")]
pub struct CliArgs {
    /// Maximum linear deviation in metres for fuzzy comparisons.
    #[arg(long)]
    max_gap: Option<f64>,

    /// Maximum angle deviation in degrees.
    #[arg(long)]
    max_angle: Option<f64>,

    /// Sector size schema: fixed, dimension, perimeter, area or nearby.
    #[arg(long, value_parser = parse_sector_schema)]
    sector_schema: Option<SectorSchema>,

    #[arg(long)]
    sector_factor: Option<f64>,

    #[arg(long)]
    sector_limit: Option<f64>,

    /// Nearby radius schema: fixed, circle, sphere, perimeter or area.
    #[arg(long, value_parser = parse_nearby_schema)]
    nearby_schema: Option<NearbySchema>,

    #[arg(long)]
    nearby_factor: Option<f64>,

    /// Upper bound of the nearby radius.
    #[arg(long)]
    nearby_limit: Option<f64>,

    /// Ratio above which an object counts as long.
    #[arg(long)]
    long_ratio: Option<f64>,

    /// Ratio above which an object counts as thin.
    #[arg(long)]
    thin_ratio: Option<f64>,

    /// Categories to deduce, e.g. "topology connectivity similarity".
    #[arg(long)]
    deduce: Option<String>,

    /// JSON file holding an array of objects.
    #[arg(long)]
    scene: Option<String>,

    /// Only report relations with this subject id.
    #[arg(long)]
    subject: Option<String>,

    /// Only report relations to this object id.
    #[arg(long)]
    object: Option<String>,

    /// Print relations as JSON.
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn parse_sector_schema(s: &str) -> Result<SectorSchema, String> {
    SectorSchema::named(s).ok_or_else(|| {
        format!(
            "Unknown sector schema '{}'. Expected fixed, dimension, perimeter, area or nearby",
            s
        )
    })
}

fn parse_nearby_schema(s: &str) -> Result<NearbySchema, String> {
    NearbySchema::named(s).ok_or_else(|| {
        format!(
            "Unknown nearby schema '{}'. Expected fixed, circle, sphere, perimeter or area",
            s
        )
    })
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.adjustment;
        write!(
            f,
            "Settings:
  - Max Gap: {:.4}
  - Max Angle Delta: {:.2}°
  - Sector: {} x{:.2} (limit {:.2})
  - Nearby: {} x{:.2} (limit {:.2})
  - Long Ratio: {:.2}
  - Thin Ratio: {:.2}
  - Deduce: {:?}
  - North: {:?}
  ",
            a.max_gap,
            a.yaw(),
            a.sector_schema.raw(),
            a.sector_factor,
            a.sector_limit,
            a.nearby_schema.raw(),
            a.nearby_factor,
            a.nearby_limit,
            a.long_ratio,
            a.thin_ratio,
            self.deduce,
            self.north,
        )
    }
}
