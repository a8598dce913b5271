use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::geometry::Coordinate;
use crate::planner::SearchConfig;

/// Fixed system constants shared by the planner and the order validator.
///
/// Movement and closeness share one value: a position counts as "close" to
/// another when it is less than one move away.
pub mod constants {
    use crate::geometry::Coordinate;

    /// Length of one drone move in degrees.
    pub const DRONE_MOVE_DISTANCE: f64 = 0.00015;

    /// Two positions closer than this are treated as the same place.
    pub const DRONE_IS_CLOSE_DISTANCE: f64 = DRONE_MOVE_DISTANCE;

    /// Angle written out for a hover move.
    pub const HOVER_ANGLE: f64 = 999.0;

    /// Default cap on expanded search nodes per leg.
    pub const MAX_SEARCH_ITERATIONS: usize = 150_000;

    pub const MAX_PIZZAS_PER_ORDER: usize = 4;

    /// Flat delivery charge added to every order total.
    pub const ORDER_CHARGE_IN_PENCE: u32 = 100;

    /// Appleton Tower, where every flight starts and ends.
    pub const APPLETON_TOWER: Coordinate = Coordinate {
        lng: -3.186874,
        lat: 55.944494,
    };
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("resultfiles")
}
fn default_verbose() -> bool {
    false
}
fn default_depot() -> Coordinate {
    constants::APPLETON_TOWER
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default = "default_depot")]
    pub depot: Coordinate,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub rest: RestConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: default_verbose(),
            depot: default_depot(),
            search: SearchConfig::default(),
            rest: RestConfig::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl FileConfig {
    /// Load the first config file found on the search path, if any, along
    /// with the path it was read from.
    pub fn load() -> Option<(PathBuf, Self)> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some((path, config)),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file. Unlike [`FileConfig::load`],
    /// a missing or malformed file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("dronepath.toml"));
    paths.push(PathBuf::from(".dronepath.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dronepath").join("config.toml"));
        paths.push(config_dir.join("dronepath.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".dronepath.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();

        assert_eq!(config.output_dir, PathBuf::from("resultfiles"));
        assert_eq!(config.depot, constants::APPLETON_TOWER);
        assert_eq!(config.search.max_iterations, constants::MAX_SEARCH_ITERATIONS);
        assert_eq!(config.rest.max_retries, 3);
    }

    #[test]
    fn test_partial_config() {
        let contents = r#"
            output_dir = "out"

            [depot]
            lng = -3.19
            lat = 55.94

            [search]
            max_iterations = 5000
        "#;
        let config: FileConfig = toml::from_str(contents).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.depot, Coordinate::new(-3.19, 55.94));
        assert_eq!(config.search.max_iterations, 5000);
        assert_eq!(config.rest.timeout_secs, 30);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileConfig::from_path(&dir.path().join("nope.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dronepath.toml");
        std::fs::write(&path, "verbose = true\n").unwrap();

        let config = FileConfig::from_path(&path).unwrap();
        assert!(config.verbose);
    }
}
