/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains the resolved
 * configuration for a run: plane size, population, flocking radius and rate,
 * quadtree limits and tick interval. Values come from a JSON file (keys match
 * the historical config.json layout) with defaults for anything missing.
 *
 * Nothing is allowed to run on parameters that fail `validate`.
 */

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deepest quadtree the configuration may ask for. f32 quadrants stop
/// shrinking well before this on any sensible plane.
pub const MAX_QUADTREE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub width: f32,
    pub height: f32,
    pub boids_count: usize,
    /// Neighbor interaction radius.
    pub view_radius: f32,
    /// Scale applied to the alignment, cohesion and separation terms.
    pub adj_rate: f32,
    /// Outline thickness for the viewer; 0 draws filled triangles.
    pub poly_thickness: f32,
    #[serde(rename = "quadtree_max_obj")]
    pub quadtree_max_objects: usize,
    #[serde(rename = "quadtree_max_lvl")]
    pub quadtree_max_depth: usize,
    #[serde(rename = "update_rate_ms", alias = "tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// `None` or `Some(0)` means "pick one at startup".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            boids_count: 500,
            view_radius: 20.0,
            adj_rate: 0.015,
            poly_thickness: 0.0,
            quadtree_max_objects: 8,
            quadtree_max_depth: 8,
            tick_interval_ms: 16,
            seed: None,
        }
    }
}

impl SimulationParams {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: SimulationParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Reject geometry or counts the simulation can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_float("width", self.width)?;
        positive_float("height", self.height)?;
        positive_float("view_radius", self.view_radius)?;
        if !self.adj_rate.is_finite() {
            return Err(ConfigError::NonFinite { field: "adj_rate" });
        }
        if !self.poly_thickness.is_finite() {
            return Err(ConfigError::NonFinite { field: "poly_thickness" });
        }
        positive_count("boids_count", self.boids_count as u64)?;
        positive_count("quadtree_max_obj", self.quadtree_max_objects as u64)?;
        positive_count("quadtree_max_lvl", self.quadtree_max_depth as u64)?;
        if self.quadtree_max_depth > MAX_QUADTREE_DEPTH {
            return Err(ConfigError::TooLarge {
                field: "quadtree_max_lvl",
                value: self.quadtree_max_depth as u64,
                max: MAX_QUADTREE_DEPTH as u64,
            });
        }
        positive_count("update_rate_ms", self.tick_interval_ms)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The configured seed, or a fresh random one when unset or zero.
    pub fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) if seed != 0 => seed,
            _ => loop {
                let seed: u64 = rand::random();
                if seed != 0 {
                    break seed;
                }
            },
        }
    }
}

fn positive_float(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive {
            field,
            value: f64::from(value),
        });
    }
    Ok(())
}

fn positive_count(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositive { field, value: 0.0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        SimulationParams::default().validate().expect("defaults validate");
    }

    #[test]
    fn parses_historical_keys() {
        let json = r#"{
            "width": 1024,
            "height": 768,
            "boids_count": 500,
            "view_radius": 40.0,
            "adj_rate": 0.015,
            "poly_thickness": 2.0,
            "quadtree_max_obj": 10,
            "quadtree_max_lvl": 8,
            "update_rate_ms": 16,
            "seed": 42
        }"#;
        let params = SimulationParams::from_json_str(json).expect("parse");
        assert_eq!(params.width, 1024.0);
        assert_eq!(params.height, 768.0);
        assert_eq!(params.boids_count, 500);
        assert_eq!(params.view_radius, 40.0);
        assert_eq!(params.adj_rate, 0.015);
        assert_eq!(params.poly_thickness, 2.0);
        assert_eq!(params.quadtree_max_objects, 10);
        assert_eq!(params.quadtree_max_depth, 8);
        assert_eq!(params.tick_interval(), Duration::from_millis(16));
        assert_eq!(params.seed, Some(42));
        assert_eq!(params.resolve_seed(), 42);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let params = SimulationParams::from_json_str(r#"{"boids_count": 12}"#).expect("parse");
        assert_eq!(params.boids_count, 12);
        assert_eq!(params.width, SimulationParams::default().width);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn accepts_tick_interval_alias() {
        let params = SimulationParams::from_json_str(r#"{"tick_interval_ms": 5}"#).expect("parse");
        assert_eq!(params.tick_interval_ms, 5);
    }

    #[test]
    fn rejects_non_positive_values() {
        let cases: [(&str, fn(&mut SimulationParams)); 7] = [
            ("width", |p| p.width = 0.0),
            ("height", |p| p.height = -5.0),
            ("view_radius", |p| p.view_radius = 0.0),
            ("boids_count", |p| p.boids_count = 0),
            ("quadtree_max_obj", |p| p.quadtree_max_objects = 0),
            ("quadtree_max_lvl", |p| p.quadtree_max_depth = 0),
            ("update_rate_ms", |p| p.tick_interval_ms = 0),
        ];
        for (name, mutate) in cases {
            let mut params = SimulationParams::default();
            mutate(&mut params);
            match params.validate() {
                Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, name),
                other => panic!("{name}: expected NonPositive, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut params = SimulationParams { width: f32::INFINITY, ..Default::default() };
        assert!(matches!(params.validate(), Err(ConfigError::NonFinite { field: "width" })));
        params.width = 800.0;
        params.adj_rate = f32::NAN;
        assert!(matches!(params.validate(), Err(ConfigError::NonFinite { field: "adj_rate" })));
    }

    #[test]
    fn rejects_excessive_quadtree_depth() {
        let mut params = SimulationParams { quadtree_max_depth: 1_000_000, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::TooLarge { field: "quadtree_max_lvl", max: 32, .. })
        ));
        params.quadtree_max_depth = MAX_QUADTREE_DEPTH;
        params.validate().expect("deepest allowed tree");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            SimulationParams::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_seed_means_random() {
        let params = SimulationParams { seed: Some(0), ..Default::default() };
        assert_ne!(params.resolve_seed(), 0);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"width": 320, "height": 240, "seed": 9}}"#).expect("write");
        let params = SimulationParams::from_json_file(file.path()).expect("load");
        assert_eq!((params.width, params.height), (320.0, 240.0));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = SimulationParams::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
