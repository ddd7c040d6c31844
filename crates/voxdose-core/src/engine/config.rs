use crate::core::models::beamlet::DEFAULT_MAGNIFICATION;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BEAMLET_SPEC_FILE: &str = "tracked_beamlets.txt";
pub const DEFAULT_SCORERS: [&str; 2] = ["dose3d", "photonFluence"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Parameters of one scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub phantom_path: PathBuf,
    pub beamlet_spec_path: PathBuf,
    pub output_dir: PathBuf,
    pub scorers: Vec<String>,
    pub streams: usize,
    pub histories_per_stream: u64,
    pub magnification: f64,
    pub density_snapshot: bool,
}

impl SimulationConfig {
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Loads a run configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: FileSimulationConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        let mut builder = Self::builder()
            .phantom_path(file.phantom_path)
            .histories_per_stream(file.histories_per_stream);
        if let Some(path) = file.beamlet_spec_path {
            builder = builder.beamlet_spec_path(path);
        }
        if let Some(dir) = file.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(scorers) = file.scorers {
            builder = builder.scorers(scorers);
        }
        if let Some(streams) = file.streams {
            builder = builder.streams(streams);
        }
        if let Some(magnification) = file.magnification {
            builder = builder.magnification(magnification);
        }
        if let Some(snapshot) = file.density_snapshot {
            builder = builder.density_snapshot(snapshot);
        }
        builder.build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSimulationConfig {
    #[serde(rename = "phantom-path")]
    phantom_path: PathBuf,
    #[serde(rename = "histories-per-stream")]
    histories_per_stream: u64,
    #[serde(rename = "beamlet-spec-path")]
    beamlet_spec_path: Option<PathBuf>,
    #[serde(rename = "output-dir")]
    output_dir: Option<PathBuf>,
    scorers: Option<Vec<String>>,
    streams: Option<usize>,
    magnification: Option<f64>,
    #[serde(rename = "density-snapshot")]
    density_snapshot: Option<bool>,
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    phantom_path: Option<PathBuf>,
    beamlet_spec_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    scorers: Option<Vec<String>>,
    streams: Option<usize>,
    histories_per_stream: Option<u64>,
    magnification: Option<f64>,
    density_snapshot: Option<bool>,
}

impl SimulationConfigBuilder {
    pub fn phantom_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.phantom_path = Some(path.into());
        self
    }
    pub fn beamlet_spec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.beamlet_spec_path = Some(path.into());
        self
    }
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
    pub fn scorers(mut self, scorers: Vec<String>) -> Self {
        self.scorers = Some(scorers);
        self
    }
    pub fn streams(mut self, streams: usize) -> Self {
        self.streams = Some(streams);
        self
    }
    pub fn histories_per_stream(mut self, histories: u64) -> Self {
        self.histories_per_stream = Some(histories);
        self
    }
    pub fn magnification(mut self, magnification: f64) -> Self {
        self.magnification = Some(magnification);
        self
    }
    pub fn density_snapshot(mut self, enabled: bool) -> Self {
        self.density_snapshot = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        Ok(SimulationConfig {
            phantom_path: self
                .phantom_path
                .ok_or(ConfigError::MissingParameter("phantom_path"))?,
            beamlet_spec_path: self
                .beamlet_spec_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BEAMLET_SPEC_FILE)),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            scorers: self
                .scorers
                .unwrap_or_else(|| DEFAULT_SCORERS.map(String::from).to_vec()),
            streams: self.streams.unwrap_or(1),
            histories_per_stream: self
                .histories_per_stream
                .ok_or(ConfigError::MissingParameter("histories_per_stream"))?,
            magnification: self.magnification.unwrap_or(DEFAULT_MAGNIFICATION),
            density_snapshot: self.density_snapshot.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = SimulationConfig::builder()
            .phantom_path("phantom.geo")
            .histories_per_stream(1000)
            .build()
            .unwrap();

        assert_eq!(config.beamlet_spec_path, PathBuf::from("tracked_beamlets.txt"));
        assert_eq!(config.scorers, vec!["dose3d", "photonFluence"]);
        assert_eq!(config.streams, 1);
        assert_eq!(config.magnification, DEFAULT_MAGNIFICATION);
        assert!(config.density_snapshot);
    }

    #[test]
    fn builder_rejects_missing_phantom_path() {
        let result = SimulationConfig::builder().histories_per_stream(1).build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingParameter("phantom_path"))
        ));
    }

    #[test]
    fn toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
            phantom-path = "water_box.geo"
            histories-per-stream = 50000
            streams = 8
            scorers = ["dose3d"]
            output-dir = "results"
            magnification = 12.5
            density-snapshot = false
            "#,
        )
        .unwrap();

        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.phantom_path, PathBuf::from("water_box.geo"));
        assert_eq!(config.histories_per_stream, 50000);
        assert_eq!(config.streams, 8);
        assert_eq!(config.scorers, vec!["dose3d"]);
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.magnification, 12.5);
        assert!(!config.density_snapshot);
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "phantom-path = \"p.geo\"\nhistories-per-stream = 1\nbogus = 3\n",
        )
        .unwrap();

        assert!(matches!(
            SimulationConfig::from_file(&path),
            Err(ConfigError::Toml { .. })
        ));
    }
}
