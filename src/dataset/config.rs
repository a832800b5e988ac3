use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default file suffix used when scanning raw and mask directories.
pub const DEFAULT_EXTENSION: &str = ".tiff";
/// Default manifest destination, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "training_database.csv";

/// Errors that may occur while loading or validating a builder config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config lists no directory pairs")]
    NoSources,
    #[error("Sample size must be greater than zero")]
    ZeroSampleSize,
    #[error("File extension filter must not be empty")]
    EmptyExtension,
}

/// A raw image directory and the mask directory whose files correspond to it
/// by sorted position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPair {
    /// Optional experiment root that relative `raw_dir`/`mask_dir` join onto.
    /// Overrides the config-wide `base_dir`.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    pub raw_dir: PathBuf,
    pub mask_dir: PathBuf,
}

impl DirectoryPair {
    pub fn new(raw_dir: impl Into<PathBuf>, mask_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: None,
            raw_dir: raw_dir.into(),
            mask_dir: mask_dir.into(),
        }
    }

    /// Join the directories onto this pair's base, falling back to `default_base`.
    /// Absolute directories are returned unchanged.
    pub fn resolved(&self, default_base: Option<&Path>) -> Self {
        let base = self.base_dir.as_deref().or(default_base);
        let join = |dir: &Path| match base {
            Some(base) => base.join(dir),
            None => dir.to_path_buf(),
        };
        Self {
            base_dir: None,
            raw_dir: join(&self.raw_dir),
            mask_dir: join(&self.mask_dir),
        }
    }
}

/// Inputs of one dataset build, usually loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Root that relative source directories are joined onto. When loaded
    /// from a file, a relative or missing root means the file's directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    pub sources: Vec<DirectoryPair>,
    /// Number of pairs to draw into the manifest.
    pub sample_size: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Manifest destination. Relative paths stay relative to the working
    /// directory, like the `--out` flag.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Seed for a reproducible draw; a fresh random draw when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BuilderConfig {
    pub fn new(sources: Vec<DirectoryPair>, sample_size: usize) -> Self {
        Self {
            base_dir: None,
            sources,
            sample_size,
            extension: default_extension(),
            output: default_output(),
            seed: None,
        }
    }

    /// Load and validate a config file. Relative source directories resolve
    /// against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(config_dir) = path.parent() {
            config.anchor_to(config_dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize);
        }
        if self.extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        Ok(())
    }

    /// Anchor relative base directories under `dir`; a missing config-wide base
    /// becomes `dir`. Absolute bases are kept, since `Path::join` replaces.
    fn anchor_to(&mut self, dir: &Path) {
        self.base_dir = Some(match self.base_dir.take() {
            Some(base) => dir.join(base),
            None => dir.to_path_buf(),
        });
        for pair in &mut self.sources {
            if let Some(base) = pair.base_dir.take() {
                pair.base_dir = Some(dir.join(base));
            }
        }
    }

    /// Source pairs with base directories applied, in configured order.
    pub fn resolved_sources(&self) -> Vec<DirectoryPair> {
        self.sources
            .iter()
            .map(|pair| pair.resolved(self.base_dir.as_deref()))
            .collect()
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_applies_defaults_and_base_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("builder.toml");
        std::fs::write(
            &path,
            r#"
sample_size = 10
base_dir = "/data/run1"

[[sources]]
raw_dir = "analysis/raw"
mask_dir = "analysis/mask"

[[sources]]
base_dir = "/data/run2"
raw_dir = "analysis/raw"
mask_dir = "/elsewhere/mask"
"#,
        )
        .unwrap();

        let config = BuilderConfig::load(&path).unwrap();
        assert_eq!(config.extension, DEFAULT_EXTENSION);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.seed, None);

        let sources = config.resolved_sources();
        assert_eq!(sources[0].raw_dir, PathBuf::from("/data/run1/analysis/raw"));
        assert_eq!(sources[0].mask_dir, PathBuf::from("/data/run1/analysis/mask"));
        assert_eq!(sources[1].raw_dir, PathBuf::from("/data/run2/analysis/raw"));
        assert_eq!(sources[1].mask_dir, PathBuf::from("/elsewhere/mask"));
    }

    #[test]
    fn relative_dirs_resolve_against_the_config_file() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("experiments");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("builder.toml");
        std::fs::write(
            &path,
            r#"
sample_size = 1

[[sources]]
raw_dir = "plate/raw"
mask_dir = "plate/mask"

[[sources]]
base_dir = "run2"
raw_dir = "raw"
mask_dir = "mask"
"#,
        )
        .unwrap();

        let sources = BuilderConfig::load(&path).unwrap().resolved_sources();
        assert_eq!(sources[0].raw_dir, config_dir.join("plate/raw"));
        assert_eq!(sources[0].mask_dir, config_dir.join("plate/mask"));
        assert_eq!(sources[1].raw_dir, config_dir.join("run2").join("raw"));

        std::fs::write(
            &path,
            r#"
sample_size = 1
base_dir = "data"

[[sources]]
raw_dir = "r"
mask_dir = "m"
"#,
        )
        .unwrap();
        let sources = BuilderConfig::load(&path).unwrap().resolved_sources();
        assert_eq!(sources[0].raw_dir, config_dir.join("data").join("r"));
    }

    #[test]
    fn validate_rejects_empty_inputs() {
        let config = BuilderConfig::new(Vec::new(), 5);
        assert!(matches!(config.validate(), Err(ConfigError::NoSources)));

        let config = BuilderConfig::new(vec![DirectoryPair::new("r", "m")], 0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSampleSize)));

        let mut config = BuilderConfig::new(vec![DirectoryPair::new("r", "m")], 1);
        config.extension.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyExtension)));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "sources = 3").unwrap();
        let err = BuilderConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
