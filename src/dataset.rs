//! Training manifest builder.
//!
//! Scans raw/mask directory pairs, pairs files by sorted position, draws a
//! random subset and writes it as a `raw,mask` CSV manifest.

pub mod config;
pub mod pairing;
pub mod sampling;

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

use crate::manifest::ManifestError;

pub use config::{BuilderConfig, ConfigError, DirectoryPair};
pub use pairing::{FilePair, collect_all, list_images, match_pairs};
pub use sampling::sample;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "Found {raw} raw files in {raw_dir} but {mask} masks in {mask_dir}; refusing to pair them"
    )]
    CountMismatch {
        raw_dir: PathBuf,
        mask_dir: PathBuf,
        raw: usize,
        mask: usize,
    },
    #[error("Requested {requested} pairs but only {available} are available")]
    SampleTooLarge { requested: usize, available: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Counts reported after a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub sources: usize,
    pub pairs_found: usize,
    pub sampled: usize,
    pub output: PathBuf,
}

/// Write pairs as a `raw,mask` CSV with a header row.
pub fn write_manifest(pairs: &[FilePair], destination: &Path) -> Result<(), DatasetError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ManifestError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let write_err = |source| ManifestError::Write {
        path: destination.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(destination).map_err(write_err)?;
    if pairs.is_empty() {
        writer.write_record(["raw", "mask"]).map_err(write_err)?;
    }
    for pair in pairs {
        writer.serialize(pair).map_err(write_err)?;
    }
    writer.flush().map_err(|source| ManifestError::Flush {
        path: destination.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Run a full build, seeding the draw from `config.seed` when set.
pub fn build_dataset(config: &BuilderConfig) -> Result<BuildSummary, DatasetError> {
    match config.seed {
        Some(seed) => build_dataset_with_rng(config, &mut StdRng::seed_from_u64(seed)),
        None => build_dataset_with_rng(config, &mut rand::rng()),
    }
}

/// Run a full build with a caller-supplied random source.
pub fn build_dataset_with_rng<R: Rng + ?Sized>(
    config: &BuilderConfig,
    rng: &mut R,
) -> Result<BuildSummary, DatasetError> {
    config.validate()?;
    let sources = config.resolved_sources();
    let all_pairs = collect_all(&sources, &config.extension)?;
    info!(
        sources = sources.len(),
        pairs = all_pairs.len(),
        "Collected raw/mask pairs"
    );
    let subset = sample(&all_pairs, config.sample_size, rng)?;
    write_manifest(&subset, &config.output)?;
    info!(
        sampled = subset.len(),
        output = %config.output.display(),
        "Wrote training manifest"
    );
    Ok(BuildSummary {
        sources: sources.len(),
        pairs_found: all_pairs.len(),
        sampled: subset.len(),
        output: config.output.clone(),
    })
}
