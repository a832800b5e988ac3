//! Raw/mask file pairing by sorted position.
//!
//! Files are matched purely by their index after each directory listing is
//! sorted by name; no shared identifier is checked. Two directories with equal
//! counts but different naming schemes will pair silently, so keep raw and
//! mask filenames sortable in the same order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::DatasetError;
use super::config::DirectoryPair;

/// A raw image and its segmentation mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilePair {
    pub raw: PathBuf,
    pub mask: PathBuf,
}

/// List the immediate files of `dir` whose name ends with `extension`,
/// sorted by file name. Subdirectories are not visited.
pub fn list_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DatasetError> {
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DatasetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_string_lossy()
            .ends_with(extension);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Listed images");
    Ok(files)
}

/// Pair the sorted files of `raw_dir` and `mask_dir` positionally.
///
/// Unequal counts mean the directories are out of sync and fail the build.
pub fn match_pairs(
    raw_dir: &Path,
    mask_dir: &Path,
    extension: &str,
) -> Result<Vec<FilePair>, DatasetError> {
    let raw_files = list_images(raw_dir, extension)?;
    let mask_files = list_images(mask_dir, extension)?;
    if raw_files.len() != mask_files.len() {
        return Err(DatasetError::CountMismatch {
            raw_dir: raw_dir.to_path_buf(),
            mask_dir: mask_dir.to_path_buf(),
            raw: raw_files.len(),
            mask: mask_files.len(),
        });
    }
    Ok(raw_files
        .into_iter()
        .zip(mask_files)
        .map(|(raw, mask)| FilePair { raw, mask })
        .collect())
}

/// Concatenate the pairs of every source, in source order.
pub fn collect_all(
    sources: &[DirectoryPair],
    extension: &str,
) -> Result<Vec<FilePair>, DatasetError> {
    let mut all = Vec::new();
    for source in sources {
        let pairs = match_pairs(&source.raw_dir, &source.mask_dir, extension)?;
        info!(
            raw_dir = %source.raw_dir.display(),
            mask_dir = %source.mask_dir.display(),
            pairs = pairs.len(),
            "Matched directory pair"
        );
        all.extend(pairs);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, names: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    #[test]
    fn list_filters_by_suffix_and_skips_subdirectories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["b.tiff", "a.tiff", "notes.txt", "c.tif"]);
        fs::create_dir(dir.path().join("nested.tiff")).unwrap();
        touch(&dir.path().join("sub"), &["d.tiff"]);

        let files = list_images(dir.path(), ".tiff").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.tiff", "b.tiff"]);
    }

    #[test]
    fn pairs_follow_sorted_order_not_names() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw");
        let mask = dir.path().join("mask");
        touch(&raw, &["t2_raw.tiff", "t1_raw.tiff", "t3_raw.tiff"]);
        touch(&mask, &["seg_c.tiff", "seg_a.tiff", "seg_b.tiff"]);

        let pairs = match_pairs(&raw, &mask, ".tiff").unwrap();
        let pairs_again = match_pairs(&raw, &mask, ".tiff").unwrap();
        assert_eq!(pairs, pairs_again);
        assert_eq!(pairs[0].raw, raw.join("t1_raw.tiff"));
        assert_eq!(pairs[0].mask, mask.join("seg_a.tiff"));
        assert_eq!(pairs[2].raw, raw.join("t3_raw.tiff"));
        assert_eq!(pairs[2].mask, mask.join("seg_c.tiff"));
    }

    #[test]
    fn unequal_counts_fail() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw");
        let mask = dir.path().join("mask");
        touch(&raw, &["1.tiff", "2.tiff"]);
        touch(&mask, &["1.tiff"]);

        let err = match_pairs(&raw, &mask, ".tiff").unwrap_err();
        assert!(matches!(err, DatasetError::CountMismatch { raw: 2, mask: 1, .. }));
    }

    #[test]
    fn empty_directories_pair_to_nothing() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw");
        let mask = dir.path().join("mask");
        touch(&raw, &[]);
        touch(&mask, &["ignored.png"]);
        assert!(match_pairs(&raw, &mask, ".tiff").unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().unwrap();
        let err = list_images(&dir.path().join("absent"), ".tiff").unwrap_err();
        assert!(matches!(err, DatasetError::ReadDir { .. }));
    }

    #[test]
    fn collect_all_preserves_source_order() {
        let dir = tempdir().unwrap();
        let first = DirectoryPair::new(dir.path().join("a/raw"), dir.path().join("a/mask"));
        let second = DirectoryPair::new(dir.path().join("b/raw"), dir.path().join("b/mask"));
        touch(&first.raw_dir, &["2.tiff", "1.tiff"]);
        touch(&first.mask_dir, &["2.tiff", "1.tiff"]);
        touch(&second.raw_dir, &["0.tiff"]);
        touch(&second.mask_dir, &["0.tiff"]);

        let pairs = collect_all(&[second.clone(), first.clone()], ".tiff").unwrap();
        let raws: Vec<_> = pairs.iter().map(|p| p.raw.clone()).collect();
        assert_eq!(
            raws,
            vec![
                second.raw_dir.join("0.tiff"),
                first.raw_dir.join("1.tiff"),
                first.raw_dir.join("2.tiff"),
            ]
        );
    }

    #[test]
    fn collect_all_stops_on_first_mismatch() {
        let dir = tempdir().unwrap();
        let good = DirectoryPair::new(dir.path().join("g/raw"), dir.path().join("g/mask"));
        let bad = DirectoryPair::new(dir.path().join("b/raw"), dir.path().join("b/mask"));
        touch(&good.raw_dir, &["1.tiff"]);
        touch(&good.mask_dir, &["1.tiff"]);
        touch(&bad.raw_dir, &["1.tiff"]);
        touch(&bad.mask_dir, &[]);

        let err = collect_all(&[good, bad], ".tiff").unwrap_err();
        assert!(matches!(err, DatasetError::CountMismatch { raw: 1, mask: 0, .. }));
    }
}
