//! JSON feature files, run configuration and reports.

use crate::{
    build_samples, FeatureExtractor, LocateError, LocateResult, LocatorParams, RejectionKind, SampleLocator,
};
use log::warn;
use sample_locator_core::{Descriptor, Detection, FeatureSet, Keypoint, Sample, SampleError};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum LocateIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("sample directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("no samples loaded from {0}")]
    NoSamples(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid features in {path}: {source}")]
    InvalidFeatures { path: PathBuf, source: SampleError },
}

/// Precomputed features of one image, as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFile {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
}

impl FeatureFile {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LocateIoError> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Validated feature set; errors on count or width mismatches.
    pub fn to_feature_set(&self) -> Result<FeatureSet, SampleError> {
        FeatureSet::new(self.keypoints.clone(), self.descriptors.clone())
    }
}

/// "Extracts" features by reading them from a [`FeatureFile`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureFileExtractor;

impl FeatureExtractor for FeatureFileExtractor {
    type Image = FeatureFile;

    fn dimensions(&self, image: &FeatureFile) -> (u32, u32) {
        (image.width, image.height)
    }

    fn extract(&self, image: &FeatureFile) -> FeatureSet {
        image.to_feature_set().unwrap_or_else(|err| {
            warn!("discarding features: {err}");
            FeatureSet::empty()
        })
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

fn sample_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load every `*.json` feature file under `dir` (recursively) as a sample.
///
/// Files are visited in sorted path order and samples are named after the
/// file stem. Files that cannot be read or decoded are skipped with a
/// warning. Decoded files go through [`FeatureFileExtractor`], so invalid
/// features become an empty set (skipped later by the locator) and a zero
/// extent drops the sample, exactly as [`build_samples`] does for any
/// extractor.
pub fn load_catalog(dir: impl AsRef<Path>) -> Result<Vec<Sample>, CatalogError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CatalogError::MissingDirectory(dir.to_path_buf()));
    }
    let mut paths = Vec::new();
    collect_json_files(dir, &mut paths)?;
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match FeatureFile::load_json(&path) {
            Ok(file) => files.push((sample_name(&path), file)),
            Err(err) => warn!("Failed to parse sample: {err}"),
        }
    }

    let samples = build_samples(
        &FeatureFileExtractor,
        files.iter().map(|(name, file)| (name.clone(), file)),
    );
    if samples.is_empty() {
        return Err(CatalogError::NoSamples(dir.to_path_buf()));
    }
    Ok(samples)
}

/// Load the target feature set; any failure is fatal.
pub fn load_target(path: impl AsRef<Path>) -> Result<FeatureSet, CatalogError> {
    let path = path.as_ref();
    FeatureFile::load_json(path)?
        .to_feature_set()
        .map_err(|source| CatalogError::InvalidFeatures {
            path: path.to_path_buf(),
            source,
        })
}

/// Configuration for one `locate` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateConfig {
    pub catalog_dir: String,
    pub target_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: LocatorParams,
}

impl LocateConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LocateIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LocateIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sample_locate_report.json"))
    }

    pub fn build_locator(&self) -> Result<SampleLocator, LocateError> {
        SampleLocator::new(self.params.clone())
    }
}

/// Per-sample entry of a [`LocateReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub name: String,
    pub candidate_matches: usize,
    pub good_matches: usize,
    #[serde(default)]
    pub inliers: Option<usize>,
    #[serde(default)]
    pub area: Option<f64>,
    pub detected: bool,
    #[serde(default)]
    pub rejection: Option<RejectionKind>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocateReport {
    pub catalog_dir: String,
    pub target_path: String,
    pub num_target_keypoints: usize,
    pub params: LocatorParams,
    pub detections: Vec<Detection>,
    pub samples: Vec<SampleReport>,
    pub any_found: bool,
}

impl LocateReport {
    pub fn new(config: &LocateConfig, target: &FeatureSet, result: &LocateResult) -> Self {
        let samples = result
            .outcomes
            .iter()
            .map(|o| SampleReport {
                name: o.name.clone(),
                candidate_matches: o.candidate_matches,
                good_matches: o.good_matches,
                inliers: o.inliers,
                area: o.area,
                detected: o.is_detected(),
                rejection: o.rejection.as_ref().map(|r| r.kind()),
                message: o.rejection.as_ref().map(|r| r.to_string()),
            })
            .collect();
        Self {
            catalog_dir: config.catalog_dir.clone(),
            target_path: config.target_path.clone(),
            num_target_keypoints: target.len(),
            params: config.params.clone(),
            detections: result.detections.clone(),
            samples,
            any_found: result.any_found,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LocateIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LocateIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
