use serde::{Deserialize, Serialize};

/// Failures of the robust homography fit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RansacError {
    #[error("point count mismatch (src={src}, dst={dst})")]
    LengthMismatch { src: usize, dst: usize },
    #[error("too few correspondences: need {needed}, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("no non-degenerate minimal subset within {iterations} iterations")]
    DegenerateSamples { iterations: usize },
    #[error("insufficient inliers: need {needed}, found {found}")]
    InsufficientInliers { needed: usize, found: usize },
}

/// Coarse classification of why a sample was excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Not enough usable input: empty descriptors or too few matches.
    InputDegenerate,
    /// No valid transform could be fitted.
    FitFailed,
    /// A transform was fitted but projects to an implausible shape.
    ImplausibleGeometry,
}

/// Why a single sample produced no detection. Never fatal for the run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SampleRejection {
    #[error("empty descriptors")]
    EmptyDescriptors,
    #[error("descriptor width mismatch (sample={sample}, target={target})")]
    DescriptorWidthMismatch { sample: usize, target: usize },
    #[error("match references missing keypoint (query={query_idx}, train={train_idx})")]
    MatchIndexOutOfRange { query_idx: usize, train_idx: usize },
    #[error("not enough matches for homography ({found} < {needed})")]
    TooFewMatches { found: usize, needed: usize },
    #[error("homography failed: {0}")]
    FitFailed(#[from] RansacError),
    #[error("corner projected to infinity")]
    NonFiniteProjection,
    #[error("area too small ({area:.1} < {min:.1})")]
    AreaTooSmall { area: f64, min: f64 },
    #[error("projected quadrilateral is not convex")]
    NonConvex,
}

impl SampleRejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::EmptyDescriptors
            | Self::DescriptorWidthMismatch { .. }
            | Self::MatchIndexOutOfRange { .. }
            | Self::TooFewMatches { .. } => RejectionKind::InputDegenerate,
            Self::FitFailed(RansacError::TooFewPoints { .. }) => RejectionKind::InputDegenerate,
            Self::FitFailed(_) => RejectionKind::FitFailed,
            Self::NonFiniteProjection | Self::AreaTooSmall { .. } | Self::NonConvex => {
                RejectionKind::ImplausibleGeometry
            }
        }
    }
}

/// Pipeline-level failures; the only errors that abort a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error("no samples supplied")]
    NoSamples,
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_map_to_taxonomy() {
        assert_eq!(
            SampleRejection::TooFewMatches { found: 3, needed: 4 }.kind(),
            RejectionKind::InputDegenerate
        );
        assert_eq!(
            SampleRejection::from(RansacError::InsufficientInliers {
                needed: 4,
                found: 2
            })
            .kind(),
            RejectionKind::FitFailed
        );
        assert_eq!(
            SampleRejection::AreaTooSmall {
                area: 10.0,
                min: 1000.0
            }
            .kind(),
            RejectionKind::ImplausibleGeometry
        );
    }

    #[test]
    fn messages_follow_console_wording() {
        let msg = SampleRejection::TooFewMatches { found: 2, needed: 4 }.to_string();
        assert!(msg.starts_with("not enough matches for homography"));
        assert_eq!(
            SampleRejection::AreaTooSmall {
                area: 12.0,
                min: 1000.0
            }
            .to_string(),
            "area too small (12.0 < 1000.0)"
        );
    }
}
