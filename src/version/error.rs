use thiserror::Error;

use crate::version::model::{MAX_VERSION_SEGMENTS, MIN_VERSION_SEGMENTS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),

    #[error(
        "segment bounds {min}..={max} outside the allowed range \
         {MIN_VERSION_SEGMENTS}..={MAX_VERSION_SEGMENTS}"
    )]
    SegmentBoundsOutOfRange { min: usize, max: usize },
}
