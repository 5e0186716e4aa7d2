//! Error types for the convert-and-archive handler.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid handler configuration, surfaced at cold start.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("source and target extensions are both {0:?}")]
    SameExtension(String),

    #[error("incoming and archive prefixes are both {0:?}")]
    SamePrefix(String),

    #[error("archive prefix {archive:?} lies inside incoming prefix {incoming:?}")]
    ArchiveInsideIncoming { incoming: String, archive: String },
}

/// Failures while converting and archiving one object.
///
/// All of these propagate to the Lambda runtime, which marks the invocation
/// failed and redelivers according to its own retry policy.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ArchiveError {
    #[error("{operation} failed for {key}")]
    Storage {
        operation: &'static str,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode csv: {0}")]
    Decode(#[from] ArrowError),

    #[error("failed to encode parquet: {0}")]
    Encode(#[from] ParquetError),

    #[error("source object has no header row")]
    EmptyInput,

    #[error("no bucket configured and none found in the S3 event")]
    MissingBucket,
}

impl ArchiveError {
    pub(crate) fn storage(
        operation: &'static str,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Storage {
            operation,
            key: key.into(),
            source: source.into(),
        }
    }
}
