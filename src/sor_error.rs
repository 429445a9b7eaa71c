//! SorError: Unified error type for slab-sor public APIs
//!
//! Every failure in this crate is fatal to the distributed run: a missed ghost
//! exchange would silently corrupt downstream values, so callers propagate
//! these errors to the driver and abort instead of retrying.

use std::error::Error as StdError;
use thiserror::Error;

/// Unified error type for slab-sor operations.
#[derive(Debug, Error)]
pub enum SorError {
    /// A plan was requested with zero partitions.
    #[error("partition count must be at least 1")]
    NoPartitions,
    /// More partitions than cells on the decomposed axis; some slab would be empty.
    #[error("cannot split {extent} decomposed-axis cells across {parts} partitions")]
    TooManyPartitions { parts: usize, extent: usize },
    /// One of the un-padded domain extents is zero.
    #[error("domain extent along axis {axis} must be positive")]
    EmptyAxis { axis: usize },
    /// Ordinal outside `[0, parts)`.
    #[error("partition ordinal {ordinal} out of range for {parts} partitions")]
    InvalidOrdinal { ordinal: usize, parts: usize },
    /// The transport's process group does not match the configured partition count.
    #[error("communicator has {found} ranks, plan expects {expected}")]
    WorldSizeMismatch { expected: usize, found: usize },
    /// Malformed or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// Global coordinate outside the padded domain.
    #[error("index {index} outside padded extent {extent} on axis {axis}")]
    OutOfDomain {
        axis: usize,
        index: usize,
        extent: usize,
    },
    /// Another partition hit a fatal error and tore the world down.
    #[error("run aborted by partition {rank}")]
    Aborted { rank: usize },
    /// A ghost plane did not have the expected number of values.
    #[error("plane length mismatch: expected {expected}, found {found}")]
    PlaneLengthMismatch { expected: usize, found: usize },
    /// Transport-level failure talking to `neighbor`.
    #[error("communication with rank {neighbor} failed: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A blocking receive waited longer than the transport allows.
    #[error("receive from rank {neighbor} (tag {tag}) timed out")]
    CommTimeout { neighbor: usize, tag: u16 },
    /// The scalar field buffer could not be allocated.
    #[error("failed to allocate scalar field of {len} elements")]
    Allocation { len: usize },
}

impl SorError {
    pub(crate) fn comm(neighbor: usize, msg: impl Into<String>) -> Self {
        SorError::CommError {
            neighbor,
            source: msg.into().into(),
        }
    }
}
