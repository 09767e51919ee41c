//! Crate-wide error type.

use thiserror::Error;

/// Result type used at every public boundary of the scheduler.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors surfaced by configuration loading, admission, allocation and the
/// request channel.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Admission: the request named a type absent from the emergency catalogue.
    #[error("unknown emergency type: {0}")]
    UnknownType(String),

    /// Admission: scene coordinates fall outside the configured grid.
    #[error("coordinates ({x}, {y}) are out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    /// Admission: the scheduler has already started shutting down.
    #[error("scheduler is shutting down")]
    ShuttingDown,

    /// Allocation could not satisfy every requirement for an event.
    #[error("allocation failed: not enough idle or preemptible responders")]
    AllocationFailed,

    /// A configuration file line could not be parsed.
    #[error("failed to parse {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    /// A catalogue ended up empty after parsing.
    #[error("{0} catalogue is empty")]
    EmptyCatalogue(&'static str),

    /// The request channel was closed by its peer.
    #[error("request channel closed")]
    ChannelClosed,

    /// An inbound message exceeded the fixed message size.
    #[error("message too large: {len} bytes")]
    MessageTooLarge { len: usize },

    /// Malformed request text on the wire.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::ConfigParse {
            file: "<io>".to_string(),
            reason: err.to_string(),
        }
    }
}
