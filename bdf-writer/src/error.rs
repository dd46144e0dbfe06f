//! Error types for BDF writing.

use crate::state::WriterState;
use bdf_core::{AttachmentKind, CorrelationMode, ModelError, SpectralResolutionType};
use thiserror::Error;

/// Error type for writer operations.
///
/// A failed call leaves the writer in the state it had before the call.
/// Bytes emitted by earlier calls stay in the sink.
#[derive(Debug, Error)]
pub enum WriterError {
    /// The call is not legal in the current state.
    #[error("illegal call of '{operation}' in state '{state}'")]
    IllegalSequence {
        /// Operation attempted.
        operation: &'static str,
        /// Current writer state.
        state: WriterState,
    },

    /// The number of supplied values differs from the declared size.
    #[error("'{attachment}': {supplied} values supplied, {declared} declared in the header")]
    SizeMismatch {
        /// Attachment concerned.
        attachment: AttachmentKind,
        /// Declared number of values.
        declared: usize,
        /// Supplied number of values.
        supplied: usize,
    },

    /// An attachment holds more values than a header can declare.
    #[error("'{attachment}' has {len} values, more than a header can declare")]
    AttachmentTooLarge {
        /// Attachment concerned.
        attachment: AttachmentKind,
        /// Number of values.
        len: u64,
    },

    /// An attachment the correlation mode requires is not declared.
    #[error("'{attachment}' must be declared with correlation mode {correlation_mode}")]
    MissingAttachment {
        /// Attachment concerned.
        attachment: AttachmentKind,
        /// Correlation mode of the header.
        correlation_mode: CorrelationMode,
    },

    /// A value written into a MIME header line contains a control character.
    #[error("document {field} {value:?} cannot be written in a MIME header")]
    InvalidHeaderValue {
        /// Which value (`title` or `uid`).
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// zeroLags declared where none are allowed.
    #[error("zeroLags are not expected here: {reason}")]
    IllegalZeroLags {
        /// Why zero lags are rejected.
        reason: String,
    },

    /// The operation does not fit the spectral resolution of the header.
    #[error("'{operation}' is not available with spectral resolution {}", display_resolution(.resolution))]
    WrongResolution {
        /// Operation attempted.
        operation: &'static str,
        /// Declared spectral resolution.
        resolution: Option<SpectralResolutionType>,
    },

    /// The model rejected a value.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// XML rendering failed.
    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_resolution(resolution: &Option<SpectralResolutionType>) -> String {
    resolution.map_or_else(|| "(none)".to_string(), |r| r.to_string())
}

impl WriterError {
    /// Creates an illegal sequence error.
    #[must_use]
    pub fn illegal_sequence(operation: &'static str, state: WriterState) -> Self {
        Self::IllegalSequence { operation, state }
    }
}

/// Result type alias for writer operations.
pub type Result<T> = std::result::Result<T, WriterError>;
