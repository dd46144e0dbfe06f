//! Error types for model access.

use crate::binary_part::AttachmentKind;
use crate::enums::{CorrelationMode, CrossDataType, ProcessorType};
use thiserror::Error;

/// Error type for operations on the BDF model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The object holds no valid data (never populated, or `done` was called).
    #[error("no valid binary data in this SDMDataObject (while calling '{operation}')")]
    InvalidState {
        /// Operation attempted.
        operation: &'static str,
    },

    /// A baseband or spectral window index exceeds the actual count.
    #[error("'{index}' is invalid as a {coordinate} index, it should not exceed '{bound}'")]
    IndexOutOfRange {
        /// Which coordinate was out of range (`baseband` or `spectral window`).
        coordinate: &'static str,
        /// Offending index.
        index: usize,
        /// Largest legal index.
        bound: usize,
    },

    /// An index was given where the container is empty.
    #[error("'{index}' is invalid as a {coordinate} index, there is none")]
    EmptyCoordinate {
        /// Which coordinate was addressed.
        coordinate: &'static str,
        /// Offending index.
        index: usize,
    },

    /// An accessor was called under a correlation mode that does not define it.
    #[error("invalid call of '{operation}' with correlation mode '{mode}'")]
    WrongCorrelationMode {
        /// Operation attempted.
        operation: &'static str,
        /// Current correlation mode.
        mode: CorrelationMode,
    },

    /// An accessor was called on the wrong kind of data (total power vs correlator).
    #[error("invalid call of '{operation}' in this context: {context}")]
    InvalidCall {
        /// Operation attempted.
        operation: &'static str,
        /// Description of the current context.
        context: &'static str,
    },

    /// No correlator type is defined for this processor type.
    #[error("no correlator type defined with processor type '{processor_type}'")]
    NoCorrelatorType {
        /// Current processor type.
        processor_type: ProcessorType,
    },

    /// A spectral window token (`sw`, `id` or `image`) is malformed.
    #[error("'{token}' is an invalid string to identify a spectral window")]
    InvalidSpwToken {
        /// Offending token.
        token: String,
    },

    /// A data subset without a project path was appended.
    #[error("can't accept a data subset without a project path")]
    EmptyProjectPath,

    /// A data subset with the same project path was already appended.
    #[error("a data subset with project path '{project_path}' is already present")]
    DuplicateSubset {
        /// Duplicated project path.
        project_path: String,
    },

    /// No data subset has the requested project path.
    #[error("data subset with project path '{project_path}' not found")]
    SubsetNotFound {
        /// Requested project path.
        project_path: String,
    },

    /// The payload of an aborted subset was addressed.
    #[error("the data subset '{project_path}' is aborted and carries no payload")]
    AbortedSubset {
        /// Project path of the aborted subset.
        project_path: String,
    },

    /// Cross data of one numeric type was attached to a subset declaring another.
    #[error("cross data declared as '{declared}' but '{supplied}' values were attached")]
    CrossDataTypeMismatch {
        /// Declared type.
        declared: CrossDataType,
        /// Supplied type.
        supplied: CrossDataType,
    },

    /// An attachment is not defined in the current context.
    #[error("attachment '{attachment}' is not defined in this context")]
    UndefinedAttachment {
        /// Attachment addressed.
        attachment: AttachmentKind,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
