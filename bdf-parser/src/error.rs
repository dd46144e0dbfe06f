//! Error types for BDF header parsing.

use bdf_core::ModelError;
use thiserror::Error;

/// Error type for parsing operations.
#[derive(Debug, Error)]
pub enum ParserError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed character or entity reference.
    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The model rejected a parsed value.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The document has no usable structure.
    #[error("invalid document structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// A required element is missing or out of order.
    #[error("expected element '{expected}' in '{context}', found {}", .found.as_deref().unwrap_or("nothing"))]
    MissingElement {
        /// Expected element name.
        expected: String,
        /// Element actually found at that position.
        found: Option<String>,
        /// Parent element.
        context: String,
    },

    /// An element that has no place at this position.
    #[error("unexpected element '{element}' in '{context}'")]
    UnexpectedElement {
        /// Element name.
        element: String,
        /// Parent element.
        context: String,
    },

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute that is not allowed in this context.
    #[error("attribute '{attribute}' is not allowed on element '{element}' ({reason})")]
    UnexpectedAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Why the attribute is rejected.
        reason: String,
    },

    /// A value that does not have the expected form.
    #[error("invalid value '{value}' in '{element}', expected {expected}")]
    InvalidValue {
        /// Element (or `element@attribute`) holding the value.
        element: String,
        /// Invalid value.
        value: String,
        /// Description of the expected form.
        expected: &'static str,
    },

    /// A project path that does not match the expected grammar.
    #[error("invalid project path '{raw}', expected {expected_arity} slash-terminated numbers")]
    BadProjectPath {
        /// Raw attribute value.
        raw: String,
        /// Expected number of components.
        expected_arity: usize,
    },

    /// A project path with a component too large for its field.
    #[error("invalid project path '{raw}', component '{component}' does not fit in 32 bits")]
    ProjectPathOverflow {
        /// Raw attribute value.
        raw: String,
        /// Offending component.
        component: String,
    },

    /// An unknown literal of an enumerated field.
    #[error("unknown literal '{value}' in element '{element}'")]
    UnknownLiteral {
        /// Offending literal.
        value: String,
        /// Enclosing element.
        element: String,
    },

    /// A zeroLags element where none is allowed.
    #[error("zeroLags are not expected here: {reason}")]
    IllegalZeroLags {
        /// Why zero lags are rejected.
        reason: String,
    },

    /// An image token that names no spectral window.
    #[error("spectral window image '{token}' refers to no declared spectral window")]
    DanglingImageReference {
        /// Unresolved token.
        token: String,
    },

    /// Two spectral windows with the same identity token.
    #[error("spectral window id '{token}' is declared more than once")]
    DuplicateSpwId {
        /// Duplicated token.
        token: String,
    },

    /// A subset header that does not belong to the given global header.
    #[error(
        "the project path of this data subset '{subset}' is not compatible with the project path announced in the global header '{owner}'"
    )]
    ProjectPathMismatch {
        /// Project path of the subset.
        subset: String,
        /// Project path of the global header.
        owner: String,
    },
}

impl ParserError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(
        element: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidValue {
            element: element.into(),
            value: value.into(),
            expected,
        }
    }

    /// Creates an unknown literal error.
    pub fn unknown_literal(value: impl Into<String>, element: impl Into<String>) -> Self {
        Self::UnknownLiteral {
            value: value.into(),
            element: element.into(),
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;
