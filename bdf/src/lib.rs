//! # BDF
//!
//! ALMA Binary Data Format (BDF) engine for Rust.
//!
//! A BDF document is a MIME multipart stream holding one XML global header
//! followed by data subsets, each made of an XML subset header and raw binary
//! attachments (flags, actual times and durations, cross and auto correlation
//! data, zero lags).
//!
//! ## Features
//!
//! - **Model** - Global header, spectral window image graph, data subsets
//! - **Writer** - Call-sequence checked MIME writer for correlator, total
//!   power and water vapour radiometer documents
//! - **Parser** - Validating parser for global and subset XML headers
//!
//! ## Quick Start
//!
//! ```ignore
//! use bdf::prelude::*;
//!
//! let mut writer = WriterBuilder::new("uid://X1/X2/X3", "correlator dump").to_memory();
//! writer.corr_data_header(&header, CorrelationMode::CrossOnly,
//!     SpectralResolutionType::FullResolution, data_struct)?;
//! writer.add_integration(1, time, interval, &data)?;
//! writer.done()?;
//!
//! let object = parse_header(&header_xml)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Model types, literal tables, project paths
//! - [`parser`] - XML header parsing
//! - [`writer`] - MIME document writing

pub mod prelude;

/// Model of BDF documents.
pub mod core {
    pub use bdf_core::*;
}

/// XML header parsing.
pub mod parser {
    pub use bdf_parser::*;
}

/// MIME document writing.
pub mod writer {
    pub use bdf_writer::*;
}

// Re-export commonly used items at the crate root
pub use bdf_core::{DataStruct, ModelError, SdmDataObject, SdmDataSubset};
pub use bdf_parser::{ParserError, parse_header};
pub use bdf_writer::{SdmDataObjectWriter, WriterBuilder, WriterError};
