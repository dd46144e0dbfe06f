//! # BDF Parser
//!
//! XML header parser for ALMA Binary Data Format (BDF) documents.
//!
//! This crate provides:
//! - [`parse_header`] for the global header (`sdmDataHeader`)
//! - [`parse_corr_subset_header`] for correlator data subset headers
//! - [`parse_tp_subset_header`] for total power and WVR data subset headers
//!
//! Each entry point has a `_file` variant. The parsers never touch binary
//! attachments: subsets come back with attachment locations only, ready for
//! an external resolver to bind the payloads.

pub mod error;
pub mod header;
mod node;
pub mod subset;

pub use error::{ParserError, Result};
pub use header::{parse_header, parse_header_file};
pub use subset::{
    parse_corr_subset_header, parse_corr_subset_header_file, parse_tp_subset_header,
    parse_tp_subset_header_file,
};
