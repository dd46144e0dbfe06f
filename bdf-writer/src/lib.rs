//! # BDF Writer
//!
//! MIME multipart writer for ALMA Binary Data Format (BDF) documents.
//!
//! This crate provides:
//! - [`SdmDataObjectWriter`], a call-sequence state machine that assembles the
//!   model of a document and streams it to any [`std::io::Write`] sink
//! - [`WriterBuilder`] to configure a writer and select its sink
//! - XML rendering of global and subset headers ([`xml`])
//! - MIME framing with a running byte counter ([`mime`])
//!
//! # Example
//!
//! ```ignore
//! use bdf_writer::{SubscanHeader, SubsetData, WriterBuilder};
//!
//! let mut writer = WriterBuilder::new("uid://X1/X2/X3", "correlator dump").to_memory();
//! writer.corr_data_header(&header, mode, resolution, data_struct)?;
//! writer.add_integration(1, time, interval, &SubsetData { flags: &flags, ..Default::default() })?;
//! writer.done()?;
//! let document = writer.into_bytes();
//! ```

pub mod builder;
pub mod data;
pub mod error;
pub mod mime;
pub mod state;
pub mod writer;
pub mod xml;

pub use builder::{MemorySink, WriterBuilder};
pub use data::{SubscanHeader, SubsetData, TpData, WvrData};
pub use error::{Result, WriterError};
pub use state::{Operation, WriterState};
pub use writer::SdmDataObjectWriter;
pub use xml::{header_to_xml, subset_to_xml};
