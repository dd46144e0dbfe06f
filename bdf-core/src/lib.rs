//! # BDF Core
//!
//! In-memory model of ALMA Binary Data Format (BDF) documents.
//!
//! This crate provides:
//! - The entity graph of a BDF global header ([`SdmDataObject`], [`DataStruct`],
//!   [`Baseband`], [`SpectralWindow`] and the binary part descriptors)
//! - Data subsets ([`SdmDataSubset`]) with borrowed typed views on binary payloads
//! - Literal tables for every enumerated field, behind the [`Literal`] trait
//! - The `projectPath` addressing grammar ([`ProjectPath`])
//! - The model error type ([`ModelError`])

pub mod binary_part;
pub mod data_struct;
pub mod enums;
pub mod error;
pub mod literal;
pub mod object;
pub mod project_path;
pub mod spectral;
pub mod subset;

pub use binary_part::{AttachmentKind, AutoDataBinaryPart, BinaryPart, ZeroLagsBinaryPart};
pub use data_struct::{DataStruct, SpwCoord};
pub use enums::{
    AtmPhaseCorrection, AxisName, BasebandName, ByteOrder, CorrelationMode, CorrelatorType,
    CrossDataType, NetSideband, ProcessorType, SpectralResolutionType, StokesParameter,
};
pub use error::{ModelError, Result};
pub use literal::{Literal, from_literals, to_literals};
pub use object::{SCHEMA_VERSION, SdmDataObject, SdmDataObjectBuilder, SubsetContext};
pub use project_path::{ProjectPath, ProjectPathError};
pub use spectral::{Baseband, SpectralWindow, is_spw_token, is_sw_token, spw_token};
pub use subset::{Abort, CrossData, SdmDataSubset};
