//! Prelude module for convenient imports.
//!
//! ```ignore
//! use bdf::prelude::*;
//! ```

// Model types
pub use bdf_core::{
    AtmPhaseCorrection, AttachmentKind, AutoDataBinaryPart, AxisName, Baseband, BasebandName,
    BinaryPart, ByteOrder, CorrelationMode, CorrelatorType, CrossData, CrossDataType, DataStruct,
    Literal, ModelError, NetSideband, ProcessorType, ProjectPath, ProjectPathError,
    SdmDataObject, SdmDataSubset, SpectralResolutionType, SpectralWindow, SpwCoord,
    StokesParameter, ZeroLagsBinaryPart,
};

// Parser
pub use bdf_parser::{
    ParserError, parse_corr_subset_header, parse_header, parse_tp_subset_header,
};

// Writer
pub use bdf_writer::{
    SdmDataObjectWriter, SubscanHeader, SubsetData, TpData, WriterBuilder, WriterError,
    WriterState, WvrData,
};
