//! The global header of a BDF document.

use crate::data_struct::DataStruct;
use crate::enums::{
    ByteOrder, CorrelationMode, CorrelatorType, ProcessorType, SpectralResolutionType,
};
use crate::error::{ModelError, Result};
use crate::literal::to_literals;
use crate::project_path::ProjectPath;
use crate::subset::SdmDataSubset;
use std::collections::HashMap;
use std::fmt;

/// Current BDF schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// Facts of the owning header that decide what a data subset may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetContext {
    /// Execution block number.
    pub exec_block_num: u32,
    /// Scan number.
    pub scan_num: u32,
    /// Subscan number.
    pub subscan_num: u32,
    /// 0 for total power and WVR data, 1 for correlator data.
    pub dimensionality: u32,
    /// Correlation mode.
    pub correlation_mode: CorrelationMode,
    /// Spectral resolution, if declared.
    pub spectral_resolution_type: Option<SpectralResolutionType>,
    /// Processor type.
    pub processor_type: ProcessorType,
}

impl SubsetContext {
    /// Returns `true` for total power data.
    #[must_use]
    pub fn is_tp(&self) -> bool {
        self.spectral_resolution_type == Some(SpectralResolutionType::BasebandWide)
    }

    /// Project path of the owning header.
    #[must_use]
    pub const fn project_path(&self) -> ProjectPath {
        ProjectPath::subscan(self.exec_block_num, self.scan_num, self.subscan_num)
    }
}

/// One subscan's global header together with its data subsets.
///
/// Every accessor fails with [`ModelError::InvalidState`] unless the object
/// was populated and `done` has not been called.
#[derive(Debug, Clone)]
pub struct SdmDataObject<'a> {
    valid: bool,
    title: String,
    byte_order: ByteOrder,
    schema_version: u32,
    start_time: u64,
    data_oid: String,
    dimensionality: u32,
    num_time: u32,
    exec_block_uid: String,
    exec_block_num: u32,
    scan_num: u32,
    subscan_num: u32,
    num_antenna: u32,
    correlation_mode: CorrelationMode,
    spectral_resolution_type: Option<SpectralResolutionType>,
    processor_type: ProcessorType,
    data_struct: DataStruct,
    subsets: Vec<SdmDataSubset<'a>>,
    index: HashMap<String, usize>,
    aborted: bool,
    abort_time: u64,
    abort_reason: String,
}

impl Default for SdmDataObject<'_> {
    fn default() -> Self {
        Self {
            valid: false,
            title: String::new(),
            byte_order: ByteOrder::native(),
            schema_version: SCHEMA_VERSION,
            start_time: 0,
            data_oid: String::new(),
            dimensionality: 0,
            num_time: 0,
            exec_block_uid: String::new(),
            exec_block_num: 0,
            scan_num: 0,
            subscan_num: 0,
            num_antenna: 0,
            correlation_mode: CorrelationMode::CrossOnly,
            spectral_resolution_type: None,
            processor_type: ProcessorType::Correlator,
            data_struct: DataStruct::default(),
            subsets: Vec::new(),
            index: HashMap::new(),
            aborted: false,
            abort_time: 0,
            abort_reason: String::new(),
        }
    }
}

impl<'a> SdmDataObject<'a> {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> SdmDataObjectBuilder {
        SdmDataObjectBuilder::new()
    }

    fn check_valid(&self, operation: &'static str) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ModelError::InvalidState { operation })
        }
    }

    /// Returns `true` if the object holds valid data.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Document title.
    pub fn title(&self) -> Result<&str> {
        self.check_valid("title")?;
        Ok(&self.title)
    }

    /// Byte order of the binary attachments.
    pub fn byte_order(&self) -> Result<ByteOrder> {
        self.check_valid("byteOrder")?;
        Ok(self.byte_order)
    }

    /// Schema version.
    pub fn schema_version(&self) -> Result<u32> {
        self.check_valid("schemaVersion")?;
        Ok(self.schema_version)
    }

    /// Start time.
    pub fn start_time(&self) -> Result<u64> {
        self.check_valid("startTime")?;
        Ok(self.start_time)
    }

    /// Archive UID of the document.
    pub fn data_oid(&self) -> Result<&str> {
        self.check_valid("dataOID")?;
        Ok(&self.data_oid)
    }

    /// 0 for total power and WVR data, 1 for correlator data.
    pub fn dimensionality(&self) -> Result<u32> {
        self.check_valid("dimensionality")?;
        Ok(self.dimensionality)
    }

    /// Number of time samples.
    pub fn num_time(&self) -> Result<u32> {
        self.check_valid("numTime")?;
        Ok(self.num_time)
    }

    /// Archive UID of the execution block.
    pub fn exec_block_uid(&self) -> Result<&str> {
        self.check_valid("execBlockUID")?;
        Ok(&self.exec_block_uid)
    }

    /// Execution block number, first component of the project path.
    pub fn exec_block_num(&self) -> Result<u32> {
        self.check_valid("execBlockNum")?;
        Ok(self.exec_block_num)
    }

    /// Scan number.
    pub fn scan_num(&self) -> Result<u32> {
        self.check_valid("scanNum")?;
        Ok(self.scan_num)
    }

    /// Subscan number.
    pub fn subscan_num(&self) -> Result<u32> {
        self.check_valid("subscanNum")?;
        Ok(self.subscan_num)
    }

    /// Number of antennas.
    pub fn num_antenna(&self) -> Result<u32> {
        self.check_valid("numAntenna")?;
        Ok(self.num_antenna)
    }

    /// Correlation mode, which decides the cross/auto products present.
    pub fn correlation_mode(&self) -> Result<CorrelationMode> {
        self.check_valid("correlationMode")?;
        Ok(self.correlation_mode)
    }

    /// Spectral resolution, `None` when the header omits it.
    pub fn spectral_resolution_type(&self) -> Result<Option<SpectralResolutionType>> {
        self.check_valid("spectralResolutionType")?;
        Ok(self.spectral_resolution_type)
    }

    /// Processor that produced the data.
    pub fn processor_type(&self) -> Result<ProcessorType> {
        self.check_valid("processorType")?;
        Ok(self.processor_type)
    }

    /// Correlator architecture.
    ///
    /// # Errors
    /// Fails with [`ModelError::NoCorrelatorType`] unless the processor is a correlator.
    pub fn correlator_type(&self) -> Result<CorrelatorType> {
        self.check_valid("correlatorType")?;
        if self.processor_type != ProcessorType::Correlator {
            return Err(ModelError::NoCorrelatorType {
                processor_type: self.processor_type,
            });
        }
        Ok(self.data_struct.zero_lags().correlator_type())
    }

    /// The structure of the binary data.
    pub fn data_struct(&self) -> Result<&DataStruct> {
        self.check_valid("dataStruct")?;
        Ok(&self.data_struct)
    }

    /// Mutable access to the structure, used to edit the image graph.
    pub fn data_struct_mut(&mut self) -> Result<&mut DataStruct> {
        self.check_valid("dataStruct")?;
        Ok(&mut self.data_struct)
    }

    /// Returns `true` for total power data.
    pub fn is_tp(&self) -> Result<bool> {
        self.check_valid("isTP")?;
        Ok(self.tp())
    }

    /// Returns `true` for correlator data at full or channel averaged resolution.
    pub fn is_correlation(&self) -> Result<bool> {
        self.check_valid("isCorrelation")?;
        Ok(matches!(
            self.spectral_resolution_type,
            Some(SpectralResolutionType::FullResolution | SpectralResolutionType::ChannelAverage)
        ))
    }

    fn tp(&self) -> bool {
        self.spectral_resolution_type == Some(SpectralResolutionType::BasebandWide)
    }

    /// `{execBlockNum}/{scanNum}/{subscanNum}/`.
    pub fn project_path(&self) -> Result<String> {
        self.check_valid("projectPath")?;
        Ok(self.context().project_path().to_string())
    }

    /// Facts handed to data subsets of this object.
    pub fn subset_context(&self) -> Result<SubsetContext> {
        self.check_valid("subsetContext")?;
        Ok(self.context())
    }

    fn context(&self) -> SubsetContext {
        SubsetContext {
            exec_block_num: self.exec_block_num,
            scan_num: self.scan_num,
            subscan_num: self.subscan_num,
            dimensionality: self.dimensionality,
            correlation_mode: self.correlation_mode,
            spectral_resolution_type: self.spectral_resolution_type,
            processor_type: self.processor_type,
        }
    }

    /// Project paths of the data subsets, in arrival order.
    pub fn project_paths(&self) -> Result<Vec<String>> {
        self.check_valid("projectPaths")?;
        Ok(self.subsets.iter().map(SdmDataSubset::project_path).collect())
    }

    /// The data subset with the given project path.
    ///
    /// # Errors
    /// Fails with [`ModelError::SubsetNotFound`] if there is none.
    pub fn sdm_data_subset(&self, project_path: &str) -> Result<&SdmDataSubset<'a>> {
        self.check_valid("sdmDataSubset")?;
        self.index
            .get(project_path)
            .map(|i| &self.subsets[*i])
            .ok_or_else(|| ModelError::SubsetNotFound {
                project_path: project_path.to_string(),
            })
    }

    /// All data subsets of correlator data.
    ///
    /// # Errors
    /// Fails with [`ModelError::InvalidCall`] for total power data.
    pub fn corr_data_subsets(&self) -> Result<&[SdmDataSubset<'a>]> {
        self.check_valid("corrDataSubsets")?;
        if self.tp() {
            return Err(ModelError::InvalidCall {
                operation: "corrDataSubsets",
                context: "the data are total power data",
            });
        }
        Ok(&self.subsets)
    }

    /// The single data subset of total power data.
    ///
    /// # Errors
    /// Fails with [`ModelError::InvalidCall`] for correlator data and with
    /// [`ModelError::SubsetNotFound`] if no subset was appended yet.
    pub fn tp_data_subset(&self) -> Result<&SdmDataSubset<'a>> {
        self.check_valid("tpDataSubset")?;
        if !self.tp() {
            return Err(ModelError::InvalidCall {
                operation: "tpDataSubset",
                context: "the data are not total power data",
            });
        }
        self.subsets
            .first()
            .ok_or_else(|| ModelError::SubsetNotFound {
                project_path: self.context().project_path().to_string(),
            })
    }

    /// Appends a data subset.
    ///
    /// For correlator data `numTime` follows the number of appended subsets.
    ///
    /// # Errors
    /// Fails if the subset has an empty or already present project path.
    pub fn append(&mut self, subset: SdmDataSubset<'a>) -> Result<()> {
        self.check_valid("append")?;
        let project_path = subset.project_path();
        if project_path.is_empty() {
            return Err(ModelError::EmptyProjectPath);
        }
        if self.index.contains_key(&project_path) {
            return Err(ModelError::DuplicateSubset { project_path });
        }
        self.index.insert(project_path, self.subsets.len());
        self.subsets.push(subset);
        if self.dimensionality > 0 {
            self.num_time = u32::try_from(self.subsets.len()).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// Whether the subscan was aborted.
    pub fn aborted(&self) -> Result<bool> {
        self.check_valid("aborted")?;
        Ok(self.aborted)
    }

    /// Time at which the subscan was aborted.
    pub fn abort_time(&self) -> Result<u64> {
        self.check_valid("abortTime")?;
        Ok(self.abort_time)
    }

    /// Why the subscan was aborted.
    pub fn abort_reason(&self) -> Result<&str> {
        self.check_valid("abortReason")?;
        Ok(&self.abort_reason)
    }

    /// Marks the subscan as aborted.
    pub fn abort(&mut self, time: u64, reason: impl Into<String>) -> Result<()> {
        self.check_valid("abort")?;
        self.aborted = true;
        self.abort_time = time;
        self.abort_reason = reason.into();
        Ok(())
    }

    /// Invalidates the object and drops its subsets. There is no way back.
    pub fn done(&mut self) {
        self.valid = false;
        self.subsets.clear();
        self.index.clear();
    }
}

impl fmt::Display for SdmDataObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return writeln!(f, "SDMDataObject (invalid)");
        }
        writeln!(f, "SDMDataObject \"{}\"", self.title)?;
        writeln!(f, "  dataOID: {}", self.data_oid)?;
        writeln!(f, "  projectPath: {}", self.context().project_path())?;
        writeln!(f, "  execBlockUID: {}", self.exec_block_uid)?;
        writeln!(f, "  byteOrder: {}", self.byte_order)?;
        writeln!(f, "  startTime: {}", self.start_time)?;
        writeln!(f, "  dimensionality: {}", self.dimensionality)?;
        writeln!(f, "  numTime: {}", self.num_time)?;
        writeln!(f, "  numAntenna: {}", self.num_antenna)?;
        writeln!(f, "  correlationMode: {}", self.correlation_mode)?;
        if let Some(resolution) = self.spectral_resolution_type {
            writeln!(f, "  spectralResolution: {resolution}")?;
        }
        writeln!(f, "  processorType: {}", self.processor_type)?;
        let ds = &self.data_struct;
        if self.correlation_mode.has_cross() && !ds.apc().is_empty() {
            writeln!(f, "  apc: {}", to_literals(ds.apc()))?;
        }
        for bb in ds.basebands() {
            writeln!(
                f,
                "  baseband {}: {} spectral window(s)",
                bb.name(),
                bb.spectral_windows().len()
            )?;
        }
        for (from, to) in ds.image_edges() {
            writeln!(
                f,
                "  spw ({}, {}) has image ({}, {})",
                from.baseband, from.spw, to.baseband, to.spw
            )?;
        }
        writeln!(f, "  data subsets: {}", self.subsets.len())?;
        if self.aborted {
            writeln!(f, "  aborted at {}: {}", self.abort_time, self.abort_reason)?;
        }
        Ok(())
    }
}

/// Builder for a valid [`SdmDataObject`].
#[derive(Debug, Clone)]
pub struct SdmDataObjectBuilder {
    object: SdmDataObject<'static>,
}

impl Default for SdmDataObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SdmDataObjectBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            object: SdmDataObject::default(),
        }
    }

    /// Sets the document title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.object.title = title.into();
        self
    }

    /// Sets the byte order of the binary attachments.
    #[must_use]
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.object.byte_order = byte_order;
        self
    }

    /// Sets the schema version.
    #[must_use]
    pub fn schema_version(mut self, schema_version: u32) -> Self {
        self.object.schema_version = schema_version;
        self
    }

    /// Sets the start time in nanoseconds (MJD based).
    #[must_use]
    pub fn start_time(mut self, start_time: u64) -> Self {
        self.object.start_time = start_time;
        self
    }

    /// Sets the archive UID of the document.
    #[must_use]
    pub fn data_oid(mut self, data_oid: impl Into<String>) -> Self {
        self.object.data_oid = data_oid.into();
        self
    }

    /// Sets the dimensionality (0 for total power, 1 for correlator data).
    #[must_use]
    pub fn dimensionality(mut self, dimensionality: u32) -> Self {
        self.object.dimensionality = dimensionality;
        self
    }

    /// Sets the number of time samples of a total power document.
    #[must_use]
    pub fn num_time(mut self, num_time: u32) -> Self {
        self.object.num_time = num_time;
        self
    }

    /// Sets the archive UID of the execution block.
    #[must_use]
    pub fn exec_block_uid(mut self, exec_block_uid: impl Into<String>) -> Self {
        self.object.exec_block_uid = exec_block_uid.into();
        self
    }

    /// Sets execution block, scan and subscan numbers.
    #[must_use]
    pub fn project(mut self, exec_block_num: u32, scan_num: u32, subscan_num: u32) -> Self {
        self.object.exec_block_num = exec_block_num;
        self.object.scan_num = scan_num;
        self.object.subscan_num = subscan_num;
        self
    }

    /// Sets the number of antennas.
    #[must_use]
    pub fn num_antenna(mut self, num_antenna: u32) -> Self {
        self.object.num_antenna = num_antenna;
        self
    }

    /// Sets the correlation mode.
    #[must_use]
    pub fn correlation_mode(mut self, correlation_mode: CorrelationMode) -> Self {
        self.object.correlation_mode = correlation_mode;
        self
    }

    /// Sets the spectral resolution.
    #[must_use]
    pub fn spectral_resolution_type(mut self, resolution: SpectralResolutionType) -> Self {
        self.object.spectral_resolution_type = Some(resolution);
        self
    }

    /// Sets the processor type.
    #[must_use]
    pub fn processor_type(mut self, processor_type: ProcessorType) -> Self {
        self.object.processor_type = processor_type;
        self
    }

    /// Sets the structure of the binary attachments.
    #[must_use]
    pub fn data_struct(mut self, data_struct: DataStruct) -> Self {
        self.object.data_struct = data_struct;
        self
    }

    /// Marks the subscan as aborted.
    #[must_use]
    pub fn aborted(mut self, time: u64, reason: impl Into<String>) -> Self {
        self.object.aborted = true;
        self.object.abort_time = time;
        self.object.abort_reason = reason.into();
        self
    }

    /// Builds a valid object.
    #[must_use]
    pub fn build<'a>(self) -> SdmDataObject<'a> {
        let SdmDataObject {
            title,
            byte_order,
            schema_version,
            start_time,
            data_oid,
            dimensionality,
            num_time,
            exec_block_uid,
            exec_block_num,
            scan_num,
            subscan_num,
            num_antenna,
            correlation_mode,
            spectral_resolution_type,
            processor_type,
            data_struct,
            aborted,
            abort_time,
            abort_reason,
            ..
        } = self.object;
        SdmDataObject {
            valid: true,
            title,
            byte_order,
            schema_version,
            start_time,
            data_oid,
            dimensionality,
            num_time,
            exec_block_uid,
            exec_block_num,
            scan_num,
            subscan_num,
            num_antenna,
            correlation_mode,
            spectral_resolution_type,
            processor_type,
            data_struct,
            subsets: Vec::new(),
            index: HashMap::new(),
            aborted,
            abort_time,
            abort_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{BasebandName, NetSideband, StokesParameter};
    use crate::spectral::{Baseband, SpectralWindow};
    use crate::subset::SdmDataSubset;

    fn correlator_object<'a>(resolution: SpectralResolutionType) -> SdmDataObject<'a> {
        let spw = SpectralWindow::cross(vec![StokesParameter::Xx], 1.0, 16, 1, NetSideband::Usb);
        SdmDataObject::builder()
            .title("correlator test")
            .data_oid("uid://X1/X2/X3")
            .dimensionality(1)
            .project(1, 2, 3)
            .num_antenna(4)
            .correlation_mode(CorrelationMode::CrossOnly)
            .spectral_resolution_type(resolution)
            .processor_type(ProcessorType::Correlator)
            .data_struct(DataStruct::new(vec![Baseband::new(BasebandName::Bb1, vec![spw])]))
            .build()
    }

    #[test]
    fn test_default_is_invalid() {
        let object = SdmDataObject::default();
        assert!(!object.is_valid());
        assert_eq!(
            object.title(),
            Err(ModelError::InvalidState { operation: "title" })
        );
        assert!(object.is_tp().is_err());
        assert!(object.data_struct().is_err());
    }

    #[test]
    fn test_project_path() {
        let object = correlator_object(SpectralResolutionType::FullResolution);
        assert_eq!(object.project_path().expect("Failed to get path"), "1/2/3/");
    }

    #[test]
    fn test_tp_and_correlation_partition_resolutions() {
        for resolution in [
            SpectralResolutionType::ChannelAverage,
            SpectralResolutionType::BasebandWide,
            SpectralResolutionType::FullResolution,
        ] {
            let object = correlator_object(resolution);
            let tp = object.is_tp().expect("Failed to get isTP");
            let corr = object.is_correlation().expect("Failed to get isCorrelation");
            assert!(tp != corr, "{resolution} must be exactly one of TP or correlation");
        }
    }

    #[test]
    fn test_correlator_type() {
        let object = correlator_object(SpectralResolutionType::FullResolution);
        assert_eq!(
            object.correlator_type().expect("Failed to get correlator type"),
            CorrelatorType::Xf
        );

        let radiometer = SdmDataObject::builder()
            .processor_type(ProcessorType::Radiometer)
            .build();
        assert_eq!(
            radiometer.correlator_type(),
            Err(ModelError::NoCorrelatorType {
                processor_type: ProcessorType::Radiometer
            })
        );
    }

    #[test]
    fn test_append_and_lookup() {
        let mut object = correlator_object(SpectralResolutionType::FullResolution);
        let context = object.subset_context().expect("Failed to get context");
        for integration in 1..=3 {
            let mut subset = SdmDataSubset::new(context);
            subset.set_integration_num(integration);
            object.append(subset).expect("Failed to append subset");
        }

        assert_eq!(object.num_time().expect("Failed to get numTime"), 3);
        assert_eq!(
            object.project_paths().expect("Failed to get paths"),
            vec!["1/2/3/1/", "1/2/3/2/", "1/2/3/3/"]
        );
        let subset = object
            .sdm_data_subset("1/2/3/2/")
            .expect("Failed to find subset");
        assert_eq!(subset.integration_num(), 2);
        assert_eq!(
            object.corr_data_subsets().expect("Failed to get subsets").len(),
            3
        );
        assert!(matches!(
            object.tp_data_subset(),
            Err(ModelError::InvalidCall { .. })
        ));
        assert!(matches!(
            object.sdm_data_subset("1/2/3/9/"),
            Err(ModelError::SubsetNotFound { .. })
        ));
    }

    #[test]
    fn test_append_rejects_duplicate() {
        let mut object = correlator_object(SpectralResolutionType::FullResolution);
        let context = object.subset_context().expect("Failed to get context");
        let mut first = SdmDataSubset::new(context);
        first.set_integration_num(1);
        let second = first.clone();
        object.append(first).expect("Failed to append subset");
        assert_eq!(
            object.append(second),
            Err(ModelError::DuplicateSubset {
                project_path: "1/2/3/1/".to_string()
            })
        );
    }

    #[test]
    fn test_done_invalidates() {
        let mut object = correlator_object(SpectralResolutionType::FullResolution);
        let context = object.subset_context().expect("Failed to get context");
        object
            .append(SdmDataSubset::new(context))
            .expect("Failed to append subset");
        object.done();
        assert!(!object.is_valid());
        assert!(matches!(
            object.project_paths(),
            Err(ModelError::InvalidState { .. })
        ));
        assert!(object.to_string().contains("invalid"));
    }

    #[test]
    fn test_abort() {
        let mut object = correlator_object(SpectralResolutionType::FullResolution);
        assert!(!object.aborted().expect("Failed to get aborted"));
        object.abort(42, "wind").expect("Failed to abort");
        assert!(object.aborted().expect("Failed to get aborted"));
        assert_eq!(object.abort_time().expect("Failed to get time"), 42);
        assert_eq!(object.abort_reason().expect("Failed to get reason"), "wind");
        assert!(object.to_string().contains("aborted at 42: wind"));
    }

    #[test]
    fn test_display_summary() {
        let object = correlator_object(SpectralResolutionType::FullResolution);
        let text = object.to_string();
        assert!(text.contains("SDMDataObject \"correlator test\""));
        assert!(text.contains("projectPath: 1/2/3/"));
        assert!(text.contains("baseband BB_1: 1 spectral window(s)"));
    }
}
