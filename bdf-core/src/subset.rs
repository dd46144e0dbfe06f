//! Data subsets: one integration of correlator data or one subscan of
//! total power data.
//!
//! A subset never owns binary payloads. The writer fills in metadata only,
//! while a binary resolver binds borrowed slices with the `attach_*`
//! methods after parsing.

use crate::binary_part::AttachmentKind;
use crate::enums::{CorrelationMode, CrossDataType, SpectralResolutionType};
use crate::error::{ModelError, Result};
use crate::object::SubsetContext;
use crate::project_path::ProjectPath;
use std::collections::BTreeMap;
use std::fmt;

/// Borrowed cross correlation values, in one of three numeric types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossData<'a> {
    /// 16-bit integers.
    Int16(&'a [i16]),
    /// 32-bit integers.
    Int32(&'a [i32]),
    /// 32-bit floats.
    Float32(&'a [f32]),
}

impl CrossData<'_> {
    /// Numeric type tag.
    #[must_use]
    pub const fn data_type(&self) -> CrossDataType {
        match self {
            Self::Int16(_) => CrossDataType::Int16,
            Self::Int32(_) => CrossDataType::Int32,
            Self::Float32(_) => CrossDataType::Float32,
        }
    }

    /// Number of values.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Int16(values) => values.len(),
            Self::Int32(values) => values.len(),
            Self::Float32(values) => values.len(),
        }
    }

    /// Returns `true` if there are no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Abort record of a subset that carries no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    /// Time at which the observation stopped.
    pub time: u64,
    /// Reason given for the abort.
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Payload<'a> {
    flags: Option<&'a [u32]>,
    actual_times: Option<&'a [i64]>,
    actual_durations: Option<&'a [i64]>,
    cross_data: Option<CrossData<'a>>,
    auto_data: Option<&'a [f32]>,
    zero_lags: Option<&'a [f32]>,
}

#[derive(Debug, Clone, PartialEq)]
enum Content<'a> {
    Data(Payload<'a>),
    Aborted(Abort),
}

/// One integration (correlator) or one subscan (total power, WVR) of data.
#[derive(Debug, Clone, PartialEq)]
pub struct SdmDataSubset<'a> {
    context: SubsetContext,
    integration_num: u32,
    subintegration_num: u32,
    time: u64,
    interval: u64,
    cross_data_type: Option<CrossDataType>,
    refs: BTreeMap<AttachmentKind, String>,
    content: Content<'a>,
}

impl<'a> SdmDataSubset<'a> {
    /// Creates an empty subset in the given context.
    #[must_use]
    pub fn new(context: SubsetContext) -> Self {
        Self {
            context,
            integration_num: 0,
            subintegration_num: 0,
            time: 0,
            interval: 0,
            cross_data_type: None,
            refs: BTreeMap::new(),
            content: Content::Data(Payload::default()),
        }
    }

    /// Context inherited from the owning header.
    #[must_use]
    pub const fn context(&self) -> &SubsetContext {
        &self.context
    }

    /// Integration number, 0 for total power data.
    #[must_use]
    pub const fn integration_num(&self) -> u32 {
        self.integration_num
    }

    /// Sets the integration number.
    pub fn set_integration_num(&mut self, integration_num: u32) {
        self.integration_num = integration_num;
    }

    /// Subintegration number, meaningful under CHANNEL_AVERAGE only.
    #[must_use]
    pub const fn subintegration_num(&self) -> u32 {
        self.subintegration_num
    }

    /// Sets the subintegration number.
    pub fn set_subintegration_num(&mut self, subintegration_num: u32) {
        self.subintegration_num = subintegration_num;
    }

    /// Midpoint of the integration.
    #[must_use]
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// Duration of the integration.
    #[must_use]
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Sets midpoint and duration.
    pub fn set_schedule(&mut self, time: u64, interval: u64) {
        self.time = time;
        self.interval = interval;
    }

    /// Declared numeric type of the cross data.
    #[must_use]
    pub const fn cross_data_type(&self) -> Option<CrossDataType> {
        self.cross_data_type
    }

    /// Sets the declared numeric type of the cross data.
    pub fn set_cross_data_type(&mut self, cross_data_type: CrossDataType) {
        self.cross_data_type = Some(cross_data_type);
    }

    /// Location of an attachment as recorded in the subset header.
    #[must_use]
    pub fn attachment_ref(&self, kind: AttachmentKind) -> Option<&str> {
        self.refs.get(&kind).map(String::as_str)
    }

    /// Records the location of an attachment.
    pub fn set_attachment_ref(&mut self, kind: AttachmentKind, href: impl Into<String>) {
        self.refs.insert(kind, href.into());
    }

    /// Attachments whose location is recorded, in document order.
    pub fn attachment_refs(&self) -> impl Iterator<Item = (AttachmentKind, &str)> {
        self.refs.iter().map(|(kind, href)| (*kind, href.as_str()))
    }

    /// Project path: the owner's path extended by integration numbers
    /// according to the spectral resolution.
    #[must_use]
    pub fn project_path(&self) -> String {
        self.path().to_string()
    }

    /// Parsed form of [`Self::project_path`].
    #[must_use]
    pub fn path(&self) -> ProjectPath {
        let owner = self.context.project_path();
        let (eb, scan, subscan) = (
            owner.exec_block_num(),
            owner.scan_num(),
            owner.subscan_num(),
        );
        if self.context.dimensionality == 0 {
            return owner;
        }
        match self.context.spectral_resolution_type {
            Some(SpectralResolutionType::ChannelAverage) => ProjectPath::subintegration(
                eb,
                scan,
                subscan,
                self.integration_num,
                self.subintegration_num,
            ),
            Some(SpectralResolutionType::BasebandWide) => owner,
            Some(SpectralResolutionType::FullResolution) | None => {
                ProjectPath::integration(eb, scan, subscan, self.integration_num)
            }
        }
    }

    /// Replaces any payload with an abort record.
    pub fn abort(&mut self, time: u64, reason: impl Into<String>) {
        self.content = Content::Aborted(Abort {
            time,
            reason: reason.into(),
        });
    }

    /// Returns `true` if the subset records an aborted integration.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.content, Content::Aborted(_))
    }

    /// Abort record, for aborted subsets.
    #[must_use]
    pub const fn aborted(&self) -> Option<&Abort> {
        match &self.content {
            Content::Aborted(abort) => Some(abort),
            Content::Data(_) => None,
        }
    }

    fn payload(&self) -> Option<&Payload<'a>> {
        match &self.content {
            Content::Data(payload) => Some(payload),
            Content::Aborted(_) => None,
        }
    }

    fn payload_mut(&mut self) -> Result<&mut Payload<'a>> {
        let project_path = self.path();
        match &mut self.content {
            Content::Data(payload) => Ok(payload),
            Content::Aborted(_) => Err(ModelError::AbortedSubset {
                project_path: project_path.to_string(),
            }),
        }
    }

    fn check_cross(&self, operation: &'static str) -> Result<()> {
        let mode = self.context.correlation_mode;
        if mode == CorrelationMode::AutoOnly || self.context.is_tp() {
            return Err(ModelError::WrongCorrelationMode { operation, mode });
        }
        Ok(())
    }

    fn check_auto(&self, operation: &'static str) -> Result<()> {
        let mode = self.context.correlation_mode;
        if mode == CorrelationMode::CrossOnly {
            return Err(ModelError::WrongCorrelationMode { operation, mode });
        }
        Ok(())
    }

    fn check_zero_lags(&self) -> Result<()> {
        if self.context.is_tp() {
            return Err(ModelError::InvalidCall {
                operation: "zeroLags",
                context: "the data are total power data",
            });
        }
        Ok(())
    }

    /// Flags, if attached.
    #[must_use]
    pub fn flags(&self) -> Option<&'a [u32]> {
        self.payload().and_then(|p| p.flags)
    }

    /// Actual times, if attached.
    #[must_use]
    pub fn actual_times(&self) -> Option<&'a [i64]> {
        self.payload().and_then(|p| p.actual_times)
    }

    /// Actual durations, if attached.
    #[must_use]
    pub fn actual_durations(&self) -> Option<&'a [i64]> {
        self.payload().and_then(|p| p.actual_durations)
    }

    /// Cross data, if attached.
    ///
    /// # Errors
    /// Fails under AUTO_ONLY and for total power data.
    pub fn cross_data(&self) -> Result<Option<CrossData<'a>>> {
        self.check_cross("crossData")?;
        Ok(self.payload().and_then(|p| p.cross_data))
    }

    /// Auto data, if attached.
    ///
    /// # Errors
    /// Fails under CROSS_ONLY.
    pub fn auto_data(&self) -> Result<Option<&'a [f32]>> {
        self.check_auto("autoData")?;
        Ok(self.payload().and_then(|p| p.auto_data))
    }

    /// Zero lags, if attached.
    ///
    /// # Errors
    /// Fails for total power data.
    pub fn zero_lags(&self) -> Result<Option<&'a [f32]>> {
        self.check_zero_lags()?;
        Ok(self.payload().and_then(|p| p.zero_lags))
    }

    /// Binds the flags payload.
    ///
    /// # Errors
    /// Fails if the subset is aborted.
    pub fn attach_flags(&mut self, values: &'a [u32]) -> Result<()> {
        self.payload_mut()?.flags = Some(values);
        Ok(())
    }

    /// Binds the actualTimes payload.
    ///
    /// # Errors
    /// Fails if the subset is aborted.
    pub fn attach_actual_times(&mut self, values: &'a [i64]) -> Result<()> {
        self.payload_mut()?.actual_times = Some(values);
        Ok(())
    }

    /// Binds the actualDurations payload.
    ///
    /// # Errors
    /// Fails if the subset is aborted.
    pub fn attach_actual_durations(&mut self, values: &'a [i64]) -> Result<()> {
        self.payload_mut()?.actual_durations = Some(values);
        Ok(())
    }

    /// Binds cross data. Its type must agree with the declared type, if any.
    ///
    /// # Errors
    /// Fails with [`ModelError::CrossDataTypeMismatch`] on a type disagreement.
    pub fn attach_cross_data(&mut self, values: CrossData<'a>) -> Result<()> {
        self.check_cross("crossData")?;
        let supplied = values.data_type();
        match self.cross_data_type {
            Some(declared) if declared != supplied => {
                return Err(ModelError::CrossDataTypeMismatch { declared, supplied });
            }
            _ => {}
        }
        self.payload_mut()?.cross_data = Some(values);
        self.cross_data_type = Some(supplied);
        Ok(())
    }

    /// Binds the autoData payload.
    ///
    /// # Errors
    /// Fails under CROSS_ONLY or if the subset is aborted.
    pub fn attach_auto_data(&mut self, values: &'a [f32]) -> Result<()> {
        self.check_auto("autoData")?;
        self.payload_mut()?.auto_data = Some(values);
        Ok(())
    }

    /// Binds the zeroLags payload.
    ///
    /// # Errors
    /// Fails for total power data or if the subset is aborted.
    pub fn attach_zero_lags(&mut self, values: &'a [f32]) -> Result<()> {
        self.check_zero_lags()?;
        self.payload_mut()?.zero_lags = Some(values);
        Ok(())
    }

    /// Writes a summary that shows at most `max_values` values per attachment.
    pub fn describe(&self, f: &mut impl fmt::Write, max_values: usize) -> fmt::Result {
        writeln!(f, "SDMDataSubset {}", self.project_path())?;
        writeln!(f, "  time: {}, interval: {}", self.time, self.interval)?;
        let payload = match &self.content {
            Content::Aborted(abort) => {
                return writeln!(f, "  aborted at {}: {}", abort.time, abort.reason);
            }
            Content::Data(payload) => payload,
        };
        describe_values(f, "flags", payload.flags, max_values)?;
        describe_values(f, "actualTimes", payload.actual_times, max_values)?;
        describe_values(f, "actualDurations", payload.actual_durations, max_values)?;
        match payload.cross_data {
            Some(CrossData::Int16(v)) => describe_values(f, "crossData", Some(v), max_values)?,
            Some(CrossData::Int32(v)) => describe_values(f, "crossData", Some(v), max_values)?,
            Some(CrossData::Float32(v)) => describe_values(f, "crossData", Some(v), max_values)?,
            None => {}
        }
        describe_values(f, "autoData", payload.auto_data, max_values)?;
        describe_values(f, "zeroLags", payload.zero_lags, max_values)
    }
}

fn describe_values<T: fmt::Display>(
    f: &mut impl fmt::Write,
    name: &str,
    values: Option<&[T]>,
    max_values: usize,
) -> fmt::Result {
    let Some(values) = values else {
        return Ok(());
    };
    write!(f, "  {name} ({} values):", values.len())?;
    for value in values.iter().take(max_values) {
        write!(f, " {value}")?;
    }
    if values.len() > max_values {
        write!(f, " ...")?;
    }
    writeln!(f)
}

impl fmt::Display for SdmDataSubset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ProcessorType;

    fn context(resolution: SpectralResolutionType, mode: CorrelationMode) -> SubsetContext {
        let tp = resolution == SpectralResolutionType::BasebandWide;
        SubsetContext {
            exec_block_num: 1,
            scan_num: 2,
            subscan_num: 3,
            dimensionality: u32::from(!tp),
            correlation_mode: mode,
            spectral_resolution_type: Some(resolution),
            processor_type: if tp {
                ProcessorType::Radiometer
            } else {
                ProcessorType::Correlator
            },
        }
    }

    #[test]
    fn test_project_path_by_resolution() {
        let mut full = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        full.set_integration_num(7);
        assert_eq!(full.project_path(), "1/2/3/7/");

        let mut average = SdmDataSubset::new(context(
            SpectralResolutionType::ChannelAverage,
            CorrelationMode::CrossOnly,
        ));
        average.set_integration_num(7);
        average.set_subintegration_num(2);
        assert_eq!(average.project_path(), "1/2/3/7/2/");

        let tp = SdmDataSubset::new(context(
            SpectralResolutionType::BasebandWide,
            CorrelationMode::AutoOnly,
        ));
        assert_eq!(tp.project_path(), "1/2/3/");
    }

    #[test]
    fn test_attach_views() {
        let flags = [0_u32; 4];
        let times = [10_i64, 20];
        let cross = [1_i32, 2, 3, 4];
        let mut subset = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        subset.set_cross_data_type(CrossDataType::Int32);
        subset.attach_flags(&flags).expect("Failed to attach flags");
        subset.attach_actual_times(&times).expect("Failed to attach times");
        subset
            .attach_cross_data(CrossData::Int32(&cross))
            .expect("Failed to attach cross data");

        assert_eq!(subset.flags(), Some(&flags[..]));
        assert_eq!(subset.actual_times(), Some(&times[..]));
        assert_eq!(subset.actual_durations(), None);
        let attached = subset
            .cross_data()
            .expect("Failed to get cross data")
            .expect("Cross data missing");
        assert_eq!(attached.len(), 4);
        assert_eq!(attached.data_type(), CrossDataType::Int32);
    }

    #[test]
    fn test_cross_data_type_mismatch() {
        let cross = [1_i16, 2];
        let mut subset = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        subset.set_cross_data_type(CrossDataType::Float32);
        assert_eq!(
            subset.attach_cross_data(CrossData::Int16(&cross)),
            Err(ModelError::CrossDataTypeMismatch {
                declared: CrossDataType::Float32,
                supplied: CrossDataType::Int16,
            })
        );
    }

    #[test]
    fn test_wrong_correlation_mode() {
        let auto_only = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::AutoOnly,
        ));
        assert!(matches!(
            auto_only.cross_data(),
            Err(ModelError::WrongCorrelationMode {
                operation: "crossData",
                mode: CorrelationMode::AutoOnly
            })
        ));

        let cross_only = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        assert!(cross_only.auto_data().is_err());
        assert_eq!(cross_only.zero_lags(), Ok(None));

        let tp = SdmDataSubset::new(context(
            SpectralResolutionType::BasebandWide,
            CorrelationMode::AutoOnly,
        ));
        assert!(matches!(
            tp.zero_lags(),
            Err(ModelError::InvalidCall { .. })
        ));
    }

    #[test]
    fn test_aborted_subset_has_no_payload() {
        let flags = [1_u32];
        let mut subset = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        subset.set_integration_num(4);
        subset.attach_flags(&flags).expect("Failed to attach flags");
        subset.abort(99, "antenna failure");

        assert!(subset.is_aborted());
        assert_eq!(subset.flags(), None);
        assert_eq!(
            subset.aborted(),
            Some(&Abort {
                time: 99,
                reason: "antenna failure".to_string()
            })
        );
        assert_eq!(
            subset.attach_flags(&flags),
            Err(ModelError::AbortedSubset {
                project_path: "1/2/3/4/".to_string()
            })
        );
    }

    #[test]
    fn test_attachment_refs() {
        let mut subset = SdmDataSubset::new(context(
            SpectralResolutionType::FullResolution,
            CorrelationMode::CrossOnly,
        ));
        subset.set_attachment_ref(AttachmentKind::CrossData, "1/2/3/1/crossData.bin");
        subset.set_attachment_ref(AttachmentKind::Flags, "1/2/3/1/flags.bin");
        let kinds: Vec<AttachmentKind> = subset.attachment_refs().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![AttachmentKind::Flags, AttachmentKind::CrossData]);
        assert_eq!(
            subset.attachment_ref(AttachmentKind::Flags),
            Some("1/2/3/1/flags.bin")
        );
        assert_eq!(subset.attachment_ref(AttachmentKind::ZeroLags), None);
    }

    #[test]
    fn test_display_truncates_values() {
        let auto = [0.5_f32; 12];
        let mut subset = SdmDataSubset::new(context(
            SpectralResolutionType::BasebandWide,
            CorrelationMode::AutoOnly,
        ));
        subset.attach_auto_data(&auto).expect("Failed to attach auto data");
        let text = subset.to_string();
        assert!(text.contains("autoData (12 values):"));
        assert!(text.ends_with("...\n"));
    }
}
