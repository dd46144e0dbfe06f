//! Arguments of the writer calls.

use bdf_core::{AttachmentKind, AxisName, Baseband, CrossData, NetSideband};

/// Identification of the subscan a document belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscanHeader {
    /// Start time of the subscan.
    pub start_time: u64,
    /// Archive UID of the execution block.
    pub exec_block_uid: String,
    /// Execution block number.
    pub exec_block_num: u32,
    /// Scan number.
    pub scan_num: u32,
    /// Subscan number.
    pub subscan_num: u32,
    /// Number of antennas.
    pub num_antenna: u32,
}

impl SubscanHeader {
    /// Creates a subscan header.
    pub fn new(
        start_time: u64,
        exec_block_uid: impl Into<String>,
        exec_block_num: u32,
        scan_num: u32,
        subscan_num: u32,
        num_antenna: u32,
    ) -> Self {
        Self {
            start_time,
            exec_block_uid: exec_block_uid.into(),
            exec_block_num,
            scan_num,
            subscan_num,
            num_antenna,
        }
    }
}

/// Borrowed binary payload of one data subset.
///
/// An empty slice means the attachment is absent. The slices are streamed to
/// the sink without being copied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubsetData<'d> {
    /// Flags.
    pub flags: &'d [u32],
    /// Actual midpoints of the integrations.
    pub actual_times: &'d [i64],
    /// Actual durations of the integrations.
    pub actual_durations: &'d [i64],
    /// Cross correlations, `None` when absent.
    pub cross_data: Option<CrossData<'d>>,
    /// Auto correlations.
    pub auto_data: &'d [f32],
    /// Zero lags of an XF correlator.
    pub zero_lags: &'d [f32],
}

impl<'d> SubsetData<'d> {
    /// Number of values supplied for an attachment.
    #[must_use]
    pub fn len_of(&self, kind: AttachmentKind) -> usize {
        match kind {
            AttachmentKind::Flags => self.flags.len(),
            AttachmentKind::ActualTimes => self.actual_times.len(),
            AttachmentKind::ActualDurations => self.actual_durations.len(),
            AttachmentKind::CrossData => self.cross_data.map_or(0, |data| data.len()),
            AttachmentKind::AutoData => self.auto_data.len(),
            AttachmentKind::ZeroLags => self.zero_lags.len(),
        }
    }

    /// Native-endian bytes of an attachment.
    #[must_use]
    pub fn bytes_of(&self, kind: AttachmentKind) -> &'d [u8] {
        match kind {
            AttachmentKind::Flags => bytemuck::cast_slice(self.flags),
            AttachmentKind::ActualTimes => bytemuck::cast_slice(self.actual_times),
            AttachmentKind::ActualDurations => bytemuck::cast_slice(self.actual_durations),
            AttachmentKind::CrossData => match self.cross_data {
                Some(CrossData::Int16(values)) => bytemuck::cast_slice(values),
                Some(CrossData::Int32(values)) => bytemuck::cast_slice(values),
                Some(CrossData::Float32(values)) => bytemuck::cast_slice(values),
                None => &[],
            },
            AttachmentKind::AutoData => bytemuck::cast_slice(self.auto_data),
            AttachmentKind::ZeroLags => bytemuck::cast_slice(self.zero_lags),
        }
    }

    /// Attachments with at least one value, in document order.
    pub fn present(&self) -> impl Iterator<Item = AttachmentKind> + '_ {
        AttachmentKind::ALL
            .into_iter()
            .filter(|kind| self.len_of(*kind) > 0)
    }
}

/// One-shot total power document.
///
/// Declared sizes are taken from the supplied arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct TpData<'d> {
    /// Number of integrations in the subscan (`numTime`).
    pub num_integrations: u32,
    /// Basebands and their spectral windows.
    pub basebands: Vec<Baseband>,
    /// Midpoint of the subscan.
    pub time: u64,
    /// Duration of the subscan.
    pub interval: u64,
    /// Axes of the flags.
    pub flags_axes: Vec<AxisName>,
    /// Axes of the actual times.
    pub actual_times_axes: Vec<AxisName>,
    /// Axes of the actual durations.
    pub actual_durations_axes: Vec<AxisName>,
    /// Axes of the auto correlations.
    pub auto_data_axes: Vec<AxisName>,
    /// Payload. autoData must not be empty.
    pub data: SubsetData<'d>,
}

/// One-shot water vapour radiometer document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WvrData<'d> {
    /// Number of time samples.
    pub num_time: u32,
    /// Number of radiometer channels.
    pub num_channel: u32,
    /// Net sideband of the only spectral window.
    pub sideband: NetSideband,
    /// Midpoint of the subscan.
    pub time: u64,
    /// Duration of the subscan.
    pub interval: u64,
    /// `numTime × numAntenna × numChannel` values, axes `TIM ANT SPP`.
    pub auto_data: &'d [f32],
    /// `numTime × numAntenna` values, axes `TIM ANT`. May be empty.
    pub flags: &'d [u32],
}
