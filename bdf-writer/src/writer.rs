//! BDF document writer.
//!
//! The writer assembles an [`SdmDataObject`] from the values of each call and
//! streams it as a MIME multipart document. Every call is checked in this
//! order: call sequence, header consistency, attachment sizes. Nothing of a
//! failing call reaches the sink, but parts written by earlier calls stay
//! there: a document abandoned after an error is truncated.

use crate::builder::MemorySink;
use crate::data::{SubscanHeader, SubsetData, TpData, WvrData};
use crate::error::{Result, WriterError};
use crate::mime::MimeWriter;
use crate::state::{Operation, WriterState};
use crate::xml::{header_to_xml, subset_to_xml};
use bdf_core::{
    AttachmentKind, AutoDataBinaryPart, AxisName, Baseband, BasebandName, BinaryPart, ByteOrder,
    CorrelationMode, CorrelatorType, DataStruct, ProcessorType, SdmDataObject,
    SdmDataObjectBuilder, SdmDataSubset, SpectralResolutionType, SpectralWindow, StokesParameter,
};
use bytes::Bytes;
use std::io::Write;
use tracing::{debug, info, warn};

/// Writer of one BDF document.
#[derive(Debug)]
pub struct SdmDataObjectWriter<W: Write> {
    mime: MimeWriter<W>,
    uid: String,
    title: String,
    schema_version: u32,
    state: WriterState,
    object: SdmDataObject<'static>,
}

impl<W: Write> SdmDataObjectWriter<W> {
    pub(crate) fn new(mime: MimeWriter<W>, uid: String, title: String, schema_version: u32) -> Self {
        Self {
            mime,
            uid,
            title,
            schema_version,
            state: WriterState::Start,
            object: SdmDataObject::default(),
        }
    }

    /// Current state of the call sequence.
    #[must_use]
    pub const fn state(&self) -> WriterState {
        self.state
    }

    /// Bytes emitted since the document was started. Reset by [`Self::done`].
    #[must_use]
    pub const fn num_bytes(&self) -> u64 {
        self.mime.num_bytes()
    }

    /// The model assembled so far. Invalid before the first header call and
    /// after [`Self::done`].
    #[must_use]
    pub const fn sdm_data_object(&self) -> &SdmDataObject<'static> {
        &self.object
    }

    /// The sink the document is written to.
    #[must_use]
    pub const fn sink(&self) -> &W {
        self.mime.sink()
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.mime.into_inner()
    }

    /// Writes a complete total power document: global header and its only
    /// subset. Declared sizes are those of the supplied arrays.
    ///
    /// # Errors
    /// Fails if the call is out of sequence, if no autoData are supplied, or
    /// if cross data or zero lags are supplied.
    pub fn tp_data(&mut self, header: &SubscanHeader, tp: &TpData<'_>) -> Result<()> {
        let next = self.next_state(Operation::TpData)?;
        self.check_header_values()?;
        let data = &tp.data;
        let data_struct = DataStruct::new(tp.basebands.clone())
            .with_flags(BinaryPart::new(
                supplied_size(data, AttachmentKind::Flags)?,
                tp.flags_axes.clone(),
            ))
            .with_actual_times(BinaryPart::new(
                supplied_size(data, AttachmentKind::ActualTimes)?,
                tp.actual_times_axes.clone(),
            ))
            .with_actual_durations(BinaryPart::new(
                supplied_size(data, AttachmentKind::ActualDurations)?,
                tp.actual_durations_axes.clone(),
            ))
            .with_auto_data(AutoDataBinaryPart::new(
                supplied_size(data, AttachmentKind::AutoData)?,
                tp.auto_data_axes.clone(),
                false,
            ));
        check_required(CorrelationMode::AutoOnly, &data_struct)?;
        check_sizes(&data_struct, data)?;

        let object = self.tp_object(header, tp.num_integrations, data_struct);
        self.write_header(object)?;
        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_schedule(tp.time, tp.interval);
        self.write_subset(subset, data)?;
        self.enter(next);
        Ok(())
    }

    /// Writes the global header of a total power document. Its data follow
    /// with [`Self::add_tp_subscan`].
    ///
    /// # Errors
    /// Fails if the call is out of sequence, if `data_struct` declares no
    /// autoData, or if it declares zero lags.
    pub fn tp_data_header(
        &mut self,
        header: &SubscanHeader,
        num_integrations: u32,
        data_struct: DataStruct,
    ) -> Result<()> {
        let next = self.next_state(Operation::TpDataHeader)?;
        self.check_header_values()?;
        check_required(CorrelationMode::AutoOnly, &data_struct)?;
        if data_struct.zero_lags().part().is_declared() {
            return Err(WriterError::IllegalZeroLags {
                reason: format!("processor type is {}", ProcessorType::Radiometer),
            });
        }
        let object = self.tp_object(header, num_integrations, data_struct);
        self.write_header(object)?;
        self.enter(next);
        Ok(())
    }

    /// Writes the data of a total power subscan.
    ///
    /// # Errors
    /// Fails if the call is out of sequence or if a supplied size differs
    /// from the declared one.
    pub fn add_tp_subscan(&mut self, time: u64, interval: u64, data: &SubsetData<'_>) -> Result<()> {
        let next = self.next_state(Operation::AddTpSubscan)?;
        check_sizes(self.object.data_struct()?, data)?;

        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_schedule(time, interval);
        self.write_subset(subset, data)?;
        self.enter(next);
        Ok(())
    }

    /// Writes a complete water vapour radiometer document.
    ///
    /// The layout is one `NOBB` baseband holding one spectral window of
    /// `num_channel` points.
    ///
    /// # Errors
    /// Fails if the call is out of sequence, if any of the dimensions is
    /// zero, or if the arrays do not hold `numTime × numAntenna × numChannel`
    /// (autoData) or `numTime × numAntenna` (flags) values.
    pub fn wvr_data(&mut self, header: &SubscanHeader, wvr: &WvrData<'_>) -> Result<()> {
        let next = self.next_state(Operation::WvrData)?;
        self.check_header_values()?;
        let auto_size = product(
            AttachmentKind::AutoData,
            &[wvr.num_time, header.num_antenna, wvr.num_channel],
        )?;
        let flags_size = if wvr.flags.is_empty() {
            0
        } else {
            product(AttachmentKind::Flags, &[wvr.num_time, header.num_antenna])?
        };

        let spw = SpectralWindow::auto(
            vec![StokesParameter::I],
            wvr.num_channel,
            1,
            wvr.sideband,
        );
        let data_struct = DataStruct::new(vec![Baseband::new(BasebandName::Nobb, vec![spw])])
            .with_flags(BinaryPart::new(flags_size, vec![AxisName::Tim, AxisName::Ant]))
            .with_auto_data(AutoDataBinaryPart::new(
                auto_size,
                vec![AxisName::Tim, AxisName::Ant, AxisName::Spp],
                false,
            ));
        check_required(CorrelationMode::AutoOnly, &data_struct)?;
        let data = SubsetData {
            flags: wvr.flags,
            auto_data: wvr.auto_data,
            ..SubsetData::default()
        };
        check_sizes(&data_struct, &data)?;

        let object = self
            .object_builder(header)
            .dimensionality(0)
            .num_time(wvr.num_time)
            .correlation_mode(CorrelationMode::AutoOnly)
            .spectral_resolution_type(SpectralResolutionType::FullResolution)
            .processor_type(ProcessorType::Radiometer)
            .data_struct(data_struct)
            .build();
        self.write_header(object)?;
        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_schedule(wvr.time, wvr.interval);
        self.write_subset(subset, &data)?;
        self.enter(next);
        Ok(())
    }

    /// Writes the global header of a correlator document.
    ///
    /// `resolution` must be `FULL_RESOLUTION` (data follow with
    /// [`Self::add_integration`]) or `CHANNEL_AVERAGE` (data follow with
    /// [`Self::add_subintegration`]).
    ///
    /// `data_struct` must declare crossData when the mode has cross products
    /// and autoData when it has auto products.
    ///
    /// # Errors
    /// Fails if the call is out of sequence, on any other resolution, if an
    /// attachment required by `correlation_mode` is not declared, or if
    /// `data_struct` declares zero lags for an FX correlator.
    pub fn corr_data_header(
        &mut self,
        header: &SubscanHeader,
        correlation_mode: CorrelationMode,
        resolution: SpectralResolutionType,
        data_struct: DataStruct,
    ) -> Result<()> {
        let next = self.next_state(Operation::CorrDataHeader)?;
        self.check_header_values()?;
        if !matches!(
            resolution,
            SpectralResolutionType::FullResolution | SpectralResolutionType::ChannelAverage
        ) {
            return Err(WriterError::WrongResolution {
                operation: Operation::CorrDataHeader.name(),
                resolution: Some(resolution),
            });
        }
        check_required(correlation_mode, &data_struct)?;
        let zero_lags = data_struct.zero_lags();
        if zero_lags.part().is_declared() && zero_lags.correlator_type() == CorrelatorType::Fx {
            return Err(WriterError::IllegalZeroLags {
                reason: format!("correlator type is {}", CorrelatorType::Fx),
            });
        }

        let object = self
            .object_builder(header)
            .dimensionality(1)
            .correlation_mode(correlation_mode)
            .spectral_resolution_type(resolution)
            .processor_type(ProcessorType::Correlator)
            .data_struct(data_struct)
            .build();
        self.write_header(object)?;
        self.enter(next);
        Ok(())
    }

    /// Writes one integration of a `FULL_RESOLUTION` correlator document.
    ///
    /// # Errors
    /// Fails if the call is out of sequence, if the resolution is not
    /// `FULL_RESOLUTION`, if `integration_num` was already written, or if a
    /// supplied size differs from the declared one.
    pub fn add_integration(
        &mut self,
        integration_num: u32,
        time: u64,
        interval: u64,
        data: &SubsetData<'_>,
    ) -> Result<()> {
        let next = self.next_state(Operation::AddIntegration)?;
        self.require_resolution(Operation::AddIntegration, SpectralResolutionType::FullResolution)?;
        check_sizes(self.object.data_struct()?, data)?;

        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_integration_num(integration_num);
        subset.set_schedule(time, interval);
        self.write_subset(subset, data)?;
        self.enter(next);
        Ok(())
    }

    /// Writes one subintegration of a `CHANNEL_AVERAGE` correlator document.
    ///
    /// # Errors
    /// Same conditions as [`Self::add_integration`], with `CHANNEL_AVERAGE`.
    pub fn add_subintegration(
        &mut self,
        integration_num: u32,
        subintegration_num: u32,
        time: u64,
        interval: u64,
        data: &SubsetData<'_>,
    ) -> Result<()> {
        let next = self.next_state(Operation::AddSubintegration)?;
        self.require_resolution(
            Operation::AddSubintegration,
            SpectralResolutionType::ChannelAverage,
        )?;
        check_sizes(self.object.data_struct()?, data)?;

        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_integration_num(integration_num);
        subset.set_subintegration_num(subintegration_num);
        subset.set_schedule(time, interval);
        self.write_subset(subset, data)?;
        self.enter(next);
        Ok(())
    }

    /// Records an aborted integration: a subset header without binary parts.
    ///
    /// # Errors
    /// Same sequence and resolution conditions as [`Self::add_integration`].
    pub fn abort_integration(
        &mut self,
        integration_num: u32,
        time: u64,
        interval: u64,
        stop_time: u64,
        reason: &str,
    ) -> Result<()> {
        let next = self.next_state(Operation::AbortIntegration)?;
        self.require_resolution(
            Operation::AbortIntegration,
            SpectralResolutionType::FullResolution,
        )?;

        let mut subset = SdmDataSubset::new(self.object.subset_context()?);
        subset.set_integration_num(integration_num);
        subset.set_schedule(time, interval);
        subset.abort(stop_time, reason);
        info!(integration_num, stop_time, reason, "integration aborted");
        self.write_subset(subset, &SubsetData::default())?;
        self.enter(next);
        Ok(())
    }

    /// Closes the document and returns the number of bytes written.
    ///
    /// The byte counter is reset and the model is invalidated. Any later call
    /// fails with [`WriterError::IllegalSequence`].
    ///
    /// # Errors
    /// Fails if the call is out of sequence or if the sink fails.
    pub fn done(&mut self) -> Result<u64> {
        let next = self.next_state(Operation::Done)?;
        self.mime.close()?;
        let total = self.mime.num_bytes();
        info!(uid = %self.uid, bytes = total, "BDF document complete");
        self.mime.reset_num_bytes();
        self.object.done();
        self.enter(next);
        Ok(total)
    }

    fn next_state(&self, operation: Operation) -> Result<WriterState> {
        self.state
            .next(operation)
            .ok_or_else(|| WriterError::illegal_sequence(operation.name(), self.state))
    }

    fn enter(&mut self, state: WriterState) {
        debug!(from = %self.state, to = %state, "writer state change");
        self.state = state;
    }

    /// The title and UID are written verbatim in MIME header lines.
    fn check_header_values(&self) -> Result<()> {
        for (field, value) in [("title", &self.title), ("uid", &self.uid)] {
            if value.chars().any(char::is_control) {
                return Err(WriterError::InvalidHeaderValue {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    fn require_resolution(
        &self,
        operation: Operation,
        expected: SpectralResolutionType,
    ) -> Result<()> {
        let resolution = self.object.spectral_resolution_type()?;
        if resolution == Some(expected) {
            Ok(())
        } else {
            Err(WriterError::WrongResolution {
                operation: operation.name(),
                resolution,
            })
        }
    }

    fn object_builder(&self, header: &SubscanHeader) -> SdmDataObjectBuilder {
        SdmDataObject::builder()
            .title(self.title.clone())
            .data_oid(self.uid.clone())
            .schema_version(self.schema_version)
            .byte_order(ByteOrder::native())
            .start_time(header.start_time)
            .exec_block_uid(header.exec_block_uid.clone())
            .project(header.exec_block_num, header.scan_num, header.subscan_num)
            .num_antenna(header.num_antenna)
    }

    fn tp_object(
        &self,
        header: &SubscanHeader,
        num_integrations: u32,
        data_struct: DataStruct,
    ) -> SdmDataObject<'static> {
        self.object_builder(header)
            .dimensionality(0)
            .num_time(num_integrations)
            .correlation_mode(CorrelationMode::AutoOnly)
            .spectral_resolution_type(SpectralResolutionType::BasebandWide)
            .processor_type(ProcessorType::Radiometer)
            .data_struct(data_struct)
            .build()
    }

    fn write_header(&mut self, mut object: SdmDataObject<'static>) -> Result<()> {
        let xml = header_to_xml(&mut object)?;
        let project_path = object.project_path()?;
        self.object = object;

        self.mime.preamble(&self.title, &self.uid)?;
        self.mime.header_part(&project_path, &xml)?;
        info!(project_path = %project_path, uid = %self.uid, "global header written");
        Ok(())
    }

    fn write_subset(&mut self, mut subset: SdmDataSubset<'static>, data: &SubsetData<'_>) -> Result<()> {
        let project_path = subset.project_path();
        if !subset.is_aborted() {
            for kind in data.present() {
                subset.set_attachment_ref(kind, format!("{project_path}{}", kind.file_name()));
            }
            if let Some(cross_data) = data.cross_data {
                subset.set_cross_data_type(cross_data.data_type());
            }
        }
        let xml = subset_to_xml(&subset)?;
        let cross_data_type = subset.cross_data_type();
        self.object.append(subset)?;

        self.mime.subset_start(&project_path, &xml)?;
        for kind in data.present() {
            self.mime
                .binary_part(&project_path, kind, cross_data_type, data.bytes_of(kind))?;
        }
        self.mime.subset_end()?;
        debug!(project_path = %project_path, bytes = self.mime.num_bytes(), "data subset written");
        Ok(())
    }
}

impl SdmDataObjectWriter<MemorySink> {
    /// Consumes an in-memory writer and returns the document.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.into_inner().into_inner().freeze()
    }
}

/// Checks that the attachments carrying the products of `mode` are declared.
fn check_required(mode: CorrelationMode, data_struct: &DataStruct) -> Result<()> {
    let required = [
        (mode.has_cross(), AttachmentKind::CrossData),
        (mode.has_auto(), AttachmentKind::AutoData),
    ];
    for (needed, kind) in required {
        if needed && data_struct.declared_size(kind) == 0 {
            warn!(attachment = %kind, correlation_mode = %mode, "required attachment not declared");
            return Err(WriterError::MissingAttachment {
                attachment: kind,
                correlation_mode: mode,
            });
        }
    }
    Ok(())
}

/// Checks that every attachment holds exactly its declared number of values.
fn check_sizes(data_struct: &DataStruct, data: &SubsetData<'_>) -> Result<()> {
    for kind in AttachmentKind::ALL {
        let declared = data_struct.declared_size(kind) as usize;
        let supplied = data.len_of(kind);
        if declared != supplied {
            warn!(attachment = %kind, declared, supplied, "attachment size mismatch");
            return Err(WriterError::SizeMismatch {
                attachment: kind,
                declared,
                supplied,
            });
        }
    }
    Ok(())
}

fn supplied_size(data: &SubsetData<'_>, kind: AttachmentKind) -> Result<u32> {
    let len = data.len_of(kind);
    u32::try_from(len).map_err(|_| WriterError::AttachmentTooLarge {
        attachment: kind,
        len: len as u64,
    })
}

fn product(kind: AttachmentKind, factors: &[u32]) -> Result<u32> {
    let len = factors
        .iter()
        .try_fold(1u64, |acc, factor| acc.checked_mul(u64::from(*factor)))
        .unwrap_or(u64::MAX);
    u32::try_from(len).map_err(|_| WriterError::AttachmentTooLarge {
        attachment: kind,
        len,
    })
}
