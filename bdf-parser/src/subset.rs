//! Parsers for data subset headers (`sdmDataSubsetHeader`).
//!
//! Both parsers need the already parsed global header: it decides the
//! project path arity and which attachments must be present, and the
//! subset's execBlock/scan/subscan triple must agree with it.

use crate::error::{ParserError, Result};
use crate::node::{Children, Node, parse_document};
use bdf_core::{
    AttachmentKind, CrossDataType, ProjectPath, SdmDataObject, SdmDataSubset,
    SpectralResolutionType, SubsetContext,
};
use std::path::Path;
use tracing::debug;

/// Parses a correlator data subset header from a file.
///
/// # Errors
/// Returns `ParserError` if the file cannot be read or the header is invalid.
pub fn parse_corr_subset_header_file<'a>(
    path: impl AsRef<Path>,
    owner: &SdmDataObject<'_>,
) -> Result<SdmDataSubset<'a>> {
    let xml = std::fs::read_to_string(path)?;
    parse_corr_subset_header(&xml, owner)
}

/// Parses a correlator data subset header.
///
/// The project path has 5 components under CHANNEL_AVERAGE and 4 otherwise.
/// The returned subset carries attachment locations but no payload.
///
/// # Errors
/// Returns `ParserError` if the header is invalid or does not belong to `owner`.
pub fn parse_corr_subset_header<'a>(
    xml: &str,
    owner: &SdmDataObject<'_>,
) -> Result<SdmDataSubset<'a>> {
    let context = owner.subset_context()?;
    if context.dimensionality == 0 {
        return Err(ParserError::invalid_structure(
            "the global header does not describe correlator data",
        ));
    }

    let root = parse_document(xml)?;
    root.expect_name("sdmDataSubsetHeader")?;
    let arity = if context.spectral_resolution_type == Some(SpectralResolutionType::ChannelAverage)
    {
        5
    } else {
        4
    };
    let path = check_project_path(&root, &context, arity)?;

    let mut subset = SdmDataSubset::new(context);
    subset.set_integration_num(path.integration_num().unwrap_or_default());
    subset.set_subintegration_num(path.subintegration_num().unwrap_or_default());

    let mut children = root.children();
    parse_schedule(&mut children, &mut subset)?;

    if let Some(abort) = children.optional("abortObservation") {
        let mut fields = abort.children();
        let stop_time: u64 = fields.expect("stopTime")?.number()?;
        let reason = fields.expect("abortReason")?.text().to_string();
        fields.finish()?;
        subset.abort(stop_time, reason);
    } else {
        parse_leading_refs(&mut children, &mut subset)?;
        let mode = context.correlation_mode;
        if mode.has_cross() {
            let cross = children.expect(AttachmentKind::CrossData.name())?;
            subset.set_attachment_ref(AttachmentKind::CrossData, cross.required_attr("href")?);
            let data_type: CrossDataType = cross.literal_attr("type")?;
            subset.set_cross_data_type(data_type);
        }
        if mode.has_auto() {
            parse_ref(children.expect(AttachmentKind::AutoData.name())?, &mut subset)?;
        }
        if let Some(zero_lags) = children.optional(AttachmentKind::ZeroLags.name()) {
            parse_ref(zero_lags, &mut subset)?;
        }
    }
    children.finish()?;

    debug!(
        project_path = %subset.path(),
        aborted = subset.is_aborted(),
        "parsed correlator subset header"
    );
    Ok(subset)
}

/// Parses a total power (or WVR) data subset header from a file.
///
/// # Errors
/// Returns `ParserError` if the file cannot be read or the header is invalid.
pub fn parse_tp_subset_header_file<'a>(
    path: impl AsRef<Path>,
    owner: &SdmDataObject<'_>,
) -> Result<SdmDataSubset<'a>> {
    let xml = std::fs::read_to_string(path)?;
    parse_tp_subset_header(&xml, owner)
}

/// Parses a total power (or WVR) data subset header.
///
/// The project path has 3 components. autoData is mandatory.
///
/// # Errors
/// Returns `ParserError` if the header is invalid or does not belong to `owner`.
pub fn parse_tp_subset_header<'a>(
    xml: &str,
    owner: &SdmDataObject<'_>,
) -> Result<SdmDataSubset<'a>> {
    let context = owner.subset_context()?;
    if context.dimensionality != 0 {
        return Err(ParserError::invalid_structure(
            "the global header does not describe total power data",
        ));
    }

    let root = parse_document(xml)?;
    root.expect_name("sdmDataSubsetHeader")?;
    check_project_path(&root, &context, 3)?;

    let mut subset = SdmDataSubset::new(context);
    let mut children = root.children();
    parse_schedule(&mut children, &mut subset)?;
    parse_leading_refs(&mut children, &mut subset)?;
    parse_ref(children.expect(AttachmentKind::AutoData.name())?, &mut subset)?;
    children.finish()?;

    debug!(project_path = %subset.path(), "parsed total power subset header");
    Ok(subset)
}

fn check_project_path(root: &Node, context: &SubsetContext, arity: usize) -> Result<ProjectPath> {
    let (path, raw) = root.project_path(arity)?;
    let owner = context.project_path();
    if !path.same_subscan(&owner) {
        return Err(ParserError::ProjectPathMismatch {
            subset: raw.to_string(),
            owner: owner.to_string(),
        });
    }
    Ok(path)
}

/// `schedulePeriodTime{time, interval}` followed by the `dataStruct` reference.
fn parse_schedule(children: &mut Children<'_>, subset: &mut SdmDataSubset<'_>) -> Result<()> {
    let schedule = children.expect("schedulePeriodTime")?;
    let mut fields = schedule.children();
    let time = fields.expect("time")?.number()?;
    let interval = fields.expect("interval")?.number()?;
    fields.finish()?;
    subset.set_schedule(time, interval);

    children.expect("dataStruct")?.required_attr("ref")?;
    Ok(())
}

/// Optional flags, actualTimes and actualDurations references.
fn parse_leading_refs(children: &mut Children<'_>, subset: &mut SdmDataSubset<'_>) -> Result<()> {
    for kind in [
        AttachmentKind::Flags,
        AttachmentKind::ActualTimes,
        AttachmentKind::ActualDurations,
    ] {
        if let Some(node) = children.optional(kind.name()) {
            parse_ref(node, subset)?;
        }
    }
    Ok(())
}

fn parse_ref(node: &Node, subset: &mut SdmDataSubset<'_>) -> Result<()> {
    let kind = AttachmentKind::from_name(&node.name).ok_or_else(|| ParserError::UnexpectedElement {
        element: node.name.clone(),
        context: "sdmDataSubsetHeader".to_string(),
    })?;
    subset.set_attachment_ref(kind, node.required_attr("href")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdf_core::{
        Baseband, BasebandName, BinaryPart, CorrelationMode, DataStruct, NetSideband,
        ProcessorType, SpectralWindow, StokesParameter,
    };
    use std::io::Write;

    fn owner<'a>(resolution: SpectralResolutionType, mode: CorrelationMode) -> SdmDataObject<'a> {
        let tp = resolution == SpectralResolutionType::BasebandWide;
        let spw = SpectralWindow::cross_and_auto(
            vec![StokesParameter::Xx],
            vec![StokesParameter::Xx],
            1.0,
            8,
            1,
            NetSideband::Usb,
        );
        SdmDataObject::builder()
            .project(1, 2, 3)
            .dimensionality(u32::from(!tp))
            .correlation_mode(mode)
            .spectral_resolution_type(resolution)
            .processor_type(if tp {
                ProcessorType::Radiometer
            } else {
                ProcessorType::Correlator
            })
            .data_struct(
                DataStruct::new(vec![Baseband::new(BasebandName::Bb1, vec![spw])])
                    .with_flags(BinaryPart::new(4, Vec::new())),
            )
            .build()
    }

    fn corr_subset(project_path: &str, body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<sdmDataSubsetHeader xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="BinaryCrossData" projectPath="{project_path}">
<schedulePeriodTime>
<time>1000</time>
<interval>20</interval>
</schedulePeriodTime>
<dataStruct ref="sdmDataHeader"/>
{body}
</sdmDataSubsetHeader>"#
        )
    }

    const CROSS_REFS: &str = r#"<flags xlink:href="1/2/3/4/flags.bin"/>
<crossData xlink:href="1/2/3/4/crossData.bin" type="INT32_TYPE"/>
<zeroLags xlink:href="1/2/3/4/zeroLags.bin"/>"#;

    #[test]
    fn test_parse_corr_subset_header() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        let subset = parse_corr_subset_header(&corr_subset("1/2/3/4/", CROSS_REFS), &owner)
            .expect("Failed to parse subset header");

        assert_eq!(subset.project_path(), "1/2/3/4/");
        assert_eq!(subset.integration_num(), 4);
        assert_eq!(subset.time(), 1000);
        assert_eq!(subset.interval(), 20);
        assert_eq!(subset.cross_data_type(), Some(CrossDataType::Int32));
        assert_eq!(
            subset.attachment_ref(AttachmentKind::Flags),
            Some("1/2/3/4/flags.bin")
        );
        assert_eq!(
            subset.attachment_ref(AttachmentKind::ZeroLags),
            Some("1/2/3/4/zeroLags.bin")
        );
        assert_eq!(subset.attachment_ref(AttachmentKind::ActualTimes), None);
        assert!(!subset.is_aborted());
    }

    #[test]
    fn test_corr_subset_arity_follows_resolution() {
        let full = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        assert!(matches!(
            parse_corr_subset_header(&corr_subset("1/2/3/", CROSS_REFS), &full),
            Err(ParserError::BadProjectPath {
                expected_arity: 4,
                ..
            })
        ));
        assert!(parse_corr_subset_header(&corr_subset("1/2/3/4/5/", CROSS_REFS), &full).is_err());

        let average = owner(SpectralResolutionType::ChannelAverage, CorrelationMode::CrossOnly);
        let subset = parse_corr_subset_header(&corr_subset("1/2/3/4/5/", CROSS_REFS), &average)
            .expect("Failed to parse subintegration header");
        assert_eq!(subset.integration_num(), 4);
        assert_eq!(subset.subintegration_num(), 5);
        assert_eq!(subset.project_path(), "1/2/3/4/5/");
    }

    #[test]
    fn test_project_path_mismatch() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        let err = parse_corr_subset_header(&corr_subset("1/2/4/1/", CROSS_REFS), &owner)
            .expect_err("Foreign subset accepted");
        assert!(matches!(
            err,
            ParserError::ProjectPathMismatch { ref subset, ref owner }
                if subset == "1/2/4/1/" && owner == "1/2/3/"
        ));
    }

    #[test]
    fn test_missing_mode_attachment() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossAndAuto);
        let err = parse_corr_subset_header(&corr_subset("1/2/3/4/", CROSS_REFS), &owner)
            .expect_err("Missing autoData accepted");
        assert!(matches!(
            err,
            ParserError::MissingElement { ref expected, .. } if expected == "autoData"
        ));
    }

    #[test]
    fn test_unknown_cross_data_type() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        let body = CROSS_REFS.replace("INT32_TYPE", "INT64_TYPE");
        assert!(matches!(
            parse_corr_subset_header(&corr_subset("1/2/3/4/", &body), &owner),
            Err(ParserError::UnknownLiteral { .. })
        ));
    }

    #[test]
    fn test_aborted_subset() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        let body = "<abortObservation>\n<stopTime>1010</stopTime>\n<abortReason>antenna &lt;DV01&gt; lost</abortReason>\n</abortObservation>";
        let subset = parse_corr_subset_header(&corr_subset("1/2/3/7/", body), &owner)
            .expect("Failed to parse aborted subset");
        assert!(subset.is_aborted());
        let abort = subset.aborted().expect("Abort record missing");
        assert_eq!(abort.time, 1010);
        assert_eq!(abort.reason, "antenna <DV01> lost");
    }

    #[test]
    fn test_parse_tp_subset_header() {
        let owner = owner(SpectralResolutionType::BasebandWide, CorrelationMode::AutoOnly);
        let xml = r#"<sdmDataSubsetHeader xmlns:xlink="http://www.w3.org/1999/xlink" projectPath="1/2/3/">
<schedulePeriodTime><time>500</time><interval>1000</interval></schedulePeriodTime>
<dataStruct ref="sdmDataHeader"/>
<flags xlink:href="1/2/3/flags.bin"/>
<autoData xlink:href="1/2/3/autoData.bin"/>
</sdmDataSubsetHeader>"#;
        let subset = parse_tp_subset_header(xml, &owner).expect("Failed to parse TP subset");
        assert_eq!(subset.project_path(), "1/2/3/");
        assert_eq!(subset.time(), 500);
        assert_eq!(
            subset.attachment_ref(AttachmentKind::AutoData),
            Some("1/2/3/autoData.bin")
        );

        let without_auto = xml.replace("<autoData xlink:href=\"1/2/3/autoData.bin\"/>\n", "");
        assert!(matches!(
            parse_tp_subset_header(&without_auto, &owner),
            Err(ParserError::MissingElement { .. })
        ));
    }

    #[test]
    fn test_document_kind_must_match_owner() {
        let tp = owner(SpectralResolutionType::BasebandWide, CorrelationMode::AutoOnly);
        assert!(matches!(
            parse_corr_subset_header(&corr_subset("1/2/3/4/", CROSS_REFS), &tp),
            Err(ParserError::InvalidStructure { .. })
        ));

        let invalid = SdmDataObject::default();
        assert!(matches!(
            parse_tp_subset_header("<sdmDataSubsetHeader/>", &invalid),
            Err(ParserError::Model(_))
        ));
    }

    #[test]
    fn test_parse_corr_subset_header_file() {
        let owner = owner(SpectralResolutionType::FullResolution, CorrelationMode::CrossOnly);
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(corr_subset("1/2/3/9/", CROSS_REFS).as_bytes())
            .expect("Failed to write subset header");
        let subset =
            parse_corr_subset_header_file(file.path(), &owner).expect("Failed to parse file");
        assert_eq!(subset.integration_num(), 9);
    }
}
