//! XML rendering of the global header and of subset headers.
//!
//! The output is the exact form the parser reads back: element order,
//! namespaces and optional elements follow the BDF schema version 2.

use crate::error::Result;
use bdf_core::{
    AttachmentKind, BasebandName, BinaryPart, CorrelationMode, DataStruct, Literal,
    SdmDataObject, SdmDataSubset, SpectralWindow, to_literals,
};
use quick_xml::escape::escape;
use std::fmt::{self, Write};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const NAMESPACES: &str = r#"xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#;

/// Renders the global header of `object`.
///
/// Spectral window tokens are reassigned first, so that every `image`
/// attribute refers to an `id` of the same document.
///
/// # Errors
/// Fails if `object` is invalid.
pub fn header_to_xml(object: &mut SdmDataObject<'_>) -> Result<String> {
    object.data_struct_mut()?.update_spw_tokens();

    let mode = object.correlation_mode()?;
    let mut output = String::with_capacity(2048);
    writeln!(output, "{XML_DECLARATION}")?;
    writeln!(
        output,
        r#"<sdmDataHeader byteOrder="{}" schemaVersion="{}" {NAMESPACES} projectPath="{}">"#,
        object.byte_order()?.literal(),
        object.schema_version()?,
        object.project_path()?,
    )?;
    writeln!(output, "<startTime>{}</startTime>", object.start_time()?)?;
    writeln!(
        output,
        r#"<dataOID xlink:type="locator" xlink:href="{}" xlink:title="{}"/>"#,
        escape(object.data_oid()?),
        escape(object.title()?),
    )?;
    let dimensionality = object.dimensionality()?;
    if dimensionality == 0 {
        writeln!(output, "<numTime>{}</numTime>", object.num_time()?)?;
    } else {
        writeln!(
            output,
            r#"<dimensionality axes="TIM">{dimensionality}</dimensionality>"#
        )?;
    }
    writeln!(
        output,
        r#"<execBlock xlink:href="{}"/>"#,
        escape(object.exec_block_uid()?)
    )?;
    writeln!(output, "<numAntenna>{}</numAntenna>", object.num_antenna()?)?;
    writeln!(output, "<correlationMode>{mode}</correlationMode>")?;
    if let Some(resolution) = object.spectral_resolution_type()? {
        writeln!(output, "<spectralResolution>{resolution}</spectralResolution>")?;
    }
    writeln!(output, "<processorType>{}</processorType>", object.processor_type()?)?;
    write_data_struct(&mut output, object.data_struct()?, mode)?;
    writeln!(output, "</sdmDataHeader>")?;
    Ok(output)
}

fn data_struct_type(mode: CorrelationMode) -> &'static str {
    match mode {
        CorrelationMode::CrossOnly => "CrossDataFullResolution",
        CorrelationMode::AutoOnly => "AutoDataFullResolution",
        CorrelationMode::CrossAndAuto => "CrossAndAutoDataFullResolution",
    }
}

fn write_data_struct(
    output: &mut String,
    data_struct: &DataStruct,
    mode: CorrelationMode,
) -> Result<()> {
    write!(output, r#"<dataStruct xsi:type="{}""#, data_struct_type(mode))?;
    if mode.has_cross() {
        write!(output, r#" apc="{}""#, to_literals(data_struct.apc()))?;
    }
    writeln!(output, ">")?;

    for baseband in data_struct.basebands() {
        writeln!(output, r#"<baseband name="{}">"#, baseband.name())?;
        for spw in baseband.spectral_windows() {
            write_spectral_window(output, spw, baseband.name(), mode)?;
        }
        writeln!(output, "</baseband>")?;
    }

    write_optional_part(output, "flags", data_struct.flags())?;
    write_optional_part(output, "actualTimes", data_struct.actual_times())?;
    write_optional_part(output, "actualDurations", data_struct.actual_durations())?;
    if mode.has_cross() {
        write_part(output, "crossData", data_struct.cross_data(), "")?;
    }
    if mode.has_auto() {
        let auto = data_struct.auto_data();
        let extra = format!(r#" normalized="{}""#, auto.normalized());
        write_part(output, "autoData", auto.part(), &extra)?;
    }
    let zero_lags = data_struct.zero_lags();
    if zero_lags.part().is_declared() {
        let extra = format!(r#" correlatorType="{}""#, zero_lags.correlator_type());
        write_part(output, "zeroLags", zero_lags.part(), &extra)?;
    }
    writeln!(output, "</dataStruct>")?;
    Ok(())
}

fn write_spectral_window(
    output: &mut String,
    spw: &SpectralWindow,
    baseband: BasebandName,
    mode: CorrelationMode,
) -> Result<()> {
    write!(output, r#"<spectralWindow sw="{}" swbb="{baseband}""#, spw.sw())?;
    if !spw.id().is_empty() {
        write!(output, r#" id="{}""#, spw.id())?;
    }
    if !spw.image().is_empty() {
        write!(output, r#" image="{}""#, spw.image())?;
    }
    if mode.has_cross() {
        write!(
            output,
            r#" crossPolProducts="{}""#,
            to_literals(spw.cross_pol_products(mode)?)
        )?;
    }
    if mode.has_auto() {
        write!(
            output,
            r#" sdPolProducts="{}""#,
            to_literals(spw.sd_pol_products(mode)?)
        )?;
    }
    if mode.has_cross() {
        write!(output, r#" scaleFactor="{}""#, spw.scale_factor(mode)?)?;
    }
    writeln!(
        output,
        r#" numSpectralPoint="{}" numBin="{}" sideband="{}"/>"#,
        spw.num_spectral_point(),
        spw.num_bin(),
        spw.sideband(),
    )?;
    Ok(())
}

fn write_optional_part(output: &mut String, name: &str, part: &BinaryPart) -> fmt::Result {
    if part.is_declared() {
        write_part(output, name, part, "")?;
    }
    Ok(())
}

fn write_part(output: &mut String, name: &str, part: &BinaryPart, extra: &str) -> fmt::Result {
    writeln!(
        output,
        r#"<{name} size="{}" axes="{}"{extra}/>"#,
        part.size(),
        to_literals(part.axes()),
    )
}

fn subset_type(mode: CorrelationMode) -> &'static str {
    match mode {
        CorrelationMode::CrossOnly => "BinaryCrossData",
        CorrelationMode::AutoOnly => "BinaryAutoData",
        CorrelationMode::CrossAndAuto => "BinaryCrossAndAutoData",
    }
}

/// Renders the header of one data subset.
///
/// # Errors
/// Fails only if formatting fails.
pub fn subset_to_xml(subset: &SdmDataSubset<'_>) -> Result<String> {
    let mut output = String::with_capacity(512);
    writeln!(output, "{XML_DECLARATION}")?;
    writeln!(
        output,
        r#"<sdmDataSubsetHeader {NAMESPACES} xsi:type="{}" projectPath="{}">"#,
        subset_type(subset.context().correlation_mode),
        subset.project_path(),
    )?;
    writeln!(output, "<schedulePeriodTime>")?;
    writeln!(output, "<time>{}</time>", subset.time())?;
    writeln!(output, "<interval>{}</interval>", subset.interval())?;
    writeln!(output, "</schedulePeriodTime>")?;
    writeln!(output, r#"<dataStruct ref="sdmDataHeader"/>"#)?;

    if let Some(abort) = subset.aborted() {
        writeln!(output, "<abortObservation>")?;
        writeln!(output, "<stopTime>{}</stopTime>", abort.time)?;
        writeln!(output, "<abortReason>{}</abortReason>", escape(&abort.reason))?;
        writeln!(output, "</abortObservation>")?;
    } else {
        for (kind, href) in subset.attachment_refs() {
            write!(output, r#"<{} xlink:href="{}""#, kind.name(), escape(href))?;
            if kind == AttachmentKind::CrossData {
                if let Some(data_type) = subset.cross_data_type() {
                    write!(output, r#" type="{}""#, data_type.literal())?;
                }
            }
            writeln!(output, "/>")?;
        }
    }
    writeln!(output, "</sdmDataSubsetHeader>")?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdf_core::{
        AutoDataBinaryPart, AxisName, Baseband, BasebandName, CorrelatorType, CrossDataType,
        NetSideband, ProcessorType, SpectralResolutionType, StokesParameter, ZeroLagsBinaryPart,
    };

    fn cross_object() -> SdmDataObject<'static> {
        let spw = |sideband| {
            SpectralWindow::cross(
                vec![StokesParameter::Xx, StokesParameter::Yy],
                1.0,
                64,
                1,
                sideband,
            )
        };
        let mut data_struct = DataStruct::new(vec![Baseband::new(
            BasebandName::Bb1,
            vec![spw(NetSideband::Usb), spw(NetSideband::Lsb)],
        )])
        .with_flags(BinaryPart::new(12, vec![AxisName::Bal, AxisName::Ant]))
        .with_cross_data(BinaryPart::new(768, vec![AxisName::Bal, AxisName::Spw]))
        .with_zero_lags(ZeroLagsBinaryPart::new(8, vec![AxisName::Ant], CorrelatorType::Xf));
        data_struct.image_spw(0, 0, 0, 1).expect("Failed to marry windows");

        SdmDataObject::builder()
            .title("a & b")
            .data_oid("uid://X1/X2/X3")
            .exec_block_uid("uid://X1/X2/X0")
            .project(1, 2, 3)
            .num_antenna(4)
            .start_time(4_000_000_000)
            .dimensionality(1)
            .correlation_mode(CorrelationMode::CrossOnly)
            .spectral_resolution_type(SpectralResolutionType::FullResolution)
            .processor_type(ProcessorType::Correlator)
            .data_struct(data_struct)
            .build()
    }

    #[test]
    fn test_header_to_xml() {
        let mut object = cross_object();
        let xml = header_to_xml(&mut object).expect("Failed to render header");

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"projectPath="1/2/3/""#));
        assert!(xml.contains(r#"xlink:title="a &amp; b""#));
        assert!(xml.contains(r#"<dimensionality axes="TIM">1</dimensionality>"#));
        assert!(xml.contains(r#"<dataStruct xsi:type="CrossDataFullResolution" apc="">"#));
        assert!(xml.contains(r#"<spectralWindow sw="1" swbb="BB_1" id="spw_1" image="spw_2""#));
        assert!(xml.contains(r#"<spectralWindow sw="2" swbb="BB_1" id="spw_2" crossPolProducts"#));
        assert!(xml.contains(r#"<flags size="12" axes="BAL ANT"/>"#));
        assert!(xml.contains(r#"<zeroLags size="8" axes="ANT" correlatorType="XF"/>"#));
        assert!(!xml.contains("actualTimes"));
        assert!(!xml.contains("autoData"));
        assert!(!xml.contains("sdPolProducts"));

        let flags = xml.find("<flags").expect("flags");
        let cross = xml.find("<crossData").expect("crossData");
        let zero_lags = xml.find("<zeroLags").expect("zeroLags");
        assert!(flags < cross && cross < zero_lags);
    }

    #[test]
    fn test_header_to_xml_num_time() {
        let spw = SpectralWindow::auto(vec![StokesParameter::Xx], 1, 1, NetSideband::Nosb);
        let mut object = SdmDataObject::builder()
            .project(5, 6, 7)
            .num_time(100)
            .correlation_mode(CorrelationMode::AutoOnly)
            .processor_type(ProcessorType::Radiometer)
            .data_struct(
                DataStruct::new(vec![Baseband::new(BasebandName::Bb1, vec![spw])])
                    .with_auto_data(AutoDataBinaryPart::new(400, vec![AxisName::Tim], true)),
            )
            .build();
        let xml = header_to_xml(&mut object).expect("Failed to render header");

        assert!(xml.contains("<numTime>100</numTime>"));
        assert!(!xml.contains("<dimensionality"));
        assert!(!xml.contains("apc="));
        assert!(!xml.contains("<spectralResolution>"));
        assert!(xml.contains(r#"<autoData size="400" axes="TIM" normalized="true"/>"#));
    }

    #[test]
    fn test_header_to_xml_invalid_object() {
        let mut object = SdmDataObject::default();
        assert!(header_to_xml(&mut object).is_err());
    }

    #[test]
    fn test_subset_to_xml() {
        let object = cross_object();
        let context = object.subset_context().expect("Failed to get context");
        let mut subset = SdmDataSubset::new(context);
        subset.set_integration_num(4);
        subset.set_schedule(1000, 20);
        subset.set_cross_data_type(CrossDataType::Int32);
        subset.set_attachment_ref(AttachmentKind::CrossData, "1/2/3/4/crossData.bin");
        subset.set_attachment_ref(AttachmentKind::Flags, "1/2/3/4/flags.bin");

        let xml = subset_to_xml(&subset).expect("Failed to render subset");
        assert!(xml.contains(r#"xsi:type="BinaryCrossData" projectPath="1/2/3/4/""#));
        assert!(xml.contains("<time>1000</time>"));
        assert!(xml.contains(r#"<dataStruct ref="sdmDataHeader"/>"#));
        assert!(xml.contains(r#"<crossData xlink:href="1/2/3/4/crossData.bin" type="INT32_TYPE"/>"#));
        assert!(xml.find("<flags").expect("flags") < xml.find("<crossData").expect("crossData"));
    }

    #[test]
    fn test_subset_to_xml_aborted() {
        let object = cross_object();
        let mut subset = SdmDataSubset::new(object.subset_context().expect("Failed to get context"));
        subset.set_integration_num(2);
        subset.abort(1500, "wind > limit");

        let xml = subset_to_xml(&subset).expect("Failed to render subset");
        assert!(xml.contains("<stopTime>1500</stopTime>"));
        assert!(xml.contains("<abortReason>wind &gt; limit</abortReason>"));
        assert!(!xml.contains("xlink:href"));
    }
}
