//! Parser for the global header (`sdmDataHeader`) of a BDF document.

use crate::error::{ParserError, Result};
use crate::node::{Node, parse_document};
use bdf_core::{
    AtmPhaseCorrection, AutoDataBinaryPart, Baseband, BinaryPart, ByteOrder, CorrelationMode,
    CorrelatorType, DataStruct, Literal, ProcessorType, SCHEMA_VERSION, SdmDataObject,
    SpectralResolutionType, SpectralWindow, SpwCoord, ZeroLagsBinaryPart,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parses a global header from a file.
///
/// # Errors
/// Returns `ParserError` if the file cannot be read or the header is invalid.
pub fn parse_header_file<'a>(path: impl AsRef<Path>) -> Result<SdmDataObject<'a>> {
    let xml = std::fs::read_to_string(path)?;
    parse_header(&xml)
}

/// Parses a global header from a string.
///
/// The returned object is valid and holds no data subsets.
///
/// # Errors
/// Returns `ParserError` if the XML is malformed, elements are missing or
/// out of order, a literal is unknown, the project path is not of the form
/// `N/N/N/`, or the spectral window image graph cannot be resolved.
pub fn parse_header<'a>(xml: &str) -> Result<SdmDataObject<'a>> {
    let root = parse_document(xml)?;
    root.expect_name("sdmDataHeader")?;

    let byte_order = match root.attr("byteOrder") {
        Some(value) => ByteOrder::from_literal(value)
            .ok_or_else(|| ParserError::unknown_literal(value, "sdmDataHeader"))?,
        None => ByteOrder::native(),
    };
    let schema_version = match root.attr("schemaVersion") {
        Some(_) => root.number_attr("schemaVersion")?,
        None => SCHEMA_VERSION,
    };
    let (project_path, _) = root.project_path(3)?;

    let mut children = root.children();
    let start_time: u64 = children.expect("startTime")?.number()?;

    let data_oid = children.expect("dataOID")?;
    let uid = data_oid.required_attr("href")?;
    let title = data_oid.attr("title").unwrap_or_default();

    let dim = children.expect_one_of(&["dimensionality", "numTime"])?;
    let (dimensionality, num_time) = if dim.name == "numTime" {
        (0, dim.number()?)
    } else {
        (dim.number()?, 0)
    };

    let exec_block_uid = children.expect("execBlock")?.required_attr("href")?;
    let num_antenna: u32 = children.expect("numAntenna")?.number()?;
    let correlation_mode: CorrelationMode = children.expect("correlationMode")?.literal()?;
    let spectral_resolution: Option<SpectralResolutionType> = children
        .optional("spectralResolution")
        .map(Node::literal)
        .transpose()?;
    let processor_type: ProcessorType = children.expect("processorType")?.literal()?;
    let data_struct = parse_data_struct(
        children.expect("dataStruct")?,
        correlation_mode,
        processor_type,
    )?;
    children.finish()?;

    let mut builder = SdmDataObject::builder()
        .title(title)
        .byte_order(byte_order)
        .schema_version(schema_version)
        .start_time(start_time)
        .data_oid(uid)
        .dimensionality(dimensionality)
        .num_time(num_time)
        .exec_block_uid(exec_block_uid)
        .project(
            project_path.exec_block_num(),
            project_path.scan_num(),
            project_path.subscan_num(),
        )
        .num_antenna(num_antenna)
        .correlation_mode(correlation_mode)
        .processor_type(processor_type)
        .data_struct(data_struct);
    if let Some(resolution) = spectral_resolution {
        builder = builder.spectral_resolution_type(resolution);
    }

    debug!(project_path = %project_path, uid, "parsed global header");
    Ok(builder.build())
}

/// Parses the `dataStruct` element and resolves its image graph.
fn parse_data_struct(
    node: &Node,
    mode: CorrelationMode,
    processor_type: ProcessorType,
) -> Result<DataStruct> {
    let apc: Vec<AtmPhaseCorrection> = match node.attr("apc") {
        Some(_) if !mode.has_cross() => {
            return Err(ParserError::UnexpectedAttribute {
                element: node.name.clone(),
                attribute: "apc".to_string(),
                reason: format!("correlation mode is {mode}"),
            });
        }
        Some(_) => node.literals_attr("apc")?,
        None => Vec::new(),
    };

    let mut children = node.children();
    let mut basebands = Vec::new();
    while let Some(bb) = children.optional("baseband") {
        basebands.push(parse_baseband(bb, mode)?);
    }

    let mut data_struct = DataStruct::new(basebands).with_apc(apc);
    if let Some(flags) = children.optional("flags") {
        data_struct = data_struct.with_flags(parse_binary_part(flags)?);
    }
    if let Some(times) = children.optional("actualTimes") {
        data_struct = data_struct.with_actual_times(parse_binary_part(times)?);
    }
    if let Some(durations) = children.optional("actualDurations") {
        data_struct = data_struct.with_actual_durations(parse_binary_part(durations)?);
    }
    if mode.has_cross() {
        data_struct = data_struct.with_cross_data(parse_binary_part(children.expect("crossData")?)?);
    }
    if mode.has_auto() {
        let auto = children.expect("autoData")?;
        let part = parse_binary_part(auto)?;
        let normalized = auto.bool_attr("normalized")?.unwrap_or(false);
        data_struct = data_struct.with_auto_data(AutoDataBinaryPart::new(
            part.size(),
            part.axes().to_vec(),
            normalized,
        ));
    }
    if let Some(zero_lags) = children.optional("zeroLags") {
        data_struct = data_struct.with_zero_lags(parse_zero_lags(zero_lags, processor_type)?);
    }
    children.finish()?;

    resolve_images(&mut data_struct)?;
    Ok(data_struct)
}

fn parse_baseband(node: &Node, mode: CorrelationMode) -> Result<Baseband> {
    let name = node.literal_attr("name")?;
    let mut children = node.children();
    let mut windows = Vec::new();
    while let Some(spw) = children.optional("spectralWindow") {
        windows.push(parse_spectral_window(spw, mode)?);
    }
    children.finish()?;
    Ok(Baseband::new(name, windows))
}

/// Parses a `spectralWindow`. Required attributes depend on the mode; `swbb`
/// repeats the baseband name and is not read.
fn parse_spectral_window(node: &Node, mode: CorrelationMode) -> Result<SpectralWindow> {
    let num_spectral_point = node.number_attr("numSpectralPoint")?;
    let num_bin = node.number_attr("numBin")?;
    let sideband = node.literal_attr("sideband")?;

    let mut spw = match mode {
        CorrelationMode::CrossOnly => SpectralWindow::cross(
            node.literals_attr("crossPolProducts")?,
            node.number_attr("scaleFactor")?,
            num_spectral_point,
            num_bin,
            sideband,
        ),
        CorrelationMode::AutoOnly => SpectralWindow::auto(
            node.literals_attr("sdPolProducts")?,
            num_spectral_point,
            num_bin,
            sideband,
        ),
        CorrelationMode::CrossAndAuto => SpectralWindow::cross_and_auto(
            node.literals_attr("crossPolProducts")?,
            node.literals_attr("sdPolProducts")?,
            node.number_attr("scaleFactor")?,
            num_spectral_point,
            num_bin,
            sideband,
        ),
    };

    spw.set_sw(node.required_attr("sw")?)?;
    if let Some(id) = node.attr("id") {
        spw.set_id(id)?;
    }
    if let Some(image) = node.attr("image") {
        spw.set_image(image)?;
    }
    Ok(spw)
}

fn parse_binary_part(node: &Node) -> Result<BinaryPart> {
    Ok(BinaryPart::new(
        node.number_attr("size")?,
        node.literals_attr("axes")?,
    ))
}

/// zeroLags are legal only for a correlator that is not FX.
fn parse_zero_lags(node: &Node, processor_type: ProcessorType) -> Result<ZeroLagsBinaryPart> {
    if processor_type != ProcessorType::Correlator {
        return Err(ParserError::IllegalZeroLags {
            reason: format!("the processor type is {processor_type}"),
        });
    }
    let correlator_type: CorrelatorType = node.literal_attr("correlatorType")?;
    if correlator_type == CorrelatorType::Fx {
        return Err(ParserError::IllegalZeroLags {
            reason: format!("the correlator type is {correlator_type}"),
        });
    }
    let part = parse_binary_part(node)?;
    Ok(ZeroLagsBinaryPart::new(
        part.size(),
        part.axes().to_vec(),
        correlator_type,
    ))
}

/// Turns `id`/`image` tokens into image graph edges.
///
/// The first pass maps every `id` to its coordinate, the second resolves
/// every `image` through that map.
fn resolve_images(data_struct: &mut DataStruct) -> Result<()> {
    let mut ids: HashMap<String, SpwCoord> = HashMap::new();
    let mut images: Vec<(SpwCoord, String)> = Vec::new();

    for (ibb, bb) in data_struct.basebands().iter().enumerate() {
        for (ispw, spw) in bb.spectral_windows().iter().enumerate() {
            let coord = SpwCoord::new(ibb, ispw);
            if !spw.id().is_empty() && ids.insert(spw.id().to_string(), coord).is_some() {
                return Err(ParserError::DuplicateSpwId {
                    token: spw.id().to_string(),
                });
            }
            if !spw.image().is_empty() {
                images.push((coord, spw.image().to_string()));
            }
        }
    }

    for (from, token) in &images {
        let to = ids
            .get(token)
            .ok_or_else(|| ParserError::DanglingImageReference {
                token: token.clone(),
            })?;
        data_struct.image_spw(from.baseband, from.spw, to.baseband, to.spw)?;
    }

    if !images.is_empty() {
        debug!(edges = images.len(), "resolved spectral window images");
    }
    Ok(())
}
