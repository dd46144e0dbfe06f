//! Writes a small correlator document in memory and parses its headers back.
//!
//! Run with: `RUST_LOG=debug cargo run --example write_and_parse`

use bdf::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const NUM_ANTENNA: u32 = 3;
const NUM_BASELINE: u32 = NUM_ANTENNA * (NUM_ANTENNA - 1) / 2;
const NUM_CHANNEL: u32 = 8;

/// Returns the body of the XML part stored at `location`.
fn xml_part<'d>(document: &'d str, location: &str) -> Option<&'d str> {
    let marker = format!("Content-Location: {location}\n\n");
    let start = document.find(&marker)? + marker.len();
    let end = start + document[start..].find("\n--")?;
    Some(&document[start..end])
}

fn data_struct() -> Result<DataStruct, ModelError> {
    let spw = |sideband| {
        SpectralWindow::cross(
            vec![StokesParameter::Xx, StokesParameter::Yy],
            1.0,
            NUM_CHANNEL,
            1,
            sideband,
        )
    };
    let mut data_struct = DataStruct::new(vec![
        Baseband::new(
            BasebandName::Bb1,
            vec![spw(NetSideband::Usb), spw(NetSideband::Lsb)],
        ),
        Baseband::new(BasebandName::Bb2, vec![spw(NetSideband::Usb)]),
    ])
    .with_apc(vec![AtmPhaseCorrection::ApUncorrected])
    .with_flags(BinaryPart::new(NUM_BASELINE, vec![AxisName::Bal]))
    .with_cross_data(BinaryPart::new(
        NUM_BASELINE * 3 * NUM_CHANNEL * 2,
        vec![AxisName::Bal, AxisName::Bab, AxisName::Spw, AxisName::Spp, AxisName::Pol],
    ));
    data_struct.image_spw(0, 0, 0, 1)?;
    Ok(data_struct)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let header = SubscanHeader::new(4_000_000_000, "uid://X1/X2/X0", 1, 2, 3, NUM_ANTENNA);
    let flags = vec![0u32; NUM_BASELINE as usize];
    let cross: Vec<f32> = (0..NUM_BASELINE * 3 * NUM_CHANNEL * 2)
        .map(|i| i as f32 * 0.5)
        .collect();

    let mut writer = WriterBuilder::new("uid://X1/X2/X3", "write_and_parse demo").to_memory();
    writer.corr_data_header(
        &header,
        CorrelationMode::CrossOnly,
        SpectralResolutionType::FullResolution,
        data_struct()?,
    )?;
    for integration in 1..=3u32 {
        let data = SubsetData {
            flags: &flags,
            cross_data: Some(CrossData::Float32(&cross)),
            ..SubsetData::default()
        };
        writer.add_integration(integration, 1000 + u64::from(integration) * 16, 16, &data)?;
    }
    let total = writer.done()?;
    info!(bytes = total, "document written");

    let document = writer.into_bytes();
    let text = String::from_utf8_lossy(&document);

    let header_xml = xml_part(&text, "1/2/3/desc.xml").ok_or("global header part not found")?;
    let object = parse_header(header_xml)?;
    println!("{object}");

    let data_struct = object.data_struct()?;
    for (from, to) in data_struct.image_edges() {
        println!(
            "image: BB{}/spw{} -> BB{}/spw{}",
            from.baseband, from.spw, to.baseband, to.spw
        );
    }

    for integration in 1..=3u32 {
        let location = format!("1/2/3/{integration}/desc.xml");
        let subset_xml = xml_part(&text, &location).ok_or("subset header part not found")?;
        let subset = parse_corr_subset_header(subset_xml, &object)?;
        println!(
            "{}: time={} crossData={}",
            subset.project_path(),
            subset.time(),
            subset
                .attachment_ref(AttachmentKind::CrossData)
                .unwrap_or("(none)")
        );
    }

    Ok(())
}
