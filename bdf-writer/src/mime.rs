//! MIME multipart framing.
//!
//! The document is `multipart/mixed` with the global header as first part.
//! Every data subset is a nested `Multipart/Related` part made of its XML
//! header followed by one binary part per attachment.

use bdf_core::{AttachmentKind, CrossDataType, Literal};
use std::io::{self, Write};
use tracing::trace;

/// Default boundary of the outer `multipart/mixed` document.
pub const DEFAULT_OUTER_BOUNDARY: &str = "MIME_boundary-1";
/// Default boundary of the nested `Multipart/Related` subsets.
pub const DEFAULT_INNER_BOUNDARY: &str = "MIME_boundary-2";

const EOL: &str = "\n";

/// Writes MIME parts to a sink and counts the emitted bytes.
#[derive(Debug)]
pub struct MimeWriter<W: Write> {
    sink: W,
    outer_boundary: String,
    inner_boundary: String,
    num_bytes: u64,
}

impl<W: Write> MimeWriter<W> {
    /// Creates a MIME writer over `sink`.
    pub fn new(sink: W, outer_boundary: impl Into<String>, inner_boundary: impl Into<String>) -> Self {
        Self {
            sink,
            outer_boundary: outer_boundary.into(),
            inner_boundary: inner_boundary.into(),
            num_bytes: 0,
        }
    }

    /// Number of bytes emitted since creation or the last reset.
    #[must_use]
    pub const fn num_bytes(&self) -> u64 {
        self.num_bytes
    }

    /// Resets the byte counter.
    pub fn reset_num_bytes(&mut self) {
        self.num_bytes = 0;
    }

    /// The underlying sink.
    #[must_use]
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes)?;
        self.num_bytes += bytes.len() as u64;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.write_bytes(line.as_bytes())?;
        self.write_bytes(EOL.as_bytes())
    }

    /// Writes the document preamble.
    ///
    /// The `Content-Location` carries the archive UID without its `uid:`
    /// scheme prefix.
    pub fn preamble(&mut self, title: &str, uid: &str) -> io::Result<()> {
        let uid = uid.strip_prefix("uid:").unwrap_or(uid);
        self.write_line("MIME-Version: 1.0")?;
        self.write_line(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"; type=\"text/xml\"",
            self.outer_boundary
        ))?;
        self.write_line(&format!("Content-Description: {title}"))?;
        self.write_line(&format!("Content-Location: uid:{uid}"))?;
        self.write_line("")
    }

    /// Writes the global header as the first part of the document.
    pub fn header_part(&mut self, project_path: &str, xml: &str) -> io::Result<()> {
        self.write_line(&format!("--{}", self.outer_boundary))?;
        self.write_line("Content-Type: text/xml; charset=\"UTF-8\"")?;
        self.write_line("Content-Transfer-Encoding: 8bit")?;
        self.write_line(&format!("Content-Location: {project_path}desc.xml"))?;
        self.write_line("")?;
        self.write_xml(xml)?;
        trace!(project_path, bytes = xml.len(), "header part written");
        Ok(())
    }

    /// Opens a subset and writes its XML header.
    pub fn subset_start(&mut self, project_path: &str, xml: &str) -> io::Result<()> {
        self.write_line(&format!("--{}", self.outer_boundary))?;
        self.write_line(&format!(
            "Content-Type: Multipart/Related; boundary=\"{}\"; type=\"text/xml\"; start=\"<DataSubset.xml>\"",
            self.inner_boundary
        ))?;
        self.write_line("Content-Description: Data and metadata subset")?;
        self.write_line("")?;
        self.write_line(&format!("--{}", self.inner_boundary))?;
        self.write_line("Content-Type: text/xml; charset=\"UTF-8\"")?;
        self.write_line(&format!("Content-Location: {project_path}desc.xml"))?;
        self.write_line("")?;
        self.write_xml(xml)
    }

    /// Writes one binary attachment of the current subset.
    pub fn binary_part(
        &mut self,
        project_path: &str,
        kind: AttachmentKind,
        cross_data_type: Option<CrossDataType>,
        bytes: &[u8],
    ) -> io::Result<()> {
        self.write_line(&format!("--{}", self.inner_boundary))?;
        match cross_data_type {
            Some(data_type) if kind == AttachmentKind::CrossData => self.write_line(&format!(
                "Content-Type: binary/octet-stream; type=\"{}\"",
                data_type.literal()
            ))?,
            _ => self.write_line("Content-Type: binary/octet-stream")?,
        }
        self.write_line(&format!("Content-Location: {project_path}{}", kind.file_name()))?;
        self.write_line("")?;
        self.write_bytes(bytes)?;
        self.write_bytes(EOL.as_bytes())?;
        trace!(project_path, attachment = %kind, bytes = bytes.len(), "binary part written");
        Ok(())
    }

    /// Closes the current subset.
    pub fn subset_end(&mut self) -> io::Result<()> {
        self.write_line(&format!("--{}--", self.inner_boundary))
    }

    /// Closes the document and flushes the sink.
    pub fn close(&mut self) -> io::Result<()> {
        self.write_line(&format!("--{}--", self.outer_boundary))?;
        self.sink.flush()
    }

    fn write_xml(&mut self, xml: &str) -> io::Result<()> {
        self.write_bytes(xml.as_bytes())?;
        if !xml.ends_with(EOL) {
            self.write_bytes(EOL.as_bytes())?;
        }
        Ok(())
    }
}
