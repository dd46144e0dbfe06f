//! Writer builder and sink selection.

use crate::error::Result;
use crate::mime::{DEFAULT_INNER_BOUNDARY, DEFAULT_OUTER_BOUNDARY, MimeWriter};
use crate::writer::SdmDataObjectWriter;
use bdf_core::SCHEMA_VERSION;
use bytes::buf::Writer;
use bytes::{BufMut, BytesMut};
use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::Path;

/// In-memory sink.
pub type MemorySink = Writer<BytesMut>;

/// Builder for configuring and creating a writer.
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    uid: String,
    title: String,
    outer_boundary: String,
    inner_boundary: String,
    schema_version: u32,
}

impl WriterBuilder {
    /// Creates a builder for a document with archive UID `uid`.
    #[must_use]
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            outer_boundary: DEFAULT_OUTER_BOUNDARY.to_string(),
            inner_boundary: DEFAULT_INNER_BOUNDARY.to_string(),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Sets the boundary of the outer multipart document.
    #[must_use]
    pub fn outer_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.outer_boundary = boundary.into();
        self
    }

    /// Sets the boundary of the nested subset parts.
    #[must_use]
    pub fn inner_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.inner_boundary = boundary.into();
        self
    }

    /// Sets the schema version written in the global header.
    #[must_use]
    pub fn schema_version(mut self, schema_version: u32) -> Self {
        self.schema_version = schema_version;
        self
    }

    /// Builds a writer over any sink.
    pub fn build<W: Write>(self, sink: W) -> SdmDataObjectWriter<W> {
        let mime = MimeWriter::new(sink, self.outer_boundary, self.inner_boundary);
        SdmDataObjectWriter::new(mime, self.uid, self.title, self.schema_version)
    }

    /// Builds a writer that keeps the document in memory.
    #[must_use]
    pub fn to_memory(self) -> SdmDataObjectWriter<MemorySink> {
        self.build(BytesMut::with_capacity(64 * 1024).writer())
    }

    /// Builds a writer to standard output.
    #[must_use]
    pub fn to_console(self) -> SdmDataObjectWriter<Stdout> {
        self.build(std::io::stdout())
    }

    /// Builds a writer to a newly created file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn to_file(self, path: impl AsRef<Path>) -> Result<SdmDataObjectWriter<BufWriter<File>>> {
        let file = File::create(path)?;
        Ok(self.build(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WriterState;

    #[test]
    fn test_defaults() {
        let writer = WriterBuilder::new("uid://X1/X2/X3", "test").to_memory();
        assert_eq!(writer.state(), WriterState::Start);
        assert_eq!(writer.num_bytes(), 0);
        assert!(writer.into_bytes().is_empty());
    }

    #[test]
    fn test_to_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("bdf.mime");
        let writer = WriterBuilder::new("uid://X1/X2/X3", "test")
            .outer_boundary("outer")
            .inner_boundary("inner")
            .to_file(&path)
            .expect("Failed to create writer");
        assert_eq!(writer.state(), WriterState::Start);
        assert!(path.exists());
    }
}
