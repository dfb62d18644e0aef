//! Streaming VCF writer for annotated records.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use noodles::bgzf;
use serde::{Deserialize, Serialize};

use crate::core::record::VariantRecord;
use crate::parsing::vcf::{format_info_line, has_info_field};

/// Default INFO field declared for the identifier annotation
pub const DEFAULT_INFO_ID: &str = "dbSNP_RS";
pub const DEFAULT_INFO_DESCRIPTION: &str = "dbSNP RS ID";

/// The metadata field declared in the output header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoField {
    pub id: String,
    pub description: String,
}

impl Default for InfoField {
    fn default() -> Self {
        Self {
            id: DEFAULT_INFO_ID.to_string(),
            description: DEFAULT_INFO_DESCRIPTION.to_string(),
        }
    }
}

/// Writes a VCF header plus one record at a time to `W`
pub struct AnnotationWriter<W: Write> {
    inner: W,
    records_written: u64,
}

impl<W: Write> AnnotationWriter<W> {
    /// Write the header and return a writer ready for records.
    ///
    /// `header_lines` are copied in order, with a declaration for `field`
    /// inserted before the `#CHROM` line unless the header already declares it.
    pub fn new(mut inner: W, header_lines: &[String], field: &InfoField) -> io::Result<Self> {
        write_header(&mut inner, header_lines, field)?;
        Ok(Self {
            inner,
            records_written: 0,
        })
    }

    pub fn write(&mut self, record: &VariantRecord) -> io::Result<()> {
        writeln!(self.inner, "{record}")?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush buffered output and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn write_header<W: Write>(writer: &mut W, header_lines: &[String], field: &InfoField) -> io::Result<()> {
    let mut declared = has_info_field(header_lines.iter().map(String::as_str), &field.id);
    let info_line = format_info_line(&field.id, &field.description);

    for line in header_lines {
        if !declared && line.starts_with("#CHROM") {
            writeln!(writer, "{info_line}")?;
            declared = true;
        }
        writeln!(writer, "{line}")?;
    }

    // Header without a column line; keep the declaration anyway
    if !declared {
        writeln!(writer, "{info_line}")?;
    }

    Ok(())
}

/// Output compression, chosen from the output file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Bgzf,
}

impl Compression {
    /// `.gz` and `.bgz` outputs are BGZF-compressed so they can be indexed with tabix
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("gz" | "bgz") => Self::Bgzf,
            _ => Self::None,
        }
    }
}

/// File sink behind an [`AnnotationWriter`]
pub enum OutputSink {
    Plain(BufWriter<File>),
    Bgzf(bgzf::Writer<File>),
}

impl OutputSink {
    pub fn new(file: File, compression: Compression) -> Self {
        match compression {
            Compression::None => Self::Plain(BufWriter::new(file)),
            Compression::Bgzf => Self::Bgzf(bgzf::Writer::new(file)),
        }
    }

    /// Flush everything (including the BGZF EOF block) and return the file
    pub fn finish(self) -> io::Result<File> {
        match self {
            Self::Plain(writer) => writer.into_inner().map_err(io::IntoInnerError::into_error),
            Self::Bgzf(writer) => writer.finish(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Bgzf(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Bgzf(writer) => writer.flush(),
        }
    }
}
