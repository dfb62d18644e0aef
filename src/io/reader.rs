//! Index-backed access to a sorted, BGZF-compressed VCF.
//!
//! Region queries go through noodles' tabix/CSI support. Full passes read the
//! decompressed text directly so that each line can be reproduced exactly.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use noodles::bgzf;
use noodles::core::{Position, Region};
use noodles::csi::BinningIndex;
use noodles::vcf;
use noodles::vcf::variant::record::{AlternateBases as _, Ids as _};
use thiserror::Error;
use tracing::debug;

use crate::core::record::{VariantRecord, MISSING};
use crate::core::types::GenomicWindow;
use crate::io::{WindowQuery, WindowRecords};
use crate::parsing::vcf::{parse_contig_names, parse_record_line, ParseError};
use crate::utils::validation::{check_indexed_input, ValidationError};

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Precondition(#[from] ValidationError),

    #[error("Failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Invalid header in {}: {source}", .path.display())]
    InvalidHeader { path: PathBuf, source: ParseError },

    /// The queried chromosome has no entry in the index. Callers treat this as "no data".
    #[error("Contig '{0}' is not present in the index")]
    UnknownContig(String),

    #[error("Malformed record at {}:{line}: {source}", .path.display())]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        source: ParseError,
    },

    #[error("I/O error reading {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ReaderError {
    /// True for the per-record query failure that should be treated as "no match"
    #[must_use]
    pub fn is_unknown_contig(&self) -> bool {
        matches!(self, Self::UnknownContig(_))
    }
}

/// Header and sequential access to a BGZF-compressed VCF.
///
/// Opening checks that an index sits next to the data file but never loads
/// it, and the header is kept as raw text. Use [`IndexedVariantReader`] when
/// region queries are needed.
pub struct VariantFile {
    path: PathBuf,
    index_path: PathBuf,
    header_lines: Vec<String>,
    contig_names: Vec<String>,
}

impl VariantFile {
    /// Open a BGZF-compressed VCF and read its header lines
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Precondition` if the file or its index is missing,
    /// `ReaderError::Open` if the file cannot be read, or
    /// `ReaderError::InvalidHeader` if the `##contig` lines are malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let index_path = check_indexed_input(path)?;

        let header_lines = open_text(path)
            .and_then(|mut reader| read_header_lines(&mut reader))
            .map_err(|source| ReaderError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let contig_names = parse_contig_names(header_lines.iter().map(String::as_str))
            .map_err(|source| ReaderError::InvalidHeader {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            index_path,
            header_lines,
            contig_names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Contig IDs declared in `##contig` header lines, in header order
    pub fn contig_names(&self) -> &[String] {
        &self.contig_names
    }

    /// Raw header lines (meta lines and the `#CHROM` line) without terminators
    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    /// Full forward pass over every record in file order.
    ///
    /// Each call opens a fresh decompression stream.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::Open` if the data file can no longer be opened.
    pub fn records(&self) -> Result<Records, ReaderError> {
        let reader = open_text(&self.path).map_err(|source| ReaderError::Open {
            path: self.path.clone(),
            source,
        })?;

        Ok(Records {
            path: self.path.clone(),
            reader,
            buf: String::new(),
            line: 0,
            done: false,
        })
    }
}

/// Read-only, index-backed access to one VCF
pub struct IndexedVariantReader {
    file: VariantFile,
    inner: vcf::io::IndexedReader<bgzf::Reader<File>>,
    header: vcf::Header,
    /// Contigs with data in the index; `None` when the index carries no names
    indexed_contigs: Option<HashSet<String>>,
}

impl IndexedVariantReader {
    /// Open a BGZF-compressed VCF and load its `.tbi` or `.csi` index
    ///
    /// # Errors
    ///
    /// Returns the errors of [`VariantFile::open`], or `ReaderError::Open` if
    /// the index or the header cannot be read by noodles.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let file = VariantFile::open(path)?;

        let open_error = |source| ReaderError::Open {
            path: file.path.clone(),
            source,
        };

        let mut inner = vcf::io::indexed_reader::Builder::default()
            .build_from_path(&file.path)
            .map_err(open_error)?;
        let header = inner.read_header().map_err(open_error)?;
        let indexed_contigs = indexed_contig_names(inner.index());

        debug!(
            path = %file.path.display(),
            index = %file.index_path.display(),
            contigs = file.contig_names.len(),
            indexed = indexed_contigs.as_ref().map_or(0, HashSet::len),
            "Opened indexed VCF"
        );

        Ok(Self {
            file,
            inner,
            header,
            indexed_contigs,
        })
    }

    pub fn contig_names(&self) -> &[String] {
        self.file.contig_names()
    }

    /// Records overlapping `window`, in physical (file) order.
    ///
    /// Only the fixed columns through ALT are decoded.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::UnknownContig` if the chromosome has no entry in
    /// the index, or `ReaderError::Io` if the query itself fails (including a
    /// window beyond the range the index can address).
    pub fn query_window(&mut self, window: &GenomicWindow) -> Result<WindowRecords<'_>, ReaderError> {
        if let Some(indexed) = &self.indexed_contigs {
            if !indexed.contains(&window.chrom) {
                return Err(ReaderError::UnknownContig(window.chrom.clone()));
            }
        }

        let Some((start, end)) = window.one_based_bounds() else {
            return Ok(Box::new(std::iter::empty()));
        };

        let (Some(start), Some(end)) = (to_position(start), to_position(end)) else {
            return Ok(Box::new(std::iter::empty()));
        };

        let region = Region::new(window.chrom.as_str(), start..=end);
        let path = &self.file.path;

        let query = self
            .inner
            .query(&self.header, &region)
            .map_err(|source| ReaderError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(Box::new(query.filter_map(move |result| {
            result
                .and_then(|record| decode_record(&record))
                .map_err(|source| ReaderError::Io {
                    path: path.clone(),
                    source,
                })
                .transpose()
        })))
    }
}

impl WindowQuery for IndexedVariantReader {
    fn contig_names(&self) -> &[String] {
        IndexedVariantReader::contig_names(self)
    }

    fn query_window(&mut self, window: &GenomicWindow) -> Result<WindowRecords<'_>, ReaderError> {
        IndexedVariantReader::query_window(self, window)
    }
}

/// Streaming iterator over every data line of a VCF
pub struct Records {
    path: PathBuf,
    reader: BufReader<bgzf::Reader<File>>,
    buf: String,
    line: u64,
    done: bool,
}

impl Iterator for Records {
    type Item = Result<VariantRecord, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line += 1;
                    let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }

                    let result = parse_record_line(line).map_err(|source| ReaderError::InvalidRecord {
                        path: self.path.clone(),
                        line: self.line,
                        source,
                    });
                    self.done = result.is_err();
                    return Some(result);
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(ReaderError::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }

        None
    }
}

fn open_text(path: &Path) -> io::Result<BufReader<bgzf::Reader<File>>> {
    File::open(path)
        .map(bgzf::Reader::new)
        .map(BufReader::new)
}

/// Read the leading `#` lines, stopping at the first data line
fn read_header_lines(reader: &mut impl BufRead) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = String::new();

    loop {
        // Peek so that the first data line is not consumed
        let starts_with_hash = reader.fill_buf()?.first() == Some(&b'#');
        if !starts_with_hash {
            break;
        }

        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        lines.push(buf.trim_end_matches(&['\n', '\r'][..]).to_string());
    }

    Ok(lines)
}

/// Reference sequence names recorded in the index header
fn indexed_contig_names(index: &dyn BinningIndex) -> Option<HashSet<String>> {
    index.header().map(|header| {
        header
            .reference_sequence_names()
            .iter()
            .map(|name| String::from_utf8_lossy(AsRef::<[u8]>::as_ref(name)).into_owned())
            .collect()
    })
}

fn to_position(n: u64) -> Option<Position> {
    usize::try_from(n).ok().and_then(Position::new)
}

/// Decode the fields used for matching. Records without a position are skipped.
fn decode_record(record: &vcf::Record) -> io::Result<Option<VariantRecord>> {
    let Some(position) = record.variant_start().transpose()? else {
        return Ok(None);
    };

    let ids = record.ids();
    let ids: Vec<&str> = ids.iter().collect();
    let id = if ids.is_empty() {
        None
    } else {
        Some(ids.join(";"))
    };

    let alternate_bases = record.alternate_bases();
    let alternates = alternate_bases
        .iter()
        .filter(|allele| !matches!(allele, Ok(a) if *a == MISSING))
        .map(|allele| allele.map(str::to_string))
        .collect::<io::Result<Vec<_>>>()?;

    Ok(Some(VariantRecord::new(
        record.reference_sequence_name(),
        position.get() as u64,
        id,
        record.reference_bases(),
        alternates,
    )))
}
