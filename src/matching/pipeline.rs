//! End-to-end annotation run: validate, open, match, write, publish.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::contig::detect_naming_convention;
use crate::core::types::NamingConvention;
use crate::io::writer::{AnnotationWriter, Compression, InfoField, OutputSink};
use crate::io::{IndexedVariantReader, ReaderError, VariantFile};
use crate::matching::events::MatchEventSink;
use crate::matching::matcher::{AnnotationSummary, VariantMatcher};
use crate::utils::validation::{check_indexed_input, check_output, output_directory, ValidationError};

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Precondition(#[from] ValidationError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("Failed to write annotated output: {0}")]
    Write(#[source] io::Error),
}

/// Everything one annotation run needs. The library reads no other process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// BGZF-compressed, indexed VCF to annotate
    pub target: PathBuf,

    /// BGZF-compressed, indexed reference catalog (e.g. dbSNP)
    pub reference: PathBuf,

    /// Output VCF; `.gz`/`.bgz` names are BGZF-compressed
    pub output: PathBuf,

    /// Use this convention for the target instead of detecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_convention: Option<NamingConvention>,

    /// Use this convention for the reference instead of detecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_convention: Option<NamingConvention>,

    /// INFO field declared in the output header
    #[serde(default)]
    pub info_field: InfoField,
}

impl AnnotationConfig {
    pub fn new(target: impl Into<PathBuf>, reference: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            reference: reference.into(),
            output: output.into(),
            target_convention: None,
            reference_convention: None,
            info_field: InfoField::default(),
        }
    }
}

/// Annotate `config.target` against `config.reference` and write `config.output`.
///
/// Output is written to a temporary file beside `config.output` and renamed
/// into place only once every record has been written. On any error the
/// temporary file is removed and `config.output` is left untouched.
///
/// # Errors
///
/// Returns `AnnotateError::Precondition` if an input, its index, or the output
/// directory is missing (checked for both inputs before anything is opened),
/// `AnnotateError::Reader` on a fatal read error, or `AnnotateError::Write` if
/// the output cannot be written.
pub fn annotate(
    config: &AnnotationConfig,
    events: &mut dyn MatchEventSink,
) -> Result<AnnotationSummary, AnnotateError> {
    check_indexed_input(&config.target)?;
    check_indexed_input(&config.reference)?;
    check_output(
        &config.output,
        &[config.target.as_path(), config.reference.as_path()],
    )?;

    let target = VariantFile::open(&config.target)?;
    let reference = IndexedVariantReader::open(&config.reference)?;

    let target_convention = config
        .target_convention
        .unwrap_or_else(|| detect_naming_convention(target.contig_names()));

    events.reference_contigs(reference.contig_names());
    let mut matcher = match config.reference_convention {
        Some(convention) => VariantMatcher::with_conventions(reference, target_convention, convention),
        None => VariantMatcher::new(reference, target_convention),
    };

    info!(
        target = %config.target.display(),
        convention = %matcher.target_convention(),
        "Target naming convention"
    );
    info!(
        reference = %config.reference.display(),
        convention = %matcher.reference_convention(),
        "Reference naming convention"
    );

    let temp = create_temp_output(&config.output).map_err(AnnotateError::Write)?;
    let file = temp.reopen().map_err(AnnotateError::Write)?;
    let sink = OutputSink::new(file, Compression::from_path(&config.output));
    let mut writer = AnnotationWriter::new(sink, target.header_lines(), &config.info_field)
        .map_err(AnnotateError::Write)?;

    let summary = matcher.run(target.records()?, &mut writer, events)?;
    let records_written = writer.records_written();

    let file = writer
        .finish()
        .and_then(OutputSink::finish)
        .map_err(AnnotateError::Write)?;
    file.sync_all().map_err(AnnotateError::Write)?;
    drop(file);

    temp.persist(&config.output)
        .map_err(|e| AnnotateError::Write(e.error))?;

    debug!(
        output = %config.output.display(),
        records = records_written,
        "Published annotated output"
    );
    info!(
        records = summary.records,
        annotated = summary.annotated,
        unknown_contig = summary.unknown_contig,
        "Annotation complete"
    );

    Ok(summary)
}

fn create_temp_output(output: &Path) -> io::Result<tempfile::NamedTempFile> {
    let temp = tempfile::Builder::new()
        .prefix(".rsid-annotator.")
        .suffix(".tmp")
        .tempfile_in(output_directory(output))?;

    // Temporary files are owner-only; the published output should not be
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o644))?;
    }

    Ok(temp)
}
