//! Parser for VCF header and data lines.
//!
//! VCF files have contig definitions in the header as:
//! `##contig=<ID=chr1,length=248956422>`
//!
//! INFO fields are declared as:
//! `##INFO=<ID=DP,Number=1,Type=Integer,Description="Depth">`
//!
//! Data lines are parsed manually rather than through noodles so that the
//! columns we never touch (QUAL onward) can be written back exactly as read.

use thiserror::Error;

use crate::core::record::VariantRecord;

/// Number of fixed columns up to and including ALT
const REQUIRED_COLUMNS: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid VCF format: {0}")]
    InvalidFormat(String),

    #[error("Expected at least 5 tab-separated columns (CHROM through ALT), found {0}")]
    MissingColumns(usize),

    #[error("Invalid position '{0}': expected an integer >= 1")]
    InvalidPosition(String),
}

/// Extract contig IDs from `##contig` lines, in header order
pub fn parse_contig_names<'a, I>(lines: I) -> Result<Vec<String>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names = Vec::new();

    for line in lines {
        // VCF contig lines start with ##contig=
        if !line.starts_with("##contig=") {
            // Stop at the header line (starts with #CHROM)
            if line.starts_with("#CHROM") {
                break;
            }
            continue;
        }

        if let Some(name) = parse_structured_id(line, "##contig=<")? {
            names.push(name);
        }
    }

    Ok(names)
}

/// Check whether an INFO field with this ID is declared in the header
pub fn has_info_field<'a, I>(lines: I, id: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|line| line.starts_with("##INFO=<"))
        .any(|line| matches!(parse_structured_id(line, "##INFO=<"), Ok(Some(found)) if found == id))
}

/// Build the header line declaring a single-valued String INFO field
#[must_use]
pub fn format_info_line(id: &str, description: &str) -> String {
    let description = description.replace('\\', "\\\\").replace('"', "\\\"");
    format!("##INFO=<ID={id},Number=1,Type=String,Description=\"{description}\">")
}

/// Parse one VCF data line into a record.
///
/// The line must not include its line terminator.
pub fn parse_record_line(line: &str) -> Result<VariantRecord, ParseError> {
    let mut columns = line.splitn(REQUIRED_COLUMNS + 1, '\t');

    let mut next_column = |found: usize| columns.next().ok_or(ParseError::MissingColumns(found));
    let chrom = next_column(0)?;
    let position_text = next_column(1)?;
    let id = next_column(2)?;
    let reference_allele = next_column(3)?;
    let alternates = next_column(4)?;
    let trailing = columns.next();

    if chrom.is_empty() {
        return Err(ParseError::InvalidFormat(
            "Empty CHROM column".to_string(),
        ));
    }

    let position = position_text
        .parse::<u64>()
        .ok()
        .filter(|&position| position >= 1)
        .ok_or_else(|| ParseError::InvalidPosition(position_text.to_string()))?;

    Ok(VariantRecord::from_columns(
        chrom,
        position,
        position_text,
        id,
        reference_allele,
        alternates,
        trailing,
    ))
}

/// Parse the ID out of a structured `##KEY=<ID=...,...>` line
fn parse_structured_id(line: &str, prefix: &str) -> Result<Option<String>, ParseError> {
    // Format: ##contig=<ID=chr1,length=248956422,md5=abc123,...>
    let content = line
        .strip_prefix(prefix)
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("Invalid structured header line: {line}"))
        })?;

    // Parse key=value pairs, handling quoted values
    for part in split_structured_fields(content) {
        if let Some((key, value)) = part.split_once('=') {
            if key.trim().eq_ignore_ascii_case("id") {
                // Remove quotes from value if present
                return Ok(Some(value.trim().trim_matches('"').to_string()));
            }
        }
    }

    // Skip malformed lines without ID
    Ok(None)
}

/// Split structured header fields, handling commas inside quoted values.
///
/// This is UTF-8 safe because:
/// - Commas are single-byte ASCII (0x2C)
/// - `char_indices()` yields byte positions at character boundaries
/// - After a comma at position `i`, `i + 1` is always a valid boundary
fn split_structured_fields(content: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    // Don't forget the last field
    if start <= content.len() {
        fields.push(&content[start..]);
    }

    fields
}
