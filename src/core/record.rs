use std::fmt;

/// Placeholder for an empty VCF column
pub const MISSING: &str = ".";

/// A single VCF data line.
///
/// Only the identifier can change after construction. The position and ALT
/// columns keep their original text so that writing a record back out
/// reproduces every other column byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    chrom: String,
    position: u64,
    position_text: String,
    id: Option<String>,
    reference_allele: String,
    alternate_alleles: Vec<String>,
    alternate_text: String,
    /// QUAL through the last sample column, tab-joined as read
    trailing: Option<String>,
}

impl VariantRecord {
    pub fn new(
        chrom: impl Into<String>,
        position: u64,
        id: Option<String>,
        reference_allele: impl Into<String>,
        alternate_alleles: Vec<String>,
    ) -> Self {
        let alternate_text = if alternate_alleles.is_empty() {
            MISSING.to_string()
        } else {
            alternate_alleles.join(",")
        };

        Self {
            chrom: chrom.into(),
            position,
            position_text: position.to_string(),
            id,
            reference_allele: reference_allele.into(),
            alternate_alleles,
            alternate_text,
            trailing: None,
        }
    }

    /// Build a record from already-split columns, keeping their original text
    pub(crate) fn from_columns(
        chrom: &str,
        position: u64,
        position_text: &str,
        id_text: &str,
        reference_allele: &str,
        alternate_text: &str,
        trailing: Option<&str>,
    ) -> Self {
        let alternate_alleles = if alternate_text == MISSING {
            Vec::new()
        } else {
            alternate_text.split(',').map(str::to_string).collect()
        };

        Self {
            chrom: chrom.to_string(),
            position,
            position_text: position_text.to_string(),
            id: parse_id(id_text),
            reference_allele: reference_allele.to_string(),
            alternate_alleles,
            alternate_text: alternate_text.to_string(),
            trailing: trailing.map(str::to_string),
        }
    }

    #[cfg(test)]
    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = Some(trailing.into());
        self
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// 1-based position
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn reference_allele(&self) -> &str {
        &self.reference_allele
    }

    pub fn alternate_alleles(&self) -> &[String] {
        &self.alternate_alleles
    }

    /// True if any alternate allele of `self` also appears in `other`
    pub fn shares_alternate_with(&self, other: &VariantRecord) -> bool {
        self.alternate_alleles
            .iter()
            .any(|allele| other.alternate_alleles.contains(allele))
    }
}

fn parse_id(text: &str) -> Option<String> {
    if text.is_empty() || text == MISSING {
        None
    } else {
        Some(text.to_string())
    }
}

impl fmt::Display for VariantRecord {
    /// Formats the record as a VCF data line without the trailing newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.position_text,
            self.id.as_deref().unwrap_or(MISSING),
            self.reference_allele,
            self.alternate_text,
        )?;

        if let Some(trailing) = &self.trailing {
            write!(f, "\t{trailing}")?;
        }

        Ok(())
    }
}
