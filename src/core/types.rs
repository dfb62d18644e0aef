use serde::{Deserialize, Serialize};

/// Naming convention used for contigs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// UCSC style: chr1, chr2, ..., chrX, chrY, chrM
    Prefixed,
    /// NCBI/Ensembl style: 1, 2, ..., X, Y, MT
    Bare,
}

impl std::fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefixed => write!(f, "prefixed (chr1, chrM)"),
            Self::Bare => write!(f, "bare (1, MT)"),
        }
    }
}

/// A region on one chromosome, as a 0-based half-open interval `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicWindow {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicWindow {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// The window covering exactly one 1-based position
    pub fn at_position(chrom: impl Into<String>, position: u64) -> Self {
        Self::new(chrom, position.saturating_sub(1), position)
    }

    /// 1-based inclusive bounds, as used by tabix regions.
    /// Returns `None` for an empty window.
    #[must_use]
    pub fn one_based_bounds(&self) -> Option<(u64, u64)> {
        if self.end <= self.start {
            return None;
        }
        Some((self.start + 1, self.end))
    }
}

impl std::fmt::Display for GenomicWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Why a record left the matcher without a new identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnchangedReason {
    /// No reference record at the position shares the reference allele and an alternate
    NoCandidate,
    /// The reference index has no data for the queried chromosome
    UnknownContig,
    /// The first qualifying candidate carries no identifier
    MissingIdentifier,
}

/// Result of matching one target record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Identifier was replaced with this value
    Annotated(String),
    /// Record was left exactly as read
    Unchanged(UnchangedReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_at_position() {
        let window = GenomicWindow::at_position("chr1", 100);
        assert_eq!(window.start, 99);
        assert_eq!(window.end, 100);
        assert_eq!(window.one_based_bounds(), Some((100, 100)));
        assert_eq!(window.to_string(), "chr1:99-100");
    }

    #[test]
    fn test_empty_window_has_no_bounds() {
        assert_eq!(GenomicWindow::new("1", 10, 10).one_based_bounds(), None);
        assert_eq!(GenomicWindow::new("1", 10, 5).one_based_bounds(), None);
    }
}
