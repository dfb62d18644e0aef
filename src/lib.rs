//! # rsid-annotator
//!
//! A library for filling in the ID column of a VCF from an indexed reference
//! catalog such as dbSNP.
//!
//! Variant calls usually come out of a caller with `.` in the ID column. The
//! catalog already knows the identifier for most known sites, but looking
//! each call up by hand is slow and error prone: the two files may disagree
//! on chromosome naming (`chr1` vs `1`, `chrM` vs `MT`) and a site only counts
//! as known when its alleles agree too.
//!
//! `rsid-annotator` streams the target VCF, queries the indexed catalog at each
//! record's position and copies the identifier of the first record with the
//! same reference allele and at least one shared alternate allele.
//!
//! ## Features
//!
//! - **Indexed lookup**: one tabix/CSI region query per record, no full catalog scan
//! - **Naming reconciliation**: chr-prefixed and bare names are translated automatically
//! - **Faithful output**: every column except ID is copied byte for byte
//! - **Atomic publish**: output appears only once it is complete
//!
//! ## Example
//!
//! ```rust,no_run
//! use rsid_annotator::{annotate, AnnotationConfig};
//! use rsid_annotator::matching::events::TracingSink;
//!
//! let config = AnnotationConfig::new(
//!     "filtered.snp.vcf.gz",
//!     "00-All.vcf.gz",
//!     "annotated.snp.vcf.gz",
//! );
//! let summary = annotate(&config, &mut TracingSink::default()).unwrap();
//!
//! println!(
//!     "{} of {} records annotated ({:.1}%)",
//!     summary.annotated,
//!     summary.records,
//!     summary.annotated_fraction() * 100.0
//! );
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Variant records, windows, and chromosome naming conventions
//! - [`io`]: Indexed VCF reading and annotated VCF writing
//! - [`matching`]: Record matching and the end-to-end pipeline
//! - [`parsing`]: VCF header and data-line parsing
//! - [`utils`]: Input and output precondition checks
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod io;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::contig::{detect_naming_convention, normalize_contig_name};
pub use core::record::VariantRecord;
pub use core::types::*;
pub use io::writer::AnnotationWriter;
pub use io::{IndexedVariantReader, VariantFile};
pub use matching::matcher::{AnnotationSummary, VariantMatcher};
pub use matching::pipeline::{annotate, AnnotateError, AnnotationConfig};
