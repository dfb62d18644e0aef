//! Core data types for variant annotation.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`VariantRecord`](record::VariantRecord): One VCF data line; only its identifier is mutable
//! - [`NamingConvention`](types::NamingConvention): Whether contig names carry a `chr` prefix
//! - [`GenomicWindow`](types::GenomicWindow): A 0-based half-open region used for index queries
//! - [`MatchOutcome`](types::MatchOutcome): Whether a record was annotated, and if not, why
//!
//! ## Contig Naming
//!
//! Different reference sources use different naming conventions:
//!
//! | Source  | Chromosome 1 | Mitochondrial |
//! |---------|--------------|---------------|
//! | UCSC    | chr1         | chrM          |
//! | NCBI    | 1            | MT            |
//! | Ensembl | 1            | MT            |
//!
//! Translation between the two is a literal prefix add/remove, except for the
//! mitochondrion, which is aliased explicitly (see [`contig`]).

pub mod contig;
pub mod record;
pub mod types;
