//! Variant matching and the end-to-end annotation pipeline.
//!
//! - [`VariantMatcher`](matcher::VariantMatcher): looks each target record up in the reference
//! - [`MatchEventSink`](events::MatchEventSink): where per-record diagnostics go
//! - [`annotate`](pipeline::annotate): validates inputs, runs the matcher, publishes the output
//!
//! ## Matching Rule
//!
//! For a target record at position `p`, the reference is queried over the
//! single-position window `[p - 1, p)`. The returned records are scanned in
//! file order and the first one that satisfies all of:
//!
//! 1. **Same position**: the candidate starts at `p` (overlapping records are skipped)
//! 2. **Same reference allele**: exact string equality
//! 3. **Shared alternate**: the alternate-allele sets intersect
//!
//! supplies the identifier. There is no scoring among multiple qualifying
//! candidates, and no attempt to reconcile indels that are left-aligned in one
//! dataset and right-aligned in the other.
//!
//! ## Chromosome Names
//!
//! When the target and reference use different naming conventions, each
//! target chromosome is translated before querying (`chr1` <-> `1`,
//! `chrM` <-> `MT`). The output keeps the target's own names.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rsid_annotator::matching::events::TracingSink;
//! use rsid_annotator::matching::pipeline::{annotate, AnnotationConfig};
//!
//! let config = AnnotationConfig::new("sample.vcf.gz", "00-All.vcf.gz", "annotated.vcf.gz");
//! let summary = annotate(&config, &mut TracingSink::default()).unwrap();
//! println!("{} of {} records annotated", summary.annotated, summary.records);
//! ```

pub mod events;
pub mod matcher;
pub mod pipeline;
