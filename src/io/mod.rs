//! Reading and writing indexed VCF files.
//!
//! - [`VariantFile`](reader::VariantFile): raw header lines and full sequential passes
//! - [`IndexedVariantReader`](reader::IndexedVariantReader): region queries via a
//!   tabix/CSI index
//! - [`AnnotationWriter`](writer::AnnotationWriter): streams records to plain or
//!   BGZF output with one extra INFO declaration in the header
//!
//! The matcher only needs region queries from the reference side, so that
//! capability is expressed as the [`WindowQuery`] trait.

use crate::core::record::VariantRecord;
use crate::core::types::GenomicWindow;

pub mod reader;
pub mod writer;

pub use reader::{IndexedVariantReader, ReaderError, VariantFile};

/// Lazy, finite sequence of records returned by a region query
pub type WindowRecords<'a> = Box<dyn Iterator<Item = Result<VariantRecord, ReaderError>> + 'a>;

/// A variant collection that supports region queries
pub trait WindowQuery {
    /// Contig names declared by the collection
    fn contig_names(&self) -> &[String];

    /// Records overlapping `window`, in physical order.
    ///
    /// Fails with [`ReaderError::UnknownContig`] when the chromosome has no data.
    fn query_window(&mut self, window: &GenomicWindow) -> Result<WindowRecords<'_>, ReaderError>;
}
