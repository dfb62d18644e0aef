//! Parsers for VCF text.
//!
//! Compressed I/O and index handling live in [`crate::io`]; this module only
//! deals with already-decompressed lines:
//!
//! - **Header lines**: `##contig` IDs (for naming-convention detection) and
//!   `##INFO` declarations
//! - **Data lines**: the fixed columns needed for matching, with the rest kept verbatim
//!
//! ## Example
//!
//! ```rust
//! use rsid_annotator::parsing::vcf::{parse_contig_names, parse_record_line};
//!
//! let header = "##contig=<ID=chr1,length=248956422>\n#CHROM\tPOS\tID\tREF\tALT\n";
//! assert_eq!(parse_contig_names(header.lines()).unwrap(), vec!["chr1"]);
//!
//! let record = parse_record_line("chr1\t100\t.\tA\tT").unwrap();
//! assert_eq!(record.position(), 100);
//! ```

pub mod vcf;
