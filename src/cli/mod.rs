//! Command-line interface for rsid-annotator.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **annotate**: Copy a VCF, filling in IDs from an indexed reference catalog
//! - **inspect**: Show the contigs and naming convention of an indexed VCF
//!
//! ## Usage
//!
//! ```text
//! # Annotate against dbSNP
//! rsid-annotator annotate --target filtered.snp.vcf.gz --reference 00-All.vcf.gz \
//!     --output annotated.snp.vcf.gz
//!
//! # JSON summary for scripting
//! rsid-annotator --format json annotate -t sample.vcf.gz -r 00-All.vcf.gz -o out.vcf
//!
//! # Check why chromosomes are not being found
//! rsid-annotator inspect 00-All.vcf.gz
//! ```

use clap::{Parser, Subcommand};

pub mod annotate;
pub mod inspect;

#[derive(Parser)]
#[command(name = "rsid-annotator")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Annotate VCF records with identifiers from an indexed reference catalog")]
#[command(
    long_about = "rsid-annotator copies a VCF and fills in the ID column from a reference catalog such as dbSNP.\n\nBoth inputs must be bgzip-compressed and tabix-indexed. A record is annotated when the catalog has a record at the same position with the same REF allele and at least one ALT allele in common.\n- chr-prefixed and bare chromosome names are reconciled automatically (chrM <-> MT)\n- Every other column is copied byte for byte\n- Output is written atomically"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Annotate a VCF with identifiers from a reference catalog
    Annotate(annotate::AnnotateArgs),

    /// Show contigs and naming convention of an indexed VCF
    Inspect(inspect::InspectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
