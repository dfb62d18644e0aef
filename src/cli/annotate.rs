use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::NamingConvention;
use crate::io::writer::{InfoField, DEFAULT_INFO_DESCRIPTION, DEFAULT_INFO_ID};
use crate::matching::events::TracingSink;
use crate::matching::matcher::AnnotationSummary;
use crate::matching::pipeline::{annotate, AnnotationConfig};

#[derive(Args)]
pub struct AnnotateArgs {
    /// VCF to annotate (bgzip-compressed, with .tbi or .csi index)
    #[arg(short, long)]
    pub target: PathBuf,

    /// Reference catalog, e.g. dbSNP 00-All.vcf.gz (bgzip-compressed, with .tbi or .csi index)
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Output VCF (.gz or .bgz for BGZF compression)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Naming convention of the target (detected from ##contig lines by default)
    #[arg(long, value_enum)]
    pub target_convention: Option<NamingConvention>,

    /// Naming convention of the reference (detected from ##contig lines by default)
    #[arg(long, value_enum)]
    pub reference_convention: Option<NamingConvention>,

    /// ID of the INFO field declared in the output header
    #[arg(long, default_value = DEFAULT_INFO_ID)]
    pub info_id: String,

    /// Description of the INFO field declared in the output header
    #[arg(long, default_value = DEFAULT_INFO_DESCRIPTION)]
    pub info_description: String,
}

impl AnnotateArgs {
    fn to_config(&self) -> AnnotationConfig {
        AnnotationConfig {
            target: self.target.clone(),
            reference: self.reference.clone(),
            output: self.output.clone(),
            target_convention: self.target_convention,
            reference_convention: self.reference_convention,
            info_field: InfoField {
                id: self.info_id.clone(),
                description: self.info_description.clone(),
            },
        }
    }
}

/// Execute annotate subcommand
///
/// # Errors
///
/// Returns an error if an input or index is missing, a file cannot be read,
/// or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AnnotateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.to_config();

    if verbose {
        eprintln!(
            "Annotating {} against {}",
            config.target.display(),
            config.reference.display()
        );
    }

    let mut events = TracingSink::default();

    let summary = annotate(&config, &mut events)
        .with_context(|| format!("Failed to annotate {}", config.target.display()))?;

    match format {
        OutputFormat::Text => print_text_summary(&config, &summary),
        OutputFormat::Json => print_json_summary(&config, &summary)?,
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

fn print_text_summary(config: &AnnotationConfig, summary: &AnnotationSummary) {
    println!("Annotation Results");
    println!("{}", "=".repeat(60));

    println!("\nTarget: {}", config.target.display());
    println!("  Naming convention: {}", summary.target_convention);
    println!("\nReference: {}", config.reference.display());
    println!("  Naming convention: {}", summary.reference_convention);
    if summary.normalized() {
        println!("  Chromosome names translated before lookup");
    }

    println!("\nRecords:");
    println!("  Total: {}", summary.records);
    println!(
        "  Annotated: {} ({:.2}%)",
        summary.annotated,
        summary.annotated_fraction() * 100.0
    );
    println!("  No matching record: {}", summary.no_candidate);
    println!("  Chromosome not in reference: {}", summary.unknown_contig);
    if summary.missing_identifier > 0 {
        println!("  Match without identifier: {}", summary.missing_identifier);
    }

    println!("\nOutput written to {}", config.output.display());
}

fn print_json_summary(config: &AnnotationConfig, summary: &AnnotationSummary) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "config": config,
        "summary": summary,
        "annotated_fraction": summary.annotated_fraction(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(summary: &AnnotationSummary) {
    println!(
        "records\tannotated\tno_candidate\tunknown_contig\tmissing_identifier\ttarget_convention\treference_convention"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{:?}\t{:?}",
        summary.records,
        summary.annotated,
        summary.no_candidate,
        summary.unknown_contig,
        summary.missing_identifier,
        summary.target_convention,
        summary.reference_convention,
    );
}
