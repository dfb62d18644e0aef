use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::contig::detect_naming_convention;
use crate::io::VariantFile;

#[derive(Args)]
pub struct InspectArgs {
    /// Indexed VCF to inspect (bgzip-compressed, with .tbi or .csi index)
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute inspect subcommand
///
/// # Errors
///
/// Returns an error if the file or its index is missing or cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: InspectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let file = VariantFile::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let contigs = file.contig_names();
    let convention = detect_naming_convention(contigs);

    match format {
        OutputFormat::Text => {
            println!("File: {}", file.path().display());
            println!("Index: {}", file.index_path().display());
            println!("Naming convention: {convention}");
            println!("Contigs: {}", contigs.len());

            if verbose || contigs.len() <= 25 {
                for name in contigs {
                    println!("  {name}");
                }
            } else {
                for name in &contigs[..25] {
                    println!("  {name}");
                }
                println!("  ... and {} more (use --verbose to list all)", contigs.len() - 25);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": file.path(),
                "index": file.index_path(),
                "naming_convention": convention,
                "contigs": contigs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("contig\tnaming_convention");
            for name in contigs {
                println!("{name}\t{convention:?}");
            }
        }
    }

    Ok(())
}
