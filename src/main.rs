//! pdfmerge - Merge PDF files into a single document.
//!
//! Command-line front end for the in-memory merge engine.

mod cli;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfmerge::config::{Config, OverwriteMode};
use pdfmerge::error::Error;
use pdfmerge::io::{PdfWriter, load_inputs};
use pdfmerge::merge::Merger;
use pdfmerge::naming::{HeuristicNamer, suggest_with_timeout};
use pdfmerge::output::{
    OutputFormatter, display_merge_statistics, display_validation_summary,
};
use pdfmerge::utils::{DEFAULT_OUTPUT_NAME, display_name};
use pdfmerge::validation::Validator;

/// How long the naming assistant may take before the default name is used.
const NAMING_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        if let Error::Merge(merge_err) = &err {
            eprintln!("  {}", merge_err.user_message());
        }
        process::exit(err.exit_code());
    }
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence.
fn init_tracing(verbose: bool) {
    let default_directives = if verbose {
        "warn,pdfmerge=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), Error> {
    cli.validate()?;

    let inputs = cli.resolve_inputs().await?;
    let config = cli.to_config(inputs)?;
    let formatter = OutputFormatter::from_config(&config);

    if config.dry_run {
        return dry_run(&config, &formatter).await;
    }

    formatter.info(&format!("Merging {} PDF file(s)...", config.inputs.len()));

    let inputs = load_inputs(config.inputs(), config.effective_jobs()).await?;
    let file_names: Vec<String> = inputs.iter().filter_map(|i| i.name.clone()).collect();

    let merger = Merger::new(config.merge_options());
    let (merged, output) = tokio::join!(
        merger.merge(inputs),
        resolve_output(&config, file_names, &formatter)
    );
    let result = merged?;

    handle_output_overwrite(&output, config.overwrite_mode, &formatter)?;

    let writer = PdfWriter::new();
    writer.can_write(&output).await?;
    let write_stats = writer.save_with_stats(result.bytes, &output).await?;

    display_merge_statistics(&formatter, &result.statistics, &write_stats);

    Ok(())
}

/// Validate everything a merge would touch and report it.
async fn dry_run(config: &Config, formatter: &OutputFormatter) -> Result<(), Error> {
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_NAME));

    let validator = Validator::new();
    let mut summary = validator.validate_files(config.inputs()).await?;
    validator
        .validate_output(&output, config.overwrite_mode)
        .await?;
    summary.output = Some(output);

    if config.json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    display_validation_summary(formatter, &summary);
    formatter.blank_line();
    formatter.success("Dry run completed successfully");
    formatter.info("  Run without --dry-run to create the merged PDF");
    Ok(())
}

/// The output path: `--output`, a suggested name, or the default name.
///
/// Never fails. A naming failure only falls back to the default.
async fn resolve_output(
    config: &Config,
    file_names: Vec<String>,
    formatter: &OutputFormatter,
) -> PathBuf {
    if let Some(output) = &config.output {
        return output.clone();
    }

    if !config.suggest_name {
        return PathBuf::from(DEFAULT_OUTPUT_NAME);
    }

    match suggest_with_timeout(Arc::new(HeuristicNamer), file_names, NAMING_TIMEOUT).await {
        Ok(name) if !config.inputs.iter().any(|input| display_name(input) == name) => {
            formatter.debug(&format!("Suggested output name: {name}"));
            PathBuf::from(name)
        }
        Ok(name) => {
            debug!(suggestion = %name, "suggestion collides with an input, using default name");
            PathBuf::from(DEFAULT_OUTPUT_NAME)
        }
        Err(err) => {
            debug!(error = %err, "no name suggestion, using default name");
            PathBuf::from(DEFAULT_OUTPUT_NAME)
        }
    }
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<(), Error> {
    if !output.exists() {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(Error::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                return Err(Error::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| Error::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(Error::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmerge::config::{CompressionLevel, Metadata};
    use tempfile::NamedTempFile;

    fn create_test_config() -> Config {
        Config {
            inputs: vec![
                PathBuf::from("invoice-march.pdf"),
                PathBuf::from("invoice-april.pdf"),
            ],
            output: None,
            dry_run: false,
            json: false,
            verbose: false,
            quiet: true,
            overwrite_mode: OverwriteMode::Force,
            compression: CompressionLevel::Standard,
            metadata: Metadata::default(),
            jobs: None,
            suggest_name: false,
        }
    }

    fn names(config: &Config) -> Vec<String> {
        config.inputs.iter().map(|p| display_name(p)).collect()
    }

    #[test]
    fn test_handle_output_overwrite_force() {
        let temp_file = NamedTempFile::new().unwrap();
        let formatter = OutputFormatter::quiet();

        let result = handle_output_overwrite(temp_file.path(), OverwriteMode::Force, &formatter);
        assert!(result.is_ok());
    }

    #[test]
    fn test_handle_output_overwrite_no_clobber() {
        let temp_file = NamedTempFile::new().unwrap();
        let formatter = OutputFormatter::quiet();

        let result =
            handle_output_overwrite(temp_file.path(), OverwriteMode::NoClobber, &formatter);
        assert!(matches!(result, Err(Error::OutputExists { .. })));
    }

    #[test]
    fn test_handle_output_overwrite_prompt_when_quiet() {
        let temp_file = NamedTempFile::new().unwrap();
        let formatter = OutputFormatter::quiet();

        let result = handle_output_overwrite(temp_file.path(), OverwriteMode::Prompt, &formatter);
        assert!(matches!(result, Err(Error::OutputExists { .. })));
    }

    #[test]
    fn test_handle_output_overwrite_nonexistent() {
        let formatter = OutputFormatter::quiet();
        let result = handle_output_overwrite(
            Path::new("/nonexistent/output.pdf"),
            OverwriteMode::NoClobber,
            &formatter,
        );
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_output_prefers_explicit_path() {
        let mut config = create_test_config();
        config.output = Some(PathBuf::from("book.pdf"));
        config.suggest_name = true;

        let output = resolve_output(&config, names(&config), &OutputFormatter::quiet()).await;
        assert_eq!(output, PathBuf::from("book.pdf"));
    }

    #[tokio::test]
    async fn test_resolve_output_default_name() {
        let config = create_test_config();
        let output = resolve_output(&config, names(&config), &OutputFormatter::quiet()).await;
        assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT_NAME));
    }

    #[tokio::test]
    async fn test_resolve_output_suggested_name() {
        let mut config = create_test_config();
        config.suggest_name = true;

        let output = resolve_output(&config, names(&config), &OutputFormatter::quiet()).await;
        assert_eq!(output, PathBuf::from("invoice-merged.pdf"));
    }

    #[tokio::test]
    async fn test_resolve_output_falls_back_without_suggestion() {
        let mut config = create_test_config();
        config.inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
        config.suggest_name = true;

        let output = resolve_output(&config, names(&config), &OutputFormatter::quiet()).await;
        assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT_NAME));
    }
}
