//! Command-line interface for xogmerge.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cdata::restore_cdata;
use crate::directive::{AnchorMode, TransformOptions};
use crate::driver::{parse_driver, DriverEntry};
use crate::error::Result;
use crate::registry::{create_transform_registry, TransformEngine};
use crate::split::{chunk_file_name, split_instances};
use crate::validate::{check, OutputStatus};
use crate::xml::{Document, WriteOptions};

/// File name of the run report inside the output directory.
pub const REPORT_FILE: &str = "report.yaml";

/// xogmerge - Merge XOG views and lookups between deployments.
#[derive(Parser)]
#[command(name = "xogmerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transform every item of a driver and write the results.
    Run {
        /// Driver document listing the items to process
        #[arg(short, long)]
        driver: PathBuf,

        /// Directory holding the documents to transform, one folder per type
        #[arg(short, long)]
        input: PathBuf,

        /// Directory holding the auxiliary (source) documents
        #[arg(short, long)]
        aux: Option<PathBuf>,

        /// Directory the transformed documents and report are written to
        #[arg(short, long)]
        output: PathBuf,

        /// Fail field placements whose insertBefore anchor is missing
        #[arg(long)]
        strict_anchors: bool,
    },

    /// Check a XOG response document.
    Check {
        /// XOG response file
        file: PathBuf,
    },
}

/// Outcome of one driver item in the run report.
#[derive(Debug, Serialize)]
pub struct ItemReport {
    #[serde(rename = "type")]
    pub object_type: String,
    pub code: String,
    pub path: String,
    pub status: OutputStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// Run report written next to the transformed documents.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub driver: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

/// Run the CLI.
///
/// Returns the number of failed items.
pub fn run() -> Result<usize> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            driver,
            input,
            aux,
            output,
            strict_anchors,
        } => {
            let options = TransformOptions {
                anchor_mode: if strict_anchors {
                    AnchorMode::Strict
                } else {
                    AnchorMode::BestEffort
                },
            };
            let report = run_command(&driver, &input, aux.as_deref(), &output, options)?;
            Ok(report.failed)
        }
        Commands::Check { file } => check_command(&file).map(|()| 0),
    }
}

/// Process every driver item and write the report.
///
/// Item failures are recorded in the report; only driver, output directory
/// and report errors abort the run.
pub fn run_command(
    driver_path: &Path,
    input: &Path,
    aux: Option<&Path>,
    output: &Path,
    options: TransformOptions,
) -> Result<RunReport> {
    let driver = parse_driver(&read_file(driver_path)?)?;
    fs::create_dir_all(output)?;

    println!(
        "{} {} ({} items)",
        style("Processing").bold(),
        style(driver_path.display()).cyan(),
        driver.entries.len()
    );

    let engine = TransformEngine::new(create_transform_registry(), options);

    let pb = ProgressBar::new(driver.entries.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut items = Vec::with_capacity(driver.entries.len());
    for entry in &driver.entries {
        pb.set_message(entry.path.clone());

        let item = match process_entry(&engine, entry, input, aux, output) {
            Ok(files) => ItemReport {
                object_type: entry.object_type().to_string(),
                code: entry.directives.code.clone(),
                path: entry.path.clone(),
                status: OutputStatus::Success,
                error: None,
                files,
            },
            Err(e) => {
                tracing::warn!(path = %entry.path, error = %e, "Item failed");
                pb.println(format!(
                    "  {} {}: {e}",
                    style("failed").red().bold(),
                    entry.path
                ));
                ItemReport {
                    object_type: entry.object_type().to_string(),
                    code: entry.directives.code.clone(),
                    path: entry.path.clone(),
                    status: OutputStatus::Error,
                    error: Some(e.to_string()),
                    files: Vec::new(),
                }
            }
        };
        items.push(item);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let failed = items
        .iter()
        .filter(|i| i.status == OutputStatus::Error)
        .count();
    let report = RunReport {
        driver: driver_path.display().to_string(),
        total: items.len(),
        succeeded: items.len() - failed,
        failed,
        items,
    };

    let report_path = output.join(REPORT_FILE);
    fs::write(&report_path, serde_yaml_ng::to_string(&report)?)?;

    println!();
    println!(
        "{} {} succeeded, {} failed",
        style("Done:").green().bold(),
        style(report.succeeded).green(),
        if report.failed > 0 {
            style(report.failed).red().bold()
        } else {
            style(report.failed).dim()
        }
    );
    println!(
        "{} {}",
        style("Report:").green().bold(),
        report_path.display()
    );

    Ok(report)
}

/// Transform one item and write its output file(s).
///
/// Returns the written paths relative to the output directory.
fn process_entry(
    engine: &TransformEngine,
    entry: &DriverEntry,
    input: &Path,
    aux: Option<&Path>,
    output: &Path,
) -> Result<Vec<String>> {
    let type_dir = entry.object_type().to_string();

    let mut primary = Document::parse(&read_file(&input.join(&type_dir).join(&entry.path))?)?;
    let auxiliary = match aux.map(|dir| dir.join(&type_dir).join(&entry.path)) {
        Some(path) if path.is_file() => Some(Document::parse(&read_file(&path)?)?),
        Some(path) => {
            tracing::debug!(path = %path.display(), "No auxiliary document");
            None
        }
        None => None,
    };

    engine.execute(&mut primary, auxiliary.as_ref(), &entry.directives)?;

    let documents = match (&entry.instance_tag, entry.instances_per_file) {
        (Some(tag), Some(per_file)) => split_instances(&primary, tag, per_file)?
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| (chunk_file_name(&entry.path, i), chunk))
            .collect(),
        _ => vec![(entry.path.clone(), primary)],
    };

    let write_options = WriteOptions::default();
    let mut files = Vec::with_capacity(documents.len());
    for (relative, doc) in documents {
        let xml = restore_cdata(&doc.to_xml_string(&write_options), entry.object_type())?;
        let path = output.join(&type_dir).join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, xml)?;
        files.push(format!("{type_dir}/{relative}"));
    }
    Ok(files)
}

/// Execute the check command.
fn check_command(file: &Path) -> Result<()> {
    let doc = Document::parse(&read_file(file)?)?;
    let outcome = check(&doc)?;

    let label = match outcome.status {
        OutputStatus::Warning => style("warning").yellow().bold(),
        _ => style("success").green().bold(),
    };
    println!("{label} {}", file.display());
    if !outcome.debug.is_empty() {
        println!("  {}", outcome.debug);
    }
    Ok(())
}

/// Read a file, naming it in the error.
fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {e}", path.display())).into()
    })
}
