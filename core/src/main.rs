use clap::{Parser, ValueEnum};
use log::{error, info};
use radnorm_core::{
    collect_dicom_files, run_batch, select_representatives, BatchReport, MemoryStore,
    PipelineConfig, RolloverPolicy, SeriesStore,
};
use std::path::PathBuf;
use std::process;

/// CLI tool for normalizing DICOM metadata from a directory
#[derive(Parser, Debug)]
#[command(name = "radnorm")]
#[command(about = "Extract, normalize and reconcile DICOM metadata from a directory")]
#[command(version)]
struct Cli {
    /// Directory containing DICOM files
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Maximum number of worker threads
    #[arg(short, long)]
    max_workers: Option<usize>,

    /// Study hour at or after which a midnight rollover may be suspected
    #[arg(long, default_value_t = 22)]
    rollover_study_hour: u8,

    /// Acquisition hour at or before which a midnight rollover may be suspected
    #[arg(long, default_value_t = 6)]
    rollover_acquisition_hour: u8,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    // Verify directory exists
    if !cli.directory.is_dir() {
        eprintln!("Error: {} is not a directory", cli.directory.display());
        process::exit(1);
    }

    info!("Processing directory: {}", cli.directory.display());

    let files = match collect_dicom_files(&cli.directory) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read directory: {}", e);
            eprintln!("Error: Failed to read directory: {}", e);
            process::exit(1);
        }
    };

    if files.is_empty() {
        eprintln!("Error: No DICOM files (.dcm) found in directory");
        process::exit(1);
    }

    info!("Found {} DICOM files", files.len());

    let config = PipelineConfig {
        max_workers: cli.max_workers,
        rollover: RolloverPolicy {
            late_study_hour: cli.rollover_study_hour,
            early_acquisition_hour: cli.rollover_acquisition_hour,
        },
        progress: true,
    };

    let store = MemoryStore::new();
    let summary = run_batch(&files, &config, &store);
    let representatives = select_representatives(&store.series_summaries());

    match cli.format {
        OutputFormat::Text => {
            let report = BatchReport::new(&summary, &representatives);
            println!("{}", report);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(&store, &summary, &representatives) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

#[cfg(feature = "json")]
fn output_json(
    store: &MemoryStore,
    summary: &radnorm_core::BatchSummary,
    representatives: &[radnorm_core::RepresentativeChoice],
) -> Result<String, serde_json::Error> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct BatchJson<'a> {
        summary: &'a radnorm_core::BatchSummary,
        representatives: &'a [radnorm_core::RepresentativeChoice],
        records: Vec<radnorm_core::ObjectRecord>,
    }

    serde_json::to_string_pretty(&BatchJson {
        summary,
        representatives,
        records: store.records(),
    })
}
