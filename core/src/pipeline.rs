//! Batch extraction pipeline
//!
//! Each source object is processed independently by a worker from a
//! fixed-size pool; the only shared state is the read-only extractor
//! chain and the store, whose per-series append is the single
//! serializing step. A failure on one object never aborts the batch.

use crate::api::MetadataExtractor;
use crate::error::Result;
use crate::store::{InsertOutcome, SeriesStore};
use crate::temporal::RolloverPolicy;
use crate::vendor::ExtractorChain;
use dicom_object::open_file;
use indicatif::ParallelProgressIterator;
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Pipeline configuration, constructed once at startup and shared by
/// reference with every worker
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Upper bound on worker threads; the pool never exceeds the
    /// available cores and never drops below one
    pub max_workers: Option<usize>,
    /// Rollover heuristic boundaries
    pub rollover: RolloverPolicy,
    /// Render a progress bar during the run
    pub progress: bool,
}

/// Counters for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BatchSummary {
    /// Records stored
    pub processed: usize,
    /// Objects whose series was already stored
    pub duplicate_series: usize,
    /// Objects that could not be read or keyed
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.duplicate_series + self.failed
    }
}

enum ObjectOutcome {
    Stored,
    Duplicate,
    Failed,
}

/// Runs extraction and normalization over a set of files
///
/// Objects are processed in parallel; per-object failures are logged
/// with the file path and counted, never propagated.
pub fn run_batch(
    files: &[PathBuf],
    config: &PipelineConfig,
    store: &dyn SeriesStore,
) -> BatchSummary {
    let chain = ExtractorChain::standard();
    let workers = worker_count(config.max_workers);
    info!(
        "processing {} file(s) with {} worker(s)",
        files.len(),
        workers
    );

    let run = || -> Vec<ObjectOutcome> {
        let process = |path: &PathBuf| process_object(path, &chain, config, store);
        if config.progress {
            files
                .par_iter()
                .progress_count(files.len() as u64)
                .map(process)
                .collect()
        } else {
            files.par_iter().map(process).collect()
        }
    };

    let outcomes = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("failed to build worker pool ({}); using default pool", e);
            run()
        }
    };

    let mut summary = BatchSummary::default();
    for outcome in outcomes {
        match outcome {
            ObjectOutcome::Stored => summary.processed += 1,
            ObjectOutcome::Duplicate => summary.duplicate_series += 1,
            ObjectOutcome::Failed => summary.failed += 1,
        }
    }
    info!(
        "batch done: {} stored, {} duplicate series, {} failed",
        summary.processed, summary.duplicate_series, summary.failed
    );
    summary
}

fn process_object(
    path: &Path,
    chain: &ExtractorChain,
    config: &PipelineConfig,
    store: &dyn SeriesStore,
) -> ObjectOutcome {
    let record = match extract_one(path, chain, &config.rollover) {
        Ok(record) => record,
        Err(e) => {
            warn!("skipping {}: {}", path.display(), e);
            return ObjectOutcome::Failed;
        }
    };
    match store.append(record) {
        InsertOutcome::Inserted => ObjectOutcome::Stored,
        InsertOutcome::DuplicateSeries => ObjectOutcome::Duplicate,
        InsertOutcome::Unkeyed => {
            warn!("skipping {}: object carries no series or SOP identifier", path.display());
            ObjectOutcome::Failed
        }
    }
}

fn extract_one(
    path: &Path,
    chain: &ExtractorChain,
    rollover: &RolloverPolicy,
) -> Result<crate::api::ObjectRecord> {
    let dcm = open_file(path)?;
    let mut record = MetadataExtractor::extract(&dcm, chain, rollover)?;
    record.source_path = Some(path.to_path_buf());
    Ok(record)
}

/// Clamps the worker count to [1, available cores], bounded above by
/// the configured maximum
fn worker_count(max_workers: Option<usize>) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match max_workers {
        Some(max) => available.min(max).max(1),
        None => available.max(1),
    }
}

/// Collects candidate DICOM files under a directory, recursively
///
/// Skips macOS resource-fork droppings (`._*`) and `__MACOSX` folders.
/// Files without an extension are probed for the DICM magic.
pub fn collect_dicom_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    visit(directory, &mut files)?;
    files.sort();
    Ok(files)
}

fn visit(directory: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if name != "__MACOSX" {
                visit(&path, files)?;
            }
            continue;
        }
        if name.starts_with("._") {
            continue;
        }
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") => {
                files.push(path);
            }
            None if has_dicm_magic(&path) => {
                info!("found headerless DICOM file: {}", path.display());
                files.push(path);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Checks for the 128-byte preamble followed by the "DICM" magic
fn has_dicm_magic(path: &Path) -> bool {
    use std::fs::File;
    use std::io::Read;

    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let mut buffer = [0u8; 132];
    match file.read(&mut buffer) {
        Ok(n) if n >= 132 => &buffer[128..132] == b"DICM",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_unreadable_objects_never_abort_the_batch() {
        let files = vec![
            PathBuf::from("/nonexistent/a.dcm"),
            PathBuf::from("/nonexistent/b.dcm"),
        ];
        let store = MemoryStore::new();
        let summary = run_batch(&files, &PipelineConfig::default(), &store);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.processed, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(Some(1)), 1);
        assert!(worker_count(Some(0)) >= 1);
        assert!(worker_count(None) >= 1);
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert!(worker_count(Some(10_000)) <= available);
    }

    #[test]
    fn test_collect_skips_macos_droppings() {
        let root = std::env::temp_dir().join(format!(
            "radnorm-collect-test-{}",
            std::process::id()
        ));
        let nested = root.join("__MACOSX");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("scan.dcm"), b"x").unwrap();
        std::fs::write(root.join("._scan.dcm"), b"x").unwrap();
        std::fs::write(root.join("notes.txt"), b"x").unwrap();
        std::fs::write(nested.join("ghost.dcm"), b"x").unwrap();

        let files = collect_dicom_files(&root).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("scan.dcm"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_summary_total() {
        let summary = BatchSummary {
            processed: 3,
            duplicate_series: 2,
            failed: 1,
        };
        assert_eq!(summary.total(), 6);
    }
}
