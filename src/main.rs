// src/main.rs
mod collection;
mod extractors;
mod pipeline;
mod ranking;
mod source;
mod storage;
mod utils;

use std::path::PathBuf;

use clap::Parser;
use tokio::task::JoinSet;

use extractors::DEFAULT_TOP_K;
use pipeline::{PipelineOptions, DEFAULT_MIN_DOCUMENTS};
use source::PdfSource;
use storage::StorageManager;
use utils::error::CollectionError;
use utils::AppError;

/// Ranks PDF section headings against a persona and task, per collection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing Collection_* folders
    #[arg(short, long, env = "SECTION_RANKER_BASE_DIR", default_value = "/app")]
    base_dir: PathBuf,

    /// Output directory for analysis files (default: <base-dir>/output)
    #[arg(short, long, env = "SECTION_RANKER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Minimum number of PDFs a collection needs to be processed
    #[arg(long, default_value_t = DEFAULT_MIN_DOCUMENTS)]
    min_documents: usize,

    /// Number of top-ranked sections to refine
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Only process the named collection(s)
    #[arg(short, long = "collection")]
    collections: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting multi-collection PDF analysis: {:?}", args);

    if !args.base_dir.is_dir() {
        return Err(AppError::Config(format!(
            "Base directory {} does not exist",
            args.base_dir.display()
        )));
    }

    // 3. Initialize storage
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.base_dir.join("output"));
    let storage = StorageManager::new(&output_dir)?;

    // 4. Find collections
    let mut collections = collection::discover_collections(&args.base_dir)?;
    if !args.collections.is_empty() {
        collections.retain(|c| args.collections.contains(&c.name));
    }
    if collections.is_empty() {
        tracing::warn!("No collection folders found.");
        return Ok(());
    }
    tracing::info!("Found {} collections", collections.len());

    // 5. Process collections; each pipeline is independent
    let options = PipelineOptions {
        min_documents: args.min_documents,
        top_k: args.top_k,
    };
    let mut tasks = JoinSet::new();
    for (idx, collection) in collections.into_iter().enumerate() {
        let storage = storage.clone();
        tasks.spawn_blocking(move || {
            let result = pipeline::run_collection(&PdfSource::new(), &collection, &storage, options);
            (idx, collection.name, result)
        });
    }

    // 6. Report
    let mut success_count = 0;
    let mut skipped_count = 0;
    let mut failure_count = 0;

    let (mut results, task_failures) = join_collection_tasks(tasks).await;
    failure_count += task_failures;
    results.sort_by_key(|(idx, _, _)| *idx);

    let (mut total_documents, mut total_sections, mut total_excerpts) = (0, 0, 0);
    for (_, name, result) in results {
        match result {
            Ok(Some(summary)) => {
                tracing::debug!("{}: {:?}", name, summary);
                total_documents += summary.documents;
                total_sections += summary.sections;
                total_excerpts += summary.excerpts;
                success_count += 1;
            }
            Ok(None) => skipped_count += 1,
            Err(AppError::Collection(e @ CollectionError::MissingPdfDir(_))) => {
                tracing::warn!("{}, skipping.", e);
                skipped_count += 1;
            }
            Err(AppError::Collection(e @ CollectionError::NotEnoughDocuments { .. })) => {
                tracing::error!("Error: {}.", e);
                skipped_count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to process {}: {}", name, e);
                failure_count += 1;
            }
        }
    }

    tracing::info!(
        "Completed multi-collection PDF analysis. Processed: {}, Skipped: {}, Failures: {}",
        success_count,
        skipped_count,
        failure_count
    );
    tracing::info!(
        "Totals: {} PDFs, {} ranked sections, {} subsection analyses",
        total_documents,
        total_sections,
        total_excerpts
    );

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to process any of {} collections",
            failure_count
        )));
    }

    Ok(())
}

/// Waits for every collection task. A task that panicked or was cancelled
/// only loses its own collection; it is logged and counted as a failure.
async fn join_collection_tasks<T: 'static>(mut tasks: JoinSet<T>) -> (Vec<T>, usize) {
    let mut results = Vec::new();
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!("Collection task failed: {}", e);
                failures += 1;
            }
        }
    }
    (results, failures)
}
