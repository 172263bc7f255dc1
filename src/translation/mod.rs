pub mod anthropic;
mod http;
pub mod languages;
pub mod mock;
pub mod papago;
pub mod pipeline;
pub mod provider;
pub mod surface;

pub use anthropic::AnthropicProvider;
pub use languages::{Language, LanguagePair, LANGUAGES};
pub use papago::PapagoProvider;
pub use pipeline::{PipelineController, RunReport};
pub use provider::TranslationProvider;
pub use surface::{SurfaceProvider, TranslatorSurface};

use crate::state::{
    reset_run, reset_split, scan_units, split_dir, sweep_partial_units, RunLayout, RunState,
    UnitKind,
};
use crate::text_processor::{
    merge, prepare_split, verify_complete, BudgetMeasure, LineSplitter, SplitOutcome,
};
use crate::utils::{ProviderConfig, ProviderKind, Result, TranslatorError};
use std::path::{Path, PathBuf};
use tracing::Instrument;
use uuid::Uuid;

/// Everything one invocation needs to know about the file it translates.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub input: PathBuf,
    pub work_dir: PathBuf,
    pub pair: LanguagePair,
    pub max_chars: usize,
    pub measure: BudgetMeasure,
    /// Throw away the existing split and translations before starting.
    pub resplit: bool,
}

impl TranslationJob {
    pub fn layout(&self) -> Result<RunLayout> {
        RunLayout::new(&self.work_dir, &self.input, &self.pair)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub total_chunks: usize,
    pub reused_split: bool,
    pub report: RunReport,
    pub merged_path: PathBuf,
}

/// Builds the provider named in the config, already pointed at `pair`.
pub fn provider_from_config(
    config: &ProviderConfig,
    pair: LanguagePair,
) -> Result<Box<dyn TranslationProvider>> {
    let provider: Box<dyn TranslationProvider> = match config.kind {
        ProviderKind::Papago => Box::new(PapagoProvider::new(config.clone(), pair)?),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(config.clone(), pair)?),
    };
    Ok(provider)
}

/// Split (or reuse the split), translate every missing chunk, check nothing is
/// missing, merge. The provider is shut down before returning whatever the
/// outcome, and completed units always stay on disk for the next run.
pub async fn run_translation_job<P>(job: &TranslationJob, provider: &mut P) -> Result<RunSummary>
where
    P: TranslationProvider + ?Sized,
{
    let run_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("run", run_id = %run_id, pair = %job.pair);

    let result = execute(job, provider, run_id.clone()).instrument(span).await;

    if let Err(e) = provider.shutdown().await {
        tracing::warn!(run_id = %run_id, error = %e, "Provider shutdown failed");
    }

    if let Err(TranslatorError::Fatal(fatal)) = &result {
        tracing::error!(
            run_id = %run_id,
            chunk_index = fatal.index,
            total_chunks = fatal.total,
            error = %fatal.source,
            provider_failure = fatal.source.is_provider_failure(),
            "Translation failed; completed chunks are kept for the next run"
        );
    }

    result
}

async fn execute<P>(job: &TranslationJob, provider: &mut P, run_id: String) -> Result<RunSummary>
where
    P: TranslationProvider + ?Sized,
{
    let layout = job.layout()?;

    if job.resplit {
        reset_run(&layout).await?;
    }

    let splitter = LineSplitter::new(job.max_chars, job.measure);
    let split = prepare_split(&job.input, &layout.split_dir, &splitter).await?;

    tokio::fs::create_dir_all(&layout.translated_dir).await?;
    sweep_partial_units(&layout.translated_dir).await?;

    let mut state = RunState::load(&layout.translated_dir, split.total_chunks).await?;
    tracing::info!(
        total_chunks = state.total_chunks,
        completed = state.completed_count(),
        remaining = state.remaining(),
        "Resuming from translated units"
    );

    let report = if state.is_complete() {
        RunReport {
            skipped: state.total_chunks,
            ..RunReport::default()
        }
    } else {
        provider.reconfigure(&job.pair).await?;
        PipelineController::new(&layout, job.pair)
            .run(&mut state, provider)
            .await?
    };

    verify_complete(&state.completed, state.total_chunks)?;
    merge(&layout.translated_dir, &layout.merged_path, state.total_chunks).await?;

    tracing::info!(
        merged = %layout.merged_path.display(),
        translated = report.translated,
        skipped = report.skipped,
        "Run complete"
    );

    Ok(RunSummary {
        run_id,
        total_chunks: state.total_chunks,
        reused_split: split.reused,
        report,
        merged_path: layout.merged_path,
    })
}

/// Splits `input` without translating. With `resplit`, the old split and every
/// translation made from it are removed first.
pub async fn split_input(
    input: &Path,
    work_dir: &Path,
    splitter: &LineSplitter,
    resplit: bool,
) -> Result<(PathBuf, SplitOutcome)> {
    if resplit {
        reset_split(work_dir, input).await?;
    }

    let dir = split_dir(work_dir, input)?;
    let outcome = prepare_split(input, &dir, splitter).await?;
    Ok((dir, outcome))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunStatus {
    pub split_exists: bool,
    pub total_chunks: usize,
    pub completed: usize,
    pub remaining: usize,
    pub missing: Vec<usize>,
    pub progress: f32,
}

/// Progress of a job as stored on disk. Never splits and never contacts a
/// provider.
pub async fn run_status(job: &TranslationJob) -> Result<RunStatus> {
    let layout = job.layout()?;
    let split_exists = tokio::fs::metadata(&layout.split_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let total_chunks = scan_units(&layout.split_dir, UnitKind::Source).await?.len();
    let state = RunState::load(&layout.translated_dir, total_chunks).await?;

    Ok(RunStatus {
        split_exists,
        total_chunks,
        completed: state.completed_count(),
        remaining: state.remaining(),
        missing: state.missing(),
        progress: state.progress(),
    })
}

/// Merges whatever translated units exist. Unless `allow_gaps` is set, a
/// missing chunk is an `IncompleteRun` error and nothing is written.
pub async fn merge_job(job: &TranslationJob, allow_gaps: bool) -> Result<PathBuf> {
    let layout = job.layout()?;
    let total_chunks = scan_units(&layout.split_dir, UnitKind::Source).await?.len();
    let state = RunState::load(&layout.translated_dir, total_chunks).await?;

    if allow_gaps {
        let missing = state.missing();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "Merging with missing chunks");
        }
    } else {
        verify_complete(&state.completed, total_chunks)?;
    }

    merge(&layout.translated_dir, &layout.merged_path, total_chunks).await?;
    Ok(layout.merged_path)
}
