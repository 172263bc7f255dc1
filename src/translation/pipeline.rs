use crate::state::layout::RunLayout;
use crate::state::progress::{persist_unit, RunState};
use crate::translation::languages::LanguagePair;
use crate::translation::provider::TranslationProvider;
use crate::utils::{strip_bom, FatalPipelineError, Result, TranslatorError};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub skipped: usize,
    pub translated: usize,
    /// Whitespace-only chunks copied through without a provider call.
    pub passed_through: usize,
}

enum ChunkOutcome {
    Translated,
    PassedThrough,
}

/// Walks chunk indices in ascending order, translating each one that has no
/// translated unit yet and persisting the result before moving on. The first
/// failure ends the walk.
pub struct PipelineController<'a> {
    layout: &'a RunLayout,
    pair: LanguagePair,
}

impl<'a> PipelineController<'a> {
    pub fn new(layout: &'a RunLayout, pair: LanguagePair) -> Self {
        Self { layout, pair }
    }

    pub async fn run<P>(
        &self,
        state: &mut RunState,
        provider: &mut P,
    ) -> std::result::Result<RunReport, FatalPipelineError>
    where
        P: TranslationProvider + ?Sized,
    {
        let total = state.total_chunks;
        let mut report = RunReport::default();

        for index in 1..=total {
            if state.is_completed(index) {
                info!(chunk_index = index, total_chunks = total, "Already translated, skipping");
                report.skipped += 1;
                continue;
            }

            info!(chunk_index = index, total_chunks = total, "Translating chunk");

            let outcome = self
                .process_chunk(index, provider)
                .await
                .map_err(|source| FatalPipelineError {
                    index,
                    total,
                    source,
                })?;

            match outcome {
                ChunkOutcome::Translated => report.translated += 1,
                ChunkOutcome::PassedThrough => report.passed_through += 1,
            }
            state.mark_completed(index);

            info!(
                chunk_index = index,
                total_chunks = total,
                remaining = state.remaining(),
                eta_seconds = ?state.estimated_time_remaining().map(|d| d.as_secs()),
                "Chunk translated"
            );
        }

        Ok(report)
    }

    async fn process_chunk<P>(&self, index: usize, provider: &mut P) -> Result<ChunkOutcome>
    where
        P: TranslationProvider + ?Sized,
    {
        let content = tokio::fs::read_to_string(self.layout.source_unit(index)).await?;
        let target = self.layout.translated_unit(index);

        let text = strip_bom(&content).trim();
        if text.is_empty() {
            persist_unit(&target, &content).await?;
            return Ok(ChunkOutcome::PassedThrough);
        }

        self.ensure_language(provider).await?;

        let translated = provider.translate(text, &self.pair).await?;
        let translated = translated.trim();
        if translated.is_empty() {
            return Err(TranslatorError::ProviderEmptyResult);
        }

        persist_unit(&target, translated).await?;
        Ok(ChunkOutcome::Translated)
    }

    /// Puts the provider back on the run's pair if its session wandered off.
    async fn ensure_language<P>(&self, provider: &mut P) -> Result<()>
    where
        P: TranslationProvider + ?Sized,
    {
        let active = provider.active_pair().await?;
        if active == self.pair {
            return Ok(());
        }

        warn!(
            provider = provider.name(),
            active = %active,
            expected = %self.pair,
            "Provider language changed, restoring"
        );
        provider.reconfigure(&self.pair).await?;

        let restored = provider.active_pair().await?;
        if restored != self.pair {
            return Err(TranslatorError::ProviderSession(format!(
                "language drift could not be corrected: provider reports {} after reset to {}",
                restored, self.pair
            )));
        }

        Ok(())
    }
}
