use crate::state::layout::UnitKind;
use crate::text_processor::merger::missing_indices;
use crate::utils::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Indices of every well-formed unit of `kind` in `dir`. A missing directory
/// has no units; names that do not parse are skipped.
pub async fn scan_units(dir: &Path, kind: UnitKind) -> Result<BTreeSet<usize>> {
    let mut indices = BTreeSet::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(indices),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str().and_then(|n| kind.parse_index(n)) {
            Some(index) => {
                indices.insert(index);
            }
            None => {
                tracing::debug!(file = ?name, "Skipping file without a chunk index");
            }
        }
    }

    Ok(indices)
}

/// `scan(translatedDir) -> setOfCompletedIndices`.
pub async fn scan(translated_dir: &Path) -> Result<BTreeSet<usize>> {
    scan_units(translated_dir, UnitKind::Translated).await
}

/// Writes a translated unit so that it either exists with its full content or
/// not at all: the bytes land in a dot-prefixed temp file that is renamed onto
/// the final name.
pub async fn persist_unit(path: &Path, content: &str) -> Result<()> {
    let temp = temp_path(path);

    let write = async {
        let mut file = tokio::fs::File::create(&temp).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp, path).await
    };

    if let Err(e) = write.await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }

    Ok(())
}

pub(crate) const TEMP_SUFFIX: &str = ".tmp";

pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}{}", name, TEMP_SUFFIX))
}

/// Progress of one run, recomputed from storage on every start.
#[derive(Debug, Clone)]
pub struct RunState {
    pub total_chunks: usize,
    pub completed: BTreeSet<usize>,
    started: Instant,
    translated_this_run: usize,
}

impl RunState {
    pub fn new(total_chunks: usize, completed: BTreeSet<usize>) -> Self {
        Self {
            total_chunks,
            completed,
            started: Instant::now(),
            translated_this_run: 0,
        }
    }

    pub async fn load(translated_dir: &Path, total_chunks: usize) -> Result<Self> {
        Ok(Self::new(total_chunks, scan(translated_dir).await?))
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Completed indices inside `1..=total_chunks`; stray units past the end of
    /// a shorter split are not counted.
    pub fn completed_count(&self) -> usize {
        if self.total_chunks == 0 {
            return 0;
        }
        self.completed.range(1..=self.total_chunks).count()
    }

    pub fn remaining(&self) -> usize {
        self.total_chunks.saturating_sub(self.completed_count())
    }

    pub fn missing(&self) -> Vec<usize> {
        missing_indices(&self.completed, self.total_chunks)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    pub fn progress(&self) -> f32 {
        if self.total_chunks > 0 {
            self.completed_count() as f32 / self.total_chunks as f32
        } else {
            1.0
        }
    }

    pub fn mark_completed(&mut self, index: usize) {
        if self.completed.insert(index) {
            self.translated_this_run += 1;
        }
    }

    /// Estimate from the pace of chunks translated in this process.
    pub fn estimated_time_remaining(&self) -> Option<Duration> {
        if self.translated_this_run == 0 {
            return None;
        }
        let per_chunk = self.started.elapsed() / self.translated_this_run as u32;
        Some(per_chunk * self.remaining() as u32)
    }
}
