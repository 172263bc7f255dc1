use crate::state::layout::{split_dir, translated_dir_prefix, RunLayout};
use crate::state::progress::TEMP_SUFFIX;
use crate::translation::LANGUAGES;
use crate::utils::Result;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub temp_files_deleted: usize,
    pub dirs_removed: usize,
}

/// Deletes temp files left behind by a unit write that was interrupted before
/// its rename.
pub async fn sweep_partial_units(dir: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.temp_files_deleted += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete partial unit"),
            }
        }
    }

    if report.temp_files_deleted > 0 {
        info!(
            dir = %dir.display(),
            temp_files_deleted = report.temp_files_deleted,
            "Removed partial units from an interrupted run"
        );
    }

    Ok(report)
}

/// Removes the split directory of `input` together with the translated
/// directory of every target language. Translated units are keyed by chunk
/// index, so once the split is redone no earlier translation lines up with the
/// new chunks, whichever pair it was made for.
pub async fn reset_split(work_dir: &Path, input: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    if remove_dir_if_present(&split_dir(work_dir, input)?).await? {
        report.dirs_removed += 1;
    }

    let prefix = translated_dir_prefix(input)?;
    let mut entries = match tokio::fs::read_dir(work_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let is_translated_dir = name
            .to_str()
            .and_then(|n| n.strip_prefix(prefix.as_str()))
            .map(|code| LANGUAGES.iter().any(|lang| lang.code == code))
            .unwrap_or(false);

        if is_translated_dir && remove_dir_if_present(&entry.path()).await? {
            report.dirs_removed += 1;
        }
    }

    info!(dirs_removed = report.dirs_removed, "Split reset");
    Ok(report)
}

/// `reset_split` for the input of `layout`.
pub async fn reset_run(layout: &RunLayout) -> Result<CleanupReport> {
    reset_split(&layout.work_dir, &layout.input).await
}

pub async fn remove_dir_if_present(dir: &Path) -> Result<bool> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!(dir = %dir.display(), "Removed directory");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::LanguagePair;

    #[tokio::test]
    async fn test_sweep_removes_only_temp_units() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(".translated_chunk_0002.txt.tmp"), "half")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("translated_chunk_0001.txt"), "done")
            .await
            .unwrap();

        let report = sweep_partial_units(dir.path()).await.unwrap();
        assert_eq!(report.temp_files_deleted, 1);
        assert!(dir.path().join("translated_chunk_0001.txt").exists());
        assert!(!dir.path().join(".translated_chunk_0002.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_reset_run_removes_split_and_translated_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let pair = LanguagePair::from_codes("ja", "ko").unwrap();
        let layout = RunLayout::new(dir.path(), Path::new("story.txt"), &pair).unwrap();

        tokio::fs::create_dir_all(&layout.split_dir).await.unwrap();
        tokio::fs::create_dir_all(&layout.translated_dir).await.unwrap();
        let report = reset_run(&layout).await.unwrap();
        assert_eq!(report.dirs_removed, 2);
        assert!(!layout.split_dir.exists());
        assert!(!layout.translated_dir.exists());

        let report = reset_run(&layout).await.unwrap();
        assert_eq!(report.dirs_removed, 0);
    }

    #[tokio::test]
    async fn test_reset_split_clears_every_target_language() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "story_split",
            "story_translated_en",
            "story_translated_zh-CN",
            "story_translated_notes",
            "story2_translated_en",
            "other_split",
        ] {
            tokio::fs::create_dir_all(dir.path().join(name)).await.unwrap();
        }
        tokio::fs::write(dir.path().join("story_ja-en_translated.txt"), "merged")
            .await
            .unwrap();

        let report = reset_split(dir.path(), Path::new("story.txt")).await.unwrap();

        assert_eq!(report.dirs_removed, 3);
        assert!(!dir.path().join("story_split").exists());
        assert!(!dir.path().join("story_translated_en").exists());
        assert!(!dir.path().join("story_translated_zh-CN").exists());
        assert!(dir.path().join("story_translated_notes").exists());
        assert!(dir.path().join("story2_translated_en").exists());
        assert!(dir.path().join("other_split").exists());
        assert!(dir.path().join("story_ja-en_translated.txt").exists());
    }

    #[tokio::test]
    async fn test_reset_split_missing_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("absent");

        let report = reset_split(&work_dir, Path::new("story.txt")).await.unwrap();
        assert_eq!(report, CleanupReport::default());
    }
}
