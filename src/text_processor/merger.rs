use crate::state::layout::UnitKind;
use crate::state::progress::{scan_units, temp_path};
use crate::utils::{Result, TranslatorError};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub units_merged: usize,
    pub bytes_written: u64,
}

/// Concatenates the translated units of a split of `total` chunks into
/// `output_path`.
///
/// Units are ordered by the index parsed from their names, never by how the
/// directory lists them, and each unit is followed by a single `\n`. Units
/// numbered past `total` belong to an older, longer split and are left out.
/// No completeness check happens here; see [`verify_complete`].
///
/// The output is assembled in a temp file beside `output_path` and renamed
/// over it at the end, so a failed merge leaves any previous output intact.
pub async fn merge(translated_dir: &Path, output_path: &Path, total: usize) -> Result<MergeReport> {
    let present = scan_units(translated_dir, UnitKind::Translated).await?;

    let stray: Vec<usize> = present.range(total.saturating_add(1)..).copied().collect();
    if !stray.is_empty() {
        warn!(
            dir = %translated_dir.display(),
            total_chunks = total,
            stray = ?stray,
            "Ignoring translated units past the end of the split"
        );
    }
    let indices: Vec<usize> = present.into_iter().filter(|&index| index <= total).collect();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let temp = temp_path(output_path);
    let write = async {
        let mut output = tokio::fs::File::create(&temp).await?;
        let mut bytes_written = 0u64;

        for &index in &indices {
            let unit = translated_dir.join(UnitKind::Translated.file_name(index));
            let content = tokio::fs::read_to_string(&unit).await?;

            output.write_all(content.as_bytes()).await?;
            output.write_all(b"\n").await?;
            bytes_written += content.len() as u64 + 1;
        }

        output.flush().await?;
        output.sync_all().await?;
        drop(output);
        tokio::fs::rename(&temp, output_path).await?;
        Ok::<_, TranslatorError>(bytes_written)
    };

    let bytes_written = match write.await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
    };

    tracing::info!(
        output = %output_path.display(),
        units = indices.len(),
        bytes = bytes_written,
        "Translated units merged"
    );

    Ok(MergeReport {
        units_merged: indices.len(),
        bytes_written,
    })
}

/// Indices in `1..=total` that have no completed unit.
pub fn missing_indices(completed: &BTreeSet<usize>, total: usize) -> Vec<usize> {
    (1..=total).filter(|i| !completed.contains(i)).collect()
}

/// Fails with `IncompleteRun` unless every index in `1..=total` is present.
pub fn verify_complete(completed: &BTreeSet<usize>, total: usize) -> Result<()> {
    let missing = missing_indices(completed, total);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TranslatorError::IncompleteRun { total, missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_unit(dir: &Path, index: usize, content: &str) {
        tokio::fs::write(dir.join(UnitKind::Translated.file_name(index)), content)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_merge_orders_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for index in (1..=11).rev() {
            write_unit(dir.path(), index, &format!("unit {}", index)).await;
        }

        let output = dir.path().join("merged.txt");
        let report = merge(dir.path(), &output, 11).await.unwrap();
        assert_eq!(report.units_merged, 11);

        let merged = tokio::fs::read_to_string(&output).await.unwrap();
        let expected: String = (1..=11).map(|i| format!("unit {}\n", i)).collect();
        assert_eq!(merged, expected);
        assert_eq!(report.bytes_written, expected.len() as u64);

        let nine = merged.find("unit 9\n").unwrap();
        let ten = merged.find("unit 10\n").unwrap();
        assert!(nine < ten);
    }

    #[tokio::test]
    async fn test_merge_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(dir.path(), 2, "second").await;
        write_unit(dir.path(), 1, "first").await;
        tokio::fs::write(dir.path().join("notes.txt"), "ignore me").await.unwrap();
        tokio::fs::write(dir.path().join(".translated_chunk_0003.txt.tmp"), "partial")
            .await
            .unwrap();

        let output = dir.path().join("out").join("merged.txt");
        merge(dir.path(), &output, 2).await.unwrap();
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "first\nsecond\n"
        );
    }

    #[tokio::test]
    async fn test_merge_zero_units_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("merged.txt");

        let report = merge(dir.path(), &output, 0).await.unwrap();
        assert_eq!(report.units_merged, 0);
        assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_merge_leaves_out_units_past_total() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(dir.path(), 1, "first").await;
        write_unit(dir.path(), 2, "second").await;
        write_unit(dir.path(), 9, "left over from a longer split").await;

        let output = dir.path().join("merged.txt");
        let report = merge(dir.path(), &output, 2).await.unwrap();

        assert_eq!(report.units_merged, 2);
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "first\nsecond\n"
        );
    }

    #[tokio::test]
    async fn test_failed_merge_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let units = dir.path().join("units");
        tokio::fs::create_dir_all(&units).await.unwrap();
        write_unit(&units, 1, "first").await;
        tokio::fs::write(units.join(UnitKind::Translated.file_name(2)), [0xff, 0xfe, 0xfd])
            .await
            .unwrap();

        let output = dir.path().join("merged.txt");
        tokio::fs::write(&output, "previous merge\n").await.unwrap();

        let err = merge(&units, &output, 2).await.unwrap_err();
        assert!(matches!(err, TranslatorError::IoError(_)));
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "previous merge\n"
        );
        assert!(!temp_path(&output).exists());
    }

    #[test]
    fn test_verify_complete() {
        let completed: BTreeSet<usize> = [1, 2, 4].into_iter().collect();
        assert_eq!(missing_indices(&completed, 5), vec![3, 5]);

        match verify_complete(&completed, 5) {
            Err(TranslatorError::IncompleteRun { total, missing }) => {
                assert_eq!(total, 5);
                assert_eq!(missing, vec![3, 5]);
            }
            other => panic!("expected IncompleteRun, got {:?}", other),
        }

        assert!(verify_complete(&completed, 2).is_ok());
        assert!(verify_complete(&BTreeSet::new(), 0).is_ok());
    }
}
