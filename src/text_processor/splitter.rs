use crate::state::layout::UnitKind;
use crate::state::progress::scan_units;
use crate::text_processor::measure::{BudgetMeasure, LineMeasurer};
use crate::utils::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub index: usize,
    pub content: String,
    pub line_count: usize,
    pub cost: usize,
}

/// Packs whole lines into chunks. A line is only deferred to the next chunk
/// when adding it would push the running cost past the budget, and a line
/// larger than the budget is emitted alone rather than cut.
pub struct ChunkAccumulator {
    max_cost: usize,
    measurer: LineMeasurer,
    buffer: String,
    line_count: usize,
    running_cost: usize,
    next_index: usize,
}

impl ChunkAccumulator {
    pub fn new(max_cost: usize, measure: BudgetMeasure) -> Self {
        Self {
            max_cost,
            measurer: LineMeasurer::new(measure),
            buffer: String::new(),
            line_count: 0,
            running_cost: 0,
            next_index: 1,
        }
    }

    /// Adds one line (terminator included). Returns the chunk that had to be
    /// closed to make room for it, if any.
    pub fn push_line(&mut self, line: &str) -> Option<TextChunk> {
        let cost = self.measurer.cost(line);

        let flushed = if self.running_cost + cost > self.max_cost && !self.buffer.is_empty() {
            self.take_chunk()
        } else {
            None
        };

        self.buffer.push_str(line);
        self.line_count += 1;
        self.running_cost += cost;

        flushed
    }

    pub fn finish(mut self) -> Option<TextChunk> {
        if self.buffer.is_empty() {
            None
        } else {
            self.take_chunk()
        }
    }

    fn take_chunk(&mut self) -> Option<TextChunk> {
        let chunk = TextChunk {
            index: self.next_index,
            content: std::mem::take(&mut self.buffer),
            line_count: self.line_count,
            cost: self.running_cost,
        };
        self.next_index += 1;
        self.line_count = 0;
        self.running_cost = 0;
        Some(chunk)
    }
}

/// Splits text already in memory. Lines keep their terminators.
pub fn chunk_text(text: &str, max_cost: usize, measure: BudgetMeasure) -> Vec<TextChunk> {
    let mut accumulator = ChunkAccumulator::new(max_cost, measure);
    let mut chunks: Vec<TextChunk> = text
        .split_inclusive('\n')
        .filter_map(|line| accumulator.push_line(line))
        .collect();
    chunks.extend(accumulator.finish());
    chunks
}

pub struct LineSplitter {
    max_cost: usize,
    measure: BudgetMeasure,
}

impl LineSplitter {
    pub fn new(max_cost: usize, measure: BudgetMeasure) -> Self {
        Self { max_cost, measure }
    }

    /// Streams `input` into `chunk_NNNN.txt` units under `output_dir` and
    /// returns the number of chunks written.
    ///
    /// Units are written into a sibling `.partial` directory that is renamed
    /// onto `output_dir` only once the whole input has been split, so an
    /// interrupted split is never mistaken for a finished one.
    pub async fn split(&self, input: &Path, output_dir: &Path) -> Result<usize> {
        let staging = staging_dir(output_dir);
        if tokio::fs::try_exists(&staging)
            .await
            .map_err(|e| TranslatorError::split_io(&staging, e))?
        {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| TranslatorError::split_io(&staging, e))?;
        }
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| TranslatorError::split_io(&staging, e))?;

        let file = tokio::fs::File::open(input)
            .await
            .map_err(|e| TranslatorError::split_io(input, e))?;
        let mut reader = BufReader::new(file);
        let mut accumulator = ChunkAccumulator::new(self.max_cost, self.measure);
        let mut line = String::new();
        let mut total = 0;

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| TranslatorError::split_io(input, e))?;
            if read == 0 {
                break;
            }

            if let Some(chunk) = accumulator.push_line(&line) {
                write_chunk(&staging, &chunk).await?;
                total = chunk.index;
            }
        }

        if let Some(chunk) = accumulator.finish() {
            write_chunk(&staging, &chunk).await?;
            total = chunk.index;
        }

        tokio::fs::rename(&staging, output_dir)
            .await
            .map_err(|e| TranslatorError::split_io(output_dir, e))?;

        tracing::info!(
            input = %input.display(),
            chunks = total,
            max_cost = self.max_cost,
            measure = %self.measure,
            "Input split into chunks"
        );

        Ok(total)
    }
}

/// `split(inputPath, outputDir, maxChars) -> totalChunkCount`.
pub async fn split(
    input: &Path,
    output_dir: &Path,
    max_cost: usize,
    measure: BudgetMeasure,
) -> Result<usize> {
    LineSplitter::new(max_cost, measure).split(input, output_dir).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub total_chunks: usize,
    pub reused: bool,
}

/// Reuses an existing split directory as-is (its chunk count is the number of
/// source units it holds) or splits the input when there is none. A changed
/// budget does not trigger a re-split.
pub async fn prepare_split(
    input: &Path,
    split_dir: &Path,
    splitter: &LineSplitter,
) -> Result<SplitOutcome> {
    if tokio::fs::metadata(split_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        let total_chunks = scan_units(split_dir, UnitKind::Source).await?.len();
        tracing::info!(
            split_dir = %split_dir.display(),
            chunks = total_chunks,
            "Reusing existing split"
        );
        return Ok(SplitOutcome {
            total_chunks,
            reused: true,
        });
    }

    if !tokio::fs::try_exists(input).await.unwrap_or(false) {
        return Err(TranslatorError::FileNotFound(input.display().to_string()));
    }

    let total_chunks = splitter.split(input, split_dir).await?;
    Ok(SplitOutcome {
        total_chunks,
        reused: false,
    })
}

async fn write_chunk(dir: &Path, chunk: &TextChunk) -> Result<()> {
    let path = dir.join(UnitKind::Source.file_name(chunk.index));
    tokio::fs::write(&path, chunk.content.as_bytes())
        .await
        .map_err(|e| TranslatorError::split_io(&path, e))
}

fn staging_dir(output_dir: &Path) -> PathBuf {
    let mut name = output_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    output_dir.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ch: char, len: usize) -> String {
        let mut s: String = std::iter::repeat(ch).take(len - 1).collect();
        s.push('\n');
        s
    }

    #[test]
    fn test_seven_lines_pack_two_per_chunk() {
        let text: String = "abcdefg".chars().map(|c| line(c, 500)).collect();
        let chunks = chunk_text(&text, 1200, BudgetMeasure::Chars);

        let line_counts: Vec<usize> = chunks.iter().map(|c| c.line_count).collect();
        assert_eq!(line_counts, vec![2, 2, 2, 1]);
        assert_eq!(chunks[0].content, format!("{}{}", line('a', 500), line('b', 500)));
        assert_eq!(chunks[3].content, line('g', 500));
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_exact_fit_stays_in_chunk() {
        let text = format!("{}{}", line('a', 600), line('b', 600));
        let chunks = chunk_text(&text, 1200, BudgetMeasure::Chars);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].cost, 1200);

        let chunks = chunk_text(&text, 1199, BudgetMeasure::Chars);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_oversized_line_emitted_alone() {
        let text = format!("{}{}{}", line('a', 10), line('b', 50), line('c', 10));
        let chunks = chunk_text(&text, 20, BudgetMeasure::Chars);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].content, line('b', 50));
        assert_eq!(chunks[1].line_count, 1);
    }

    #[test]
    fn test_oversized_first_line_has_no_empty_chunk_before_it() {
        let text = format!("{}{}", line('a', 50), line('b', 5));
        let chunks = chunk_text(&text, 20, BudgetMeasure::Chars);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| !c.content.is_empty()));
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let text = "first\r\nsecond line\n\n한국어 문장입니다\nno trailing newline";
        for measure in [BudgetMeasure::Chars, BudgetMeasure::Bytes] {
            let chunks = chunk_text(text, 12, measure);
            let rebuilt: String = chunks.iter().map(|c| c.content.as_str()).collect();
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn test_measure_moves_boundaries() {
        // 9 chars but 25 bytes each
        let text = "가나다라마바사아\n".repeat(2);
        assert_eq!(chunk_text(&text, 20, BudgetMeasure::Chars).len(), 1);
        assert_eq!(chunk_text(&text, 20, BudgetMeasure::Bytes).len(), 2);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_text("", 100, BudgetMeasure::Chars).is_empty());
    }

    #[tokio::test]
    async fn test_split_writes_units() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.txt");
        let text: String = "abcdefg".chars().map(|c| line(c, 500)).collect();
        tokio::fs::write(&input, &text).await.unwrap();

        let out = dir.path().join("book_split");
        let total = split(&input, &out, 1200, BudgetMeasure::Chars).await.unwrap();
        assert_eq!(total, 4);

        let mut rebuilt = String::new();
        for index in 1..=total {
            let path = out.join(UnitKind::Source.file_name(index));
            rebuilt.push_str(&tokio::fs::read_to_string(path).await.unwrap());
        }
        assert_eq!(rebuilt, text);
        assert!(!dir.path().join("book_split.partial").exists());
    }

    #[tokio::test]
    async fn test_split_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.txt");
        tokio::fs::write(&input, "").await.unwrap();

        let out = dir.path().join("empty_split");
        let total = split(&input, &out, 1200, BudgetMeasure::Chars).await.unwrap();
        assert_eq!(total, 0);
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn test_split_missing_input_is_split_io() {
        let dir = tempfile::tempdir().unwrap();
        let result = split(
            &dir.path().join("missing.txt"),
            &dir.path().join("out"),
            100,
            BudgetMeasure::Chars,
        )
        .await;
        assert!(matches!(result, Err(TranslatorError::SplitIo { .. })));
    }

    #[tokio::test]
    async fn test_prepare_split_reuses_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("book.txt");
        let text: String = "abcdefg".chars().map(|c| line(c, 500)).collect();
        tokio::fs::write(&input, &text).await.unwrap();
        let split_dir = dir.path().join("book_split");

        let first = prepare_split(&input, &split_dir, &LineSplitter::new(1200, BudgetMeasure::Chars))
            .await
            .unwrap();
        assert_eq!(first, SplitOutcome { total_chunks: 4, reused: false });

        // A different budget does not re-split
        let second = prepare_split(&input, &split_dir, &LineSplitter::new(600, BudgetMeasure::Chars))
            .await
            .unwrap();
        assert_eq!(second, SplitOutcome { total_chunks: 4, reused: true });
    }
}
