use crate::translation::LanguagePair;
use crate::utils::{Result, TranslatorError};
use std::path::{Path, PathBuf};

pub const UNIT_EXTENSION: &str = ".txt";

/// The two kinds of addressable units a run keeps on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Source,
    Translated,
}

impl UnitKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            UnitKind::Source => "chunk_",
            UnitKind::Translated => "translated_chunk_",
        }
    }

    /// `chunk_0007.txt` / `translated_chunk_0007.txt`. Indices past 9999 widen.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}{:04}{}", self.prefix(), index, UNIT_EXTENSION)
    }

    /// Recovers the 1-based index from a unit file name. Anything that is not
    /// prefix + digits + extension, or that encodes index 0, yields `None`.
    pub fn parse_index(&self, file_name: &str) -> Option<usize> {
        let digits = file_name
            .strip_prefix(self.prefix())?
            .strip_suffix(UNIT_EXTENSION)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        digits.parse::<usize>().ok().filter(|&index| index > 0)
    }
}

/// Where a run keeps its split units, translated units and merged output,
/// all derived from the input file's base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub work_dir: PathBuf,
    pub input: PathBuf,
    pub split_dir: PathBuf,
    pub translated_dir: PathBuf,
    pub merged_path: PathBuf,
}

impl RunLayout {
    pub fn new(work_dir: &Path, input: &Path, pair: &LanguagePair) -> Result<Self> {
        let base = base_name(input)?;

        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            input: input.to_path_buf(),
            split_dir: split_dir(work_dir, input)?,
            translated_dir: work_dir.join(format!(
                "{}{}",
                translated_dir_prefix(input)?,
                pair.target.code
            )),
            merged_path: work_dir.join(format!(
                "{}_{}-{}_translated{}",
                base, pair.source.code, pair.target.code, UNIT_EXTENSION
            )),
        })
    }

    pub fn source_unit(&self, index: usize) -> PathBuf {
        self.split_dir.join(UnitKind::Source.file_name(index))
    }

    pub fn translated_unit(&self, index: usize) -> PathBuf {
        self.translated_dir.join(UnitKind::Translated.file_name(index))
    }
}

/// Split units depend only on the input, so the split directory is shared by
/// every language pair translated from it.
pub fn split_dir(work_dir: &Path, input: &Path) -> Result<PathBuf> {
    Ok(work_dir.join(format!("{}_split", base_name(input)?)))
}

/// Every translated directory of `input` starts with this, one per target
/// language.
pub fn translated_dir_prefix(input: &Path) -> Result<String> {
    Ok(format!("{}_translated_", base_name(input)?))
}

fn base_name(input: &Path) -> Result<String> {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            TranslatorError::ConfigError(format!(
                "input path has no file name: {}",
                input.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_file_names() {
        assert_eq!(UnitKind::Source.file_name(7), "chunk_0007.txt");
        assert_eq!(UnitKind::Translated.file_name(7), "translated_chunk_0007.txt");
        assert_eq!(UnitKind::Source.file_name(12345), "chunk_12345.txt");
    }

    #[test]
    fn test_parse_index() {
        let kind = UnitKind::Translated;
        assert_eq!(kind.parse_index("translated_chunk_0007.txt"), Some(7));
        assert_eq!(kind.parse_index("translated_chunk_0010.txt"), Some(10));
        assert_eq!(kind.parse_index("translated_chunk_12345.txt"), Some(12345));

        assert_eq!(kind.parse_index("translated_chunk_0000.txt"), None);
        assert_eq!(kind.parse_index("translated_chunk_abcd.txt"), None);
        assert_eq!(kind.parse_index("translated_chunk_.txt"), None);
        assert_eq!(kind.parse_index("translated_chunk_0007.txt.tmp"), None);
        assert_eq!(kind.parse_index(".translated_chunk_0007.txt.tmp"), None);
        assert_eq!(kind.parse_index("chunk_0007.txt"), None);
        assert_eq!(UnitKind::Source.parse_index("translated_chunk_0007.txt"), None);
    }

    #[test]
    fn test_layout_paths() {
        let pair = LanguagePair::from_codes("ko", "en").unwrap();
        let layout = RunLayout::new(Path::new("/work"), Path::new("/books/novel.txt"), &pair)
            .unwrap();

        assert_eq!(layout.work_dir, PathBuf::from("/work"));
        assert_eq!(layout.split_dir, PathBuf::from("/work/novel_split"));
        assert_eq!(layout.translated_dir, PathBuf::from("/work/novel_translated_en"));
        assert_eq!(
            layout.merged_path,
            PathBuf::from("/work/novel_ko-en_translated.txt")
        );
        assert_eq!(
            layout.translated_unit(3),
            PathBuf::from("/work/novel_translated_en/translated_chunk_0003.txt")
        );
    }

    #[test]
    fn test_layout_rejects_pathless_input() {
        let pair = LanguagePair::from_codes("ko", "en").unwrap();
        assert!(RunLayout::new(Path::new("/work"), Path::new("/"), &pair).is_err());
    }
}
