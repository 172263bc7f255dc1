use crate::utils::{Result, TranslatorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Languages a run can be configured for, in menu order.
pub const LANGUAGES: [Language; 16] = [
    Language { code: "ko", name: "Korean" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "en", name: "English" },
    Language { code: "zh-CN", name: "Chinese (Simplified)" },
    Language { code: "zh-TW", name: "Chinese (Traditional)" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "ru", name: "Russian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "it", name: "Italian" },
    Language { code: "vi", name: "Vietnamese" },
    Language { code: "th", name: "Thai" },
    Language { code: "id", name: "Indonesian" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "ar", name: "Arabic" },
];

impl Language {
    /// Accepts a catalog code (case-insensitive) or a 1-based menu number.
    pub fn lookup(key: &str) -> Result<Language> {
        let key = key.trim();

        if let Ok(number) = key.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|i| LANGUAGES.get(i))
                .copied()
                .ok_or_else(|| TranslatorError::UnknownLanguage(key.to_string()));
        }

        LANGUAGES
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(key))
            .copied()
            .ok_or_else(|| TranslatorError::UnknownLanguage(key.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Result<Self> {
        if source == target {
            return Err(TranslatorError::SameLanguage(source.code.to_string()));
        }
        Ok(Self { source, target })
    }

    pub fn from_codes(source: &str, target: &str) -> Result<Self> {
        Self::new(Language::lookup(source)?, Language::lookup(target)?)
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}", self.source.code, self.target.code)
    }
}
