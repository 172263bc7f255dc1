use serde::{Deserialize, Serialize};
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Unit used to charge a line against the chunk budget.
///
/// `Chars` counts Unicode scalar values, so a Korean syllable costs 1 where
/// `Bytes` charges it 3. The choice moves chunk boundaries for non-Latin
/// scripts, which is why it is a setting rather than a constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetMeasure {
    #[default]
    Chars,
    Bytes,
    Tokens,
}

impl std::fmt::Display for BudgetMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetMeasure::Chars => write!(f, "chars"),
            BudgetMeasure::Bytes => write!(f, "bytes"),
            BudgetMeasure::Tokens => write!(f, "tokens"),
        }
    }
}

impl std::str::FromStr for BudgetMeasure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chars" | "char" | "characters" => Ok(BudgetMeasure::Chars),
            "bytes" | "byte" => Ok(BudgetMeasure::Bytes),
            "tokens" | "token" => Ok(BudgetMeasure::Tokens),
            other => Err(format!("unknown budget measure: {}", other)),
        }
    }
}

pub struct LineMeasurer {
    measure: BudgetMeasure,
    bpe: Option<CoreBPE>,
}

impl LineMeasurer {
    pub fn new(measure: BudgetMeasure) -> Self {
        let bpe = match measure {
            BudgetMeasure::Tokens => match cl100k_base() {
                Ok(bpe) => Some(bpe),
                Err(e) => {
                    tracing::warn!(error = %e, "Token encoder unavailable, estimating from bytes");
                    None
                }
            },
            _ => None,
        };

        Self { measure, bpe }
    }

    pub fn measure(&self) -> BudgetMeasure {
        self.measure
    }

    pub fn cost(&self, line: &str) -> usize {
        match self.measure {
            BudgetMeasure::Chars => line.chars().count(),
            BudgetMeasure::Bytes => line.len(),
            BudgetMeasure::Tokens => match &self.bpe {
                Some(bpe) => bpe.encode_with_special_tokens(line).len(),
                None => line.len() / 4,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_and_bytes_differ_for_hangul() {
        let line = "안녕하세요\n";
        assert_eq!(LineMeasurer::new(BudgetMeasure::Chars).cost(line), 6);
        assert_eq!(LineMeasurer::new(BudgetMeasure::Bytes).cost(line), 16);
    }

    #[test]
    fn test_tokens_nonzero_for_text() {
        let measurer = LineMeasurer::new(BudgetMeasure::Tokens);
        assert!(measurer.cost("The quick brown fox jumps over the lazy dog.\n") > 0);
        assert_eq!(measurer.cost(""), 0);
    }

    #[test]
    fn test_parse_measure() {
        assert_eq!("CHARS".parse::<BudgetMeasure>(), Ok(BudgetMeasure::Chars));
        assert_eq!("bytes".parse::<BudgetMeasure>(), Ok(BudgetMeasure::Bytes));
        assert_eq!("tokens".parse::<BudgetMeasure>(), Ok(BudgetMeasure::Tokens));
        assert!("lines".parse::<BudgetMeasure>().is_err());
    }
}
