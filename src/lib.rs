pub mod cli;
pub mod state;
pub mod text_processor;
pub mod translation;
pub mod utils;

pub use state::{RunLayout, RunState};
pub use text_processor::{merge, split, BudgetMeasure, LineSplitter};
pub use translation::{
    merge_job, provider_from_config, run_status, run_translation_job, Language, LanguagePair,
    RunStatus, RunSummary, TranslationJob, TranslationProvider,
};
pub use utils::{AppConfig, FatalPipelineError, Result, TranslatorError};
