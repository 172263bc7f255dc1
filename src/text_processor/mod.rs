pub mod measure;
pub mod merger;
pub mod splitter;

pub use measure::{BudgetMeasure, LineMeasurer};
pub use merger::{merge, missing_indices, verify_complete, MergeReport};
pub use splitter::{
    chunk_text, prepare_split, split, ChunkAccumulator, LineSplitter, SplitOutcome, TextChunk,
};
