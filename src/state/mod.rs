pub mod cleanup;
pub mod layout;
pub mod progress;

pub use cleanup::{
    remove_dir_if_present, reset_run, reset_split, sweep_partial_units, CleanupReport,
};
pub use layout::{split_dir, translated_dir_prefix, RunLayout, UnitKind};
pub use progress::{persist_unit, scan, scan_units, RunState};
