pub mod assembler;
pub mod revision;
pub mod service;

pub use assembler::{assemble, extract_title_and_summary, truncate_summary, word_count};
pub use revision::{LoopStatus, RevisionLoop, RevisionOutcome};
pub use service::{ColumnReport, ColumnService, PipelineConfig};

pub mod prelude {
    pub use super::{ColumnService, LoopStatus, PipelineConfig};
    pub use pc_core::{ColumnOutcome, ColumnRequest, Error, Result};
}
