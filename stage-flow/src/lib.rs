pub mod error;
pub mod pipeline;
pub mod runner;
pub mod stage;
pub mod storage;

// Re-export commonly used types
pub use error::{FlowError, Result};
pub use pipeline::{Pacing, Pipeline, PipelineBuilder};
pub use runner::{DiscardProgress, PipelineRunner, ProgressSink};
pub use stage::{STAGE_FAILED_MESSAGE, Stage, StageOutput, StageResult, StageStatus};
pub use storage::{InMemoryRunStorage, RunStorage};
