//! Sequential multi-stage analysis pipeline.
//!
//! A run walks a fixed list of stages once each. Every stage sees the run
//! inputs and the text produced by the stages before it; the terminal stage
//! must produce a `Report`. Capability calls inside one stage run
//! concurrently, stages never do.

pub mod catalog;
pub mod context;
pub mod orchestrator;
pub mod stage;

pub use catalog::news_analysis_stages;
pub use context::{AnalysisInput, PipelineContext, PipelineInputs, StageOutput};
pub use orchestrator::{Pipeline, PipelineOutcome, PipelineRun, RunState, RunTrace, StageTrace};
pub use stage::{Evidence, StageSpec};
