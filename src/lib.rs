//! Middle-end passes over the `arbor-ir` tree.
//!
//! [`Pipeline`] runs the enabled [`passes`] over one compilation unit,
//! optionally validating the tree between passes.

pub mod passes;
pub mod pipeline;

pub use passes::PassOutcome;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutcome};
