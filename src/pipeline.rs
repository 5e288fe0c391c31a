//! Configurable pass pipeline.
//!
//! ```text
//! tree
//!   │
//!   ▼
//! remove_redundant_casts   (config.remove_redundant_casts)
//!   │
//!   ▼
//! fold_constants           (config.fold_constants)
//!   │
//!   ▼
//! tree'
//! ```
//!
//! Casts go first so that a cast-wrapped constant operand becomes foldable.
//! With `verify_each_pass` the tree is validated after every pass and the
//! first failure aborts the run.

use arbor_ir::printer::{PrinterOptions, print_tree_with};
use arbor_ir::validation::validate_tree;
use arbor_ir::{IrContext, IrError, IrResult, NodeRef};
use derive_more::{Display, Error};
use tracing::{debug, warn};

use crate::passes::{self, PassOutcome};

type PassFn = fn(&mut IrContext, NodeRef) -> IrResult<PassOutcome>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Validate the tree after every pass.
    pub verify_each_pass: bool,
    /// Dump the tree at `debug` level after every pass.
    pub dump_each_pass: bool,
    pub dump_options: PrinterOptions,
    pub fold_constants: bool,
    pub remove_redundant_casts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            verify_each_pass: cfg!(debug_assertions),
            dump_each_pass: false,
            dump_options: PrinterOptions::default(),
            fold_constants: true,
            remove_redundant_casts: true,
        }
    }
}

impl PipelineConfig {
    pub fn verify_each_pass(mut self, enabled: bool) -> Self {
        self.verify_each_pass = enabled;
        self
    }

    pub fn dump_each_pass(mut self, enabled: bool) -> Self {
        self.dump_each_pass = enabled;
        self
    }

    pub fn dump_options(mut self, options: PrinterOptions) -> Self {
        self.dump_options = options;
        self
    }

    pub fn fold_constants(mut self, enabled: bool) -> Self {
        self.fold_constants = enabled;
        self
    }

    pub fn remove_redundant_casts(mut self, enabled: bool) -> Self {
        self.remove_redundant_casts = enabled;
        self
    }
}

#[derive(Debug, Display, Error)]
pub enum PipelineError {
    #[display("pass `{pass}` failed: {error}")]
    Pass {
        pass: &'static str,
        #[error(source)]
        error: IrError,
    },
    #[display("tree is malformed after pass `{pass}`: {report}")]
    Verification {
        pass: &'static str,
        report: String,
    },
}

/// Result of a successful pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub root: NodeRef,
    /// Rewrites per pass, in the order the passes ran.
    pub changes: Vec<(&'static str, usize)>,
}

impl PipelineOutcome {
    pub fn total_changes(&self) -> usize {
        self.changes.iter().map(|(_, n)| n).sum()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the passes this pipeline will run, in order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes().into_iter().map(|(name, _)| name).collect()
    }

    fn passes(&self) -> Vec<(&'static str, PassFn)> {
        let mut passes: Vec<(&'static str, PassFn)> = Vec::new();
        if self.config.remove_redundant_casts {
            passes.push(("remove_redundant_casts", passes::remove_redundant_casts));
        }
        if self.config.fold_constants {
            passes.push(("fold_constants", passes::fold_constants));
        }
        passes
    }

    #[tracing::instrument(skip_all, fields(%root))]
    pub fn run(&self, ctx: &mut IrContext, root: NodeRef) -> Result<PipelineOutcome, PipelineError> {
        let mut outcome = PipelineOutcome {
            root,
            changes: Vec::new(),
        };

        for (pass, run_pass) in self.passes() {
            let _span = tracing::info_span!("pass", name = pass).entered();

            let PassOutcome { root, changes } =
                run_pass(ctx, outcome.root).map_err(|error| PipelineError::Pass { pass, error })?;
            outcome.root = root;
            outcome.changes.push((pass, changes));
            debug!(changes, "pass finished");

            if self.config.dump_each_pass {
                debug!("tree after {pass}:\n{}", print_tree_with(ctx, root, self.config.dump_options));
            }

            if self.config.verify_each_pass {
                let result = validate_tree(ctx, root);
                if !result.is_ok() {
                    warn!(%result, "verification failed");
                    return Err(PipelineError::Verification {
                        pass,
                        report: result.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
