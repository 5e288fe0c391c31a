//! Rewriting passes over the IR tree.
//!
//! Each pass is an [`IrTransformer`](arbor_ir::IrTransformer) driven by
//! [`transform_root`](arbor_ir::transform_root), so every rewrite goes
//! through the slot protocol.

pub mod fold_constants;
pub mod remove_redundant_casts;

use arbor_ir::NodeRef;

/// What a pass did to a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    /// Root after the pass; differs from the input when the root was replaced.
    pub root: NodeRef,
    /// Number of rewrites performed.
    pub changes: usize,
}

pub use fold_constants::fold_constants;
pub use remove_redundant_casts::remove_redundant_casts;
