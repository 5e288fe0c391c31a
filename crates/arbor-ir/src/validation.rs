//! Well-formedness checks for IR trees.
//!
//! The slot protocol keeps trees well-formed on its own; these checks exist
//! so a pass pipeline can prove it between passes and report the exact
//! node when something went wrong.
//!
//! 1. **Tree validation** ([`validate_tree`]): walks a tree from its root and
//!    checks back-links, sharing, required slots and slot capabilities.
//! 2. **Arena validation** ([`validate_arena`]): checks that every node's
//!    back-link is matched by its parent's forward edge, attached or not.

use std::collections::HashSet;
use std::fmt;

use derive_more::Display;

use crate::context::IrContext;
use crate::node::{Capability, TreeLocation};
use crate::refs::{NodeRef, Slot};

/// One way a tree can be malformed.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum Violation {
    #[display("{child} sits in {parent} slot {slot} but its back-link is {found:?}")]
    BackLinkMismatch {
        parent: NodeRef,
        slot: Slot,
        child: NodeRef,
        found: Option<TreeLocation>,
    },

    #[display("{node} claims {parent} slot {slot}, which holds {found:?}")]
    DanglingBackLink {
        node: NodeRef,
        parent: NodeRef,
        slot: Slot,
        found: Option<NodeRef>,
    },

    #[display("{node} is reachable more than once")]
    Shared { node: NodeRef },

    #[display("{node} ({kind}) slot {slot} ({role}) is unset")]
    UnsetRequired {
        node: NodeRef,
        kind: &'static str,
        slot: Slot,
        role: &'static str,
    },

    #[display("{node} ({kind}) slot {slot} requires {expected}, holds {found}")]
    CapabilityMismatch {
        node: NodeRef,
        kind: &'static str,
        slot: Slot,
        expected: Capability,
        found: &'static str,
    },
}

/// Result of validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "validation passed");
        }
        writeln!(f, "{} violation(s) found:", self.violations.len())?;
        for violation in &self.violations {
            writeln!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

/// Validate the tree rooted at `root`.
///
/// `root` itself may be attached to a larger tree; only its subtree is
/// checked.
pub fn validate_tree(ctx: &IrContext, root: NodeRef) -> ValidationResult {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            violations.push(Violation::Shared { node });
            continue;
        }
        let kind = ctx.kind(node);
        for slot in 0..kind.slot_count() as Slot {
            let Some(info) = kind.slot_info(slot) else {
                continue;
            };
            let Some(child) = kind.child(slot) else {
                if !info.optional {
                    violations.push(Violation::UnsetRequired {
                        node,
                        kind: kind.name(),
                        slot,
                        role: info.role,
                    });
                }
                continue;
            };
            let expected = Some(TreeLocation { parent: node, slot });
            if ctx.location(child) != expected {
                violations.push(Violation::BackLinkMismatch {
                    parent: node,
                    slot,
                    child,
                    found: ctx.location(child),
                });
            }
            if !ctx.satisfies(child, info.requires) {
                violations.push(Violation::CapabilityMismatch {
                    node,
                    kind: kind.name(),
                    slot,
                    expected: info.requires,
                    found: ctx.kind(child).name(),
                });
            }
            stack.push(child);
        }
    }

    ValidationResult { violations }
}

/// Check the back-link invariant for every node in the arena.
pub fn validate_arena(ctx: &IrContext) -> ValidationResult {
    let violations = ctx
        .nodes()
        .filter_map(|node| {
            let TreeLocation { parent, slot } = ctx.location(node)?;
            let found = ctx.get_child(parent, slot);
            (found != Some(node)).then_some(Violation::DanglingBackLink {
                node,
                parent,
                slot,
                found,
            })
        })
        .collect();
    ValidationResult { violations }
}
