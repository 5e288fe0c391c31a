//! IrContext: arena storage for IR nodes.
//!
//! All nodes live in a `PrimaryMap` owned by `IrContext`. A node's parent is
//! recorded as a plain `NodeRef` (never an owning edge), so cheap replacement
//! only touches the parent, the old occupant and the new occupant.

use cranelift_entity::PrimaryMap;
use tracing::trace;

use crate::location::Span;
use crate::node::{NodeData, NodeKind, TreeLocation};
use crate::refs::{NodeRef, Slot, TypeRef};
use crate::types::TypeInterner;

/// Arena-based mutable IR context.
///
/// Owns every node and the type interner. Mutation requires `&mut`, which is
/// the whole single-writer story.
pub struct IrContext {
    nodes: PrimaryMap<NodeRef, NodeData>,
    pub types: TypeInterner,
}

impl IrContext {
    /// Create a new empty IR context.
    pub fn new() -> Self {
        Self {
            nodes: PrimaryMap::new(),
            types: TypeInterner::new(),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Allocate a free-standing node.
    ///
    /// # Panics
    ///
    /// Panics if `kind` already references children; they must be installed
    /// through the slot protocol after creation.
    pub(crate) fn create_node(&mut self, span: Span, ty: TypeRef, kind: NodeKind) -> NodeRef {
        assert!(
            kind == kind.without_children(),
            "create_node: {} must be created without children; \
             attach them through the slot protocol",
            kind.name(),
        );
        self.nodes.push(NodeData {
            span,
            ty,
            location: None,
            kind,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get immutable reference to node data.
    pub fn node(&self, node: NodeRef) -> &NodeData {
        &self.nodes[node]
    }

    pub fn kind(&self, node: NodeRef) -> &NodeKind {
        &self.nodes[node].kind
    }

    pub(crate) fn kind_mut(&mut self, node: NodeRef) -> &mut NodeKind {
        &mut self.nodes[node].kind
    }

    pub fn span(&self, node: NodeRef) -> Span {
        self.nodes[node].span
    }

    /// The resolved type fixed at construction.
    pub fn ty(&self, node: NodeRef) -> TypeRef {
        self.nodes[node].ty
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node].location.map(|loc| loc.parent)
    }

    /// Slot this node occupies in its parent, `None` when detached.
    pub fn slot_in_parent(&self, node: NodeRef) -> Option<Slot> {
        self.nodes[node].location.map(|loc| loc.slot)
    }

    pub fn location(&self, node: NodeRef) -> Option<TreeLocation> {
        self.nodes[node].location
    }

    /// Number of nodes ever allocated in this context.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in allocation order, attached or not.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.nodes.keys()
    }

    /// Whether `candidate` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, candidate: NodeRef, node: NodeRef) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == candidate {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    // ========================================================================
    // Tree location
    // ========================================================================

    /// Clear the node's back-link. Idempotent; children are untouched.
    ///
    /// Only the slot protocol calls this, right after it has overwritten or
    /// removed the forward edge.
    pub(crate) fn detach(&mut self, node: NodeRef) {
        if let Some(loc) = self.nodes[node].location.take() {
            trace!(%node, parent = %loc.parent, slot = loc.slot, "detach");
        }
    }

    /// Point the node's back-link at `parent`/`slot`.
    ///
    /// Does not check for an existing parent; callers detach first.
    pub(crate) fn set_tree_location(&mut self, node: NodeRef, parent: NodeRef, slot: Slot) {
        trace!(%node, %parent, slot, "attach");
        self.nodes[node].location = Some(TreeLocation { parent, slot });
    }
}

impl Default for IrContext {
    fn default() -> Self {
        Self::new()
    }
}
