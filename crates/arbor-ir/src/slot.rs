//! Slot protocol: integer child positions per node kind.
//!
//! Every write to a child reference goes through [`IrContext::set_child`],
//! [`IrContext::take_child`] or the block statement helpers below. Each of
//! them updates the forward edge and the child's back-link in one step, so
//! `parent.get_child(child.slot_in_parent) == child` holds after every call.

use smallvec::SmallVec;
use tracing::trace;

use crate::context::IrContext;
use crate::error::{IrError, IrResult};
use crate::node::{Capability, NodeKind};
use crate::refs::{NodeRef, Slot};

/// Static description of one child slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    /// Semantic role, e.g. `argument` or `left`.
    pub role: &'static str,
    pub requires: Capability,
    /// Optional slots may stay empty in a well-formed tree.
    pub optional: bool,
}

impl SlotInfo {
    const fn required(role: &'static str, requires: Capability) -> Self {
        Self {
            role,
            requires,
            optional: false,
        }
    }

    const fn optional(role: &'static str, requires: Capability) -> Self {
        Self {
            role,
            requires,
            optional: true,
        }
    }
}

const ARGUMENT: SlotInfo = SlotInfo::required("argument", Capability::Expression);
const LEFT: SlotInfo = SlotInfo::required("left", Capability::Expression);
const RIGHT: SlotInfo = SlotInfo::required("right", Capability::Expression);
const RECEIVER: SlotInfo = SlotInfo::optional("receiver", Capability::Expression);
const VALUE_ARGUMENT: SlotInfo = SlotInfo::required("value_argument", Capability::Expression);
const STATEMENT: SlotInfo = SlotInfo::required("statement", Capability::Statement);
const VALUE: SlotInfo = SlotInfo::required("value", Capability::Expression);
const INITIALIZER: SlotInfo = SlotInfo::optional("initializer", Capability::Expression);
const BODY: SlotInfo = SlotInfo::optional("body", Capability::Expression);

impl NodeKind {
    /// Number of slots this node currently defines. Slots are `0..slot_count`.
    pub fn slot_count(&self) -> usize {
        match self {
            NodeKind::Const { .. } | NodeKind::GetValue { .. } => 0,
            NodeKind::GetClass { .. }
            | NodeKind::TypeOperator { .. }
            | NodeKind::Return { .. }
            | NodeKind::Variable { .. }
            | NodeKind::Function { .. } => 1,
            NodeKind::Binary { .. } => 2,
            NodeKind::Call { arguments, .. } => 1 + arguments.len(),
            NodeKind::Block { statements } => statements.len(),
        }
    }

    pub fn slot_info(&self, slot: Slot) -> Option<SlotInfo> {
        let info = match (self, slot) {
            (NodeKind::GetClass { .. } | NodeKind::TypeOperator { .. }, 0) => ARGUMENT,
            (NodeKind::Binary { .. }, 0) => LEFT,
            (NodeKind::Binary { .. }, 1) => RIGHT,
            (NodeKind::Call { .. }, 0) => RECEIVER,
            (NodeKind::Call { arguments, .. }, n) if (n as usize) <= arguments.len() => {
                VALUE_ARGUMENT
            }
            (NodeKind::Block { statements }, n) if (n as usize) < statements.len() => STATEMENT,
            (NodeKind::Return { .. }, 0) => VALUE,
            (NodeKind::Variable { .. }, 0) => INITIALIZER,
            (NodeKind::Function { .. }, 0) => BODY,
            _ => return None,
        };
        Some(info)
    }

    /// Child at `slot`; `None` for an empty or undefined slot.
    pub fn child(&self, slot: Slot) -> Option<NodeRef> {
        match (self, slot) {
            (NodeKind::GetClass { argument } | NodeKind::TypeOperator { argument, .. }, 0) => {
                *argument
            }
            (NodeKind::Binary { left, .. }, 0) => *left,
            (NodeKind::Binary { right, .. }, 1) => *right,
            (NodeKind::Call { receiver, .. }, 0) => *receiver,
            (NodeKind::Call { arguments, .. }, n) => {
                arguments.get((n as usize).checked_sub(1)?).copied().flatten()
            }
            (NodeKind::Block { statements }, n) => statements.get(n as usize).copied(),
            (NodeKind::Return { value }, 0) => *value,
            (NodeKind::Variable { initializer, .. }, 0) => *initializer,
            (NodeKind::Function { body, .. }, 0) => *body,
            _ => None,
        }
    }

    /// Present children in slot order.
    pub fn children(&self) -> SmallVec<[(Slot, NodeRef); 4]> {
        (0..self.slot_count() as Slot)
            .filter_map(|slot| self.child(slot).map(|child| (slot, child)))
            .collect()
    }

    /// Mutable access to a fixed (non-statement) slot.
    fn fixed_slot_mut(&mut self, slot: Slot) -> Option<&mut Option<NodeRef>> {
        match (self, slot) {
            (NodeKind::GetClass { argument } | NodeKind::TypeOperator { argument, .. }, 0) => {
                Some(argument)
            }
            (NodeKind::Binary { left, .. }, 0) => Some(left),
            (NodeKind::Binary { right, .. }, 1) => Some(right),
            (NodeKind::Call { receiver, .. }, 0) => Some(receiver),
            (NodeKind::Call { arguments, .. }, n) => {
                arguments.get_mut((n as usize).checked_sub(1)?)
            }
            (NodeKind::Return { value }, 0) => Some(value),
            (NodeKind::Variable { initializer, .. }, 0) => Some(initializer),
            (NodeKind::Function { body, .. }, 0) => Some(body),
            _ => None,
        }
    }

    fn no_such_slot(&self, slot: Slot) -> IrError {
        IrError::NoSuchSlot {
            kind: self.name(),
            slot,
        }
    }
}

fn saturating_slot(index: usize) -> Slot {
    Slot::try_from(index).unwrap_or(Slot::MAX)
}

impl IrContext {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Child occupying `slot`, or `None` if the slot is empty or undefined.
    pub fn get_child(&self, node: NodeRef, slot: Slot) -> Option<NodeRef> {
        self.kind(node).child(slot)
    }

    /// Present children of `node` in slot order.
    pub fn children(&self, node: NodeRef) -> SmallVec<[(Slot, NodeRef); 4]> {
        self.kind(node).children()
    }

    pub fn slot_info(&self, node: NodeRef, slot: Slot) -> Option<SlotInfo> {
        self.kind(node).slot_info(slot)
    }

    /// Whether `node` may be installed in a slot requiring `capability`.
    pub fn satisfies(&self, node: NodeRef, capability: Capability) -> bool {
        self.kind(node).satisfies(capability)
    }

    /// Unwrap a slot computed from a `usize` position.
    ///
    /// `None` means the position does not fit in a [`Slot`], so no kind can
    /// define it; that is reported as `NoSuchSlot` at `Slot::MAX`.
    pub(crate) fn slot_at(&self, node: NodeRef, slot: Option<Slot>) -> IrResult<Slot> {
        slot.ok_or_else(|| self.kind(node).no_such_slot(Slot::MAX))
    }

    /// Child of a slot that must be set, failing with `UnsetChild` otherwise.
    pub(crate) fn required_child(&self, node: NodeRef, slot: Slot) -> IrResult<NodeRef> {
        let kind = self.kind(node);
        let info = kind.slot_info(slot).ok_or_else(|| kind.no_such_slot(slot))?;
        kind.child(slot).ok_or(IrError::UnsetChild {
            kind: kind.name(),
            slot,
            role: info.role,
        })
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Replace whatever occupies `slot` with `new_child`.
    ///
    /// Fails with `NoSuchSlot` if the kind does not define `slot`, and with
    /// `InvalidChildKind` if `new_child` lacks the capability the slot
    /// requires. On success the previous occupant (if any) is detached. On
    /// failure the tree is unchanged.
    pub fn replace_child(&mut self, node: NodeRef, slot: Slot, new_child: NodeRef) -> IrResult<()> {
        let kind = self.kind(node);
        let info = kind.slot_info(slot).ok_or_else(|| kind.no_such_slot(slot))?;
        if !self.satisfies(new_child, info.requires) {
            return Err(IrError::InvalidChildKind {
                kind: kind.name(),
                slot,
                expected: info.requires,
                found: self.kind(new_child).name(),
            });
        }
        self.set_child(node, slot, new_child)
    }

    /// The setter path shared by `replace_child` and every typed setter.
    ///
    /// Capability is the caller's responsibility: typed setters prove it with
    /// their argument type, `replace_child` checks it at runtime.
    pub(crate) fn set_child(&mut self, node: NodeRef, slot: Slot, child: NodeRef) -> IrResult<()> {
        let kind = self.kind(node);
        if kind.slot_info(slot).is_none() {
            return Err(kind.no_such_slot(slot));
        }
        if kind.child(slot) == Some(child) {
            return Ok(());
        }
        self.check_attachable(node, child)?;

        let previous = match self.kind_mut(node) {
            NodeKind::Block { statements } => {
                Some(std::mem::replace(&mut statements[slot as usize], child))
            }
            kind => {
                let no_such_slot = kind.no_such_slot(slot);
                let entry = kind.fixed_slot_mut(slot).ok_or(no_such_slot)?;
                entry.replace(child)
            }
        };
        if let Some(previous) = previous {
            self.detach(previous);
        }
        self.set_tree_location(child, node, slot);
        trace!(parent = %node, slot, %child, ?previous, "set_child");
        Ok(())
    }

    /// Empty `slot` and detach its occupant, handing it back to the caller.
    ///
    /// For a `BLOCK` this removes the statement, so later statements move
    /// down one slot. For other kinds the slot is left empty; taking a
    /// required child leaves the parent malformed and is only meant for a
    /// parent that is about to be discarded.
    pub fn take_child(&mut self, node: NodeRef, slot: Slot) -> IrResult<Option<NodeRef>> {
        if let NodeKind::Block { .. } = self.kind(node) {
            return self.remove_statement_at(node, slot as usize).map(Some);
        }
        let kind = self.kind_mut(node);
        let no_such_slot = kind.no_such_slot(slot);
        let taken = kind.fixed_slot_mut(slot).ok_or(no_such_slot)?.take();
        if let Some(child) = taken {
            self.detach(child);
        }
        Ok(taken)
    }

    fn check_attachable(&self, parent: NodeRef, child: NodeRef) -> IrResult<()> {
        if let Some(owner) = self.parent(child) {
            return Err(IrError::ChildAlreadyAttached { child, owner });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(IrError::WouldCreateCycle { parent, child });
        }
        Ok(())
    }

    // ========================================================================
    // Statement lists
    // ========================================================================

    /// Insert `statement` at `index` of a block, shifting later statements.
    pub(crate) fn insert_statement_at(
        &mut self,
        block: NodeRef,
        index: usize,
        statement: NodeRef,
    ) -> IrResult<()> {
        let len = match self.kind(block) {
            NodeKind::Block { statements } => statements.len(),
            kind => return Err(kind.no_such_slot(saturating_slot(index))),
        };
        if index > len {
            return Err(self.kind(block).no_such_slot(saturating_slot(index)));
        }
        self.check_attachable(block, statement)?;
        if let NodeKind::Block { statements } = self.kind_mut(block) {
            statements.insert(index, statement);
        }
        self.renumber_statements(block, index);
        Ok(())
    }

    /// Remove and detach the statement at `index`, shifting later statements.
    pub(crate) fn remove_statement_at(&mut self, block: NodeRef, index: usize) -> IrResult<NodeRef> {
        let removed = match self.kind_mut(block) {
            NodeKind::Block { statements } if index < statements.len() => {
                statements.remove(index)
            }
            kind => return Err(kind.no_such_slot(saturating_slot(index))),
        };
        self.detach(removed);
        self.renumber_statements(block, index);
        Ok(removed)
    }

    /// Re-point back-links of statements from `from` onwards at their index.
    fn renumber_statements(&mut self, block: NodeRef, from: usize) {
        let tail: SmallVec<[NodeRef; 8]> = match self.kind(block) {
            NodeKind::Block { statements } => statements.iter().skip(from).copied().collect(),
            _ => return,
        };
        for (offset, statement) in tail.into_iter().enumerate() {
            self.set_tree_location(statement, block, (from + offset) as Slot);
        }
    }
}
