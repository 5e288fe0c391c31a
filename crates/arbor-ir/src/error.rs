//! Errors raised by the slot protocol.
//!
//! Every variant is a logic error in the calling pass, never a recoverable
//! runtime condition. Passes propagate them with `?` and the driver aborts
//! the compilation unit.

use derive_more::{Display, Error};

use crate::node::Capability;
use crate::refs::{NodeRef, Slot};

pub type IrResult<T> = Result<T, IrError>;

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum IrError {
    #[display("{kind} has no slot {slot}")]
    NoSuchSlot { kind: &'static str, slot: Slot },

    #[display("{kind} slot {slot} requires {expected}, got {found}")]
    InvalidChildKind {
        kind: &'static str,
        slot: Slot,
        expected: Capability,
        found: &'static str,
    },

    #[display("{kind} slot {slot} ({role}) read before it was set")]
    UnsetChild {
        kind: &'static str,
        slot: Slot,
        role: &'static str,
    },

    #[display("{child} is already attached to {owner}; take it out first")]
    ChildAlreadyAttached { child: NodeRef, owner: NodeRef },

    #[display("attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle { parent: NodeRef, child: NodeRef },

    #[display("expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_such_slot_names_kind_and_slot() {
        let err = IrError::NoSuchSlot {
            kind: "GET_CLASS",
            slot: 1,
        };
        assert_eq!(err.to_string(), "GET_CLASS has no slot 1");
    }

    #[test]
    fn invalid_child_kind_names_capability() {
        let err = IrError::InvalidChildKind {
            kind: "RETURN",
            slot: 0,
            expected: Capability::Expression,
            found: "FUN",
        };
        assert_eq!(err.to_string(), "RETURN slot 0 requires expression, got FUN");
    }
}
