//! Mutable IR tree for the compiler middle-end.
//!
//! Nodes live in an [`IrContext`] arena and refer to each other by
//! [`NodeRef`]. The parent owns its children through the child slots of its
//! [`NodeKind`]; each child points back with a non-owning
//! [`TreeLocation`]. All structural edits go through the slot protocol
//! ([`IrContext::replace_child`] and the typed setters in [`kinds`]), which
//! keeps both directions in agreement after every call.
//!
//! Passes read the tree through [`visit::IrVisitor`] and rewrite it through
//! [`transform::IrTransformer`].

pub mod context;
pub mod copy;
pub mod error;
pub mod kinds;
pub mod location;
pub mod node;
pub mod printer;
pub mod refs;
pub mod slot;
pub mod symbol;
pub mod transform;
pub mod types;
pub mod validation;
pub mod visit;
pub mod walk;

pub use context::IrContext;
pub use copy::deep_copy;
pub use error::{IrError, IrResult};
pub use kinds::{
    Binary, Block, Call, Const, Declaration, Expression, Function, GetClass, GetValue, NodeHandle,
    Return, Statement, TypeOperator, Variable,
};
pub use location::Span;
pub use node::{BinaryOp, Capability, ConstValue, NodeData, NodeKind, TreeLocation, TypeOperatorKind};
pub use refs::{NodeRef, Slot, TypeRef};
pub use slot::SlotInfo;
pub use symbol::Symbol;
pub use transform::{IrTransformer, transform_children, transform_root};
pub use types::{TypeData, TypeDataBuilder, TypeInterner};
pub use visit::{IrVisitor, accept, accept_children};
pub use walk::WalkAction;
