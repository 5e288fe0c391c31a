//! Node records and the closed set of node kinds.

use std::fmt;

use derive_more::Display;
use smallvec::SmallVec;

use crate::location::Span;
use crate::refs::{NodeRef, Slot, TypeRef};
use crate::symbol::Symbol;

/// What a slot demands of its occupant, and what a kind offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    /// Anything that may appear in a statement list.
    #[display("statement")]
    Statement,
    #[display("expression")]
    Expression,
    #[display("declaration")]
    Declaration,
}

/// Position of a node inside its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeLocation {
    pub parent: NodeRef,
    pub slot: Slot,
}

/// Data for a single node in the arena.
///
/// `span` and `ty` are fixed at construction. `location` is the non-owning
/// back-link; the owning edge is the child reference stored in the parent's
/// `kind`.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub span: Span,
    pub ty: TypeRef,
    pub(crate) location: Option<TreeLocation>,
    pub(crate) kind: NodeKind,
}

impl NodeData {
    pub fn location(&self) -> Option<TreeLocation> {
        self.location
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Literal payload of a `CONST` node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Int(i64),
    Bool(bool),
    String(String),
    Null,
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::String(v) => write!(f, "{v:?}"),
            ConstValue::Null => f.write_str("null"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum TypeOperatorKind {
    #[display("CAST")]
    Cast,
    #[display("IMPLICIT_CAST")]
    ImplicitCast,
    #[display("SAFE_CAST")]
    SafeCast,
    #[display("INSTANCEOF")]
    InstanceOf,
    #[display("NOT_INSTANCEOF")]
    NotInstanceOf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum BinaryOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Rem,
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display(">")]
    Gt,
    #[display(">=")]
    Ge,
}

/// The closed set of node kinds.
///
/// Child references live here and nowhere else. They are only written
/// through `IrContext::set_child` and its siblings in `slot.rs`, which keep
/// the children's back-links in step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Const {
        value: ConstValue,
    },
    GetValue {
        symbol: Symbol,
    },
    GetClass {
        argument: Option<NodeRef>,
    },
    TypeOperator {
        operator: TypeOperatorKind,
        type_operand: TypeRef,
        argument: Option<NodeRef>,
    },
    Binary {
        operator: BinaryOp,
        left: Option<NodeRef>,
        right: Option<NodeRef>,
    },
    Call {
        callee: Symbol,
        receiver: Option<NodeRef>,
        arguments: SmallVec<[Option<NodeRef>; 4]>,
    },
    Block {
        statements: Vec<NodeRef>,
    },
    Return {
        value: Option<NodeRef>,
    },
    Variable {
        name: Symbol,
        initializer: Option<NodeRef>,
    },
    Function {
        name: Symbol,
        body: Option<NodeRef>,
    },
}

impl NodeKind {
    /// Dump name of the kind, also used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Const { .. } => "CONST",
            NodeKind::GetValue { .. } => "GET_VALUE",
            NodeKind::GetClass { .. } => "GET_CLASS",
            NodeKind::TypeOperator { .. } => "TYPE_OP",
            NodeKind::Binary { .. } => "BINARY",
            NodeKind::Call { .. } => "CALL",
            NodeKind::Block { .. } => "BLOCK",
            NodeKind::Return { .. } => "RETURN",
            NodeKind::Variable { .. } => "VAR",
            NodeKind::Function { .. } => "FUN",
        }
    }

    /// `Expression` or `Declaration`. Every kind is also a `Statement`.
    pub fn category(&self) -> Capability {
        match self {
            NodeKind::Variable { .. } | NodeKind::Function { .. } => Capability::Declaration,
            _ => Capability::Expression,
        }
    }

    pub fn satisfies(&self, capability: Capability) -> bool {
        capability == Capability::Statement || self.category() == capability
    }

    /// Same kind and payload with every child slot emptied.
    ///
    /// Call arity is preserved; block statements are dropped.
    pub fn without_children(&self) -> NodeKind {
        let mut kind = self.clone();
        match &mut kind {
            NodeKind::Const { .. } | NodeKind::GetValue { .. } => {}
            NodeKind::GetClass { argument } | NodeKind::TypeOperator { argument, .. } => {
                *argument = None;
            }
            NodeKind::Binary { left, right, .. } => {
                *left = None;
                *right = None;
            }
            NodeKind::Call {
                receiver,
                arguments,
                ..
            } => {
                *receiver = None;
                arguments.iter_mut().for_each(|arg| *arg = None);
            }
            NodeKind::Block { statements } => statements.clear(),
            NodeKind::Return { value } => *value = None,
            NodeKind::Variable { initializer, .. } => *initializer = None,
            NodeKind::Function { body, .. } => *body = None,
        }
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_statements_but_not_expressions() {
        let var = NodeKind::Variable {
            name: Symbol::new("x"),
            initializer: None,
        };
        assert!(var.satisfies(Capability::Statement));
        assert!(var.satisfies(Capability::Declaration));
        assert!(!var.satisfies(Capability::Expression));
    }

    #[test]
    fn const_values_render_like_source() {
        assert_eq!(ConstValue::Int(-3).to_string(), "-3");
        assert_eq!(ConstValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
        assert_eq!(ConstValue::Null.to_string(), "null");
    }
}
