//! Typed handles for each node kind.
//!
//! A handle is a `NodeRef` that has been checked to be of one kind (or one
//! capability, for [`Expression`], [`Declaration`] and [`Statement`]).
//! Setters take capability handles, so a typed setter cannot install the
//! wrong sort of child; [`IrContext::replace_child`] is the dynamic
//! counterpart that checks at runtime.
//!
//! Each kind offers a bare constructor (`new`) and a populated one
//! (`with_*`). Accessors for required slots return `UnsetChild` instead of
//! guessing when the slot has not been filled yet.

use smallvec::SmallVec;

use crate::context::IrContext;
use crate::error::{IrError, IrResult};
use crate::location::Span;
use crate::node::{BinaryOp, Capability, ConstValue, NodeKind, TypeOperatorKind};
use crate::refs::{NodeRef, Slot, TypeRef};
use crate::symbol::Symbol;

/// Common interface of typed node handles.
pub trait NodeHandle: Copy {
    /// Check `node` and wrap it, failing with `WrongKind` on mismatch.
    fn from_node(ctx: &IrContext, node: NodeRef) -> IrResult<Self>;

    fn node(self) -> NodeRef;
}

macro_rules! capability_handle {
    ($(#[$meta:meta])* $name:ident, $capability:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) NodeRef);

        impl $name {
            /// Checked cast from an untyped node.
            pub fn cast(ctx: &IrContext, node: NodeRef) -> IrResult<Self> {
                let kind = ctx.kind(node);
                if kind.satisfies($capability) {
                    Ok(Self(node))
                } else {
                    Err(IrError::WrongKind {
                        expected: $label,
                        found: kind.name(),
                    })
                }
            }
        }

        impl NodeHandle for $name {
            fn from_node(ctx: &IrContext, node: NodeRef) -> IrResult<Self> {
                Self::cast(ctx, node)
            }

            fn node(self) -> NodeRef {
                self.0
            }
        }

        impl From<$name> for NodeRef {
            fn from(handle: $name) -> NodeRef {
                handle.0
            }
        }
    };
}

capability_handle!(
    /// Any node usable as a value.
    Expression,
    Capability::Expression,
    "expression"
);
capability_handle!(
    /// A declaration (`VAR`, `FUN`).
    Declaration,
    Capability::Declaration,
    "declaration"
);
capability_handle!(
    /// Anything that may appear in a block.
    Statement,
    Capability::Statement,
    "statement"
);

impl From<Expression> for Statement {
    fn from(expr: Expression) -> Statement {
        Statement(expr.0)
    }
}

impl From<Declaration> for Statement {
    fn from(decl: Declaration) -> Statement {
        Statement(decl.0)
    }
}

macro_rules! kind_handle {
    ($(#[$meta:meta])* $name:ident => $variant:ident, $label:literal, $category:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) NodeRef);

        impl NodeHandle for $name {
            fn from_node(ctx: &IrContext, node: NodeRef) -> IrResult<Self> {
                match ctx.kind(node) {
                    NodeKind::$variant { .. } => Ok(Self(node)),
                    other => Err(IrError::WrongKind {
                        expected: $label,
                        found: other.name(),
                    }),
                }
            }

            fn node(self) -> NodeRef {
                self.0
            }
        }

        impl $name {
            pub fn span(self, ctx: &IrContext) -> Span {
                ctx.span(self.0)
            }

            pub fn ty(self, ctx: &IrContext) -> TypeRef {
                ctx.ty(self.0)
            }
        }

        impl From<$name> for NodeRef {
            fn from(handle: $name) -> NodeRef {
                handle.0
            }
        }

        impl From<$name> for $category {
            fn from(handle: $name) -> $category {
                $category(handle.0)
            }
        }

        impl From<$name> for Statement {
            fn from(handle: $name) -> Statement {
                Statement(handle.0)
            }
        }
    };
}

/// Kind data accessor; handles are only created for the matching kind.
macro_rules! kind_data {
    ($ctx:expr, $node:expr, $pattern:pat => $out:expr) => {
        match $ctx.kind($node) {
            $pattern => $out,
            other => unreachable!("handle points at {}", other.name()),
        }
    };
}

// ============================================================================
// Leaves
// ============================================================================

kind_handle!(
    /// A literal value.
    Const => Const, "CONST", Expression
);

impl Const {
    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef, value: ConstValue) -> Self {
        Self(ctx.create_node(span, ty, NodeKind::Const { value }))
    }

    pub fn value(self, ctx: &IrContext) -> &ConstValue {
        kind_data!(ctx, self.0, NodeKind::Const { value } => value)
    }
}

kind_handle!(
    /// Read of a local value or parameter.
    GetValue => GetValue, "GET_VALUE", Expression
);

impl GetValue {
    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef, symbol: impl Into<Symbol>) -> Self {
        let symbol = symbol.into();
        Self(ctx.create_node(span, ty, NodeKind::GetValue { symbol }))
    }

    pub fn symbol(self, ctx: &IrContext) -> Symbol {
        kind_data!(ctx, self.0, NodeKind::GetValue { symbol } => *symbol)
    }
}

// ============================================================================
// Single operand
// ============================================================================

kind_handle!(
    /// `argument::class`: queries the runtime class of its argument.
    GetClass => GetClass, "GET_CLASS", Expression
);

impl GetClass {
    pub const ARGUMENT: Slot = 0;

    /// Bare node; `argument` must be set before it is read.
    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef) -> Self {
        Self(ctx.create_node(span, ty, NodeKind::GetClass { argument: None }))
    }

    pub fn with_argument(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        argument: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty);
        this.set_argument(ctx, argument)?;
        Ok(this)
    }

    pub fn argument(self, ctx: &IrContext) -> IrResult<Expression> {
        ctx.required_child(self.0, Self::ARGUMENT).map(Expression)
    }

    pub fn set_argument(self, ctx: &mut IrContext, argument: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::ARGUMENT, argument.0)
    }
}

kind_handle!(
    /// Cast or instance check against `type_operand`.
    TypeOperator => TypeOperator, "TYPE_OP", Expression
);

impl TypeOperator {
    pub const ARGUMENT: Slot = 0;

    pub fn new(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        operator: TypeOperatorKind,
        type_operand: TypeRef,
    ) -> Self {
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::TypeOperator {
                operator,
                type_operand,
                argument: None,
            },
        ))
    }

    pub fn with_argument(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        operator: TypeOperatorKind,
        type_operand: TypeRef,
        argument: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty, operator, type_operand);
        this.set_argument(ctx, argument)?;
        Ok(this)
    }

    pub fn operator(self, ctx: &IrContext) -> TypeOperatorKind {
        kind_data!(ctx, self.0, NodeKind::TypeOperator { operator, .. } => *operator)
    }

    pub fn type_operand(self, ctx: &IrContext) -> TypeRef {
        kind_data!(ctx, self.0, NodeKind::TypeOperator { type_operand, .. } => *type_operand)
    }

    pub fn argument(self, ctx: &IrContext) -> IrResult<Expression> {
        ctx.required_child(self.0, Self::ARGUMENT).map(Expression)
    }

    pub fn set_argument(self, ctx: &mut IrContext, argument: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::ARGUMENT, argument.0)
    }
}

kind_handle!(
    /// `return value`.
    Return => Return, "RETURN", Expression
);

impl Return {
    pub const VALUE: Slot = 0;

    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef) -> Self {
        Self(ctx.create_node(span, ty, NodeKind::Return { value: None }))
    }

    pub fn with_value(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        value: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty);
        this.set_value(ctx, value)?;
        Ok(this)
    }

    pub fn value(self, ctx: &IrContext) -> IrResult<Expression> {
        ctx.required_child(self.0, Self::VALUE).map(Expression)
    }

    pub fn set_value(self, ctx: &mut IrContext, value: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::VALUE, value.0)
    }
}

// ============================================================================
// Binary
// ============================================================================

kind_handle!(
    /// Primitive binary operation.
    Binary => Binary, "BINARY", Expression
);

impl Binary {
    pub const LEFT: Slot = 0;
    pub const RIGHT: Slot = 1;

    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef, operator: BinaryOp) -> Self {
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::Binary {
                operator,
                left: None,
                right: None,
            },
        ))
    }

    pub fn with_operands(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        operator: BinaryOp,
        left: Expression,
        right: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty, operator);
        this.set_left(ctx, left)?;
        this.set_right(ctx, right)?;
        Ok(this)
    }

    pub fn operator(self, ctx: &IrContext) -> BinaryOp {
        kind_data!(ctx, self.0, NodeKind::Binary { operator, .. } => *operator)
    }

    pub fn left(self, ctx: &IrContext) -> IrResult<Expression> {
        ctx.required_child(self.0, Self::LEFT).map(Expression)
    }

    pub fn right(self, ctx: &IrContext) -> IrResult<Expression> {
        ctx.required_child(self.0, Self::RIGHT).map(Expression)
    }

    pub fn set_left(self, ctx: &mut IrContext, left: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::LEFT, left.0)
    }

    pub fn set_right(self, ctx: &mut IrContext, right: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::RIGHT, right.0)
    }
}

// ============================================================================
// Call
// ============================================================================

kind_handle!(
    /// Call of `callee` with an optional receiver and a fixed number of
    /// value arguments.
    Call => Call, "CALL", Expression
);

impl Call {
    pub const RECEIVER: Slot = 0;

    /// Slot of the `index`-th value argument, if it fits in a [`Slot`].
    pub fn argument_slot(index: usize) -> Option<Slot> {
        Slot::try_from(index).ok()?.checked_add(1)
    }

    pub fn new(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        callee: impl Into<Symbol>,
        arity: usize,
    ) -> Self {
        let arguments: SmallVec<[Option<NodeRef>; 4]> = std::iter::repeat_n(None, arity).collect();
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::Call {
                callee: callee.into(),
                receiver: None,
                arguments,
            },
        ))
    }

    pub fn with_arguments(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        callee: impl Into<Symbol>,
        receiver: Option<Expression>,
        arguments: impl IntoIterator<Item = Expression>,
    ) -> IrResult<Self> {
        let arguments: SmallVec<[Expression; 4]> = arguments.into_iter().collect();
        let this = Self::new(ctx, span, ty, callee, arguments.len());
        if let Some(receiver) = receiver {
            this.set_receiver(ctx, receiver)?;
        }
        for (index, argument) in arguments.into_iter().enumerate() {
            this.set_argument(ctx, index, argument)?;
        }
        Ok(this)
    }

    pub fn callee(self, ctx: &IrContext) -> Symbol {
        kind_data!(ctx, self.0, NodeKind::Call { callee, .. } => *callee)
    }

    pub fn arity(self, ctx: &IrContext) -> usize {
        kind_data!(ctx, self.0, NodeKind::Call { arguments, .. } => arguments.len())
    }

    pub fn receiver(self, ctx: &IrContext) -> Option<Expression> {
        ctx.get_child(self.0, Self::RECEIVER).map(Expression)
    }

    pub fn set_receiver(self, ctx: &mut IrContext, receiver: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::RECEIVER, receiver.0)
    }

    pub fn argument(self, ctx: &IrContext, index: usize) -> IrResult<Expression> {
        let slot = ctx.slot_at(self.0, Self::argument_slot(index))?;
        ctx.required_child(self.0, slot).map(Expression)
    }

    pub fn set_argument(
        self,
        ctx: &mut IrContext,
        index: usize,
        argument: Expression,
    ) -> IrResult<()> {
        let slot = ctx.slot_at(self.0, Self::argument_slot(index))?;
        ctx.set_child(self.0, slot, argument.0)
    }
}

// ============================================================================
// Block
// ============================================================================

kind_handle!(
    /// Statement sequence; its value is the last statement's value.
    Block => Block, "BLOCK", Expression
);

impl Block {
    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef) -> Self {
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::Block {
                statements: Vec::new(),
            },
        ))
    }

    pub fn with_statements(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        statements: impl IntoIterator<Item = Statement>,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty);
        for statement in statements {
            this.push_statement(ctx, statement)?;
        }
        Ok(this)
    }

    pub fn statements(self, ctx: &IrContext) -> &[NodeRef] {
        kind_data!(ctx, self.0, NodeKind::Block { statements } => statements.as_slice())
    }

    pub fn len(self, ctx: &IrContext) -> usize {
        self.statements(ctx).len()
    }

    pub fn is_empty(self, ctx: &IrContext) -> bool {
        self.statements(ctx).is_empty()
    }

    pub fn push_statement(self, ctx: &mut IrContext, statement: Statement) -> IrResult<()> {
        let index = self.len(ctx);
        ctx.insert_statement_at(self.0, index, statement.0)
    }

    /// Insert at `index`; statements from `index` on move one slot up.
    pub fn insert_statement(
        self,
        ctx: &mut IrContext,
        index: usize,
        statement: Statement,
    ) -> IrResult<()> {
        ctx.insert_statement_at(self.0, index, statement.0)
    }

    /// Remove and detach the statement at `index`.
    pub fn remove_statement(self, ctx: &mut IrContext, index: usize) -> IrResult<Statement> {
        ctx.remove_statement_at(self.0, index).map(Statement)
    }

    pub fn set_statement(
        self,
        ctx: &mut IrContext,
        index: usize,
        statement: Statement,
    ) -> IrResult<()> {
        let slot = ctx.slot_at(self.0, Slot::try_from(index).ok())?;
        ctx.set_child(self.0, slot, statement.0)
    }
}

// ============================================================================
// Declarations
// ============================================================================

kind_handle!(
    /// Local variable with an optional initializer.
    Variable => Variable, "VAR", Declaration
);

impl Variable {
    pub const INITIALIZER: Slot = 0;

    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef, name: impl Into<Symbol>) -> Self {
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::Variable {
                name: name.into(),
                initializer: None,
            },
        ))
    }

    pub fn with_initializer(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        name: impl Into<Symbol>,
        initializer: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty, name);
        this.set_initializer(ctx, initializer)?;
        Ok(this)
    }

    pub fn name(self, ctx: &IrContext) -> Symbol {
        kind_data!(ctx, self.0, NodeKind::Variable { name, .. } => *name)
    }

    pub fn initializer(self, ctx: &IrContext) -> Option<Expression> {
        ctx.get_child(self.0, Self::INITIALIZER).map(Expression)
    }

    pub fn set_initializer(self, ctx: &mut IrContext, initializer: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::INITIALIZER, initializer.0)
    }
}

kind_handle!(
    /// Function declaration; abstract functions have no body.
    Function => Function, "FUN", Declaration
);

impl Function {
    pub const BODY: Slot = 0;

    pub fn new(ctx: &mut IrContext, span: Span, ty: TypeRef, name: impl Into<Symbol>) -> Self {
        Self(ctx.create_node(
            span,
            ty,
            NodeKind::Function {
                name: name.into(),
                body: None,
            },
        ))
    }

    pub fn with_body(
        ctx: &mut IrContext,
        span: Span,
        ty: TypeRef,
        name: impl Into<Symbol>,
        body: Expression,
    ) -> IrResult<Self> {
        let this = Self::new(ctx, span, ty, name);
        this.set_body(ctx, body)?;
        Ok(this)
    }

    pub fn name(self, ctx: &IrContext) -> Symbol {
        kind_data!(ctx, self.0, NodeKind::Function { name, .. } => *name)
    }

    pub fn body(self, ctx: &IrContext) -> Option<Expression> {
        ctx.get_child(self.0, Self::BODY).map(Expression)
    }

    pub fn set_body(self, ctx: &mut IrContext, body: Expression) -> IrResult<()> {
        ctx.set_child(self.0, Self::BODY, body.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        ctx: IrContext,
        int: TypeRef,
    }

    fn fixture() -> Fixture {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        Fixture { ctx, int }
    }

    fn int(f: &mut Fixture, value: i64) -> Expression {
        Const::new(&mut f.ctx, Span::new(0, 1), f.int, ConstValue::Int(value)).into()
    }

    #[test]
    fn bare_get_class_reports_unset_argument() {
        let mut f = fixture();
        let get_class = GetClass::new(&mut f.ctx, Span::new(10, 20), f.int);
        assert_eq!(
            get_class.argument(&f.ctx).unwrap_err(),
            IrError::UnsetChild {
                kind: "GET_CLASS",
                slot: 0,
                role: "argument"
            }
        );
    }

    #[test]
    fn populated_constructor_matches_bare_then_set() {
        let mut f = fixture();
        let a = int(&mut f, 1);
        let b = int(&mut f, 2);
        let populated = GetClass::with_argument(&mut f.ctx, Span::new(0, 3), f.int, a).unwrap();
        let bare = GetClass::new(&mut f.ctx, Span::new(0, 3), f.int);
        bare.set_argument(&mut f.ctx, b).unwrap();

        assert_eq!(populated.argument(&f.ctx).unwrap(), a);
        assert_eq!(bare.argument(&f.ctx).unwrap(), b);
        assert_eq!(f.ctx.location(a.node()).map(|l| l.slot), Some(0));
        assert_eq!(f.ctx.location(b.node()).map(|l| l.slot), Some(0));
    }

    #[test]
    fn from_node_checks_kind() {
        let mut f = fixture();
        let konst = int(&mut f, 7);
        assert!(Const::from_node(&f.ctx, konst.node()).is_ok());
        assert_eq!(
            GetClass::from_node(&f.ctx, konst.node()).unwrap_err(),
            IrError::WrongKind {
                expected: "GET_CLASS",
                found: "CONST"
            }
        );
    }

    #[test]
    fn capability_casts() {
        let mut f = fixture();
        let var = Variable::new(&mut f.ctx, Span::new(0, 5), f.int, "x");
        assert!(Statement::cast(&f.ctx, var.node()).is_ok());
        assert!(Declaration::cast(&f.ctx, var.node()).is_ok());
        assert_eq!(
            Expression::cast(&f.ctx, var.node()).unwrap_err(),
            IrError::WrongKind {
                expected: "expression",
                found: "VAR"
            }
        );
    }

    #[test]
    fn call_arguments_and_receiver() {
        let mut f = fixture();
        let receiver = int(&mut f, 0);
        let a = int(&mut f, 1);
        let b = int(&mut f, 2);
        let call =
            Call::with_arguments(&mut f.ctx, Span::new(0, 9), f.int, "plus", Some(receiver), [a, b])
                .unwrap();

        assert_eq!(call.arity(&f.ctx), 2);
        assert_eq!(call.callee(&f.ctx), "plus");
        assert_eq!(call.receiver(&f.ctx), Some(receiver));
        assert_eq!(call.argument(&f.ctx, 1).unwrap(), b);
        assert_eq!(f.ctx.slot_in_parent(b.node()), Call::argument_slot(1));
        assert_eq!(
            call.argument(&f.ctx, 2).unwrap_err(),
            IrError::NoSuchSlot {
                kind: "CALL",
                slot: 3
            }
        );
    }

    #[test]
    fn block_statement_editing() {
        let mut f = fixture();
        let unit = f.ctx.types.named("Unit");
        let a = int(&mut f, 1);
        let var = Variable::new(&mut f.ctx, Span::new(2, 8), f.int, "x");
        let statements = [Statement::from(a), Statement::from(var)];
        let block = Block::with_statements(&mut f.ctx, Span::new(0, 10), unit, statements).unwrap();
        assert_eq!(block.statements(&f.ctx), &[a.node(), var.node()]);

        let removed = block.remove_statement(&mut f.ctx, 0).unwrap();
        assert_eq!(removed.node(), a.node());
        assert_eq!(f.ctx.slot_in_parent(var.node()), Some(0));
        assert_eq!(block.len(&f.ctx), 1);

        block.insert_statement(&mut f.ctx, 1, a.into()).unwrap();
        assert_eq!(f.ctx.slot_in_parent(a.node()), Some(1));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn indices_beyond_slot_range_are_rejected() {
        let mut f = fixture();
        let a = int(&mut f, 1);
        let b = int(&mut f, 2);
        let block =
            Block::with_statements(&mut f.ctx, Span::new(0, 3), f.int, [Statement::from(a)])
                .unwrap();

        let err = block.set_statement(&mut f.ctx, 1 << 32, b.into()).unwrap_err();
        assert!(matches!(err, IrError::NoSuchSlot { kind: "BLOCK", .. }), "{err}");
        assert_eq!(block.statements(&f.ctx), &[a.node()]);
        assert_eq!(f.ctx.parent(a.node()), Some(block.node()));
        assert_eq!(f.ctx.parent(b.node()), None);

        let c = int(&mut f, 3);
        let call = Call::with_arguments(&mut f.ctx, Span::new(0, 5), f.int, "id", None, [c]).unwrap();
        for index in [1 << 32, u32::MAX as usize] {
            let err = call.argument(&f.ctx, index).unwrap_err();
            assert!(matches!(err, IrError::NoSuchSlot { kind: "CALL", .. }), "{err}");
            let err = call.set_argument(&mut f.ctx, index, b).unwrap_err();
            assert!(matches!(err, IrError::NoSuchSlot { kind: "CALL", .. }), "{err}");
        }
        assert_eq!(call.receiver(&f.ctx), None);
        assert_eq!(call.argument(&f.ctx, 0).unwrap(), c);
        assert_eq!(f.ctx.parent(b.node()), None);
    }

    #[test]
    fn optional_slots_read_as_none() {
        let mut f = fixture();
        let var = Variable::new(&mut f.ctx, Span::new(0, 5), f.int, "x");
        let fun = Function::new(&mut f.ctx, Span::new(0, 20), f.int, "f");
        assert_eq!(var.initializer(&f.ctx), None);
        assert_eq!(fun.body(&f.ctx), None);
        assert_eq!(var.name(&f.ctx), "x");
    }
}
