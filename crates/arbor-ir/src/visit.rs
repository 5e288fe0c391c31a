//! Visitor dispatch over the closed set of node kinds.
//!
//! [`accept`] matches exhaustively on [`NodeKind`] and calls the one
//! `visit_*` method for that kind, so a new kind fails to compile until it
//! has both a match arm here and a method on [`IrVisitor`].
//!
//! Every per-kind method defaults to `visit_expression` or
//! `visit_declaration`, which in turn default to the required
//! `visit_element`. Visitors override only what they care about.

use crate::context::IrContext;
use crate::kinds::{
    Binary, Block, Call, Const, Declaration, Expression, Function, GetClass, GetValue, Return,
    TypeOperator, Variable,
};
use crate::node::NodeKind;
use crate::refs::{NodeRef, Slot};

/// A traversal operation producing `R` from caller-supplied data `D`.
pub trait IrVisitor<R, D> {
    fn visit_element(&mut self, ctx: &IrContext, node: NodeRef, data: D) -> R;

    fn visit_expression(&mut self, ctx: &IrContext, expr: Expression, data: D) -> R {
        self.visit_element(ctx, expr.into(), data)
    }

    fn visit_declaration(&mut self, ctx: &IrContext, decl: Declaration, data: D) -> R {
        self.visit_element(ctx, decl.into(), data)
    }

    fn visit_const(&mut self, ctx: &IrContext, expr: Const, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_get_value(&mut self, ctx: &IrContext, expr: GetValue, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_get_class(&mut self, ctx: &IrContext, expr: GetClass, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_type_operator(&mut self, ctx: &IrContext, expr: TypeOperator, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_binary(&mut self, ctx: &IrContext, expr: Binary, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_call(&mut self, ctx: &IrContext, expr: Call, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_block(&mut self, ctx: &IrContext, expr: Block, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_return(&mut self, ctx: &IrContext, expr: Return, data: D) -> R {
        self.visit_expression(ctx, expr.into(), data)
    }

    fn visit_variable(&mut self, ctx: &IrContext, decl: Variable, data: D) -> R {
        self.visit_declaration(ctx, decl.into(), data)
    }

    fn visit_function(&mut self, ctx: &IrContext, decl: Function, data: D) -> R {
        self.visit_declaration(ctx, decl.into(), data)
    }
}

/// Dispatch `node` to the visitor method for its kind.
pub fn accept<R, D, V>(ctx: &IrContext, node: NodeRef, visitor: &mut V, data: D) -> R
where
    V: IrVisitor<R, D> + ?Sized,
{
    match ctx.kind(node) {
        NodeKind::Const { .. } => visitor.visit_const(ctx, Const(node), data),
        NodeKind::GetValue { .. } => visitor.visit_get_value(ctx, GetValue(node), data),
        NodeKind::GetClass { .. } => visitor.visit_get_class(ctx, GetClass(node), data),
        NodeKind::TypeOperator { .. } => {
            visitor.visit_type_operator(ctx, TypeOperator(node), data)
        }
        NodeKind::Binary { .. } => visitor.visit_binary(ctx, Binary(node), data),
        NodeKind::Call { .. } => visitor.visit_call(ctx, Call(node), data),
        NodeKind::Block { .. } => visitor.visit_block(ctx, Block(node), data),
        NodeKind::Return { .. } => visitor.visit_return(ctx, Return(node), data),
        NodeKind::Variable { .. } => visitor.visit_variable(ctx, Variable(node), data),
        NodeKind::Function { .. } => visitor.visit_function(ctx, Function(node), data),
    }
}

/// Call [`accept`] on every present child of `node`, in slot order.
///
/// Optional slots that are empty are skipped. An empty required slot is a
/// malformed tree: debug builds panic, release builds skip it. Use
/// [`validate_tree`](crate::validation::validate_tree) to check a tree up
/// front.
pub fn accept_children<D, V>(ctx: &IrContext, node: NodeRef, visitor: &mut V, data: D)
where
    D: Clone,
    V: IrVisitor<(), D> + ?Sized,
{
    debug_assert!(
        unset_required_slot(ctx, node).is_none(),
        "{} {node} has no child in required slot {:?}",
        ctx.kind(node).name(),
        unset_required_slot(ctx, node),
    );
    for (_, child) in ctx.children(node) {
        accept(ctx, child, visitor, data.clone());
    }
}

fn unset_required_slot(ctx: &IrContext, node: NodeRef) -> Option<Slot> {
    let kind = ctx.kind(node);
    (0..kind.slot_count() as Slot).find(|&slot| {
        kind.slot_info(slot).is_some_and(|info| !info.optional) && kind.child(slot).is_none()
    })
}

impl NodeRef {
    /// Method form of [`accept`].
    pub fn accept<R, D, V>(self, ctx: &IrContext, visitor: &mut V, data: D) -> R
    where
        V: IrVisitor<R, D> + ?Sized,
    {
        accept(ctx, self, visitor, data)
    }

    /// Method form of [`accept_children`].
    pub fn accept_children<D, V>(self, ctx: &IrContext, visitor: &mut V, data: D)
    where
        D: Clone,
        V: IrVisitor<(), D> + ?Sized,
    {
        accept_children(ctx, self, visitor, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::NodeHandle;
    use crate::location::Span;
    use crate::node::{BinaryOp, ConstValue};
    use crate::refs::TypeRef;

    fn int_const(ctx: &mut IrContext, ty: TypeRef, value: i64) -> Expression {
        Const::new(ctx, Span::new(0, 1), ty, ConstValue::Int(value)).into()
    }

    /// Records kind names in visiting order.
    struct Trace(Vec<&'static str>);

    impl IrVisitor<(), ()> for Trace {
        fn visit_element(&mut self, ctx: &IrContext, node: NodeRef, data: ()) {
            self.0.push(ctx.kind(node).name());
            accept_children(ctx, node, self, data);
        }
    }

    /// Only overrides one kind; everything else lands in `visit_element`.
    struct KindOf;

    impl IrVisitor<&'static str, ()> for KindOf {
        fn visit_element(&mut self, _ctx: &IrContext, _node: NodeRef, _data: ()) -> &'static str {
            "element"
        }

        fn visit_expression(&mut self, _ctx: &IrContext, _expr: Expression, _data: ()) -> &'static str {
            "expression"
        }

        fn visit_get_class(&mut self, _ctx: &IrContext, _expr: GetClass, _data: ()) -> &'static str {
            "get_class"
        }
    }

    #[test]
    fn accept_dispatches_on_kind_with_fallbacks() {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let arg = int_const(&mut ctx, int, 1);
        let get_class = GetClass::with_argument(&mut ctx, Span::new(0, 8), int, arg).unwrap();
        let var = Variable::new(&mut ctx, Span::new(0, 8), int, "x");

        assert_eq!(accept(&ctx, get_class.into(), &mut KindOf, ()), "get_class");
        assert_eq!(arg.node().accept(&ctx, &mut KindOf, ()), "expression");
        assert_eq!(accept(&ctx, var.into(), &mut KindOf, ()), "element");
    }

    #[test]
    fn accept_children_follows_slot_order() {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let left = GetValue::new(&mut ctx, Span::new(0, 1), int, "a");
        let right = int_const(&mut ctx, int, 2);
        let sum = Binary::with_operands(
            &mut ctx,
            Span::new(0, 5),
            int,
            BinaryOp::Add,
            left.into(),
            right,
        )
        .unwrap();
        let ret = Return::with_value(&mut ctx, Span::new(0, 12), int, sum.into()).unwrap();

        let mut trace = Trace(Vec::new());
        accept(&ctx, ret.into(), &mut trace, ());
        assert_eq!(trace.0, ["RETURN", "BINARY", "GET_VALUE", "CONST"]);
    }

    #[test]
    fn accept_children_passes_data_to_each_child() {
        struct Depths(Vec<usize>);

        impl IrVisitor<(), usize> for Depths {
            fn visit_element(&mut self, ctx: &IrContext, node: NodeRef, depth: usize) {
                self.0.push(depth);
                node.accept_children(ctx, self, depth + 1);
            }
        }

        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let a = int_const(&mut ctx, int, 1);
        let b = int_const(&mut ctx, int, 2);
        let call =
            Call::with_arguments(&mut ctx, Span::new(0, 9), int, "max", None, [a, b]).unwrap();

        let mut depths = Depths(Vec::new());
        accept(&ctx, call.into(), &mut depths, 0);
        assert_eq!(depths.0, [0, 1, 1]);
    }

    #[test]
    fn empty_optional_slots_are_skipped() {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let var = Variable::new(&mut ctx, Span::new(0, 5), int, "x");

        let mut trace = Trace(Vec::new());
        accept(&ctx, var.into(), &mut trace, ());
        assert_eq!(trace.0, ["VAR"]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "has no child in required slot Some(0)")]
    fn empty_required_slot_panics_in_debug_builds() {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let get_class = GetClass::new(&mut ctx, Span::new(10, 20), int);

        accept(&ctx, get_class.into(), &mut Trace(Vec::new()), ());
    }
}
