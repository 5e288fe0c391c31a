//! Closure-based traversal utilities.
//!
//! For one-off queries where a full [`IrVisitor`](crate::visit::IrVisitor)
//! would be overkill.

use std::ops::ControlFlow;

use crate::context::IrContext;
use crate::kinds::NodeHandle;
use crate::refs::NodeRef;

/// Controls whether to descend into children during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Continue walking and descend into children.
    Advance,
    /// Skip the children of the current node.
    Skip,
}

/// Walk `node` and its descendants in pre-order, children in slot order.
pub fn walk<B>(
    ctx: &IrContext,
    node: NodeRef,
    f: &mut dyn FnMut(NodeRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    match f(node) {
        ControlFlow::Break(b) => return ControlFlow::Break(b),
        ControlFlow::Continue(WalkAction::Skip) => return ControlFlow::Continue(()),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }
    for (_, child) in ctx.children(node) {
        walk(ctx, child, f)?;
    }
    ControlFlow::Continue(())
}

/// Walk only the nodes that cast to `T`; others are descended into silently.
pub fn walk_typed<T, B>(
    ctx: &IrContext,
    node: NodeRef,
    f: &mut dyn FnMut(T) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()>
where
    T: NodeHandle,
{
    walk(ctx, node, &mut |n| match T::from_node(ctx, n) {
        Ok(typed) => f(typed),
        Err(_) => ControlFlow::Continue(WalkAction::Advance),
    })
}

/// Collect `node` and all its descendants in pre-order.
pub fn descendants(ctx: &IrContext, node: NodeRef) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let _ = walk::<()>(ctx, node, &mut |n| {
        out.push(n);
        ControlFlow::Continue(WalkAction::Advance)
    });
    out
}

/// Iterator over the proper ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    ctx: &'a IrContext,
    current: Option<NodeRef>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let next = self.ctx.parent(self.current?);
        self.current = next;
        next
    }
}

pub fn ancestors(ctx: &IrContext, node: NodeRef) -> Ancestors<'_> {
    Ancestors {
        ctx,
        current: Some(node),
    }
}

/// The topmost ancestor of `node`, or `node` itself when detached.
pub fn root_of(ctx: &IrContext, node: NodeRef) -> NodeRef {
    ancestors(ctx, node).last().unwrap_or(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Binary, Const, Expression, GetClass, Return};
    use crate::location::Span;
    use crate::node::{BinaryOp, ConstValue};

    struct Tree {
        ctx: IrContext,
        ret: Return,
        sum: Binary,
        left: Expression,
        get_class: GetClass,
    }

    /// `return (1 + 2::class)`
    fn tree() -> Tree {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let left: Expression = Const::new(&mut ctx, Span::new(7, 8), int, ConstValue::Int(1)).into();
        let two: Expression = Const::new(&mut ctx, Span::new(11, 12), int, ConstValue::Int(2)).into();
        let get_class = GetClass::with_argument(&mut ctx, Span::new(11, 19), int, two).unwrap();
        let sum = Binary::with_operands(
            &mut ctx,
            Span::new(7, 19),
            int,
            BinaryOp::Add,
            left,
            get_class.into(),
        )
        .unwrap();
        let ret = Return::with_value(&mut ctx, Span::new(0, 20), int, sum.into()).unwrap();
        Tree {
            ctx,
            ret,
            sum,
            left,
            get_class,
        }
    }

    #[test]
    fn walk_visits_all_nodes_in_pre_order() {
        let t = tree();
        let order = descendants(&t.ctx, t.ret.node());
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], t.ret.node());
        assert_eq!(order[1], t.sum.node());
        assert_eq!(order[2], t.left.node());
        assert_eq!(order[3], t.get_class.node());
    }

    #[test]
    fn walk_with_early_exit() {
        let t = tree();
        let mut visited = 0;
        let result = walk::<NodeRef>(&t.ctx, t.ret.node(), &mut |n| {
            visited += 1;
            if GetClass::from_node(&t.ctx, n).is_ok() {
                ControlFlow::Break(n)
            } else {
                ControlFlow::Continue(WalkAction::Advance)
            }
        });
        assert_eq!(result, ControlFlow::Break(t.get_class.node()));
        assert_eq!(visited, 4);
    }

    #[test]
    fn walk_skip_children() {
        let t = tree();
        let mut consts = 0;
        let _ = walk_typed::<Const, ()>(&t.ctx, t.ret.node(), &mut |_| {
            consts += 1;
            ControlFlow::Continue(WalkAction::Advance)
        });
        assert_eq!(consts, 2);

        let mut seen = Vec::new();
        let _ = walk::<()>(&t.ctx, t.ret.node(), &mut |n| {
            seen.push(n);
            if n == t.get_class.node() {
                ControlFlow::Continue(WalkAction::Skip)
            } else {
                ControlFlow::Continue(WalkAction::Advance)
            }
        });
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn ancestors_and_root() {
        let t = tree();
        let two = t.get_class.argument(&t.ctx).unwrap().node();
        let chain: Vec<_> = ancestors(&t.ctx, two).collect();
        assert_eq!(chain, [t.get_class.node(), t.sum.node(), t.ret.node()]);
        assert_eq!(root_of(&t.ctx, two), t.ret.node());
        assert_eq!(root_of(&t.ctx, t.ret.node()), t.ret.node());
    }
}
