//! Deep copy of subtrees, e.g. for inlining a function body at a call site.

use tracing::debug;

use crate::context::IrContext;
use crate::error::IrResult;
use crate::node::NodeKind;
use crate::refs::NodeRef;

/// Copy `node` and everything below it into fresh, detached nodes.
///
/// Kinds, payloads, spans and resolved types are preserved; the copy shares
/// no node with the original.
pub fn deep_copy(ctx: &mut IrContext, node: NodeRef) -> IrResult<NodeRef> {
    let copy = copy_node(ctx, node)?;
    debug!(original = %node, %copy, "deep_copy");
    Ok(copy)
}

fn copy_node(ctx: &mut IrContext, node: NodeRef) -> IrResult<NodeRef> {
    let data = ctx.node(node);
    let (span, ty) = (data.span, data.ty);
    let kind = data.kind().without_children();
    let is_block = matches!(kind, NodeKind::Block { .. });
    let children = ctx.children(node);

    let copy = ctx.create_node(span, ty, kind);
    for (slot, child) in children {
        let child_copy = copy_node(ctx, child)?;
        if is_block {
            ctx.insert_statement_at(copy, slot as usize, child_copy)?;
        } else {
            ctx.set_child(copy, slot, child_copy)?;
        }
    }
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{
        Block, Call, Const, Expression, Function, GetValue, NodeHandle, Statement, Variable,
    };
    use crate::location::Span;
    use crate::node::ConstValue;
    use crate::printer::print_tree;
    use crate::validation::validate_tree;
    use crate::walk::descendants;

    #[test]
    fn copy_is_detached_and_structurally_equal() {
        let mut ctx = IrContext::new();
        let int = ctx.types.named("Int");
        let unit = ctx.types.named("Unit");
        let one = Const::new(&mut ctx, Span::new(8, 9), int, ConstValue::Int(1));
        let var = Variable::with_initializer(&mut ctx, Span::new(0, 9), int, "x", one.into()).unwrap();
        let x = GetValue::new(&mut ctx, Span::new(20, 21), int, "x");
        let call = Call::with_arguments(
            &mut ctx,
            Span::new(12, 22),
            unit,
            "println",
            None,
            [Expression::from(x)],
        )
        .unwrap();
        let body = Block::with_statements(
            &mut ctx,
            Span::new(0, 24),
            unit,
            [Statement::from(var), Statement::from(call)],
        )
        .unwrap();
        let fun = Function::with_body(&mut ctx, Span::new(0, 30), unit, "main", body.into()).unwrap();

        let copy = deep_copy(&mut ctx, fun.node()).unwrap();

        assert_eq!(ctx.parent(copy), None);
        assert_eq!(print_tree(&ctx, copy), print_tree(&ctx, fun.node()));
        assert!(validate_tree(&ctx, copy).is_ok());

        let original = descendants(&ctx, fun.node());
        let copied = descendants(&ctx, copy);
        assert_eq!(original.len(), copied.len());
        assert!(copied.iter().all(|n| !original.contains(n)));
    }
}
