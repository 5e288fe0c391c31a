//! Fold `BINARY` nodes whose operands are both integer constants.
//!
//! Arithmetic is checked: overflow and division by zero leave the node
//! alone so the runtime behaviour is preserved.

use arbor_ir::{
    Binary, BinaryOp, Const, ConstValue, IrContext, IrResult, IrTransformer, NodeHandle, NodeRef,
    transform_children, transform_root,
};
use tracing::debug;

use super::PassOutcome;

/// Fold constants in the tree rooted at `root`.
pub fn fold_constants(ctx: &mut IrContext, root: NodeRef) -> IrResult<PassOutcome> {
    let mut folder = ConstantFolder::default();
    let root = transform_root(ctx, root, &mut folder, ())?;
    Ok(PassOutcome {
        root,
        changes: folder.folded,
    })
}

#[derive(Default)]
struct ConstantFolder {
    folded: usize,
}

impl IrTransformer<()> for ConstantFolder {
    fn transform(&mut self, ctx: &mut IrContext, node: NodeRef, data: ()) -> IrResult<NodeRef> {
        // Post-order, so nested arithmetic collapses bottom-up.
        transform_children(ctx, node, self, data)?;

        let Ok(binary) = Binary::from_node(ctx, node) else {
            return Ok(node);
        };
        let (Some(left), Some(right)) = (
            binary.left(ctx).ok().and_then(|e| int_value(ctx, e.node())),
            binary.right(ctx).ok().and_then(|e| int_value(ctx, e.node())),
        ) else {
            return Ok(node);
        };
        let operator = binary.operator(ctx);
        let Some(value) = evaluate(operator, left, right) else {
            debug!(%node, %operator, left, right, "not folding: result undefined");
            return Ok(node);
        };

        let (span, ty) = (ctx.span(node), ctx.ty(node));
        debug!(%node, %operator, left, right, %value, "folded");
        let folded = Const::new(ctx, span, ty, value);
        self.folded += 1;
        Ok(folded.node())
    }
}

fn int_value(ctx: &IrContext, node: NodeRef) -> Option<i64> {
    match Const::from_node(ctx, node).ok()?.value(ctx) {
        ConstValue::Int(v) => Some(*v),
        _ => None,
    }
}

fn evaluate(operator: BinaryOp, left: i64, right: i64) -> Option<ConstValue> {
    let value = match operator {
        BinaryOp::Add => ConstValue::Int(left.checked_add(right)?),
        BinaryOp::Sub => ConstValue::Int(left.checked_sub(right)?),
        BinaryOp::Mul => ConstValue::Int(left.checked_mul(right)?),
        BinaryOp::Div => ConstValue::Int(left.checked_div(right)?),
        BinaryOp::Rem => ConstValue::Int(left.checked_rem(right)?),
        BinaryOp::Eq => ConstValue::Bool(left == right),
        BinaryOp::Ne => ConstValue::Bool(left != right),
        BinaryOp::Lt => ConstValue::Bool(left < right),
        BinaryOp::Le => ConstValue::Bool(left <= right),
        BinaryOp::Gt => ConstValue::Bool(left > right),
        BinaryOp::Ge => ConstValue::Bool(left >= right),
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_ir::{Expression, GetValue, Return, Span};

    fn int(ctx: &mut IrContext, value: i64) -> Expression {
        let ty = ctx.types.named("Int");
        Const::new(ctx, Span::new(0, 1), ty, ConstValue::Int(value)).into()
    }

    fn binary(ctx: &mut IrContext, op: BinaryOp, l: Expression, r: Expression) -> Binary {
        let ty = ctx.types.named("Int");
        Binary::with_operands(ctx, Span::new(0, 5), ty, op, l, r).unwrap()
    }

    #[test]
    fn evaluate_is_checked() {
        assert_eq!(evaluate(BinaryOp::Add, 2, 3), Some(ConstValue::Int(5)));
        assert_eq!(evaluate(BinaryOp::Add, i64::MAX, 1), None);
        assert_eq!(evaluate(BinaryOp::Div, 1, 0), None);
        assert_eq!(evaluate(BinaryOp::Rem, i64::MIN, -1), None);
        assert_eq!(evaluate(BinaryOp::Le, 2, 2), Some(ConstValue::Bool(true)));
    }

    #[test]
    fn nested_arithmetic_folds_bottom_up() {
        let mut ctx = IrContext::new();
        let (a, b, c) = (int(&mut ctx, 2), int(&mut ctx, 3), int(&mut ctx, 4));
        let inner = binary(&mut ctx, BinaryOp::Mul, a, b);
        let outer = binary(&mut ctx, BinaryOp::Add, inner.into(), c);
        let ty = ctx.ty(outer.node());
        let ret = Return::with_value(&mut ctx, Span::new(0, 9), ty, outer.into()).unwrap();

        let outcome = fold_constants(&mut ctx, ret.node()).unwrap();
        assert_eq!(outcome.root, ret.node());
        assert_eq!(outcome.changes, 2);

        let value = ret.value(&ctx).unwrap().node();
        assert_eq!(int_value(&ctx, value), Some(10));
        assert_eq!(ctx.parent(outer.node()), None);
    }

    #[test]
    fn non_constant_operand_blocks_folding() {
        let mut ctx = IrContext::new();
        let ty = ctx.types.named("Int");
        let x = GetValue::new(&mut ctx, Span::new(0, 1), ty, "x");
        let one = int(&mut ctx, 1);
        let sum = binary(&mut ctx, BinaryOp::Add, x.into(), one);

        let outcome = fold_constants(&mut ctx, sum.node()).unwrap();
        assert_eq!(outcome.changes, 0);
        assert_eq!(outcome.root, sum.node());
    }

    #[test]
    fn overflow_is_left_alone() {
        let mut ctx = IrContext::new();
        let (a, b) = (int(&mut ctx, i64::MAX), int(&mut ctx, 1));
        let sum = binary(&mut ctx, BinaryOp::Add, a, b);

        let outcome = fold_constants(&mut ctx, sum.node()).unwrap();
        assert_eq!(outcome.changes, 0);
        assert_eq!(sum.left(&ctx).unwrap(), a);
    }

    #[test]
    fn detached_root_is_replaced() {
        let mut ctx = IrContext::new();
        let (a, b) = (int(&mut ctx, 7), int(&mut ctx, 7));
        let eq = binary(&mut ctx, BinaryOp::Eq, a, b);

        let outcome = fold_constants(&mut ctx, eq.node()).unwrap();
        assert_ne!(outcome.root, eq.node());
        let folded = Const::from_node(&ctx, outcome.root).unwrap();
        assert_eq!(*folded.value(&ctx), ConstValue::Bool(true));
    }
}
