//! Drop `IMPLICIT_CAST`s whose argument already has the target type.

use arbor_ir::{
    IrContext, IrResult, IrTransformer, NodeHandle, NodeRef, TypeOperator, TypeOperatorKind,
    transform_children, transform_root,
};
use tracing::debug;

use super::PassOutcome;

pub fn remove_redundant_casts(ctx: &mut IrContext, root: NodeRef) -> IrResult<PassOutcome> {
    let mut remover = CastRemover::default();
    let root = transform_root(ctx, root, &mut remover, ())?;
    Ok(PassOutcome {
        root,
        changes: remover.removed,
    })
}

#[derive(Default)]
struct CastRemover {
    removed: usize,
}

impl IrTransformer<()> for CastRemover {
    fn transform(&mut self, ctx: &mut IrContext, node: NodeRef, data: ()) -> IrResult<NodeRef> {
        transform_children(ctx, node, self, data)?;

        let Ok(cast) = TypeOperator::from_node(ctx, node) else {
            return Ok(node);
        };
        if cast.operator(ctx) != TypeOperatorKind::ImplicitCast {
            return Ok(node);
        }
        let Ok(argument) = cast.argument(ctx).map(|e| e.node()) else {
            return Ok(node);
        };
        if ctx.ty(argument) != cast.type_operand(ctx) {
            return Ok(node);
        }

        // Free the argument so it can take the cast's place.
        ctx.take_child(node, TypeOperator::ARGUMENT)?;
        debug!(cast = %node, %argument, "removed redundant implicit cast");
        self.removed += 1;
        Ok(argument)
    }
}
