//! In-place rewriting traversal.
//!
//! A transformer returns, for each node it is given, the node that should
//! occupy that position afterwards. [`transform_children`] installs any
//! replacement through [`IrContext::replace_child`], so the usual slot checks
//! and detach/attach bookkeeping apply to every rewrite.
//!
//! A replacement must be free-standing. To hoist a grandchild into its
//! grandparent's slot, take it out of its parent first with
//! [`IrContext::take_child`].

use crate::context::IrContext;
use crate::error::IrResult;
use crate::refs::NodeRef;

pub trait IrTransformer<D: Clone> {
    /// Rewrite `node`, returning the node that takes its place.
    ///
    /// The default rewrites the children and keeps `node`.
    fn transform(&mut self, ctx: &mut IrContext, node: NodeRef, data: D) -> IrResult<NodeRef> {
        transform_children(ctx, node, self, data)?;
        Ok(node)
    }
}

/// Transform every child of `node` in slot order, installing replacements.
pub fn transform_children<D, T>(
    ctx: &mut IrContext,
    node: NodeRef,
    transformer: &mut T,
    data: D,
) -> IrResult<()>
where
    D: Clone,
    T: IrTransformer<D> + ?Sized,
{
    for (slot, child) in ctx.children(node) {
        let replacement = transformer.transform(ctx, child, data.clone())?;
        if replacement != child {
            ctx.replace_child(node, slot, replacement)?;
        }
    }
    Ok(())
}

/// Transform a whole tree rooted at `root` and return the new root.
///
/// If `root` sits inside a larger tree and gets replaced, the replacement is
/// installed in its place.
pub fn transform_root<D, T>(
    ctx: &mut IrContext,
    root: NodeRef,
    transformer: &mut T,
    data: D,
) -> IrResult<NodeRef>
where
    D: Clone,
    T: IrTransformer<D> + ?Sized,
{
    let location = ctx.location(root);
    let new_root = transformer.transform(ctx, root, data)?;
    if let Some(location) = location.filter(|_| new_root != root) {
        ctx.replace_child(location.parent, location.slot, new_root)?;
    }
    Ok(new_root)
}
