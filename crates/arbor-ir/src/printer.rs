//! Text dump of IR trees.
//!
//! ```text
//! RETURN type=Nothing @3..20
//!   value: GET_CLASS type=KClass<Foo> @10..20
//!     argument: GET_VALUE 'x' type=Foo @12..18
//! ```
//!
//! Required slots that are still empty print as `<unset>`; empty optional
//! slots are omitted.

use std::fmt::{self, Write};

use crate::context::IrContext;
use crate::node::NodeKind;
use crate::refs::{NodeRef, TypeRef};

/// What to include on each line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrinterOptions {
    pub show_types: bool,
    pub show_spans: bool,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            show_types: true,
            show_spans: true,
        }
    }
}

/// Print the tree rooted at `root` with default options.
pub fn print_tree(ctx: &IrContext, root: NodeRef) -> String {
    print_tree_with(ctx, root, PrinterOptions::default())
}

pub fn print_tree_with(ctx: &IrContext, root: NodeRef, options: PrinterOptions) -> String {
    let mut out = String::new();
    write_node(ctx, &mut out, root, None, 0, options).expect("fmt::Write to String never fails");
    out
}

/// Print a type as text, e.g. `KClass<Foo>?`.
pub fn print_type(ctx: &IrContext, ty: TypeRef) -> String {
    let mut out = String::new();
    write_type(ctx, &mut out, ty).expect("fmt::Write to String never fails");
    out
}

fn write_type(ctx: &IrContext, f: &mut impl Write, ty: TypeRef) -> fmt::Result {
    let data = ctx.types.get(ty);
    write!(f, "{}", data.name)?;
    if !data.args.is_empty() {
        f.write_char('<')?;
        for (i, &arg) in data.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_type(ctx, f, arg)?;
        }
        f.write_char('>')?;
    }
    if data.nullable {
        f.write_char('?')?;
    }
    Ok(())
}

fn write_node(
    ctx: &IrContext,
    f: &mut impl Write,
    node: NodeRef,
    role: Option<&str>,
    depth: usize,
    options: PrinterOptions,
) -> fmt::Result {
    write_indent(f, depth)?;
    if let Some(role) = role {
        write!(f, "{role}: ")?;
    }
    let kind = ctx.kind(node);
    f.write_str(kind.name())?;
    match kind {
        NodeKind::Const { value } => write!(f, " {value}")?,
        NodeKind::GetValue { symbol } => write!(f, " '{symbol}'")?,
        NodeKind::TypeOperator {
            operator,
            type_operand,
            ..
        } => {
            write!(f, " {operator} ")?;
            write_type(ctx, f, *type_operand)?;
        }
        NodeKind::Binary { operator, .. } => write!(f, " {operator}")?,
        NodeKind::Call { callee, .. } => write!(f, " '{callee}'")?,
        NodeKind::Variable { name, .. } | NodeKind::Function { name, .. } => {
            write!(f, " '{name}'")?
        }
        NodeKind::GetClass { .. } | NodeKind::Block { .. } | NodeKind::Return { .. } => {}
    }
    if options.show_types {
        f.write_str(" type=")?;
        write_type(ctx, f, ctx.ty(node))?;
    }
    if options.show_spans {
        write!(f, " @{}", ctx.span(node))?;
    }
    f.write_char('\n')?;

    for slot in 0..kind.slot_count() as u32 {
        let Some(info) = kind.slot_info(slot) else {
            continue;
        };
        match kind.child(slot) {
            Some(child) => write_node(ctx, f, child, Some(info.role), depth + 1, options)?,
            None if !info.optional => {
                write_indent(f, depth + 1)?;
                writeln!(f, "{}: <unset>", info.role)?;
            }
            None => {}
        }
    }
    Ok(())
}

fn write_indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}
