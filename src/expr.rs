//! Expression generator: every successful call leaves exactly one
//! value on the operand stack, of the wasm type `wasm_type(node.ty)`.

use std::io;

use ccwasm_core::{is_float, wasm_size, wasm_type, BinOp, CType, Node, NodeKind, TypeKind, WasmType};

use crate::addr::gen_addr;
use crate::ctx::FuncCodegen;
use crate::emit::{wline, Emitter};
use crate::stmt::gen_stmt;

/// Loads the value addressed by the top of the operand stack: aggregates
/// and function types decay to the address itself (no load instruction at
/// all), floats use a typed load, and integers pick an 8/16/32-bit
/// variant, with sign taken from `ty.is_unsigned` only for the narrow (1-
/// and 2-byte) cases — a 4-byte integer load is sign-agnostic either way.
pub(crate) fn wasm_load(ty: &CType, e: &mut Emitter<'_>) -> io::Result<()> {
    if ty.is_aggregate() || matches!(ty.kind, TypeKind::Function(..)) {
        return Ok(());
    }
    match wasm_type(ty) {
        WasmType::F32 => wline!(e, "(f32.load)"),
        WasmType::F64 => wline!(e, "(f64.load)"),
        WasmType::I64 => wline!(e, "(i64.load)"),
        WasmType::I32 => match wasm_size(ty) {
            1 => wline!(e, "(i32.load8_{})", if ty.is_unsigned { "u" } else { "s" }),
            2 => wline!(e, "(i32.load16_{})", if ty.is_unsigned { "u" } else { "s" }),
            _ => wline!(e, "(i32.load)"),
        },
    }
}

/// Stores to the address under the value on top of the operand stack
/// (`[... addr val] -> [...]`). Structs/unions have no struct-copy
/// primitive to lower to, so the back end emits a diagnostic comment and
/// drops both operands instead, preserving the stack contract.
pub(crate) fn wasm_store(ty: &CType, e: &mut Emitter<'_>) -> io::Result<()> {
    if let TypeKind::Struct(_) | TypeKind::Union(_) = &ty.kind {
        wline!(e, ";; unsupported: struct/union store (size={})", ty.size)?;
        wline!(e, "(drop)")?;
        return wline!(e, "(drop)");
    }
    match wasm_type(ty) {
        WasmType::F32 => wline!(e, "(f32.store)"),
        WasmType::F64 => wline!(e, "(f64.store)"),
        WasmType::I64 => wline!(e, "(i64.store)"),
        WasmType::I32 => match wasm_size(ty) {
            1 => wline!(e, "(i32.store8)"),
            2 => wline!(e, "(i32.store16)"),
            _ => wline!(e, "(i32.store)"),
        },
    }
}

/// Emits `node` as an expression, leaving one value of its wasm type on
/// the operand stack.
pub fn gen_expr(ctx: &FuncCodegen<'_>, node: &Node, e: &mut Emitter<'_>) -> io::Result<()> {
    match &node.kind {
        NodeKind::NullExpr => wline!(e, "(i32.const 0)"),

        NodeKind::Num { val, fval } => match wasm_type(&node.ty) {
            WasmType::F32 => wline!(e, "(f32.const {:?})", *fval as f32),
            WasmType::F64 => wline!(e, "(f64.const {:?})", fval),
            WasmType::I64 => wline!(e, "(i64.const {})", val),
            WasmType::I32 => wline!(e, "(i32.const {})", *val as i32),
        },

        NodeKind::Var(_) | NodeKind::Member { .. } => {
            gen_addr(ctx, node, e)?;
            wasm_load(&node.ty, e)
        }

        NodeKind::Addr(inner) => gen_addr(ctx, inner, e),

        NodeKind::Deref(pointer) => {
            gen_expr(ctx, pointer, e)?;
            wasm_load(&node.ty, e)
        }

        NodeKind::Neg(inner) => {
            if is_float(&node.ty) {
                gen_expr(ctx, inner, e)?;
                wline!(e, "({}.neg)", wasm_type(&node.ty))
            } else {
                wline!(e, "({}.const 0)", wasm_type(&node.ty))?;
                gen_expr(ctx, inner, e)?;
                wline!(e, "({}.sub)", wasm_type(&node.ty))
            }
        }

        NodeKind::Not(inner) => {
            gen_expr(ctx, inner, e)?;
            wline!(e, "({}.eqz)", wasm_type(&inner.ty))
        }

        NodeKind::BitNot(inner) => {
            gen_expr(ctx, inner, e)?;
            wline!(e, "({t}.const -1)", t = wasm_type(&node.ty))?;
            wline!(e, "({}.xor)", wasm_type(&node.ty))
        }

        NodeKind::Assign { lhs, rhs } => gen_assign(ctx, node, lhs, rhs, e),

        NodeKind::Comma { lhs, rhs } => {
            gen_expr(ctx, lhs, e)?;
            wline!(e, "(drop)")?;
            gen_expr(ctx, rhs, e)
        }

        NodeKind::Cast(inner) => gen_cast(ctx, inner, &node.ty, e),

        NodeKind::Cond { cond, then, els } => gen_cond(ctx, cond, then, els.as_deref(), &node.ty, e),

        NodeKind::LogAnd { lhs, rhs } => gen_logand(ctx, lhs, rhs, e),
        NodeKind::LogOr { lhs, rhs } => gen_logor(ctx, lhs, rhs, e),

        NodeKind::FunCall { callee, args } => gen_funcall(ctx, callee, args, e),

        NodeKind::StmtExpr(body) => gen_stmt_expr(ctx, body, e),

        NodeKind::Memzero(var) => {
            wline!(
                e,
                "(i32.add (local.get $__bp) (i32.const {}))",
                var.offset.get()
            )?;
            wline!(e, "(i32.const 0)")?;
            wline!(e, "(i32.const {})", var.ty.size)?;
            wline!(e, "(memory.fill)")
        }

        NodeKind::Binary { op, lhs, rhs } => gen_binary(ctx, *op, lhs, rhs, &node.ty, e),

        NodeKind::Unsupported(reason) => {
            wline!(e, ";; unsupported: {reason}")?;
            wline!(e, "({}.const 0)", wasm_type(&node.ty))
        }

        _ => ctx
            .sink
            .error_tok(&node.tok, "unreachable node kind in expression generator"),
    }
}

fn gen_assign(
    ctx: &FuncCodegen<'_>,
    node: &Node,
    lhs: &Node,
    rhs: &Node,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    // Wasm has no tee-through-store instruction, so a scratch local per
    // value category stands in: store-from-scratch, then reload so the
    // assignment's value is also the expression's result.
    gen_addr(ctx, lhs, e)?;
    gen_expr(ctx, rhs, e)?;
    let scratch = scratch_local(wasm_type(&node.ty));
    wline!(e, "(local.set {scratch})")?;
    wline!(e, "(local.get {scratch})")?;
    wasm_store(&node.ty, e)?;
    wline!(e, "(local.get {scratch})")
}

pub(crate) fn scratch_local(ty: WasmType) -> &'static str {
    match ty {
        WasmType::I32 | WasmType::I64 => "$__tmp_i32",
        WasmType::F32 => "$__tmp_f32",
        WasmType::F64 => "$__tmp_f64",
    }
}

fn gen_cast(ctx: &FuncCodegen<'_>, inner: &Node, to: &CType, e: &mut Emitter<'_>) -> io::Result<()> {
    gen_expr(ctx, inner, e)?;
    let from = &inner.ty;
    let from_wt = wasm_type(from);
    let to_wt = wasm_type(to);

    if !is_float(from) && !is_float(to) && from_wt != WasmType::I64 && to_wt != WasmType::I64 {
        if matches!(to.kind, TypeKind::Bool) {
            wline!(e, "(i32.const 0)")?;
            return wline!(e, "(i32.ne)");
        }
        if to.size == 1 {
            return if to.is_unsigned {
                wline!(e, "(i32.const 255)")?;
                wline!(e, "(i32.and)")
            } else {
                wline!(e, "(i32.extend8_s)")
            };
        }
        if to.size == 2 {
            return if to.is_unsigned {
                wline!(e, "(i32.const 65535)")?;
                wline!(e, "(i32.and)")
            } else {
                wline!(e, "(i32.extend16_s)")
            };
        }
        return Ok(());
    }

    if from_wt == WasmType::F32 && to_wt == WasmType::F64 {
        return wline!(e, "(f64.promote_f32)");
    }
    if from_wt == WasmType::F64 && to_wt == WasmType::F32 {
        return wline!(e, "(f32.demote_f64)");
    }

    if is_float(from) && !is_float(to) {
        let suffix = if to.is_unsigned { "u" } else { "s" };
        return wline!(e, "({to_wt}.trunc_{from_wt}_{suffix})");
    }
    if !is_float(from) && is_float(to) {
        let suffix = if from.is_unsigned { "u" } else { "s" };
        return wline!(e, "({to_wt}.convert_{from_wt}_{suffix})");
    }

    Ok(())
}

fn gen_cond(
    ctx: &FuncCodegen<'_>,
    cond: &Node,
    then: &Node,
    els: Option<&Node>,
    ty: &CType,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    let wt = wasm_type(ty);
    gen_expr(ctx, cond, e)?;
    wline!(e, "(if (result {wt})")?;
    e.block(|e| {
        wline!(e, "(then")?;
        e.block(|e| gen_expr(ctx, then, e))?;
        wline!(e, ")")?;
        wline!(e, "(else")?;
        e.block(|e| match els {
            Some(els) => gen_expr(ctx, els, e),
            None => wline!(e, "({wt}.const 0)"),
        })?;
        wline!(e, ")")
    })?;
    wline!(e, ")")
}

fn gen_logand(ctx: &FuncCodegen<'_>, lhs: &Node, rhs: &Node, e: &mut Emitter<'_>) -> io::Result<()> {
    gen_expr(ctx, lhs, e)?;
    wline!(e, "(if (result i32)")?;
    e.block(|e| {
        wline!(e, "(then")?;
        e.block(|e| {
            gen_expr(ctx, rhs, e)?;
            wline!(e, "(i32.const 0)")?;
            wline!(e, "(i32.ne)")
        })?;
        wline!(e, ")")?;
        wline!(e, "(else (i32.const 0))")
    })?;
    wline!(e, ")")
}

fn gen_logor(ctx: &FuncCodegen<'_>, lhs: &Node, rhs: &Node, e: &mut Emitter<'_>) -> io::Result<()> {
    gen_expr(ctx, lhs, e)?;
    wline!(e, "(if (result i32)")?;
    e.block(|e| {
        wline!(e, "(then (i32.const 1))")?;
        wline!(e, "(else")?;
        e.block(|e| {
            gen_expr(ctx, rhs, e)?;
            wline!(e, "(i32.const 0)")?;
            wline!(e, "(i32.ne)")
        })?;
        wline!(e, ")")
    })?;
    wline!(e, ")")
}

fn gen_funcall(
    ctx: &FuncCodegen<'_>,
    callee: &Node,
    args: &[Node],
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    for arg in args {
        gen_expr(ctx, arg, e)?;
    }
    match &callee.kind {
        NodeKind::Var(var) => wline!(e, "(call ${})", var.name),
        _ => {
            wline!(e, ";; unsupported: indirect call")?;
            wline!(e, "(drop)")?;
            wline!(e, "(i32.const 0)")
        }
    }
}

fn gen_stmt_expr(ctx: &FuncCodegen<'_>, body: &[Node], e: &mut Emitter<'_>) -> io::Result<()> {
    let Some((last, init)) = body.split_last() else {
        return wline!(e, "(i32.const 0)");
    };
    for stmt in init {
        gen_stmt(ctx, stmt, e)?;
    }
    if let NodeKind::ExprStmt(expr) = &last.kind {
        gen_expr(ctx, expr, e)
    } else {
        gen_stmt(ctx, last, e)?;
        wline!(e, "(i32.const 0)")
    }
}

fn gen_binary(
    ctx: &FuncCodegen<'_>,
    op: BinOp,
    lhs: &Node,
    rhs: &Node,
    ty: &CType,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    gen_expr(ctx, lhs, e)?;
    gen_expr(ctx, rhs, e)?;

    let floaty = is_float(ty);
    let t = if floaty { wasm_type(ty) } else { WasmType::I32 };
    let unsigned = lhs.ty.is_unsigned;

    match op {
        BinOp::Add => wline!(e, "({t}.add)"),
        BinOp::Sub => wline!(e, "({t}.sub)"),
        BinOp::Mul => wline!(e, "({t}.mul)"),
        BinOp::Div => {
            if floaty {
                wline!(e, "({t}.div)")
            } else {
                wline!(e, "({t}.div_{})", if unsigned { "u" } else { "s" })
            }
        }
        BinOp::Mod => wline!(e, "({t}.rem_{})", if unsigned { "u" } else { "s" }),
        BinOp::BitAnd => wline!(e, "({t}.and)"),
        BinOp::BitOr => wline!(e, "({t}.or)"),
        BinOp::BitXor => wline!(e, "({t}.xor)"),
        BinOp::Shl => wline!(e, "({t}.shl)"),
        BinOp::Shr => wline!(e, "({t}.shr_{})", if unsigned { "u" } else { "s" }),
        BinOp::Eq => wline!(e, "({t}.eq)"),
        BinOp::Ne => wline!(e, "({t}.ne)"),
        BinOp::Lt => {
            if floaty {
                wline!(e, "({t}.lt)")
            } else {
                wline!(e, "({t}.lt_{})", if unsigned { "u" } else { "s" })
            }
        }
        BinOp::Le => {
            if floaty {
                wline!(e, "({t}.le)")
            } else {
                wline!(e, "({t}.le_{})", if unsigned { "u" } else { "s" })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ccwasm_core::{CType, FuncObj, ProcessExitSink, Token, TokenKind, VarObj};

    use super::*;

    fn tok() -> Token {
        Token::new(TokenKind::Ident, "x", 1)
    }

    fn dummy_func() -> FuncObj {
        FuncObj {
            name: "f".into(),
            return_ty: CType::int_(false),
            is_static: false,
            is_definition: true,
            is_live: true,
            params: vec![],
            locals: vec![],
            body: None,
            stack_size: std::cell::Cell::new(0),
        }
    }

    fn render(node: &Node) -> String {
        let func = dummy_func();
        let ctx = FuncCodegen::new(&func, &ProcessExitSink);
        let mut buf = Vec::new();
        {
            let mut e = Emitter::new(&mut buf);
            gen_expr(&ctx, node, &mut e).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn num_picks_the_typed_constant() {
        let n = Node::new(NodeKind::Num { val: 42, fval: 0.0 }, CType::int_(false), tok());
        assert_eq!(render(&n), "(i32.const 42)\n");

        let n = Node::new(
            NodeKind::Num { val: 0, fval: 3.5 },
            CType::double_(),
            tok(),
        );
        assert_eq!(render(&n), "(f64.const 3.5)\n");
    }

    #[test]
    fn neg_on_int_is_zero_minus_x() {
        let inner = Box::new(Node::new(NodeKind::Num { val: 5, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(NodeKind::Neg(inner), CType::int_(false), tok());
        assert_eq!(render(&n), "(i32.const 0)\n(i32.const 5)\n(i32.sub)\n");
    }

    #[test]
    fn neg_on_float_uses_typed_neg() {
        let inner = Box::new(Node::new(
            NodeKind::Num { val: 0, fval: 5.0 },
            CType::float_(),
            tok(),
        ));
        let n = Node::new(NodeKind::Neg(inner), CType::float_(), tok());
        assert_eq!(render(&n), "(f32.const 5.0)\n(f32.neg)\n");
    }

    #[test]
    fn logand_normalises_the_right_side_to_zero_or_one() {
        let lhs = Box::new(Node::new(NodeKind::Num { val: 1, fval: 0.0 }, CType::int_(false), tok()));
        let rhs = Box::new(Node::new(NodeKind::Num { val: 2, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(NodeKind::LogAnd { lhs, rhs }, CType::int_(false), tok());
        let out = render(&n);
        assert!(out.contains("(if (result i32)"));
        assert!(out.contains("(else (i32.const 0))"));
    }

    #[test]
    fn cast_to_bool_is_compare_not_equal_zero() {
        let inner = Box::new(Node::new(NodeKind::Num { val: 5, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(NodeKind::Cast(inner), CType::bool_(), tok());
        assert_eq!(render(&n), "(i32.const 5)\n(i32.const 0)\n(i32.ne)\n");
    }

    #[test]
    fn cast_narrows_unsigned_char_with_a_mask() {
        let inner = Box::new(Node::new(NodeKind::Num { val: 5, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(NodeKind::Cast(inner), CType::char_(true), tok());
        assert_eq!(
            render(&n),
            "(i32.const 5)\n(i32.const 255)\n(i32.and)\n"
        );
    }

    #[test]
    fn cast_narrows_signed_short_by_sign_extending() {
        let inner = Box::new(Node::new(NodeKind::Num { val: 5, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(NodeKind::Cast(inner), CType::short_(false), tok());
        assert_eq!(render(&n), "(i32.const 5)\n(i32.extend16_s)\n");
    }

    #[test]
    fn cast_float_to_int_truncates_with_signedness() {
        let inner = Box::new(Node::new(
            NodeKind::Num { val: 0, fval: 1.0 },
            CType::double_(),
            tok(),
        ));
        let n = Node::new(NodeKind::Cast(inner), CType::int_(true), tok());
        assert_eq!(render(&n), "(f64.const 1.0)\n(i32.trunc_f64_u)\n");
    }

    #[test]
    fn binary_add_on_ints_uses_i32() {
        let lhs = Box::new(Node::new(NodeKind::Num { val: 1, fval: 0.0 }, CType::int_(false), tok()));
        let rhs = Box::new(Node::new(NodeKind::Num { val: 2, fval: 0.0 }, CType::int_(false), tok()));
        let n = Node::new(
            NodeKind::Binary {
                op: BinOp::Add,
                lhs,
                rhs,
            },
            CType::int_(false),
            tok(),
        );
        assert_eq!(render(&n), "(i32.const 1)\n(i32.const 2)\n(i32.add)\n");
    }

    #[test]
    fn binary_div_picks_signedness_from_left_operand() {
        let lhs = Box::new(Node::new(
            NodeKind::Num { val: 7, fval: 0.0 },
            CType::int_(true),
            tok(),
        ));
        let rhs = Box::new(Node::new(NodeKind::Num { val: 2, fval: 0.0 }, CType::int_(true), tok()));
        let n = Node::new(
            NodeKind::Binary {
                op: BinOp::Div,
                lhs,
                rhs,
            },
            CType::int_(true),
            tok(),
        );
        assert!(render(&n).contains("(i32.div_u)"));
    }

    #[test]
    fn memzero_uses_memory_fill() {
        let var = Rc::new(VarObj::new_local("buf", CType::array_of(CType::char_(false), 16)));
        var.offset.set(32);
        let n = Node::new(NodeKind::Memzero(var), CType::void(), tok());
        let out = render(&n);
        assert_eq!(
            out,
            "(i32.add (local.get $__bp) (i32.const 32))\n(i32.const 0)\n(i32.const 16)\n(memory.fill)\n"
        );
    }

    #[test]
    fn stmt_expr_pushes_the_final_expr_statement_without_dropping() {
        let a = Node::new(
            NodeKind::ExprStmt(Box::new(Node::new(
                NodeKind::Num { val: 1, fval: 0.0 },
                CType::int_(false),
                tok(),
            ))),
            CType::void(),
            tok(),
        );
        let b = Node::new(
            NodeKind::ExprStmt(Box::new(Node::new(
                NodeKind::Num { val: 2, fval: 0.0 },
                CType::int_(false),
                tok(),
            ))),
            CType::void(),
            tok(),
        );
        let n = Node::new(NodeKind::StmtExpr(vec![a, b]), CType::int_(false), tok());
        let out = render(&n);
        assert_eq!(out, "(i32.const 1)\n(drop)\n(i32.const 2)\n");
    }
}
