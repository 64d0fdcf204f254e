//! Address generator: for any lvalue-producing node, emits code
//! that leaves its linear-memory address on the operand stack.

use std::io;

use ccwasm_core::{Node, NodeKind};

use crate::ctx::FuncCodegen;
use crate::emit::{wline, Emitter};
use crate::expr::gen_expr;

/// Emits the address of `node`, which must be one of the lvalue-producing
/// kinds (`Var`, `Member`, `Deref`, `Comma`). Any other kind is a fatal,
/// token-located error — the generator has no fallback for "not an
/// lvalue".
pub fn gen_addr(ctx: &FuncCodegen<'_>, node: &Node, e: &mut Emitter<'_>) -> io::Result<()> {
    match &node.kind {
        NodeKind::Var(var) if var.is_local => {
            wline!(
                e,
                "(i32.add (local.get $__bp) (i32.const {}))",
                var.offset.get()
            )
        }
        NodeKind::Var(var) => {
            wline!(e, "(i32.const {}) ;; &{}", var.offset.get(), var.name)
        }
        NodeKind::Deref(pointer) => gen_expr(ctx, pointer, e),
        NodeKind::Comma { lhs, rhs } => {
            gen_expr(ctx, lhs, e)?;
            wline!(e, "(drop)")?;
            gen_addr(ctx, rhs, e)
        }
        NodeKind::Member { base, member } => {
            gen_addr(ctx, base, e)?;
            wline!(e, "(i32.const {})", member.offset)?;
            wline!(e, "(i32.add)")
        }
        _ => ctx.sink.error_tok(&node.tok, "not an lvalue"),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ccwasm_core::{CType, ErrorSink, ProcessExitSink, RecordingSink, Token, TokenKind, VarObj};

    use super::*;

    fn tok() -> Token {
        Token::new(TokenKind::Ident, "x", 1)
    }

    fn dummy_func() -> ccwasm_core::FuncObj {
        ccwasm_core::FuncObj {
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

    fn render(node: &Node, sink: &dyn ErrorSink, func: &ccwasm_core::FuncObj) -> String {
        let ctx = FuncCodegen::new(func, sink);
        let mut buf = Vec::new();
        {
            let mut e = Emitter::new(&mut buf);
            gen_addr(&ctx, node, &mut e).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn local_var_address_is_bp_plus_offset() {
        let var = Rc::new(VarObj::new_local("x", CType::int_(false)));
        var.offset.set(12);
        let node = Node::new(NodeKind::Var(var), CType::int_(false), tok());
        let func = dummy_func();
        let out = render(&node, &ProcessExitSink, &func);
        assert_eq!(out, "(i32.add (local.get $__bp) (i32.const 12))\n");
    }

    #[test]
    fn global_var_address_is_a_constant() {
        let var = Rc::new(VarObj::new_global("g", CType::int_(false)));
        var.offset.set(8);
        let node = Node::new(NodeKind::Var(var), CType::int_(false), tok());
        let func = dummy_func();
        let out = render(&node, &ProcessExitSink, &func);
        assert_eq!(out, "(i32.const 8) ;; &g\n");
    }

    #[test]
    fn member_address_adds_member_offset_to_base_address() {
        let var = Rc::new(VarObj::new_local("s", CType::int_(false)));
        var.offset.set(0);
        let base = Box::new(Node::new(
            NodeKind::Var(var),
            CType::int_(false),
            tok(),
        ));
        let member = ccwasm_core::Member {
            name: "field".into(),
            ty: CType::int_(false),
            offset: 4,
        };
        let node = Node::new(
            NodeKind::Member { base, member },
            CType::int_(false),
            tok(),
        );
        let func = dummy_func();
        let out = render(&node, &ProcessExitSink, &func);
        assert_eq!(
            out,
            "(i32.add (local.get $__bp) (i32.const 0))\n(i32.const 4)\n(i32.add)\n"
        );
    }

    #[test]
    #[should_panic(expected = "not an lvalue")]
    fn non_lvalue_kind_is_fatal() {
        let sink = RecordingSink::new();
        let node = Node::new(
            NodeKind::Num { val: 1, fval: 0.0 },
            CType::int_(false),
            tok(),
        );
        let func = dummy_func();
        render(&node, &sink, &func);
    }
}
