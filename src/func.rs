//! Function emitter: lowers one [`FuncObj`] definition to a wasm
//! `func` form — signature, fixed scratch locals, the stack-pointer
//! prologue/epilogue, and the body wrapped in a `$__return` block so
//! every `return` (and falling off the end) converges on one exit.

use std::io;

use ccwasm_core::{wasm_type, FuncObj, TypeKind};

use crate::ctx::FuncCodegen;
use crate::emit::{wline, Emitter};
use crate::expr::{scratch_local, wasm_store};
use crate::stmt::gen_stmt;

/// Emits `func`'s definition. Does nothing for a declaration with no
/// body (`func.body.is_none()`) — callers are expected to have already
/// filtered to live definitions (see `module::gen_module`).
#[tracing::instrument(skip_all, fields(function = %ctx.func.name))]
pub fn gen_func(ctx: &FuncCodegen<'_>, e: &mut Emitter<'_>) -> io::Result<()> {
    let func = ctx.func;
    let Some(body) = &func.body else { return Ok(()) };

    let export = if func.name == "main" {
        " (export \"_start\")"
    } else {
        ""
    };
    // `p_` prefix keeps a parameter named e.g. `__bp` or `__tmp_i32` from
    // colliding with the fixed locals declared below.
    let params: String = func
        .params
        .iter()
        .map(|p| format!(" (param $p_{} {})", p.name, wasm_type(&p.ty)))
        .collect();
    let result = if matches!(func.return_ty.kind, TypeKind::Void) {
        String::new()
    } else {
        format!(" (result {})", wasm_type(&func.return_ty))
    };

    wline!(e, "(func ${}{export}{params}{result}", func.name)?;
    e.block(|e| {
        wline!(e, "(local $__bp i32)")?;
        wline!(e, "(local $__tmp_i32 i32)")?;
        wline!(e, "(local $__tmp_f32 f32)")?;
        wline!(e, "(local $__tmp_f64 f64)")?;

        let stack_size = func.stack_size.get();
        wline!(e, "(global.set $__sp (i32.sub (global.get $__sp) (i32.const {stack_size})))")?;
        wline!(e, "(local.set $__bp (global.get $__sp))")?;

        for param in &func.params {
            wline!(
                e,
                "(i32.add (local.get $__bp) (i32.const {}))",
                param.offset.get()
            )?;
            wline!(e, "(local.get $p_{})", param.name)?;
            wasm_store(&param.ty, e)?;
        }

        let void_return = matches!(func.return_ty.kind, TypeKind::Void);
        if void_return {
            wline!(e, "(block $__return")?;
        } else {
            wline!(e, "(block $__return (result {})", wasm_type(&func.return_ty))?;
        }
        e.block(|e| {
            gen_stmt(ctx, body, e)?;
            if !void_return {
                wline!(e, "({}.const 0) ;; fallthrough default return", wasm_type(&func.return_ty))?;
            }
            Ok(())
        })?;
        wline!(e, ")")?;

        if !void_return {
            let scratch = scratch_local(wasm_type(&func.return_ty));
            wline!(e, "(local.set {scratch})")?;
        }

        wline!(e, "(global.set $__sp (i32.add (global.get $__sp) (i32.const {stack_size})))")?;

        if !void_return {
            let scratch = scratch_local(wasm_type(&func.return_ty));
            wline!(e, "(local.get {scratch})")?;
        }
        Ok(())
    })?;
    wline!(e, ")")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use ccwasm_core::{CType, Node, NodeKind, ProcessExitSink, Token, TokenKind, VarObj};

    use super::*;

    fn tok() -> Token {
        Token::new(TokenKind::Ident, "x", 1)
    }

    fn render(func: &FuncObj) -> String {
        let ctx = FuncCodegen::new(func, &ProcessExitSink);
        let mut buf = Vec::new();
        {
            let mut e = Emitter::new(&mut buf);
            gen_func(&ctx, &mut e).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn main_gets_the_start_export_and_a_default_return() {
        let body = Node::new(NodeKind::Block(vec![]), CType::void(), tok());
        let func = FuncObj {
            name: "main".into(),
            return_ty: CType::int_(false),
            is_static: false,
            is_definition: true,
            is_live: true,
            params: vec![],
            locals: vec![],
            body: Some(body),
            stack_size: Cell::new(16),
        };
        let out = render(&func);
        assert!(out.starts_with("(func $main (export \"_start\") (result i32)\n"));
        assert!(out.contains("(global.set $__sp (i32.sub (global.get $__sp) (i32.const 16)))"));
        assert!(out.contains("(i32.const 0) ;; fallthrough default return"));
        assert!(out.contains("(local.set $__tmp_i32)"));
        assert!(out.contains("(global.set $__sp (i32.add (global.get $__sp) (i32.const 16)))"));
        assert!(out.ends_with("(local.get $__tmp_i32)\n)\n"));
    }

    #[test]
    fn params_are_spilled_to_the_activation_record() {
        let param = Rc::new(VarObj::new_local("n", CType::int_(false)));
        param.offset.set(0);
        let body = Node::new(NodeKind::Block(vec![]), CType::void(), tok());
        let func = FuncObj {
            name: "id".into(),
            return_ty: CType::int_(false),
            is_static: false,
            is_definition: true,
            is_live: true,
            params: vec![param],
            locals: vec![],
            body: Some(body),
            stack_size: Cell::new(16),
        };
        let out = render(&func);
        assert!(out.contains("(param $p_n i32)"));
        assert!(out.contains("(local.get $p_n)"));
        assert!(out.contains("(i32.store)"));
    }

    #[test]
    fn void_function_has_no_result_clause_or_scratch_capture() {
        let body = Node::new(NodeKind::Block(vec![]), CType::void(), tok());
        let func = FuncObj {
            name: "noop".into(),
            return_ty: CType::void(),
            is_static: false,
            is_definition: true,
            is_live: true,
            params: vec![],
            locals: vec![],
            body: Some(body),
            stack_size: Cell::new(0),
        };
        let out = render(&func);
        assert!(out.contains("(func $noop\n"));
        assert!(!out.contains("(result"));
        assert!(!out.contains("local.set $__tmp_i32"));
    }

    #[test]
    fn declaration_without_a_body_emits_nothing() {
        let func = FuncObj {
            name: "decl_only".into(),
            return_ty: CType::int_(false),
            is_static: false,
            is_definition: false,
            is_live: false,
            params: vec![],
            locals: vec![],
            body: None,
            stack_size: Cell::new(0),
        };
        assert_eq!(render(&func), "");
    }
}
