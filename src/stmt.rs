//! Statement generator: every successful call leaves the operand
//! stack empty.
//!
//! `Switch` lowers case labels into nested wasm blocks, entered via a
//! chain of range-test branches, giving correct fall-through and
//! `default:` routing without needing a dense, `br_table`-friendly
//! index domain over the case values.

use std::io;

use ccwasm_core::{CaseLabel, Node, NodeKind};

use crate::ctx::FuncCodegen;
use crate::emit::{wline, Emitter};
use crate::expr::gen_expr;

pub fn gen_stmt(ctx: &FuncCodegen<'_>, node: &Node, e: &mut Emitter<'_>) -> io::Result<()> {
    match &node.kind {
        NodeKind::Return(value) => {
            if let Some(value) = value {
                gen_expr(ctx, value, e)?;
            }
            wline!(e, "(br $__return)")
        }

        NodeKind::ExprStmt(expr) => {
            gen_expr(ctx, expr, e)?;
            if !matches!(expr.ty.kind, ccwasm_core::TypeKind::Void) {
                wline!(e, "(drop)")?;
            }
            Ok(())
        }

        NodeKind::Block(body) => {
            for stmt in body {
                gen_stmt(ctx, stmt, e)?;
            }
            Ok(())
        }

        NodeKind::If { cond, then, els } => gen_if(ctx, cond, then, els.as_deref(), e),

        NodeKind::For {
            init,
            cond,
            inc,
            body,
            brk_label,
            cont_label,
        } => gen_for(ctx, init.as_deref(), cond.as_deref(), inc.as_deref(), body, brk_label, cont_label, e),

        NodeKind::Do {
            body,
            cond,
            brk_label,
            cont_label,
        } => gen_do(ctx, body, cond, brk_label, cont_label, e),

        NodeKind::Switch {
            cond,
            cases,
            body,
            brk_label,
        } => gen_switch(ctx, cond, cases, body, brk_label, e),

        NodeKind::Case(label) => wline!(e, ";; {}", describe_case(label)),

        NodeKind::Label { label, body } => {
            wline!(e, ";; label: {label}")?;
            gen_stmt(ctx, body, e)
        }

        NodeKind::Goto(label) => wline!(e, ";; unsupported: goto {label}"),

        NodeKind::Unsupported(reason) => wline!(e, ";; unsupported: {reason}"),

        _ => ctx
            .sink
            .error_tok(&node.tok, "unreachable node kind in statement generator"),
    }
}

fn describe_case(label: &CaseLabel) -> String {
    if label.is_default {
        "default:".to_string()
    } else if label.begin == label.end {
        format!("case {}:", label.begin)
    } else {
        format!("case {} ... {}:", label.begin, label.end)
    }
}

fn gen_if(
    ctx: &FuncCodegen<'_>,
    cond: &Node,
    then: &Node,
    els: Option<&Node>,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    gen_expr(ctx, cond, e)?;
    wline!(e, "(if")?;
    e.block(|e| {
        wline!(e, "(then")?;
        e.block(|e| gen_stmt(ctx, then, e))?;
        wline!(e, ")")?;
        if let Some(els) = els {
            wline!(e, "(else")?;
            e.block(|e| gen_stmt(ctx, els, e))?;
            wline!(e, ")")?;
        }
        Ok(())
    })?;
    wline!(e, ")")
}

#[allow(clippy::too_many_arguments)]
fn gen_for(
    ctx: &FuncCodegen<'_>,
    init: Option<&Node>,
    cond: Option<&Node>,
    inc: Option<&Node>,
    body: &Node,
    brk_label: &str,
    cont_label: &str,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    if let Some(init) = init {
        gen_stmt(ctx, init, e)?;
    }
    wline!(e, "(block {brk_label} ;; break target")?;
    e.block(|e| {
        wline!(e, "(loop {cont_label} ;; continue target")?;
        e.block(|e| {
            if let Some(cond) = cond {
                gen_expr(ctx, cond, e)?;
                wline!(e, "(i32.eqz)")?;
                wline!(e, "(br_if {brk_label})")?;
            }
            gen_stmt(ctx, body, e)?;
            if let Some(inc) = inc {
                gen_expr(ctx, inc, e)?;
                if !matches!(inc.ty.kind, ccwasm_core::TypeKind::Void) {
                    wline!(e, "(drop)")?;
                }
            }
            wline!(e, "(br {cont_label})")
        })?;
        wline!(e, ") ;; end loop")
    })?;
    wline!(e, ") ;; end block")
}

fn gen_do(
    ctx: &FuncCodegen<'_>,
    body: &Node,
    cond: &Node,
    brk_label: &str,
    cont_label: &str,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    wline!(e, "(block {brk_label} ;; break target")?;
    e.block(|e| {
        wline!(e, "(loop {cont_label} ;; continue target")?;
        e.block(|e| {
            gen_stmt(ctx, body, e)?;
            gen_expr(ctx, cond, e)?;
            wline!(e, "(br_if {cont_label})")
        })?;
        wline!(e, ") ;; end loop")
    })?;
    wline!(e, ") ;; end block")
}

/// The body is split into contiguous segments at each `Case` marker, one
/// segment per entry in `cases` (any statements preceding the first
/// marker are unreachable dead code and are dropped, matching how an
/// unlabelled prefix of a C `switch` body behaves). `N` nested blocks are
/// opened outer-to-inner (`L(N-1)` outermost down to `L0` innermost); the
/// innermost block's body is the dispatch — a chain of range tests that
/// `br_if`s into the matching block — so that closing `L0` lands exactly
/// at the start of segment 0, closing `L1` lands at the start of segment
/// 1, and so on. Falling out of one segment without an explicit `break`
/// (i.e. without branching to `$brk`) runs straight into the next
/// segment, which is C's fall-through, for free from the block nesting.
fn gen_switch(
    ctx: &FuncCodegen<'_>,
    cond: &Node,
    cases: &[CaseLabel],
    body: &[Node],
    brk_label: &str,
    e: &mut Emitter<'_>,
) -> io::Result<()> {
    gen_expr(ctx, cond, e)?;
    wline!(e, "(local.set $__tmp_i32)")?;

    if cases.is_empty() {
        wline!(e, "(block {brk_label}")?;
        e.block(|e| {
            for stmt in body {
                gen_stmt(ctx, stmt, e)?;
            }
            Ok(())
        })?;
        return wline!(e, ") ;; end switch");
    }

    let case_positions: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n.kind, NodeKind::Case(_)))
        .map(|(i, _)| i)
        .collect();
    debug_assert_eq!(case_positions.len(), cases.len());

    let labels: Vec<String> = (0..cases.len()).map(|i| ctx.next_label(&format!("sw_case{i}"))).collect();
    let default_index = cases.iter().position(|c| c.is_default);

    wline!(e, "(block {brk_label} ;; switch break target")?;
    e.block(|e| {
        for label in labels.iter().skip(1).rev() {
            wline!(e, "(block {label}")?;
            e.indent();
        }
        wline!(e, "(block {} ;; dispatch", labels[0])?;
        e.block(|e| {
            for (i, case) in cases.iter().enumerate() {
                if case.is_default {
                    continue;
                }
                wline!(e, "(local.get $__tmp_i32)")?;
                if case.begin == case.end {
                    wline!(e, "(i32.const {})", case.begin)?;
                    wline!(e, "(i32.eq)")?;
                } else {
                    wline!(e, "(i32.const {})", case.begin)?;
                    wline!(e, "(i32.ge_s)")?;
                    wline!(e, "(local.get $__tmp_i32)")?;
                    wline!(e, "(i32.const {})", case.end)?;
                    wline!(e, "(i32.le_s)")?;
                    wline!(e, "(i32.and)")?;
                }
                wline!(e, "(br_if {})", labels[i])?;
            }
            match default_index {
                Some(i) => wline!(e, "(br {})", labels[i]),
                None => wline!(e, "(br {brk_label})"),
            }
        })?;
        wline!(e, ") ;; end dispatch")?;

        for i in 0..labels.len() {
            let start = case_positions[i];
            let end = case_positions.get(i + 1).copied().unwrap_or(body.len());
            for stmt in &body[start..end] {
                gen_stmt(ctx, stmt, e)?;
            }
            if i + 1 < labels.len() {
                wline!(e, ") ;; end {}", labels[i + 1])?;
                e.dedent();
            }
        }
        Ok(())
    })?;
    wline!(e, ") ;; end switch")
}
