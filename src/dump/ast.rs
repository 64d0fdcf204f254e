use std::io::{self, Write};

use ccwasm_core::{BinOp, CType, Node, NodeKind, Obj};
use serde_json::json;

use super::{float_to_json, MAX_DEPTH};

/// Dumps a translation unit as a single pretty-printed JSON object,
/// `{"globals": [...]}`, one entry per top-level declaration in
/// declaration order. A function entry carries its parameters, locals,
/// and (for a definition) its body's full node tree; a variable entry
/// carries the flags a front end would need to tell a tentative
/// definition, a thread-local, or an initialized object apart, without
/// dumping the initializer bytes themselves.
#[tracing::instrument(skip_all, fields(decl_count = program.len()))]
pub fn dump_ast(program: &[Obj], out: &mut dyn Write) -> io::Result<()> {
    let globals: Vec<serde_json::Value> = program.iter().map(obj_to_json).collect();
    serde_json::to_writer_pretty(&mut *out, &json!({ "globals": globals }))?;
    out.write_all(b"\n")
}

fn obj_to_json(obj: &Obj) -> serde_json::Value {
    match obj {
        Obj::Var(var) => {
            let mut v = json!({
                "name": var.name,
                "is_function": false,
                "is_definition": var.is_definition,
                "is_static": var.is_static,
                "type": var.ty.to_string(),
            });
            if var.is_tentative {
                v["is_tentative"] = json!(true);
            }
            if var.is_tls {
                v["is_tls"] = json!(true);
            }
            if var.init_data.is_some() {
                v["has_init_data"] = json!(true);
            }
            v
        }
        Obj::Func(func) => {
            let func_ty = CType::function(func.return_ty.clone(), func.params.iter().map(|p| p.ty.clone()).collect());
            let params: Vec<serde_json::Value> = func
                .params
                .iter()
                .map(|p| json!({"name": p.name, "type": p.ty.to_string(), "offset": p.offset.get()}))
                .collect();
            let locals: Vec<serde_json::Value> = func
                .locals
                .iter()
                .map(|l| json!({"name": l.name, "type": l.ty.to_string(), "offset": l.offset.get()}))
                .collect();
            json!({
                "name": func.name,
                "is_function": true,
                "is_definition": func.is_definition,
                "is_static": func.is_static,
                "type": func_ty.to_string(),
                "return_type": func.return_ty.to_string(),
                "params": params,
                "body": func.body.as_ref().map(|b| node_to_json(b, 0)),
                "locals": locals,
            })
        }
    }
}

fn node_to_json(node: &Node, depth: u32) -> serde_json::Value {
    if depth >= MAX_DEPTH {
        return json!({ "kind": "...(truncated)" });
    }
    let recurse = |n: &Node| node_to_json(n, depth + 1);
    let mut fields = match &node.kind {
        NodeKind::Num { val, fval } => json!({"kind": "num", "val": val, "fval": float_to_json(*fval)}),
        NodeKind::NullExpr => json!({"kind": "null_expr"}),
        NodeKind::Memzero(var) => json!({"kind": "memzero", "name": var.name}),

        NodeKind::Var(var) => json!({"kind": "var", "name": var.name}),
        NodeKind::Member { base, member } => {
            json!({"kind": "member", "lhs": recurse(base), "member": member.name})
        }
        NodeKind::Deref(inner) => json!({"kind": "deref", "lhs": recurse(inner)}),
        NodeKind::Comma { lhs, rhs } => json!({"kind": "comma", "lhs": recurse(lhs), "rhs": recurse(rhs)}),

        NodeKind::Neg(inner) => json!({"kind": "neg", "lhs": recurse(inner)}),
        NodeKind::Not(inner) => json!({"kind": "not", "lhs": recurse(inner)}),
        NodeKind::BitNot(inner) => json!({"kind": "bit_not", "lhs": recurse(inner)}),
        NodeKind::Addr(inner) => json!({"kind": "addr", "lhs": recurse(inner)}),
        NodeKind::Cast(inner) => json!({"kind": "cast", "lhs": recurse(inner)}),

        NodeKind::Binary { op, lhs, rhs } => {
            json!({"kind": "binary", "op": binop_name(*op), "lhs": recurse(lhs), "rhs": recurse(rhs)})
        }
        NodeKind::Assign { lhs, rhs } => json!({"kind": "assign", "lhs": recurse(lhs), "rhs": recurse(rhs)}),
        NodeKind::LogAnd { lhs, rhs } => json!({"kind": "log_and", "lhs": recurse(lhs), "rhs": recurse(rhs)}),
        NodeKind::LogOr { lhs, rhs } => json!({"kind": "log_or", "lhs": recurse(lhs), "rhs": recurse(rhs)}),

        NodeKind::Cond { cond, then, els } => json!({
            "kind": "cond",
            "cond": recurse(cond),
            "then": recurse(then),
            "els": els.as_deref().map(recurse),
        }),
        NodeKind::FunCall { callee, args } => json!({
            "kind": "fun_call",
            "func": recurse(callee),
            "args": args.iter().map(recurse).collect::<Vec<_>>(),
        }),
        NodeKind::StmtExpr(body) => json!({
            "kind": "stmt_expr",
            "body": body.iter().map(recurse).collect::<Vec<_>>(),
        }),

        NodeKind::Return(value) => json!({"kind": "return", "lhs": value.as_deref().map(recurse)}),
        NodeKind::ExprStmt(inner) => json!({"kind": "expr_stmt", "lhs": recurse(inner)}),
        NodeKind::Block(body) => json!({
            "kind": "block",
            "body": body.iter().map(recurse).collect::<Vec<_>>(),
        }),
        NodeKind::If { cond, then, els } => json!({
            "kind": "if",
            "cond": recurse(cond),
            "then": recurse(then),
            "els": els.as_deref().map(recurse),
        }),
        NodeKind::For { init, cond, inc, body, brk_label, cont_label } => json!({
            "kind": "for",
            "init": init.as_deref().map(recurse),
            "cond": cond.as_deref().map(recurse),
            "inc": inc.as_deref().map(recurse),
            "then": recurse(body),
            "brk_label": brk_label,
            "cont_label": cont_label,
        }),
        NodeKind::Do { body, cond, brk_label, cont_label } => json!({
            "kind": "do",
            "body": recurse(body),
            "cond": recurse(cond),
            "brk_label": brk_label,
            "cont_label": cont_label,
        }),
        NodeKind::Switch { cond, cases, body, brk_label } => json!({
            "kind": "switch",
            "cond": recurse(cond),
            "body": switch_cases_to_json(cases, body, depth),
            "brk_label": brk_label,
        }),
        NodeKind::Case(label) => json!({
            "kind": "case",
            "begin": label.begin,
            "end": label.end,
            "is_default": label.is_default,
            "body": serde_json::Value::Array(vec![]),
        }),
        NodeKind::Label { label, body } => json!({"kind": "label", "label": label, "body": recurse(body)}),
        NodeKind::Goto(label) => json!({"kind": "goto", "label": label}),
        NodeKind::Unsupported(reason) => json!({"kind": "unsupported", "reason": reason}),
    };

    fields["type"] = json!(node.ty.to_string());
    fields["line"] = json!(node.tok.line);
    fields
}

/// A `switch`'s body is a flat `Vec<Node>` of `Case` markers interleaved
/// with statements (see [`ccwasm_core::NodeKind::Switch`]), rather than
/// each case owning its own sub-tree directly. Each case's dumped `body`
/// is reconstructed here as the
/// segment of statements between its marker and the next one (or the end
/// of the switch), which is exactly the fall-through unit the statement
/// generator in `stmt.rs` uses for codegen.
fn switch_cases_to_json(cases: &[ccwasm_core::CaseLabel], body: &[Node], depth: u32) -> Vec<serde_json::Value> {
    let case_positions: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n.kind, NodeKind::Case(_)))
        .map(|(i, _)| i)
        .collect();

    cases
        .iter()
        .enumerate()
        .map(|(i, case)| {
            let start = case_positions.get(i).map(|p| p + 1).unwrap_or(body.len());
            let end = case_positions.get(i + 1).copied().unwrap_or(body.len());
            let segment = &body[start.min(body.len())..end];
            json!({
                "kind": "case",
                "begin": case.begin,
                "end": case.end,
                "is_default": case.is_default,
                "body": segment.iter().map(|n| node_to_json(n, depth + 1)).collect::<Vec<_>>(),
            })
        })
        .collect()
}

fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
        BinOp::Mod => "mod",
        BinOp::BitAnd => "bit_and",
        BinOp::BitOr => "bit_or",
        BinOp::BitXor => "bit_xor",
        BinOp::Shl => "shl",
        BinOp::Shr => "shr",
        BinOp::Eq => "eq",
        BinOp::Ne => "ne",
        BinOp::Lt => "lt",
        BinOp::Le => "le",
    }
}
