//! JSON diagnostic dump: `dump_tokens` and `dump_ast` are the
//! "skip code generation, show me the AST/tokens instead" entry points.

mod ast;
mod tokens;

pub use ast::dump_ast;
pub use tokens::dump_tokens;

/// Node/type recursion below this depth is replaced with a truncation
/// marker rather than recursing further — the dumper is a diagnostic
/// tool and must never blow the stack on a pathological or
/// cyclic-looking tree.
const MAX_DEPTH: u32 = 20;

/// Renders a float as a JSON number, falling back to `null` for the
/// values `serde_json` cannot represent (`NaN`, `+-inf`) rather than
/// failing the whole dump over one unrepresentable field.
fn float_to_json(x: f64) -> serde_json::Value {
    serde_json::Number::from_f64(x)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
