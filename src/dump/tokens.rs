use std::io::{self, Write};

use ccwasm_core::{NumValue, Token, TokenKind};
use serde_json::json;

use super::float_to_json;

/// Dumps a lexed token stream as a pretty-printed JSON array, one object
/// per token: `{"kind", "text", "line", "file", "val"|"fval"}`. Only a
/// `TK_NUM` token carries a value, and it carries exactly one of `val`
/// (integer) or `fval` (floating-point) — never both, and never a
/// generic catch-all key — matching how a consumer would branch on the
/// token's own type rather than on the shape of an extra field.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn dump_tokens(tokens: &[Token], out: &mut dyn Write) -> io::Result<()> {
    let array: Vec<serde_json::Value> = tokens.iter().map(token_to_json).collect();
    serde_json::to_writer_pretty(&mut *out, &serde_json::Value::Array(array))?;
    out.write_all(b"\n")
}

fn token_to_json(tok: &Token) -> serde_json::Value {
    let mut v = json!({
        "kind": kind_name(tok.kind),
        "text": tok.text,
        "line": tok.line,
        "file": tok.file,
    });
    if tok.kind == TokenKind::Num {
        if let Some(value) = tok.value {
            match value {
                NumValue::Int(n) => v["val"] = json!(n),
                NumValue::Float(f) => v["fval"] = float_to_json(f),
            }
        }
    }
    v
}

fn kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Ident => "ident",
        TokenKind::Punct => "punct",
        TokenKind::Keyword => "keyword",
        TokenKind::Str => "str",
        TokenKind::Num => "num",
        TokenKind::PpNum => "pp_num",
        TokenKind::Eof => "eof",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_literal_token_carries_val_not_fval() {
        let tok = Token::new(TokenKind::Num, "42", 3).with_file("a.c").with_value(NumValue::Int(42));
        let mut out = Vec::new();
        dump_tokens(&[tok], &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v[0]["kind"], "num");
        assert_eq!(v[0]["text"], "42");
        assert_eq!(v[0]["line"], 3);
        assert_eq!(v[0]["file"], "a.c");
        assert_eq!(v[0]["val"], 42);
        assert!(v[0].get("fval").is_none());
    }

    #[test]
    fn float_literal_token_carries_fval_not_val() {
        let tok = Token::new(TokenKind::Num, "1.5", 1).with_value(NumValue::Float(1.5));
        let mut out = Vec::new();
        dump_tokens(&[tok], &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v[0]["fval"], 1.5);
        assert!(v[0].get("val").is_none());
    }

    #[test]
    fn absent_file_dumps_as_null_and_non_num_tokens_carry_no_value() {
        let tok = Token::new(TokenKind::Eof, "", 9);
        let mut out = Vec::new();
        dump_tokens(&[tok], &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(v[0]["file"].is_null());
        assert!(v[0].get("val").is_none());
        assert!(v[0].get("fval").is_none());
    }

    #[test]
    fn nan_float_value_dumps_as_null_instead_of_failing() {
        let tok = Token::new(TokenKind::Num, "nan", 1).with_value(NumValue::Float(f64::NAN));
        let mut out = Vec::new();
        dump_tokens(&[tok], &mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(v[0]["fval"].is_null());
    }
}
