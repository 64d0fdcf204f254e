use serde::{Deserialize, Serialize};

/// Lexical kind of a [`Token`], carried through from the front end purely
/// for the JSON dumper; the lexer itself is out of scope for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Ident,
    Punct,
    Keyword,
    Str,
    Num,
    PpNum,
    Eof,
}

/// Numeric literal payload of a `TK_NUM` token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumValue {
    Int(i64),
    Float(f64),
}

/// One token of the already-lexed input stream.
///
/// The back end never interprets a token beyond streaming it out via
/// [`crate`]'s dumper (or attaching one to a `Node`/diagnostic); lexing,
/// preprocessing, and source-location bookkeeping all belong to the front
/// end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: i32,
    pub file: Option<String>,
    pub value: Option<NumValue>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: i32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            file: None,
            value: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_value(mut self, value: NumValue) -> Self {
        self.value = Some(value);
        self
    }
}
