use std::cell::RefCell;

use crate::token::Token;

/// The back end's one collaborator for reporting failure.
///
/// The generator has no local recovery: a construct is either supported,
/// or it is lowered as a diagnostic stub (a comment plus a type-correct
/// placeholder value), or emission calls into an `ErrorSink` and never
/// returns. A pluggable, downstream-supplied error sink rather than a
/// fixed concrete error type lets the compiler driver embedding this
/// crate decide how "terminate the process" actually looks (print-and-
/// exit, unwind, or — in tests — record-and-panic).
pub trait ErrorSink {
    /// Reports a fatal, source-located error and never returns.
    fn error_tok(&self, tok: &Token, message: &str) -> !;
}

/// The default [`ErrorSink`]: prints `file:line: message` to stderr and
/// exits the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExitSink;

impl ErrorSink for ProcessExitSink {
    fn error_tok(&self, tok: &Token, message: &str) -> ! {
        eprintln!(
            "{}:{}: {}",
            tok.file.as_deref().unwrap_or("<input>"),
            tok.line,
            message
        );
        std::process::exit(1);
    }
}

/// A test-only [`ErrorSink`] that records the last message instead of
/// exiting the process, so assertions can inspect what was reported.
///
/// `error_tok` still diverges (it panics), since callers of a real
/// `ErrorSink` rely on the call site being unreachable afterwards.
#[derive(Debug, Default)]
pub struct RecordingSink {
    last: RefCell<Option<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<String> {
        self.last.borrow().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn error_tok(&self, tok: &Token, message: &str) -> ! {
        let full = format!(
            "{}:{}: {}",
            tok.file.as_deref().unwrap_or("<input>"),
            tok.line,
            message
        );
        *self.last.borrow_mut() = Some(full.clone());
        panic!("{full}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    #[should_panic(expected = "not an lvalue")]
    fn recording_sink_panics_and_records() {
        let sink = RecordingSink::new();
        let tok = Token::new(TokenKind::Ident, "x", 3);
        sink.error_tok(&tok, "not an lvalue");
    }

    #[test]
    fn recording_sink_records_before_panicking() {
        let sink = std::panic::AssertUnwindSafe(RecordingSink::new());
        let tok = Token::new(TokenKind::Ident, "x", 3).with_file("a.c");
        let result = std::panic::catch_unwind(|| sink.error_tok(&tok, "boom"));
        assert!(result.is_err());
        assert_eq!(sink.last_message().as_deref(), Some("a.c:3: boom"));
    }
}
