use std::cell::Cell;

use ccwasm_core::{ErrorSink, FuncObj};

/// Per-function code-generation context: the current function being
/// lowered and a monotonic counter used to mint synthetic block labels
/// that don't collide with the front end's own `brk_label`/`cont_label`
/// names (used by the `switch` lowering's nested dispatch blocks).
///
/// This is the context value the back end's concurrency notes call for:
/// rather than process-global mutable state, the handful of pieces of
/// per-function state are bundled here and threaded explicitly through
/// `gen_addr`/`gen_expr`/`gen_stmt`.
pub struct FuncCodegen<'a> {
    pub func: &'a FuncObj,
    pub sink: &'a dyn ErrorSink,
    label_counter: Cell<u32>,
}

impl<'a> FuncCodegen<'a> {
    pub fn new(func: &'a FuncObj, sink: &'a dyn ErrorSink) -> Self {
        Self {
            func,
            sink,
            label_counter: Cell::new(0),
        }
    }

    /// Mints a fresh `$<prefix>_<n>` label, unique within this function.
    pub fn next_label(&self, prefix: &str) -> String {
        let n = self.label_counter.get();
        self.label_counter.set(n + 1);
        format!("${prefix}_{n}")
    }
}
