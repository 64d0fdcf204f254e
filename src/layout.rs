//! Memory layout: assigning offsets to globals and to each function's
//! activation record, and computing the software stack pointer's start
//! value.
//!
//! Both passes here run exactly once, before any code is emitted, and are
//! the only place in this crate that writes `VarObj::offset` or
//! `FuncObj::stack_size` (see this crate's concurrency notes: the AST
//! graph is otherwise immutable during code generation).

use ccwasm_core::{align_to, FuncObj, Obj};

use crate::CodegenOptions;

/// Assigns each global variable's offset in linear memory, in declaration
/// order, and returns the total size rounded up to 16 — the address the
/// software stack starts growing downward from (after
/// [`CodegenOptions::stack_headroom`] bytes of slack and a round-up to a
/// 64 KiB page boundary).
pub fn layout_globals(program: &[Obj]) -> i64 {
    let mut offset: i64 = 0;
    for obj in program {
        if let Obj::Var(var) = obj {
            let align = var.ty.align.max(1);
            offset = align_to(offset, align).expect("front end only emits power-of-two aligns");
            var.offset.set(offset);
            offset += var.ty.size;
        }
    }
    align_to(offset, 16).expect("16 is a power of two")
}

/// Assigns offsets, within `func`'s own activation record starting at 0,
/// to every local (which includes every parameter — they share one list)
/// and records the 16-aligned total as `func.stack_size`.
pub fn layout_locals(func: &FuncObj) {
    let mut offset: i64 = 0;
    for local in &func.locals {
        let align = local.ty.align.max(1);
        offset = align_to(offset, align).expect("front end only emits power-of-two aligns");
        local.offset.set(offset);
        offset += local.ty.size;
    }
    func.stack_size
        .set(align_to(offset, 16).expect("16 is a power of two"));
}

/// The initial value of the module's `$__sp` global: the downward-growing
/// software stack starts at least `options.stack_headroom` bytes past the
/// end of the globals region, rounded up to a 64 KiB page, and never below
/// one page regardless of how small the program's globals are.
pub fn stack_start(globals_size: i64, options: &CodegenOptions) -> i64 {
    const WASM_PAGE: i64 = 65536;
    let wanted = globals_size + i64::from(options.stack_headroom);
    let aligned = align_to(wanted, WASM_PAGE).expect("64 KiB is a power of two");
    aligned.max(WASM_PAGE)
}
