//! Module emitter: the top-level `codegen_wasm` entry point.
//! Assembles one `(module ...)` form out of the memory/stack-pointer
//! declarations, one `data` segment per initialized global, and one
//! `func` per live function definition.

use std::io::{self, Write};

use ccwasm_core::{ErrorSink, FuncObj, Obj};

use crate::ctx::FuncCodegen;
use crate::emit::{wline, Emitter};
use crate::func::gen_func;
use crate::layout::{layout_globals, layout_locals, stack_start};
use crate::options::CodegenOptions;

/// Lowers a whole translation unit to wasm text format.
///
/// Globals are laid out first (assigning every [`ccwasm_core::VarObj`]'s
/// offset), which fixes the software stack's starting address; each live
/// function's locals are then laid out just before that function's body
/// is emitted, since no two functions' activation records overlap in
/// time and their offsets can be computed independently.
#[tracing::instrument(skip_all, fields(decl_count = program.len()))]
pub fn codegen_wasm(
    program: &[Obj],
    options: &CodegenOptions,
    sink: &dyn ErrorSink,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut e = Emitter::new(out);
    let globals_size = layout_globals(program);
    let sp_start = stack_start(globals_size, options);
    tracing::debug!(globals_size, sp_start, memory_pages = options.memory_pages, "laid out module");

    wline!(e, "(module")?;
    e.block(|e| {
        wline!(e, "(memory (export \"memory\") {})", options.memory_pages)?;
        wline!(e, "(global $__sp (mut i32) (i32.const {sp_start}))")?;
        e.blank()?;

        for obj in program {
            if let Obj::Var(var) = obj {
                if let Some(data) = &var.init_data {
                    emit_data_segment(var.offset.get(), data, e)?;
                }
            }
        }

        for obj in program {
            if let Obj::Func(func) = obj {
                if func.is_live && func.is_definition {
                    e.blank()?;
                    gen_live_func(func, sink, e)?;
                }
            }
        }
        Ok(())
    })?;
    wline!(e, ")")
}

fn gen_live_func(func: &FuncObj, sink: &dyn ErrorSink, e: &mut Emitter<'_>) -> io::Result<()> {
    layout_locals(func);
    tracing::debug!(function = %func.name, stack_size = func.stack_size.get(), "emitting function");
    let ctx = FuncCodegen::new(func, sink);
    gen_func(&ctx, e)
}

fn emit_data_segment(offset: i64, data: &[u8], e: &mut Emitter<'_>) -> io::Result<()> {
    wline!(e, "(data (i32.const {offset}) \"{}\")", escape_data(data))
}

/// Renders a byte string as a wat string literal: printable, non-quote,
/// non-backslash ASCII verbatim; everything else as `\xx` lowercase hex.
fn escape_data(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:02x}", b)),
        }
    }
    out
}
