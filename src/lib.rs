//! A WebAssembly text-format back end for a small C compiler.
//!
//! Given an already type-checked AST (this crate never parses or type
//! checks anything — that is the front end's job), [`codegen_wasm`]
//! lowers it to a single `(module ...)` form: one wasm function per C
//! function, a software stack emulated in linear memory (wasm locals
//! have no addresses, so C's `&local` needs somewhere real to point),
//! and structured control flow in place of C's arbitrary `goto`.
//!
//! [`dump_tokens`] and [`dump_ast`] are the diagnostic escape hatches:
//! instead of generating code, they serialize the lexer's token stream
//! or the parsed AST as JSON, for front ends that want to inspect what
//! they built without driving a real wasm toolchain.

mod addr;
mod ctx;
mod dump;
mod emit;
mod expr;
mod func;
mod layout;
mod module;
mod options;
mod stmt;

pub use ccwasm_core::{
    align_to, is_f32, is_f64, is_float, is_i64, wasm_size, wasm_type, AlignError, BinOp,
    CaseLabel, CType, ErrorSink, FuncObj, Member, Node, NodeKind, NumValue, Obj, ProcessExitSink,
    RecordingSink, Token, TokenKind, TypeKind, VarObj, WasmType,
};
pub use dump::{dump_ast, dump_tokens};
pub use module::codegen_wasm;
pub use options::CodegenOptions;
