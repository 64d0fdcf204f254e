//! Shared data model for the `ccwasm` WebAssembly back end.
//!
//! This crate owns the three entity families the code generator borrows
//! read-only (`CType`, `Obj`, `Node`), the token type the JSON dumper
//! streams, the wasm value-type classifier, and the `ErrorSink`
//! collaborator trait the generator calls back into on an unrecoverable
//! error.
//!
//! Nothing in this crate executes or validates WebAssembly; it only
//! describes the inputs the generator consumes and the small set of
//! pure functions (`wasm_type`, `wasm_size`, `align_to`) that classify
//! them.

mod ctype;
mod error;
mod layout_util;
mod node;
mod obj;
mod token;
mod types;

pub use ctype::{CType, Member, TypeKind};
pub use error::{ErrorSink, ProcessExitSink, RecordingSink};
pub use layout_util::{align_to, AlignError};
pub use node::{BinOp, CaseLabel, Node, NodeKind};
pub use obj::{FuncObj, Obj, VarObj};
pub use token::{NumValue, Token, TokenKind};
pub use types::{is_f32, is_f64, is_float, is_i64, wasm_size, wasm_type, WasmType};
