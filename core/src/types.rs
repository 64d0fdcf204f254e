use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ctype::{CType, TypeKind};

/// The four wasm value categories a [`CType`] can classify into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for WasmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WasmType::I32 => write!(f, "i32"),
            WasmType::I64 => write!(f, "i64"),
            WasmType::F32 => write!(f, "f32"),
            WasmType::F64 => write!(f, "f64"),
        }
    }
}

/// Classifies a C type into the wasm value category it is represented as
/// on the operand stack.
///
/// `float` maps to `f32`; `double` and `long double` (treated identically,
/// per this back end's non-goals) map to `f64`; a `long` whose front end
/// marked it 8 bytes wide maps to `i64`; everything else — `bool`, `char`,
/// `short`, `int`, a 4-byte `long`, `enum`, pointers, arrays, and function
/// types — maps to `i32`.
pub fn wasm_type(ty: &CType) -> WasmType {
    match &ty.kind {
        TypeKind::Float => WasmType::F32,
        TypeKind::Double | TypeKind::LongDouble => WasmType::F64,
        TypeKind::Long if ty.is_long64() => WasmType::I64,
        _ => WasmType::I32,
    }
}

/// The effective size in bytes used to pick a load/store width: pointers
/// and function types are always 4, and a `long` agrees with
/// [`wasm_type`] (8 when the front end marked it 8 bytes wide, 4
/// otherwise) rather than being pinned to 4 independently of
/// `wasm_type`'s classification — this is the back end's resolution of the
/// `long`-width open question (`wasm_size` and `wasm_type` must never
/// disagree about the same type).
pub fn wasm_size(ty: &CType) -> i64 {
    match &ty.kind {
        TypeKind::Pointer(_) | TypeKind::Function(..) => 4,
        TypeKind::Long => {
            if ty.is_long64() {
                8
            } else {
                4
            }
        }
        _ => ty.size,
    }
}

pub fn is_i64(ty: &CType) -> bool {
    wasm_type(ty) == WasmType::I64
}

pub fn is_f32(ty: &CType) -> bool {
    wasm_type(ty) == WasmType::F32
}

pub fn is_f64(ty: &CType) -> bool {
    wasm_type(ty) == WasmType::F64
}

pub fn is_float(ty: &CType) -> bool {
    is_f32(ty) || is_f64(ty)
}
