use serde::{Deserialize, Serialize};
use std::fmt;

/// A member of a `struct`/`union`, already placed by the front end.
///
/// Member offsets are fixed by the type itself and are never touched by
/// the back end's layout pass (only `Obj::offset` and `FuncObj::stack_size`
/// are assigned there).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub ty: CType,
    pub offset: i64,
}

/// The tagged type description every `Obj` and `Node` carries.
///
/// `size` and `align` are positive for every variant; `align` is a power of
/// two for scalars. A pointer's `size`/`align` is always 4 under this back
/// end's wasm32 ABI, and an array's `size` is always `base.size * len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CType {
    pub kind: TypeKind,
    pub size: i64,
    pub align: i64,
    /// Meaningful only for integer kinds (`Bool`, `Char`, `Short`, `Int`,
    /// `Long`, `Enum`); ignored elsewhere.
    pub is_unsigned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    LongDouble,
    Enum,
    Pointer(Box<CType>),
    Array(Box<CType>, usize),
    Vla(Box<CType>),
    Function(Box<CType>, Vec<CType>),
    Struct(Vec<Member>),
    Union(Vec<Member>),
}

impl CType {
    pub fn void() -> Self {
        Self::scalar(TypeKind::Void, 1, 1, false)
    }

    pub fn bool_() -> Self {
        Self::scalar(TypeKind::Bool, 1, 1, false)
    }

    pub fn char_(is_unsigned: bool) -> Self {
        Self::scalar(TypeKind::Char, 1, 1, is_unsigned)
    }

    pub fn short_(is_unsigned: bool) -> Self {
        Self::scalar(TypeKind::Short, 2, 2, is_unsigned)
    }

    pub fn int_(is_unsigned: bool) -> Self {
        Self::scalar(TypeKind::Int, 4, 4, is_unsigned)
    }

    /// `size` is 4 or 8; the back end's wasm32 ABI treats the former as
    /// `i32` and the latter as `i64` (see [`crate::wasm_type`]).
    pub fn long_(size: i64, is_unsigned: bool) -> Self {
        Self::scalar(TypeKind::Long, size, size, is_unsigned)
    }

    pub fn float_() -> Self {
        Self::scalar(TypeKind::Float, 4, 4, false)
    }

    pub fn double_() -> Self {
        Self::scalar(TypeKind::Double, 8, 8, false)
    }

    pub fn long_double() -> Self {
        Self::scalar(TypeKind::LongDouble, 8, 8, false)
    }

    pub fn enum_() -> Self {
        Self::scalar(TypeKind::Enum, 4, 4, false)
    }

    pub fn pointer_to(base: CType) -> Self {
        Self::scalar(TypeKind::Pointer(Box::new(base)), 4, 4, false)
    }

    pub fn array_of(base: CType, len: usize) -> Self {
        let size = base.size * len as i64;
        Self {
            align: base.align,
            kind: TypeKind::Array(Box::new(base), len),
            size,
            is_unsigned: false,
        }
    }

    pub fn vla_of(base: CType) -> Self {
        let align = base.align;
        Self {
            kind: TypeKind::Vla(Box::new(base)),
            size: 0,
            align,
            is_unsigned: false,
        }
    }

    pub fn function(return_ty: CType, params: Vec<CType>) -> Self {
        Self::scalar(TypeKind::Function(Box::new(return_ty), params), 4, 4, false)
    }

    pub fn struct_(members: Vec<Member>, size: i64, align: i64) -> Self {
        Self {
            kind: TypeKind::Struct(members),
            size,
            align,
            is_unsigned: false,
        }
    }

    pub fn union_(members: Vec<Member>, size: i64, align: i64) -> Self {
        Self {
            kind: TypeKind::Union(members),
            size,
            align,
            is_unsigned: false,
        }
    }

    fn scalar(kind: TypeKind, size: i64, align: i64, is_unsigned: bool) -> Self {
        Self {
            kind,
            size,
            align,
            is_unsigned,
        }
    }

    /// The single authoritative predicate for "is this `long` the 64-bit
    /// variant on this target". `wasm_type` and `wasm_size` both defer to
    /// this so they can never disagree about a given `long`, which is the
    /// back end's resolution of the open question in its design notes
    /// around `long` width.
    pub fn is_long64(&self) -> bool {
        matches!(self.kind, TypeKind::Long) && self.size == 8
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Array(..) | TypeKind::Struct(_) | TypeKind::Union(_)
        )
    }
}

impl fmt::Display for CType {
    /// Short human form, e.g. `int`, `unsigned long`, `char *`, `char[10]`,
    /// `struct(16)`, `int (*)()`. Pointers recurse into `base`, appending
    /// ` *`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Void => {
                write!(f, "{}void", if self.is_unsigned { "unsigned " } else { "" })
            }
            TypeKind::Bool => write!(f, "_Bool"),
            TypeKind::Char => write!(f, "{}char", if self.is_unsigned { "unsigned " } else { "" }),
            TypeKind::Short => {
                write!(f, "{}short", if self.is_unsigned { "unsigned " } else { "" })
            }
            TypeKind::Int => write!(f, "{}int", if self.is_unsigned { "unsigned " } else { "" }),
            TypeKind::Long => write!(f, "{}long", if self.is_unsigned { "unsigned " } else { "" }),
            TypeKind::Float => write!(f, "float"),
            TypeKind::Double => write!(f, "double"),
            TypeKind::LongDouble => write!(f, "long double"),
            TypeKind::Enum => write!(f, "enum"),
            TypeKind::Struct(members) => write!(f, "struct({})", members.len()),
            TypeKind::Union(members) => write!(f, "union({})", members.len()),
            TypeKind::Pointer(base) => write!(f, "{} *", base),
            TypeKind::Array(base, len) => write!(f, "{}[{}]", base, len),
            TypeKind::Vla(base) => write!(f, "{}[*]", base),
            TypeKind::Function(ret, _params) => write!(f, "{} (*)()", ret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringifies_like_the_original_dumper() {
        assert_eq!(CType::int_(false).to_string(), "int");
        assert_eq!(CType::long_(4, true).to_string(), "unsigned long");
        assert_eq!(
            CType::pointer_to(CType::char_(false)).to_string(),
            "char *"
        );
        assert_eq!(
            CType::array_of(CType::int_(false), 10).to_string(),
            "int[10]"
        );
        assert_eq!(
            CType::function(CType::int_(false), vec![]).to_string(),
            "int (*)()"
        );
    }

    #[test]
    fn array_size_is_base_size_times_len() {
        let ty = CType::array_of(CType::int_(false), 10);
        assert_eq!(ty.size, 40);
    }

    #[test]
    fn long64_predicate_is_the_single_source_of_truth() {
        assert!(CType::long_(8, false).is_long64());
        assert!(!CType::long_(4, false).is_long64());
    }
}
