use std::cell::Cell;
use std::rc::Rc;

use crate::ctype::CType;
use crate::node::Node;

/// A variable: a global or a local (which includes parameters).
///
/// `offset` starts at `0` and is mutated exactly once by the back end's
/// layout pass (see `layout::layout_globals`/`layout::layout_locals`);
/// every other field is set by the front end and never touched here.
/// Sharing is via `Rc` rather than an arena index because the same
/// `VarObj` is referenced both from the function's `locals`/`params` list
/// and from every `Node::Var` that names it — the offset needs to be
/// visible from both without re-resolving a lookup on every access.
#[derive(Debug)]
pub struct VarObj {
    pub name: String,
    pub ty: CType,
    pub is_static: bool,
    pub is_definition: bool,
    pub is_live: bool,
    pub offset: Cell<i64>,
    pub init_data: Option<Vec<u8>>,
    pub is_tentative: bool,
    pub is_tls: bool,
    pub is_local: bool,
}

impl VarObj {
    pub fn new_global(name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_definition: true,
            is_live: true,
            offset: Cell::new(0),
            init_data: None,
            is_tentative: false,
            is_tls: false,
            is_local: false,
        }
    }

    pub fn new_local(name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_definition: true,
            is_live: true,
            offset: Cell::new(0),
            init_data: None,
            is_tentative: false,
            is_tls: false,
            is_local: true,
        }
    }
}

/// A function: its signature, its `locals` (which includes `params`, in
/// declaration order), and its body.
///
/// `stack_size` is `0` until the layout pass runs, after which it holds
/// the 16-byte-aligned size of this function's activation record.
#[derive(Debug)]
pub struct FuncObj {
    pub name: String,
    pub return_ty: CType,
    pub is_static: bool,
    pub is_definition: bool,
    pub is_live: bool,
    pub params: Vec<Rc<VarObj>>,
    pub locals: Vec<Rc<VarObj>>,
    pub body: Option<Node>,
    pub stack_size: Cell<i64>,
}

/// Either a variable or a function, in the front end's declaration order.
#[derive(Debug, Clone)]
pub enum Obj {
    Var(Rc<VarObj>),
    Func(Rc<FuncObj>),
}

impl Obj {
    pub fn name(&self) -> &str {
        match self {
            Obj::Var(v) => &v.name,
            Obj::Func(f) => &f.name,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Obj::Func(_))
    }
}
