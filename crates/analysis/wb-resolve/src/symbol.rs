//! What a name denotes

use crate::scope::ScopeTable;
use std::fmt;
use std::ops::Index;
use wb_arena::{Arena, Idx};
use wb_ast::TypeRef;
use wb_intern::{Interner, Name};

/// Unique identifier for a symbol
pub type SymbolId = Idx<Symbol>;

/// Bare type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `void`
    Void,
    /// Any `struct T`, without the name
    Struct,
}

impl PrimitiveType {
    /// Source keyword for this tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Void => "void",
            Self::Struct => "struct",
        }
    }
}

impl From<TypeRef> for PrimitiveType {
    fn from(ty: TypeRef) -> Self {
        match ty {
            TypeRef::Int => Self::Int,
            TypeRef::Bool => Self::Bool,
            TypeRef::Void => Self::Void,
            TypeRef::Struct(_) => Self::Struct,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Function signature
///
/// Created with only a return type when the function name is declared;
/// formal tags are appended left to right as each formal resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    /// Type tags of successfully declared formals, in order
    pub formals: Vec<PrimitiveType>,
    /// Return type
    pub ret: PrimitiveType,
}

impl FunctionSig {
    /// Signature with no formals yet
    #[must_use]
    pub fn new(ret: PrimitiveType) -> Self {
        Self {
            formals: Vec::new(),
            ret,
        }
    }
}

/// A struct type definition, owning its field namespace
///
/// The field table never joins the lexical scope stack; it is searched
/// only by dot access.
#[derive(Debug, Clone)]
pub struct StructDef {
    /// Field name to field symbol
    pub fields: ScopeTable,
}

/// A variable or field whose type is a named struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructInstance {
    /// The [`Symbol::StructDef`] this instance's type names
    pub def: SymbolId,
    /// Name of the struct type
    pub type_name: Name,
}

/// A resolved meaning of a name
#[derive(Debug, Clone)]
pub enum Symbol {
    /// Bare type tag
    Primitive(PrimitiveType),
    /// Function
    Function(FunctionSig),
    /// Struct type definition
    StructDef(StructDef),
    /// Struct-typed variable or field
    StructInstance(StructInstance),
}

/// Arena of all symbols created by one resolution pass
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    arena: Arena<Symbol>,
}

impl Symbols {
    /// Create an empty symbol arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a symbol
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        self.arena.alloc(symbol)
    }

    /// Append a formal tag to a function symbol
    ///
    /// Has no effect on non-function symbols.
    pub fn push_formal(&mut self, function: SymbolId, tag: PrimitiveType) {
        if let Symbol::Function(sig) = &mut self.arena[function] {
            sig.formals.push(tag);
        }
    }

    /// The struct definition an instance refers to
    ///
    /// Returns `None` unless `id` is a [`Symbol::StructInstance`].
    pub fn struct_def_of(&self, id: SymbolId) -> Option<SymbolId> {
        match &self.arena[id] {
            Symbol::StructInstance(instance) => Some(instance.def),
            _ => None,
        }
    }

    /// Field table of a struct definition
    pub fn fields_of(&self, def: SymbolId) -> Option<&ScopeTable> {
        match &self.arena[def] {
            Symbol::StructDef(def) => Some(&def.fields),
            _ => None,
        }
    }

    /// Number of symbols allocated
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether no symbol has been allocated
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Display adapter rendering a symbol as it appears in annotated output
    pub fn display<'sym>(&'sym self, id: SymbolId, interner: &'sym Interner) -> SymbolDisplay<'sym> {
        SymbolDisplay {
            symbol: &self.arena[id],
            interner,
        }
    }
}

impl Index<SymbolId> for Symbols {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        &self.arena[id]
    }
}

/// See [`Symbols::display`]
pub struct SymbolDisplay<'sym> {
    symbol: &'sym Symbol,
    interner: &'sym Interner,
}

impl fmt::Display for SymbolDisplay<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol {
            Symbol::Primitive(ty) => write!(formatter, "{ty}"),
            Symbol::Function(sig) => {
                for (idx, formal) in sig.formals.iter().enumerate() {
                    if idx > 0 {
                        formatter.write_str(",")?;
                    }
                    write!(formatter, "{formal}")?;
                }
                write!(formatter, "->{}", sig.ret)
            }
            Symbol::StructDef(_) => formatter.write_str("struct"),
            Symbol::StructInstance(instance) => {
                formatter.write_str(self.interner.resolve(&instance.type_name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_display() {
        let interner = Interner::new();
        let mut symbols = Symbols::new();

        let empty = symbols.alloc(Symbol::Function(FunctionSig::new(PrimitiveType::Int)));
        assert_eq!(symbols.display(empty, &interner).to_string(), "->int");

        let full = symbols.alloc(Symbol::Function(FunctionSig::new(PrimitiveType::Void)));
        symbols.push_formal(full, PrimitiveType::Int);
        symbols.push_formal(full, PrimitiveType::Bool);
        symbols.push_formal(full, PrimitiveType::Struct);
        assert_eq!(
            symbols.display(full, &interner).to_string(),
            "int,bool,struct->void"
        );
    }

    #[test]
    fn test_struct_display() {
        let interner = Interner::new();
        let mut symbols = Symbols::new();

        let def = symbols.alloc(Symbol::StructDef(StructDef {
            fields: ScopeTable::new(),
        }));
        let instance = symbols.alloc(Symbol::StructInstance(StructInstance {
            def,
            type_name: interner.intern("Point"),
        }));

        assert_eq!(symbols.display(def, &interner).to_string(), "struct");
        assert_eq!(symbols.display(instance, &interner).to_string(), "Point");
        assert_eq!(symbols.struct_def_of(instance), Some(def));
        assert_eq!(symbols.struct_def_of(def), None);
        assert!(symbols.fields_of(def).is_some());
        assert!(symbols.fields_of(instance).is_none());
    }

    #[test]
    fn test_push_formal_ignores_non_functions() {
        let interner = Interner::new();
        let mut symbols = Symbols::new();
        let int = symbols.alloc(Symbol::Primitive(PrimitiveType::Int));

        symbols.push_formal(int, PrimitiveType::Bool);
        assert_eq!(symbols.display(int, &interner).to_string(), "int");
    }

    #[test]
    fn test_primitive_from_type_ref() {
        assert_eq!(PrimitiveType::from(TypeRef::Int), PrimitiveType::Int);
        assert_eq!(PrimitiveType::from(TypeRef::Void), PrimitiveType::Void);
        assert_eq!(PrimitiveType::Bool.to_string(), "bool");
    }
}
