//! Error types for name resolution

use crate::symbol::SymbolId;
use wb_intern::Name;

/// Misuse of the scope table
///
/// `DuplicateName` is an ordinary user error and is turned into a
/// diagnostic by the resolver. The other variants mean push/pop calls were
/// mis-sequenced; the resolver aborts when it sees them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// Pop with no frame left
    #[error("scope stack underflow: no frame to pop")]
    ScopeUnderflow,

    /// Name already bound in the innermost frame
    #[error("name is already declared in the innermost scope")]
    DuplicateName {
        /// The name being declared
        name: Name,
        /// The symbol it is already bound to
        existing: SymbolId,
    },

    /// Declaration into a table with no frames
    #[error("cannot declare into a scope table with no frames")]
    InvalidDeclaration,
}

/// User-facing resolution diagnostics
///
/// The `Display` strings are the exact messages reported to the
/// diagnostics sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ResolveErrorKind {
    /// Name declared twice in one scope
    #[error("Multiply declared identifier")]
    MultiplyDeclared,

    /// Name not visible from its use site
    #[error("Undeclared identifier")]
    Undeclared,

    /// Variable, field or formal declared `void`
    #[error("Non-function declared void")]
    VoidDeclaration,

    /// `struct T` where `T` is declared but is not a struct
    #[error("Invalid name of struct type")]
    InvalidStructType,

    /// `e.f` where `e` is not a struct value
    #[error("Dot-access of non-struct type")]
    DotAccessNonStruct,

    /// `e.f` where the struct has no field `f`
    #[error("Invalid struct field name")]
    InvalidFieldName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_catalogue() {
        let messages: Vec<String> = [
            ResolveErrorKind::MultiplyDeclared,
            ResolveErrorKind::Undeclared,
            ResolveErrorKind::VoidDeclaration,
            ResolveErrorKind::InvalidStructType,
            ResolveErrorKind::DotAccessNonStruct,
            ResolveErrorKind::InvalidFieldName,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            messages,
            [
                "Multiply declared identifier",
                "Undeclared identifier",
                "Non-function declared void",
                "Invalid name of struct type",
                "Dot-access of non-struct type",
                "Invalid struct field name",
            ]
        );
    }
}
