//! Terse constructors for writing functions by hand.
//!
//! ```
//! use psflow::prelude::*;
//!
//! let function = Function::from_lines(
//!     "lights",
//!     [
//!         def("on").equal(false).into(),
//!         Step::flip("on").into(),
//!         ret("on").into(),
//!     ],
//! );
//! assert!(function.is_ok());
//! ```
use crate::{
    function::FunctionOutput,
    value::{Value, ValueKind},
    variable::VariableDecl,
};

/// A variable name waiting for its initial value or kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UntypedDecl {
    name: String,
}

impl UntypedDecl {
    /// Declare the variable with an initial value.
    pub fn equal(self, value: impl Into<Value>) -> VariableDecl {
        VariableDecl::new(self.name, value)
    }

    /// Declare the variable without a value.
    pub fn of_kind(self, kind: ValueKind) -> VariableDecl {
        VariableDecl::placeholder(self.name, kind)
    }
}

/// Start a variable declaration.
pub fn def(name: impl Into<String>) -> UntypedDecl {
    UntypedDecl { name: name.into() }
}

/// Designate the output variable of a function.
pub fn ret(name: impl Into<String>) -> FunctionOutput {
    FunctionOutput::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn def_builds_declarations() {
        assert_eq!(def("x").equal(true), VariableDecl::new("x", true));
        assert_eq!(
            def("y").of_kind(ValueKind::Bool),
            VariableDecl::placeholder("y", ValueKind::Bool)
        );
        assert_eq!(ret("x").name, "x");
    }
}
