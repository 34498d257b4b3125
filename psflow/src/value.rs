//! Values held by variables.
//!
//! The engine works over a closed set of value kinds. Only booleans exist
//! today; every other part of the crate is written against [`Value`] and
//! [`ValueKind`] so that adding a kind means adding a variant here and an
//! operator step that consumes it.
use enum_map::Enum;
use strum::{EnumDiscriminants, EnumIs, EnumIter, EnumTryAs};

use crate::utils::Error;

/// A runtime value stored in a [`crate::variable::Variable`].
///
/// The generated [`ValueKind`] discriminant (via `strum`) is the type tag
/// used to scope variable providers and to check step wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Hash, PartialOrd, Ord, Enum, EnumIter))]
pub enum Value {
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.try_as_bool().ok_or(Error::ValueConversion {
            expected: ValueKind::Bool,
            found: value.kind(),
        })
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
        }
    }
}
