//! Boolean operator steps.
//!
//! Binary operators read two named variables and write a third; the unary
//! flip reads one and writes one. Any of the names may coincide, in which
//! case the operator works in place.
use crate::{
    steps::{FunctionStep, VariableDefinition, require_name},
    utils::Result,
    value::ValueKind,
    variable::Scope,
};

const BOOL_ONLY: &[ValueKind] = &[ValueKind::Bool];

macro_rules! define_bool_infix {
    ($name:ident, $symbol:literal, $op:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub target: String,
            pub left: String,
            pub right: String,
        }

        impl $name {
            pub fn new(
                target: impl Into<String>,
                left: impl Into<String>,
                right: impl Into<String>,
            ) -> Self {
                Self {
                    target: target.into(),
                    left: left.into(),
                    right: right.into(),
                }
            }
        }

        impl FunctionStep for $name {
            fn required_kinds(&self) -> &'static [ValueKind] {
                BOOL_ONLY
            }

            fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
                let left = require_name(self, "left", &self.left)?;
                let right = require_name(self, "right", &self.right)?;
                let target = require_name(self, "target", &self.target)?;

                let mut provider = scope.provider(ValueKind::Bool, self)?;
                let lhs = provider.read_bool(left)?;
                let rhs = provider.read_bool(right)?;
                let op: fn(bool, bool) -> bool = $op;
                provider.write(target, op(lhs, rhs))
            }

            fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
                [
                    VariableDefinition::input(&self.left, ValueKind::Bool),
                    VariableDefinition::input(&self.right, ValueKind::Bool),
                ]
                .into_iter()
            }

            fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
                std::iter::once(VariableDefinition::output(&self.target, ValueKind::Bool))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!("{} = {} ", $symbol, " {}"),
                    self.target, self.left, self.right
                )
            }
        }
    };
}

define_bool_infix!(
    BoolAnd,
    "&&",
    |lhs, rhs| lhs && rhs,
    "Writes `left && right` into `target`."
);

define_bool_infix!(
    BoolOr,
    "||",
    |lhs, rhs| lhs || rhs,
    "Writes `left || right` into `target`."
);

/// Writes `!source` into `destination`.
///
/// `source` and `destination` may name the same variable, which negates it
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoolFlip {
    pub source: String,
    pub destination: String,
}

impl BoolFlip {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl FunctionStep for BoolFlip {
    fn required_kinds(&self) -> &'static [ValueKind] {
        BOOL_ONLY
    }

    fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
        let source = require_name(self, "source", &self.source)?;
        let destination = require_name(self, "destination", &self.destination)?;

        let mut provider = scope.provider(ValueKind::Bool, self)?;
        let value = provider.read_bool(source)?;
        provider.write(destination, !value)
    }

    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::once(VariableDefinition::input(&self.source, ValueKind::Bool))
    }

    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::once(VariableDefinition::output(
            &self.destination,
            ValueKind::Bool,
        ))
    }
}

impl std::fmt::Display for BoolFlip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = !{}", self.destination, self.source)
    }
}
