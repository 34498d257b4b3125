//! Function steps
//!
//! A step is the unit of computation of a [`crate::function::Function`]: it
//! reads and writes variables referenced by name. Submodules group the step
//! families:
//!
//! - `assign`: writing a literal or copying one variable into another
//! - `boolean`: boolean operators (`&&`, `||`, `!`)
//! - `control_flow`: conditional branching and the flow start marker
//!
//! Steps are usually handled through the [`Step`] enum, a tagged union of all
//! concrete step forms.
use auto_enums::auto_enum;
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::{
    utils::{Error, Result},
    value::{Value, ValueKind},
    variable::Scope,
};

pub mod assign;
pub mod boolean;
pub mod control_flow;

pub use assign::{CopyValue, SetConstant};
pub use boolean::{BoolAnd, BoolFlip, BoolOr};
pub use control_flow::{If, Start};

/// Whether a step reads or writes a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

/// A variable port of a step: the name it refers to, the kind it expects and
/// whether it is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableDefinition<'a> {
    pub name: &'a str,
    pub kind: ValueKind,
    pub direction: Direction,
}

impl<'a> VariableDefinition<'a> {
    pub fn input(name: &'a str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            direction: Direction::Input,
        }
    }

    pub fn output(name: &'a str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            direction: Direction::Output,
        }
    }
}

/// Common interface implemented by every step.
///
/// The [`std::fmt::Display`] rendering of a step doubles as its description
/// in errors and logs.
pub trait FunctionStep: std::fmt::Display {
    /// Kinds of variable providers this step needs granted before it runs.
    fn required_kinds(&self) -> &'static [ValueKind];

    /// Run the step against the variables reachable through `scope`.
    fn perform(&self, scope: &mut Scope<'_>) -> Result<()>;

    /// Variables read by this step.
    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>>;

    /// Variables written by this step.
    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>>;

    /// Check that every variable name this step needs was provided.
    fn validate(&self) -> Result<()> {
        for port in self.inputs().chain(self.outputs()) {
            require_name(self, port_role(port.direction), port.name)?;
        }
        Ok(())
    }
}

fn port_role(direction: Direction) -> &'static str {
    match direction {
        Direction::Input => "input",
        Direction::Output => "output",
    }
}

/// Fail with [`Error::VariableNameNotProvided`] when `name` is empty.
pub(crate) fn require_name<'n>(
    step: &(impl std::fmt::Display + ?Sized),
    role: &'static str,
    name: &'n str,
) -> Result<&'n str> {
    if name.is_empty() {
        return Err(Error::VariableNameNotProvided {
            step: step.to_string(),
            role,
        });
    }
    Ok(name)
}

/// The provider list of a step acting on values of `kind`.
pub(crate) fn kinds_of(kind: ValueKind) -> &'static [ValueKind] {
    match kind {
        ValueKind::Bool => &[ValueKind::Bool],
    }
}

/// Discriminated union covering all step kinds.
///
/// The generated `StepKind` discriminant (via `strum`) is handy to classify
/// steps without matching on their payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(StepKind))]
pub enum Step {
    Start(Start),
    SetConstant(SetConstant),
    CopyValue(CopyValue),
    BoolAnd(BoolAnd),
    BoolOr(BoolOr),
    BoolFlip(BoolFlip),
    If(If),
}

impl Step {
    /// `target = value`
    pub fn set(target: impl Into<String>, value: impl Into<Value>) -> Self {
        SetConstant::new(target, value).into()
    }

    /// `target = source`, for boolean variables.
    pub fn copy(target: impl Into<String>, source: impl Into<String>) -> Self {
        CopyValue::new(target, Some(source.into()), ValueKind::Bool).into()
    }

    /// `target = left && right`
    pub fn and(
        target: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        BoolAnd::new(target, left, right).into()
    }

    /// `target = left || right`
    pub fn or(
        target: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        BoolOr::new(target, left, right).into()
    }

    /// `name = !name`
    pub fn flip(name: impl Into<String>) -> Self {
        let name = name.into();
        BoolFlip::new(name.clone(), name).into()
    }

    /// `destination = !source`
    pub fn negate(source: impl Into<String>, destination: impl Into<String>) -> Self {
        BoolFlip::new(source, destination).into()
    }

    /// `if condition { then_steps } else { else_steps }`
    pub fn branch(
        condition: impl Into<String>,
        then_steps: impl IntoIterator<Item = Step>,
        else_steps: impl IntoIterator<Item = Step>,
    ) -> Self {
        If::new(condition, then_steps, else_steps).into()
    }

    /// `if condition { then_steps }`
    pub fn when(condition: impl Into<String>, then_steps: impl IntoIterator<Item = Step>) -> Self {
        If::when(condition, then_steps).into()
    }
}

macro_rules! define_step_dispatch {
    (
        $($variant:ident),*
    ) => {
        impl FunctionStep for Step {
            fn required_kinds(&self) -> &'static [ValueKind] {
                match self {
                    $(
                        Step::$variant(step) => step.required_kinds(),
                    )*
                }
            }

            fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
                match self {
                    $(
                        Step::$variant(step) => step.perform(scope),
                    )*
                }
            }

            #[auto_enum(Iterator)]
            fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
                match self {
                    $(
                        Step::$variant(step) => step.inputs(),
                    )*
                }
            }

            #[auto_enum(Iterator)]
            fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
                match self {
                    $(
                        Step::$variant(step) => step.outputs(),
                    )*
                }
            }

            fn validate(&self) -> Result<()> {
                match self {
                    $(
                        Step::$variant(step) => step.validate(),
                    )*
                }
            }
        }

        impl std::fmt::Display for Step {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Step::$variant(step) => std::fmt::Display::fmt(step, f),
                    )*
                }
            }
        }

        $(
            impl From<$variant> for Step {
                fn from(step: $variant) -> Self {
                    Step::$variant(step)
                }
            }
        )*
    };
}

define_step_dispatch! {
    Start,
    SetConstant,
    CopyValue,
    BoolAnd,
    BoolOr,
    BoolFlip,
    If
}
