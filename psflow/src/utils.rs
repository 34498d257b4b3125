use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// A step was performed without the provider of a kind it requires.
    #[error(
        "Step `{step}` was performed without a `{kind}` variable provider. The step must be granted every kind it requires before it runs."
    )]
    ProviderNotSupplied { step: String, kind: ValueKind },

    /// A step was configured without one of the variable names it needs.
    #[error("Step `{step}` was built without a name for its `{role}` variable.")]
    VariableNameNotProvided { step: String, role: &'static str },

    /// A variable was read before it was ever given a value or a default.
    #[error("Variable `{name}` was read before it was given a value.")]
    UninitializedValue { name: String },

    /// Reading or writing a variable failed while a step was performed.
    #[error("Step `{step}` failed: {source}")]
    StepFailed { step: String, source: Box<Error> },

    /// A lookup found no variable registered under the requested name.
    #[error("No variable named `{name}` is declared (needed by {context}).")]
    UnresolvedName { name: String, context: String },

    /// A variable was used with a value of another kind.
    #[error("Variable `{name}` holds `{expected}` values, but a `{found}` was used with it.")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A value could not be converted to the requested host type.
    #[error("Expected a `{expected}` value, found a `{found}` value.")]
    ValueConversion {
        expected: ValueKind,
        found: ValueKind,
    },

    /// The output variable does not hold the kind the function returns.
    #[error(
        "The function returns `{expected}`, but its output variable `{name}` holds `{found}` values."
    )]
    OutputKindMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// No output designator was supplied when building a function.
    #[error("A function needs an output line naming the variable it returns. None was supplied.")]
    MissingOutput,

    /// A function used as a line of another function has no name to bind.
    #[error("A function used inside another function needs a name to bind its result to.")]
    UnnamedFunction,

    /// The output designator names the empty string.
    #[error("The output line of a function must name a variable, but the name is empty.")]
    EmptyOutputName,

    /// Registering the follow link would make a variable (transitively) follow itself.
    #[error(
        "Variable `{follower}` cannot follow `{leader}`: `{leader}` already follows `{follower}`, directly or transitively."
    )]
    FollowCycle { follower: String, leader: String },

    /// Conditional steps are nested deeper than the configured limit.
    #[error("Conditional steps are nested deeper than the configured maximum of {max}.")]
    NestingTooDeep { max: usize },
}

impl Error {
    /// The underlying error, looking through the step that reported it.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
