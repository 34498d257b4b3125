//! Psflow: the execution engine behind a visual boolean node editor.
//!
//! A program is a [`function::Function`]: a set of named, typed variables, an
//! ordered list of steps that read and write them, and one output variable
//! whose value the function returns. Steps are assignments, boolean
//! operators and conditionals; variables can be wired together so that one
//! mirrors another ("follows" it).
//!
//! Example
//! ```
//! use psflow::prelude::*;
//!
//! let mut function = Function::builder("beach")
//!     .variable("wavesAreHigh", false)
//!     .variable("sharksInWater", true)
//!     .variable("beachIsOpen", false)
//!     .placeholder("goingToTheBeach", ValueKind::Bool)
//!     .step(Step::and("beachIsOpen", "sharksInWater", "wavesAreHigh"))
//!     .step(Step::branch(
//!         "beachIsOpen",
//!         [Step::set("goingToTheBeach", true)],
//!         [Step::set("goingToTheBeach", false)],
//!     ))
//!     .output("goingToTheBeach")
//!     .build()
//!     .expect("function should build");
//!
//! assert_eq!(function.invoke_as::<bool>(), Ok(false));
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.

/// Engine configuration and its TOML loader.
pub mod conf;
/// Functions, their lines and their builder.
pub mod function;
/// Unique variable names for editors.
pub mod names;
/// Terse constructors (`def`, `ret`).
pub mod shortcuts;
/// Steps and the step interface.
pub mod steps;
/// Error type shared by the whole crate.
pub mod utils;
/// Runtime values and their kinds.
pub mod value;
/// Variables, the registry and kind-scoped providers.
pub mod variable;

pub mod prelude {
    //! Convenient re-exports for end users.
    pub use crate::conf::{ConditionPolicy, EngineConfig};
    pub use crate::function::{Function, FunctionBuilder, FunctionOutput, Line};
    pub use crate::names::VariableNameGenerator;
    pub use crate::shortcuts::{def, ret};
    pub use crate::steps::{FunctionStep, Step, StepKind};
    pub use crate::utils::{Error, Result};
    pub use crate::value::{Value, ValueKind};
    pub use crate::variable::{VariableDecl, VariableId, VariableRegistry};
}
