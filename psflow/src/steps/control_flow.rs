//! Control flow steps.
//!
//! [`If`] evaluates a boolean variable and runs one of two ordered step
//! lists. The selected steps run in a nested [`Scope`] that receives the
//! same providers the `If` itself was granted, so nested conditionals are
//! wired the same way at every depth. [`Start`] is a marker with no effect.
use log::{trace, warn};

use crate::{
    conf::ConditionPolicy,
    steps::{FunctionStep, Step, VariableDefinition, require_name},
    utils::Result,
    value::ValueKind,
    variable::Scope,
};

/// Conditional branch step
///
/// Runs `then_steps` when `condition` holds and `else_steps` otherwise. The
/// unselected list is not run and is not wired for this invocation.
///
/// When the condition cannot be evaluated, [`ConditionPolicy`] decides: the
/// default reports the error, while [`ConditionPolicy::Skip`] runs neither
/// branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct If {
    pub condition: String,
    pub then_steps: Vec<Step>,
    pub else_steps: Vec<Step>,
}

impl If {
    pub fn new(
        condition: impl Into<String>,
        then_steps: impl IntoIterator<Item = Step>,
        else_steps: impl IntoIterator<Item = Step>,
    ) -> Self {
        Self {
            condition: condition.into(),
            then_steps: then_steps.into_iter().collect(),
            else_steps: else_steps.into_iter().collect(),
        }
    }

    /// A conditional with an empty else branch.
    pub fn when(condition: impl Into<String>, then_steps: impl IntoIterator<Item = Step>) -> Self {
        Self::new(condition, then_steps, Vec::<Step>::new())
    }

    /// Iterate over the steps of both branches, then branch first.
    pub fn branches(&self) -> impl Iterator<Item = &Step> {
        self.then_steps.iter().chain(self.else_steps.iter())
    }

    fn evaluate(&self, scope: &mut Scope<'_>) -> Result<bool> {
        let condition = require_name(self, "condition", &self.condition)?;
        scope.provider(ValueKind::Bool, self)?.read_bool(condition)
    }
}

impl FunctionStep for If {
    fn required_kinds(&self) -> &'static [ValueKind] {
        &[ValueKind::Bool]
    }

    fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
        let condition = match self.evaluate(scope) {
            Ok(condition) => condition,
            Err(err) if scope.config().missing_condition == ConditionPolicy::Skip => {
                warn!("Skipping both branches of `{}`: {}", self, err);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let selected = if condition {
            &self.then_steps
        } else {
            &self.else_steps
        };
        trace!(
            "`{}` is {}, running {} step(s)",
            self.condition,
            condition,
            selected.len()
        );

        for step in selected {
            let mut nested = scope.nested(step.required_kinds())?;
            trace!("Performing nested step `{}`", step);
            step.perform(&mut nested)?;
        }
        Ok(())
    }

    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::once(VariableDefinition::input(&self.condition, ValueKind::Bool))
    }

    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::empty()
    }

    fn validate(&self) -> Result<()> {
        require_name(self, "condition", &self.condition)?;
        for step in self.branches() {
            step.validate()?;
        }
        Ok(())
    }
}

impl std::fmt::Display for If {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {{", self.condition)?;
        for step in &self.then_steps {
            write!(f, " {};", step)?;
        }
        write!(f, " }} else {{")?;
        for step in &self.else_steps {
            write!(f, " {};", step)?;
        }
        write!(f, " }}")
    }
}

/// Marker for the first step of a flow. Does nothing when performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Start;

impl FunctionStep for Start {
    fn required_kinds(&self) -> &'static [ValueKind] {
        &[]
    }

    fn perform(&self, _scope: &mut Scope<'_>) -> Result<()> {
        Ok(())
    }

    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::empty()
    }

    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::empty()
    }
}

impl std::fmt::Display for Start {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "start")
    }
}
