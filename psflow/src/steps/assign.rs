use crate::{
    steps::{FunctionStep, VariableDefinition, kinds_of, require_name},
    utils::{Error, Result},
    value::{Value, ValueKind},
    variable::Scope,
};

/// Constant assignment step
///
/// Writes a literal into `target`. Reads nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetConstant {
    pub target: String,
    pub value: Value,
}

impl SetConstant {
    pub fn new(target: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
        }
    }
}

impl FunctionStep for SetConstant {
    fn required_kinds(&self) -> &'static [ValueKind] {
        kinds_of(self.value.kind())
    }

    fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
        let target = require_name(self, "target", &self.target)?;
        let mut provider = scope.provider(self.value.kind(), self)?;
        provider.write(target, self.value)
    }

    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::empty()
    }

    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::once(VariableDefinition::output(&self.target, self.value.kind()))
    }
}

impl std::fmt::Display for SetConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

/// Copy step
///
/// Reads the current value of `source` and writes it into `target`. The
/// source name is optional at construction because editors create the step
/// before the user wires its input; performing it unwired fails with
/// [`Error::VariableNameNotProvided`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CopyValue {
    pub target: String,
    pub source: Option<String>,
    pub kind: ValueKind,
}

impl CopyValue {
    pub fn new(target: impl Into<String>, source: Option<String>, kind: ValueKind) -> Self {
        Self {
            target: target.into(),
            source,
            kind,
        }
    }

    fn source_name(&self) -> Result<&str> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| Error::VariableNameNotProvided {
                step: self.to_string(),
                role: "source",
            })?;
        require_name(self, "source", source)
    }
}

impl FunctionStep for CopyValue {
    fn required_kinds(&self) -> &'static [ValueKind] {
        kinds_of(self.kind)
    }

    fn perform(&self, scope: &mut Scope<'_>) -> Result<()> {
        let source = self.source_name()?;
        let target = require_name(self, "target", &self.target)?;
        let mut provider = scope.provider(self.kind, self)?;
        let value = provider.read(source)?;
        provider.write(target, value)
    }

    fn inputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        self.source
            .as_deref()
            .into_iter()
            .map(|source| VariableDefinition::input(source, self.kind))
    }

    fn outputs(&self) -> impl Iterator<Item = VariableDefinition<'_>> {
        std::iter::once(VariableDefinition::output(&self.target, self.kind))
    }

    fn validate(&self) -> Result<()> {
        self.source_name()?;
        require_name(self, "target", &self.target)?;
        Ok(())
    }
}

impl std::fmt::Display for CopyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} = {}", self.target, source),
            None => write!(f, "{} = <unset>", self.target),
        }
    }
}
