//! Kind-scoped access to the registry, and the scope a step runs in.
//!
//! A function never hands its registry to a step directly. Before a step is
//! performed, the function opens a [`Scope`] and grants it every
//! [`ValueKind`] the step declared it needs. The step then asks the scope for
//! a [`VariableProvider`] of a kind; asking for a kind that was not granted
//! fails with [`Error::ProviderNotSupplied`].
use enum_map::EnumMap;

use crate::{
    conf::EngineConfig,
    utils::{Error, Result},
    value::{Value, ValueKind},
    variable::{Variable, VariableId, VariableMut, VariableRegistry},
};

/// Name lookups restricted to variables of one kind.
///
/// [`VariableProvider::readable`] and [`VariableProvider::writable`] resolve
/// to the same variable; the distinction only documents intent at the call
/// site. When data should flow from one variable to another on every change,
/// prefer following over repeated writes.
pub struct VariableProvider<'a> {
    registry: &'a mut VariableRegistry,
    kind: ValueKind,
    requester: String,
}

impl<'a> VariableProvider<'a> {
    /// Build a provider on behalf of `requester`, which is named in lookup
    /// errors.
    pub fn new(
        registry: &'a mut VariableRegistry,
        kind: ValueKind,
        requester: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            kind,
            requester: requester.into(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    fn lookup(&self, name: &str) -> Result<VariableId> {
        match self.registry.id_of(name) {
            Some(id) if self.registry.get(id).map(Variable::kind) == Some(self.kind) => Ok(id),
            _ => Err(Error::UnresolvedName {
                name: name.to_string(),
                context: format!("step `{}`", self.requester),
            }),
        }
    }

    pub fn readable(&self, name: &str) -> Result<&Variable> {
        let id = self.lookup(name)?;
        Ok(&self.registry[id])
    }

    pub fn writable(&mut self, name: &str) -> Result<VariableMut<'_>> {
        let id = self.lookup(name)?;
        Ok(self.registry.variable_mut(id))
    }

    /// Attach the requesting step to an error raised by a variable.
    fn in_step(&self, err: Error) -> Error {
        Error::StepFailed {
            step: self.requester.clone(),
            source: Box::new(err),
        }
    }

    pub fn read(&self, name: &str) -> Result<Value> {
        self.readable(name)?.get().map_err(|err| self.in_step(err))
    }

    pub fn read_bool(&self, name: &str) -> Result<bool> {
        bool::try_from(self.read(name)?).map_err(|err| self.in_step(err))
    }

    pub fn write(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let written = self.writable(name)?.set(value);
        written.map_err(|err| self.in_step(err))
    }
}

/// The providers granted to one step for one invocation.
pub struct Scope<'a> {
    registry: &'a mut VariableRegistry,
    config: &'a EngineConfig,
    granted: EnumMap<ValueKind, bool>,
    depth: usize,
}

impl<'a> Scope<'a> {
    /// Open a scope with no kinds granted.
    pub fn new(registry: &'a mut VariableRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            granted: EnumMap::default(),
            depth: 0,
        }
    }

    pub fn grant(&mut self, kind: ValueKind) {
        self.granted[kind] = true;
    }

    pub fn is_granted(&self, kind: ValueKind) -> bool {
        self.granted[kind]
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Number of conditional steps enclosing this scope.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Provider of `kind` for `step`.
    pub fn provider(
        &mut self,
        kind: ValueKind,
        step: impl std::fmt::Display,
    ) -> Result<VariableProvider<'_>> {
        if !self.granted[kind] {
            return Err(Error::ProviderNotSupplied {
                step: step.to_string(),
                kind,
            });
        }
        Ok(VariableProvider::new(
            &mut *self.registry,
            kind,
            step.to_string(),
        ))
    }

    /// Open the scope of a step nested one level below this one.
    ///
    /// The nested scope is granted each kind in `required` that this scope
    /// holds itself; kinds this scope lacks stay ungranted so that the nested
    /// step reports them missing.
    pub fn nested(&mut self, required: &[ValueKind]) -> Result<Scope<'_>> {
        let depth = self.depth + 1;
        if depth > self.config.max_nesting {
            return Err(Error::NestingTooDeep {
                max: self.config.max_nesting,
            });
        }

        let mut granted = EnumMap::default();
        for kind in required {
            granted[*kind] = self.granted[*kind];
        }
        Ok(Scope {
            registry: &mut *self.registry,
            config: self.config,
            granted,
            depth,
        })
    }
}
