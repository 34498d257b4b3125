//! Functions: an ordered list of steps over a set of declared variables.
//!
//! A [`Function`] is built from [`Line`]s, each of which declares a
//! variable, appends a step, designates the output variable, or embeds
//! another function:
//!
//! ```
//! use psflow::prelude::*;
//!
//! let mut function = Function::builder("beach")
//!     .variable("sharksInWater", false)
//!     .step(Step::flip("sharksInWater"))
//!     .output("sharksInWater")
//!     .build()
//!     .expect("function should build");
//!
//! assert_eq!(function.invoke_as::<bool>(), Ok(true));
//! ```
//!
//! Steps run in declaration order; there is no dependency-based
//! reordering. Variables exist before any step runs, so they may be declared
//! in any order relative to steps.
//!
//! An embedded function binds a variable named after it. Every invocation
//! of the outer function first invokes the embedded functions, in the order
//! they were added, and stores their results in those variables.
use log::{debug, trace, warn};
use strum::{EnumIs, EnumTryAs};
use uuid::Uuid;

use crate::{
    conf::{ConditionPolicy, EngineConfig},
    steps::{Direction, FunctionStep, Step},
    utils::{Error, Result},
    value::{Value, ValueKind},
    variable::{Scope, VariableDecl, VariableRegistry},
};

const OUTPUT_CONTEXT: &str = "output";

/// Designates the variable whose value a function returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionOutput {
    pub name: String,
}

impl FunctionOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One line of a function definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Line {
    Variable(VariableDecl),
    Step(Step),
    Output(FunctionOutput),
    Function(Box<Function>),
}

impl From<VariableDecl> for Line {
    fn from(decl: VariableDecl) -> Self {
        Line::Variable(decl)
    }
}

impl From<Step> for Line {
    fn from(step: Step) -> Self {
        Line::Step(step)
    }
}

impl From<FunctionOutput> for Line {
    fn from(output: FunctionOutput) -> Self {
        Line::Output(output)
    }
}

impl From<Function> for Line {
    fn from(function: Function) -> Self {
        Line::Function(Box::new(function))
    }
}

/// An ordered program of steps over a set of variables, with one designated
/// output variable.
///
/// Two functions are equal when they share the same [`Uuid`]; clones keep
/// the identity of the function they were cloned from.
#[derive(Debug, Clone)]
pub struct Function {
    uuid: Uuid,
    name: String,
    output: String,
    output_kind: ValueKind,
    steps: Vec<Step>,
    registry: VariableRegistry,
    subfunctions: Vec<Function>,
    config: EngineConfig,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for Function {}

impl std::hash::Hash for Function {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl Function {
    /// Start building a function.
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder::new(name)
    }

    /// Build a function returning a boolean from a list of lines.
    ///
    /// Fails with [`Error::MissingOutput`] when no line designates the output
    /// and with [`Error::EmptyOutputName`] when the output name is empty.
    /// When several output lines are given, the last one wins.
    pub fn from_lines(
        name: impl Into<String>,
        lines: impl IntoIterator<Item = Line>,
    ) -> Result<Self> {
        Self::builder(name).lines(lines).build()
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_name(&self) -> &str {
        &self.output
    }

    pub fn output_kind(&self) -> ValueKind {
        self.output_kind
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn variables_mut(&mut self) -> &mut VariableRegistry {
        &mut self.registry
    }

    /// Functions embedded as lines, in the order they are invoked.
    pub fn subfunctions(&self) -> &[Function] {
        &self.subfunctions
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extend the function with one more line.
    ///
    /// Variable declarations are merged by name (see
    /// [`VariableRegistry::declare`]), steps are appended after the existing
    /// ones and an output line replaces the current output. An embedded
    /// function declares a variable of its output kind under its own name,
    /// replacing any function previously embedded under that name.
    pub fn add_line(&mut self, line: impl Into<Line>) -> Result<()> {
        match line.into() {
            Line::Variable(decl) => {
                self.registry.declare(decl)?;
            }
            Line::Step(step) => self.steps.push(step),
            Line::Output(output) => {
                if output.name.is_empty() {
                    return Err(Error::EmptyOutputName);
                }
                self.output = output.name;
            }
            Line::Function(function) => self.embed(*function)?,
        }
        Ok(())
    }

    /// Add several lines at once. Either every line is added or, on error,
    /// the function is left as it was.
    pub fn add_lines(&mut self, lines: impl IntoIterator<Item = Line>) -> Result<()> {
        let mut staged = self.clone();
        for line in lines {
            staged.add_line(line)?;
        }
        *self = staged;
        Ok(())
    }

    fn embed(&mut self, function: Function) -> Result<()> {
        if function.name.is_empty() {
            return Err(Error::UnnamedFunction);
        }
        self.registry.declare(VariableDecl::placeholder(
            function.name.clone(),
            function.output_kind,
        ))?;

        match self
            .subfunctions
            .iter_mut()
            .find(|embedded| embedded.name == function.name)
        {
            Some(embedded) => *embedded = function,
            None => self.subfunctions.push(function),
        }
        Ok(())
    }

    /// Make the variable `follower` mirror the variable `leader`.
    ///
    /// This is how the editor realises a wire between two outlets.
    pub fn connect(&mut self, follower: &str, leader: &str) -> Result<()> {
        let context = format!("a connection from `{}` to `{}`", leader, follower);
        let follower = self.registry.resolve(follower, &context)?;
        let leader = self.registry.resolve(leader, &context)?;
        self.registry.follow(follower, leader)
    }

    /// Remove the wire feeding the variable `follower`, if any.
    pub fn disconnect(&mut self, follower: &str) -> Result<()> {
        let follower = self.registry.resolve(follower, "a disconnection")?;
        self.registry.unfollow(follower);
        Ok(())
    }

    /// Check the wiring of the function without running it.
    ///
    /// 1) Every step has all of its variable names.
    /// 2) Every name a step reads or writes is declared with the kind the
    ///    step expects, in both branches of every conditional.
    /// 3) The output name is declared.
    /// 4) Every embedded function verifies.
    ///
    /// Conditions of conditional steps are not checked when the engine is
    /// configured to skip unresolvable conditions.
    pub fn verify(&self) -> Result<()> {
        for function in &self.subfunctions {
            function.verify()?;
        }
        for step in &self.steps {
            step.validate()?;
            self.verify_ports(step)?;
        }
        self.registry.resolve(&self.output, OUTPUT_CONTEXT)?;
        Ok(())
    }

    fn verify_ports(&self, step: &Step) -> Result<()> {
        let skip_condition =
            step.is_if() && self.config.missing_condition == ConditionPolicy::Skip;

        for port in step.inputs().chain(step.outputs()) {
            if skip_condition && port.direction == Direction::Input {
                continue;
            }
            match self.registry.by_name(port.name) {
                Some(variable) if variable.kind() == port.kind => {}
                Some(variable) => {
                    return Err(Error::KindMismatch {
                        name: port.name.to_string(),
                        expected: variable.kind(),
                        found: port.kind,
                    });
                }
                None => {
                    return Err(Error::UnresolvedName {
                        name: port.name.to_string(),
                        context: format!("step `{}`", step),
                    });
                }
            }
        }

        if let Step::If(branch) = step {
            for nested in branch.branches() {
                self.verify_ports(nested)?;
            }
        }
        Ok(())
    }

    /// Run every step in order and return the value of the output variable.
    ///
    /// The wiring is verified first. If any step fails, every variable is
    /// restored to the state it had before the call, so a failed invocation
    /// has no visible effect.
    pub fn invoke(&mut self) -> Result<Value> {
        debug!(
            "Invoking function `{}` ({} step(s))",
            self.name,
            self.steps.len()
        );
        self.verify()?;

        let snapshot = (self.registry.clone(), self.subfunctions.clone());
        match self.run() {
            Ok(value) => {
                debug!("Function `{}` returned {}", self.name, value);
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "Invocation of `{}` failed, restoring variables: {}",
                    self.name, err
                );
                (self.registry, self.subfunctions) = snapshot;
                Err(err)
            }
        }
    }

    /// [`Function::invoke`], converting the result to a host type.
    pub fn invoke_as<T>(&mut self) -> Result<T>
    where
        T: TryFrom<Value, Error = Error>,
    {
        T::try_from(self.invoke()?)
    }

    fn run(&mut self) -> Result<Value> {
        for function in &mut self.subfunctions {
            trace!("Invoking embedded function `{}`", function.name);
            let value = function.invoke().map_err(|err| Error::StepFailed {
                step: format!("{}()", function.name),
                source: Box::new(err),
            })?;
            let id = self.registry.resolve(&function.name, "an embedded function")?;
            self.registry.set(id, value)?;
        }

        for step in &self.steps {
            let mut scope = Scope::new(&mut self.registry, &self.config);
            for kind in step.required_kinds() {
                scope.grant(*kind);
            }
            trace!("Performing `{}`", step);
            step.perform(&mut scope)?;
        }
        self.output_value()
    }

    fn output_value(&self) -> Result<Value> {
        let id = self.registry.resolve(&self.output, OUTPUT_CONTEXT)?;
        let variable = &self.registry[id];
        if variable.kind() != self.output_kind {
            return Err(Error::OutputKindMismatch {
                name: self.output.clone(),
                expected: self.output_kind,
                found: variable.kind(),
            });
        }
        variable.get()
    }

    /// Reset every variable to its default. Followers keep mirroring their
    /// leaders.
    pub fn reset_variables(&mut self) -> Result<()> {
        self.registry.reset_all()
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "function {} -> {}: {} {{",
            self.name, self.output, self.output_kind
        )?;
        for (_, variable) in self.registry.iter() {
            write!(f, "    let {}: {}", variable.name(), variable.kind())?;
            let embedded = self
                .subfunctions
                .iter()
                .any(|function| function.name == variable.name());
            if embedded {
                write!(f, " = {}()", variable.name())?;
            } else if let Some(default) = variable.default_value() {
                write!(f, " = {}", default)?;
            }
            if let Some(leader) = variable.leader().and_then(|id| self.registry.get(id)) {
                write!(f, " <- {}", leader.name())?;
            }
            writeln!(f, ";")?;
        }
        for step in &self.steps {
            writeln!(f, "    {};", step)?;
        }
        write!(f, "}}")
    }
}

/// Fluent construction of a [`Function`].
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    name: String,
    lines: Vec<Line>,
    output_kind: ValueKind,
    config: EngineConfig,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
            output_kind: ValueKind::Bool,
            config: EngineConfig::default(),
        }
    }

    pub fn line(mut self, line: impl Into<Line>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = Line>) -> Self {
        self.lines.extend(lines);
        self
    }

    /// Declare a variable with an initial value.
    pub fn variable(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.line(VariableDecl::new(name, value))
    }

    /// Declare a variable without a value.
    pub fn placeholder(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.line(VariableDecl::placeholder(name, kind))
    }

    pub fn declare(self, decl: VariableDecl) -> Self {
        self.line(decl)
    }

    pub fn step(self, step: impl Into<Step>) -> Self {
        self.line(Line::Step(step.into()))
    }

    pub fn steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.lines(steps.into_iter().map(Line::Step))
    }

    pub fn output(self, name: impl Into<String>) -> Self {
        self.line(FunctionOutput::new(name))
    }

    /// Embed another function; its result is bound to a variable named
    /// after it.
    pub fn function(self, function: Function) -> Self {
        self.line(function)
    }

    /// Kind of value the function returns. Defaults to `bool`.
    pub fn output_kind(mut self, kind: ValueKind) -> Self {
        self.output_kind = kind;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Function> {
        let output = self
            .lines
            .iter()
            .rev()
            .find_map(|line| match line {
                Line::Output(output) => Some(output.name.clone()),
                _ => None,
            })
            .ok_or(Error::MissingOutput)?;
        if output.is_empty() {
            return Err(Error::EmptyOutputName);
        }

        let mut function = Function {
            uuid: Uuid::new_v4(),
            name: self.name,
            output,
            output_kind: self.output_kind,
            steps: Vec::new(),
            registry: VariableRegistry::new(),
            subfunctions: Vec::new(),
            config: self.config,
        };
        function.add_lines(self.lines.into_iter().filter(|line| !line.is_output()))?;
        Ok(function)
    }
}
