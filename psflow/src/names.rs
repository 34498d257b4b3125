//! Fresh variable names for editors.
use std::collections::BTreeSet;

use log::trace;

use crate::conf::EngineConfig;

/// Hands out variable names that are not taken yet.
///
/// Names have the form `"<prefix> <n>"` where `n` is the smallest positive
/// integer whose name is free. Every name handed out is remembered, as is
/// every name registered through [`VariableNameGenerator::register_existing`].
#[derive(Debug, Clone)]
pub struct VariableNameGenerator {
    prefix: String,
    taken: BTreeSet<String>,
}

impl Default for VariableNameGenerator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl VariableNameGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            taken: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_prefix(config.name_prefix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Mark `name` as taken, e.g. for variables loaded from a saved flow.
    pub fn register_existing(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Return a name that was neither handed out nor registered before, and
    /// record it.
    pub fn unique_name(&mut self) -> String {
        let mut n: usize = 1;
        let name = loop {
            let candidate = format!("{} {}", self.prefix, n);
            if !self.taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        trace!("Generated variable name `{}`", name);
        self.taken.insert(name.clone());
        name
    }
}
