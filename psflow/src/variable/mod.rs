//! Named variables, their registry, and the scoped views steps use.
//!
//! A [`Variable`] is a named cell holding a [`Value`] of one fixed
//! [`ValueKind`]. Variables are owned by a [`VariableRegistry`] and
//! referenced by [`VariableId`]; steps never hold variables directly, they
//! look them up by name through a [`VariableProvider`] obtained from the
//! [`Scope`] the owning function hands them.
//!
//! Variables can *follow* another variable. A follower is a passive mirror:
//! every write to its leader is pushed into the follower (and on to the
//! follower's own followers), and resetting a follower does nothing.
use smallvec::SmallVec;

use crate::{
    utils::{Error, Result},
    value::{Value, ValueKind},
};

pub mod provider;
pub mod registry;

pub use provider::{Scope, VariableProvider};
pub use registry::{VariableMut, VariableRegistry};

slotmap::new_key_type! {
    /// Stable handle to a variable inside a [`VariableRegistry`].
    pub struct VariableId;
}

/// A named, typed and mutable value cell.
///
/// Two variables are considered the same entity when their names match,
/// which is what [`PartialEq`] compares.
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
    pub(crate) value: Option<Value>,
    pub(crate) default: Option<Value>,
    pub(crate) leader: Option<VariableId>,
    pub(crate) followers: SmallVec<VariableId, 2>,
}

impl Variable {
    pub(crate) fn from_decl(decl: VariableDecl) -> Self {
        Self {
            name: decl.name,
            kind: decl.kind,
            value: decl.initial,
            default: decl.initial,
            leader: None,
            followers: SmallVec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Current value of the variable.
    ///
    /// Fails with [`Error::UninitializedValue`] for a placeholder that was
    /// never given a value.
    pub fn get(&self) -> Result<Value> {
        self.value.ok_or_else(|| Error::UninitializedValue {
            name: self.name.clone(),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }

    /// The value restored by a reset, if any.
    pub fn default_value(&self) -> Option<Value> {
        self.default
    }

    pub fn leader(&self) -> Option<VariableId> {
        self.leader
    }

    pub fn is_following(&self) -> bool {
        self.leader.is_some()
    }

    /// Variables that directly mirror this one.
    pub fn followers(&self) -> &[VariableId] {
        &self.followers
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

/// Declaration of a variable, as passed to a function.
///
/// A declaration either carries an initial value, which also becomes the
/// variable's default, or is a placeholder that must be written (or
/// followed) before it is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDecl {
    pub name: String,
    pub kind: ValueKind,
    pub initial: Option<Value>,
}

impl VariableDecl {
    /// Declare a variable with an initial value.
    pub fn new(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        let initial = initial.into();
        Self {
            name: name.into(),
            kind: initial.kind(),
            initial: Some(initial),
        }
    }

    /// Declare a variable that has no value yet.
    pub fn placeholder(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            initial: None,
        }
    }
}

impl std::fmt::Display for VariableDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {}: {}", self.name, self.kind)?;
        if let Some(initial) = self.initial {
            write!(f, " = {}", initial)?;
        }
        Ok(())
    }
}
