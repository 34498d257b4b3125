//! Storage for every variable of a function.
//!
//! The registry holds variables of all kinds in one slot map and indexes
//! them by name. Follow links are kept on both ends: a follower records its
//! leader and a leader records its direct followers, so a write can be
//! pushed down the follower tree and a follower can detach itself.
//!
//! Follow links never form a cycle; [`VariableRegistry::follow`] rejects a
//! link that would close one.
use std::collections::BTreeMap;

use log::trace;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::{
    utils::{Error, Result},
    value::Value,
    variable::{Variable, VariableDecl, VariableId},
};

/// Name-indexed storage for variables.
///
/// Methods taking a [`VariableId`] panic when handed an id that was not
/// issued by this registry. Variables are never removed, so every id issued
/// by a registry stays valid for its lifetime.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    slots: SlotMap<VariableId, Variable>,
    names: BTreeMap<String, VariableId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over all variables, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.names.values().map(|id| (*id, &self.slots[*id]))
    }

    /// Declare a variable, or update the declaration already registered
    /// under the same name.
    ///
    /// Re-declaring keeps the variable's identity, so follow links survive.
    /// A re-declaration carrying an initial value acts like
    /// [`VariableRegistry::set_default`].
    pub fn declare(&mut self, decl: VariableDecl) -> Result<VariableId> {
        if let Some(&id) = self.names.get(&decl.name) {
            let existing = &self.slots[id];
            if existing.kind != decl.kind {
                return Err(Error::KindMismatch {
                    name: decl.name,
                    expected: existing.kind,
                    found: decl.kind,
                });
            }
            if let Some(initial) = decl.initial {
                self.set_default(id, initial)?;
            }
            return Ok(id);
        }

        let name = decl.name.clone();
        let id = self.slots.insert(Variable::from_decl(decl));
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.names.get(name).copied()
    }

    /// Look a name up, failing with [`Error::UnresolvedName`] on behalf of
    /// `context` when it is not declared.
    pub fn resolve(&self, name: &str, context: &str) -> Result<VariableId> {
        self.id_of(name).ok_or_else(|| Error::UnresolvedName {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    pub fn get(&self, id: VariableId) -> Option<&Variable> {
        self.slots.get(id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Variable> {
        self.id_of(name).map(|id| &self.slots[id])
    }

    /// Current value of a variable.
    pub fn value(&self, id: VariableId) -> Result<Value> {
        self.slots[id].get()
    }

    /// Handle exposing the per-variable API for `id`.
    pub fn variable_mut(&mut self, id: VariableId) -> VariableMut<'_> {
        VariableMut { registry: self, id }
    }

    fn check_kind(&self, id: VariableId, value: Value) -> Result<()> {
        let variable = &self.slots[id];
        if variable.kind != value.kind() {
            return Err(Error::KindMismatch {
                name: variable.name.clone(),
                expected: variable.kind,
                found: value.kind(),
            });
        }
        Ok(())
    }

    /// Overwrite a variable and push the new value to all of its followers,
    /// transitively.
    pub fn set(&mut self, id: VariableId, value: Value) -> Result<()> {
        self.check_kind(id, value)?;
        self.assign(id, Some(value));
        Ok(())
    }

    /// Store `value` into `id` and every transitive follower of it. `None`
    /// clears them back to uninitialized.
    fn assign(&mut self, id: VariableId, value: Option<Value>) {
        let mut pending: SmallVec<VariableId, 8> = SmallVec::new();
        pending.push(id);
        while let Some(current) = pending.pop() {
            let variable = &mut self.slots[current];
            if current != id {
                match value {
                    Some(value) => {
                        trace!("Propagating {} into follower `{}`", value, variable.name)
                    }
                    None => trace!("Clearing follower `{}`", variable.name),
                }
            }
            variable.value = value;
            pending.extend(variable.followers.iter().copied());
        }
    }

    /// Returns true when `candidate` mirrors `root`, directly or through
    /// other followers.
    fn is_downstream(&self, candidate: VariableId, root: VariableId) -> bool {
        let mut stack: SmallVec<VariableId, 8> = SmallVec::new();
        stack.extend(self.slots[root].followers.iter().copied());
        while let Some(current) = stack.pop() {
            if current == candidate {
                return true;
            }
            stack.extend(self.slots[current].followers.iter().copied());
        }
        false
    }

    /// Make `follower` mirror `leader`.
    ///
    /// Registering the same link twice has no further effect. A variable
    /// follows at most one leader: following a new one detaches it from the
    /// previous leader. When the leader already holds a value, it is copied
    /// into the follower right away.
    pub fn follow(&mut self, follower: VariableId, leader: VariableId) -> Result<()> {
        let (follower_var, leader_var) = (&self.slots[follower], &self.slots[leader]);
        if follower_var.kind != leader_var.kind {
            return Err(Error::KindMismatch {
                name: follower_var.name.clone(),
                expected: follower_var.kind,
                found: leader_var.kind,
            });
        }
        if follower_var.leader == Some(leader) {
            return Ok(());
        }
        if follower == leader || self.is_downstream(leader, follower) {
            return Err(Error::FollowCycle {
                follower: follower_var.name.clone(),
                leader: leader_var.name.clone(),
            });
        }

        self.unfollow(follower);
        trace!(
            "`{}` now follows `{}`",
            self.slots[follower].name, self.slots[leader].name
        );
        self.slots[leader].followers.push(follower);
        self.slots[follower].leader = Some(leader);

        match self.slots[leader].value {
            Some(value) => self.set(follower, value),
            None => Ok(()),
        }
    }

    /// Detach `follower` from its leader. No-op when it follows nothing.
    ///
    /// The follower keeps the last value it mirrored.
    pub fn unfollow(&mut self, follower: VariableId) {
        if let Some(leader) = self.slots[follower].leader.take() {
            self.slots[leader].followers.retain(|id| *id != follower);
        }
    }

    /// Restore a variable to its default.
    ///
    /// Does nothing while the variable follows another one. A placeholder
    /// without a default goes back to being uninitialized, and so do its
    /// followers.
    pub fn reset(&mut self, id: VariableId) -> Result<()> {
        let variable = &self.slots[id];
        if variable.leader.is_some() {
            trace!("Skipping reset of follower `{}`", variable.name);
            return Ok(());
        }
        let default = variable.default;
        self.assign(id, default);
        Ok(())
    }

    /// Store a new default, then [reset](VariableRegistry::reset).
    pub fn set_default(&mut self, id: VariableId, value: Value) -> Result<()> {
        self.check_kind(id, value)?;
        self.slots[id].default = Some(value);
        self.reset(id)
    }

    /// Reset every variable. Followers are left untouched, but they pick up
    /// the defaults of the leaders being reset.
    pub fn reset_all(&mut self) -> Result<()> {
        let ids: Vec<VariableId> = self.names.values().copied().collect();
        for id in ids {
            self.reset(id)?;
        }
        Ok(())
    }
}

impl std::ops::Index<VariableId> for VariableRegistry {
    type Output = Variable;

    fn index(&self, id: VariableId) -> &Variable {
        &self.slots[id]
    }
}

/// Write handle over a single variable.
pub struct VariableMut<'a> {
    registry: &'a mut VariableRegistry,
    id: VariableId,
}

impl VariableMut<'_> {
    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn variable(&self) -> &Variable {
        &self.registry.slots[self.id]
    }

    pub fn name(&self) -> &str {
        self.variable().name()
    }

    pub fn get(&self) -> Result<Value> {
        self.variable().get()
    }

    pub fn set(&mut self, value: impl Into<Value>) -> Result<()> {
        self.registry.set(self.id, value.into())
    }

    pub fn follow(&mut self, leader: VariableId) -> Result<()> {
        self.registry.follow(self.id, leader)
    }

    pub fn unfollow(&mut self) {
        self.registry.unfollow(self.id)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.registry.reset(self.id)
    }

    pub fn set_default(&mut self, value: impl Into<Value>) -> Result<()> {
        self.registry.set_default(self.id, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn registry_with(names: &[(&str, bool)]) -> (VariableRegistry, Vec<VariableId>) {
        let mut registry = VariableRegistry::new();
        let ids = names
            .iter()
            .map(|(name, value)| {
                registry
                    .declare(VariableDecl::new(*name, *value))
                    .expect("declaration should succeed")
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn placeholder_read_is_uninitialized() {
        let mut registry = VariableRegistry::new();
        let id = registry
            .declare(VariableDecl::placeholder("pending", ValueKind::Bool))
            .unwrap();
        assert_eq!(
            registry.value(id),
            Err(Error::UninitializedValue {
                name: "pending".to_string()
            })
        );
    }

    #[test]
    fn redeclaring_keeps_identity() {
        let (mut registry, ids) = registry_with(&[("a", false)]);
        let again = registry.declare(VariableDecl::new("a", true)).unwrap();
        assert_eq!(again, ids[0]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.value(again), Ok(Value::Bool(true)));
    }

    #[test]
    fn follow_propagates_transitively() {
        let (mut registry, ids) = registry_with(&[("a", false), ("b", false), ("c", false)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        registry.follow(b, a).unwrap();
        registry.follow(c, b).unwrap();

        registry.set(a, Value::Bool(true)).unwrap();
        assert_eq!(registry.value(b), Ok(Value::Bool(true)));
        assert_eq!(registry.value(c), Ok(Value::Bool(true)));
    }

    #[test]
    fn follow_rejects_cycles() {
        let (mut registry, ids) = registry_with(&[("a", false), ("b", false), ("c", false)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        registry.follow(b, a).unwrap();
        registry.follow(c, b).unwrap();

        assert!(registry.follow(a, c).unwrap_err().is_follow_cycle());
        assert!(registry.follow(a, a).unwrap_err().is_follow_cycle());
    }

    #[test]
    fn follow_is_idempotent() {
        let (mut registry, ids) = registry_with(&[("a", false), ("b", false)]);
        registry.follow(ids[1], ids[0]).unwrap();
        registry.follow(ids[1], ids[0]).unwrap();
        assert_eq!(registry.get(ids[0]).unwrap().followers(), &[ids[1]]);
    }

    #[test]
    fn following_a_new_leader_detaches_from_the_old_one() {
        let (mut registry, ids) = registry_with(&[("a", false), ("b", true), ("c", false)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        registry.follow(c, a).unwrap();
        registry.follow(c, b).unwrap();

        assert!(registry.get(a).unwrap().followers().is_empty());
        assert_eq!(registry.value(c), Ok(Value::Bool(true)));

        registry.set(a, Value::Bool(false)).unwrap();
        assert_eq!(registry.value(c), Ok(Value::Bool(true)));
    }

    #[test]
    fn unfollow_restores_reset_eligibility() {
        let (mut registry, ids) = registry_with(&[("a", true), ("b", false)]);
        let (a, b) = (ids[0], ids[1]);
        registry.follow(b, a).unwrap();
        registry.reset(b).unwrap();
        assert_eq!(registry.value(b), Ok(Value::Bool(true)));

        registry.unfollow(b);
        registry.reset(b).unwrap();
        assert_eq!(registry.value(b), Ok(Value::Bool(false)));

        registry.set(a, Value::Bool(false)).unwrap();
        registry.set(b, Value::Bool(true)).unwrap();
        registry.set(a, Value::Bool(false)).unwrap();
        assert_eq!(registry.value(b), Ok(Value::Bool(true)));
    }

    #[test]
    fn reset_all_skips_followers() {
        let (mut registry, ids) = registry_with(&[("a", false), ("b", false), ("c", true)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        registry.follow(c, b).unwrap();
        registry.set(a, Value::Bool(true)).unwrap();
        registry.set(b, Value::Bool(true)).unwrap();

        registry.reset_all().unwrap();
        assert_eq!(registry.value(a), Ok(Value::Bool(false)));
        assert_eq!(registry.value(b), Ok(Value::Bool(false)));
        assert_eq!(registry.value(c), Ok(Value::Bool(false)));
    }

    #[test]
    fn resetting_a_placeholder_clears_its_followers() {
        let mut registry = VariableRegistry::new();
        let leader = registry
            .declare(VariableDecl::placeholder("leader", ValueKind::Bool))
            .unwrap();
        let (follower, downstream) = (
            registry
                .declare(VariableDecl::placeholder("follower", ValueKind::Bool))
                .unwrap(),
            registry
                .declare(VariableDecl::new("downstream", false))
                .unwrap(),
        );
        registry.follow(follower, leader).unwrap();
        registry.follow(downstream, follower).unwrap();
        registry.set(leader, Value::Bool(true)).unwrap();
        assert_eq!(registry.value(downstream), Ok(Value::Bool(true)));

        registry.reset(leader).unwrap();
        for id in [leader, follower, downstream] {
            assert!(
                registry.value(id).unwrap_err().is_uninitialized_value(),
                "`{}` should mirror the cleared leader",
                registry[id].name()
            );
        }
    }

    #[test]
    fn iteration_is_ordered_by_name() {
        let (registry, _) = registry_with(&[("zeta", false), ("alpha", true)]);
        let names: Vec<&str> = registry.iter().map(|(_, v)| v.name()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
