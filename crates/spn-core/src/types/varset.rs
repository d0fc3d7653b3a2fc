//! Evidence (`VarSet`) and variable metadata.
//!
//! A `VarSet` is a partial or full instantiation: variable id → observed category.
//! It is ordered so that every traversal over evidence is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Variable metadata used to size leaf distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    /// Variable identifier.
    pub id: usize,
    /// Number of categories (arity).
    pub categories: usize,
}

impl Variable {
    pub fn new(id: usize, categories: usize) -> Self {
        Self { id, categories }
    }
}

/// A learning scope: variable id → metadata.
pub type Scope = BTreeMap<usize, Variable>;

/// Assignment of variables to observed categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarSet(BTreeMap<usize, usize>);

impl VarSet {
    /// Create an empty (fully unobserved) set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Observed category of `var`, if any.
    pub fn get(&self, var: usize) -> Option<usize> {
        self.0.get(&var).copied()
    }

    /// Observe `var = value`, returning the previous observation.
    pub fn insert(&mut self, var: usize, value: usize) -> Option<usize> {
        self.0.insert(var, value)
    }

    /// Forget the observation of `var`.
    pub fn remove(&mut self, var: usize) -> Option<usize> {
        self.0.remove(&var)
    }

    pub fn contains(&self, var: usize) -> bool {
        self.0.contains_key(&var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(var, value)` pairs in ascending variable order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Observed variable ids in ascending order.
    pub fn vars(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// Projection onto `vars`; variables not observed here are skipped.
    pub fn project<I>(&self, vars: I) -> VarSet
    where
        I: IntoIterator<Item = usize>,
    {
        vars.into_iter()
            .filter_map(|v| self.get(v).map(|val| (v, val)))
            .collect()
    }

    /// Copy with `var` removed (e.g. the features-only half of a labelled example).
    pub fn without(&self, var: usize) -> VarSet {
        let mut out = self.clone();
        out.remove(var);
        out
    }
}

impl FromIterator<(usize, usize)> for VarSet {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<usize, usize>> for VarSet {
    fn from(map: BTreeMap<usize, usize>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(usize, usize); N]> for VarSet {
    fn from(pairs: [(usize, usize); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_only_observed_requested_vars() {
        let vs = VarSet::from([(0, 1), (2, 0), (5, 3)]);
        let p = vs.project([2, 5, 7]);
        assert_eq!(p, VarSet::from([(2, 0), (5, 3)]));
    }

    #[test]
    fn without_drops_label() {
        let vs = VarSet::from([(0, 1), (1, 0)]);
        let features = vs.without(0);
        assert!(!features.contains(0));
        assert_eq!(features.get(1), Some(0));
        assert_eq!(vs.len(), 2);
    }

    #[test]
    fn iteration_is_ordered() {
        let vs = VarSet::from([(9, 0), (1, 1), (4, 2)]);
        let vars: Vec<usize> = vs.vars().collect();
        assert_eq!(vars, vec![1, 4, 9]);
    }
}
