//! Per-variable column view of a dataset.

use spn_core::errors::{LearnError, LearnResult};
use spn_core::{Scope, VarSet, Variable};

/// Every instance's value for one variable, with its declared arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarColumn {
    pub var: usize,
    pub categories: usize,
    pub values: Vec<usize>,
}

impl VarColumn {
    /// Occurrences of each category.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.categories];
        for &v in &self.values {
            if let Some(c) = counts.get_mut(v) {
                *c += 1;
            }
        }
        counts
    }

    /// Relative frequency of each category; uniform when the column is empty.
    pub fn frequencies(&self) -> Vec<f64> {
        if self.values.is_empty() {
            return vec![1.0 / self.categories as f64; self.categories];
        }
        let n = self.values.len() as f64;
        self.counts().into_iter().map(|c| c as f64 / n).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check that every instance assigns every scope variable an in-range category.
pub fn validate(scope: &Scope, data: &[VarSet]) -> LearnResult<()> {
    if scope.is_empty() {
        return Err(LearnError::EmptyScope);
    }
    if let Some(v) = scope.values().find(|v| v.categories == 0) {
        return Err(LearnError::ZeroArity { var: v.id });
    }
    for (instance, row) in data.iter().enumerate() {
        for variable in scope.values() {
            check_value(instance, row, variable)?;
        }
    }
    Ok(())
}

fn check_value(instance: usize, row: &VarSet, variable: &Variable) -> LearnResult<usize> {
    let value = row.get(variable.id).ok_or(LearnError::MissingValue {
        instance,
        var: variable.id,
    })?;
    if value >= variable.categories {
        return Err(LearnError::CategoryOutOfRange {
            instance,
            var: variable.id,
            value,
            categories: variable.categories,
        });
    }
    Ok(value)
}

/// One column per scope variable, in ascending variable order.
pub fn columns(scope: &Scope, data: &[VarSet]) -> LearnResult<Vec<VarColumn>> {
    scope
        .values()
        .map(|variable| {
            let values = data
                .iter()
                .enumerate()
                .map(|(instance, row)| check_value(instance, row, variable))
                .collect::<LearnResult<Vec<_>>>()?;
            Ok(VarColumn {
                var: variable.id,
                categories: variable.categories,
                values,
            })
        })
        .collect()
}
