/*!
A valuation of variables, as returned from a satisfiable solve.

An [Assignment] is a snapshot of the trail at the moment a satisfying valuation was found.
Variables never constrained by the formula may be absent, in which case any value may be chosen
for them without affecting satisfaction.
*/

use crate::structures::literal::{Literal, Variable};

/// A map from variables to truth values.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    /// Values, indexed by variable. Index zero is unused.
    values: Vec<Option<bool>>,
}

impl Assignment {
    pub(crate) fn from_values(values: Vec<Option<bool>>) -> Self {
        Assignment { values }
    }

    /// The value of `variable`, if one was assigned.
    pub fn value_of(&self, variable: Variable) -> Option<bool> {
        self.values.get(variable as usize).copied().flatten()
    }

    /// True only if `literal` is satisfied on the assignment.
    pub fn satisfies(&self, literal: Literal) -> bool {
        self.value_of(literal.variable()) == Some(literal.polarity())
    }

    /// An iterator over the assigned variables and their values.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(variable, value)| value.map(|v| (variable as Variable, v)))
    }

    /// A count of assigned variables.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// True only if no variable is assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
