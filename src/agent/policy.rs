//! Storage step for received operations.
//!
//! A simulation usually needs more than "set the flag": moving left must stop
//! moving right, and two backend operations may mean the same thing in this
//! particular game. Those rules live in an [`OperationPolicy`].

use std::collections::HashMap;

use crate::agent::state::OperationTable;
use crate::types::operation::Operation;

/// Decides how an operation updates the activation table.
///
/// Called under the table lock, so multi-entry updates are atomic with
/// respect to simulation reads.
pub trait OperationPolicy: Send + Sync {
    fn store(&self, table: &mut OperationTable, operation: &Operation) {
        table.set(operation.name(), true);
    }
}

/// Sets the operation active and touches nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl OperationPolicy for DefaultPolicy {}

/// Mutually exclusive groups plus simulation-level name folding.
#[derive(Debug, Clone, Default)]
pub struct ExclusivePolicy {
    groups: Vec<Vec<String>>,
    folds: HashMap<String, String>,
}

impl ExclusivePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activating any member deactivates the others.
    pub fn with_group<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(members.into_iter().map(Into::into).collect());
        self
    }

    /// Treat `from` as `to` before storing.
    pub fn with_fold(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.folds.insert(from.into(), to.into());
        self
    }

    /// Name after folding.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.folds.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl OperationPolicy for ExclusivePolicy {
    fn store(&self, table: &mut OperationTable, operation: &Operation) {
        let name = self.resolve(operation.name());
        for group in self.groups.iter().filter(|g| g.iter().any(|m| m == name)) {
            for member in group.iter().filter(|m| *m != name) {
                table.set(member, false);
            }
        }
        table.set(name, true);
    }
}
