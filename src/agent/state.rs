//! Operation activation flags shared between the reader loop and the
//! simulation thread.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::operation::Operation;

/// Plain table of operation name -> active flag.
///
/// Entries are created on first write and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationTable {
    flags: HashMap<String, bool>,
}

impl OperationTable {
    /// `false` for names never seen.
    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: &str, active: bool) {
        match self.flags.get_mut(name) {
            Some(flag) => *flag = active,
            None => {
                self.flags.insert(name.to_string(), active);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Thread-safe handle on an [`OperationTable`].
///
/// Supports level-triggered reads ([`is_active`](Self::is_active)),
/// edge-triggered consumption ([`take`](Self::take)) and multi-entry
/// updates under a single lock ([`transact`](Self::transact)).
#[derive(Debug, Clone, Default)]
pub struct OperationState {
    table: Arc<Mutex<OperationTable>>,
}

impl OperationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, operation: impl AsRef<str>) -> bool {
        self.table.lock().get(operation.as_ref())
    }

    pub fn set(&self, operation: impl AsRef<str>, active: bool) {
        self.table.lock().set(operation.as_ref(), active);
    }

    /// Read the flag and reset it to `false` in one step.
    pub fn take(&self, operation: impl AsRef<str>) -> bool {
        let mut table = self.table.lock();
        let name = operation.as_ref();
        if !table.contains(name) {
            return false;
        }
        let was = table.get(name);
        table.set(name, false);
        was
    }

    pub fn contains(&self, operation: impl AsRef<str>) -> bool {
        self.table.lock().contains(operation.as_ref())
    }

    /// Run `f` with exclusive access to the table.
    pub fn transact<R>(&self, f: impl FnOnce(&mut OperationTable) -> R) -> R {
        let mut table = self.table.lock();
        f(&mut table)
    }

    /// Copy of the whole table.
    pub fn snapshot(&self) -> OperationTable {
        self.table.lock().clone()
    }

    /// Operations currently flagged active, sorted by name.
    pub fn active(&self) -> Vec<Operation> {
        let mut active: Vec<Operation> = self
            .table
            .lock()
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| Operation::new(name))
            .collect();
        active.sort();
        active
    }

    /// Every name ever stored, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.lock().iter().map(|(n, _)| n.to_string()).collect();
        names.sort();
        names
    }
}
