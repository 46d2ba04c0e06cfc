use std::collections::HashMap;

use crate::{error::CatalogError, table::Table};

/// A catalog entry: the table plus its write-back bookkeeping.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    /// The table.
    pub table: Table,
    /// Set on any insert/update/delete/create; cleared by a successful
    /// dump.
    pub dirty: bool,
}

/// The name → table map of one session. The catalog exclusively owns
/// its tables.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// True if a table of that name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Looks up a table.
    pub fn get(&self, name: &str) -> Result<&CatalogEntry, CatalogError> {
        self.tables
            .get(name)
            .ok_or_else(|| CatalogError::UnknownTable(name.to_string()))
    }

    /// Looks up a table for mutation.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut CatalogEntry, CatalogError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| CatalogError::UnknownTable(name.to_string()))
    }

    /// Registers (or replaces) a table.
    pub fn insert(&mut self, name: impl Into<String>, table: Table, dirty: bool) {
        self.tables.insert(name.into(), CatalogEntry { table, dirty });
    }

    /// Iterates over all entries, for the shutdown dump.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut CatalogEntry)> {
        self.tables.iter_mut()
    }
}
