use cql_ast::Value;

/// A row: a fixed-width sequence of values plus a tombstone flag.
///
/// The value count always equals the column count of the schema the row
/// travels with; executors carry the schema, rows do not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    deleted: bool,
}

impl Row {
    /// Creates a live row from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Row {
            values,
            deleted: false,
        }
    }

    /// The row's values, in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value at a column ordinal.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// True once the row is tombstoned.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Tombstones the row. Returns false if it already was; a
    /// tombstoned row is immutable and invisible to scans.
    pub fn mark_deleted(&mut self) -> bool {
        if self.deleted {
            return false;
        }
        self.deleted = true;
        true
    }

    /// Replaces one value in place. Refused on tombstoned rows.
    pub fn update(&mut self, idx: usize, value: Value) -> bool {
        if self.deleted {
            return false;
        }
        self.values[idx] = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tombstone_makes_a_row_immutable() {
        let mut row = Row::new(vec![Value::Float(1.0)]);
        assert!(row.update(0, Value::Float(2.0)));
        assert!(row.mark_deleted());
        assert!(!row.mark_deleted());
        assert!(!row.update(0, Value::Float(3.0)));
        assert_eq!(row.get(0), Some(&Value::Float(2.0)));
    }
}
