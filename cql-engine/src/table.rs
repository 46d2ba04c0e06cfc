use cql_ast::Value;

use crate::{row::Row, schema::Schema};

/// An in-memory table: a schema and its rows, in insertion order.
///
/// Deletes only tombstone; the space is reclaimed when the process
/// exits. Updates mutate in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table under the given schema.
    pub fn new(schema: Schema) -> Self {
        Table {
            schema,
            rows: Vec::new(),
        }
    }

    /// The table's schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All rows, tombstoned ones included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows, tombstoned ones included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row.
    pub fn insert(&mut self, values: Vec<Value>) {
        self.rows.push(Row::new(values));
    }

    /// Tombstones a row; returns false if it already was.
    pub fn delete_row(&mut self, idx: usize) -> bool {
        self.rows[idx].mark_deleted()
    }

    /// Updates one value of one row; returns false on tombstoned rows.
    pub fn update_row(&mut self, idx: usize, col: usize, value: Value) -> bool {
        self.rows[idx].update(col, value)
    }
}

#[cfg(test)]
mod tests {
    use cql_ast::DataType;

    use super::*;

    #[test]
    fn insertion_order_is_kept() {
        let mut schema = Schema::new();
        schema.push(DataType::Float, "a");
        let mut table = Table::new(schema);
        table.insert(vec![Value::Float(1.0)]);
        table.insert(vec![Value::Float(2.0)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get(0), Some(&Value::Float(1.0)));

        assert!(table.delete_row(0));
        assert!(!table.delete_row(0));
        // the tombstoned row is still in memory
        assert_eq!(table.len(), 2);
    }
}
