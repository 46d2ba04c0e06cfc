use crate::{
    error::EngineError,
    exec::{ExecContext, Executor},
    row::Row,
    schema::Schema,
    table::Table,
};

/// Sequential scan: emits a table's rows in insertion order, skipping
/// tombstoned rows. The leaf of every table-backed pipeline.
pub struct SeqScanExec<'a> {
    table: &'a Table,
    cursor: usize,
}

impl<'a> SeqScanExec<'a> {
    /// Creates a scan over the given table.
    pub fn new(table: &'a Table) -> Self {
        SeqScanExec { table, cursor: 0 }
    }
}

impl Executor for SeqScanExec<'_> {
    fn init(&mut self, _ctx: &mut ExecContext<'_>) -> Result<(), EngineError> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self, _ctx: &mut ExecContext<'_>) -> Result<Option<Row>, EngineError> {
        while let Some(row) = self.table.rows().get(self.cursor) {
            self.cursor += 1;
            if !row.is_deleted() {
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    fn schema(&self) -> &Schema {
        self.table.schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::*;
    use crate::vars::VariableStore;

    #[test]
    fn emits_live_rows_in_insertion_order() {
        let mut table = people();
        table.delete_row(1);

        let mut scan = SeqScanExec::new(&table);
        let mut vars = VariableStore::new();
        let rows = drain(&mut scan, &mut vars);
        assert_eq!(render(&rows), vec!["alice,30", "carol,40"]);

        // init restarts the stream
        let rows = drain(&mut scan, &mut vars);
        assert_eq!(rows.len(), 2);
    }
}
