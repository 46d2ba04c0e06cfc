//! CSV persistence.
//!
//! A table `T` lives in `T.csv`: the first record is the header
//! (`name:type` cells), the rest are rows. Fields carry no quoting and
//! no escaping; a field cannot contain a comma. Tombstoned rows are
//! omitted on dump.

use std::path::Path;

use cql_ast::Value;

use crate::{
    error::{CatalogError, EngineError},
    schema::Schema,
    table::Table,
};

/// Reads `<name>.csv` into a table.
pub fn load_table(name: &str, path: &Path) -> Result<Table, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(CatalogError::BadHeader {
                table: name.to_string(),
                detail: "the file is empty".to_string(),
            }
            .into());
        }
    };

    let mut schema = Schema::new();
    for cell in header.iter() {
        schema.push_header_cell(name, cell)?;
    }

    let mut table = Table::new(schema);
    for record in records {
        let record = record?;
        let values: Vec<Value> = table
            .schema()
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| match record.get(idx) {
                Some(field) => Value::parse(column.data_type, field),
                None => Value::Invalid,
            })
            .collect();
        table.insert(values);
    }

    tracing::debug!(table = name, rows = table.len(), "loaded table");
    Ok(table)
}

/// Writes a table back to `<name>.csv`, skipping tombstoned rows.
pub fn dump_table(name: &str, path: &Path, table: &Table) -> Result<(), EngineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let header: Vec<String> = table
        .schema()
        .columns()
        .iter()
        .map(|column| format!("{}:{}", column.name, column.data_type))
        .collect();
    writer.write_record(&header)?;

    let mut rows = 0usize;
    for row in table.rows() {
        if row.is_deleted() {
            continue;
        }
        let record: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush()?;

    tracing::debug!(table = name, rows, "dumped table");
    Ok(())
}
