use core::fmt;

use cql_ast::DataType;

use crate::error::CatalogError;

/// One column of a schema: a type and a name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    /// The column type.
    pub data_type: DataType,
    /// The column name, unique within its schema.
    pub name: String,
}

/// An ordered sequence of columns. Immutable once built; lookup is by
/// name, the ordinal is incidental.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates an empty schema, to be filled with [`Schema::push`].
    pub fn new() -> Self {
        Schema::default()
    }

    /// Appends a column while constructing a schema.
    pub fn push(&mut self, data_type: DataType, name: impl Into<String>) {
        self.columns.push(Column {
            data_type,
            name: name.into(),
        });
    }

    /// Parses a CSV header line: `name:type[,name:type]*`.
    pub fn from_header(table: &str, header: &str) -> Result<Self, CatalogError> {
        let mut schema = Schema::new();
        for cell in header.split(',') {
            schema.push_header_cell(table, cell)?;
        }
        Ok(schema)
    }

    /// Parses one `name:type` header cell into a column.
    pub fn push_header_cell(&mut self, table: &str, cell: &str) -> Result<(), CatalogError> {
        let (name, type_name) = cell.split_once(':').ok_or_else(|| CatalogError::BadHeader {
            table: table.to_string(),
            detail: format!("column `{}` is missing a `:type` suffix", cell),
        })?;
        let data_type = DataType::parse(type_name).ok_or_else(|| CatalogError::BadHeader {
            table: table.to_string(),
            detail: format!("unknown column type `{}`", type_name),
        })?;
        self.push(data_type, name);
        Ok(())
    }

    /// The columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finds a column's ordinal by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for column in &self.columns {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", column.name, column.data_type)?;
            first = false;
        }
        Ok(())
    }
}
