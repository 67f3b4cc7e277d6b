//! Read-only view of the logical schema
//!
//! The general-purpose catalog (schemas, tables, columns) lives outside
//! this crate. Placement and routing only need id lookups, which the
//! `LogicalCatalog` trait provides. `LogicalSchema` is an in-memory
//! implementation used by the CLI and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ids::{ColumnId, IdGenerator, TableId};

/// Column data types relevant to partition functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    BigInt,
    Double,
    Varchar,
    Boolean,
    Date,
    Timestamp,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::BigInt | ColumnType::Double)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalTable {
    pub id: TableId,
    pub name: String,
    pub column_ids: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalColumn {
    pub id: ColumnId,
    pub table_id: TableId,
    pub name: String,
    pub column_type: ColumnType,
    pub position: u32,
}

/// Lookup interface of the logical schema
pub trait LogicalCatalog {
    fn get_table(&self, id: TableId) -> Option<&LogicalTable>;

    fn get_column(&self, id: ColumnId) -> Option<&LogicalColumn>;

    /// Columns of a table in declaration order. Empty for unknown tables.
    fn get_columns(&self, table_id: TableId) -> Vec<&LogicalColumn> {
        self.get_table(table_id)
            .map(|table| {
                table
                    .column_ids
                    .iter()
                    .filter_map(|id| self.get_column(*id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-memory logical schema
#[derive(Debug)]
pub struct LogicalSchema {
    ids: Arc<IdGenerator>,
    tables: BTreeMap<TableId, LogicalTable>,
    columns: BTreeMap<ColumnId, LogicalColumn>,
}

impl LogicalSchema {
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            ids,
            tables: BTreeMap::new(),
            columns: BTreeMap::new(),
        }
    }

    /// Define a table with the given columns, returning its id.
    pub fn add_table(&mut self, name: impl Into<String>, columns: &[(&str, ColumnType)]) -> TableId {
        let table_id = TableId(self.ids.next_id());
        let mut column_ids = Vec::with_capacity(columns.len());

        for (position, (column_name, column_type)) in columns.iter().enumerate() {
            let column_id = ColumnId(self.ids.next_id());
            self.columns.insert(
                column_id,
                LogicalColumn {
                    id: column_id,
                    table_id,
                    name: (*column_name).to_string(),
                    column_type: *column_type,
                    position: position as u32 + 1,
                },
            );
            column_ids.push(column_id);
        }

        self.tables.insert(
            table_id,
            LogicalTable {
                id: table_id,
                name: name.into(),
                column_ids,
            },
        );
        table_id
    }

    /// Append a column to an existing table.
    pub fn add_column(
        &mut self,
        table_id: TableId,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Option<ColumnId> {
        let table = self.tables.get_mut(&table_id)?;
        let column_id = ColumnId(self.ids.next_id());
        self.columns.insert(
            column_id,
            LogicalColumn {
                id: column_id,
                table_id,
                name: name.into(),
                column_type,
                position: table.column_ids.len() as u32 + 1,
            },
        );
        table.column_ids.push(column_id);
        Some(column_id)
    }

    /// Look up a column of a table by name.
    pub fn column_by_name(&self, table_id: TableId, name: &str) -> Option<&LogicalColumn> {
        self.get_columns(table_id)
            .into_iter()
            .find(|column| column.name == name)
    }
}

impl LogicalCatalog for LogicalSchema {
    fn get_table(&self, id: TableId) -> Option<&LogicalTable> {
        self.tables.get(&id)
    }

    fn get_column(&self, id: ColumnId) -> Option<&LogicalColumn> {
        self.columns.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_table_assigns_positions() {
        let mut schema = LogicalSchema::new(IdGenerator::shared());
        let table = schema.add_table(
            "orders",
            &[("id", ColumnType::BigInt), ("region", ColumnType::Varchar)],
        );

        let columns = schema.get_columns(table);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].position, 1);
        assert_eq!(columns[1].position, 2);
        assert_eq!(columns[1].table_id, table);
    }

    #[test]
    fn test_add_column_appends() {
        let mut schema = LogicalSchema::new(IdGenerator::shared());
        let table = schema.add_table("t", &[("a", ColumnType::Integer)]);
        let column = schema.add_column(table, "b", ColumnType::Double).unwrap();

        assert_eq!(schema.get_column(column).unwrap().position, 2);
        assert_eq!(schema.column_by_name(table, "b").unwrap().id, column);
        assert!(schema.add_column(TableId(9999), "c", ColumnType::Integer).is_none());
    }

    #[test]
    fn test_unknown_table_has_no_columns() {
        let schema = LogicalSchema::new(IdGenerator::shared());
        assert!(schema.get_columns(TableId(1)).is_empty());
    }
}
