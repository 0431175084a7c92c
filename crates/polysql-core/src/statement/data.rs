//! Finalized statement artifacts.

use serde::{Serialize, Serializer};

use crate::structure::ColumnRef;
use crate::types::DataType;

/// Kind of a built statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    /// SELECT.
    Select,
    /// INSERT.
    Insert,
    /// UPDATE.
    Update,
    /// DELETE.
    Delete,
    /// CREATE TABLE.
    CreateTable,
    /// DROP TABLE.
    DropTable,
}

impl StatementType {
    /// Returns true for statements that produce rows.
    #[must_use]
    pub const fn returns_rows(&self) -> bool {
        matches!(self, Self::Select)
    }
}

/// One textual appearance of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterOccurrence {
    /// 0-based occurrence index in statement order.
    pub position: usize,
    /// Logical parameter key.
    pub key: String,
    /// Placeholder text emitted into the SQL.
    pub dbms_name: String,
}

impl ParameterOccurrence {
    /// Creates an occurrence.
    #[must_use]
    pub fn new(position: usize, key: impl Into<String>, dbms_name: impl Into<String>) -> Self {
        Self {
            position,
            key: key.into(),
            dbms_name: dbms_name.into(),
        }
    }
}

/// Parameter occurrences of a statement, in statement order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterData {
    occurrences: Vec<ParameterOccurrence>,
}

impl ParameterData {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            occurrences: Vec::new(),
        }
    }

    /// Records an occurrence.
    pub fn push(&mut self, occurrence: ParameterOccurrence) {
        self.occurrences.push(occurrence);
    }

    /// Number of occurrences.
    #[must_use]
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.keys().len()
    }

    /// Distinct keys in order of first appearance.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for occurrence in &self.occurrences {
            if !keys.contains(&occurrence.key.as_str()) {
                keys.push(&occurrence.key);
            }
        }
        keys
    }

    /// Placeholder already assigned to `key`, if any.
    #[must_use]
    pub fn dbms_name_of(&self, key: &str) -> Option<&str> {
        self.occurrences
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.dbms_name.as_str())
    }

    /// Positions at which `key` occurs.
    #[must_use]
    pub fn positions_of(&self, key: &str) -> Vec<usize> {
        self.occurrences
            .iter()
            .filter(|o| o.key == key)
            .map(|o| o.position)
            .collect()
    }

    /// Occurrences in statement order.
    #[must_use]
    pub fn occurrences(&self) -> &[ParameterOccurrence] {
        &self.occurrences
    }

    /// Returns true if the statement has no parameter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

fn serialize_source<S: Serializer>(
    source: &Option<ColumnRef>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match source {
        Some(column) => serializer.serialize_some(&column.path()),
        None => serializer.serialize_none(),
    }
}

/// Metadata of one select-list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultColumn {
    /// 0-based position in the select list.
    pub index: usize,
    /// Output name: the alias, else the column name, else the rendered
    /// expression.
    pub name: String,
    /// Semantic type.
    pub data_type: DataType,
    /// Table column the entry reads, if it is a plain column.
    #[serde(serialize_with = "serialize_source")]
    pub source: Option<ColumnRef>,
}

impl ResultColumn {
    /// Creates an entry without a source column.
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            index,
            name: name.into(),
            data_type,
            source: None,
        }
    }

    /// Sets the source column.
    #[must_use]
    pub fn source(mut self, source: ColumnRef) -> Self {
        self.source = Some(source);
        self
    }
}

/// Result columns addressable by index and by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultColumnMap {
    columns: Vec<ResultColumn>,
}

impl ResultColumnMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Inserts or replaces the entry at `column.index`.
    pub fn set(&mut self, column: ResultColumn) {
        match self.columns.binary_search_by_key(&column.index, |c| c.index) {
            Ok(position) => self.columns[position] = column,
            Err(position) => self.columns.insert(position, column),
        }
    }

    /// Entry by select-list position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ResultColumn> {
        self.columns
            .binary_search_by_key(&index, |c| c.index)
            .ok()
            .map(|position| &self.columns[position])
    }

    /// Entry by output name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there is no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entries in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, ResultColumn> {
        self.columns.iter()
    }
}

/// A compiled statement: SQL text plus parameter and result metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementData {
    sql: String,
    parameters: ParameterData,
    result_columns: ResultColumnMap,
    statement_type: Option<StatementType>,
}

impl StatementData {
    pub(crate) const fn new(
        sql: String,
        parameters: ParameterData,
        result_columns: ResultColumnMap,
        statement_type: Option<StatementType>,
    ) -> Self {
        Self {
            sql,
            parameters,
            result_columns,
            statement_type,
        }
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter occurrences.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterData {
        &self.parameters
    }

    /// Result column metadata.
    #[must_use]
    pub const fn result_columns(&self) -> &ResultColumnMap {
        &self.result_columns
    }

    /// Detected statement type; `None` for bare expressions.
    #[must_use]
    pub const fn statement_type(&self) -> Option<StatementType> {
        self.statement_type
    }
}
