//! Table definitions and the typestate table builder.

use std::collections::HashSet;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::column::{ColumnSpec, Unique};
use crate::error::{GenerateError, Result};
use crate::naming::TableRef;
use crate::types::ColumnType;

/// A named composite unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Key name; generated when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Columns, in key order.
    pub columns: Vec<String>,
}

impl UniqueKey {
    /// Creates a unique key over `columns`.
    #[must_use]
    pub fn new<I, S>(name: Option<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name; generated when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

impl IndexSpec {
    /// Creates a non-unique index over `columns`.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Names the index.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Schema, if qualified.
    #[serde(default)]
    pub schema: Option<String>,
    /// Columns, in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Explicit composite unique keys.
    #[serde(default)]
    pub unique_keys: Vec<UniqueKey>,
    /// Secondary indexes.
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl TableSpec {
    /// Returns the table as a reference.
    #[must_use]
    pub fn table_ref(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: self.name.clone(),
            alias: None,
        }
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the primary key columns in declaration order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Returns the auto-increment column, if any.
    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.auto_increment)
    }

    /// Returns composite unique keys: the explicit ones, then those gathered
    /// from [`Unique::Group`] columns in first-seen order.
    #[must_use]
    pub fn unique_groups(&self) -> Vec<UniqueKey> {
        let mut keys = self.unique_keys.clone();
        let mut group_index: Vec<(String, usize)> = Vec::new();
        for column in &self.columns {
            let Unique::Group(ref group) = column.unique else {
                continue;
            };
            match group_index.iter().find(|(g, _)| g == group) {
                Some(&(_, idx)) => keys[idx].columns.push(column.name.clone()),
                None => {
                    group_index.push((group.clone(), keys.len()));
                    keys.push(UniqueKey::new(Some(group.clone()), [column.name.clone()]));
                }
            }
        }
        keys
    }

    /// Returns every unique key: composite groups first, then single-column
    /// uniques in column order.
    #[must_use]
    pub fn all_unique_keys(&self) -> Vec<UniqueKey> {
        let mut keys = self.unique_groups();
        keys.extend(
            self.columns
                .iter()
                .filter(|c| c.unique == Unique::Single)
                .map(|c| UniqueKey::new(None, [c.name.clone()])),
        );
        keys
    }

    /// Checks the structural invariants of the definition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty column list, duplicate
    /// column names, more than one auto-increment column or an empty ENUM.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(GenerateError::EmptyColumns {
                table: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(GenerateError::InvalidDescriptor(format!(
                    "column '{}' is declared twice on '{}'",
                    column.name, self.name
                )));
            }
            validate_column(column)?;
        }

        let auto: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.auto_increment)
            .map(|c| c.name.clone())
            .collect();
        if auto.len() > 1 {
            return Err(GenerateError::MultipleAutoIncrement {
                table: self.name.clone(),
                columns: auto,
            });
        }

        for key in &self.unique_keys {
            for column in &key.columns {
                if self.column(column).is_none() {
                    return Err(GenerateError::UnknownColumn {
                        table: self.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns a copy without `column`, dropping it from keys and indexes.
    #[must_use]
    pub fn without_column(&self, column: &str) -> Self {
        let mut table = self.clone();
        table.columns.retain(|c| c.name != column);
        for key in &mut table.unique_keys {
            key.columns.retain(|c| c != column);
        }
        table.unique_keys.retain(|k| !k.columns.is_empty());
        for index in &mut table.indexes {
            index.columns.retain(|c| c != column);
        }
        table.indexes.retain(|i| !i.columns.is_empty());
        table
    }

    /// Returns a copy under a different table name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Checks the invariants of a single column.
pub(crate) fn validate_column(column: &ColumnSpec) -> Result<()> {
    if let ColumnType::Enum(ref values) = column.column_type {
        if values.is_empty() {
            return Err(GenerateError::EmptyEnum {
                column: column.name.clone(),
            });
        }
    }
    Ok(())
}

/// Marker: table has no name set.
#[derive(Debug, Clone, Copy)]
pub struct NoName;

/// Marker: table has a name set.
#[derive(Debug, Clone, Copy)]
pub struct HasName;

/// Marker: table has no columns.
#[derive(Debug, Clone, Copy)]
pub struct NoColumns;

/// Marker: table has at least one column.
#[derive(Debug, Clone, Copy)]
pub struct HasColumns;

/// Typestate builder for [`TableSpec`].
///
/// `build()` is only available once a name and at least one column are set.
///
/// ```rust
/// use oxide_sqlgen::schema::{bigint, string, TableBuilder};
///
/// let table = TableBuilder::new()
///     .name("users")
///     .column(bigint("id").primary_key().auto_increment().build())
///     .column(string("email", 255).not_null().unique().build())
///     .build();
///
/// assert_eq!(table.primary_key(), vec!["id"]);
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder<Name, Cols> {
    name: Option<String>,
    schema: Option<String>,
    columns: Vec<ColumnSpec>,
    unique_keys: Vec<UniqueKey>,
    indexes: Vec<IndexSpec>,
    _state: PhantomData<(Name, Cols)>,
}

impl Default for TableBuilder<NoName, NoColumns> {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder<NoName, NoColumns> {
    /// Creates a new `TableBuilder`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            schema: None,
            columns: Vec::new(),
            unique_keys: Vec::new(),
            indexes: Vec::new(),
            _state: PhantomData,
        }
    }
}

impl<Cols> TableBuilder<NoName, Cols> {
    /// Sets the table name.
    #[must_use]
    pub fn name(self, name: impl Into<String>) -> TableBuilder<HasName, Cols> {
        TableBuilder {
            name: Some(name.into()),
            schema: self.schema,
            columns: self.columns,
            unique_keys: self.unique_keys,
            indexes: self.indexes,
            _state: PhantomData,
        }
    }
}

impl<Name> TableBuilder<Name, NoColumns> {
    /// Adds the first column.
    #[must_use]
    pub fn column(self, column: ColumnSpec) -> TableBuilder<Name, HasColumns> {
        TableBuilder {
            name: self.name,
            schema: self.schema,
            columns: vec![column],
            unique_keys: self.unique_keys,
            indexes: self.indexes,
            _state: PhantomData,
        }
    }
}

impl<Name> TableBuilder<Name, HasColumns> {
    /// Adds another column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }
}

impl<Name, Cols> TableBuilder<Name, Cols> {
    /// Qualifies the table with a schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a composite unique key.
    #[must_use]
    pub fn unique_key<I, S>(mut self, name: Option<&str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_keys
            .push(UniqueKey::new(name.map(String::from), columns));
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }
}

impl TableBuilder<HasName, HasColumns> {
    /// Builds the table definition.
    #[must_use]
    pub fn build(self) -> TableSpec {
        TableSpec {
            name: self.name.unwrap_or_default(),
            schema: self.schema,
            columns: self.columns,
            unique_keys: self.unique_keys,
            indexes: self.indexes,
        }
    }
}
