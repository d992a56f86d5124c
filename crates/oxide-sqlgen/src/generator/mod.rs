//! Descriptor to SQL translation.
//!
//! [`Generator`] borrows one engine's [`DialectCapabilities`] and a shared
//! [`TypeRegistry`] and turns an [`OperationDescriptor`] into ordered
//! statements. Every syntax choice reads a capability; nothing here matches
//! on the dialect itself.

mod catalog;
mod ddl;
mod dml;
mod filter;
mod rebuild;
mod select;
mod transaction;
mod upsert;

use tracing::debug;

use crate::dialect::DialectCapabilities;
use crate::error::{Diagnostics, GenerateError, Result};
use crate::naming::{constraint_name, ConstraintPrefix, Quoter, TableRef};
use crate::operation::{OperationDescriptor, Row};
use crate::schema::{ColumnSpec, TableSpec};
use crate::statement::{BindCollector, Generated, GeneratedStatement, StatementMarker};
use crate::types::TypeRegistry;
use crate::value::{escape_string, SqlValue};

/// Generates SQL for one engine.
///
/// ```rust
/// use oxide_sqlgen::dialect::{Dialect, DialectCapabilities};
/// use oxide_sqlgen::generator::Generator;
/// use oxide_sqlgen::operation::DeleteOp;
/// use oxide_sqlgen::predicate::col;
/// use oxide_sqlgen::types::TypeRegistry;
///
/// let caps = DialectCapabilities::latest(Dialect::Sqlite);
/// let types = TypeRegistry::new();
/// let generated = Generator::new(&caps, &types)
///     .generate(&DeleteOp::new("users").filter(col("id").eq(1)).into())
///     .unwrap();
/// assert_eq!(generated.statements[0].sql, r#"DELETE FROM "users" WHERE "id" = ?"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    caps: &'a DialectCapabilities,
    types: &'a TypeRegistry,
}

impl<'a> Generator<'a> {
    /// Creates a generator.
    #[must_use]
    pub const fn new(caps: &'a DialectCapabilities, types: &'a TypeRegistry) -> Self {
        Self { caps, types }
    }

    /// Returns the capabilities this generator targets.
    #[must_use]
    pub const fn capabilities(&self) -> &'a DialectCapabilities {
        self.caps
    }

    /// Translates one operation into statements and warnings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a structurally invalid descriptor
    /// and [`GenerateError::DialectMismatch`] when the engine cannot express
    /// the operation at all. No SQL is returned on error.
    pub fn generate(&self, operation: &OperationDescriptor) -> Result<Generated> {
        debug!(
            dialect = %self.caps.dialect,
            operation = operation.name(),
            "Generating SQL"
        );
        let mut diag = Diagnostics::new(self.caps.dialect);
        let statements = match operation {
            OperationDescriptor::CreateTable(op) => self.create_table(op, &mut diag)?,
            OperationDescriptor::DropTable(op) => self.drop_table(op, &mut diag),
            OperationDescriptor::RenameTable(op) => self.rename_table(op),
            OperationDescriptor::AddColumn(op) => self.add_column(op, &mut diag)?,
            OperationDescriptor::RemoveColumn(op) => self.remove_column(op, &mut diag)?,
            OperationDescriptor::ChangeColumn(op) => self.change_column(op, &mut diag)?,
            OperationDescriptor::RenameColumn(op) => self.rename_column(op, &mut diag)?,
            OperationDescriptor::AddIndex(op) => vec![self.add_index(op)],
            OperationDescriptor::RemoveIndex(op) => vec![self.remove_index(op)],
            OperationDescriptor::Insert(op) => self.insert(op, &mut diag)?,
            OperationDescriptor::BulkInsert(op) => self.bulk_insert(op)?,
            OperationDescriptor::Update(op) => self.update(op, &mut diag)?,
            OperationDescriptor::Delete(op) => self.delete(op, &mut diag)?,
            OperationDescriptor::Upsert(op) => self.upsert(op, &mut diag)?,
            OperationDescriptor::Select(op) => self.select(op, &mut diag)?,
            OperationDescriptor::AddConstraint(op) => self.add_constraint(op, &mut diag)?,
            OperationDescriptor::DropConstraint(op) => self.drop_constraint(op)?,
            OperationDescriptor::ShowIndexes(op) => self.show_indexes(op)?,
            OperationDescriptor::ShowConstraints(op) => self.show_constraints(op, &mut diag)?,
            OperationDescriptor::Transaction(op) => self.transaction(op, &mut diag),
        };
        Ok(Generated {
            statements,
            warnings: diag.into_warnings(),
        })
    }

    const fn quoter(&self) -> Quoter<'a> {
        Quoter::new(self.caps)
    }

    const fn binds(&self) -> BindCollector {
        BindCollector::new(self.caps.bind_style)
    }

    /// Encodes `value` and returns its placeholder.
    fn bind(&self, binds: &mut BindCollector, value: &SqlValue, column: Option<&ColumnSpec>) -> String {
        binds.push(self.types.encode_bind(self.caps, value.clone(), column))
    }

    /// Generated constraint name for this engine's identifier limit.
    fn constraint_name<S: AsRef<str>>(
        &self,
        prefix: ConstraintPrefix,
        table: &str,
        columns: &[S],
    ) -> String {
        constraint_name(prefix, table, columns, self.caps.max_identifier_length)
    }

    /// `ALTER TABLE <table>`.
    fn alter_table(&self, table: &TableRef) -> String {
        format!("ALTER TABLE {}", self.quoter().table_name(table))
    }

    /// `N'<table>'` for `OBJECT_ID` and `sp_rename`.
    fn object_literal(&self, table: &TableRef) -> String {
        format!("N{}", escape_string(&self.quoter().table_name(table)))
    }

    /// Wraps `sql` with the `IDENTITY_INSERT` toggle.
    fn with_identity_insert(&self, table: &TableRef, statement: GeneratedStatement) -> GeneratedStatement {
        let name = self.quoter().table_name(table);
        GeneratedStatement {
            sql: format!(
                "SET IDENTITY_INSERT {name} ON; {}; SET IDENTITY_INSERT {name} OFF;",
                statement.sql
            ),
            binds: statement.binds,
            marker: Some(StatementMarker::IdentityInsertToggled),
        }
    }
}

/// Looks up a column in an optional definition.
fn column_of<'t>(definition: Option<&'t TableSpec>, name: &str) -> Option<&'t ColumnSpec> {
    definition.and_then(|table| table.column(name))
}

/// Returns whether `name` is the auto-increment column of `definition`.
fn is_identity(definition: Option<&TableSpec>, name: &str) -> bool {
    column_of(definition, name).is_some_and(|c| c.auto_increment)
}

/// Value of `column` in `row`.
fn value_of<'r>(row: &'r [(String, SqlValue)], column: &str) -> Option<&'r SqlValue> {
    row.iter().find(|(c, _)| c == column).map(|(_, v)| v)
}

/// Rejects row columns missing from the definition, when one is given.
fn check_columns(table: &TableRef, row: &Row, definition: Option<&TableSpec>) -> Result<()> {
    let Some(definition) = definition else {
        return Ok(());
    };
    for (column, _) in row {
        if definition.column(column).is_none() {
            return Err(GenerateError::UnknownColumn {
                table: table.name.clone(),
                column: column.clone(),
            });
        }
    }
    Ok(())
}

/// Wraps a DDL statement in a PL/SQL block that swallows one error code.
fn plsql_ignoring(sql: &str, code: i32) -> String {
    format!(
        "BEGIN EXECUTE IMMEDIATE {}; EXCEPTION WHEN OTHERS THEN IF SQLCODE != {code} THEN RAISE; END IF; END;",
        escape_string(sql)
    )
}
