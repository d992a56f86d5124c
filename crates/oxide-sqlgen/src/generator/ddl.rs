//! Table, column, index and constraint DDL.

use std::collections::HashSet;

use super::{plsql_ignoring, Generator};
use crate::checksum::crc32_hex;
use crate::dialect::{
    AlterColumnSyntax, DialectCapabilities, DropCascade, DropColumnStrategy, ExistenceGuard,
    IdentitySyntax, RenameColumnSyntax, RenameTableSyntax,
};
use crate::error::{Diagnostics, GenerateError, Result};
use crate::naming::{ConstraintPrefix, TableRef};
use crate::operation::{
    AddColumnOp, AddConstraintOp, AddIndexOp, ChangeColumnOp, ConstraintKind, ConstraintType,
    CreateTableOp, DropConstraintOp, DropTableOp, RemoveColumnOp, RemoveIndexOp, RenameColumnOp,
    RenameTableOp,
};
use crate::schema::{
    validate_column, ColumnSpec, DefaultValue, IndexSpec, ReferentialAction, TableSpec, Unique,
};
use crate::statement::GeneratedStatement;
use crate::types::ColumnType;
use crate::value::escape_string;

/// ORA-00955: name is already used by an existing object.
const ORA_NAME_IN_USE: i32 = -955;
/// ORA-00942: table or view does not exist.
const ORA_NO_SUCH_TABLE: i32 = -942;

/// Constraints a column definition carries inline.
#[derive(Debug, Clone, Copy, Default)]
struct Inline {
    primary_key: bool,
    unique: bool,
    references: bool,
    keep_on_update: bool,
}

/// How the identity property of a column is rendered.
#[derive(Debug, Default)]
struct Identity {
    type_override: Option<&'static str>,
    clause: Option<&'static str>,
    emits_primary_key: bool,
}

impl Generator<'_> {
    pub(super) fn create_table(
        &self,
        op: &CreateTableOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let table = &op.table;
        table.validate()?;
        let table_ref = table.table_ref();
        let native_guard = op.if_not_exists && self.caps.existence_guard == ExistenceGuard::Native;
        let sql = self.create_table_sql(table, native_guard, diag);

        let sql = match (op.if_not_exists, self.caps.existence_guard) {
            (true, ExistenceGuard::ObjectId) => format!(
                "IF OBJECT_ID({}, N'U') IS NULL {sql}",
                self.object_literal(&table_ref)
            ),
            (true, ExistenceGuard::PlSql) => plsql_ignoring(&sql, ORA_NAME_IN_USE),
            _ => sql,
        };

        let mut statements = vec![GeneratedStatement::plain(sql)];
        statements.extend(
            table
                .indexes
                .iter()
                .map(|index| GeneratedStatement::plain(self.create_index_sql(&table_ref, index))),
        );
        Ok(statements)
    }

    /// `CREATE TABLE` built structurally from the definition.
    pub(super) fn create_table_sql(
        &self,
        table: &TableSpec,
        if_not_exists: bool,
        diag: &mut Diagnostics,
    ) -> String {
        let q = self.quoter();
        let naming = self.caps.names_constraints;
        let primary_key = table.primary_key();
        let sole_key = primary_key.len() == 1;

        let mut referenced = HashSet::new();
        let mut definitions = Vec::with_capacity(table.columns.len());
        let mut keep_on_update = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let keep = column
                .references
                .as_ref()
                .is_none_or(|fk| referenced.insert(fk.table.clone()));
            keep_on_update.push(keep);
            let inline = Inline {
                primary_key: sole_key && column.primary_key && !naming,
                unique: column.unique == Unique::Single && !naming,
                references: self.caps.inline_references,
                keep_on_update: keep,
            };
            definitions.push(self.column_definition(&table.name, column, inline, diag));
        }

        if !primary_key.is_empty() && (!sole_key || naming) {
            definitions.push(format!(
                "{}PRIMARY KEY ({})",
                self.constraint_prefix(ConstraintPrefix::PrimaryKey, &table.name, &primary_key),
                q.quote_list(&primary_key)
            ));
        }
        for key in table.unique_groups() {
            definitions.push(format!(
                "{}UNIQUE ({})",
                self.constraint_prefix(ConstraintPrefix::Unique, &table.name, &key.columns),
                q.quote_list(&key.columns)
            ));
        }
        if naming {
            for column in table.columns.iter().filter(|c| c.unique == Unique::Single) {
                let columns = [column.name.as_str()];
                definitions.push(format!(
                    "{}UNIQUE ({})",
                    self.constraint_prefix(ConstraintPrefix::Unique, &table.name, &columns),
                    q.quote(&column.name)
                ));
            }
        }
        if !self.caps.inline_references {
            for (column, keep) in table.columns.iter().zip(keep_on_update) {
                let Some(ref fk) = column.references else {
                    continue;
                };
                let columns = [column.name.as_str()];
                definitions.push(format!(
                    "{}FOREIGN KEY ({}) REFERENCES {} ({}){}",
                    self.constraint_prefix(ConstraintPrefix::ForeignKey, &table.name, &columns),
                    q.quote(&column.name),
                    q.quote(&fk.table),
                    q.quote(&fk.column),
                    self.referential_actions(
                        &table.name,
                        &fk.table,
                        fk.on_delete,
                        fk.on_update,
                        keep,
                        diag
                    )
                ));
            }
        }

        let mut sql = String::from("CREATE TABLE ");
        if if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&q.table_name(&table.table_ref()));
        sql.push_str(" (");
        sql.push_str(&definitions.join(", "));
        sql.push(')');
        sql
    }

    /// `CONSTRAINT <name> ` on naming engines, nothing elsewhere.
    fn constraint_prefix<S: AsRef<str>>(
        &self,
        prefix: ConstraintPrefix,
        table: &str,
        columns: &[S],
    ) -> String {
        if self.caps.names_constraints {
            format!(
                "CONSTRAINT {} ",
                self.quoter().quote(&self.constraint_name(prefix, table, columns))
            )
        } else {
            String::new()
        }
    }

    fn column_definition(
        &self,
        table: &str,
        column: &ColumnSpec,
        inline: Inline,
        diag: &mut Diagnostics,
    ) -> String {
        let q = self.quoter();
        let caps = self.caps;
        let columns = [column.name.as_str()];
        let identity = if column.auto_increment {
            self.identity(column, inline.primary_key, diag)
        } else {
            Identity::default()
        };

        let mut parts = vec![q.quote(&column.name)];
        match identity.type_override {
            Some(ty) => parts.push(String::from(ty)),
            None => parts.push(self.types.sql_type(caps, column, diag)),
        }
        if let Some(clause) = identity.clause {
            parts.push(String::from(clause));
        }

        if let Some(ref default) = column.default {
            if caps.named_default_constraints {
                parts.push(format!(
                    "CONSTRAINT {} DEFAULT {}",
                    q.quote(&self.constraint_name(ConstraintPrefix::Default, table, &columns)),
                    default.to_sql(caps)
                ));
            } else {
                parts.push(format!("DEFAULT {}", default.to_sql(caps)));
            }
        }

        if !column.nullable || column.primary_key {
            parts.push(String::from("NOT NULL"));
        } else if caps.explicit_null {
            parts.push(String::from("NULL"));
        }

        if inline.unique {
            parts.push(String::from("UNIQUE"));
        }
        if inline.primary_key && !identity.emits_primary_key {
            parts.push(format!(
                "{}PRIMARY KEY",
                self.constraint_prefix(ConstraintPrefix::PrimaryKey, table, &columns)
            ));
        }
        if inline.references {
            if let Some(ref fk) = column.references {
                parts.push(format!(
                    "{}REFERENCES {} ({}){}",
                    self.constraint_prefix(ConstraintPrefix::ForeignKey, table, &columns),
                    q.quote(&fk.table),
                    q.quote(&fk.column),
                    self.referential_actions(
                        table,
                        &fk.table,
                        fk.on_delete,
                        fk.on_update,
                        inline.keep_on_update,
                        diag
                    )
                ));
            }
        }

        let mut checks = Vec::new();
        if let Some(ref check) = column.check {
            checks.push(check.clone());
        }
        if let ColumnType::Enum(ref values) = column.column_type {
            if !caps.native_enum {
                let literals: Vec<String> = values.iter().map(|v| escape_string(v)).collect();
                checks.push(format!("{} IN ({})", q.quote(&column.name), literals.join(", ")));
            }
        }
        if !checks.is_empty() {
            parts.push(format!(
                "{}CHECK ({})",
                self.constraint_prefix(ConstraintPrefix::Check, table, &columns),
                checks.join(" AND ")
            ));
        }

        parts.join(" ")
    }

    fn identity(&self, column: &ColumnSpec, inline_key: bool, diag: &mut Diagnostics) -> Identity {
        if !column.column_type.is_integer() {
            diag.unsupported(format!(
                "auto-increment on non-integer column '{}' dropped",
                column.name
            ));
            return Identity::default();
        }
        match self.caps.identity {
            IdentitySyntax::Serial => Identity {
                type_override: Some(match column.column_type {
                    ColumnType::SmallInt(_) => "SMALLSERIAL",
                    ColumnType::BigInt(_) => "BIGSERIAL",
                    _ => "SERIAL",
                }),
                ..Identity::default()
            },
            IdentitySyntax::AutoIncrement => Identity {
                clause: Some("AUTO_INCREMENT"),
                ..Identity::default()
            },
            IdentitySyntax::SqliteAutoIncrement if inline_key => Identity {
                type_override: Some("INTEGER"),
                clause: Some("PRIMARY KEY AUTOINCREMENT"),
                emits_primary_key: true,
            },
            IdentitySyntax::SqliteAutoIncrement => {
                diag.degraded(format!(
                    "AUTOINCREMENT needs '{}' to be the sole primary key; dropped",
                    column.name
                ));
                Identity::default()
            }
            IdentitySyntax::Identity => Identity {
                clause: Some("IDENTITY(1,1)"),
                ..Identity::default()
            },
            IdentitySyntax::GeneratedOnNull => Identity {
                clause: Some("GENERATED BY DEFAULT ON NULL AS IDENTITY"),
                ..Identity::default()
            },
            IdentitySyntax::GeneratedByDefault => Identity {
                clause: Some("GENERATED BY DEFAULT AS IDENTITY"),
                ..Identity::default()
            },
            IdentitySyntax::Unsupported => {
                diag.degraded(format!(
                    "{} {} has no identity columns; auto-increment on '{}' dropped",
                    self.caps.dialect, self.caps.version, column.name
                ));
                Identity::default()
            }
        }
    }

    /// ` ON DELETE .. ON UPDATE ..` for a foreign key of `table` to `target`.
    ///
    /// `NO ACTION` is the default everywhere and is rendered by omission.
    fn referential_actions(
        &self,
        table: &str,
        target: &str,
        on_delete: Option<ReferentialAction>,
        on_update: Option<ReferentialAction>,
        keep_on_update: bool,
        diag: &mut Diagnostics,
    ) -> String {
        if self.caps.restricts_cascade_paths && table == target {
            if on_delete.is_some() || on_update.is_some() {
                diag.limitation(format!(
                    "self-referencing foreign key on '{table}' cannot carry referential actions; dropped"
                ));
            }
            return String::new();
        }

        let mut sql = String::new();
        if let Some(action) = on_delete.and_then(|a| self.referential_action(a, diag)) {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = on_update {
            if !self.caps.supports_on_update {
                diag.unsupported(format!("ON UPDATE {} dropped", action.as_sql()));
            } else if self.caps.restricts_cascade_paths && !keep_on_update {
                diag.limitation(format!(
                    "ON UPDATE dropped on a second reference from '{table}' to '{target}'"
                ));
            } else if let Some(action) = self.referential_action(action, diag) {
                sql.push_str(" ON UPDATE ");
                sql.push_str(action.as_sql());
            }
        }
        sql
    }

    fn referential_action(
        &self,
        action: ReferentialAction,
        diag: &mut Diagnostics,
    ) -> Option<ReferentialAction> {
        match action {
            ReferentialAction::NoAction => None,
            ReferentialAction::Restrict if !self.caps.supports_restrict => {
                diag.degraded("RESTRICT replaced by NO ACTION");
                None
            }
            other => Some(other),
        }
    }

    pub(super) fn drop_table(
        &self,
        op: &DropTableOp,
        diag: &mut Diagnostics,
    ) -> Vec<GeneratedStatement> {
        let guard = self.caps.existence_guard;
        let mut sql = String::from("DROP TABLE ");
        if op.if_exists && guard == ExistenceGuard::Native {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.quoter().table_name(&op.table));
        if op.cascade {
            match self.caps.drop_cascade {
                DropCascade::Cascade => sql.push_str(" CASCADE"),
                DropCascade::CascadeConstraints => sql.push_str(" CASCADE CONSTRAINTS"),
                DropCascade::Unsupported => diag.unsupported("DROP TABLE .. CASCADE dropped"),
            }
        }
        let sql = match (op.if_exists, guard) {
            (true, ExistenceGuard::ObjectId) => format!(
                "IF OBJECT_ID({}, N'U') IS NOT NULL {sql}",
                self.object_literal(&op.table)
            ),
            (true, ExistenceGuard::PlSql) => plsql_ignoring(&sql, ORA_NO_SUCH_TABLE),
            _ => sql,
        };
        vec![GeneratedStatement::plain(sql)]
    }

    pub(super) fn rename_table(&self, op: &RenameTableOp) -> Vec<GeneratedStatement> {
        let q = self.quoter();
        let target = TableRef {
            schema: op.table.schema.clone(),
            name: op.new_name.clone(),
            alias: None,
        };
        let sql = match self.caps.rename_table {
            RenameTableSyntax::AlterTable => format!(
                "{} RENAME TO {}",
                self.alter_table(&op.table),
                q.quote(&op.new_name)
            ),
            RenameTableSyntax::RenameTable => format!(
                "RENAME TABLE {} TO {}",
                q.table_name(&op.table),
                q.table_name(&target)
            ),
            RenameTableSyntax::SpRename => format!(
                "EXEC sp_rename {}, {}",
                self.object_literal(&op.table),
                escape_string(&op.new_name)
            ),
        };
        vec![GeneratedStatement::plain(sql)]
    }

    pub(super) fn add_column(
        &self,
        op: &AddColumnOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        validate_column(&op.column)?;
        let caps = self.caps;
        let column = &op.column;
        let table = op.table.name.as_str();
        let inline = Inline {
            primary_key: column.primary_key,
            unique: column.unique == Unique::Single,
            references: caps.inline_references || caps.names_constraints,
            keep_on_update: true,
        };

        let mut sql = self.alter_table(&op.table);
        sql.push_str(if caps.add_column_keyword { " ADD COLUMN " } else { " ADD " });
        sql.push_str(&self.column_definition(table, column, inline, diag));

        if !inline.references {
            if let Some(ref fk) = column.references {
                let q = self.quoter();
                sql.push_str(&format!(
                    ", ADD FOREIGN KEY ({}) REFERENCES {} ({}){}",
                    q.quote(&column.name),
                    q.quote(&fk.table),
                    q.quote(&fk.column),
                    self.referential_actions(table, &fk.table, fk.on_delete, fk.on_update, true, diag)
                ));
            }
        }
        Ok(vec![GeneratedStatement::plain(sql)])
    }

    pub(super) fn remove_column(
        &self,
        op: &RemoveColumnOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let q = self.quoter();
        let alter = self.alter_table(&op.table);
        let drop = GeneratedStatement::plain(format!("{alter} DROP COLUMN {}", q.quote(&op.column)));

        match self.caps.drop_column {
            DropColumnStrategy::Native => Ok(vec![drop]),
            DropColumnStrategy::DropConstraintsFirst => {
                let mut statements: Vec<GeneratedStatement> = op
                    .bound_constraints
                    .iter()
                    .map(|name| {
                        GeneratedStatement::plain(format!("{alter} DROP CONSTRAINT {}", q.quote(name)))
                    })
                    .collect();
                statements.push(drop);
                Ok(statements)
            }
            DropColumnStrategy::DropIdentityFirst => {
                let mut statements = Vec::new();
                if op.identity {
                    statements.push(GeneratedStatement::plain(format!(
                        "{alter} MODIFY ({} DROP IDENTITY)",
                        q.quote(&op.column)
                    )));
                }
                statements.push(drop);
                Ok(statements)
            }
            DropColumnStrategy::Rebuild => {
                let current = self.current_definition(&op.table, op.current.as_ref(), "remove_column")?;
                require_column(current, &op.column)?;
                let target = current.without_column(&op.column);
                let copy: Vec<(String, String)> = target
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.name.clone()))
                    .collect();
                self.rebuild(&target, &copy, diag)
            }
        }
    }

    pub(super) fn change_column(
        &self,
        op: &ChangeColumnOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        validate_column(&op.column)?;
        let caps = self.caps;
        let q = self.quoter();
        let column = &op.column;
        let name = q.quote(&column.name);
        let alter = self.alter_table(&op.table);
        let table = op.table.name.as_str();

        let statements = match caps.alter_column {
            AlterColumnSyntax::AlterColumnClauses => {
                let mut clauses = vec![format!(
                    "ALTER COLUMN {name} TYPE {}",
                    self.types.sql_type(caps, column, diag)
                )];
                clauses.push(nullability_clause(&name, column));
                clauses.push(default_clause(&name, column, caps));
                vec![format!("{alter} {}", clauses.join(", "))]
            }
            AlterColumnSyntax::SetDataType => vec![
                format!(
                    "{alter} ALTER COLUMN {name} SET DATA TYPE {}",
                    self.types.sql_type(caps, column, diag)
                ),
                format!("{alter} {}", nullability_clause(&name, column)),
                format!("{alter} {}", default_clause(&name, column, caps)),
            ],
            AlterColumnSyntax::Modify => {
                let definition = self.column_definition(table, column, Inline::default(), diag);
                vec![format!("{alter} MODIFY {definition}")]
            }
            AlterColumnSyntax::AlterColumnWithDefaultConstraint => {
                let mut statements = Vec::new();
                if let Some(ref constraint) = op.default_constraint {
                    statements.push(format!("{alter} DROP CONSTRAINT {}", q.quote(constraint)));
                }
                let null = if column.nullable && !column.primary_key { "NULL" } else { "NOT NULL" };
                statements.push(format!(
                    "{alter} ALTER COLUMN {name} {} {null}",
                    self.types.sql_type(caps, column, diag)
                ));
                if let Some(ref default) = column.default {
                    let columns = [column.name.as_str()];
                    statements.push(format!(
                        "{alter} ADD CONSTRAINT {} DEFAULT {} FOR {name}",
                        q.quote(&self.constraint_name(ConstraintPrefix::Default, table, &columns)),
                        default.to_sql(caps)
                    ));
                }
                statements
            }
            AlterColumnSyntax::ModifyParenthesized => {
                let previous = op.current.as_ref().and_then(|t| t.column(&column.name));
                let mut parts = vec![name, self.types.sql_type(caps, column, diag)];
                match (&column.default, previous.and_then(|c| c.default.as_ref())) {
                    (Some(default), _) => parts.push(format!("DEFAULT {}", default.to_sql(caps))),
                    (None, Some(_)) => parts.push(String::from("DEFAULT NULL")),
                    (None, None) => {}
                }
                let nullable = column.nullable && !column.primary_key;
                if previous.is_none_or(|p| p.nullable != nullable) {
                    parts.push(String::from(if nullable { "NULL" } else { "NOT NULL" }));
                }
                vec![format!("{alter} MODIFY ({})", parts.join(" "))]
            }
            AlterColumnSyntax::Rebuild => {
                let current =
                    self.current_definition(&op.table, op.current.as_ref(), "change_column")?;
                require_column(current, &column.name)?;
                let mut target = current.clone();
                for existing in &mut target.columns {
                    if existing.name == column.name {
                        *existing = column.clone();
                    }
                }
                let copy: Vec<(String, String)> = target
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), c.name.clone()))
                    .collect();
                return self.rebuild(&target, &copy, diag);
            }
        };
        Ok(statements.into_iter().map(GeneratedStatement::plain).collect())
    }

    pub(super) fn rename_column(
        &self,
        op: &RenameColumnOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let q = self.quoter();
        match self.caps.rename_column {
            RenameColumnSyntax::RenameColumn => Ok(vec![GeneratedStatement::plain(format!(
                "{} RENAME COLUMN {} TO {}",
                self.alter_table(&op.table),
                q.quote(&op.from),
                q.quote(&op.to)
            ))]),
            RenameColumnSyntax::SpRename => {
                let qualified = format!("{}.{}", q.table_name(&op.table), q.quote(&op.from));
                Ok(vec![GeneratedStatement::plain(format!(
                    "EXEC sp_rename N{}, {}, 'COLUMN'",
                    escape_string(&qualified),
                    escape_string(&op.to)
                ))])
            }
            RenameColumnSyntax::Rebuild => {
                let current =
                    self.current_definition(&op.table, op.current.as_ref(), "rename_column")?;
                require_column(current, &op.from)?;
                let target = renamed_column(current, &op.from, &op.to);
                let copy: Vec<(String, String)> = current
                    .columns
                    .iter()
                    .zip(&target.columns)
                    .map(|(old, new)| (new.name.clone(), old.name.clone()))
                    .collect();
                self.rebuild(&target, &copy, diag)
            }
        }
    }

    pub(super) fn add_index(&self, op: &AddIndexOp) -> GeneratedStatement {
        GeneratedStatement::plain(self.create_index_sql(&op.table, &op.index))
    }

    pub(super) fn create_index_sql(&self, table: &TableRef, index: &IndexSpec) -> String {
        let q = self.quoter();
        let name = index
            .name
            .clone()
            .unwrap_or_else(|| self.constraint_name(ConstraintPrefix::Index, &table.name, &index.columns));
        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        sql.push_str(&q.quote(&name));
        sql.push_str(" ON ");
        sql.push_str(&q.table_name(table));
        sql.push_str(" (");
        sql.push_str(&q.quote_list(&index.columns));
        sql.push(')');
        sql
    }

    pub(super) fn remove_index(&self, op: &RemoveIndexOp) -> GeneratedStatement {
        let q = self.quoter();
        let sql = if self.caps.drop_index_on_table {
            format!("DROP INDEX {} ON {}", q.quote(&op.name), q.table_name(&op.table))
        } else {
            let index = TableRef {
                schema: op.table.schema.clone(),
                name: op.name.clone(),
                alias: None,
            };
            format!("DROP INDEX {}", q.table_name(&index))
        };
        GeneratedStatement::plain(sql)
    }

    pub(super) fn add_constraint(
        &self,
        op: &AddConstraintOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let q = self.quoter();
        let caps = self.caps;
        let table = op.table.name.as_str();
        let name = op
            .name
            .clone()
            .unwrap_or_else(|| self.default_constraint_name(table, &op.constraint));
        let alter = self.alter_table(&op.table);

        if !caps.add_constraint {
            return match op.constraint {
                ConstraintKind::Unique { ref columns } => Ok(vec![GeneratedStatement::plain(
                    self.create_index_sql(
                        &op.table,
                        &IndexSpec::new(columns.iter().cloned()).named(name).unique(),
                    ),
                )]),
                ref other => Err(GenerateError::mismatch(
                    caps.dialect,
                    format!("ADD CONSTRAINT of kind {:?}", other.constraint_type()),
                )),
            };
        }

        let body = match op.constraint {
            ConstraintKind::PrimaryKey { ref columns } => {
                format!("PRIMARY KEY ({})", q.quote_list(columns))
            }
            ConstraintKind::Unique { ref columns } => format!("UNIQUE ({})", q.quote_list(columns)),
            ConstraintKind::ForeignKey {
                ref columns,
                ref references_table,
                ref references_columns,
                on_delete,
                on_update,
            } => format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}){}",
                q.quote_list(columns),
                q.quote(references_table),
                q.quote_list(references_columns),
                self.referential_actions(table, references_table, on_delete, on_update, true, diag)
            ),
            ConstraintKind::Check { ref expression } => format!("CHECK ({expression})"),
            ConstraintKind::Default {
                ref column,
                ref value,
            } => return Ok(vec![self.set_default(&alter, &name, column, value)]),
        };
        Ok(vec![GeneratedStatement::plain(format!(
            "{alter} ADD CONSTRAINT {} {body}",
            q.quote(&name)
        ))])
    }

    fn set_default(
        &self,
        alter: &str,
        name: &str,
        column: &str,
        value: &DefaultValue,
    ) -> GeneratedStatement {
        let q = self.quoter();
        let value = value.to_sql(self.caps);
        let sql = if self.caps.named_default_constraints {
            format!(
                "{alter} ADD CONSTRAINT {} DEFAULT {value} FOR {}",
                q.quote(name),
                q.quote(column)
            )
        } else if self.caps.alter_column == AlterColumnSyntax::ModifyParenthesized {
            format!("{alter} MODIFY ({} DEFAULT {value})", q.quote(column))
        } else {
            format!("{alter} ALTER COLUMN {} SET DEFAULT {value}", q.quote(column))
        };
        GeneratedStatement::plain(sql)
    }

    fn default_constraint_name(&self, table: &str, constraint: &ConstraintKind) -> String {
        match constraint {
            ConstraintKind::PrimaryKey { columns } => {
                self.constraint_name(ConstraintPrefix::PrimaryKey, table, columns)
            }
            ConstraintKind::Unique { columns } => {
                self.constraint_name(ConstraintPrefix::Unique, table, columns)
            }
            ConstraintKind::ForeignKey { columns, .. } => {
                self.constraint_name(ConstraintPrefix::ForeignKey, table, columns)
            }
            ConstraintKind::Check { expression } => {
                self.constraint_name(ConstraintPrefix::Check, table, &[crc32_hex(expression)])
            }
            ConstraintKind::Default { column, .. } => {
                self.constraint_name(ConstraintPrefix::Default, table, &[column])
            }
        }
    }

    /// Drops a constraint.
    ///
    /// On engines without named defaults a `Default` drop takes the column
    /// name in `name`.
    pub(super) fn drop_constraint(&self, op: &DropConstraintOp) -> Result<Vec<GeneratedStatement>> {
        let q = self.quoter();
        let caps = self.caps;
        let alter = self.alter_table(&op.table);
        let name = q.quote(&op.name);

        let sql = match op.kind {
            ConstraintType::Default if !caps.named_default_constraints => {
                if caps.alter_column == AlterColumnSyntax::ModifyParenthesized {
                    format!("{alter} MODIFY ({name} DEFAULT NULL)")
                } else if caps.add_constraint {
                    format!("{alter} ALTER COLUMN {name} DROP DEFAULT")
                } else {
                    return Err(GenerateError::mismatch(caps.dialect, "DROP DEFAULT"));
                }
            }
            ConstraintType::Unique if !caps.add_constraint => format!("DROP INDEX {name}"),
            kind if !caps.add_constraint => {
                return Err(GenerateError::mismatch(
                    caps.dialect,
                    format!("DROP CONSTRAINT of kind {kind:?}"),
                ));
            }
            ConstraintType::PrimaryKey if caps.drop_constraint_by_kind => {
                format!("{alter} DROP PRIMARY KEY")
            }
            ConstraintType::ForeignKey if caps.drop_constraint_by_kind => {
                format!("{alter} DROP FOREIGN KEY {name}")
            }
            ConstraintType::Unique if caps.drop_constraint_by_kind => {
                format!("{alter} DROP INDEX {name}")
            }
            ConstraintType::Check if caps.drop_constraint_by_kind => {
                format!("{alter} DROP CHECK {name}")
            }
            _ => format!("{alter} DROP CONSTRAINT {name}"),
        };
        Ok(vec![GeneratedStatement::plain(sql)])
    }

    /// Returns the caller-supplied definition an operation depends on.
    fn current_definition<'t>(
        &self,
        table: &TableRef,
        current: Option<&'t TableSpec>,
        operation: &'static str,
    ) -> Result<&'t TableSpec> {
        current.ok_or_else(|| GenerateError::MissingTableDefinition {
            table: table.name.clone(),
            operation,
        })
    }
}

fn require_column(table: &TableSpec, column: &str) -> Result<()> {
    if table.column(column).is_none() {
        return Err(GenerateError::UnknownColumn {
            table: table.name.clone(),
            column: String::from(column),
        });
    }
    Ok(())
}

/// Copy of `table` with column `from` renamed to `to` everywhere it appears.
fn renamed_column(table: &TableSpec, from: &str, to: &str) -> TableSpec {
    let rename = |name: &mut String| {
        if name == from {
            *name = String::from(to);
        }
    };
    let mut target = table.clone();
    for column in &mut target.columns {
        rename(&mut column.name);
    }
    for key in &mut target.unique_keys {
        key.columns.iter_mut().for_each(rename);
    }
    for index in &mut target.indexes {
        index.columns.iter_mut().for_each(rename);
    }
    target
}

fn nullability_clause(name: &str, column: &ColumnSpec) -> String {
    if column.nullable && !column.primary_key {
        format!("ALTER COLUMN {name} DROP NOT NULL")
    } else {
        format!("ALTER COLUMN {name} SET NOT NULL")
    }
}

fn default_clause(name: &str, column: &ColumnSpec, caps: &DialectCapabilities) -> String {
    match column.default {
        Some(ref default) => format!("ALTER COLUMN {name} SET DEFAULT {}", default.to_sql(caps)),
        None => format!("ALTER COLUMN {name} DROP DEFAULT"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectCapabilities, Version};
    use crate::error::WarningKind;
    use crate::operation::OperationDescriptor;
    use crate::schema::{bigint, boolean, enumeration, integer, string, text, TableBuilder};
    use crate::statement::Generated;
    use crate::types::TypeRegistry;

    fn generate_at(dialect: Dialect, version: Version, op: OperationDescriptor) -> Result<Generated> {
        let caps = DialectCapabilities::for_dialect(dialect, version);
        let types = TypeRegistry::new();
        Generator::new(&caps, &types).generate(&op)
    }

    fn generate(dialect: Dialect, op: impl Into<OperationDescriptor>) -> Generated {
        generate_at(dialect, dialect.default_version(), op.into()).unwrap()
    }

    fn users() -> TableSpec {
        TableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().auto_increment().build())
            .column(string("email", 255).not_null().unique().build())
            .column(boolean("active").not_null().default_bool(true).build())
            .build()
    }

    fn create(table: TableSpec) -> CreateTableOp {
        CreateTableOp {
            table,
            if_not_exists: false,
        }
    }

    #[test]
    fn test_create_table_postgres() {
        let generated = generate(Dialect::Postgres, create(users()));
        assert_eq!(
            generated.sql(),
            vec![
                "CREATE TABLE \"users\" (\"id\" BIGSERIAL NOT NULL PRIMARY KEY, \
                 \"email\" VARCHAR(255) NOT NULL UNIQUE, \
                 \"active\" BOOLEAN DEFAULT TRUE NOT NULL)"
            ]
        );
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn test_create_table_sqlite_autoincrement() {
        let generated = generate(Dialect::Sqlite, create(users()));
        assert_eq!(
            generated.statements[0].sql,
            "CREATE TABLE \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
             \"email\" VARCHAR(255) NOT NULL UNIQUE, \
             \"active\" TINYINT(1) DEFAULT 1 NOT NULL)"
        );
    }

    #[test]
    fn test_create_table_mssql_names_constraints() {
        let generated = generate(Dialect::MsSql, create(users()));
        assert_eq!(
            generated.statements[0].sql,
            "CREATE TABLE [users] ([id] BIGINT IDENTITY(1,1) NOT NULL, \
             [email] NVARCHAR(255) NOT NULL, \
             [active] BIT CONSTRAINT [DF_users_active] DEFAULT 1 NOT NULL, \
             CONSTRAINT [PK_users_id] PRIMARY KEY ([id]), \
             CONSTRAINT [UQ_users_email] UNIQUE ([email]))"
        );
    }

    #[test]
    fn test_create_table_oracle_guard_and_identity() {
        let op = CreateTableOp {
            table: users(),
            if_not_exists: true,
        };
        let generated = generate(Dialect::Oracle, op);
        let sql = &generated.statements[0].sql;
        assert!(sql.starts_with("BEGIN EXECUTE IMMEDIATE 'CREATE TABLE users ("));
        assert!(sql.contains("id NUMBER(19) GENERATED BY DEFAULT ON NULL AS IDENTITY NOT NULL"));
        assert!(sql.contains("CONSTRAINT PK_users_id PRIMARY KEY (id)"));
        assert!(sql.ends_with("IF SQLCODE != -955 THEN RAISE; END IF; END;"));
    }

    #[test]
    fn test_create_table_oracle_11_drops_identity() {
        let ora11 = Version::new(11, 2, 0);
        let generated = generate_at(Dialect::Oracle, ora11, create(users()).into()).unwrap();
        let sql = &generated.statements[0].sql;
        assert!(sql.starts_with("CREATE TABLE users (id NUMBER(19) NOT NULL, "), "{sql}");
        assert!(!sql.contains("IDENTITY"));
        assert!(sql.contains("CONSTRAINT PK_users_id PRIMARY KEY (id)"));
        assert_eq!(generated.warnings.len(), 1);
        assert_eq!(generated.warnings[0].kind, WarningKind::Degraded);

        let op = RemoveColumnOp {
            table: TableRef::new("users"),
            column: String::from("id"),
            current: None,
            bound_constraints: Vec::new(),
            identity: true,
        };
        assert_eq!(
            generate_at(Dialect::Oracle, ora11, op.into()).unwrap().sql(),
            vec!["ALTER TABLE users DROP COLUMN id"]
        );
    }

    #[test]
    fn test_create_table_if_not_exists_guards() {
        let op = CreateTableOp {
            table: users(),
            if_not_exists: true,
        };
        let sql = generate(Dialect::MsSql, op.clone()).statements[0].sql.clone();
        assert!(sql.starts_with("IF OBJECT_ID(N'[users]', N'U') IS NULL CREATE TABLE [users] ("));
        let sql = generate(Dialect::MySql, op).statements[0].sql.clone();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `users` ("));
        assert!(sql.contains("`id` BIGINT AUTO_INCREMENT NOT NULL PRIMARY KEY"));
    }

    #[test]
    fn test_composite_keys_and_groups() {
        let table = TableBuilder::new()
            .name("memberships")
            .column(integer("user_id").primary_key().build())
            .column(integer("group_id").primary_key().build())
            .column(string("tenant", 32).unique_group("tenant_slug").build())
            .column(string("slug", 32).unique_group("tenant_slug").build())
            .build();
        let sql = generate(Dialect::Postgres, create(table)).statements[0].sql.clone();
        assert!(sql.contains("\"user_id\" INTEGER NOT NULL, "));
        assert!(sql.contains("PRIMARY KEY (\"user_id\", \"group_id\")"));
        assert!(sql.ends_with("UNIQUE (\"tenant\", \"slug\"))"));
    }

    #[test]
    fn test_enum_check_and_native_enum() {
        let table = TableBuilder::new()
            .name("posts")
            .column(enumeration("status", ["draft", "it's live"]).not_null().build())
            .build();
        let sql = generate(Dialect::Postgres, create(table.clone())).statements[0].sql.clone();
        assert!(sql.contains(
            "\"status\" VARCHAR(255) NOT NULL CHECK (\"status\" IN ('draft', 'it''s live'))"
        ));
        let sql = generate(Dialect::MySql, create(table)).statements[0].sql.clone();
        assert!(sql.contains("`status` ENUM('draft', 'it''s live') NOT NULL"));
        assert!(!sql.contains("CHECK"));
    }

    #[test]
    fn test_mysql_trailing_foreign_keys() {
        let table = TableBuilder::new()
            .name("posts")
            .column(bigint("id").primary_key().build())
            .column(
                bigint("author_id")
                    .references("users", "id")
                    .on_delete(ReferentialAction::Cascade)
                    .build(),
            )
            .build();
        let sql = generate(Dialect::MySql, create(table.clone())).statements[0].sql.clone();
        assert!(sql.ends_with(
            "FOREIGN KEY (`author_id`) REFERENCES `users` (`id`) ON DELETE CASCADE)"
        ));
        let sql = generate(Dialect::Postgres, create(table)).statements[0].sql.clone();
        assert!(sql.contains("\"author_id\" BIGINT REFERENCES \"users\" (\"id\") ON DELETE CASCADE"));
    }

    #[test]
    fn test_mssql_cascade_path_suppression() {
        let table = TableBuilder::new()
            .name("transfers")
            .column(bigint("id").primary_key().build())
            .column(
                bigint("from_account")
                    .references("accounts", "id")
                    .on_update(ReferentialAction::Cascade)
                    .build(),
            )
            .column(
                bigint("to_account")
                    .references("accounts", "id")
                    .on_update(ReferentialAction::Cascade)
                    .build(),
            )
            .column(
                bigint("parent_id")
                    .references("transfers", "id")
                    .on_delete(ReferentialAction::Cascade)
                    .build(),
            )
            .build();
        let generated = generate(Dialect::MsSql, create(table));
        let sql = &generated.statements[0].sql;
        assert!(sql.contains(
            "FOREIGN KEY ([from_account]) REFERENCES [accounts] ([id]) ON UPDATE CASCADE"
        ));
        assert!(sql.contains("FOREIGN KEY ([to_account]) REFERENCES [accounts] ([id]), "));
        assert!(sql.contains("FOREIGN KEY ([parent_id]) REFERENCES [transfers] ([id]))"));
        assert_eq!(generated.warnings.len(), 2);
        assert!(generated
            .warnings
            .iter()
            .all(|w| w.kind == WarningKind::Limitation));
    }

    #[test]
    fn test_repeated_references_keep_on_update_without_cascade_paths() {
        let table = TableBuilder::new()
            .name("transfers")
            .column(bigint("id").primary_key().build())
            .column(
                bigint("from_account")
                    .references("accounts", "id")
                    .on_update(ReferentialAction::Cascade)
                    .build(),
            )
            .column(
                bigint("to_account")
                    .references("accounts", "id")
                    .on_update(ReferentialAction::Cascade)
                    .build(),
            )
            .build();
        let generated = generate(Dialect::Postgres, create(table));
        let sql = &generated.statements[0].sql;
        assert!(sql.contains(
            "\"from_account\" BIGINT REFERENCES \"accounts\" (\"id\") ON UPDATE CASCADE"
        ));
        assert!(sql.contains(
            "\"to_account\" BIGINT REFERENCES \"accounts\" (\"id\") ON UPDATE CASCADE"
        ));
        assert_eq!(sql.matches("ON UPDATE CASCADE").count(), 2);
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn test_unsupported_referential_actions_degrade() {
        let table = TableBuilder::new()
            .name("posts")
            .column(
                bigint("author_id")
                    .references("users", "id")
                    .on_delete(ReferentialAction::Restrict)
                    .on_update(ReferentialAction::Cascade)
                    .build(),
            )
            .build();
        let generated = generate(Dialect::Oracle, create(table));
        assert!(generated.statements[0]
            .sql
            .contains("FOREIGN KEY (author_id) REFERENCES users (id))"));
        let kinds: Vec<WarningKind> = generated.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::Degraded, WarningKind::UnsupportedOption]);
    }

    #[test]
    fn test_create_table_validation_errors() {
        let table = TableBuilder::new()
            .name("t")
            .column(bigint("a").auto_increment().build())
            .column(bigint("b").auto_increment().build())
            .build();
        let err = generate_at(Dialect::Postgres, Version::new(16, 0, 0), create(table).into())
            .unwrap_err();
        assert!(matches!(err, GenerateError::MultipleAutoIncrement { .. }));
    }

    #[test]
    fn test_indexes_follow_create_table() {
        let table = TableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().build())
            .column(string("email", 255).build())
            .index(IndexSpec::new(["email"]).unique())
            .build();
        let generated = generate(Dialect::Sqlite, create(table));
        assert_eq!(
            generated.sql()[1],
            "CREATE UNIQUE INDEX \"IX_users_email\" ON \"users\" (\"email\")"
        );
    }

    #[test]
    fn test_drop_table_variants() {
        let op = DropTableOp {
            table: TableRef::new("users"),
            if_exists: true,
            cascade: true,
        };
        assert_eq!(
            generate(Dialect::Postgres, op.clone()).sql(),
            vec!["DROP TABLE IF EXISTS \"users\" CASCADE"]
        );
        let mssql = generate(Dialect::MsSql, op.clone());
        assert_eq!(
            mssql.sql(),
            vec!["IF OBJECT_ID(N'[users]', N'U') IS NOT NULL DROP TABLE [users]"]
        );
        assert_eq!(mssql.warnings.len(), 1);
        let oracle = generate(Dialect::Oracle, op);
        assert_eq!(
            oracle.sql(),
            vec!["BEGIN EXECUTE IMMEDIATE 'DROP TABLE users CASCADE CONSTRAINTS'; EXCEPTION WHEN OTHERS THEN IF SQLCODE != -942 THEN RAISE; END IF; END;"]
        );
    }

    #[test]
    fn test_rename_table() {
        let op = RenameTableOp {
            table: TableRef::new("users"),
            new_name: String::from("accounts"),
        };
        assert_eq!(
            generate(Dialect::Sqlite, op.clone()).sql(),
            vec!["ALTER TABLE \"users\" RENAME TO \"accounts\""]
        );
        assert_eq!(
            generate(Dialect::MySql, op.clone()).sql(),
            vec!["RENAME TABLE `users` TO `accounts`"]
        );
        assert_eq!(
            generate(Dialect::MsSql, op).sql(),
            vec!["EXEC sp_rename N'[users]', 'accounts'"]
        );
    }

    #[test]
    fn test_add_column() {
        let column = bigint("team_id")
            .references("teams", "id")
            .on_delete(ReferentialAction::SetNull)
            .build();
        let op = AddColumnOp {
            table: TableRef::new("users"),
            column,
        };
        assert_eq!(
            generate(Dialect::MySql, op.clone()).sql(),
            vec!["ALTER TABLE `users` ADD COLUMN `team_id` BIGINT, ADD FOREIGN KEY (`team_id`) REFERENCES `teams` (`id`) ON DELETE SET NULL"]
        );
        assert_eq!(
            generate(Dialect::MsSql, op.clone()).sql(),
            vec!["ALTER TABLE [users] ADD [team_id] BIGINT NULL CONSTRAINT [FK_users_team_id] REFERENCES [teams] ([id]) ON DELETE SET NULL"]
        );
        assert_eq!(
            generate(Dialect::Postgres, op).sql(),
            vec!["ALTER TABLE \"users\" ADD COLUMN \"team_id\" BIGINT REFERENCES \"teams\" (\"id\") ON DELETE SET NULL"]
        );

        let key = AddColumnOp {
            table: TableRef::new("users"),
            column: bigint("id").primary_key().build(),
        };
        assert_eq!(
            generate(Dialect::MsSql, key.clone()).sql(),
            vec!["ALTER TABLE [users] ADD [id] BIGINT NOT NULL CONSTRAINT [PK_users_id] PRIMARY KEY"]
        );
        assert_eq!(
            generate(Dialect::Oracle, key.clone()).sql(),
            vec!["ALTER TABLE users ADD id NUMBER(19) NOT NULL CONSTRAINT PK_users_id PRIMARY KEY"]
        );
        assert_eq!(
            generate(Dialect::Postgres, key).sql(),
            vec!["ALTER TABLE \"users\" ADD COLUMN \"id\" BIGINT NOT NULL PRIMARY KEY"]
        );
    }

    #[test]
    fn test_remove_column_strategies() {
        let op = RemoveColumnOp {
            table: TableRef::new("users"),
            column: String::from("active"),
            current: None,
            bound_constraints: vec![String::from("DF_users_active")],
            identity: false,
        };
        assert_eq!(
            generate(Dialect::MsSql, op.clone()).sql(),
            vec![
                "ALTER TABLE [users] DROP CONSTRAINT [DF_users_active]",
                "ALTER TABLE [users] DROP COLUMN [active]",
            ]
        );
        assert_eq!(
            generate(Dialect::Postgres, op.clone()).sql(),
            vec!["ALTER TABLE \"users\" DROP COLUMN \"active\""]
        );

        let identity = RemoveColumnOp {
            column: String::from("id"),
            identity: true,
            ..op.clone()
        };
        assert_eq!(
            generate(Dialect::Oracle, identity).sql(),
            vec![
                "ALTER TABLE users MODIFY (id DROP IDENTITY)",
                "ALTER TABLE users DROP COLUMN id",
            ]
        );

        let err = generate_at(Dialect::Sqlite, Version::new(3, 34, 0), op.into()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::MissingTableDefinition { operation: "remove_column", .. }
        ));
    }

    #[test]
    fn test_change_column_per_engine() {
        let column = string("email", 320).not_null().default_str("").build();
        let op = ChangeColumnOp {
            table: TableRef::new("users"),
            column,
            current: None,
            default_constraint: Some(String::from("DF_users_email")),
        };
        assert_eq!(
            generate(Dialect::Postgres, op.clone()).sql(),
            vec!["ALTER TABLE \"users\" ALTER COLUMN \"email\" TYPE VARCHAR(320), ALTER COLUMN \"email\" SET NOT NULL, ALTER COLUMN \"email\" SET DEFAULT ''"]
        );
        assert_eq!(
            generate(Dialect::MySql, op.clone()).sql(),
            vec!["ALTER TABLE `users` MODIFY `email` VARCHAR(320) DEFAULT '' NOT NULL"]
        );
        assert_eq!(
            generate(Dialect::MsSql, op.clone()).sql(),
            vec![
                "ALTER TABLE [users] DROP CONSTRAINT [DF_users_email]",
                "ALTER TABLE [users] ALTER COLUMN [email] NVARCHAR(320) NOT NULL",
                "ALTER TABLE [users] ADD CONSTRAINT [DF_users_email] DEFAULT '' FOR [email]",
            ]
        );
        assert_eq!(
            generate(Dialect::Oracle, op.clone()).sql(),
            vec!["ALTER TABLE users MODIFY (email VARCHAR2(320) DEFAULT '' NOT NULL)"]
        );
        assert_eq!(
            generate(Dialect::Generic, op).sql(),
            vec![
                "ALTER TABLE users ALTER COLUMN email SET DATA TYPE VARCHAR(320)",
                "ALTER TABLE users ALTER COLUMN email SET NOT NULL",
                "ALTER TABLE users ALTER COLUMN email SET DEFAULT ''",
            ]
        );
    }

    #[test]
    fn test_oracle_modify_skips_unchanged_nullability() {
        let current = TableBuilder::new()
            .name("users")
            .column(string("email", 255).not_null().build())
            .build();
        let op = ChangeColumnOp {
            table: TableRef::new("users"),
            column: text("email").not_null().build(),
            current: Some(current),
            default_constraint: None,
        };
        assert_eq!(
            generate(Dialect::Oracle, op).sql(),
            vec!["ALTER TABLE users MODIFY (email CLOB)"]
        );
    }

    #[test]
    fn test_rename_column() {
        let op = RenameColumnOp {
            table: TableRef::new("users"),
            from: String::from("email"),
            to: String::from("mail"),
            current: None,
        };
        assert_eq!(
            generate(Dialect::Postgres, op.clone()).sql(),
            vec!["ALTER TABLE \"users\" RENAME COLUMN \"email\" TO \"mail\""]
        );
        assert_eq!(
            generate(Dialect::MsSql, op).sql(),
            vec!["EXEC sp_rename N'[users].[email]', 'mail', 'COLUMN'"]
        );
    }

    #[test]
    fn test_indexes() {
        let add = AddIndexOp {
            table: TableRef::new("users"),
            index: IndexSpec::new(["last_name", "first_name"]),
        };
        assert_eq!(
            generate(Dialect::Postgres, add).sql(),
            vec!["CREATE INDEX \"IX_users_last_name_first_name\" ON \"users\" (\"last_name\", \"first_name\")"]
        );
        let remove = RemoveIndexOp {
            table: TableRef::new("users"),
            name: String::from("IX_users_email"),
        };
        assert_eq!(
            generate(Dialect::MySql, remove.clone()).sql(),
            vec!["DROP INDEX `IX_users_email` ON `users`"]
        );
        assert_eq!(
            generate(Dialect::Sqlite, remove).sql(),
            vec!["DROP INDEX \"IX_users_email\""]
        );
    }

    #[test]
    fn test_add_constraint() {
        let op = AddConstraintOp {
            table: TableRef::new("orders"),
            name: None,
            constraint: ConstraintKind::ForeignKey {
                columns: vec![String::from("user_id")],
                references_table: String::from("users"),
                references_columns: vec![String::from("id")],
                on_delete: Some(ReferentialAction::Cascade),
                on_update: None,
            },
        };
        assert_eq!(
            generate(Dialect::Postgres, op.clone()).sql(),
            vec!["ALTER TABLE \"orders\" ADD CONSTRAINT \"FK_orders_user_id\" FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"]
        );
        let err = generate_at(Dialect::Sqlite, Version::new(3, 45, 0), op.into()).unwrap_err();
        assert!(matches!(err, GenerateError::DialectMismatch { .. }));

        let unique = AddConstraintOp {
            table: TableRef::new("users"),
            name: None,
            constraint: ConstraintKind::Unique {
                columns: vec![String::from("email")],
            },
        };
        assert_eq!(
            generate(Dialect::Sqlite, unique).sql(),
            vec!["CREATE UNIQUE INDEX \"UQ_users_email\" ON \"users\" (\"email\")"]
        );
    }

    #[test]
    fn test_add_default_constraint() {
        let op = AddConstraintOp {
            table: TableRef::new("users"),
            name: None,
            constraint: ConstraintKind::Default {
                column: String::from("active"),
                value: DefaultValue::Boolean(true),
            },
        };
        assert_eq!(
            generate(Dialect::MsSql, op.clone()).sql(),
            vec!["ALTER TABLE [users] ADD CONSTRAINT [DF_users_active] DEFAULT 1 FOR [active]"]
        );
        assert_eq!(
            generate(Dialect::Oracle, op.clone()).sql(),
            vec!["ALTER TABLE users MODIFY (active DEFAULT 1)"]
        );
        assert_eq!(
            generate(Dialect::Postgres, op).sql(),
            vec!["ALTER TABLE \"users\" ALTER COLUMN \"active\" SET DEFAULT TRUE"]
        );
    }

    #[test]
    fn test_drop_constraint_by_kind() {
        let op = DropConstraintOp {
            table: TableRef::new("orders"),
            name: String::from("FK_orders_user_id"),
            kind: ConstraintType::ForeignKey,
        };
        assert_eq!(
            generate(Dialect::MySql, op.clone()).sql(),
            vec!["ALTER TABLE `orders` DROP FOREIGN KEY `FK_orders_user_id`"]
        );
        assert_eq!(
            generate(Dialect::MsSql, op.clone()).sql(),
            vec!["ALTER TABLE [orders] DROP CONSTRAINT [FK_orders_user_id]"]
        );
        let pk = DropConstraintOp {
            kind: ConstraintType::PrimaryKey,
            ..op.clone()
        };
        assert_eq!(
            generate(Dialect::MySql, pk).sql(),
            vec!["ALTER TABLE `orders` DROP PRIMARY KEY"]
        );
        let err = generate_at(Dialect::Sqlite, Version::new(3, 45, 0), op.into()).unwrap_err();
        assert!(!err.is_configuration());
    }
}
