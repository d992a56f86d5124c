//! INSERT, bulk INSERT, UPDATE and DELETE.

use tracing::trace;

use super::{check_columns, column_of, is_identity, value_of, Generator};
use crate::dialect::{DefaultValuesSyntax, DialectCapabilities, InsertIgnore, Returning, RowLimit};
use crate::error::{Diagnostics, GenerateError, Result};
use crate::operation::{BulkInsertOp, DeleteOp, InsertOp, UpdateOp};
use crate::predicate::Predicate;
use crate::schema::TableSpec;
use crate::statement::{BindCollector, GeneratedStatement};
use crate::value::SqlValue;

/// Rows per bulk INSERT statement for `columns` values per row.
///
/// Starts from `floor(limit / (columns + 1)) + 1`, then keeps the statement
/// within the engine's bind limit and its `VALUES` row cap.
pub(crate) fn batch_size(caps: &DialectCapabilities, columns: usize) -> usize {
    let limit = caps.max_bind_parameters;
    let size = (limit / (columns + 1) + 1).min((limit / columns.max(1)).max(1));
    caps.max_rows_per_values.map_or(size, |cap| size.min(cap))
}

/// `INSERT [IGNORE|OR IGNORE] INTO` and the trailing conflict clause.
fn insert_prefix(caps: &DialectCapabilities, ignore_duplicates: bool) -> Result<(&'static str, &'static str)> {
    if !ignore_duplicates {
        return Ok(("INSERT INTO ", ""));
    }
    match caps.insert_ignore {
        InsertIgnore::OnConflictDoNothing => Ok(("INSERT INTO ", " ON CONFLICT DO NOTHING")),
        InsertIgnore::InsertIgnore => Ok(("INSERT IGNORE INTO ", "")),
        InsertIgnore::InsertOrIgnore => Ok(("INSERT OR IGNORE INTO ", "")),
        InsertIgnore::Unsupported => Err(GenerateError::mismatch(
            caps.dialect,
            "INSERT that skips duplicate rows",
        )),
    }
}

impl Generator<'_> {
    pub(super) fn insert(
        &self,
        op: &InsertOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let caps = self.caps;
        let q = self.quoter();
        let definition = op.definition.as_ref();
        check_columns(&op.table, &op.values, definition)?;

        let values: Vec<&(String, SqlValue)> = op
            .values
            .iter()
            .filter(|(column, value)| !(value.is_null() && is_identity(definition, column)))
            .collect();
        let explicit_identity = caps.identity_insert_toggle
            && values.iter().any(|(column, _)| is_identity(definition, column));
        let output = op.returning && caps.returning == Returning::OutputInserted;

        let (prefix, conflict) = insert_prefix(caps, op.ignore_duplicates)?;
        let mut binds = self.binds();
        let mut sql = String::from(prefix);
        sql.push_str(&q.table_name(&op.table));

        if values.is_empty() {
            match caps.default_values {
                DefaultValuesSyntax::DefaultValues => {
                    if output {
                        sql.push_str(" OUTPUT INSERTED.*");
                    }
                    sql.push_str(" DEFAULT VALUES");
                }
                DefaultValuesSyntax::EmptyParens => sql.push_str(" () VALUES ()"),
                DefaultValuesSyntax::DefaultKeyword => {
                    let key = definition
                        .and_then(|t| {
                            t.auto_increment_column()
                                .map(|c| c.name.as_str())
                                .or_else(|| t.primary_key().first().copied())
                        })
                        .ok_or_else(|| GenerateError::MissingTableDefinition {
                            table: op.table.name.clone(),
                            operation: "insert",
                        })?;
                    sql.push_str(&format!(" ({}) VALUES (DEFAULT)", q.quote(key)));
                }
            }
        } else {
            let columns: Vec<&str> = values.iter().map(|(c, _)| c.as_str()).collect();
            let placeholders: Vec<String> = values
                .iter()
                .map(|(column, value)| self.bind(&mut binds, value, column_of(definition, column)))
                .collect();
            sql.push_str(&format!(" ({})", q.quote_list(&columns)));
            if output {
                sql.push_str(" OUTPUT INSERTED.*");
            }
            sql.push_str(&format!(" VALUES ({})", placeholders.join(", ")));
        }
        sql.push_str(conflict);
        if op.returning {
            self.returning_suffix(&mut sql, diag);
        }

        let statement = binds.finish(sql);
        if explicit_identity {
            return Ok(vec![self.with_identity_insert(&op.table, statement)]);
        }
        Ok(vec![statement])
    }

    /// Appends `RETURNING *`, or warns when the engine has no trailing form.
    pub(super) fn returning_suffix(&self, sql: &mut String, diag: &mut Diagnostics) {
        match self.caps.returning {
            Returning::Returning => sql.push_str(" RETURNING *"),
            Returning::OutputInserted => {}
            Returning::Unsupported => diag.unsupported("returning the written rows is not supported"),
        }
    }

    pub(super) fn bulk_insert(&self, op: &BulkInsertOp) -> Result<Vec<GeneratedStatement>> {
        if op.rows.is_empty() {
            return Ok(Vec::new());
        }
        let caps = self.caps;
        let q = self.quoter();
        let definition = op.definition.as_ref();

        let mut columns: Vec<&str> = Vec::new();
        for row in &op.rows {
            check_columns(&op.table, row, definition)?;
            for (column, _) in row {
                if !columns.contains(&column.as_str()) {
                    columns.push(column.as_str());
                }
            }
        }
        // An identity column that never carries a value is left to the engine.
        columns.retain(|column| {
            !is_identity(definition, column)
                || op.rows.iter().any(|row| value_of(row, column).is_some_and(|v| !v.is_null()))
        });
        if columns.is_empty() {
            return Err(GenerateError::EmptyColumns {
                table: op.table.name.clone(),
            });
        }
        let explicit_identity =
            caps.identity_insert_toggle && columns.iter().any(|c| is_identity(definition, c));

        let (prefix, conflict) = insert_prefix(caps, op.ignore_duplicates)?;
        let batch = batch_size(caps, columns.len());
        trace!(
            rows = op.rows.len(),
            columns = columns.len(),
            batch,
            "Splitting bulk insert"
        );

        let head = format!("{prefix}{} ({})", q.table_name(&op.table), q.quote_list(&columns));
        let mut statements = Vec::with_capacity(op.rows.len().div_ceil(batch));
        for chunk in op.rows.chunks(batch) {
            let mut binds = self.binds();
            let tuples: Vec<Vec<String>> = chunk
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| {
                            let spec = column_of(definition, column);
                            match value_of(row, column) {
                                Some(value) => self.bind(&mut binds, value, spec),
                                None => self.bind(&mut binds, &SqlValue::Null, spec),
                            }
                        })
                        .collect()
                })
                .collect();

            let mut sql = head.clone();
            if caps.multi_row_values {
                let rows: Vec<String> = tuples.iter().map(|t| format!("({})", t.join(", "))).collect();
                sql.push_str(" VALUES ");
                sql.push_str(&rows.join(", "));
            } else {
                let from = caps.dual_table.map(|d| format!(" FROM {d}")).unwrap_or_default();
                let selects: Vec<String> = tuples
                    .iter()
                    .map(|t| format!("SELECT {}{from}", t.join(", ")))
                    .collect();
                sql.push(' ');
                sql.push_str(&selects.join(" UNION ALL "));
            }
            sql.push_str(conflict);

            let statement = binds.finish(sql);
            statements.push(if explicit_identity {
                self.with_identity_insert(&op.table, statement)
            } else {
                statement
            });
        }
        Ok(statements)
    }

    pub(super) fn update(
        &self,
        op: &UpdateOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let caps = self.caps;
        let q = self.quoter();
        let definition = op.definition.as_ref();
        check_columns(&op.table, &op.values, definition)?;

        let mut assignments = Vec::with_capacity(op.values.len());
        for (column, value) in &op.values {
            if caps.identity_insert_toggle && is_identity(definition, column) {
                diag.unsupported(format!(
                    "identity column '{column}' cannot be updated; assignment dropped"
                ));
                continue;
            }
            assignments.push((column, value));
        }
        if assignments.is_empty() {
            return Err(GenerateError::EmptyAssignment {
                table: op.table.name.clone(),
            });
        }

        let table = q.table_name(&op.table);
        let mut binds = self.binds();
        let mut sql = String::from("UPDATE ");
        if let (Some(n), RowLimit::Top) = (op.limit, caps.update_limit) {
            sql.push_str(&format!("TOP({n}) "));
        }
        sql.push_str(&table);
        sql.push_str(" SET ");
        let sets: Vec<String> = assignments
            .iter()
            .map(|(column, value)| {
                format!(
                    "{} = {}",
                    q.quote(column),
                    self.bind(&mut binds, value, column_of(definition, column))
                )
            })
            .collect();
        sql.push_str(&sets.join(", "));
        if op.returning && caps.returning == Returning::OutputInserted {
            sql.push_str(" OUTPUT INSERTED.*");
        }
        sql.push_str(&self.limited_where(
            &table,
            op.predicate.as_ref(),
            definition,
            op.limit.map(|n| (n, caps.update_limit)),
            &mut binds,
            diag,
        )?);
        if op.returning {
            self.returning_suffix(&mut sql, diag);
        }
        Ok(vec![binds.finish(sql)])
    }

    pub(super) fn delete(
        &self,
        op: &DeleteOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        if op.truncate {
            return Ok(vec![self.truncate(op, diag)]);
        }
        let caps = self.caps;
        let table = self.quoter().table_name(&op.table);
        let mut binds = self.binds();
        let mut sql = String::from("DELETE ");
        if let (Some(n), RowLimit::Top) = (op.limit, caps.delete_limit) {
            sql.push_str(&format!("TOP({n}) "));
        }
        sql.push_str("FROM ");
        sql.push_str(&table);
        sql.push_str(&self.limited_where(
            &table,
            op.predicate.as_ref(),
            op.definition.as_ref(),
            op.limit.map(|n| (n, caps.delete_limit)),
            &mut binds,
            diag,
        )?);
        Ok(vec![binds.finish(sql)])
    }

    fn truncate(&self, op: &DeleteOp, diag: &mut Diagnostics) -> GeneratedStatement {
        let caps = self.caps;
        let table = self.quoter().table_name(&op.table);
        if op.predicate.is_some() || op.limit.is_some() {
            diag.limitation("TRUNCATE empties the whole table; filter and limit ignored");
        }
        if !caps.truncate {
            if op.cascade || op.restart_identity {
                diag.unsupported("TRUNCATE options dropped");
            }
            return GeneratedStatement::plain(format!("DELETE FROM {table}"));
        }

        let mut sql = format!("TRUNCATE TABLE {table}");
        if op.restart_identity {
            if caps.truncate_options {
                sql.push_str(" RESTART IDENTITY");
            } else {
                diag.unsupported("TRUNCATE .. RESTART IDENTITY dropped");
            }
        }
        if op.cascade {
            if caps.truncate_options {
                sql.push_str(" CASCADE");
            } else {
                diag.unsupported("TRUNCATE .. CASCADE dropped");
            }
        }
        GeneratedStatement::plain(sql)
    }

    /// Renders the WHERE clause of a row-limited UPDATE or DELETE.
    ///
    /// `TOP(n)` is rendered by the caller, before the table name.
    fn limited_where(
        &self,
        table: &str,
        predicate: Option<&Predicate>,
        definition: Option<&TableSpec>,
        limit: Option<(u64, RowLimit)>,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        let clause = self.where_clause(predicate, definition, binds, diag)?;
        let Some((n, strategy)) = limit else {
            return Ok(clause);
        };
        Ok(match strategy {
            RowLimit::Native => format!("{clause} LIMIT {n}"),
            RowLimit::Top => clause,
            RowLimit::RowIdSubquery { row_id } => {
                format!(" WHERE {row_id} IN (SELECT {row_id} FROM {table}{clause} LIMIT {n})")
            }
            RowLimit::RowNumSubquery => {
                let filter = match predicate {
                    Some(_) => format!("({}) AND ", clause.trim_start_matches(" WHERE ")),
                    None => String::new(),
                };
                format!(" WHERE ROWID IN (SELECT ROWID FROM {table} WHERE {filter}ROWNUM <= {n})")
            }
            RowLimit::Unsupported => {
                diag.unsupported(format!("row limit {n} dropped"));
                clause
            }
        })
    }
}
