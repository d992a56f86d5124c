//! Insert-or-update, one strategy per engine.
//!
//! The conflict target is resolved first: explicit conflict fields, then a
//! primary key whose columns all carry values, then the first unique key
//! that does. Identity columns are never assigned on the update path.

use super::{check_columns, column_of, is_identity, value_of, Generator};
use crate::dialect::UpsertStrategy;
use crate::error::{Diagnostics, GenerateError, Result};
use crate::operation::UpsertOp;
use crate::statement::{BindCollector, GeneratedStatement, StatementMarker};
use crate::value::{BindValue, SqlValue, WireType};

/// Columns an upsert writes, resolved from the descriptor.
struct Plan<'o> {
    /// Inserted `(column, value)` pairs; NULL identity values are dropped.
    insert: Vec<(&'o str, &'o SqlValue)>,
    /// Conflict target columns.
    target: Vec<&'o str>,
    /// Columns assigned when the row exists.
    update: Vec<&'o str>,
}

impl<'o> Plan<'o> {
    fn resolve(op: &'o UpsertOp) -> Result<Self> {
        let definition = op.definition.as_ref();
        let has_value = |c: &str| value_of(&op.values, c).is_some_and(|v| !v.is_null());
        let missing_target = || GenerateError::MissingConflictTarget {
            table: op.table.name.clone(),
        };

        let target: Vec<&str> = match (&op.conflict_fields, definition) {
            (Some(fields), _) => {
                if fields.is_empty() {
                    return Err(missing_target());
                }
                if let Some(field) = fields.iter().find(|f| !has_value(f.as_str())) {
                    return Err(GenerateError::InvalidDescriptor(format!(
                        "conflict field '{field}' has no value"
                    )));
                }
                fields.iter().map(String::as_str).collect()
            }
            (None, Some(table)) => {
                let key = table.primary_key();
                if !key.is_empty() && key.iter().all(|&c| has_value(c)) {
                    key
                } else {
                    let unique = table
                        .all_unique_keys()
                        .into_iter()
                        .find(|k| {
                            !k.columns.is_empty() && k.columns.iter().all(|c| has_value(c.as_str()))
                        })
                        .ok_or_else(missing_target)?;
                    unique
                        .columns
                        .iter()
                        .filter_map(|c| table.column(c).map(|spec| spec.name.as_str()))
                        .collect()
                }
            }
            (None, None) => return Err(missing_target()),
        };

        let update: Vec<&str> = match &op.update_columns {
            Some(columns) => {
                if let Some(column) = columns.iter().find(|c| value_of(&op.values, c).is_none()) {
                    return Err(GenerateError::InvalidDescriptor(format!(
                        "update column '{column}' has no value"
                    )));
                }
                columns.iter().map(String::as_str).collect()
            }
            None => op
                .values
                .iter()
                .map(|(c, _)| c.as_str())
                .filter(|c| !target.contains(c))
                .collect(),
        };
        let update = update
            .into_iter()
            .filter(|c| !is_identity(definition, c))
            .collect();

        let insert = op
            .values
            .iter()
            .filter(|(c, v)| !(v.is_null() && is_identity(definition, c)))
            .map(|(c, v)| (c.as_str(), v))
            .collect();

        Ok(Self {
            insert,
            target,
            update,
        })
    }

    fn insert_columns(&self) -> Vec<&'o str> {
        self.insert.iter().map(|(c, _)| *c).collect()
    }

    fn value(&self, column: &str) -> &'o SqlValue {
        self.insert
            .iter()
            .find(|(c, _)| *c == column)
            .map_or(&SqlValue::Null, |(_, v)| *v)
    }
}

impl Generator<'_> {
    pub(super) fn upsert(
        &self,
        op: &UpsertOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        check_columns(&op.table, &op.values, op.definition.as_ref())?;
        if op.values.is_empty() {
            return Err(GenerateError::EmptyColumns {
                table: op.table.name.clone(),
            });
        }
        let plan = Plan::resolve(op)?;
        let strategy = self.caps.upsert;

        let statements = match strategy {
            UpsertStrategy::OnConflict => vec![self.on_conflict(op, &plan, diag)],
            UpsertStrategy::OnDuplicateKey => vec![self.on_duplicate_key(op, &plan, diag)],
            UpsertStrategy::Merge => vec![self.merge(op, &plan)],
            UpsertStrategy::Procedural => {
                if op.returning {
                    diag.unsupported("returning the written row is not supported by the PL/SQL upsert");
                }
                vec![self.procedural(op, &plan)]
            }
            UpsertStrategy::DoubleStatement => {
                if op.returning {
                    diag.unsupported("returning the written row is not supported");
                }
                diag.limitation(
                    "upsert runs INSERT then UPDATE; the outcome cannot be told apart",
                );
                self.double_statement(op, &plan)
            }
        };
        Ok(statements
            .into_iter()
            .map(|s| match s.marker {
                Some(_) => s,
                None => s.marked(StatementMarker::Upsert(strategy)),
            })
            .collect())
    }

    /// `INSERT INTO t (cols) VALUES (binds)` into `binds`.
    fn upsert_insert(&self, op: &UpsertOp, plan: &Plan<'_>, binds: &mut BindCollector) -> String {
        let q = self.quoter();
        let placeholders: Vec<String> = plan
            .insert
            .iter()
            .map(|(c, v)| self.bind(binds, v, column_of(op.definition.as_ref(), c)))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            q.table_name(&op.table),
            q.quote_list(&plan.insert_columns()),
            placeholders.join(", ")
        )
    }

    fn on_conflict(&self, op: &UpsertOp, plan: &Plan<'_>, diag: &mut Diagnostics) -> GeneratedStatement {
        let q = self.quoter();
        let mut binds = self.binds();
        let mut sql = self.upsert_insert(op, plan, &mut binds);
        sql.push_str(&format!(" ON CONFLICT ({})", q.quote_list(&plan.target)));
        if plan.update.is_empty() {
            sql.push_str(" DO NOTHING");
        } else {
            let sets: Vec<String> = plan
                .update
                .iter()
                .map(|c| {
                    let column = q.quote(c);
                    format!("{column} = EXCLUDED.{column}")
                })
                .collect();
            sql.push_str(" DO UPDATE SET ");
            sql.push_str(&sets.join(", "));
        }
        if op.returning {
            self.returning_suffix(&mut sql, diag);
        }
        binds.finish(sql)
    }

    fn on_duplicate_key(
        &self,
        op: &UpsertOp,
        plan: &Plan<'_>,
        diag: &mut Diagnostics,
    ) -> GeneratedStatement {
        let q = self.quoter();
        let mut binds = self.binds();
        let mut sql = self.upsert_insert(op, plan, &mut binds);
        let sets: Vec<String> = if plan.update.is_empty() {
            // No-op assignment keeps the duplicate silent.
            plan.target
                .iter()
                .take(1)
                .map(|c| {
                    let column = q.quote(c);
                    format!("{column} = {column}")
                })
                .collect()
        } else {
            plan.update
                .iter()
                .map(|c| {
                    let column = q.quote(c);
                    format!("{column} = VALUES({column})")
                })
                .collect()
        };
        sql.push_str(" ON DUPLICATE KEY UPDATE ");
        sql.push_str(&sets.join(", "));
        if op.returning {
            self.returning_suffix(&mut sql, diag);
        }
        binds.finish(sql)
    }

    fn merge(&self, op: &UpsertOp, plan: &Plan<'_>) -> GeneratedStatement {
        let q = self.quoter();
        let definition = op.definition.as_ref();
        let target_alias = q.quote(&format!("{}_target", op.table.name));
        let source_alias = q.quote(&format!("{}_source", op.table.name));
        let columns = plan.insert_columns();
        let mut binds = self.binds();

        let placeholders: Vec<String> = plan
            .insert
            .iter()
            .map(|(c, v)| self.bind(&mut binds, v, column_of(definition, c)))
            .collect();
        let join: Vec<String> = plan
            .target
            .iter()
            .map(|c| {
                let column = q.quote(c);
                format!("{target_alias}.{column} = {source_alias}.{column}")
            })
            .collect();
        let source_values: Vec<String> = columns
            .iter()
            .map(|c| format!("{source_alias}.{}", q.quote(c)))
            .collect();

        let mut sql = format!(
            "MERGE INTO {} WITH(HOLDLOCK) AS {target_alias} USING (VALUES ({})) AS {source_alias} ({}) ON {}",
            q.table_name(&op.table),
            placeholders.join(", "),
            q.quote_list(&columns),
            join.join(" AND ")
        );
        if !plan.update.is_empty() {
            let sets: Vec<String> = plan
                .update
                .iter()
                .map(|c| {
                    let column = q.quote(c);
                    format!("{target_alias}.{column} = {source_alias}.{column}")
                })
                .collect();
            sql.push_str(" WHEN MATCHED THEN UPDATE SET ");
            sql.push_str(&sets.join(", "));
        }
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({}) OUTPUT $action, INSERTED.*",
            q.quote_list(&columns),
            source_values.join(", ")
        ));

        let explicit_identity = self.caps.identity_insert_toggle
            && columns.iter().any(|c| is_identity(definition, c));
        if explicit_identity {
            return self.with_identity_insert(&op.table, binds.finish(sql));
        }
        sql.push(';');
        binds.finish(sql)
    }

    /// PL/SQL block; the OUT bind receives 1 when the row was created and
    /// 0 when it was updated.
    fn procedural(&self, op: &UpsertOp, plan: &Plan<'_>) -> GeneratedStatement {
        let q = self.quoter();
        let definition = op.definition.as_ref();
        let table = q.table_name(&op.table);
        let mut binds = self.binds();

        let join: Vec<String> = plan
            .target
            .iter()
            .map(|c| {
                let placeholder = self.bind(&mut binds, plan.value(c), column_of(definition, c));
                format!("{} = {placeholder}", q.quote(c))
            })
            .collect();
        let insert = self.upsert_insert(op, plan, &mut binds);
        let created = binds.push(BindValue::output(WireType::Int));
        let sets: Vec<String> = plan
            .update
            .iter()
            .map(|c| {
                let placeholder = self.bind(&mut binds, plan.value(c), column_of(definition, c));
                format!("{} = {placeholder}", q.quote(c))
            })
            .collect();

        let mut sql = format!(
            "DECLARE CURSOR c_upsert IS SELECT ROWID FROM {table} WHERE {} FOR UPDATE; v_rowid ROWID; \
             BEGIN OPEN c_upsert; FETCH c_upsert INTO v_rowid; \
             IF c_upsert%NOTFOUND THEN {insert}; {created} := 1; ELSE ",
            join.join(" AND ")
        );
        if !sets.is_empty() {
            sql.push_str(&format!(
                "UPDATE {table} SET {} WHERE ROWID = v_rowid; ",
                sets.join(", ")
            ));
        }
        sql.push_str(&format!("{created} := 0; END IF; CLOSE c_upsert; END;"));
        binds.finish(sql)
    }

    fn double_statement(&self, op: &UpsertOp, plan: &Plan<'_>) -> Vec<GeneratedStatement> {
        let q = self.quoter();
        let definition = op.definition.as_ref();

        let mut insert_binds = self.binds();
        let insert = self.upsert_insert(op, plan, &mut insert_binds);

        let mut binds = self.binds();
        let assigned = if plan.update.is_empty() {
            &plan.target[..1]
        } else {
            plan.update.as_slice()
        };
        let sets: Vec<String> = assigned
            .iter()
            .map(|c| {
                let placeholder = self.bind(&mut binds, plan.value(c), column_of(definition, c));
                format!("{} = {placeholder}", q.quote(c))
            })
            .collect();
        let join: Vec<String> = plan
            .target
            .iter()
            .map(|c| {
                let placeholder = self.bind(&mut binds, plan.value(c), column_of(definition, c));
                format!("{} = {placeholder}", q.quote(c))
            })
            .collect();
        let update = format!(
            "UPDATE {} SET {} WHERE {}",
            q.table_name(&op.table),
            sets.join(", "),
            join.join(" AND ")
        );
        vec![insert_binds.finish(insert), binds.finish(update)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectCapabilities};
    use crate::error::WarningKind;
    use crate::schema::{bigint, string, TableBuilder, TableSpec};
    use crate::statement::Generated;
    use crate::types::TypeRegistry;
    use crate::value::BindDirection;

    fn generate(dialect: Dialect, op: UpsertOp) -> Result<Generated> {
        let caps = DialectCapabilities::latest(dialect);
        let types = TypeRegistry::new();
        Generator::new(&caps, &types).generate(&op.into())
    }

    fn users() -> TableSpec {
        TableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().auto_increment().build())
            .column(string("email", 255).not_null().unique().build())
            .column(string("name", 64).build())
            .build()
    }

    fn by_email() -> UpsertOp {
        UpsertOp::new("users")
            .value("email", "a@b.com")
            .value("name", "Ann")
            .definition(users())
    }

    #[test]
    fn test_conflict_target_falls_back_to_unique_key() {
        let generated = generate(Dialect::Postgres, by_email()).unwrap();
        assert_eq!(
            generated.sql(),
            vec!["INSERT INTO \"users\" (\"email\", \"name\") VALUES ($1, $2) ON CONFLICT (\"email\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""]
        );
        assert_eq!(
            generated.statements[0].marker,
            Some(StatementMarker::Upsert(UpsertStrategy::OnConflict))
        );
    }

    #[test]
    fn test_missing_conflict_target() {
        let op = UpsertOp::new("users").value("name", "Ann").definition(users());
        let err = generate(Dialect::Postgres, op).unwrap_err();
        assert!(matches!(err, GenerateError::MissingConflictTarget { .. }));

        let err = generate(Dialect::Postgres, UpsertOp::new("users").value("name", "Ann")).unwrap_err();
        assert!(matches!(err, GenerateError::MissingConflictTarget { .. }));

        let op = UpsertOp::new("users").value("name", "Ann").conflict_on(["email"]);
        assert!(matches!(
            generate(Dialect::Postgres, op).unwrap_err(),
            GenerateError::InvalidDescriptor(_)
        ));
    }

    #[test]
    fn test_on_conflict_do_nothing_and_returning() {
        let op = UpsertOp {
            returning: true,
            ..UpsertOp::new("tags").value("slug", "rust").conflict_on(["slug"])
        };
        assert_eq!(
            generate(Dialect::Sqlite, op).unwrap().sql(),
            vec!["INSERT INTO \"tags\" (\"slug\") VALUES (?) ON CONFLICT (\"slug\") DO NOTHING RETURNING *"]
        );
    }

    #[test]
    fn test_on_duplicate_key() {
        assert_eq!(
            generate(Dialect::MySql, by_email()).unwrap().sql(),
            vec!["INSERT INTO `users` (`email`, `name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"]
        );
        let op = UpsertOp::new("tags").value("slug", "rust").conflict_on(["slug"]);
        assert_eq!(
            generate(Dialect::MySql, op).unwrap().sql(),
            vec!["INSERT INTO `tags` (`slug`) VALUES (?) ON DUPLICATE KEY UPDATE `slug` = `slug`"]
        );
    }

    #[test]
    fn test_merge() {
        let generated = generate(Dialect::MsSql, by_email()).unwrap();
        assert_eq!(
            generated.sql(),
            vec![concat!(
                "MERGE INTO [users] WITH(HOLDLOCK) AS [users_target] ",
                "USING (VALUES (@p1, @p2)) AS [users_source] ([email], [name]) ",
                "ON [users_target].[email] = [users_source].[email] ",
                "WHEN MATCHED THEN UPDATE SET [users_target].[name] = [users_source].[name] ",
                "WHEN NOT MATCHED THEN INSERT ([email], [name]) VALUES ([users_source].[email], [users_source].[name]) ",
                "OUTPUT $action, INSERTED.*;"
            )]
        );
        assert!(generated.statements[0].marker == Some(StatementMarker::Upsert(UpsertStrategy::Merge)));
    }

    #[test]
    fn test_merge_with_explicit_identity() {
        let op = UpsertOp::new("users")
            .value("id", 5)
            .value("email", "a@b.com")
            .definition(users());
        let generated = generate(Dialect::MsSql, op).unwrap();
        let stmt = &generated.statements[0];
        assert_eq!(stmt.marker, Some(StatementMarker::IdentityInsertToggled));
        assert!(stmt.sql.starts_with("SET IDENTITY_INSERT [users] ON; MERGE INTO [users]"));
        assert!(stmt.sql.contains("ON [users_target].[id] = [users_source].[id]"));
        assert!(stmt.sql.contains("UPDATE SET [users_target].[email] = [users_source].[email]"));
        assert!(!stmt.sql.contains("SET [users_target].[id]"));
        assert!(stmt.sql.ends_with("INSERTED.*; SET IDENTITY_INSERT [users] OFF;"));
    }

    #[test]
    fn test_procedural() {
        let generated = generate(Dialect::Oracle, by_email()).unwrap();
        let stmt = &generated.statements[0];
        assert_eq!(
            stmt.sql,
            concat!(
                "DECLARE CURSOR c_upsert IS SELECT ROWID FROM users WHERE email = :1 FOR UPDATE; v_rowid ROWID; ",
                "BEGIN OPEN c_upsert; FETCH c_upsert INTO v_rowid; ",
                "IF c_upsert%NOTFOUND THEN INSERT INTO users (email, name) VALUES (:2, :3); :4 := 1; ",
                "ELSE UPDATE users SET name = :5 WHERE ROWID = v_rowid; :4 := 0; END IF; CLOSE c_upsert; END;"
            )
        );
        assert_eq!(stmt.binds.len(), 5);
        assert_eq!(stmt.binds[3].direction, BindDirection::Out);
        assert_eq!(stmt.binds[4].value, SqlValue::Text(String::from("Ann")));
    }

    #[test]
    fn test_double_statement() {
        let generated = generate(Dialect::Generic, by_email()).unwrap();
        assert_eq!(
            generated.sql(),
            vec![
                "INSERT INTO users (email, name) VALUES (?, ?)",
                "UPDATE users SET name = ? WHERE email = ?",
            ]
        );
        assert_eq!(generated.warnings.len(), 1);
        assert_eq!(generated.warnings[0].kind, WarningKind::Limitation);
        assert!(generated
            .statements
            .iter()
            .all(|s| s.marker == Some(StatementMarker::Upsert(UpsertStrategy::DoubleStatement))));
        assert_eq!(
            generated.statements[1].binds[1].value,
            SqlValue::Text(String::from("a@b.com"))
        );
    }

    #[test]
    fn test_identity_never_updated() {
        let op = UpsertOp::new("users")
            .value("id", 5)
            .value("email", "a@b.com")
            .definition(users())
            .conflict_on(["email"]);
        let generated = generate(Dialect::Postgres, op).unwrap();
        assert!(generated.statements[0].sql.ends_with("DO NOTHING"));
    }
}
