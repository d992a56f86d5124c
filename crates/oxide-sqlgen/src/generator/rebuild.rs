//! Table rebuild through a shadow copy, for engines that cannot alter columns
//! in place.

use tracing::trace;

use super::Generator;
use crate::error::{Diagnostics, Result};
use crate::schema::TableSpec;
use crate::statement::{GeneratedStatement, StatementMarker};

/// Fixed statements of a rebuild, before the indexes are recreated.
const REBUILD_STEPS: usize = 6;

impl Generator<'_> {
    /// Recreates the table as `target`, carrying the data across.
    ///
    /// `copy` pairs each target column with the source column it is filled
    /// from. Columns of `target` missing from `copy` take their default.
    pub(super) fn rebuild(
        &self,
        target: &TableSpec,
        copy: &[(String, String)],
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        target.validate()?;
        let q = self.quoter();
        let table = target.table_ref();
        let backup = target.renamed(format!("{}_backup", target.name));
        let backup_ref = backup.table_ref();
        let (table_name, backup_name) = (q.table_name(&table), q.table_name(&backup_ref));

        let targets: Vec<&str> = copy.iter().map(|(to, _)| to.as_str()).collect();
        let sources: Vec<&str> = copy.iter().map(|(_, from)| from.as_str()).collect();
        let targets = q.quote_list(&targets);

        let mut sql = vec![
            self.create_table_sql(&backup, false, diag),
            format!(
                "INSERT INTO {backup_name} ({targets}) SELECT {} FROM {table_name}",
                q.quote_list(&sources)
            ),
            format!("DROP TABLE {table_name}"),
            self.create_table_sql(target, false, diag),
            format!("INSERT INTO {table_name} ({targets}) SELECT {targets} FROM {backup_name}"),
            format!("DROP TABLE {backup_name}"),
        ];
        sql.extend(
            target
                .indexes
                .iter()
                .map(|index| self.create_index_sql(&table, index)),
        );

        let of = REBUILD_STEPS + target.indexes.len();
        trace!(table = %target.name, steps = of, "Rebuilding table");
        Ok(sql
            .into_iter()
            .enumerate()
            .map(|(i, sql)| {
                GeneratedStatement::plain(sql).marked(StatementMarker::RebuildStep { step: i + 1, of })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectCapabilities, Version};
    use crate::naming::TableRef;
    use crate::operation::{ChangeColumnOp, RemoveColumnOp, RenameColumnOp};
    use crate::schema::{bigint, string, text, IndexSpec, TableBuilder};
    use crate::types::TypeRegistry;

    fn users() -> TableSpec {
        TableBuilder::new()
            .name("users")
            .column(bigint("id").primary_key().build())
            .column(string("email", 255).not_null().build())
            .column(string("nickname", 64).build())
            .index(IndexSpec::new(["email"]).named("users_email"))
            .build()
    }

    fn sqlite_3_24() -> DialectCapabilities {
        DialectCapabilities::for_dialect(Dialect::Sqlite, Version::new(3, 24, 0))
    }

    #[test]
    fn test_remove_column_rebuild() {
        let caps = sqlite_3_24();
        let types = TypeRegistry::new();
        let op = RemoveColumnOp {
            table: TableRef::new("users"),
            column: String::from("nickname"),
            current: Some(users()),
            bound_constraints: Vec::new(),
            identity: false,
        };
        let generated = Generator::new(&caps, &types).generate(&op.into()).unwrap();
        assert_eq!(
            generated.sql(),
            vec![
                "CREATE TABLE \"users_backup\" (\"id\" BIGINT NOT NULL PRIMARY KEY, \"email\" VARCHAR(255) NOT NULL)",
                "INSERT INTO \"users_backup\" (\"id\", \"email\") SELECT \"id\", \"email\" FROM \"users\"",
                "DROP TABLE \"users\"",
                "CREATE TABLE \"users\" (\"id\" BIGINT NOT NULL PRIMARY KEY, \"email\" VARCHAR(255) NOT NULL)",
                "INSERT INTO \"users\" (\"id\", \"email\") SELECT \"id\", \"email\" FROM \"users_backup\"",
                "DROP TABLE \"users_backup\"",
                "CREATE INDEX \"users_email\" ON \"users\" (\"email\")",
            ]
        );
        assert_eq!(
            generated.statements[6].marker,
            Some(StatementMarker::RebuildStep { step: 7, of: 7 })
        );
        assert_eq!(
            generated.statements[0].marker,
            Some(StatementMarker::RebuildStep { step: 1, of: 7 })
        );
    }

    #[test]
    fn test_rename_column_rebuild_maps_sources() {
        let caps = sqlite_3_24();
        let types = TypeRegistry::new();
        let op = RenameColumnOp {
            table: TableRef::new("users"),
            from: String::from("email"),
            to: String::from("mail"),
            current: Some(users()),
        };
        let generated = Generator::new(&caps, &types).generate(&op.into()).unwrap();
        assert_eq!(
            generated.statements[1].sql,
            "INSERT INTO \"users_backup\" (\"id\", \"mail\", \"nickname\") SELECT \"id\", \"email\", \"nickname\" FROM \"users\""
        );
        assert_eq!(
            generated.statements[6].sql,
            "CREATE INDEX \"users_email\" ON \"users\" (\"mail\")"
        );
    }

    #[test]
    fn test_change_column_rebuild_rejects_unknown_column() {
        let caps = DialectCapabilities::latest(Dialect::Sqlite);
        let types = TypeRegistry::new();
        let op = ChangeColumnOp {
            table: TableRef::new("users"),
            column: text("bio").build(),
            current: Some(users()),
            default_constraint: None,
        };
        let err = Generator::new(&caps, &types).generate(&op.into()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GenerateError::UnknownColumn { ref column, .. } if column == "bio"
        ));
    }

    #[test]
    fn test_change_column_rebuild() {
        let caps = DialectCapabilities::latest(Dialect::Sqlite);
        let types = TypeRegistry::new();
        let op = ChangeColumnOp {
            table: TableRef::new("users"),
            column: text("nickname").not_null().default_str("anon").build(),
            current: Some(users()),
            default_constraint: None,
        };
        let generated = Generator::new(&caps, &types).generate(&op.into()).unwrap();
        assert_eq!(generated.statements.len(), 7);
        assert!(generated.statements[3]
            .sql
            .ends_with("\"nickname\" TEXT DEFAULT 'anon' NOT NULL)"));
    }
}
