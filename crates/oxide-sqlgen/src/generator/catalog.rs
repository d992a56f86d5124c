//! Catalog lookups for indexes and constraints.

use super::Generator;
use crate::dialect::CatalogSource;
use crate::error::{Diagnostics, GenerateError, Result};
use crate::operation::{ConstraintType, ShowConstraintsOp, ShowIndexesOp};
use crate::statement::GeneratedStatement;
use crate::value::escape_string;

/// `information_schema.TABLE_CONSTRAINTS.CONSTRAINT_TYPE` spelling.
const fn information_schema_kind(kind: ConstraintType) -> Option<&'static str> {
    match kind {
        ConstraintType::PrimaryKey => Some("PRIMARY KEY"),
        ConstraintType::Unique => Some("UNIQUE"),
        ConstraintType::ForeignKey => Some("FOREIGN KEY"),
        ConstraintType::Check => Some("CHECK"),
        ConstraintType::Default => None,
    }
}

impl Generator<'_> {
    pub(super) fn show_indexes(&self, op: &ShowIndexesOp) -> Result<Vec<GeneratedStatement>> {
        let q = self.quoter();
        let table = q.catalog_literal(&op.table.name);
        let schema = op.table.schema.as_deref().map(|s| q.catalog_literal(s));

        let sql = match self.caps.catalog {
            CatalogSource::PgCatalog => format!(
                "SELECT indexname, indexdef FROM pg_indexes WHERE schemaname = {} AND tablename = {table} ORDER BY indexname",
                schema.as_deref().unwrap_or("current_schema()")
            ),
            CatalogSource::InformationSchemaStatistics => format!(
                "SELECT INDEX_NAME, NON_UNIQUE, COLUMN_NAME, SEQ_IN_INDEX FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {table} ORDER BY INDEX_NAME, SEQ_IN_INDEX",
                schema.as_deref().unwrap_or("DATABASE()")
            ),
            CatalogSource::SqliteMaster => format!(
                "SELECT name, sql FROM {} WHERE type = 'index' AND tbl_name = {table} ORDER BY name",
                self.sqlite_master(op.table.schema.as_deref())
            ),
            CatalogSource::SysViews => format!(
                "SELECT I.name AS index_name, I.is_unique, I.is_primary_key, C.name AS column_name \
                 FROM sys.indexes I \
                 INNER JOIN sys.index_columns IC ON IC.object_id = I.object_id AND IC.index_id = I.index_id \
                 INNER JOIN sys.columns C ON C.object_id = IC.object_id AND C.column_id = IC.column_id \
                 WHERE I.object_id = OBJECT_ID({}) ORDER BY I.name, IC.key_ordinal",
                self.object_literal(&op.table)
            ),
            CatalogSource::DataDictionary => {
                let (prefix, owner) = dictionary_scope(schema.as_deref(), "i");
                format!(
                    "SELECT i.INDEX_NAME, i.UNIQUENESS, c.COLUMN_NAME FROM {prefix}_INDEXES i \
                     JOIN {prefix}_IND_COLUMNS c ON c.INDEX_NAME = i.INDEX_NAME AND c.TABLE_NAME = i.TABLE_NAME \
                     WHERE i.TABLE_NAME = {table}{owner} ORDER BY i.INDEX_NAME, c.COLUMN_POSITION"
                )
            }
            CatalogSource::InformationSchema => {
                return Err(GenerateError::mismatch(self.caps.dialect, "index metadata lookup"));
            }
        };
        Ok(vec![GeneratedStatement::plain(sql)])
    }

    pub(super) fn show_constraints(
        &self,
        op: &ShowConstraintsOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        if op.kind == Some(ConstraintType::Default) {
            return self.show_default_constraints(op).map(|s| vec![s]);
        }
        let q = self.quoter();
        let table = q.catalog_literal(&op.table.name);
        let schema = op.table.schema.as_deref().map(|s| q.catalog_literal(s));
        let column = op.column.as_deref().map(|c| q.catalog_literal(c));

        let sql = match self.caps.catalog {
            CatalogSource::InformationSchema | CatalogSource::InformationSchemaStatistics => {
                let mut sql = String::from(
                    "SELECT tc.CONSTRAINT_NAME, tc.CONSTRAINT_TYPE, kcu.COLUMN_NAME \
                     FROM information_schema.TABLE_CONSTRAINTS tc \
                     LEFT JOIN information_schema.KEY_COLUMN_USAGE kcu ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
                     AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA AND kcu.TABLE_NAME = tc.TABLE_NAME",
                );
                sql.push_str(&format!(" WHERE tc.TABLE_NAME = {table}"));
                match (&schema, self.caps.catalog) {
                    (Some(s), _) => sql.push_str(&format!(" AND tc.TABLE_SCHEMA = {s}")),
                    (None, CatalogSource::InformationSchemaStatistics) => {
                        sql.push_str(" AND tc.TABLE_SCHEMA = DATABASE()");
                    }
                    (None, _) => {}
                }
                if let Some(kind) = op.kind.and_then(information_schema_kind) {
                    sql.push_str(&format!(" AND tc.CONSTRAINT_TYPE = '{kind}'"));
                }
                if let Some(ref c) = column {
                    sql.push_str(&format!(" AND kcu.COLUMN_NAME = {c}"));
                }
                sql
            }
            CatalogSource::PgCatalog => {
                let mut sql = format!(
                    "SELECT con.conname AS constraint_name, con.contype AS constraint_type, \
                     pg_get_constraintdef(con.oid) AS definition FROM pg_constraint con \
                     JOIN pg_class rel ON rel.oid = con.conrelid \
                     JOIN pg_namespace nsp ON nsp.oid = rel.relnamespace \
                     WHERE rel.relname = {table} AND nsp.nspname = {}",
                    schema.as_deref().unwrap_or("current_schema()")
                );
                if let Some(kind) = op.kind {
                    let code = match kind {
                        ConstraintType::PrimaryKey => "p",
                        ConstraintType::Unique => "u",
                        ConstraintType::ForeignKey => "f",
                        ConstraintType::Check | ConstraintType::Default => "c",
                    };
                    sql.push_str(&format!(" AND con.contype = '{code}'"));
                }
                if let Some(ref c) = column {
                    sql.push_str(&format!(
                        " AND EXISTS (SELECT 1 FROM pg_attribute a WHERE a.attrelid = con.conrelid \
                         AND a.attnum = ANY(con.conkey) AND a.attname = {c})"
                    ));
                }
                sql
            }
            CatalogSource::SqliteMaster => {
                if op.kind.is_some() || op.column.is_some() {
                    diag.limitation(
                        "constraints are only available as CREATE TABLE text; filters ignored",
                    );
                }
                format!(
                    "SELECT sql FROM {} WHERE type = 'table' AND tbl_name = {table}",
                    self.sqlite_master(op.table.schema.as_deref())
                )
            }
            CatalogSource::SysViews => {
                let mut sql = format!(
                    "SELECT o.name AS constraint_name, o.type_desc AS constraint_type FROM sys.objects o \
                     WHERE o.parent_object_id = OBJECT_ID({}) AND o.type IN ('PK', 'UQ', 'F', 'C', 'D')",
                    self.object_literal(&op.table)
                );
                if let Some(kind) = op.kind {
                    let code = match kind {
                        ConstraintType::PrimaryKey => "PK",
                        ConstraintType::Unique => "UQ",
                        ConstraintType::ForeignKey => "F",
                        ConstraintType::Check => "C",
                        ConstraintType::Default => "D",
                    };
                    sql.push_str(&format!(" AND o.type = '{code}'"));
                }
                if let Some(ref c) = column {
                    sql.push_str(&format!(
                        " AND EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.CONSTRAINT_COLUMN_USAGE ccu \
                         WHERE ccu.CONSTRAINT_NAME = o.name AND ccu.COLUMN_NAME = N{c})"
                    ));
                }
                sql
            }
            CatalogSource::DataDictionary => {
                let (prefix, owner) = dictionary_scope(schema.as_deref(), "c");
                let mut sql = format!(
                    "SELECT c.CONSTRAINT_NAME, c.CONSTRAINT_TYPE, cc.COLUMN_NAME FROM {prefix}_CONSTRAINTS c \
                     LEFT JOIN {prefix}_CONS_COLUMNS cc ON cc.CONSTRAINT_NAME = c.CONSTRAINT_NAME \
                     WHERE c.TABLE_NAME = {table}{owner}"
                );
                if let Some(kind) = op.kind {
                    let code = match kind {
                        ConstraintType::PrimaryKey => "P",
                        ConstraintType::Unique => "U",
                        ConstraintType::ForeignKey => "R",
                        ConstraintType::Check | ConstraintType::Default => "C",
                    };
                    sql.push_str(&format!(" AND c.CONSTRAINT_TYPE = '{code}'"));
                }
                if let Some(ref c) = column {
                    sql.push_str(&format!(" AND cc.COLUMN_NAME = {c}"));
                }
                sql
            }
        };
        Ok(vec![GeneratedStatement::plain(sql)])
    }

    /// Named default constraints, which only SQL Server keeps as objects.
    ///
    /// The result feeds `RemoveColumnOp::bound_constraints` and
    /// `ChangeColumnOp::default_constraint`.
    fn show_default_constraints(&self, op: &ShowConstraintsOp) -> Result<GeneratedStatement> {
        if self.caps.catalog != CatalogSource::SysViews {
            return Err(GenerateError::mismatch(
                self.caps.dialect,
                "named default constraint lookup",
            ));
        }
        let mut sql = format!(
            "SELECT dc.name AS constraint_name, c.name AS column_name FROM sys.default_constraints dc \
             INNER JOIN sys.columns c ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id \
             WHERE dc.parent_object_id = OBJECT_ID({})",
            self.object_literal(&op.table)
        );
        if let Some(ref column) = op.column {
            sql.push_str(&format!(" AND c.name = N{}", escape_string(column)));
        }
        Ok(GeneratedStatement::plain(sql))
    }

    fn sqlite_master(&self, schema: Option<&str>) -> String {
        match schema {
            Some(s) => format!("{}.sqlite_master", self.quoter().quote(s)),
            None => String::from("sqlite_master"),
        }
    }
}

/// View prefix and owner filter for the Oracle data dictionary.
fn dictionary_scope(schema: Option<&str>, alias: &str) -> (&'static str, String) {
    match schema {
        Some(owner) => ("ALL", format!(" AND {alias}.OWNER = {owner}")),
        None => ("USER", String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectCapabilities};
    use crate::naming::TableRef;
    use crate::operation::OperationDescriptor;
    use crate::statement::Generated;
    use crate::types::TypeRegistry;

    fn run(dialect: Dialect, op: impl Into<OperationDescriptor>) -> Result<Generated> {
        let caps = DialectCapabilities::latest(dialect);
        let types = TypeRegistry::new();
        Generator::new(&caps, &types).generate(&op.into())
    }

    fn indexes(table: TableRef) -> ShowIndexesOp {
        ShowIndexesOp { table }
    }

    fn constraints(column: Option<&str>, kind: Option<ConstraintType>) -> ShowConstraintsOp {
        ShowConstraintsOp {
            table: TableRef::new("users"),
            column: column.map(String::from),
            kind,
        }
    }

    #[test]
    fn test_show_indexes() {
        assert_eq!(
            run(Dialect::Sqlite, indexes(TableRef::new("users"))).unwrap().sql(),
            vec!["SELECT name, sql FROM sqlite_master WHERE type = 'index' AND tbl_name = 'users' ORDER BY name"]
        );
        assert_eq!(
            run(Dialect::Postgres, indexes(TableRef::new("users").in_schema("app")))
                .unwrap()
                .sql(),
            vec!["SELECT indexname, indexdef FROM pg_indexes WHERE schemaname = 'app' AND tablename = 'users' ORDER BY indexname"]
        );
        let oracle = run(Dialect::Oracle, indexes(TableRef::new("users"))).unwrap();
        assert!(oracle.sql()[0].contains("FROM USER_INDEXES i"));
        assert!(oracle.sql()[0].contains("WHERE i.TABLE_NAME = 'USERS' ORDER BY"));

        let mssql = run(Dialect::MsSql, indexes(TableRef::new("users"))).unwrap();
        assert!(mssql.sql()[0].contains("WHERE I.object_id = OBJECT_ID(N'[users]')"));

        let err = run(Dialect::Generic, indexes(TableRef::new("users"))).unwrap_err();
        assert!(matches!(err, GenerateError::DialectMismatch { dialect: Dialect::Generic, .. }));
    }

    #[test]
    fn test_show_constraints_filters() {
        let mysql = run(Dialect::MySql, constraints(Some("email"), Some(ConstraintType::Unique))).unwrap();
        let sql = mysql.sql()[0];
        assert!(sql.contains("WHERE tc.TABLE_NAME = 'users' AND tc.TABLE_SCHEMA = DATABASE()"));
        assert!(sql.ends_with("AND tc.CONSTRAINT_TYPE = 'UNIQUE' AND kcu.COLUMN_NAME = 'email'"));

        let oracle = run(Dialect::Oracle, constraints(Some("email"), Some(ConstraintType::ForeignKey))).unwrap();
        assert!(oracle.sql()[0].ends_with(
            "WHERE c.TABLE_NAME = 'USERS' AND c.CONSTRAINT_TYPE = 'R' AND cc.COLUMN_NAME = 'EMAIL'"
        ));

        let owned = ShowConstraintsOp {
            table: TableRef::new("users").in_schema("app"),
            column: None,
            kind: None,
        };
        let oracle = run(Dialect::Oracle, owned).unwrap();
        assert!(oracle.sql()[0].contains("FROM ALL_CONSTRAINTS c"));
        assert!(oracle.sql()[0].ends_with("AND c.OWNER = 'APP'"));

        let pg = run(Dialect::Postgres, constraints(None, Some(ConstraintType::PrimaryKey))).unwrap();
        assert!(pg.sql()[0].ends_with("nsp.nspname = current_schema() AND con.contype = 'p'"));

        let sqlite = run(Dialect::Sqlite, constraints(Some("email"), None)).unwrap();
        assert_eq!(
            sqlite.sql(),
            vec!["SELECT sql FROM sqlite_master WHERE type = 'table' AND tbl_name = 'users'"]
        );
        assert_eq!(sqlite.warnings.len(), 1);
    }

    #[test]
    fn test_default_constraint_lookup() {
        let mssql = run(Dialect::MsSql, constraints(Some("status"), Some(ConstraintType::Default))).unwrap();
        assert!(mssql.sql()[0].starts_with("SELECT dc.name AS constraint_name"));
        assert!(mssql.sql()[0].ends_with(
            "WHERE dc.parent_object_id = OBJECT_ID(N'[users]') AND c.name = N'status'"
        ));

        let err = run(Dialect::Postgres, constraints(None, Some(ConstraintType::Default))).unwrap_err();
        assert!(!err.is_configuration());
    }
}
