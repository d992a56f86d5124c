//! SQLite.
//!
//! SQLite stores any value in any column, so most canonical types keep their
//! ANSI name and only affinity matters. Dates travel as ISO-8601 text.

use super::{
    ansi, AlterColumnSyntax, BeginSyntax, CatalogSource, Dialect, DialectCapabilities,
    DropCascade, DropColumnStrategy, IdentitySyntax, InsertIgnore, IsolationSyntax, OffsetOnly,
    Pagination, RenameColumnSyntax, Returning, RowLimit, UpsertStrategy, Version,
};
use crate::error::Diagnostics;
use crate::types::{encode_as_text, encode_bool_as_int, ColumnType, TypeKind, TypeRegistry};

pub(super) const RESERVED_WORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "ATTACH",
    "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST", "CHECK",
    "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT", "DEFERRABLE", "DEFERRED",
    "DELETE", "DESC", "DETACH", "DISTINCT", "DROP", "EACH", "ELSE", "END", "ESCAPE", "EXCEPT",
    "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FOR", "FOREIGN", "FROM", "FULL", "GLOB", "GROUP",
    "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED", "INITIALLY", "INNER",
    "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "KEY", "LEFT", "LIKE",
    "LIMIT", "MATCH", "NATURAL", "NO", "NOT", "NOTNULL", "NULL", "OF", "OFFSET", "ON", "OR",
    "ORDER", "OUTER", "PLAN", "PRAGMA", "PRIMARY", "QUERY", "RAISE", "RECURSIVE", "REFERENCES",
    "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT", "RIGHT", "ROLLBACK", "ROW",
    "SAVEPOINT", "SELECT", "SET", "TABLE", "TEMP", "TEMPORARY", "THEN", "TO", "TRANSACTION",
    "TRIGGER", "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL",
    "WHEN", "WHERE", "WITH", "WITHOUT",
];

pub(super) fn capabilities(version: Version) -> DialectCapabilities {
    let conflict_clause = version.at_least(3, 24);
    DialectCapabilities {
        reserved_words: RESERVED_WORDS,
        max_bind_parameters: if version.at_least(3, 32) { 32_766 } else { 999 },
        upsert: if conflict_clause {
            UpsertStrategy::OnConflict
        } else {
            UpsertStrategy::DoubleStatement
        },
        update_limit: RowLimit::RowIdSubquery { row_id: "rowid" },
        delete_limit: RowLimit::RowIdSubquery { row_id: "rowid" },
        insert_ignore: InsertIgnore::InsertOrIgnore,
        returning: if version.at_least(3, 35) {
            Returning::Returning
        } else {
            Returning::Unsupported
        },
        pagination: Pagination::LimitOffset,
        identity: IdentitySyntax::SqliteAutoIncrement,
        drop_column: if version.at_least(3, 35) {
            DropColumnStrategy::Native
        } else {
            DropColumnStrategy::Rebuild
        },
        alter_column: AlterColumnSyntax::Rebuild,
        rename_column: if version.at_least(3, 25) {
            RenameColumnSyntax::RenameColumn
        } else {
            RenameColumnSyntax::Rebuild
        },
        add_constraint: false,
        truncate: false,
        boolean_literals: ("1", "0"),
        begin: BeginSyntax::BeginWithMode,
        isolation: IsolationSyntax::Pragma,
        default_isolation: crate::operation::IsolationLevel::Serializable,
        drop_cascade: DropCascade::Unsupported,
        catalog: CatalogSource::SqliteMaster,
        offset_only: OffsetOnly::NegativeLimit,
        ..ansi(Dialect::Sqlite, version)
    }
}

fn render_boolean(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("TINYINT(1)")
}

fn render_datetime(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("DATETIME")
}

fn render_uuid(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("UUID")
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    registry
        .register(Dialect::Sqlite, TypeKind::Boolean, render_boolean)
        .register(Dialect::Sqlite, TypeKind::DateTime, render_datetime)
        .register(Dialect::Sqlite, TypeKind::Uuid, render_uuid)
        .register_encoder(Dialect::Sqlite, TypeKind::Boolean, encode_bool_as_int);
    for kind in [
        TypeKind::DateTime,
        TypeKind::DateOnly,
        TypeKind::Time,
        TypeKind::Uuid,
    ] {
        registry.register_encoder(Dialect::Sqlite, kind, encode_as_text);
    }
}
