//! Microsoft SQL Server.

use super::{
    ansi, AlterColumnSyntax, BeginSyntax, BindStyle, CatalogSource, Dialect, DialectCapabilities,
    DropCascade, DropColumnStrategy, ExistenceGuard, IdentitySyntax, Pagination,
    RenameColumnSyntax, RenameTableSyntax, Returning, RowLimit, SavepointSyntax, UpsertStrategy,
    Version,
};
use crate::error::Diagnostics;
use crate::types::{plain_float, single_class, ColumnType, TypeKind, TypeRegistry};
use crate::value::{BindValue, SqlValue, WireType};

pub(super) const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUTHORIZATION", "BACKUP", "BEGIN",
    "BETWEEN", "BREAK", "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT", "CLOSE",
    "CLUSTERED", "COALESCE", "COLLATE", "COLUMN", "COMMIT", "COMPUTE", "CONSTRAINT", "CONTAINS",
    "CONTINUE", "CONVERT", "CREATE", "CROSS", "CURRENT", "CURSOR", "DATABASE", "DEALLOCATE",
    "DECLARE", "DEFAULT", "DELETE", "DENY", "DESC", "DISK", "DISTINCT", "DOUBLE", "DROP", "DUMP",
    "ELSE", "END", "ERRLVL", "ESCAPE", "EXCEPT", "EXEC", "EXECUTE", "EXISTS", "EXIT", "FETCH",
    "FILE", "FILLFACTOR", "FOR", "FOREIGN", "FREETEXT", "FROM", "FULL", "FUNCTION", "GOTO",
    "GRANT", "GROUP", "HAVING", "HOLDLOCK", "IDENTITY", "IDENTITY_INSERT", "IF", "IN", "INDEX",
    "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "KEY", "KILL", "LEFT", "LIKE", "LINENO",
    "MERGE", "NATIONAL", "NOCHECK", "NONCLUSTERED", "NOT", "NULL", "NULLIF", "OF", "OFF",
    "OFFSETS", "ON", "OPEN", "OPTION", "OR", "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT", "PLAN",
    "PRIMARY", "PRINT", "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ", "RECONFIGURE",
    "REFERENCES", "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT", "REVOKE", "RIGHT",
    "ROLLBACK", "ROWCOUNT", "RULE", "SAVE", "SCHEMA", "SELECT", "SET", "SHUTDOWN", "SOME",
    "STATISTICS", "TABLE", "TEXTSIZE", "THEN", "TO", "TOP", "TRAN", "TRANSACTION", "TRIGGER",
    "TRUNCATE", "UNION", "UNIQUE", "UNPIVOT", "UPDATE", "USE", "USER", "VALUES", "VARYING",
    "VIEW", "WAITFOR", "WHEN", "WHERE", "WHILE", "WITH",
];

pub(super) fn capabilities(version: Version) -> DialectCapabilities {
    DialectCapabilities {
        quote_open: '[',
        quote_close: ']',
        reserved_words: RESERVED_WORDS,
        bind_style: BindStyle::AtP,
        max_bind_parameters: 2100,
        max_rows_per_values: Some(1000),
        upsert: UpsertStrategy::Merge,
        update_limit: RowLimit::Top,
        delete_limit: RowLimit::Top,
        returning: Returning::OutputInserted,
        pagination: if version.at_least(11, 0) {
            Pagination::OffsetFetch
        } else {
            Pagination::TopRowNumber
        },
        inline_references: false,
        names_constraints: true,
        named_default_constraints: true,
        restricts_cascade_paths: true,
        supports_restrict: false,
        identity: IdentitySyntax::Identity,
        identity_insert_toggle: true,
        drop_column: DropColumnStrategy::DropConstraintsFirst,
        alter_column: AlterColumnSyntax::AlterColumnWithDefaultConstraint,
        rename_column: RenameColumnSyntax::SpRename,
        existence_guard: ExistenceGuard::ObjectId,
        boolean_literals: ("1", "0"),
        explicit_null: true,
        begin: BeginSyntax::BeginTransaction,
        savepoint: SavepointSyntax::SaveTransaction,
        rename_table: RenameTableSyntax::SpRename,
        drop_cascade: DropCascade::Unsupported,
        drop_index_on_table: true,
        add_column_keyword: false,
        catalog: CatalogSource::SysViews,
        offset_requires_order: true,
        ..ansi(Dialect::MsSql, version)
    }
}

fn render_boolean(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("BIT")
}

fn render_double(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Double(opts) => plain_float("FLOAT", *opts, diag),
        _ => String::from("FLOAT"),
    }
}

fn render_string(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::String {
            length,
            binary: true,
        } => format!("VARBINARY({})", length.unwrap_or(255)),
        ColumnType::String { length, .. } => format!("NVARCHAR({})", length.unwrap_or(255)),
        _ => String::from("NVARCHAR(255)"),
    }
}

fn render_text(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    if let ColumnType::Text(size) = ty {
        single_class("NVARCHAR(MAX)", *size, diag)
    } else {
        String::from("NVARCHAR(MAX)")
    }
}

fn render_blob(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    if let ColumnType::Blob(size) = ty {
        single_class("VARBINARY(MAX)", *size, diag)
    } else {
        String::from("VARBINARY(MAX)")
    }
}

fn render_datetime(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::DateTime {
            precision: Some(p),
        } => format!("DATETIMEOFFSET({p})"),
        _ => String::from("DATETIMEOFFSET"),
    }
}

fn render_enum(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("NVARCHAR(255)")
}

fn render_uuid(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("UNIQUEIDENTIFIER")
}

fn encode_bit(value: SqlValue, _: &DialectCapabilities) -> BindValue {
    let value = match value {
        SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
        other => other,
    };
    BindValue::new(value, WireType::Bit)
}

fn encode_nvarchar(value: SqlValue, _: &DialectCapabilities) -> BindValue {
    BindValue::new(value, WireType::NVarChar)
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    registry
        .register(Dialect::MsSql, TypeKind::Boolean, render_boolean)
        .register(Dialect::MsSql, TypeKind::Double, render_double)
        .register(Dialect::MsSql, TypeKind::String, render_string)
        .register(Dialect::MsSql, TypeKind::Text, render_text)
        .register(Dialect::MsSql, TypeKind::Blob, render_blob)
        .register(Dialect::MsSql, TypeKind::DateTime, render_datetime)
        .register(Dialect::MsSql, TypeKind::Enum, render_enum)
        .register(Dialect::MsSql, TypeKind::Uuid, render_uuid)
        .register_encoder(Dialect::MsSql, TypeKind::Boolean, encode_bit);
    for kind in [TypeKind::String, TypeKind::Text, TypeKind::Enum] {
        registry.register_encoder(Dialect::MsSql, kind, encode_nvarchar);
    }
}
