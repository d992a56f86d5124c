//! PostgreSQL.

use super::{
    ansi, AlterColumnSyntax, BeginSyntax, BindStyle, CatalogSource, Dialect, DialectCapabilities,
    IdentitySyntax, InsertIgnore, IsolationSyntax, Pagination, Returning, RowLimit,
    UpsertStrategy, Version,
};
use crate::error::Diagnostics;
use crate::types::{decimal, single_class, ColumnType, TypeKind, TypeRegistry};

pub(super) const RESERVED_WORDS: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC", "BOTH", "CASE",
    "CAST", "CHECK", "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT_CATALOG",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "FALSE", "FETCH",
    "FOR", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INITIALLY", "INTERSECT", "INTO",
    "LATERAL", "LEADING", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NOT", "NULL", "OFFSET", "ON",
    "ONLY", "OR", "ORDER", "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "SELECT",
    "SESSION_USER", "SOME", "SYMMETRIC", "TABLE", "THEN", "TO", "TRAILING", "TRUE", "UNION",
    "UNIQUE", "USER", "USING", "VARIADIC", "WHEN", "WHERE", "WINDOW", "WITH",
];

pub(super) fn capabilities(version: Version) -> DialectCapabilities {
    let conflict_clause = version.at_least(9, 5);
    DialectCapabilities {
        max_identifier_length: 63,
        reserved_words: RESERVED_WORDS,
        bind_style: BindStyle::Dollar,
        upsert: if conflict_clause {
            UpsertStrategy::OnConflict
        } else {
            UpsertStrategy::DoubleStatement
        },
        delete_limit: RowLimit::RowIdSubquery { row_id: "ctid" },
        insert_ignore: if conflict_clause {
            InsertIgnore::OnConflictDoNothing
        } else {
            InsertIgnore::Unsupported
        },
        returning: Returning::Returning,
        pagination: Pagination::LimitOffset,
        identity: IdentitySyntax::Serial,
        alter_column: AlterColumnSyntax::AlterColumnClauses,
        max_decimal_precision: 1000,
        begin: BeginSyntax::BeginTransaction,
        isolation: IsolationSyntax::Inline,
        truncate_options: true,
        catalog: CatalogSource::PgCatalog,
        ..ansi(Dialect::Postgres, version)
    }
}

fn render_decimal(ty: &ColumnType, caps: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Decimal { precision, scale } => {
            decimal("NUMERIC", *precision, *scale, caps, diag)
        }
        _ => String::from("NUMERIC"),
    }
}

fn render_string(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::String { binary: true, .. } => String::from("BYTEA"),
        ColumnType::String { length, .. } => format!("VARCHAR({})", length.unwrap_or(255)),
        _ => String::from("VARCHAR(255)"),
    }
}

fn render_datetime(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::DateTime {
            precision: Some(p),
        } => format!("TIMESTAMP({p}) WITH TIME ZONE"),
        _ => String::from("TIMESTAMP WITH TIME ZONE"),
    }
}

fn render_blob(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Blob(size) => single_class("BYTEA", *size, diag),
        _ => String::from("BYTEA"),
    }
}

fn render_uuid(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("UUID")
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    registry
        .register(Dialect::Postgres, TypeKind::Decimal, render_decimal)
        .register(Dialect::Postgres, TypeKind::String, render_string)
        .register(Dialect::Postgres, TypeKind::DateTime, render_datetime)
        .register(Dialect::Postgres, TypeKind::Blob, render_blob)
        .register(Dialect::Postgres, TypeKind::Uuid, render_uuid);
}
