//! Oracle Database.

use super::{
    ansi, AlterColumnSyntax, BeginSyntax, BindStyle, CatalogCase, CatalogSource,
    DefaultValuesSyntax, Dialect, DialectCapabilities, DropCascade, DropColumnStrategy,
    ExistenceGuard, IdentitySyntax, IsolationSyntax, Pagination, QuotePolicy, RowLimit,
    UpsertStrategy, Version,
};
use crate::error::Diagnostics;
use crate::types::{
    decimal, encode_as_text, encode_bool_as_int, plain_float, single_class, ColumnType, TypeKind,
    TypeRegistry,
};

pub(super) const RESERVED_WORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUDIT", "BETWEEN", "BY", "CHAR",
    "CHECK", "CLUSTER", "COLUMN", "COMMENT", "COMPRESS", "CONNECT", "CREATE", "CURRENT", "DATE",
    "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "EXCLUSIVE", "EXISTS",
    "FILE", "FLOAT", "FOR", "FROM", "GRANT", "GROUP", "HAVING", "IDENTIFIED", "IMMEDIATE", "IN",
    "INCREMENT", "INDEX", "INITIAL", "INSERT", "INTEGER", "INTERSECT", "INTO", "IS", "LEVEL",
    "LIKE", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE", "MODIFY", "NOAUDIT",
    "NOCOMPRESS", "NOT", "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "ON", "ONLINE", "OPTION",
    "OR", "ORDER", "PCTFREE", "PRIOR", "PUBLIC", "RAW", "RENAME", "RESOURCE", "REVOKE", "ROW",
    "ROWID", "ROWNUM", "ROWS", "SELECT", "SESSION", "SET", "SHARE", "SIZE", "SMALLINT", "START",
    "SUCCESSFUL", "SYNONYM", "SYSDATE", "TABLE", "THEN", "TO", "TRIGGER", "UID", "UNION",
    "UNIQUE", "UPDATE", "USER", "VALIDATE", "VALUES", "VARCHAR", "VARCHAR2", "VIEW", "WHENEVER",
    "WHERE", "WITH",
];

pub(super) fn capabilities(version: Version) -> DialectCapabilities {
    let identity_columns = version.at_least(12, 1);
    DialectCapabilities {
        quote_policy: QuotePolicy::WhenNeeded,
        catalog_case: CatalogCase::Upper,
        max_identifier_length: if version.at_least(12, 2) { 128 } else { 30 },
        reserved_words: RESERVED_WORDS,
        bind_style: BindStyle::Colon,
        upsert: UpsertStrategy::Procedural,
        update_limit: RowLimit::RowNumSubquery,
        delete_limit: RowLimit::RowNumSubquery,
        multi_row_values: false,
        default_values: DefaultValuesSyntax::DefaultKeyword,
        dual_table: Some("DUAL"),
        pagination: if version.at_least(12, 1) {
            Pagination::OffsetFetch
        } else {
            Pagination::RowNum
        },
        inline_references: false,
        names_constraints: true,
        supports_on_update: false,
        identity: if identity_columns {
            IdentitySyntax::GeneratedOnNull
        } else {
            IdentitySyntax::Unsupported
        },
        drop_column: if identity_columns {
            DropColumnStrategy::DropIdentityFirst
        } else {
            DropColumnStrategy::Native
        },
        alter_column: AlterColumnSyntax::ModifyParenthesized,
        existence_guard: ExistenceGuard::PlSql,
        boolean_literals: ("1", "0"),
        alias_keyword: false,
        begin: BeginSyntax::SetTransaction,
        isolation: IsolationSyntax::SetTransaction,
        supports_restrict: false,
        drop_cascade: DropCascade::CascadeConstraints,
        add_column_keyword: false,
        catalog: CatalogSource::DataDictionary,
        ..ansi(Dialect::Oracle, version)
    }
}

fn render_integer(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    let (digits, opts) = match ty {
        ColumnType::SmallInt(opts) => (5, opts),
        ColumnType::Integer(opts) => (10, opts),
        ColumnType::BigInt(opts) => (19, opts),
        _ => return String::from("NUMBER"),
    };
    if !opts.is_empty() {
        diag.unsupported("NUMBER does not support length, UNSIGNED or ZEROFILL; options dropped");
    }
    format!("NUMBER({digits})")
}

fn render_float(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Real(opts) | ColumnType::Float(opts) => plain_float("BINARY_FLOAT", *opts, diag),
        ColumnType::Double(opts) => plain_float("BINARY_DOUBLE", *opts, diag),
        _ => String::from("BINARY_DOUBLE"),
    }
}

fn render_decimal(ty: &ColumnType, caps: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Decimal { precision, scale } => {
            decimal("NUMBER", *precision, *scale, caps, diag)
        }
        _ => String::from("NUMBER"),
    }
}

fn render_string(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::String {
            length,
            binary: true,
        } => format!("RAW({})", length.unwrap_or(255)),
        ColumnType::String { length, .. } => format!("VARCHAR2({})", length.unwrap_or(255)),
        _ => String::from("VARCHAR2(255)"),
    }
}

fn render_text(ty: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Text(size) => single_class("CLOB", *size, diag),
        _ => String::from("CLOB"),
    }
}

fn render_boolean(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("NUMBER(1)")
}

fn render_datetime(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::DateTime {
            precision: Some(p),
        } => format!("TIMESTAMP({p}) WITH LOCAL TIME ZONE"),
        _ => String::from("TIMESTAMP WITH LOCAL TIME ZONE"),
    }
}

fn render_time(_: &ColumnType, _: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    diag.degraded("Oracle has no TIME type; using TIMESTAMP");
    String::from("TIMESTAMP")
}

fn render_enum(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("VARCHAR2(255)")
}

fn render_uuid(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("VARCHAR2(36)")
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    for kind in [TypeKind::SmallInt, TypeKind::Integer, TypeKind::BigInt] {
        registry.register(Dialect::Oracle, kind, render_integer);
    }
    for kind in [TypeKind::Real, TypeKind::Float, TypeKind::Double] {
        registry.register(Dialect::Oracle, kind, render_float);
    }
    registry
        .register(Dialect::Oracle, TypeKind::Decimal, render_decimal)
        .register(Dialect::Oracle, TypeKind::String, render_string)
        .register(Dialect::Oracle, TypeKind::Text, render_text)
        .register(Dialect::Oracle, TypeKind::Boolean, render_boolean)
        .register(Dialect::Oracle, TypeKind::DateTime, render_datetime)
        .register(Dialect::Oracle, TypeKind::Time, render_time)
        .register(Dialect::Oracle, TypeKind::Enum, render_enum)
        .register(Dialect::Oracle, TypeKind::Uuid, render_uuid)
        .register_encoder(Dialect::Oracle, TypeKind::Boolean, encode_bool_as_int)
        .register_encoder(Dialect::Oracle, TypeKind::Uuid, encode_as_text);
}
