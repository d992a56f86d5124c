//! MySQL and MariaDB.

use super::{
    ansi, AlterColumnSyntax, CatalogSource, DefaultValuesSyntax, Dialect, DialectCapabilities,
    IdentitySyntax, InsertIgnore, OffsetOnly, Pagination, RenameTableSyntax, RowLimit,
    UpsertStrategy, Version,
};
use crate::error::Diagnostics;
use crate::types::{
    decimal, encode_as_text, encode_bool_as_int, ColumnType, FloatOptions, IntOptions, SizeClass,
    TypeKind, TypeRegistry,
};
use crate::value::escape_string;

pub(super) const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "BEFORE", "BETWEEN", "BIGINT", "BINARY",
    "BLOB", "BOTH", "BY", "CALL", "CASCADE", "CASE", "CHANGE", "CHAR", "CHECK", "COLLATE",
    "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE", "CONVERT", "CREATE", "CROSS", "CURRENT_DATE",
    "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATABASE", "DATABASES",
    "DECIMAL", "DECLARE", "DEFAULT", "DELETE", "DESC", "DESCRIBE", "DISTINCT", "DIV", "DOUBLE",
    "DROP", "DUAL", "EACH", "ELSE", "ELSEIF", "EXISTS", "EXIT", "EXPLAIN", "FALSE", "FETCH",
    "FLOAT", "FOR", "FORCE", "FOREIGN", "FROM", "FULLTEXT", "GRANT", "GROUP", "GROUPS", "HAVING",
    "IF", "IGNORE", "IN", "INDEX", "INNER", "INSERT", "INT", "INTEGER", "INTERVAL", "INTO", "IS",
    "JOIN", "KEY", "KEYS", "KILL", "LEADING", "LEAVE", "LEFT", "LIKE", "LIMIT", "LINES", "LOAD",
    "LOCK", "LONG", "MATCH", "MOD", "NOT", "NULL", "NUMERIC", "ON", "OPTION", "OR", "ORDER",
    "OUTER", "PRIMARY", "PROCEDURE", "RANGE", "READ", "REFERENCES", "REGEXP", "RENAME",
    "REPLACE", "REQUIRE", "RESTRICT", "RETURN", "REVOKE", "RIGHT", "RLIKE", "ROW", "ROWS",
    "SCHEMA", "SELECT", "SET", "SHOW", "SMALLINT", "SQL", "TABLE", "THEN", "TO", "TRAILING",
    "TRIGGER", "TRUE", "UNION", "UNIQUE", "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE",
    "USING", "VALUES", "VARCHAR", "WHEN", "WHERE", "WHILE", "WITH", "WRITE", "XOR", "ZEROFILL",
];

pub(super) fn capabilities(version: Version) -> DialectCapabilities {
    DialectCapabilities {
        quote_open: '`',
        quote_close: '`',
        max_identifier_length: 64,
        reserved_words: RESERVED_WORDS,
        upsert: UpsertStrategy::OnDuplicateKey,
        update_limit: RowLimit::Native,
        delete_limit: RowLimit::Native,
        insert_ignore: InsertIgnore::InsertIgnore,
        default_values: DefaultValuesSyntax::EmptyParens,
        dual_table: Some("DUAL"),
        pagination: Pagination::LimitOffset,
        inline_references: false,
        identity: IdentitySyntax::AutoIncrement,
        alter_column: AlterColumnSyntax::Modify,
        native_enum: true,
        max_decimal_precision: 65,
        boolean_literals: ("1", "0"),
        rename_table: RenameTableSyntax::RenameTable,
        drop_index_on_table: true,
        drop_constraint_by_kind: true,
        offset_only: OffsetOnly::MaxLimit,
        catalog: CatalogSource::InformationSchemaStatistics,
        ..ansi(Dialect::MySql, version)
    }
}

fn integer_options(name: &str, opts: IntOptions) -> String {
    let mut sql = String::from(name);
    if let Some(length) = opts.length {
        sql.push_str(&format!("({length})"));
    }
    if opts.unsigned {
        sql.push_str(" UNSIGNED");
    }
    if opts.zerofill {
        sql.push_str(" ZEROFILL");
    }
    sql
}

fn float_options(name: &str, opts: FloatOptions) -> String {
    let mut sql = String::from(name);
    match (opts.length, opts.decimals) {
        (Some(length), Some(decimals)) => sql.push_str(&format!("({length},{decimals})")),
        (Some(length), None) => sql.push_str(&format!("({length})")),
        _ => {}
    }
    if opts.unsigned {
        sql.push_str(" UNSIGNED");
    }
    sql
}

fn render_numeric(ty: &ColumnType, caps: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::SmallInt(opts) => integer_options("SMALLINT", *opts),
        ColumnType::Integer(opts) => integer_options("INT", *opts),
        ColumnType::BigInt(opts) => integer_options("BIGINT", *opts),
        ColumnType::Real(opts) => float_options("REAL", *opts),
        ColumnType::Float(opts) => float_options("FLOAT", *opts),
        ColumnType::Double(opts) => float_options("DOUBLE", *opts),
        ColumnType::Decimal { precision, scale } => {
            decimal("DECIMAL", *precision, *scale, caps, diag)
        }
        _ => String::from("INT"),
    }
}

fn render_string(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::String {
            length,
            binary: true,
        } => format!("VARCHAR({}) BINARY", length.unwrap_or(255)),
        ColumnType::String { length, .. } => format!("VARCHAR({})", length.unwrap_or(255)),
        _ => String::from("VARCHAR(255)"),
    }
}

fn sized(base: &str, size: SizeClass) -> String {
    let prefix = match size {
        SizeClass::Default => "",
        SizeClass::Tiny => "TINY",
        SizeClass::Medium => "MEDIUM",
        SizeClass::Long => "LONG",
    };
    format!("{prefix}{base}")
}

fn render_text(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Text(size) => sized("TEXT", *size),
        _ => String::from("TEXT"),
    }
}

fn render_blob(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Blob(size) => sized("BLOB", *size),
        _ => String::from("BLOB"),
    }
}

fn render_boolean(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("TINYINT(1)")
}

fn render_datetime(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::DateTime {
            precision: Some(p),
        } => format!("DATETIME({p})"),
        _ => String::from("DATETIME"),
    }
}

fn render_enum(ty: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    match ty {
        ColumnType::Enum(values) => {
            let values: Vec<String> = values.iter().map(|v| escape_string(v)).collect();
            format!("ENUM({})", values.join(", "))
        }
        _ => String::from("VARCHAR(255)"),
    }
}

fn render_uuid(_: &ColumnType, _: &DialectCapabilities, _: &mut Diagnostics) -> String {
    String::from("CHAR(36) BINARY")
}

pub(super) fn register_types(registry: &mut TypeRegistry) {
    for kind in [
        TypeKind::SmallInt,
        TypeKind::Integer,
        TypeKind::BigInt,
        TypeKind::Real,
        TypeKind::Float,
        TypeKind::Double,
        TypeKind::Decimal,
    ] {
        registry.register(Dialect::MySql, kind, render_numeric);
    }
    registry
        .register(Dialect::MySql, TypeKind::String, render_string)
        .register(Dialect::MySql, TypeKind::Text, render_text)
        .register(Dialect::MySql, TypeKind::Blob, render_blob)
        .register(Dialect::MySql, TypeKind::Boolean, render_boolean)
        .register(Dialect::MySql, TypeKind::DateTime, render_datetime)
        .register(Dialect::MySql, TypeKind::Enum, render_enum)
        .register(Dialect::MySql, TypeKind::Uuid, render_uuid)
        .register_encoder(Dialect::MySql, TypeKind::Boolean, encode_bool_as_int)
        .register_encoder(Dialect::MySql, TypeKind::Uuid, encode_as_text);
}
