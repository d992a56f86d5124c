#![allow(dead_code)]

use oxide_sqlgen::schema::{bigint, boolean, string, TableBuilder, TableSpec};
use oxide_sqlgen::{
    Dialect, DialectCapabilities, Generated, Generator, OperationDescriptor, SqlValue,
    TypeRegistry, Version,
};

pub fn generate(dialect: Dialect, op: impl Into<OperationDescriptor>) -> Generated {
    generate_with(&DialectCapabilities::latest(dialect), op)
}

pub fn generate_at(
    dialect: Dialect,
    version: Version,
    op: impl Into<OperationDescriptor>,
) -> Generated {
    generate_with(&DialectCapabilities::for_dialect(dialect, version), op)
}

pub fn generate_with(caps: &DialectCapabilities, op: impl Into<OperationDescriptor>) -> Generated {
    let op = op.into();
    let types = TypeRegistry::new();
    Generator::new(caps, &types)
        .generate(&op)
        .unwrap_or_else(|e| panic!("Failed to generate {} for {}: {e}", op.name(), caps.dialect))
}

/// `users(id PK auto-increment, email UNIQUE, name, active)`.
pub fn users() -> TableSpec {
    TableBuilder::new()
        .name("users")
        .column(bigint("id").primary_key().auto_increment().build())
        .column(string("email", 255).not_null().unique().build())
        .column(string("name", 64).build())
        .column(boolean("active").default_bool(true).build())
        .build()
}

pub fn row(values: &[(&str, SqlValue)]) -> Vec<(String, SqlValue)> {
    values
        .iter()
        .map(|(c, v)| ((*c).to_string(), v.clone()))
        .collect()
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}
