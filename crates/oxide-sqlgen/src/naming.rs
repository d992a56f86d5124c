//! Identifier quoting, table references and constraint names.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::checksum::crc32_hex;
use crate::dialect::{CatalogCase, DialectCapabilities, QuotePolicy};
use crate::value::escape_string;

static BARE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex"));

/// A possibly schema-qualified, possibly aliased table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema, if qualified.
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Alias, if any.
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates an unqualified reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Qualifies the reference with a schema.
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Quotes identifiers according to an engine's rules.
#[derive(Debug, Clone, Copy)]
pub struct Quoter<'a> {
    caps: &'a DialectCapabilities,
}

impl<'a> Quoter<'a> {
    /// Creates a quoter for the given engine.
    #[must_use]
    pub const fn new(caps: &'a DialectCapabilities) -> Self {
        Self { caps }
    }

    /// Returns whether `identifier` must be quoted to parse as one name.
    #[must_use]
    pub fn needs_quoting(&self, identifier: &str) -> bool {
        !BARE_IDENTIFIER.is_match(identifier) || self.caps.is_reserved(identifier)
    }

    /// Quotes an identifier.
    ///
    /// `*` passes through untouched. The closing quote character is doubled
    /// inside the name.
    #[must_use]
    pub fn quote(&self, identifier: &str) -> String {
        if identifier == "*" {
            return String::from("*");
        }
        if self.caps.quote_policy == QuotePolicy::WhenNeeded && !self.needs_quoting(identifier) {
            return String::from(identifier);
        }
        let close = self.caps.quote_close;
        let escaped = identifier.replace(close, &format!("{close}{close}"));
        format!("{}{escaped}{close}", self.caps.quote_open)
    }

    /// Quotes each identifier and joins them with `, `.
    #[must_use]
    pub fn quote_list<S: AsRef<str>>(&self, identifiers: &[S]) -> String {
        identifiers
            .iter()
            .map(|i| self.quote(i.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Strips one layer of quoting, reversing [`Quoter::quote`].
    #[must_use]
    pub fn unquote(&self, quoted: &str) -> String {
        let (open, close) = (self.caps.quote_open, self.caps.quote_close);
        match quoted
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            Some(inner) => inner.replace(&format!("{close}{close}"), &close.to_string()),
            None => String::from(quoted),
        }
    }

    /// Renders `schema.table [AS] alias`, quoting each part independently.
    #[must_use]
    pub fn table(&self, table: &TableRef) -> String {
        let mut sql = String::new();
        if let Some(ref schema) = table.schema {
            sql.push_str(&self.quote(schema));
            sql.push('.');
        }
        sql.push_str(&self.quote(&table.name));
        if let Some(ref alias) = table.alias {
            sql.push_str(if self.caps.alias_keyword { " AS " } else { " " });
            sql.push_str(&self.quote(alias));
        }
        sql
    }

    /// Renders `schema.table` without alias.
    #[must_use]
    pub fn table_name(&self, table: &TableRef) -> String {
        let mut bare = table.clone();
        bare.alias = None;
        self.table(&bare)
    }

    /// Returns `table.column`, qualified by the alias when present.
    #[must_use]
    pub fn qualified_column(&self, table: &TableRef, column: &str) -> String {
        let owner = table.alias.as_deref().unwrap_or(&table.name);
        format!("{}.{}", self.quote(owner), self.quote(column))
    }

    /// Normalizes a name the way the catalog stores it, for lookups.
    ///
    /// Names that the engine would store verbatim (quoted ones) keep their
    /// case.
    #[must_use]
    pub fn catalog_name(&self, name: &str) -> String {
        match self.caps.catalog_case {
            CatalogCase::Upper if !self.needs_quoting(name) => name.to_ascii_uppercase(),
            _ => String::from(name),
        }
    }

    /// Renders a catalog name as a string literal.
    #[must_use]
    pub fn catalog_literal(&self, name: &str) -> String {
        escape_string(&self.catalog_name(name))
    }
}

/// Prefix of a generated constraint name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintPrefix {
    /// Primary key.
    PrimaryKey,
    /// Foreign key.
    ForeignKey,
    /// Unique key.
    Unique,
    /// Check constraint.
    Check,
    /// Default constraint.
    Default,
    /// Index.
    Index,
}

impl ConstraintPrefix {
    /// Returns the prefix text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryKey => "PK_",
            Self::ForeignKey => "FK_",
            Self::Unique => "UQ_",
            Self::Check => "CK_",
            Self::Default => "DF_",
            Self::Index => "IX_",
        }
    }
}

/// Builds a deterministic constraint name no longer than `max_len`.
///
/// Tries `PREFIX + table + "_" + columns`, then replaces the column list with
/// its CRC-32, then hashes the table and columns together. A limit too small
/// even for the hashed form truncates.
#[must_use]
pub fn constraint_name<S: AsRef<str>>(
    prefix: ConstraintPrefix,
    table: &str,
    columns: &[S],
    max_len: usize,
) -> String {
    let prefix = prefix.as_str();
    let columns = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("_");

    let full = format!("{prefix}{table}_{columns}");
    if full.len() <= max_len {
        return full;
    }
    let hashed_columns = format!("{prefix}{table}_{}", crc32_hex(&columns));
    if hashed_columns.len() <= max_len {
        return hashed_columns;
    }
    let hashed = format!("{prefix}{}", crc32_hex(&format!("{table}_{columns}")));
    if hashed.len() <= max_len {
        return hashed;
    }
    hashed.chars().take(max_len).collect()
}

/// Savepoint identifier for `name` within `max_len`.
///
/// Names that are not plain `[A-Za-z0-9_]` identifiers, or are too long, become
/// `sp_<crc32>` so that distinct names never map to the same savepoint.
#[must_use]
pub fn savepoint_name(name: &str, max_len: usize) -> String {
    let plain = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !name.is_empty() && name.len() <= max_len {
        name.to_string()
    } else {
        format!("sp_{}", crc32_hex(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, Version};

    fn caps(dialect: Dialect) -> DialectCapabilities {
        DialectCapabilities::latest(dialect)
    }

    #[test]
    fn test_quote_always() {
        let pg = caps(Dialect::Postgres);
        let q = Quoter::new(&pg);
        assert_eq!(q.quote("users"), "\"users\"");
        assert_eq!(q.quote("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(q.quote("*"), "*");

        let mssql = caps(Dialect::MsSql);
        let q = Quoter::new(&mssql);
        assert_eq!(q.quote("users"), "[users]");
        assert_eq!(q.quote("a]b"), "[a]]b]");

        let mysql = caps(Dialect::MySql);
        assert_eq!(Quoter::new(&mysql).quote("order"), "`order`");
    }

    #[test]
    fn test_quote_when_needed() {
        let oracle = caps(Dialect::Oracle);
        let q = Quoter::new(&oracle);
        assert_eq!(q.quote("users"), "users");
        assert_eq!(q.quote("level"), "\"level\"");
        assert_eq!(q.quote("LEVEL"), "\"LEVEL\"");
        assert_eq!(q.quote("1st"), "\"1st\"");
        assert_eq!(q.quote("a.b"), "\"a.b\"");
        assert_eq!(q.quote("first name"), "\"first name\"");
    }

    #[test]
    fn test_unquote_round_trip() {
        for dialect in Dialect::ALL {
            let c = caps(dialect);
            let q = Quoter::new(&c);
            for name in ["users", "a]b", "we\"ird", "select", "x`y"] {
                assert_eq!(q.unquote(&q.quote(name)), name, "{dialect} {name}");
            }
        }
    }

    #[test]
    fn test_table_ref() {
        let pg = caps(Dialect::Postgres);
        let q = Quoter::new(&pg);
        let t = TableRef::new("users").in_schema("app").alias("u");
        assert_eq!(q.table(&t), "\"app\".\"users\" AS \"u\"");
        assert_eq!(q.table_name(&t), "\"app\".\"users\"");
        assert_eq!(q.qualified_column(&t, "id"), "\"u\".\"id\"");

        let oracle = caps(Dialect::Oracle);
        let q = Quoter::new(&oracle);
        assert_eq!(q.table(&t), "app.users u");
    }

    #[test]
    fn test_catalog_name() {
        let oracle = caps(Dialect::Oracle);
        let q = Quoter::new(&oracle);
        assert_eq!(q.catalog_name("users"), "USERS");
        assert_eq!(q.catalog_name("my table"), "my table");
        assert_eq!(q.catalog_literal("users"), "'USERS'");

        let pg = caps(Dialect::Postgres);
        assert_eq!(Quoter::new(&pg).catalog_name("users"), "users");
    }

    #[test]
    fn test_constraint_name_fits() {
        assert_eq!(
            constraint_name(ConstraintPrefix::PrimaryKey, "users", &["id"], 30),
            "PK_users_id"
        );
        assert_eq!(
            constraint_name(ConstraintPrefix::Unique, "users", &["a", "b"], 128),
            "UQ_users_a_b"
        );
    }

    #[test]
    fn test_constraint_name_hashes_columns() {
        let name = constraint_name(
            ConstraintPrefix::ForeignKey,
            "orders",
            &["customer_identifier", "region_code"],
            30,
        );
        assert_eq!(
            name,
            format!("FK_orders_{}", crc32_hex("customer_identifier_region_code"))
        );
        assert!(name.len() <= 30);
    }

    #[test]
    fn test_constraint_name_hashes_everything() {
        let table = "a_table_with_a_forty_character_long_name";
        assert_eq!(table.len(), 40);
        let name = constraint_name(ConstraintPrefix::PrimaryKey, table, &["id"], 30);
        assert_eq!(name, format!("PK_{}", crc32_hex(&format!("{table}_id"))));
        assert_eq!(name.len(), 11);
        assert_eq!(
            name,
            constraint_name(ConstraintPrefix::PrimaryKey, table, &["id"], 30)
        );
    }

    #[test]
    fn test_constraint_name_truncates_pathological_limit() {
        let name = constraint_name(ConstraintPrefix::Check, "table", &["c"], 6);
        assert_eq!(name.len(), 6);
        assert!(name.starts_with("CK_"));
    }

    #[test]
    fn test_savepoint_name() {
        assert_eq!(savepoint_name("tx_1", 30), "tx_1");
        assert_eq!(savepoint_name("tx-1", 30), format!("sp_{}", crc32_hex("tx-1")));
        assert_ne!(savepoint_name("tx-1", 30), savepoint_name("tx_1", 30));
        let long = "a".repeat(40);
        let oracle = DialectCapabilities::for_dialect(Dialect::Oracle, Version::new(11, 2, 0));
        let name = savepoint_name(&long, oracle.max_identifier_length);
        assert_eq!(name, format!("sp_{}", crc32_hex(&long)));
    }
}
