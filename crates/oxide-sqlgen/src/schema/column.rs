//! Column definitions and the fluent column builder.

use serde::{Deserialize, Serialize};

use crate::dialect::DialectCapabilities;
use crate::types::{ColumnType, FloatOptions, IntOptions, SizeClass};
use crate::value::escape_string;

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// A column's reference to another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// The referenced table.
    pub table: String,
    /// The referenced column.
    pub column: String,
    /// Action on delete.
    #[serde(default)]
    pub on_delete: Option<ReferentialAction>,
    /// Action on update.
    #[serde(default)]
    pub on_update: Option<ReferentialAction>,
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// The current timestamp at insert time.
    Now,
    /// Trusted raw SQL expression.
    Expression(String),
}

impl DefaultValue {
    /// Renders the default as SQL for the given engine.
    #[must_use]
    pub fn to_sql(&self, caps: &DialectCapabilities) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Boolean(b) => String::from(caps.boolean_literal(*b)),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => escape_string(s),
            Self::Now => String::from("CURRENT_TIMESTAMP"),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

/// Uniqueness of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unique {
    /// Not unique.
    #[default]
    None,
    /// Unique on its own.
    Single,
    /// Part of the named composite unique key.
    Group(String),
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Canonical type.
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether the column is (part of) the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether the column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
    /// Uniqueness.
    #[serde(default)]
    pub unique: Unique,
    /// Foreign key reference.
    #[serde(default)]
    pub references: Option<ForeignKeyRef>,
    /// Trusted CHECK expression.
    #[serde(default)]
    pub check: Option<String>,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnSpec {
    /// Creates a nullable column with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
            primary_key: false,
            auto_increment: false,
            unique: Unique::None,
            references: None,
            check: None,
        }
    }
}

/// Fluent builder for [`ColumnSpec`].
///
/// ```rust
/// use oxide_sqlgen::schema::{bigint, string};
///
/// let id = bigint("id").primary_key().auto_increment().build();
/// let email = string("email", 255).not_null().unique().build();
/// assert!(!id.nullable);
/// assert_eq!(email.name, "email");
/// ```
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    spec: ColumnSpec,
}

impl ColumnBuilder {
    /// Creates a new column builder with name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            spec: ColumnSpec::new(name, column_type),
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.spec.nullable = false;
        self
    }

    /// Marks the column as nullable (default).
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.spec.nullable = true;
        self
    }

    /// Marks the column as PRIMARY KEY.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.spec.primary_key = true;
        self.spec.nullable = false;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.spec.auto_increment = true;
        self
    }

    /// Marks the column as UNIQUE on its own.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.spec.unique = Unique::Single;
        self
    }

    /// Adds the column to a named composite unique key.
    #[must_use]
    pub fn unique_group(mut self, group: impl Into<String>) -> Self {
        self.spec.unique = Unique::Group(group.into());
        self
    }

    /// Sets the display length of an integer or float type.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        match &mut self.spec.column_type {
            ColumnType::SmallInt(o) | ColumnType::Integer(o) | ColumnType::BigInt(o) => {
                o.length = Some(length);
            }
            ColumnType::Real(o) | ColumnType::Float(o) | ColumnType::Double(o) => {
                o.length = Some(length);
            }
            ColumnType::String { length: l, .. } => *l = Some(length),
            _ => {}
        }
        self
    }

    /// Marks a numeric type as UNSIGNED.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        match &mut self.spec.column_type {
            ColumnType::SmallInt(o) | ColumnType::Integer(o) | ColumnType::BigInt(o) => {
                o.unsigned = true;
            }
            ColumnType::Real(o) | ColumnType::Float(o) | ColumnType::Double(o) => {
                o.unsigned = true;
            }
            _ => {}
        }
        self
    }

    /// Marks an integer type as ZEROFILL.
    #[must_use]
    pub fn zerofill(mut self) -> Self {
        if let ColumnType::SmallInt(o) | ColumnType::Integer(o) | ColumnType::BigInt(o) =
            &mut self.spec.column_type
        {
            o.zerofill = true;
        }
        self
    }

    /// Sets a boolean default value.
    #[must_use]
    pub fn default_bool(mut self, value: bool) -> Self {
        self.spec.default = Some(DefaultValue::Boolean(value));
        self
    }

    /// Sets an integer default value.
    #[must_use]
    pub fn default_int(mut self, value: i64) -> Self {
        self.spec.default = Some(DefaultValue::Integer(value));
        self
    }

    /// Sets a float default value.
    #[must_use]
    pub fn default_float(mut self, value: f64) -> Self {
        self.spec.default = Some(DefaultValue::Float(value));
        self
    }

    /// Sets a string default value.
    #[must_use]
    pub fn default_str(mut self, value: impl Into<String>) -> Self {
        self.spec.default = Some(DefaultValue::String(value.into()));
        self
    }

    /// Sets a NULL default value.
    #[must_use]
    pub fn default_null(mut self) -> Self {
        self.spec.default = Some(DefaultValue::Null);
        self
    }

    /// Defaults to the current timestamp.
    #[must_use]
    pub fn default_now(mut self) -> Self {
        self.spec.default = Some(DefaultValue::Now);
        self
    }

    /// Sets a trusted raw SQL expression as default.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.spec.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Sets a foreign key reference.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.spec.references = Some(ForeignKeyRef {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
        });
        self
    }

    /// Sets the ON DELETE action of the reference.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        if let Some(ref mut fk) = self.spec.references {
            fk.on_delete = Some(action);
        }
        self
    }

    /// Sets the ON UPDATE action of the reference.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        if let Some(ref mut fk) = self.spec.references {
            fk.on_update = Some(action);
        }
        self
    }

    /// Adds a trusted CHECK expression.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.spec.check = Some(expr.into());
        self
    }

    /// Builds the column definition.
    #[must_use]
    pub fn build(self) -> ColumnSpec {
        self.spec
    }
}

/// Creates a SMALLINT column builder.
#[must_use]
pub fn smallint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::SmallInt(IntOptions::default()))
}

/// Creates an INTEGER column builder.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::integer())
}

/// Creates a BIGINT column builder.
#[must_use]
pub fn bigint(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::bigint())
}

/// Creates a REAL column builder.
#[must_use]
pub fn real(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Real(FloatOptions::default()))
}

/// Creates a FLOAT column builder.
#[must_use]
pub fn float(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Float(FloatOptions::default()))
}

/// Creates a DOUBLE column builder.
#[must_use]
pub fn double(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Double(FloatOptions::default()))
}

/// Creates a DECIMAL column builder.
#[must_use]
pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> ColumnBuilder {
    ColumnBuilder::new(
        name,
        ColumnType::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        },
    )
}

/// Creates a bounded string column builder.
#[must_use]
pub fn string(name: impl Into<String>, length: u32) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::varchar(length))
}

/// Creates a TEXT column builder.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Text(SizeClass::Default))
}

/// Creates a BOOLEAN column builder.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Boolean)
}

/// Creates a date-and-time column builder.
#[must_use]
pub fn datetime(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::DateTime { precision: None })
}

/// Creates a DATE column builder.
#[must_use]
pub fn date(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::DateOnly)
}

/// Creates a TIME column builder.
#[must_use]
pub fn time(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Time)
}

/// Creates a BLOB column builder.
#[must_use]
pub fn blob(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Blob(SizeClass::Default))
}

/// Creates an ENUM column builder.
#[must_use]
pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> ColumnBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ColumnBuilder::new(
        name,
        ColumnType::Enum(values.into_iter().map(Into::into).collect()),
    )
}

/// Creates a UUID column builder.
#[must_use]
pub fn uuid(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, ColumnType::Uuid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_column_builder() {
        let col = bigint("id").primary_key().auto_increment().build();
        assert_eq!(col.name, "id");
        assert!(col.primary_key);
        assert!(col.auto_increment);
        assert!(!col.nullable);

        let col = string("email", 100).not_null().unique().build();
        assert_eq!(col.column_type, ColumnType::varchar(100));
        assert_eq!(col.unique, Unique::Single);

        let col = integer("a").unique_group("pair").build();
        assert_eq!(col.unique, Unique::Group(String::from("pair")));
    }

    #[test]
    fn test_numeric_options() {
        let col = integer("n").length(11).unsigned().zerofill().build();
        assert_eq!(
            col.column_type,
            ColumnType::Integer(IntOptions {
                length: Some(11),
                unsigned: true,
                zerofill: true,
            })
        );
        let col = double("d").unsigned().build();
        assert!(matches!(col.column_type, ColumnType::Double(o) if o.unsigned));
    }

    #[test]
    fn test_references() {
        let col = bigint("user_id")
            .references("users", "id")
            .on_delete(ReferentialAction::Cascade)
            .on_update(ReferentialAction::SetNull)
            .build();
        let fk = col.references.unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, Some(ReferentialAction::SetNull));
    }

    #[test]
    fn test_default_to_sql() {
        let pg = DialectCapabilities::latest(Dialect::Postgres);
        let mssql = DialectCapabilities::latest(Dialect::MsSql);
        assert_eq!(DefaultValue::Boolean(true).to_sql(&pg), "TRUE");
        assert_eq!(DefaultValue::Boolean(true).to_sql(&mssql), "1");
        assert_eq!(DefaultValue::Integer(42).to_sql(&pg), "42");
        assert_eq!(DefaultValue::String("it's".into()).to_sql(&pg), "'it''s'");
        assert_eq!(DefaultValue::Now.to_sql(&pg), "CURRENT_TIMESTAMP");
        assert_eq!(DefaultValue::Null.to_sql(&pg), "NULL");
    }

    #[test]
    fn test_column_spec_deserializes_with_defaults() {
        let col: ColumnSpec =
            serde_json::from_str(r#"{"name": "title", "column_type": {"Text": "Default"}}"#)
                .unwrap();
        assert!(col.nullable);
        assert_eq!(col.unique, Unique::None);
        assert_eq!(col.column_type, ColumnType::Text(SizeClass::Default));
    }
}
