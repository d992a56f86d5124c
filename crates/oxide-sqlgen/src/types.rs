//! Canonical column types and the per-engine type registry.
//!
//! A [`ColumnType`] names what a column stores; the [`TypeRegistry`] decides
//! how each engine spells it and how values of that type travel as binds.
//! Renderers are looked up by `(Dialect, TypeKind)` and fall back to the ANSI
//! spelling when an engine has no override.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, DialectCapabilities};
use crate::error::Diagnostics;
use crate::schema::ColumnSpec;
use crate::value::{BindValue, SqlValue, WireType};

/// Options accepted by integer types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntOptions {
    /// Display width.
    pub length: Option<u32>,
    /// Unsigned storage.
    pub unsigned: bool,
    /// Zero-padded display.
    pub zerofill: bool,
}

impl IntOptions {
    /// Returns true when no option is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length.is_none() && !self.unsigned && !self.zerofill
    }
}

/// Options accepted by floating-point types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatOptions {
    /// Total digits.
    pub length: Option<u32>,
    /// Digits after the decimal point.
    pub decimals: Option<u32>,
    /// Unsigned storage.
    pub unsigned: bool,
}

impl FloatOptions {
    /// Returns true when no option is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length.is_none() && self.decimals.is_none() && !self.unsigned
    }
}

/// Size class of unbounded text and binary types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    /// The engine's standard unbounded type.
    #[default]
    Default,
    /// Up to 255 bytes.
    Tiny,
    /// Up to 16 MiB.
    Medium,
    /// Up to 4 GiB.
    Long,
}

/// The canonical, engine-neutral type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 16-bit integer.
    SmallInt(IntOptions),
    /// 32-bit integer.
    Integer(IntOptions),
    /// 64-bit integer.
    BigInt(IntOptions),
    /// Single-precision float.
    Real(FloatOptions),
    /// Float.
    Float(FloatOptions),
    /// Double-precision float.
    Double(FloatOptions),
    /// Exact numeric.
    Decimal {
        /// Total digits.
        precision: Option<u32>,
        /// Digits after the decimal point.
        scale: Option<u32>,
    },
    /// Bounded character (or binary) string.
    String {
        /// Maximum length; 255 when omitted.
        length: Option<u32>,
        /// Binary collation/storage.
        binary: bool,
    },
    /// Unbounded text.
    Text(SizeClass),
    /// Boolean.
    Boolean,
    /// Date and time.
    DateTime {
        /// Fractional seconds precision.
        precision: Option<u32>,
    },
    /// Calendar date.
    DateOnly,
    /// Time of day.
    Time,
    /// Unbounded binary data.
    Blob(SizeClass),
    /// One of a fixed set of string values.
    Enum(Vec<String>),
    /// UUID.
    Uuid,
}

impl ColumnType {
    /// Returns the discriminant used for registry lookups.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::SmallInt(_) => TypeKind::SmallInt,
            Self::Integer(_) => TypeKind::Integer,
            Self::BigInt(_) => TypeKind::BigInt,
            Self::Real(_) => TypeKind::Real,
            Self::Float(_) => TypeKind::Float,
            Self::Double(_) => TypeKind::Double,
            Self::Decimal { .. } => TypeKind::Decimal,
            Self::String { .. } => TypeKind::String,
            Self::Text(_) => TypeKind::Text,
            Self::Boolean => TypeKind::Boolean,
            Self::DateTime { .. } => TypeKind::DateTime,
            Self::DateOnly => TypeKind::DateOnly,
            Self::Time => TypeKind::Time,
            Self::Blob(_) => TypeKind::Blob,
            Self::Enum(_) => TypeKind::Enum,
            Self::Uuid => TypeKind::Uuid,
        }
    }

    /// Returns true for the integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt(_) | Self::Integer(_) | Self::BigInt(_))
    }

    /// Shorthand for `Integer` without options.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer(IntOptions::default())
    }

    /// Shorthand for `BigInt` without options.
    #[must_use]
    pub fn bigint() -> Self {
        Self::BigInt(IntOptions::default())
    }

    /// Shorthand for a `String` of the given length.
    #[must_use]
    pub const fn varchar(length: u32) -> Self {
        Self::String {
            length: Some(length),
            binary: false,
        }
    }
}

/// Discriminant of [`ColumnType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Decimal,
    String,
    Text,
    Boolean,
    DateTime,
    DateOnly,
    Time,
    Blob,
    Enum,
    Uuid,
}

impl TypeKind {
    /// Returns the kind a value would have if no column type were known.
    #[must_use]
    pub const fn of_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(Self::Boolean),
            SqlValue::Int(_) => Some(Self::BigInt),
            SqlValue::Float(_) => Some(Self::Double),
            SqlValue::Text(_) => Some(Self::Text),
            SqlValue::Blob(_) => Some(Self::Blob),
            SqlValue::Date(_) => Some(Self::DateOnly),
            SqlValue::DateTime(_) => Some(Self::DateTime),
            SqlValue::Time(_) => Some(Self::Time),
        }
    }

    /// Returns the wire type values of this kind use by default.
    #[must_use]
    pub const fn wire_type(self) -> WireType {
        match self {
            Self::SmallInt => WireType::SmallInt,
            Self::Integer => WireType::Int,
            Self::BigInt => WireType::BigInt,
            Self::Real => WireType::Real,
            Self::Float | Self::Double => WireType::Double,
            Self::Decimal => WireType::Decimal,
            Self::String | Self::Enum => WireType::VarChar,
            Self::Text => WireType::Text,
            Self::Boolean => WireType::Bool,
            Self::DateTime => WireType::DateTime,
            Self::DateOnly => WireType::Date,
            Self::Time => WireType::Time,
            Self::Blob => WireType::Binary,
            Self::Uuid => WireType::Uuid,
        }
    }
}

/// Renders a column type for one engine.
pub type RenderFn = fn(&ColumnType, &DialectCapabilities, &mut Diagnostics) -> String;

/// Encodes a value of one column kind as a bind for one engine.
pub type EncodeFn = fn(SqlValue, &DialectCapabilities) -> BindValue;

/// Per-engine type rendering and bind encoding.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    renderers: HashMap<(Dialect, TypeKind), RenderFn>,
    encoders: HashMap<(Dialect, TypeKind), EncodeFn>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with the built-in engine overrides.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::ansi();
        crate::dialect::register_type_overrides(&mut registry);
        registry
    }

    /// Creates a registry with no overrides; every engine gets ANSI types.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            renderers: HashMap::new(),
            encoders: HashMap::new(),
        }
    }

    /// Registers (or replaces) the renderer for `kind` on `dialect`.
    pub fn register(&mut self, dialect: Dialect, kind: TypeKind, render: RenderFn) -> &mut Self {
        self.renderers.insert((dialect, kind), render);
        self
    }

    /// Registers (or replaces) the bind encoder for `kind` on `dialect`.
    pub fn register_encoder(
        &mut self,
        dialect: Dialect,
        kind: TypeKind,
        encode: EncodeFn,
    ) -> &mut Self {
        self.encoders.insert((dialect, kind), encode);
        self
    }

    /// Returns the engine type for a column.
    pub fn sql_type(
        &self,
        caps: &DialectCapabilities,
        column: &ColumnSpec,
        diag: &mut Diagnostics,
    ) -> String {
        self.render(caps, &column.column_type, diag)
    }

    /// Returns the engine spelling of `ty`.
    pub fn render(
        &self,
        caps: &DialectCapabilities,
        ty: &ColumnType,
        diag: &mut Diagnostics,
    ) -> String {
        match self.renderers.get(&(caps.dialect, ty.kind())) {
            Some(render) => render(ty, caps, diag),
            None => ansi_type(ty, caps, diag),
        }
    }

    /// Encodes `value` as a bind, typed by `column` when known.
    #[must_use]
    pub fn encode_bind(
        &self,
        caps: &DialectCapabilities,
        value: SqlValue,
        column: Option<&ColumnSpec>,
    ) -> BindValue {
        let kind = match column {
            Some(c) => Some(c.column_type.kind()),
            None => TypeKind::of_value(&value),
        };
        let Some(kind) = kind else {
            return BindValue::new(value, WireType::Null);
        };
        if value.is_null() {
            let wire = self.encoded_wire(caps, kind);
            return BindValue::new(SqlValue::Null, wire);
        }
        match self.encoders.get(&(caps.dialect, kind)) {
            Some(encode) => encode(value, caps),
            None => BindValue::new(value, kind.wire_type()),
        }
    }

    /// Wire type of a typed NULL: whatever the encoder would produce for a
    /// representative value of the kind.
    fn encoded_wire(&self, caps: &DialectCapabilities, kind: TypeKind) -> WireType {
        let Some(encode) = self.encoders.get(&(caps.dialect, kind)) else {
            return kind.wire_type();
        };
        let sample = match kind {
            TypeKind::Boolean => SqlValue::Bool(false),
            TypeKind::SmallInt | TypeKind::Integer | TypeKind::BigInt => SqlValue::Int(0),
            TypeKind::Real | TypeKind::Float | TypeKind::Double | TypeKind::Decimal => {
                SqlValue::Float(0.0)
            }
            TypeKind::Blob => SqlValue::Blob(Vec::new()),
            _ => SqlValue::Text(String::new()),
        };
        encode(sample, caps).wire
    }
}

/// ANSI rendering used when an engine has no override.
fn ansi_type(ty: &ColumnType, caps: &DialectCapabilities, diag: &mut Diagnostics) -> String {
    match ty {
        ColumnType::SmallInt(opts) => plain_integer("SMALLINT", *opts, diag),
        ColumnType::Integer(opts) => plain_integer("INTEGER", *opts, diag),
        ColumnType::BigInt(opts) => plain_integer("BIGINT", *opts, diag),
        ColumnType::Real(opts) => plain_float("REAL", *opts, diag),
        ColumnType::Float(opts) => plain_float("FLOAT", *opts, diag),
        ColumnType::Double(opts) => plain_float("DOUBLE PRECISION", *opts, diag),
        ColumnType::Decimal { precision, scale } => {
            decimal("DECIMAL", *precision, *scale, caps, diag)
        }
        ColumnType::String { length, binary } => {
            let name = if *binary { "VARBINARY" } else { "VARCHAR" };
            format!("{name}({})", length.unwrap_or(255))
        }
        ColumnType::Text(size) => single_class("TEXT", *size, diag),
        ColumnType::Boolean => String::from("BOOLEAN"),
        ColumnType::DateTime { precision } => match precision {
            Some(p) => format!("TIMESTAMP({p})"),
            None => String::from("TIMESTAMP"),
        },
        ColumnType::DateOnly => String::from("DATE"),
        ColumnType::Time => String::from("TIME"),
        ColumnType::Blob(size) => single_class("BLOB", *size, diag),
        ColumnType::Enum(_) => String::from("VARCHAR(255)"),
        ColumnType::Uuid => String::from("CHAR(36)"),
    }
}

/// Renders an integer type, dropping MySQL-only options with a warning.
pub(crate) fn plain_integer(name: &str, opts: IntOptions, diag: &mut Diagnostics) -> String {
    if !opts.is_empty() {
        diag.unsupported(format!(
            "{name} does not support length, UNSIGNED or ZEROFILL; options dropped"
        ));
    }
    String::from(name)
}

/// Renders a float type, dropping length/decimals/unsigned with a warning.
pub(crate) fn plain_float(name: &str, opts: FloatOptions, diag: &mut Diagnostics) -> String {
    if !opts.is_empty() {
        diag.unsupported(format!(
            "{name} does not support length, decimals or UNSIGNED; options dropped"
        ));
    }
    String::from(name)
}

/// Renders a text/binary type on an engine with a single size class.
pub(crate) fn single_class(name: &str, size: SizeClass, diag: &mut Diagnostics) -> String {
    if size != SizeClass::Default {
        diag.unsupported(format!("{name} has no size classes; {size:?} ignored"));
    }
    String::from(name)
}

/// Renders `name(p, s)`, clamping precision to the engine maximum.
pub(crate) fn decimal(
    name: &str,
    precision: Option<u32>,
    scale: Option<u32>,
    caps: &DialectCapabilities,
    diag: &mut Diagnostics,
) -> String {
    let Some(mut p) = precision else {
        return String::from(name);
    };
    if p > caps.max_decimal_precision {
        diag.degraded(format!(
            "{name} precision {p} exceeds the maximum of {}; clamped",
            caps.max_decimal_precision
        ));
        p = caps.max_decimal_precision;
    }
    match scale {
        Some(s) => format!("{name}({p}, {})", s.min(p)),
        None => format!("{name}({p})"),
    }
}

/// Encodes booleans as `1`/`0` integers.
pub(crate) fn encode_bool_as_int(value: SqlValue, _caps: &DialectCapabilities) -> BindValue {
    let value = match value {
        SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
        other => other,
    };
    BindValue::new(value, WireType::Int)
}

/// Encodes a value as text (UUIDs, or dates on engines storing them as text).
pub(crate) fn encode_as_text(value: SqlValue, _caps: &DialectCapabilities) -> BindValue {
    let value = match value {
        SqlValue::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        SqlValue::DateTime(dt) => SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        SqlValue::Time(t) => SqlValue::Text(t.format("%H:%M:%S%.f").to_string()),
        other => other,
    };
    BindValue::new(value, WireType::Text)
}
