//! Error and warning types for SQL generation.

use serde::Serialize;
use tracing::warn;

use crate::dialect::Dialect;

/// Errors that abort SQL generation.
///
/// Everything except [`GenerateError::DialectMismatch`] describes a
/// descriptor that is structurally invalid for the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// More than one auto-increment column was declared on a table.
    #[error("Table '{table}' declares more than one auto-increment column: {}", .columns.join(", "))]
    MultipleAutoIncrement {
        /// Table name.
        table: String,
        /// The offending columns.
        columns: Vec<String>,
    },

    /// An ENUM column was declared without values.
    #[error("ENUM column '{column}' must list at least one value")]
    EmptyEnum {
        /// Column name.
        column: String,
    },

    /// An upsert could not find a primary key or unique key to resolve conflicts on.
    #[error("Upsert on '{table}' needs a primary key or unique key present in the values")]
    MissingConflictTarget {
        /// Table name.
        table: String,
    },

    /// An UPDATE had nothing to assign.
    #[error("Update on '{table}' has no attributes to set")]
    EmptyAssignment {
        /// Table name.
        table: String,
    },

    /// An INSERT or table definition had no columns.
    #[error("'{table}' has no columns")]
    EmptyColumns {
        /// Table name.
        table: String,
    },

    /// The operation needs the current table definition and none was supplied.
    #[error("{operation} on '{table}' requires the current table definition")]
    MissingTableDefinition {
        /// Table name.
        table: String,
        /// Operation that needed it.
        operation: &'static str,
    },

    /// A column named by the descriptor does not exist in the supplied definition.
    #[error("Column '{column}' does not exist on '{table}'")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Any other structural problem with a descriptor.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// The target engine cannot express the requested feature, even approximately.
    #[error("{dialect} cannot express {feature}")]
    DialectMismatch {
        /// Target dialect.
        dialect: Dialect,
        /// Description of the requested feature.
        feature: String,
    },
}

impl GenerateError {
    /// Returns whether this error is a configuration error (an invalid
    /// descriptor) rather than a dialect limitation.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::DialectMismatch { .. })
    }

    pub(crate) fn mismatch(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::DialectMismatch {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Result type for SQL generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Category of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// An option has no equivalent on the engine and was dropped.
    UnsupportedOption,
    /// An option was replaced by the closest supported form.
    Degraded,
    /// The emitted SQL has a documented behavioral limitation.
    Limitation,
}

/// A non-fatal diagnostic produced during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Dialect the statement was generated for.
    pub dialect: Dialect,
    /// Category.
    pub kind: WarningKind,
    /// Human-readable message.
    pub message: String,
}

/// Collects warnings for a single generation call.
///
/// Every pushed warning is also logged at WARN level.
#[derive(Debug)]
pub struct Diagnostics {
    dialect: Dialect,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collector for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            warnings: Vec::new(),
        }
    }

    /// Records a warning.
    pub fn push(&mut self, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        warn!(dialect = %self.dialect, ?kind, "{message}");
        self.warnings.push(Warning {
            dialect: self.dialect,
            kind,
            message,
        });
    }

    /// Records an [`WarningKind::UnsupportedOption`] warning.
    pub fn unsupported(&mut self, message: impl Into<String>) {
        self.push(WarningKind::UnsupportedOption, message);
    }

    /// Records a [`WarningKind::Degraded`] warning.
    pub fn degraded(&mut self, message: impl Into<String>) {
        self.push(WarningKind::Degraded, message);
    }

    /// Records a [`WarningKind::Limitation`] warning.
    pub fn limitation(&mut self, message: impl Into<String>) {
        self.push(WarningKind::Limitation, message);
    }

    /// Returns the recorded warnings in order.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
