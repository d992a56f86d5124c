//! Generated statements and bind collection.

use serde::Serialize;

use crate::dialect::{BindStyle, UpsertStrategy};
use crate::error::Warning;
use crate::value::BindValue;

/// Extra meaning attached to a generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementMarker {
    /// The statement is wrapped in `SET IDENTITY_INSERT .. ON/OFF`.
    IdentityInsertToggled,
    /// The statement is (part of) an upsert rendered with this strategy.
    Upsert(UpsertStrategy),
    /// Step `step` of `of` of a table rebuild; run in order in one transaction.
    RebuildStep {
        /// 1-based step number.
        step: usize,
        /// Total steps.
        of: usize,
    },
}

/// One SQL statement with its binds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedStatement {
    /// SQL text with placeholders.
    pub sql: String,
    /// Bind parameters in placeholder order.
    pub binds: Vec<BindValue>,
    /// Optional marker.
    pub marker: Option<StatementMarker>,
}

impl GeneratedStatement {
    /// A statement without binds.
    #[must_use]
    pub fn plain(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            binds: Vec::new(),
            marker: None,
        }
    }

    /// A statement with binds.
    #[must_use]
    pub fn with_binds(sql: impl Into<String>, binds: Vec<BindValue>) -> Self {
        Self {
            sql: sql.into(),
            binds,
            marker: None,
        }
    }

    /// Attaches a marker.
    #[must_use]
    pub const fn marked(mut self, marker: StatementMarker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// The result of generating one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Generated {
    /// Statements, to be run in order.
    pub statements: Vec<GeneratedStatement>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

impl Generated {
    /// Returns the SQL texts in order.
    #[must_use]
    pub fn sql(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql.as_str()).collect()
    }

    /// Returns the only statement, if exactly one was generated.
    #[must_use]
    pub fn single(&self) -> Option<&GeneratedStatement> {
        match self.statements.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Returns true when no statement was generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Accumulates binds and hands out placeholders in order.
#[derive(Debug)]
pub struct BindCollector {
    style: BindStyle,
    binds: Vec<BindValue>,
}

impl BindCollector {
    /// Creates an empty collector.
    #[must_use]
    pub const fn new(style: BindStyle) -> Self {
        Self {
            style,
            binds: Vec::new(),
        }
    }

    /// Records `bind` and returns its placeholder.
    pub fn push(&mut self, bind: BindValue) -> String {
        self.binds.push(bind);
        self.style.placeholder(self.binds.len())
    }

    /// Number of binds so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.binds.len()
    }

    /// Returns true when nothing has been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    /// Finishes into a statement.
    #[must_use]
    pub fn finish(self, sql: impl Into<String>) -> GeneratedStatement {
        GeneratedStatement::with_binds(sql, self.binds)
    }
}
