//! Engine-neutral operation descriptors.
//!
//! Callers describe what they want done as an [`OperationDescriptor`]; the
//! generator decides how each engine spells it. Descriptors are plain values:
//! cloneable, comparable and serializable, with no behavior of their own.

use serde::{Deserialize, Serialize};

use crate::naming::TableRef;
use crate::predicate::Predicate;
use crate::schema::{ColumnSpec, DefaultValue, IndexSpec, ReferentialAction, TableSpec};
use crate::value::{SqlValue, ToSqlValue};

/// An ordered list of `(column, value)` pairs.
pub type Row = Vec<(String, SqlValue)>;

/// CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOp {
    /// The table to create.
    pub table: TableSpec,
    /// Skip when the table exists.
    #[serde(default)]
    pub if_not_exists: bool,
}

/// DROP TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOp {
    /// The table to drop.
    pub table: TableRef,
    /// Skip when the table does not exist.
    #[serde(default)]
    pub if_exists: bool,
    /// Drop dependent objects.
    #[serde(default)]
    pub cascade: bool,
}

/// Renames a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOp {
    /// The table to rename.
    pub table: TableRef,
    /// New name (same schema).
    pub new_name: String,
}

/// ALTER TABLE ... ADD COLUMN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOp {
    /// Target table.
    pub table: TableRef,
    /// Column to add.
    pub column: ColumnSpec,
}

/// Drops a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveColumnOp {
    /// Target table.
    pub table: TableRef,
    /// Column to drop.
    pub column: String,
    /// Current table definition; required by engines that rebuild.
    #[serde(default)]
    pub current: Option<TableSpec>,
    /// Names of constraints bound to the column (SQL Server default
    /// constraints), dropped first.
    #[serde(default)]
    pub bound_constraints: Vec<String>,
    /// Whether the column is an identity column.
    #[serde(default)]
    pub identity: bool,
}

/// Changes a column's type, nullability or default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeColumnOp {
    /// Target table.
    pub table: TableRef,
    /// New definition; its name selects the column.
    pub column: ColumnSpec,
    /// Current table definition; required by engines that rebuild.
    #[serde(default)]
    pub current: Option<TableSpec>,
    /// Name of the column's current default constraint, if any.
    #[serde(default)]
    pub default_constraint: Option<String>,
}

/// Renames a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameColumnOp {
    /// Target table.
    pub table: TableRef,
    /// Current name.
    pub from: String,
    /// New name.
    pub to: String,
    /// Current table definition; required by engines that rebuild.
    #[serde(default)]
    pub current: Option<TableSpec>,
}

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddIndexOp {
    /// Target table.
    pub table: TableRef,
    /// The index.
    pub index: IndexSpec,
}

/// DROP INDEX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveIndexOp {
    /// Table the index belongs to.
    pub table: TableRef,
    /// Index name.
    pub name: String,
}

/// INSERT of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOp {
    /// Target table.
    pub table: TableRef,
    /// Values to insert.
    pub values: Row,
    /// Table definition for typed binds and identity handling.
    #[serde(default)]
    pub definition: Option<TableSpec>,
    /// Skip rows that violate a unique key.
    #[serde(default)]
    pub ignore_duplicates: bool,
    /// Return the inserted row.
    #[serde(default)]
    pub returning: bool,
}

impl InsertOp {
    /// Creates an insert with no values.
    #[must_use]
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            definition: None,
            ignore_duplicates: false,
            returning: false,
        }
    }

    /// Adds a value.
    #[must_use]
    pub fn value<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.values.push((String::from(column), value.to_sql_value()));
        self
    }

    /// Attaches the table definition.
    #[must_use]
    pub fn definition(mut self, table: TableSpec) -> Self {
        self.definition = Some(table);
        self
    }

    /// Skips duplicate rows.
    #[must_use]
    pub const fn ignore_duplicates(mut self) -> Self {
        self.ignore_duplicates = true;
        self
    }

    /// Returns the inserted row.
    #[must_use]
    pub const fn returning(mut self) -> Self {
        self.returning = true;
        self
    }
}

/// INSERT of many rows, split into batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkInsertOp {
    /// Target table.
    pub table: TableRef,
    /// Rows; missing columns bind NULL.
    pub rows: Vec<Row>,
    /// Table definition for typed binds and identity handling.
    #[serde(default)]
    pub definition: Option<TableSpec>,
    /// Skip rows that violate a unique key.
    #[serde(default)]
    pub ignore_duplicates: bool,
}

/// UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOp {
    /// Target table.
    pub table: TableRef,
    /// Changed attributes.
    pub values: Row,
    /// Row filter.
    #[serde(default)]
    pub predicate: Option<Predicate>,
    /// Table definition for typed binds and identity handling.
    #[serde(default)]
    pub definition: Option<TableSpec>,
    /// Maximum rows to update.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Return the updated rows.
    #[serde(default)]
    pub returning: bool,
}

impl UpdateOp {
    /// Creates an update with no assignments.
    #[must_use]
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            predicate: None,
            definition: None,
            limit: None,
            returning: false,
        }
    }

    /// Adds an assignment.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.values.push((String::from(column), value.to_sql_value()));
        self
    }

    /// Sets the row filter.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Attaches the table definition.
    #[must_use]
    pub fn definition(mut self, table: TableSpec) -> Self {
        self.definition = Some(table);
        self
    }

    /// Limits the number of rows updated.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// DELETE (or TRUNCATE).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOp {
    /// Target table.
    pub table: TableRef,
    /// Row filter.
    #[serde(default)]
    pub predicate: Option<Predicate>,
    /// Table definition for typed binds.
    #[serde(default)]
    pub definition: Option<TableSpec>,
    /// Maximum rows to delete.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Empty the whole table, ignoring filter and limit.
    #[serde(default)]
    pub truncate: bool,
    /// With `truncate`: also truncate referencing tables.
    #[serde(default)]
    pub cascade: bool,
    /// With `truncate`: reset identity sequences.
    #[serde(default)]
    pub restart_identity: bool,
}

impl DeleteOp {
    /// Creates an unfiltered delete.
    #[must_use]
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            predicate: None,
            definition: None,
            limit: None,
            truncate: false,
            cascade: false,
            restart_identity: false,
        }
    }

    /// Sets the row filter.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Limits the number of rows deleted.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Truncates the table instead.
    #[must_use]
    pub const fn truncate(mut self) -> Self {
        self.truncate = true;
        self
    }
}

/// Insert-or-update of one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertOp {
    /// Target table.
    pub table: TableRef,
    /// Values to insert.
    pub values: Row,
    /// Columns to update on conflict; defaults to the inserted columns minus
    /// the conflict target.
    #[serde(default)]
    pub update_columns: Option<Vec<String>>,
    /// Explicit conflict target.
    #[serde(default)]
    pub conflict_fields: Option<Vec<String>>,
    /// Table definition; supplies keys when no conflict target is given.
    #[serde(default)]
    pub definition: Option<TableSpec>,
    /// Return the written row.
    #[serde(default)]
    pub returning: bool,
}

impl UpsertOp {
    /// Creates an upsert with no values.
    #[must_use]
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            update_columns: None,
            conflict_fields: None,
            definition: None,
            returning: false,
        }
    }

    /// Adds a value.
    #[must_use]
    pub fn value<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.values.push((String::from(column), value.to_sql_value()));
        self
    }

    /// Attaches the table definition.
    #[must_use]
    pub fn definition(mut self, table: TableSpec) -> Self {
        self.definition = Some(table);
        self
    }

    /// Sets an explicit conflict target.
    #[must_use]
    pub fn conflict_on<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.conflict_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the columns updated on conflict.
    #[must_use]
    pub fn update_only<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.update_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Column name.
    pub column: String,
    /// Descending order.
    #[serde(default)]
    pub descending: bool,
}

impl OrderBy {
    /// Ascending order on `column`.
    #[must_use]
    pub fn asc(column: &str) -> Self {
        Self {
            column: String::from(column),
            descending: false,
        }
    }

    /// Descending order on `column`.
    #[must_use]
    pub fn desc(column: &str) -> Self {
        Self {
            column: String::from(column),
            descending: true,
        }
    }
}

/// SELECT with an optional row window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOp {
    /// Source table.
    pub table: TableRef,
    /// Columns to return; empty selects `*`.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Row filter.
    #[serde(default)]
    pub predicate: Option<Predicate>,
    /// Ordering.
    #[serde(default)]
    pub order: Vec<OrderBy>,
    /// Maximum rows.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: Option<u64>,
    /// Table definition; supplies the primary key as default order.
    #[serde(default)]
    pub definition: Option<TableSpec>,
}

impl SelectOp {
    /// Selects every column of `table`.
    #[must_use]
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            predicate: None,
            order: Vec::new(),
            limit: None,
            offset: None,
            definition: None,
        }
    }

    /// Selects specific columns.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Sets the row filter.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Adds an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }

    /// Sets the maximum number of rows.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of rows to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attaches the table definition.
    #[must_use]
    pub fn definition(mut self, table: TableSpec) -> Self {
        self.definition = Some(table);
        self
    }
}

/// Kind of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    /// PRIMARY KEY.
    PrimaryKey,
    /// UNIQUE.
    Unique,
    /// FOREIGN KEY.
    ForeignKey,
    /// CHECK.
    Check,
    /// Column DEFAULT.
    Default,
}

/// A constraint to add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// PRIMARY KEY over columns.
    PrimaryKey {
        /// Key columns.
        columns: Vec<String>,
    },
    /// UNIQUE over columns.
    Unique {
        /// Key columns.
        columns: Vec<String>,
    },
    /// FOREIGN KEY.
    ForeignKey {
        /// Referencing columns.
        columns: Vec<String>,
        /// Referenced table.
        references_table: String,
        /// Referenced columns.
        references_columns: Vec<String>,
        /// Action on delete.
        #[serde(default)]
        on_delete: Option<ReferentialAction>,
        /// Action on update.
        #[serde(default)]
        on_update: Option<ReferentialAction>,
    },
    /// Trusted CHECK expression.
    Check {
        /// Expression.
        expression: String,
    },
    /// Column default.
    Default {
        /// Column.
        column: String,
        /// Default value.
        value: DefaultValue,
    },
}

impl ConstraintKind {
    /// Returns the kind tag.
    #[must_use]
    pub const fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::PrimaryKey { .. } => ConstraintType::PrimaryKey,
            Self::Unique { .. } => ConstraintType::Unique,
            Self::ForeignKey { .. } => ConstraintType::ForeignKey,
            Self::Check { .. } => ConstraintType::Check,
            Self::Default { .. } => ConstraintType::Default,
        }
    }
}

/// ALTER TABLE ... ADD CONSTRAINT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddConstraintOp {
    /// Target table.
    pub table: TableRef,
    /// Constraint name; generated when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// The constraint.
    pub constraint: ConstraintKind,
}

/// ALTER TABLE ... DROP CONSTRAINT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropConstraintOp {
    /// Target table.
    pub table: TableRef,
    /// Constraint name.
    pub name: String,
    /// Constraint kind (MySQL drops by kind).
    pub kind: ConstraintType,
}

/// Lists a table's indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowIndexesOp {
    /// Target table.
    pub table: TableRef,
}

/// Lists a table's constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowConstraintsOp {
    /// Target table.
    pub table: TableRef,
    /// Restrict to constraints on this column.
    #[serde(default)]
    pub column: Option<String>,
    /// Restrict to this kind.
    #[serde(default)]
    pub kind: Option<ConstraintType>,
}

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationLevel {
    /// READ UNCOMMITTED.
    ReadUncommitted,
    /// READ COMMITTED.
    ReadCommitted,
    /// REPEATABLE READ.
    RepeatableRead,
    /// SERIALIZABLE.
    Serializable,
}

impl IsolationLevel {
    /// Returns the SQL spelling.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// SQLite locking mode of a new transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionMode {
    /// Locks on first access.
    Deferred,
    /// Takes the write lock at once.
    Immediate,
    /// Takes an exclusive lock at once.
    Exclusive,
}

impl TransactionMode {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Deferred => "DEFERRED",
            Self::Immediate => "IMMEDIATE",
            Self::Exclusive => "EXCLUSIVE",
        }
    }
}

/// Identifies a transaction and, for nested ones, its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRef {
    /// Transaction id; nested transactions use it as savepoint name.
    pub id: String,
    /// Parent transaction id, if nested.
    #[serde(default)]
    pub parent: Option<String>,
}

impl TransactionRef {
    /// A root transaction.
    #[must_use]
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
        }
    }

    /// A transaction nested in `parent`.
    #[must_use]
    pub fn nested(id: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
        }
    }

    /// Returns whether this transaction is nested.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.parent.is_some()
    }
}

/// Transaction control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAction {
    /// Start (or open a savepoint when nested).
    Begin,
    /// Set an explicit savepoint named by the transaction id.
    Savepoint,
    /// Commit (no-op when nested).
    Commit,
    /// Roll back (to the savepoint when nested).
    Rollback,
}

/// Transaction control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOp {
    /// Action.
    pub action: TransactionAction,
    /// Transaction.
    pub transaction: TransactionRef,
    /// Isolation level, on `Begin` of a root transaction.
    #[serde(default)]
    pub isolation: Option<IsolationLevel>,
    /// SQLite locking mode, on `Begin` of a root transaction.
    #[serde(default)]
    pub mode: Option<TransactionMode>,
}

impl TransactionOp {
    /// Creates a transaction operation with no isolation or mode.
    #[must_use]
    pub const fn new(action: TransactionAction, transaction: TransactionRef) -> Self {
        Self {
            action,
            transaction,
            isolation: None,
            mode: None,
        }
    }
}

/// A dialect-neutral description of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationDescriptor {
    /// CREATE TABLE.
    CreateTable(CreateTableOp),
    /// DROP TABLE.
    DropTable(DropTableOp),
    /// Rename a table.
    RenameTable(RenameTableOp),
    /// Add a column.
    AddColumn(AddColumnOp),
    /// Drop a column.
    RemoveColumn(RemoveColumnOp),
    /// Change a column.
    ChangeColumn(ChangeColumnOp),
    /// Rename a column.
    RenameColumn(RenameColumnOp),
    /// Create an index.
    AddIndex(AddIndexOp),
    /// Drop an index.
    RemoveIndex(RemoveIndexOp),
    /// Insert one row.
    Insert(InsertOp),
    /// Insert many rows.
    BulkInsert(BulkInsertOp),
    /// Update rows.
    Update(UpdateOp),
    /// Delete rows.
    Delete(DeleteOp),
    /// Insert or update one row.
    Upsert(UpsertOp),
    /// Select rows.
    Select(SelectOp),
    /// Add a constraint.
    AddConstraint(AddConstraintOp),
    /// Drop a constraint.
    DropConstraint(DropConstraintOp),
    /// List indexes.
    ShowIndexes(ShowIndexesOp),
    /// List constraints.
    ShowConstraints(ShowConstraintsOp),
    /// Transaction control.
    Transaction(TransactionOp),
}

impl OperationDescriptor {
    /// Returns the operation name, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "create_table",
            Self::DropTable(_) => "drop_table",
            Self::RenameTable(_) => "rename_table",
            Self::AddColumn(_) => "add_column",
            Self::RemoveColumn(_) => "remove_column",
            Self::ChangeColumn(_) => "change_column",
            Self::RenameColumn(_) => "rename_column",
            Self::AddIndex(_) => "add_index",
            Self::RemoveIndex(_) => "remove_index",
            Self::Insert(_) => "insert",
            Self::BulkInsert(_) => "bulk_insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Upsert(_) => "upsert",
            Self::Select(_) => "select",
            Self::AddConstraint(_) => "add_constraint",
            Self::DropConstraint(_) => "drop_constraint",
            Self::ShowIndexes(_) => "show_indexes",
            Self::ShowConstraints(_) => "show_constraints",
            Self::Transaction(_) => "transaction",
        }
    }
}

macro_rules! impl_from_op {
    ($($op:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$op> for OperationDescriptor {
                fn from(op: $op) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_op! {
    CreateTableOp => CreateTable,
    DropTableOp => DropTable,
    RenameTableOp => RenameTable,
    AddColumnOp => AddColumn,
    RemoveColumnOp => RemoveColumn,
    ChangeColumnOp => ChangeColumn,
    RenameColumnOp => RenameColumn,
    AddIndexOp => AddIndex,
    RemoveIndexOp => RemoveIndex,
    InsertOp => Insert,
    BulkInsertOp => BulkInsert,
    UpdateOp => Update,
    DeleteOp => Delete,
    UpsertOp => Upsert,
    SelectOp => Select,
    AddConstraintOp => AddConstraint,
    DropConstraintOp => DropConstraint,
    ShowIndexesOp => ShowIndexes,
    ShowConstraintsOp => ShowConstraints,
    TransactionOp => Transaction,
}
