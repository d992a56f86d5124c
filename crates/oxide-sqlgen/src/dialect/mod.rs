//! Target engines and their capabilities.
//!
//! Every engine difference the generator cares about is captured as data in
//! [`DialectCapabilities`]. The generator never matches on [`Dialect`] to
//! decide syntax; it reads the capability that describes the behavior, so a
//! version bump (for example SQL Server 11 gaining `OFFSET ... FETCH`) is a
//! change in one constructor.

mod generic;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::operation::IsolationLevel;
use crate::types::TypeRegistry;

/// A supported database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    MsSql,
    /// Oracle Database.
    Oracle,
    /// ANSI SQL with no engine extensions.
    Generic,
}

impl Dialect {
    /// All dialects, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Postgres,
        Self::MySql,
        Self::Sqlite,
        Self::MsSql,
        Self::Oracle,
        Self::Generic,
    ];

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::MsSql => "mssql",
            Self::Oracle => "oracle",
            Self::Generic => "generic",
        }
    }

    /// Returns the version assumed when none is configured.
    #[must_use]
    pub const fn default_version(self) -> Version {
        match self {
            Self::Postgres => Version::new(16, 0, 0),
            Self::MySql => Version::new(8, 0, 0),
            Self::Sqlite => Version::new(3, 45, 0),
            Self::MsSql => Version::new(16, 0, 0),
            Self::Oracle => Version::new(19, 0, 0),
            Self::Generic => Version::new(1, 0, 0),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mssql" | "sqlserver" | "tsql" => Ok(Self::MsSql),
            "oracle" => Ok(Self::Oracle),
            "generic" | "ansi" => Ok(Self::Generic),
            other => Err(GenerateError::InvalidDescriptor(format!(
                "unknown dialect '{other}'"
            ))),
        }
    }
}

/// An engine server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true if this version is at least `major.minor`.
    #[must_use]
    pub fn at_least(self, major: u32, minor: u32) -> bool {
        self >= Self::new(major, minor, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = GenerateError;

    /// Parses `major[.minor[.patch]]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GenerateError::InvalidDescriptor(format!("invalid version '{s}'"));
        let mut parts = s.trim().split('.');
        let mut next = |required: bool| -> Result<u32, GenerateError> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };
        let version = Self::new(next(true)?, next(false)?, next(false)?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

/// When identifiers are wrapped in quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuotePolicy {
    /// Every identifier is quoted.
    Always,
    /// Only identifiers that would not parse bare are quoted.
    WhenNeeded,
}

/// How the catalog stores unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CatalogCase {
    /// Stored as written.
    Preserve,
    /// Folded to upper case.
    Upper,
}

/// Bind placeholder syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindStyle {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `@p1`, `@p2`, ...
    AtP,
    /// `:1`, `:2`, ...
    Colon,
}

impl BindStyle {
    /// Renders the placeholder for the 1-based parameter `index`.
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Question => String::from("?"),
            Self::Dollar => format!("${index}"),
            Self::AtP => format!("@p{index}"),
            Self::Colon => format!(":{index}"),
        }
    }
}

/// How an upsert is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertStrategy {
    /// `INSERT ... ON CONFLICT (..) DO UPDATE`.
    OnConflict,
    /// `INSERT ... ON DUPLICATE KEY UPDATE`.
    OnDuplicateKey,
    /// `MERGE INTO ... WHEN MATCHED ... WHEN NOT MATCHED`.
    Merge,
    /// A PL/SQL block with a locking cursor.
    Procedural,
    /// Separate INSERT and UPDATE statements.
    DoubleStatement,
}

impl UpsertStrategy {
    /// Returns whether the caller can tell an insert from an update after
    /// running the statement.
    ///
    /// `OnDuplicateKey` reports 1 or 2 affected rows, `Merge` outputs
    /// `$action` and `Procedural` sets an OUT bind. The other strategies
    /// report one changed row either way.
    #[must_use]
    pub const fn distinguishes_outcome(self) -> bool {
        matches!(self, Self::OnDuplicateKey | Self::Merge | Self::Procedural)
    }
}

/// Row-limited UPDATE/DELETE support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowLimit {
    /// Trailing `LIMIT n`.
    Native,
    /// `UPDATE TOP(n)` / `DELETE TOP(n)`.
    Top,
    /// `WHERE <rowid> IN (SELECT <rowid> ... LIMIT n)`.
    RowIdSubquery {
        /// Name of the physical row id pseudo-column.
        row_id: &'static str,
    },
    /// `WHERE ROWID IN (SELECT ROWID ... AND ROWNUM <= n)`.
    RowNumSubquery,
    /// Not expressible; the limit is dropped with a warning.
    Unsupported,
}

/// `INSERT` that skips duplicate rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsertIgnore {
    /// `ON CONFLICT DO NOTHING`.
    OnConflictDoNothing,
    /// `INSERT IGNORE`.
    InsertIgnore,
    /// `INSERT OR IGNORE`.
    InsertOrIgnore,
    /// Not expressible.
    Unsupported,
}

/// Returning the affected rows from a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Returning {
    /// Trailing `RETURNING *`.
    Returning,
    /// `OUTPUT INSERTED.*` before `VALUES`.
    OutputInserted,
    /// Not expressible.
    Unsupported,
}

/// How an insert of an all-default row is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefaultValuesSyntax {
    /// `INSERT INTO t DEFAULT VALUES`.
    DefaultValues,
    /// `INSERT INTO t () VALUES ()`.
    EmptyParens,
    /// `INSERT INTO t (pk) VALUES (DEFAULT)`.
    DefaultKeyword,
}

/// Row window syntax for SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pagination {
    /// `LIMIT n OFFSET m`.
    LimitOffset,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`.
    OffsetFetch,
    /// `TOP(n)` with `ROW_NUMBER()` nesting for offsets.
    TopRowNumber,
    /// `ROWNUM` nesting.
    RowNum,
}

/// How a window with an offset but no limit is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OffsetOnly {
    /// `OFFSET m` on its own.
    Bare,
    /// `LIMIT m, <max u64>`.
    MaxLimit,
    /// `LIMIT -1 OFFSET m`.
    NegativeLimit,
}

/// Auto-increment column syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdentitySyntax {
    /// `SERIAL` pseudo-types.
    Serial,
    /// `AUTO_INCREMENT`.
    AutoIncrement,
    /// `PRIMARY KEY AUTOINCREMENT` on a sole inline key.
    SqliteAutoIncrement,
    /// `IDENTITY(1,1)`.
    Identity,
    /// `GENERATED BY DEFAULT ON NULL AS IDENTITY`.
    GeneratedOnNull,
    /// `GENERATED BY DEFAULT AS IDENTITY`.
    GeneratedByDefault,
    /// No identity columns; auto-increment is dropped with a warning.
    Unsupported,
}

/// How a column is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropColumnStrategy {
    /// `ALTER TABLE t DROP COLUMN c`.
    Native,
    /// Drop the column's bound default constraints first.
    DropConstraintsFirst,
    /// Drop the identity property first when the column has one.
    DropIdentityFirst,
    /// Rebuild the table through a shadow copy.
    Rebuild,
}

/// Column alteration syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlterColumnSyntax {
    /// One `ALTER COLUMN` clause per changed aspect (`TYPE`, `SET NOT NULL`, ...).
    AlterColumnClauses,
    /// `MODIFY col <definition>`.
    Modify,
    /// `ALTER COLUMN col <type> [NOT] NULL` plus a named default constraint.
    AlterColumnWithDefaultConstraint,
    /// `MODIFY (col <definition>)`.
    ModifyParenthesized,
    /// ANSI `ALTER COLUMN col SET DATA TYPE`.
    SetDataType,
    /// Rebuild the table through a shadow copy.
    Rebuild,
}

/// Column rename syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenameColumnSyntax {
    /// `ALTER TABLE t RENAME COLUMN a TO b`.
    RenameColumn,
    /// `EXEC sp_rename 't.a', 'b', 'COLUMN'`.
    SpRename,
    /// Rebuild the table through a shadow copy.
    Rebuild,
}

/// How `IF [NOT] EXISTS` is expressed on DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExistenceGuard {
    /// Native `IF [NOT] EXISTS`.
    Native,
    /// `IF OBJECT_ID(..) IS [NOT] NULL` batch guard.
    ObjectId,
    /// PL/SQL block swallowing the engine's "exists"/"does not exist" error.
    PlSql,
}

/// How `DROP TABLE .. CASCADE` is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropCascade {
    /// `CASCADE`.
    Cascade,
    /// `CASCADE CONSTRAINTS`.
    CascadeConstraints,
    /// Not expressible.
    Unsupported,
}

/// Table rename syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenameTableSyntax {
    /// `ALTER TABLE a RENAME TO b`.
    AlterTable,
    /// `RENAME TABLE a TO b`.
    RenameTable,
    /// `EXEC sp_rename 'a', 'b'`.
    SpRename,
}

/// Where index and constraint metadata is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CatalogSource {
    /// ANSI `information_schema` views (no index metadata).
    InformationSchema,
    /// `information_schema` including the `STATISTICS` index view.
    InformationSchemaStatistics,
    /// `pg_catalog` tables.
    PgCatalog,
    /// `sqlite_master` and pragma table functions.
    SqliteMaster,
    /// `sys.*` catalog views.
    SysViews,
    /// `USER_*` data dictionary views.
    DataDictionary,
}

/// Transaction start syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BeginSyntax {
    /// `BEGIN TRANSACTION`.
    BeginTransaction,
    /// `START TRANSACTION`.
    StartTransaction,
    /// `BEGIN DEFERRED|IMMEDIATE|EXCLUSIVE TRANSACTION`.
    BeginWithMode,
    /// Implicit start; `SET TRANSACTION` configures it.
    SetTransaction,
}

/// Savepoint syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SavepointSyntax {
    /// `SAVEPOINT n` / `ROLLBACK TO SAVEPOINT n`.
    Savepoint,
    /// `SAVE TRANSACTION n` / `ROLLBACK TRANSACTION n`.
    SaveTransaction,
}

/// How isolation levels are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IsolationSyntax {
    /// `SET TRANSACTION ISOLATION LEVEL ..` before the begin statement.
    SetBeforeBegin,
    /// `BEGIN TRANSACTION ISOLATION LEVEL ..`.
    Inline,
    /// `PRAGMA read_uncommitted`.
    Pragma,
    /// `SET TRANSACTION ISOLATION LEVEL ..` as the begin statement.
    SetTransaction,
}

/// Static facts about one engine at one version.
///
/// Built once by [`DialectCapabilities::for_dialect`] and shared read-only.
#[derive(Debug, Clone, Serialize)]
pub struct DialectCapabilities {
    /// The engine.
    pub dialect: Dialect,
    /// The server version these facts hold for.
    pub version: Version,

    /// Opening identifier quote.
    pub quote_open: char,
    /// Closing identifier quote (doubled when it appears inside a name).
    pub quote_close: char,
    /// When to quote identifiers.
    pub quote_policy: QuotePolicy,
    /// Case of unquoted names in the catalog.
    pub catalog_case: CatalogCase,
    /// Longest identifier accepted, in bytes.
    pub max_identifier_length: usize,
    /// Words that must be quoted, upper case.
    pub reserved_words: &'static [&'static str],

    /// Placeholder syntax.
    pub bind_style: BindStyle,
    /// Maximum bind parameters per statement.
    pub max_bind_parameters: usize,
    /// Maximum rows in one `VALUES` list, if the engine caps it.
    pub max_rows_per_values: Option<usize>,

    /// Upsert rendering.
    pub upsert: UpsertStrategy,
    /// Row-limited UPDATE.
    pub update_limit: RowLimit,
    /// Row-limited DELETE.
    pub delete_limit: RowLimit,
    /// Whether `VALUES (..), (..)` is accepted.
    pub multi_row_values: bool,
    /// Duplicate-skipping INSERT.
    pub insert_ignore: InsertIgnore,
    /// Returning written rows.
    pub returning: Returning,
    /// All-default INSERT.
    pub default_values: DefaultValuesSyntax,
    /// Table to select constants from, if SELECT requires FROM.
    pub dual_table: Option<&'static str>,
    /// SELECT row windows.
    pub pagination: Pagination,
    /// Offset without limit.
    pub offset_only: OffsetOnly,
    /// Whether `OFFSET` needs an `ORDER BY`.
    pub offset_requires_order: bool,

    /// Whether a column definition may carry `REFERENCES`.
    pub inline_references: bool,
    /// Whether PK/UNIQUE/FK/CHECK constraints get explicit names.
    pub names_constraints: bool,
    /// Whether column defaults are named constraints.
    pub named_default_constraints: bool,
    /// Whether the engine rejects cycles or multiple cascade paths.
    pub restricts_cascade_paths: bool,
    /// Whether `ON UPDATE` referential actions exist.
    pub supports_on_update: bool,
    /// Whether the `RESTRICT` referential action exists.
    pub supports_restrict: bool,
    /// Auto-increment syntax.
    pub identity: IdentitySyntax,
    /// Whether explicit identity values need `SET IDENTITY_INSERT`.
    pub identity_insert_toggle: bool,
    /// Column drop strategy.
    pub drop_column: DropColumnStrategy,
    /// Column alteration syntax.
    pub alter_column: AlterColumnSyntax,
    /// Column rename syntax.
    pub rename_column: RenameColumnSyntax,
    /// Table rename syntax.
    pub rename_table: RenameTableSyntax,
    /// `DROP TABLE .. CASCADE`.
    pub drop_cascade: DropCascade,
    /// Whether `DROP INDEX` names the table (`DROP INDEX i ON t`).
    pub drop_index_on_table: bool,
    /// Whether `ALTER TABLE .. ADD` takes the `COLUMN` keyword.
    pub add_column_keyword: bool,
    /// Whether constraints are dropped by kind (`DROP FOREIGN KEY`, ...).
    pub drop_constraint_by_kind: bool,
    /// Whether `ALTER TABLE .. ADD CONSTRAINT` is accepted.
    pub add_constraint: bool,
    /// Whether `TRUNCATE TABLE` exists.
    pub truncate: bool,
    /// Whether `TRUNCATE` accepts `CASCADE` and `RESTART IDENTITY`.
    pub truncate_options: bool,
    /// `IF [NOT] EXISTS` on DDL.
    pub existence_guard: ExistenceGuard,
    /// Whether `ENUM(..)` is a column type.
    pub native_enum: bool,
    /// Largest DECIMAL precision.
    pub max_decimal_precision: u32,
    /// Literals for true and false.
    pub boolean_literals: (&'static str, &'static str),
    /// Whether table aliases take `AS`.
    pub alias_keyword: bool,
    /// Whether nullable columns spell out `NULL`.
    pub explicit_null: bool,

    /// Transaction start.
    pub begin: BeginSyntax,
    /// Isolation level placement.
    pub isolation: IsolationSyntax,
    /// Savepoint syntax.
    pub savepoint: SavepointSyntax,
    /// Isolation level used when none is requested.
    pub default_isolation: IsolationLevel,

    /// Metadata catalog.
    pub catalog: CatalogSource,
}

impl DialectCapabilities {
    /// Returns the capabilities of `dialect` at `version`.
    #[must_use]
    pub fn for_dialect(dialect: Dialect, version: Version) -> Self {
        match dialect {
            Dialect::Postgres => postgres::capabilities(version),
            Dialect::MySql => mysql::capabilities(version),
            Dialect::Sqlite => sqlite::capabilities(version),
            Dialect::MsSql => mssql::capabilities(version),
            Dialect::Oracle => oracle::capabilities(version),
            Dialect::Generic => generic::capabilities(version),
        }
    }

    /// Returns the capabilities of `dialect` at its default version.
    #[must_use]
    pub fn latest(dialect: Dialect) -> Self {
        Self::for_dialect(dialect, dialect.default_version())
    }

    /// Returns whether `word` is reserved (case-insensitive).
    #[must_use]
    pub fn is_reserved(&self, word: &str) -> bool {
        let upper = word.to_ascii_uppercase();
        self.reserved_words.iter().any(|w| *w == upper)
    }

    /// Returns the SQL for a boolean literal.
    #[must_use]
    pub const fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            self.boolean_literals.0
        } else {
            self.boolean_literals.1
        }
    }
}

/// Installs every engine's type overrides into `registry`.
pub(crate) fn register_type_overrides(registry: &mut TypeRegistry) {
    postgres::register_types(registry);
    mysql::register_types(registry);
    sqlite::register_types(registry);
    mssql::register_types(registry);
    oracle::register_types(registry);
}

/// Baseline capabilities shared by the per-engine constructors.
fn ansi(dialect: Dialect, version: Version) -> DialectCapabilities {
    DialectCapabilities {
        dialect,
        version,
        quote_open: '"',
        quote_close: '"',
        quote_policy: QuotePolicy::Always,
        catalog_case: CatalogCase::Preserve,
        max_identifier_length: 128,
        reserved_words: generic::RESERVED_WORDS,
        bind_style: BindStyle::Question,
        max_bind_parameters: 65_535,
        max_rows_per_values: None,
        upsert: UpsertStrategy::DoubleStatement,
        update_limit: RowLimit::Unsupported,
        delete_limit: RowLimit::Unsupported,
        multi_row_values: true,
        insert_ignore: InsertIgnore::Unsupported,
        returning: Returning::Unsupported,
        default_values: DefaultValuesSyntax::DefaultValues,
        dual_table: None,
        pagination: Pagination::OffsetFetch,
        offset_only: OffsetOnly::Bare,
        offset_requires_order: false,
        inline_references: true,
        names_constraints: false,
        named_default_constraints: false,
        restricts_cascade_paths: false,
        supports_on_update: true,
        supports_restrict: true,
        identity: IdentitySyntax::GeneratedByDefault,
        identity_insert_toggle: false,
        drop_column: DropColumnStrategy::Native,
        alter_column: AlterColumnSyntax::SetDataType,
        rename_column: RenameColumnSyntax::RenameColumn,
        rename_table: RenameTableSyntax::AlterTable,
        drop_cascade: DropCascade::Cascade,
        drop_index_on_table: false,
        add_column_keyword: true,
        drop_constraint_by_kind: false,
        add_constraint: true,
        truncate: true,
        truncate_options: false,
        existence_guard: ExistenceGuard::Native,
        native_enum: false,
        max_decimal_precision: 38,
        boolean_literals: ("TRUE", "FALSE"),
        alias_keyword: true,
        explicit_null: false,
        begin: BeginSyntax::StartTransaction,
        isolation: IsolationSyntax::SetBeforeBegin,
        savepoint: SavepointSyntax::Savepoint,
        default_isolation: IsolationLevel::ReadCommitted,
        catalog: CatalogSource::InformationSchema,
    }
}
