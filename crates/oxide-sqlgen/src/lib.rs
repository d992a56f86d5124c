//! # oxide-sqlgen
//!
//! Cross-dialect SQL generation for PostgreSQL, MySQL, SQLite, SQL Server,
//! Oracle and generic ANSI SQL.
//!
//! This crate provides:
//! - Engine-neutral operation descriptors for DDL, DML, upserts, catalog
//!   lookups and transaction control
//! - Per-engine, per-version capability tables that drive every syntax choice
//! - Parameterized output: caller values always travel as typed binds
//! - Deterministic identifier naming within each engine's length limit
//!
//! ## Generating SQL
//!
//! ```rust
//! use oxide_sqlgen::{col, Dialect, DialectCapabilities, Generator, TypeRegistry};
//! use oxide_sqlgen::operation::SelectOp;
//!
//! let caps = DialectCapabilities::latest(Dialect::Postgres);
//! let types = TypeRegistry::new();
//! let generated = Generator::new(&caps, &types)
//!     .generate(&SelectOp::new("users").filter(col("active").eq(true)).limit(10).into())
//!     .unwrap();
//!
//! assert_eq!(
//!     generated.statements[0].sql,
//!     r#"SELECT * FROM "users" WHERE "active" = $1 LIMIT 10"#
//! );
//! assert_eq!(generated.statements[0].binds.len(), 1);
//! ```
//!
//! ## Warnings
//!
//! Options an engine cannot honor do not fail generation. They come back as
//! [`Warning`]s next to the statements, and are logged through `tracing`.
//! Only structurally invalid descriptors and operations an engine cannot
//! express at all produce a [`GenerateError`].

pub mod checksum;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod naming;
pub mod operation;
pub mod predicate;
pub mod schema;
pub mod statement;
pub mod types;
pub mod value;

pub use dialect::{Dialect, DialectCapabilities, Version};
pub use error::{GenerateError, Result, Warning, WarningKind};
pub use generator::Generator;
pub use operation::OperationDescriptor;
pub use predicate::col;
pub use statement::{Generated, GeneratedStatement};
pub use types::TypeRegistry;
pub use value::{BindValue, SqlValue};
