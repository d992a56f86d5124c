//! End-to-end generation scenarios across engines.

mod common;

use common::{generate, generate_at, text};
use oxide_sqlgen::dialect::UpsertStrategy;
use oxide_sqlgen::naming::{constraint_name, ConstraintPrefix, TableRef};
use oxide_sqlgen::operation::{BulkInsertOp, CreateTableOp, DeleteOp, Row, SelectOp, UpsertOp};
use oxide_sqlgen::predicate::col;
use oxide_sqlgen::schema::{integer, string, TableBuilder};
use oxide_sqlgen::statement::StatementMarker;
use oxide_sqlgen::{Dialect, SqlValue, Version, WarningKind};

// =============================================================================
// Identifier limits
// =============================================================================

#[test]
fn test_long_table_on_oracle_11_gets_short_constraint_names() {
    let name = "customer_account_transaction_history_log";
    assert_eq!(name.len(), 40);
    let table = TableBuilder::new()
        .name(name)
        .column(integer("id").primary_key().auto_increment().build())
        .column(string("name", 255).build())
        .build();
    let op = CreateTableOp {
        table,
        if_not_exists: false,
    };

    let first = generate_at(Dialect::Oracle, Version::new(11, 2, 0), op.clone());
    let second = generate_at(Dialect::Oracle, Version::new(11, 2, 0), op);
    assert_eq!(first, second);

    let pk = constraint_name(ConstraintPrefix::PrimaryKey, name, &["id"], 30);
    assert!(pk.len() <= 30, "{pk} is longer than 30 bytes");
    assert!(pk.starts_with("PK_"));
    assert!(
        first.statements[0]
            .sql
            .contains(&format!("CONSTRAINT {pk} PRIMARY KEY (id)")),
        "{}",
        first.statements[0].sql
    );
}

// =============================================================================
// Bulk insert batching
// =============================================================================

#[test]
fn test_thousand_rows_on_mssql_split_by_bind_limit() {
    let columns = ["a", "b", "c", "d", "e"];
    let rows: Vec<Row> = (0..1000)
        .map(|i| {
            columns
                .iter()
                .map(|c| ((*c).to_string(), SqlValue::Int(i)))
                .collect()
        })
        .collect();
    let op = BulkInsertOp {
        table: TableRef::new("metrics"),
        rows,
        definition: None,
        ignore_duplicates: false,
    };
    let generated = generate(Dialect::MsSql, op);

    let sizes: Vec<usize> = generated
        .statements
        .iter()
        .map(|s| s.binds.len() / columns.len())
        .collect();
    assert_eq!(sizes, vec![351, 351, 298]);
    for stmt in &generated.statements {
        assert!(stmt.binds.len() <= 2100);
        assert!(stmt
            .sql
            .starts_with("INSERT INTO [metrics] ([a], [b], [c], [d], [e]) VALUES (@p1, @p2"));
    }
    assert!(generated.statements[0].sql.ends_with("@p1755)"));
    assert_eq!(generated.statements[2].binds[0].value, SqlValue::Int(702));
}

// =============================================================================
// Upsert conflict targets
// =============================================================================

#[test]
fn test_upsert_without_primary_key_targets_unique_email() {
    let subscribers = TableBuilder::new()
        .name("subscribers")
        .column(string("email", 255).not_null().unique().build())
        .column(string("name", 64).build())
        .build();
    let op = UpsertOp::new("subscribers")
        .value("email", "a@b.com")
        .value("name", "Ann")
        .definition(subscribers);

    let pg = generate(Dialect::Postgres, op.clone());
    assert_eq!(
        pg.sql(),
        vec!["INSERT INTO \"subscribers\" (\"email\", \"name\") VALUES ($1, $2) ON CONFLICT (\"email\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""]
    );

    let mysql = generate(Dialect::MySql, op.clone());
    assert_eq!(
        mysql.sql(),
        vec!["INSERT INTO `subscribers` (`email`, `name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"]
    );

    let mssql = generate(Dialect::MsSql, op.clone());
    assert!(mssql.statements[0]
        .sql
        .contains("ON [subscribers_target].[email] = [subscribers_source].[email]"));

    let oracle = generate(Dialect::Oracle, op);
    assert!(oracle.statements[0].sql.contains("WHERE email = :1 FOR UPDATE"));
    assert_eq!(
        oracle.statements[0].marker,
        Some(StatementMarker::Upsert(UpsertStrategy::Procedural))
    );
}

// =============================================================================
// Pagination
// =============================================================================

#[test]
fn test_mssql_2008_paginates_through_row_number() {
    let op = SelectOp::new("orders")
        .filter(col("status").eq("open"))
        .order_by(oxide_sqlgen::operation::OrderBy::desc("created_at"))
        .limit(10)
        .offset(20);
    let generated = generate_at(Dialect::MsSql, Version::new(10, 0, 0), op.clone());
    assert_eq!(
        generated.sql(),
        vec![concat!(
            "SELECT TOP 100 PERCENT * FROM (",
            "SELECT TOP(10) * FROM (",
            "SELECT ROW_NUMBER() OVER (ORDER BY [created_at] DESC) AS [row_num], [orders].* FROM [orders] WHERE [status] = @p1",
            ") AS [sub] WHERE [row_num] > 20 ORDER BY [row_num]",
            ") AS [sub] ORDER BY [row_num]"
        )]
    );
    assert_eq!(generated.statements[0].binds[0].value, text("open"));

    let modern = generate_at(Dialect::MsSql, Version::new(11, 0, 0), op);
    assert_eq!(
        modern.sql(),
        vec!["SELECT * FROM [orders] WHERE [status] = @p1 ORDER BY [created_at] DESC OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"]
    );
}

// =============================================================================
// Row-limited DELETE
// =============================================================================

#[test]
fn test_sqlite_delete_with_limit_uses_rowid_subquery() {
    let op = DeleteOp::new("sessions")
        .filter(col("expired").eq(true))
        .limit(5);
    let generated = generate(Dialect::Sqlite, op.clone());
    assert_eq!(
        generated.sql(),
        vec!["DELETE FROM \"sessions\" WHERE rowid IN (SELECT rowid FROM \"sessions\" WHERE \"expired\" = ? LIMIT 5)"]
    );
    assert!(generated.warnings.is_empty());

    let generic = generate(Dialect::Generic, op);
    assert_eq!(generic.sql(), vec!["DELETE FROM sessions WHERE expired = ?"]);
    assert_eq!(generic.warnings[0].kind, WarningKind::UnsupportedOption);
}
