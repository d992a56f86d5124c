//! SELECT with row windows.

use super::Generator;
use crate::dialect::{OffsetOnly, Pagination};
use crate::error::{Diagnostics, Result};
use crate::operation::SelectOp;
use crate::statement::{BindCollector, GeneratedStatement};

/// Largest row count MySQL accepts; stands in for "no limit" before an offset.
const MYSQL_MAX_ROWS: u64 = u64::MAX;

impl Generator<'_> {
    pub(super) fn select(
        &self,
        op: &SelectOp,
        diag: &mut Diagnostics,
    ) -> Result<Vec<GeneratedStatement>> {
        let mut binds = self.binds();
        let sql = self.select_sql(op, &mut binds, diag)?;
        Ok(vec![binds.finish(sql)])
    }

    /// Renders a SELECT into `binds`; also used for subqueries.
    pub(super) fn select_sql(
        &self,
        op: &SelectOp,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        let q = self.quoter();
        let columns = if op.columns.is_empty() {
            String::from("*")
        } else {
            q.quote_list(&op.columns)
        };
        let from = format!(
            " FROM {}{}",
            q.table(&op.table),
            self.where_clause(op.predicate.as_ref(), op.definition.as_ref(), binds, diag)?
        );

        if op.limit.is_none() && op.offset.is_none() {
            let explicit = self.order_keys(op, false);
            return Ok(format!("SELECT {columns}{from}{}", order_clause(&explicit)));
        }
        let keys = self.order_keys(op, true);

        Ok(match self.caps.pagination {
            Pagination::LimitOffset => {
                let window = match (op.limit, op.offset) {
                    (Some(n), Some(m)) => format!(" LIMIT {n} OFFSET {m}"),
                    (Some(n), None) => format!(" LIMIT {n}"),
                    (None, Some(m)) => match self.caps.offset_only {
                        OffsetOnly::Bare => format!(" OFFSET {m}"),
                        OffsetOnly::MaxLimit => format!(" LIMIT {m}, {MYSQL_MAX_ROWS}"),
                        OffsetOnly::NegativeLimit => format!(" LIMIT -1 OFFSET {m}"),
                    },
                    (None, None) => String::new(),
                };
                format!("SELECT {columns}{from}{}{window}", order_clause(&keys))
            }
            Pagination::OffsetFetch => {
                let mut sql = format!("SELECT {columns}{from}");
                if keys.is_empty() {
                    diag.limitation("row window without ORDER BY; row order is unspecified");
                    if self.caps.offset_requires_order {
                        sql.push_str(" ORDER BY (SELECT NULL)");
                    }
                } else {
                    sql.push_str(&order_clause(&keys));
                }
                sql.push_str(&format!(" OFFSET {} ROWS", op.offset.unwrap_or(0)));
                if let Some(n) = op.limit {
                    sql.push_str(&format!(" FETCH NEXT {n} ROWS ONLY"));
                }
                sql
            }
            Pagination::TopRowNumber => self.top_row_number(op, &columns, &from, &keys, diag),
            Pagination::RowNum => {
                let ordered = format!("SELECT {columns}{from}{}", order_clause(&keys));
                row_num_window(&ordered, &columns, op.limit, op.offset)
            }
        })
    }

    /// `TOP(n)`, or a `ROW_NUMBER()` window when rows are skipped.
    fn top_row_number(
        &self,
        op: &SelectOp,
        columns: &str,
        from: &str,
        keys: &[String],
        diag: &mut Diagnostics,
    ) -> String {
        let offset = op.offset.unwrap_or(0);
        if offset == 0 {
            let top = op.limit.map(|n| format!("TOP({n}) ")).unwrap_or_default();
            return format!("SELECT {top}{columns}{from}{}", order_clause(keys));
        }

        let q = self.quoter();
        let (row_num, sub) = (q.quote("row_num"), q.quote("sub"));
        let over = if keys.is_empty() {
            diag.limitation("row window without ORDER BY; row order is unspecified");
            String::from("(SELECT NULL)")
        } else {
            keys.join(", ")
        };
        let owner = q.quote(op.table.alias.as_deref().unwrap_or(&op.table.name));
        let top = op
            .limit
            .map_or_else(|| String::from("TOP 100 PERCENT"), |n| format!("TOP({n})"));

        let numbered = format!(
            "SELECT ROW_NUMBER() OVER (ORDER BY {over}) AS {row_num}, {owner}.*{from}"
        );
        let window = format!(
            "SELECT {top} * FROM ({numbered}) AS {sub} WHERE {row_num} > {offset} ORDER BY {row_num}"
        );
        format!("SELECT TOP 100 PERCENT {columns} FROM ({window}) AS {sub} ORDER BY {row_num}")
    }

    /// Explicit ORDER BY terms, falling back to the primary key when
    /// `default_to_key` is set.
    fn order_keys(&self, op: &SelectOp, default_to_key: bool) -> Vec<String> {
        let q = self.quoter();
        if !op.order.is_empty() {
            return op
                .order
                .iter()
                .map(|o| {
                    let column = q.quote(&o.column);
                    if o.descending {
                        format!("{column} DESC")
                    } else {
                        column
                    }
                })
                .collect();
        }
        if !default_to_key {
            return Vec::new();
        }
        op.definition
            .as_ref()
            .map(|t| t.primary_key().into_iter().map(|c| q.quote(c)).collect())
            .unwrap_or_default()
    }
}

fn order_clause(keys: &[String]) -> String {
    if keys.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", keys.join(", "))
    }
}

/// Wraps an ordered query in `ROWNUM` filters.
///
/// The upper bound is left off when `offset + limit` does not fit in a `u64`.
fn row_num_window(ordered: &str, columns: &str, limit: Option<u64>, offset: Option<u64>) -> String {
    let offset = offset.unwrap_or(0);
    match (limit, limit.and_then(|n| n.checked_add(offset))) {
        (Some(n), _) if offset == 0 => format!("SELECT * FROM ({ordered}) WHERE ROWNUM <= {n}"),
        (_, Some(end)) => format!(
            "SELECT {columns} FROM (SELECT sub.*, ROWNUM AS row_num FROM ({ordered}) sub WHERE ROWNUM <= {end}) WHERE row_num > {offset}"
        ),
        (_, None) => format!(
            "SELECT {columns} FROM (SELECT sub.*, ROWNUM AS row_num FROM ({ordered}) sub) WHERE row_num > {offset}"
        ),
    }
}
