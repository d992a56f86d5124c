//! WHERE clause rendering.

use super::{column_of, Generator};
use crate::error::{Diagnostics, GenerateError, Result};
use crate::predicate::{CompareOp, Operand, Predicate};
use crate::schema::TableSpec;
use crate::statement::BindCollector;
use crate::value::SqlValue;

impl Generator<'_> {
    /// Renders `predicate`, binding every value.
    ///
    /// `definition` types the binds of columns it declares.
    pub(super) fn render_predicate(
        &self,
        predicate: &Predicate,
        definition: Option<&TableSpec>,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        match predicate {
            Predicate::And(children) => {
                self.render_group(children, " AND ", "1 = 1", definition, binds, diag)
            }
            Predicate::Or(children) => {
                self.render_group(children, " OR ", "1 = 0", definition, binds, diag)
            }
            Predicate::Not(child) => {
                let inner = self.render_predicate(child, definition, binds, diag)?;
                Ok(format!("NOT ({inner})"))
            }
            Predicate::Compare {
                column,
                op,
                operand,
            } => self.render_compare(column, *op, operand, definition, binds, diag),
        }
    }

    /// Renders ` WHERE <predicate>`, or nothing.
    pub(super) fn where_clause(
        &self,
        predicate: Option<&Predicate>,
        definition: Option<&TableSpec>,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        match predicate {
            Some(p) => Ok(format!(
                " WHERE {}",
                self.render_predicate(p, definition, binds, diag)?
            )),
            None => Ok(String::new()),
        }
    }

    fn render_group(
        &self,
        children: &[Predicate],
        separator: &str,
        empty: &str,
        definition: Option<&TableSpec>,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        match children {
            [] => Ok(String::from(empty)),
            [only] => self.render_predicate(only, definition, binds, diag),
            _ => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    let sql = self.render_predicate(child, definition, binds, diag)?;
                    if matches!(child, Predicate::And(c) | Predicate::Or(c) if c.len() > 1) {
                        parts.push(format!("({sql})"));
                    } else {
                        parts.push(sql);
                    }
                }
                Ok(parts.join(separator))
            }
        }
    }

    fn render_compare(
        &self,
        column: &str,
        op: CompareOp,
        operand: &Operand,
        definition: Option<&TableSpec>,
        binds: &mut BindCollector,
        diag: &mut Diagnostics,
    ) -> Result<String> {
        let quoted = self.quoter().quote(column);
        let spec = column_of(definition, column);
        let invalid = || {
            GenerateError::InvalidDescriptor(format!(
                "operator {} on '{column}' does not accept this operand",
                op.as_sql()
            ))
        };

        match (op, operand) {
            (CompareOp::IsNull | CompareOp::IsNotNull, Operand::None) => {
                Ok(format!("{quoted} {}", op.as_sql()))
            }
            (CompareOp::Eq, Operand::Value(SqlValue::Null)) => Ok(format!("{quoted} IS NULL")),
            (CompareOp::NotEq, Operand::Value(SqlValue::Null)) => {
                Ok(format!("{quoted} IS NOT NULL"))
            }
            (CompareOp::In, Operand::List(values)) if values.is_empty() => Ok(String::from("1 = 0")),
            (CompareOp::NotIn, Operand::List(values)) if values.is_empty() => {
                Ok(String::from("1 = 1"))
            }
            (CompareOp::In | CompareOp::NotIn, Operand::List(values)) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| self.bind(binds, v, spec))
                    .collect();
                Ok(format!("{quoted} {} ({})", op.as_sql(), placeholders.join(", ")))
            }
            (CompareOp::In | CompareOp::NotIn, Operand::Subquery(query)) => {
                let subquery = self.select_sql(query, binds, diag)?;
                Ok(format!("{quoted} {} ({subquery})", op.as_sql()))
            }
            (CompareOp::Between | CompareOp::NotBetween, Operand::List(bounds)) => {
                let [low, high] = bounds.as_slice() else {
                    return Err(invalid());
                };
                let low = self.bind(binds, low, spec);
                let high = self.bind(binds, high, spec);
                Ok(format!("{quoted} {} {low} AND {high}", op.as_sql()))
            }
            (
                CompareOp::Eq
                | CompareOp::NotEq
                | CompareOp::Lt
                | CompareOp::LtEq
                | CompareOp::Gt
                | CompareOp::GtEq
                | CompareOp::Like
                | CompareOp::NotLike,
                Operand::Value(value),
            ) => {
                let placeholder = self.bind(binds, value, spec);
                Ok(format!("{quoted} {} {placeholder}", op.as_sql()))
            }
            (
                CompareOp::Eq
                | CompareOp::NotEq
                | CompareOp::Lt
                | CompareOp::LtEq
                | CompareOp::Gt
                | CompareOp::GtEq,
                Operand::Column(other),
            ) => Ok(format!(
                "{quoted} {} {}",
                op.as_sql(),
                self.quoter().quote(other)
            )),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectCapabilities};
    use crate::operation::SelectOp;
    use crate::predicate::col;
    use crate::schema::{boolean, TableBuilder};
    use crate::types::TypeRegistry;
    use crate::value::WireType;

    fn render(dialect: Dialect, predicate: &Predicate) -> (String, usize) {
        let caps = DialectCapabilities::latest(dialect);
        let types = TypeRegistry::new();
        let generator = Generator::new(&caps, &types);
        let mut binds = generator.binds();
        let mut diag = Diagnostics::new(dialect);
        let sql = generator
            .render_predicate(predicate, None, &mut binds, &mut diag)
            .unwrap();
        (sql, binds.len())
    }

    #[test]
    fn test_null_comparisons_become_is_null() {
        let (sql, n) = render(Dialect::Postgres, &col("deleted_at").eq(SqlValue::Null));
        assert_eq!(sql, "\"deleted_at\" IS NULL");
        assert_eq!(n, 0);
        let (sql, _) = render(Dialect::Postgres, &col("deleted_at").not_eq(SqlValue::Null));
        assert_eq!(sql, "\"deleted_at\" IS NOT NULL");
    }

    #[test]
    fn test_empty_lists_and_groups() {
        assert_eq!(render(Dialect::MySql, &col("id").in_list(Vec::<i64>::new())).0, "1 = 0");
        assert_eq!(render(Dialect::MySql, &col("id").not_in_list(Vec::<i64>::new())).0, "1 = 1");
        assert_eq!(render(Dialect::MySql, &Predicate::And(vec![])).0, "1 = 1");
        assert_eq!(render(Dialect::MySql, &Predicate::Or(vec![])).0, "1 = 0");
    }

    #[test]
    fn test_placeholders_follow_bind_style() {
        let p = col("a").eq(1).and(col("b").in_list(vec![2, 3])).and(col("c").between(4, 5));
        let (sql, n) = render(Dialect::Postgres, &p);
        assert_eq!(
            sql,
            "\"a\" = $1 AND \"b\" IN ($2, $3) AND \"c\" BETWEEN $4 AND $5"
        );
        assert_eq!(n, 5);

        let (sql, _) = render(Dialect::MsSql, &col("a").eq(1).or(col("b").eq(2)));
        assert_eq!(sql, "[a] = @p1 OR [b] = @p2");
    }

    #[test]
    fn test_nested_groups_are_parenthesized() {
        let p = col("a").eq(1).and(col("b").eq(2).or(col("c").eq(3)));
        let (sql, _) = render(Dialect::Sqlite, &p);
        assert_eq!(sql, "\"a\" = ? AND (\"b\" = ? OR \"c\" = ?)");
        let (sql, _) = render(Dialect::Sqlite, &col("a").eq(1).not());
        assert_eq!(sql, "NOT (\"a\" = ?)");
    }

    #[test]
    fn test_subquery_shares_bind_numbering() {
        let sub = SelectOp::new("orders")
            .columns(&["user_id"])
            .filter(col("total").gt(100));
        let p = col("active").eq(true).and(col("id").in_subquery(sub));
        let (sql, n) = render(Dialect::Postgres, &p);
        assert_eq!(
            sql,
            "\"active\" = $1 AND \"id\" IN (SELECT \"user_id\" FROM \"orders\" WHERE \"total\" > $2)"
        );
        assert_eq!(n, 2);
    }

    #[test]
    fn test_column_operand_and_invalid_shapes() {
        let (sql, n) = render(Dialect::Oracle, &col("updated_at").eq_column("created_at"));
        assert_eq!(sql, "updated_at = created_at");
        assert_eq!(n, 0);

        let caps = DialectCapabilities::latest(Dialect::Oracle);
        let types = TypeRegistry::new();
        let generator = Generator::new(&caps, &types);
        let bad = Predicate::Compare {
            column: String::from("a"),
            op: CompareOp::Between,
            operand: Operand::List(vec![SqlValue::Int(1)]),
        };
        let err = generator
            .render_predicate(
                &bad,
                None,
                &mut generator.binds(),
                &mut Diagnostics::new(Dialect::Oracle),
            )
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_definition_types_binds() {
        let caps = DialectCapabilities::latest(Dialect::MsSql);
        let types = TypeRegistry::new();
        let generator = Generator::new(&caps, &types);
        let table = TableBuilder::new()
            .name("flags")
            .column(boolean("enabled").build())
            .build();
        let mut binds = generator.binds();
        generator
            .render_predicate(
                &col("enabled").eq(true),
                Some(&table),
                &mut binds,
                &mut Diagnostics::new(Dialect::MsSql),
            )
            .unwrap();
        let stmt = binds.finish("");
        assert_eq!(stmt.binds[0].wire, WireType::Bit);
        assert_eq!(stmt.binds[0].value, SqlValue::Int(1));
    }
}
