//! Filter predicates.
//!
//! A [`Predicate`] is a tree of `And`/`Or`/`Not` groups over column
//! comparisons. It carries values, never SQL text: the generator turns every
//! value into a bind when it renders the tree.

use serde::{Deserialize, Serialize};

use crate::operation::SelectOp;
use crate::value::{SqlValue, ToSqlValue};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `BETWEEN`
    Between,
    /// `NOT BETWEEN`
    NotBetween,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl CompareOp {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// No operand (`IS NULL`, `IS NOT NULL`).
    None,
    /// A single value.
    Value(SqlValue),
    /// A list of values (`IN`, or the two bounds of `BETWEEN`).
    List(Vec<SqlValue>),
    /// Another column of the same row.
    Column(String),
    /// A subquery.
    Subquery(Box<SelectOp>),
}

/// A filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// All of the children hold.
    And(Vec<Predicate>),
    /// Any of the children holds.
    Or(Vec<Predicate>),
    /// The child does not hold.
    Not(Box<Predicate>),
    /// A column comparison.
    Compare {
        /// Column name.
        column: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        operand: Operand,
    },
}

impl Predicate {
    /// Combines with `other` using AND, flattening nested ANDs.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Combines with `other` using OR, flattening nested ORs.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negates the predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Equality on every `(column, value)` pair.
    #[must_use]
    pub fn all_eq<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        Self::And(
            pairs
                .into_iter()
                .map(|(column, value)| Self::Compare {
                    column: column.into(),
                    op: CompareOp::Eq,
                    operand: Operand::Value(value),
                })
                .collect(),
        )
    }
}

/// Starts a comparison on `name`.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        name: String::from(name),
    }
}

/// A column reference being turned into a [`Predicate`].
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
}

impl Column {
    fn compare(self, op: CompareOp, operand: Operand) -> Predicate {
        Predicate::Compare {
            column: self.name,
            op,
            operand,
        }
    }

    /// Creates an equality comparison.
    #[must_use]
    pub fn eq<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::Eq, Operand::Value(value.to_sql_value()))
    }

    /// Creates an inequality comparison.
    #[must_use]
    pub fn not_eq<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::NotEq, Operand::Value(value.to_sql_value()))
    }

    /// Creates a less-than comparison.
    #[must_use]
    pub fn lt<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::Lt, Operand::Value(value.to_sql_value()))
    }

    /// Creates a less-than-or-equal comparison.
    #[must_use]
    pub fn lt_eq<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::LtEq, Operand::Value(value.to_sql_value()))
    }

    /// Creates a greater-than comparison.
    #[must_use]
    pub fn gt<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::Gt, Operand::Value(value.to_sql_value()))
    }

    /// Creates a greater-than-or-equal comparison.
    #[must_use]
    pub fn gt_eq<T: ToSqlValue>(self, value: T) -> Predicate {
        self.compare(CompareOp::GtEq, Operand::Value(value.to_sql_value()))
    }

    /// Creates a LIKE comparison.
    #[must_use]
    pub fn like<T: ToSqlValue>(self, pattern: T) -> Predicate {
        self.compare(CompareOp::Like, Operand::Value(pattern.to_sql_value()))
    }

    /// Creates a NOT LIKE comparison.
    #[must_use]
    pub fn not_like<T: ToSqlValue>(self, pattern: T) -> Predicate {
        self.compare(CompareOp::NotLike, Operand::Value(pattern.to_sql_value()))
    }

    /// Creates a BETWEEN comparison.
    #[must_use]
    pub fn between<T: ToSqlValue, U: ToSqlValue>(self, low: T, high: U) -> Predicate {
        self.compare(
            CompareOp::Between,
            Operand::List(vec![low.to_sql_value(), high.to_sql_value()]),
        )
    }

    /// Creates a NOT BETWEEN comparison.
    #[must_use]
    pub fn not_between<T: ToSqlValue, U: ToSqlValue>(self, low: T, high: U) -> Predicate {
        self.compare(
            CompareOp::NotBetween,
            Operand::List(vec![low.to_sql_value(), high.to_sql_value()]),
        )
    }

    /// Creates an IN comparison.
    #[must_use]
    pub fn in_list<T: ToSqlValue>(self, values: Vec<T>) -> Predicate {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.compare(CompareOp::In, Operand::List(values))
    }

    /// Creates a NOT IN comparison.
    #[must_use]
    pub fn not_in_list<T: ToSqlValue>(self, values: Vec<T>) -> Predicate {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.compare(CompareOp::NotIn, Operand::List(values))
    }

    /// Creates an IN comparison against a subquery.
    #[must_use]
    pub fn in_subquery(self, query: SelectOp) -> Predicate {
        self.compare(CompareOp::In, Operand::Subquery(Box::new(query)))
    }

    /// Compares against another column.
    #[must_use]
    pub fn eq_column(self, other: &str) -> Predicate {
        self.compare(CompareOp::Eq, Operand::Column(String::from(other)))
    }

    /// Creates an IS NULL test.
    #[must_use]
    pub fn is_null(self) -> Predicate {
        self.compare(CompareOp::IsNull, Operand::None)
    }

    /// Creates an IS NOT NULL test.
    #[must_use]
    pub fn is_not_null(self) -> Predicate {
        self.compare(CompareOp::IsNotNull, Operand::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let p = col("age").gt_eq(18);
        assert_eq!(
            p,
            Predicate::Compare {
                column: String::from("age"),
                op: CompareOp::GtEq,
                operand: Operand::Value(SqlValue::Int(18)),
            }
        );
        let p = col("id").in_list(vec![1, 2]);
        assert!(matches!(
            p,
            Predicate::Compare { op: CompareOp::In, operand: Operand::List(ref v), .. } if v.len() == 2
        ));
    }

    #[test]
    fn test_and_flattens() {
        let p = col("a").eq(1).and(col("b").eq(2)).and(col("c").eq(3));
        match p {
            Predicate::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected AND, got {other:?}"),
        }
        let p = col("a").eq(1).or(col("b").eq(2)).not();
        assert!(matches!(p, Predicate::Not(_)));
    }

    #[test]
    fn test_all_eq() {
        let p = Predicate::all_eq([("a", SqlValue::Int(1)), ("b", SqlValue::Null)]);
        let Predicate::And(children) = p else {
            panic!("expected AND");
        };
        assert_eq!(children.len(), 2);
    }
}
