//! Transaction control and savepoints.

use super::Generator;
use crate::dialect::{BeginSyntax, IsolationSyntax, SavepointSyntax};
use crate::error::Diagnostics;
use crate::naming::savepoint_name;
use crate::operation::{IsolationLevel, TransactionAction, TransactionMode, TransactionOp};
use crate::statement::GeneratedStatement;

impl Generator<'_> {
    pub(super) fn transaction(
        &self,
        op: &TransactionOp,
        diag: &mut Diagnostics,
    ) -> Vec<GeneratedStatement> {
        let nested = op.transaction.is_nested();
        let savepoint = savepoint_name(&op.transaction.id, self.caps.max_identifier_length);
        let sql = match op.action {
            TransactionAction::Begin if nested => {
                if op.isolation.is_some() || op.mode.is_some() {
                    diag.unsupported("isolation level and mode apply to root transactions only");
                }
                vec![self.savepoint_sql(&savepoint)]
            }
            TransactionAction::Begin => self.begin(op, diag),
            TransactionAction::Savepoint => vec![self.savepoint_sql(&savepoint)],
            TransactionAction::Commit if nested => Vec::new(),
            TransactionAction::Commit => vec![String::from("COMMIT")],
            TransactionAction::Rollback if nested => vec![match self.caps.savepoint {
                SavepointSyntax::Savepoint => format!("ROLLBACK TO SAVEPOINT {savepoint}"),
                SavepointSyntax::SaveTransaction => format!("ROLLBACK TRANSACTION {savepoint}"),
            }],
            TransactionAction::Rollback => vec![String::from("ROLLBACK")],
        };
        sql.into_iter().map(GeneratedStatement::plain).collect()
    }

    fn savepoint_sql(&self, name: &str) -> String {
        match self.caps.savepoint {
            SavepointSyntax::Savepoint => format!("SAVEPOINT {name}"),
            SavepointSyntax::SaveTransaction => format!("SAVE TRANSACTION {name}"),
        }
    }

    /// Statements opening a root transaction, isolation first when the
    /// engine sets it separately.
    fn begin(&self, op: &TransactionOp, diag: &mut Diagnostics) -> Vec<String> {
        let caps = self.caps;
        if op.mode.is_some() && caps.begin != BeginSyntax::BeginWithMode {
            diag.unsupported("transaction mode dropped");
        }
        let mut begin = match caps.begin {
            BeginSyntax::BeginTransaction => String::from("BEGIN TRANSACTION"),
            BeginSyntax::StartTransaction => String::from("START TRANSACTION"),
            BeginSyntax::BeginWithMode => format!(
                "BEGIN {} TRANSACTION",
                op.mode.unwrap_or(TransactionMode::Deferred).as_sql()
            ),
            BeginSyntax::SetTransaction => String::from("SET TRANSACTION READ WRITE"),
        };

        let Some(level) = op.isolation else {
            return vec![begin];
        };
        match caps.isolation {
            IsolationSyntax::SetBeforeBegin => vec![
                format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql()),
                begin,
            ],
            IsolationSyntax::Inline => {
                begin.push_str(&format!(" ISOLATION LEVEL {}", level.as_sql()));
                vec![begin]
            }
            IsolationSyntax::Pragma => match level {
                IsolationLevel::ReadUncommitted => {
                    vec![String::from("PRAGMA read_uncommitted = 1"), begin]
                }
                level if level == caps.default_isolation => vec![begin],
                level => {
                    diag.unsupported(format!("isolation level {} dropped", level.as_sql()));
                    vec![begin]
                }
            },
            IsolationSyntax::SetTransaction => {
                let effective = match level {
                    IsolationLevel::ReadUncommitted => IsolationLevel::ReadCommitted,
                    IsolationLevel::RepeatableRead => IsolationLevel::Serializable,
                    other => other,
                };
                if effective != level {
                    diag.degraded(format!(
                        "isolation level {} runs as {}",
                        level.as_sql(),
                        effective.as_sql()
                    ));
                }
                vec![format!("SET TRANSACTION ISOLATION LEVEL {}", effective.as_sql())]
            }
        }
    }
}
