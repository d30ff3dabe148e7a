//! Permission saga with reverse-order compensation
//!
//! Applies an ordered list of permission changes against the platform.
//! Before each change the current level is read and kept in memory; if a
//! later change fails, every change applied so far is restored in LIFO
//! order. The platform cannot span a transaction over multiple users, so
//! this compensation is the only atomicity the sequence gets.

use classroom_access::{AccessControl, AccessError, PermissionLevel, Resource};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A single permission change to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionOp {
    /// User whose permission changes
    pub principal: i64,

    /// Group or project the permission applies to
    pub resource: Resource,

    /// Level the user must end up with
    pub target: PermissionLevel,
}

/// Prior level of an applied change; exists only while the saga runs
#[derive(Debug, Clone, Copy)]
struct PermissionRecord {
    principal: i64,
    resource: Resource,
    prior: PermissionLevel,
}

/// Errors aborting a saga
///
/// `Read` and `Apply` carry the op that failed; compensation for the ops
/// applied before it has already run when the error is returned.
#[derive(Debug, Error)]
pub enum SagaError {
    #[error("Failed to read access level of user {principal} on {resource}: {source}")]
    Read {
        principal: i64,
        resource: Resource,
        source: AccessError,
    },

    #[error("Failed to change access level of user {principal} on {resource}: {source}")]
    Apply {
        principal: i64,
        resource: Resource,
        source: AccessError,
    },

    #[error("Cancelled before all permission changes were applied")]
    Cancelled,
}

/// Executor for an ordered list of permission changes
pub struct PermissionSaga<'a> {
    access: &'a dyn AccessControl,
}

impl<'a> PermissionSaga<'a> {
    pub fn new(access: &'a dyn AccessControl) -> Self {
        Self { access }
    }

    /// Apply every op in order, compensating on failure
    pub async fn execute(&self, ops: &[PermissionOp]) -> Result<(), SagaError> {
        self.execute_with_cancel(ops, &CancellationToken::new())
            .await
    }

    /// Apply every op in order, aborting early when `cancel` fires
    ///
    /// Cancellation only skips ops that have not started; changes already
    /// applied are compensated exactly as on failure.
    pub async fn execute_with_cancel(
        &self,
        ops: &[PermissionOp],
        cancel: &CancellationToken,
    ) -> Result<(), SagaError> {
        let mut applied: Vec<PermissionRecord> = Vec::with_capacity(ops.len());

        for op in ops {
            if cancel.is_cancelled() {
                self.compensate(&applied).await;
                return Err(SagaError::Cancelled);
            }

            let prior = match self.access.get_access_level(op.resource, op.principal).await {
                Ok(level) => level,
                Err(source) => {
                    self.compensate(&applied).await;
                    return Err(SagaError::Read {
                        principal: op.principal,
                        resource: op.resource,
                        source,
                    });
                }
            };

            // Already at the target: nothing to change, nothing to undo
            if prior == op.target {
                debug!(
                    principal = op.principal,
                    resource = %op.resource,
                    level = %op.target,
                    "Access level already at target"
                );
                continue;
            }

            if let Err(source) = self
                .access
                .change_access_level(op.resource, op.principal, op.target)
                .await
            {
                self.compensate(&applied).await;
                return Err(SagaError::Apply {
                    principal: op.principal,
                    resource: op.resource,
                    source,
                });
            }

            applied.push(PermissionRecord {
                principal: op.principal,
                resource: op.resource,
                prior,
            });
        }

        Ok(())
    }

    /// Restore applied changes in reverse order of application
    ///
    /// A failed restore is logged and skipped; the caller still gets the
    /// error that triggered the abort, and the drift reconciler is the
    /// backstop for whatever could not be restored.
    async fn compensate(&self, applied: &[PermissionRecord]) {
        for record in applied.iter().rev() {
            if let Err(err) = self
                .access
                .change_access_level(record.resource, record.principal, record.prior)
                .await
            {
                warn!(
                    principal = record.principal,
                    resource = %record.resource,
                    level = %record.prior,
                    error = %err,
                    "Failed to restore access level during compensation"
                );
            }
        }
    }
}
