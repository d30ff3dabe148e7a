//! Assignment lifecycle: due-date closing and reopening
//!
//! Closing an assignment takes push rights away: every member of every
//! team with an accepted project is downgraded to reporter on that
//! project. Compensation scope is one assignment; a failure on one
//! assignment never unwinds another that already committed.

use chrono::{DateTime, Utc};
use classroom_access::{AccessControl, PermissionLevel, Resource};
use classroom_db::entities::{assignment, assignment_project, membership};
use classroom_db::entities::assignment_project::ProjectStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SyncError;
use crate::saga::{PermissionOp, PermissionSaga};

/// Outcome of one closing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Assignments closed this pass
    pub closed: usize,

    /// Assignments whose saga failed; they stay open for the next pass
    pub failed: usize,
}

pub struct AssignmentLifecycleCoordinator {
    db: DatabaseConnection,
    access: Arc<dyn AccessControl>,
}

impl AssignmentLifecycleCoordinator {
    pub fn new(db: DatabaseConnection, access: Arc<dyn AccessControl>) -> Self {
        Self { db, access }
    }

    /// Close every assignment whose due date has passed
    ///
    /// A failing assignment is logged and skipped; the pass continues
    /// with the next one.
    pub async fn close_due_assignments(&self, now: DateTime<Utc>) -> Result<CloseSummary, SyncError> {
        let due = assignment::Entity::find()
            .filter(assignment::Column::Closed.eq(false))
            .filter(assignment::Column::DueDate.lt(now))
            .order_by_asc(assignment::Column::DueDate)
            .all(&self.db)
            .await?;

        let mut summary = CloseSummary::default();
        for task in due {
            match self.close_assignment(&task).await {
                Ok(()) => summary.closed += 1,
                Err(err) => {
                    warn!(
                        assignment_id = %task.id,
                        error = %err,
                        "Failed to close assignment, leaving it open"
                    );
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Change an assignment's due date, reopening it when the new date
    /// lies in the future (or is removed) and the assignment was closed
    ///
    /// Reopening restores developer access for every member of every
    /// accepted project's team before the closed flag is cleared.
    pub async fn update_assignment(
        &self,
        assignment_id: Uuid,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<(), SyncError> {
        let task = assignment::Entity::find_by_id(assignment_id)
            .one(&self.db)
            .await?
            .ok_or(SyncError::AssignmentNotFound(assignment_id))?;

        let now = Utc::now();
        let reopens = task.closed && due_date.map_or(true, |date| date > now);

        if reopens {
            let ops = self
                .member_ops(&task, PermissionLevel::Developer)
                .await?;
            PermissionSaga::new(self.access.as_ref())
                .execute(&ops)
                .await?;
            info!(assignment_id = %task.id, members = ops.len(), "Assignment reopened");
        }

        let txn = self.db.begin().await?;
        let mut active: assignment::ActiveModel = task.into();
        active.due_date = Set(due_date);
        if reopens {
            active.closed = Set(false);
        }
        active.updated_at = Set(now);
        active.update(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn close_assignment(&self, task: &assignment::Model) -> Result<(), SyncError> {
        let ops = self.member_ops(task, PermissionLevel::Reporter).await?;

        PermissionSaga::new(self.access.as_ref())
            .execute(&ops)
            .await?;

        let txn = self.db.begin().await?;
        let mut active: assignment::ActiveModel = task.clone().into();
        active.closed = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(assignment_id = %task.id, members = ops.len(), "Assignment closed");
        Ok(())
    }

    /// One op per member of every accepted project's team
    async fn member_ops(
        &self,
        task: &assignment::Model,
        target: PermissionLevel,
    ) -> Result<Vec<PermissionOp>, SyncError> {
        let projects = assignment_project::Entity::find()
            .filter(assignment_project::Column::AssignmentId.eq(task.id))
            .filter(assignment_project::Column::Status.eq(ProjectStatus::Accepted))
            .all(&self.db)
            .await?;

        let mut ops = Vec::new();
        for project in projects {
            let members = membership::Entity::find()
                .filter(membership::Column::TeamId.eq(project.team_id))
                .filter(membership::Column::Left.eq(false))
                .all(&self.db)
                .await?;

            for member in members {
                ops.push(PermissionOp {
                    principal: member.user_id,
                    resource: Resource::Project(project.project_id),
                    target,
                });
            }
        }
        Ok(ops)
    }
}
