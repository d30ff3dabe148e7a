//! Classroom archival
//!
//! Archiving downgrades every non-owner member to reporter on the
//! classroom group before the archived flag is committed. The downgrade
//! runs as one saga over all members, so a failure midway leaves every
//! member at their original level and the classroom unarchived.

use chrono::Utc;
use classroom_access::{AccessControl, PermissionLevel, Resource};
use classroom_db::entities::{classroom, membership};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SyncError;
use crate::saga::{PermissionOp, PermissionSaga};

pub struct ClassroomArchiveCoordinator {
    db: DatabaseConnection,
    access: Arc<dyn AccessControl>,
}

impl ClassroomArchiveCoordinator {
    pub fn new(db: DatabaseConnection, access: Arc<dyn AccessControl>) -> Self {
        Self { db, access }
    }

    /// Archive a classroom, downgrading all non-owner members first
    ///
    /// Succeeds without side effects when the classroom is already
    /// archived. On saga failure the flag stays unset and the error of
    /// the failing permission change is returned unmodified.
    pub async fn archive_classroom(&self, classroom_id: Uuid) -> Result<(), SyncError> {
        let room = classroom::Entity::find_by_id(classroom_id)
            .one(&self.db)
            .await?
            .ok_or(SyncError::ClassroomNotFound(classroom_id))?;

        if room.archived {
            debug!(classroom_id = %room.id, "Classroom already archived");
            return Ok(());
        }

        let members = membership::Entity::find()
            .filter(membership::Column::ClassroomId.eq(room.id))
            .filter(membership::Column::Left.eq(false))
            .all(&self.db)
            .await?;

        let ops: Vec<PermissionOp> = members
            .iter()
            .filter(|member| member.user_id != room.owner_user_id)
            .map(|member| PermissionOp {
                principal: member.user_id,
                resource: Resource::Group(room.group_id),
                target: PermissionLevel::Reporter,
            })
            .collect();

        PermissionSaga::new(self.access.as_ref())
            .execute(&ops)
            .await?;

        let txn = self.db.begin().await?;
        let mut active: classroom::ActiveModel = room.clone().into();
        active.archived = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        txn.commit().await?;

        info!(
            classroom_id = %room.id,
            members = ops.len(),
            "Classroom archived"
        );
        Ok(())
    }
}
