//! Drift reconciliation
//!
//! Changes made directly on the platform (renames, members leaving) are
//! folded back into the local store on a timer. External state wins;
//! nothing is written back to the platform, so no compensation is needed.

use classroom_access::{AccessControl, Resource};
use classroom_db::entities::{classroom, membership};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::SyncError;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Classrooms inspected
    pub classrooms: usize,

    /// Classrooms whose platform reads failed; retried next pass
    pub failed: usize,

    /// Classrooms whose name or description was updated
    pub updated: usize,

    /// Members marked as having left
    pub members_left: usize,
}

pub struct DriftReconciler {
    db: DatabaseConnection,
    access: Arc<dyn AccessControl>,
}

impl DriftReconciler {
    pub fn new(db: DatabaseConnection, access: Arc<dyn AccessControl>) -> Self {
        Self { db, access }
    }

    /// Reconcile every unarchived classroom against the platform
    ///
    /// A classroom whose platform reads fail is logged and skipped; the
    /// pass continues with the next one.
    pub async fn reconcile_once(&self) -> Result<ReconcileSummary, SyncError> {
        let classrooms = classroom::Entity::find()
            .filter(classroom::Column::Archived.eq(false))
            .all(&self.db)
            .await?;

        let mut summary = ReconcileSummary {
            classrooms: classrooms.len(),
            ..ReconcileSummary::default()
        };

        for room in classrooms {
            match self.reconcile_classroom(&room).await {
                Ok((updated, members_left)) => {
                    if updated {
                        summary.updated += 1;
                    }
                    summary.members_left += members_left;
                }
                Err(err) => {
                    warn!(
                        classroom_id = %room.id,
                        error = %err,
                        "Failed to reconcile classroom"
                    );
                    summary.failed += 1;
                }
            }
        }

        if summary.updated > 0 || summary.members_left > 0 {
            info!(
                updated = summary.updated,
                members_left = summary.members_left,
                "Reconciliation pass applied drift"
            );
        }
        Ok(summary)
    }

    async fn reconcile_classroom(
        &self,
        room: &classroom::Model,
    ) -> Result<(bool, usize), SyncError> {
        let resource = Resource::Group(room.group_id);
        let details = self.access.get_group_details(resource).await?;
        let platform_members = self.access.get_group_members(resource).await?;

        let mut updated = false;
        if details.name != room.name || details.description != room.description {
            debug!(
                classroom_id = %room.id,
                name = %details.name,
                "Pulling group rename from platform"
            );
            let mut active: classroom::ActiveModel = room.clone().into();
            active.name = Set(details.name);
            active.description = Set(details.description);
            active.updated_at = Set(chrono::Utc::now());
            active.update(&self.db).await?;
            updated = true;
        }

        let present: HashSet<i64> = platform_members.iter().map(|m| m.user_id).collect();

        let local_members = membership::Entity::find()
            .filter(membership::Column::ClassroomId.eq(room.id))
            .filter(membership::Column::Left.eq(false))
            .all(&self.db)
            .await?;

        let mut members_left = 0;
        for member in local_members {
            if !present.contains(&member.user_id) {
                debug!(
                    classroom_id = %room.id,
                    user_id = member.user_id,
                    "Member no longer in platform group, marking as left"
                );
                let mut active: membership::ActiveModel = member.into();
                active.left = Set(true);
                active.update(&self.db).await?;
                members_left += 1;
            }
        }

        Ok((updated, members_left))
    }
}
