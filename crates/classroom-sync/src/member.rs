//! Member role changes
//!
//! A role change is a single-op saga on the classroom group plus, for
//! classrooms with personal teams (max team size 1), provisioning or
//! deprovisioning of the member's own subgroup. External steps run
//! first; the membership row only commits once they all succeeded.

use chrono::Utc;
use classroom_access::{AccessControl, Group, PermissionLevel, Resource, Visibility};
use classroom_db::entities::membership::Role;
use classroom_db::entities::{classroom, membership, team};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, ModelTrait, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SyncError;
use crate::policy;
use crate::saga::{PermissionOp, PermissionSaga};

/// Team linkage change to commit together with the new role
enum TeamChange {
    Keep,
    Drop(Uuid),
    Create(Group),
}

pub struct MemberRoleCoordinator {
    db: DatabaseConnection,
    access: Arc<dyn AccessControl>,
}

impl MemberRoleCoordinator {
    pub fn new(db: DatabaseConnection, access: Arc<dyn AccessControl>) -> Self {
        Self { db, access }
    }

    /// Change a member's role
    ///
    /// Preconditions are checked before any external call: the new role
    /// must differ, the classroom creator's role is immutable, and only
    /// the creator may grant or revoke the owner role.
    pub async fn update_member_role(
        &self,
        classroom_id: Uuid,
        user_id: i64,
        new_role: Role,
        acting_user: i64,
    ) -> Result<membership::Model, SyncError> {
        let room = classroom::Entity::find_by_id(classroom_id)
            .one(&self.db)
            .await?
            .ok_or(SyncError::ClassroomNotFound(classroom_id))?;

        let member = membership::Entity::find_by_id((classroom_id, user_id))
            .one(&self.db)
            .await?
            .ok_or(SyncError::MembershipNotFound {
                classroom_id,
                user_id,
            })?;

        if member.role == new_role {
            return Err(SyncError::RoleUnchanged);
        }
        if user_id == room.owner_user_id {
            return Err(SyncError::CreatorRoleImmutable);
        }
        if (member.role == Role::Owner || new_role == Role::Owner)
            && acting_user != room.owner_user_id
        {
            return Err(SyncError::OwnerChangeForbidden);
        }

        // Permission change on the classroom group, when the transition
        // table has an entry for it
        if let Some(target) =
            policy::resolve(member.role, new_role, room.students_view_all_projects)
        {
            let op = PermissionOp {
                principal: user_id,
                resource: Resource::Group(room.group_id),
                target,
            };
            PermissionSaga::new(self.access.as_ref())
                .execute(std::slice::from_ref(&op))
                .await?;
        }

        let team_change = self.team_change(&room, &member, new_role).await?;

        let updated = match self.persist(&member, new_role, &team_change).await {
            Ok(model) => model,
            Err(err) => {
                // A subgroup created for this change must not outlive a
                // failed commit
                if let TeamChange::Create(subgroup) = &team_change {
                    if let Err(cleanup_err) = self
                        .access
                        .delete_group(Resource::Group(subgroup.id))
                        .await
                    {
                        warn!(
                            group_id = subgroup.id,
                            error = %cleanup_err,
                            "Failed to delete subgroup after aborted role change"
                        );
                    }
                }
                return Err(err);
            }
        };

        info!(
            classroom_id = %classroom_id,
            user_id,
            role = ?updated.role,
            "Member role updated"
        );
        Ok(updated)
    }

    /// Personal-team side effect of the role change, external part
    ///
    /// Only classrooms with a team size of 1 keep a subgroup per student.
    /// Leaving the student role deletes it (external delete first, local
    /// row only once that succeeded); becoming a student provisions one.
    async fn team_change(
        &self,
        room: &classroom::Model,
        member: &membership::Model,
        new_role: Role,
    ) -> Result<TeamChange, SyncError> {
        if room.max_team_size != 1 {
            return Ok(TeamChange::Keep);
        }

        if member.role == Role::Student && new_role != Role::Student {
            let Some(team_id) = member.team_id else {
                return Ok(TeamChange::Keep);
            };
            if let Some(team_row) = member.find_related(team::Entity).one(&self.db).await? {
                self.access
                    .delete_group(Resource::Group(team_row.group_id))
                    .await?;
            }
            return Ok(TeamChange::Drop(team_id));
        }

        if member.role != Role::Student && new_role == Role::Student {
            let name = format!("student-{}", member.user_id);
            let subgroup = self
                .access
                .create_subgroup(
                    &name,
                    Resource::Group(room.group_id),
                    Visibility::Private,
                    "Personal team",
                )
                .await?;

            if let Err(err) = self
                .access
                .add_user_to_group(
                    Resource::Group(subgroup.id),
                    member.user_id,
                    PermissionLevel::Reporter,
                )
                .await
            {
                if let Err(cleanup_err) =
                    self.access.delete_group(Resource::Group(subgroup.id)).await
                {
                    warn!(
                        group_id = subgroup.id,
                        error = %cleanup_err,
                        "Failed to delete subgroup after membership add failed"
                    );
                }
                return Err(err.into());
            }

            return Ok(TeamChange::Create(subgroup));
        }

        Ok(TeamChange::Keep)
    }

    /// Commit the new role and team linkage in one transaction
    async fn persist(
        &self,
        member: &membership::Model,
        new_role: Role,
        team_change: &TeamChange,
    ) -> Result<membership::Model, SyncError> {
        let txn = self.db.begin().await?;

        let team_id = match team_change {
            TeamChange::Keep => member.team_id,
            TeamChange::Drop(team_id) => {
                team::Entity::delete_by_id(*team_id).exec(&txn).await?;
                None
            }
            TeamChange::Create(subgroup) => {
                let team_row = self.insert_team(&txn, member, subgroup).await?;
                Some(team_row.id)
            }
        };

        let mut active: membership::ActiveModel = member.clone().into();
        active.role = Set(new_role);
        active.team_id = Set(team_id);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn insert_team(
        &self,
        txn: &DatabaseTransaction,
        member: &membership::Model,
        subgroup: &Group,
    ) -> Result<team::Model, SyncError> {
        let team_row = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            classroom_id: Set(member.classroom_id),
            group_id: Set(subgroup.id),
            name: Set(subgroup.name.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;
        Ok(team_row)
    }
}
