//! Shared fixtures for coordinator tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_access::{
    AccessControl, AccessError, Group, GroupDetails, GroupMember, InMemoryAccessControl,
    PermissionLevel, Resource, Visibility,
};
use classroom_db::entities::assignment_project::ProjectStatus;
use classroom_db::entities::membership::Role;
use classroom_db::entities::{assignment, assignment_project, classroom, membership, team};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory database with migrations applied
pub async fn setup_db() -> DatabaseConnection {
    let db = classroom_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    classroom_db::migrate(&db).await.expect("Failed to migrate");
    db
}

pub async fn insert_classroom(
    db: &DatabaseConnection,
    group_id: i64,
    owner_user_id: i64,
    max_team_size: i32,
    students_view_all_projects: bool,
) -> classroom::Model {
    classroom::ActiveModel {
        id: Set(Uuid::new_v4()),
        group_id: Set(group_id),
        access_token: Set("glpat-test".to_string()),
        name: Set(format!("classroom-{}", group_id)),
        description: Set("test classroom".to_string()),
        owner_user_id: Set(owner_user_id),
        archived: Set(false),
        max_team_size: Set(max_team_size),
        students_view_all_projects: Set(students_view_all_projects),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert classroom")
}

pub async fn insert_member(
    db: &DatabaseConnection,
    room: &classroom::Model,
    user_id: i64,
    role: Role,
    team_id: Option<Uuid>,
) -> membership::Model {
    membership::ActiveModel {
        classroom_id: Set(room.id),
        user_id: Set(user_id),
        role: Set(role),
        team_id: Set(team_id),
        left: Set(false),
        joined_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert membership")
}

pub async fn insert_team(
    db: &DatabaseConnection,
    room: &classroom::Model,
    group_id: i64,
    name: &str,
) -> team::Model {
    team::ActiveModel {
        id: Set(Uuid::new_v4()),
        classroom_id: Set(room.id),
        group_id: Set(group_id),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert team")
}

pub async fn insert_assignment(
    db: &DatabaseConnection,
    room: &classroom::Model,
    due_date: Option<DateTime<Utc>>,
    closed: bool,
) -> assignment::Model {
    assignment::ActiveModel {
        id: Set(Uuid::new_v4()),
        classroom_id: Set(room.id),
        name: Set("assignment".to_string()),
        due_date: Set(due_date),
        closed: Set(closed),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert assignment")
}

pub async fn insert_project(
    db: &DatabaseConnection,
    task: &assignment::Model,
    squad: &team::Model,
    project_id: i64,
    status: ProjectStatus,
) -> assignment_project::Model {
    assignment_project::ActiveModel {
        id: Set(Uuid::new_v4()),
        assignment_id: Set(task.id),
        team_id: Set(squad.id),
        project_id: Set(project_id),
        status: Set(status),
    }
    .insert(db)
    .await
    .expect("Failed to insert assignment project")
}

/// Fault-injecting wrapper around the in-memory platform
///
/// Fails selected `change_access_level` calls (1-indexed across the
/// wrapper's lifetime) or the next `add_user_to_group` call, delegating
/// everything else.
pub struct FlakyAccess {
    inner: Arc<InMemoryAccessControl>,
    change_calls: AtomicUsize,
    fail_changes: HashSet<usize>,
    fail_add_user: bool,
}

impl FlakyAccess {
    pub fn failing_changes(
        inner: Arc<InMemoryAccessControl>,
        fail_changes: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            inner,
            change_calls: AtomicUsize::new(0),
            fail_changes: fail_changes.into_iter().collect(),
            fail_add_user: false,
        }
    }

    pub fn failing_add_user(inner: Arc<InMemoryAccessControl>) -> Self {
        Self {
            inner,
            change_calls: AtomicUsize::new(0),
            fail_changes: HashSet::new(),
            fail_add_user: true,
        }
    }

    fn injected_error() -> AccessError {
        AccessError::Api {
            status: 500,
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl AccessControl for FlakyAccess {
    async fn get_access_level(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<PermissionLevel, AccessError> {
        self.inner.get_access_level(resource, principal).await
    }

    async fn change_access_level(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        let call = self.change_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_changes.contains(&call) {
            return Err(Self::injected_error());
        }
        self.inner.change_access_level(resource, principal, level).await
    }

    async fn create_subgroup(
        &self,
        name: &str,
        parent: Resource,
        visibility: Visibility,
        description: &str,
    ) -> Result<Group, AccessError> {
        self.inner
            .create_subgroup(name, parent, visibility, description)
            .await
    }

    async fn delete_group(&self, resource: Resource) -> Result<(), AccessError> {
        self.inner.delete_group(resource).await
    }

    async fn add_user_to_group(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        if self.fail_add_user {
            return Err(Self::injected_error());
        }
        self.inner.add_user_to_group(resource, principal, level).await
    }

    async fn remove_user_from_group(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<(), AccessError> {
        self.inner.remove_user_from_group(resource, principal).await
    }

    async fn get_group_members(&self, resource: Resource) -> Result<Vec<GroupMember>, AccessError> {
        self.inner.get_group_members(resource).await
    }

    async fn get_group_details(&self, resource: Resource) -> Result<GroupDetails, AccessError> {
        self.inner.get_group_details(resource).await
    }
}
