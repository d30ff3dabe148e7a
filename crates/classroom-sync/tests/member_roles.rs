//! Integration tests for member role changes
//!
//! Covers the precondition checks, the transition-table saga, and the
//! personal-team side effects of size-1 classrooms.

mod support;

use classroom_access::{InMemoryAccessControl, PermissionLevel, Resource};
use classroom_db::entities::membership::Role;
use classroom_db::entities::{membership, team};
use classroom_sync::{MemberRoleCoordinator, SyncError};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use support::*;

const CREATOR: i64 = 1;

#[tokio::test]
async fn test_promote_student_to_owner() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 1, false).await;
    insert_member(&db, &room, 7, Role::Student, None).await;
    access.set_level(Resource::Group(100), 7, PermissionLevel::Guest);

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let updated = coordinator
        .update_member_role(room.id, 7, Role::Owner, CREATOR)
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Owner);
    assert_eq!(access.level(Resource::Group(100), 7), PermissionLevel::Owner);
    // one guest-to-owner change, nothing else
    assert_eq!(access.change_count(), 1);
}

#[tokio::test]
async fn test_failed_demotion_leaves_role_untouched() {
    let db = setup_db().await;
    let inner = Arc::new(InMemoryAccessControl::new());
    inner.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 1, false).await;
    insert_member(&db, &room, 7, Role::Owner, None).await;
    inner.set_level(Resource::Group(100), 7, PermissionLevel::Owner);

    let access = Arc::new(FlakyAccess::failing_changes(inner.clone(), [1]));
    let coordinator = MemberRoleCoordinator::new(db.clone(), access);

    let err = coordinator
        .update_member_role(room.id, 7, Role::Student, CREATOR)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Saga(_)));

    let stored = membership::Entity::find_by_id((room.id, 7))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Owner);
    assert_eq!(inner.level(Resource::Group(100), 7), PermissionLevel::Owner);
}

#[tokio::test]
async fn test_same_role_is_rejected_without_external_calls() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 2, false).await;
    insert_member(&db, &room, 7, Role::Student, None).await;

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let err = coordinator
        .update_member_role(room.id, 7, Role::Student, CREATOR)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::RoleUnchanged));
    assert!(err.is_precondition());
    assert_eq!(access.change_count(), 0);
}

#[tokio::test]
async fn test_creator_role_is_immutable() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 2, false).await;
    insert_member(&db, &room, CREATOR, Role::Owner, None).await;

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let err = coordinator
        .update_member_role(room.id, CREATOR, Role::Student, CREATOR)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::CreatorRoleImmutable));
    assert_eq!(access.change_count(), 0);
}

#[tokio::test]
async fn test_only_the_creator_may_grant_owner() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 2, false).await;
    insert_member(&db, &room, 7, Role::Student, None).await;
    insert_member(&db, &room, 8, Role::Moderator, None).await;

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());

    // a moderator tries to promote a student to owner
    let err = coordinator
        .update_member_role(room.id, 7, Role::Owner, 8)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::OwnerChangeForbidden));

    // and to demote an existing owner
    insert_member(&db, &room, 9, Role::Owner, None).await;
    let err = coordinator
        .update_member_role(room.id, 9, Role::Student, 8)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::OwnerChangeForbidden));

    assert_eq!(access.change_count(), 0);
}

#[tokio::test]
async fn test_view_all_moderator_demotion_skips_the_saga() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 2, true).await;
    insert_member(&db, &room, 7, Role::Moderator, None).await;
    access.set_level(Resource::Group(100), 7, PermissionLevel::Reporter);

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let updated = coordinator
        .update_member_role(room.id, 7, Role::Student, CREATOR)
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Student);
    assert_eq!(access.change_count(), 0);
    assert_eq!(
        access.level(Resource::Group(100), 7),
        PermissionLevel::Reporter
    );
}

#[tokio::test]
async fn test_becoming_student_provisions_a_personal_team() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 1, false).await;
    insert_member(&db, &room, 7, Role::Moderator, None).await;
    access.set_level(Resource::Group(100), 7, PermissionLevel::Reporter);

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let updated = coordinator
        .update_member_role(room.id, 7, Role::Student, CREATOR)
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Student);
    let team_id = updated.team_id.expect("personal team not linked");

    let team_row = team::Entity::find_by_id(team_id)
        .one(&db)
        .await
        .unwrap()
        .expect("team row missing");
    assert!(access.group_exists(team_row.group_id));
    assert_eq!(
        access.level(Resource::Group(team_row.group_id), 7),
        PermissionLevel::Reporter
    );
}

#[tokio::test]
async fn test_leaving_student_deletes_the_personal_team() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "course", "");
    access.add_group(900, "student-7", "");

    let room = insert_classroom(&db, 100, CREATOR, 1, false).await;
    let personal = insert_team(&db, &room, 900, "student-7").await;
    insert_member(&db, &room, 7, Role::Student, Some(personal.id)).await;
    access.set_level(Resource::Group(100), 7, PermissionLevel::Guest);

    let coordinator = MemberRoleCoordinator::new(db.clone(), access.clone());
    let updated = coordinator
        .update_member_role(room.id, 7, Role::Moderator, CREATOR)
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Moderator);
    assert_eq!(updated.team_id, None);
    assert!(!access.group_exists(900));

    let remaining = team::Entity::find()
        .filter(team::Column::ClassroomId.eq(room.id))
        .all(&db)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_failed_member_add_tears_the_subgroup_down() {
    let db = setup_db().await;
    let inner = Arc::new(InMemoryAccessControl::new());
    inner.add_group(100, "course", "");

    let room = insert_classroom(&db, 100, CREATOR, 1, false).await;
    insert_member(&db, &room, 7, Role::Moderator, None).await;
    inner.set_level(Resource::Group(100), 7, PermissionLevel::Reporter);

    let access = Arc::new(FlakyAccess::failing_add_user(inner.clone()));
    let coordinator = MemberRoleCoordinator::new(db.clone(), access);

    let err = coordinator
        .update_member_role(room.id, 7, Role::Student, CREATOR)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Access(_)));

    // the subgroup created for the personal team is gone again
    assert!(!inner.group_exists(10_000));

    let stored = membership::Entity::find_by_id((room.id, 7))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Moderator);
    assert_eq!(stored.team_id, None);
}
