//! Integration tests for drift reconciliation

mod support;

use classroom_access::{InMemoryAccessControl, PermissionLevel, Resource};
use classroom_db::entities::membership::Role;
use classroom_db::entities::{classroom, membership};
use classroom_sync::DriftReconciler;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use std::sync::Arc;
use support::*;

#[tokio::test]
async fn test_external_rename_wins() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "Advanced Programming", "renamed on the platform");

    let room = insert_classroom(&db, 100, 1, 2, false).await;

    let reconciler = DriftReconciler::new(db.clone(), access);
    let summary = reconciler.reconcile_once().await.unwrap();

    assert_eq!(summary.classrooms, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);

    let stored = classroom::Entity::find_by_id(room.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Advanced Programming");
    assert_eq!(stored.description, "renamed on the platform");
}

#[tokio::test]
async fn test_members_missing_on_the_platform_are_marked_left() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "classroom-100", "test classroom");
    access.set_level(Resource::Group(100), 1, PermissionLevel::Owner);
    access.set_level(Resource::Group(100), 2, PermissionLevel::Developer);

    let room = insert_classroom(&db, 100, 1, 2, false).await;
    insert_member(&db, &room, 1, Role::Owner, None).await;
    insert_member(&db, &room, 2, Role::Student, None).await;
    // user 3 exists locally but left the group on the platform
    insert_member(&db, &room, 3, Role::Student, None).await;

    let reconciler = DriftReconciler::new(db.clone(), access);
    let summary = reconciler.reconcile_once().await.unwrap();

    assert_eq!(summary.members_left, 1);

    let stored = membership::Entity::find_by_id((room.id, 3))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.left);

    let stayed = membership::Entity::find_by_id((room.id, 2))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(!stayed.left);
}

#[tokio::test]
async fn test_one_broken_classroom_does_not_stop_the_pass() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    // group 100 was deleted directly on the platform; 200 is fine
    access.add_group(200, "second", "kept");

    insert_classroom(&db, 100, 1, 2, false).await;
    let intact = insert_classroom(&db, 200, 1, 2, false).await;

    let reconciler = DriftReconciler::new(db.clone(), access);
    let summary = reconciler.reconcile_once().await.unwrap();

    assert_eq!(summary.classrooms, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 1);

    let stored = classroom::Entity::find_by_id(intact.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "second");
}

#[tokio::test]
async fn test_archived_classrooms_are_skipped() {
    let db = setup_db().await;
    let access = Arc::new(InMemoryAccessControl::new());
    access.add_group(100, "renamed", "");

    let room = insert_classroom(&db, 100, 1, 2, false).await;
    let mut active: classroom::ActiveModel = room.clone().into_active_model();
    active.archived = Set(true);
    active.update(&db).await.unwrap();

    let reconciler = DriftReconciler::new(db.clone(), access);
    let summary = reconciler.reconcile_once().await.unwrap();

    assert_eq!(summary.classrooms, 0);

    let stored = classroom::Entity::find_by_id(room.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "classroom-100");
}
