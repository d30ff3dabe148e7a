//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create classrooms table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Classroom::Table)
                    .if_not_exists()
                    .col(uuid(Classroom::Id).primary_key())
                    .col(big_integer(Classroom::GroupId).not_null())
                    .col(string_len(Classroom::AccessToken, 255).not_null())
                    .col(string_len(Classroom::Name, 255).not_null())
                    .col(text(Classroom::Description).not_null())
                    .col(big_integer(Classroom::OwnerUserId).not_null())
                    .col(boolean(Classroom::Archived).not_null().default(false))
                    .col(integer(Classroom::MaxTeamSize).not_null().default(1))
                    .col(
                        boolean(Classroom::StudentsViewAllProjects)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        timestamp_with_time_zone(Classroom::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Classroom::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_classrooms_archived")
                    .table(Classroom::Table)
                    .col(Classroom::Archived)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create teams table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(uuid(Team::ClassroomId).not_null())
                    .col(big_integer(Team::GroupId).not_null())
                    .col(string_len(Team::Name, 255).not_null())
                    .col(
                        timestamp_with_time_zone(Team::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_classroom")
                            .from(Team::Table, Team::ClassroomId)
                            .to(Classroom::Table, Classroom::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create memberships table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Membership::Table)
                    .if_not_exists()
                    .col(uuid(Membership::ClassroomId).not_null())
                    .col(big_integer(Membership::UserId).not_null())
                    .col(string_len(Membership::Role, 32).not_null())
                    .col(ColumnDef::new(Membership::TeamId).uuid().null())
                    .col(boolean(Membership::Left).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Membership::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Membership::ClassroomId)
                            .col(Membership::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_classroom")
                            .from(Membership::Table, Membership::ClassroomId)
                            .to(Classroom::Table, Classroom::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_team")
                            .from(Membership::Table, Membership::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_memberships_team_id")
                    .table(Membership::Table)
                    .col(Membership::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create assignments table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Assignment::Table)
                    .if_not_exists()
                    .col(uuid(Assignment::Id).primary_key())
                    .col(uuid(Assignment::ClassroomId).not_null())
                    .col(string_len(Assignment::Name, 255).not_null())
                    .col(
                        ColumnDef::new(Assignment::DueDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(boolean(Assignment::Closed).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Assignment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Assignment::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_classroom")
                            .from(Assignment::Table, Assignment::ClassroomId)
                            .to(Classroom::Table, Classroom::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_due_date_closed")
                    .table(Assignment::Table)
                    .col(Assignment::DueDate)
                    .col(Assignment::Closed)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create assignment_projects table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AssignmentProject::Table)
                    .if_not_exists()
                    .col(uuid(AssignmentProject::Id).primary_key())
                    .col(uuid(AssignmentProject::AssignmentId).not_null())
                    .col(uuid(AssignmentProject::TeamId).not_null())
                    .col(big_integer(AssignmentProject::ProjectId).not_null())
                    .col(string_len(AssignmentProject::Status, 32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignment_projects_assignment")
                            .from(AssignmentProject::Table, AssignmentProject::AssignmentId)
                            .to(Assignment::Table, Assignment::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignment_projects_team")
                            .from(AssignmentProject::Table, AssignmentProject::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignment_projects_assignment_id")
                    .table(AssignmentProject::Table)
                    .col(AssignmentProject::AssignmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(AssignmentProject::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Membership::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Classroom::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classroom {
    #[sea_orm(iden = "classrooms")]
    Table,
    Id,
    GroupId,
    AccessToken,
    Name,
    Description,
    OwnerUserId,
    Archived,
    MaxTeamSize,
    StudentsViewAllProjects,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    ClassroomId,
    GroupId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Membership {
    #[sea_orm(iden = "memberships")]
    Table,
    ClassroomId,
    UserId,
    Role,
    TeamId,
    Left,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Assignment {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
    ClassroomId,
    Name,
    DueDate,
    Closed,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AssignmentProject {
    #[sea_orm(iden = "assignment_projects")]
    Table,
    Id,
    AssignmentId,
    TeamId,
    ProjectId,
    Status,
}
