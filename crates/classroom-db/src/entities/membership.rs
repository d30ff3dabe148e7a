//! Membership entity linking a user to a classroom with a role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a classroom member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Role {
    /// Classroom owner with full access
    #[sea_orm(string_value = "owner")]
    Owner,

    /// Moderator with elevated permissions
    #[sea_orm(string_value = "moderator")]
    Moderator,

    /// Regular student
    #[sea_orm(string_value = "student")]
    Student,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    /// Classroom UUID (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub classroom_id: Uuid,

    /// User id on the access-control platform (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    /// Role of the user in this classroom
    pub role: Role,

    /// Team the user belongs to, if any
    pub team_id: Option<Uuid>,

    /// Whether the user has left the backing group
    pub left: bool,

    /// When the user joined the classroom
    pub joined_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Membership belongs to a classroom
    #[sea_orm(
        belongs_to = "super::classroom::Entity",
        from = "Column::ClassroomId",
        to = "super::classroom::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Classroom,

    /// Membership may belong to a team
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Team,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
