//! Classroom entity backed by a group on the access-control platform

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classrooms")]
pub struct Model {
    /// Classroom UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Id of the backing group on the access-control platform
    pub group_id: i64,

    /// Token used to act on the backing group
    pub access_token: String,

    /// Classroom name (kept in sync with the external group name)
    pub name: String,

    /// Classroom description (kept in sync with the external group)
    pub description: String,

    /// User id of the classroom creator
    pub owner_user_id: i64,

    /// Whether the classroom has been archived
    pub archived: bool,

    /// Maximum team size; 1 means every student gets a personal team
    pub max_team_size: i32,

    /// Whether students can view all projects in the classroom
    pub students_view_all_projects: bool,

    /// When the classroom was created
    pub created_at: ChronoDateTimeUtc,

    /// When the classroom was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Classroom has members
    #[sea_orm(has_many = "super::membership::Entity")]
    Members,

    /// Classroom has teams
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,

    /// Classroom has assignments
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
