//! Team entity backed by a subgroup of the classroom group

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Classroom this team belongs to
    pub classroom_id: Uuid,

    /// Id of the backing subgroup on the access-control platform
    pub group_id: i64,

    /// Team name
    pub name: String,

    /// When the team was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team belongs to a classroom
    #[sea_orm(
        belongs_to = "super::classroom::Entity",
        from = "Column::ClassroomId",
        to = "super::classroom::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Classroom,

    /// Team has members
    #[sea_orm(has_many = "super::membership::Entity")]
    Members,

    /// Team has assignment projects
    #[sea_orm(has_many = "super::assignment_project::Entity")]
    Projects,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::assignment_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
