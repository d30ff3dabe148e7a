//! Assignment entity with a due date and a closed flag

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    /// Assignment UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Classroom this assignment belongs to
    pub classroom_id: Uuid,

    /// Assignment name
    pub name: String,

    /// Optional due date; overdue assignments get closed by the worker
    pub due_date: Option<ChronoDateTimeUtc>,

    /// Whether the assignment has been closed
    pub closed: bool,

    /// When the assignment was created
    pub created_at: ChronoDateTimeUtc,

    /// When the assignment was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Assignment belongs to a classroom
    #[sea_orm(
        belongs_to = "super::classroom::Entity",
        from = "Column::ClassroomId",
        to = "super::classroom::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Classroom,

    /// Assignment owns projects
    #[sea_orm(has_many = "super::assignment_project::Entity")]
    Projects,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl Related<super::assignment_project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
