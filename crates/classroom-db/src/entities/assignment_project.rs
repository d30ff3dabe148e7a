//! AssignmentProject entity linking a team to a project on the platform

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provisioning status of an assignment project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ProjectStatus {
    /// Not yet provisioned
    #[sea_orm(string_value = "pending")]
    Pending,

    /// Provisioning in progress
    #[sea_orm(string_value = "creating")]
    Creating,

    /// Provisioned and accepted by the team
    #[sea_orm(string_value = "accepted")]
    Accepted,

    /// Provisioning failed
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment_projects")]
pub struct Model {
    /// Project UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Assignment this project belongs to
    pub assignment_id: Uuid,

    /// Team working on this project
    pub team_id: Uuid,

    /// Id of the backing project on the access-control platform
    pub project_id: i64,

    /// Provisioning status
    pub status: ProjectStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Project belongs to an assignment
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Assignment,

    /// Project belongs to a team
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
