//! Error taxonomy of the synchronization core

use classroom_access::AccessError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::saga::SagaError;

/// Errors surfaced by the coordinators
///
/// Precondition variants are rejected before any external call and leave
/// no side effects. `Saga` means compensation has already run and the
/// local row was not committed. `Db` after a successful saga is the one
/// case where external state has moved and the local commit has not; it
/// is surfaced, never masked as success.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Member already has the requested role")]
    RoleUnchanged,

    #[error("The classroom creator's role cannot be changed")]
    CreatorRoleImmutable,

    #[error("Only the classroom creator may assign or remove the owner role")]
    OwnerChangeForbidden,

    #[error("Classroom {0} not found")]
    ClassroomNotFound(Uuid),

    #[error("User {user_id} is not a member of classroom {classroom_id}")]
    MembershipNotFound { classroom_id: Uuid, user_id: i64 },

    #[error("Assignment {0} not found")]
    AssignmentNotFound(Uuid),

    #[error(transparent)]
    Saga(#[from] SagaError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl SyncError {
    /// Whether this error was rejected before any external call
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::RoleUnchanged | Self::CreatorRoleImmutable | Self::OwnerChangeForbidden
        )
    }
}
