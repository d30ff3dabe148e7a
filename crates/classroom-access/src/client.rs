//! Access-control client trait
//!
//! The service core drives every external permission change through this
//! trait. Implementations decide how calls reach the platform; the core
//! never sees HTTP, pagination, or token handling.

use async_trait::async_trait;
use thiserror::Error;

use crate::level::{Group, GroupDetails, GroupMember, PermissionLevel, Resource, Visibility};

/// Errors returned by the access-control platform
///
/// The service core does not classify failures as transient or permanent;
/// that distinction stays behind this boundary.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Operations the classroom service needs from the access-control platform
///
/// Every mutation here is a plain forward action; undo is the caller's
/// responsibility (the permission saga records prior levels and restores
/// them itself).
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Current permission level of a user on a group or project
    ///
    /// A user who is not a member reads as `NoAccess`.
    async fn get_access_level(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<PermissionLevel, AccessError>;

    /// Set a user's permission level on a group or project
    async fn change_access_level(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError>;

    /// Create a subgroup under the given parent group
    async fn create_subgroup(
        &self,
        name: &str,
        parent: Resource,
        visibility: Visibility,
        description: &str,
    ) -> Result<Group, AccessError>;

    /// Delete a group
    async fn delete_group(&self, resource: Resource) -> Result<(), AccessError>;

    /// Add a user to a group at the given permission level
    async fn add_user_to_group(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError>;

    /// Remove a user from a group
    async fn remove_user_from_group(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<(), AccessError>;

    /// List the members of a group
    async fn get_group_members(&self, resource: Resource) -> Result<Vec<GroupMember>, AccessError>;

    /// Name and description of a group
    async fn get_group_details(&self, resource: Resource) -> Result<GroupDetails, AccessError>;
}
