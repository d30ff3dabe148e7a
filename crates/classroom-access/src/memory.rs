//! In-memory access-control implementation
//!
//! A complete in-process stand-in for the platform, used by tests and by
//! local development setups that have no platform instance to talk to.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::client::{AccessControl, AccessError};
use crate::level::{Group, GroupDetails, GroupMember, PermissionLevel, Resource, Visibility};

#[derive(Debug, Clone)]
struct GroupState {
    name: String,
    description: String,
    parent: Option<i64>,
    members: HashMap<i64, PermissionLevel>,
}

#[derive(Debug, Default)]
struct Inner {
    groups: HashMap<i64, GroupState>,
    projects: HashMap<i64, HashMap<i64, PermissionLevel>>,
    next_id: i64,
    changes: Vec<(Resource, i64, PermissionLevel)>,
}

/// Hashmap-backed implementation of [`AccessControl`]
pub struct InMemoryAccessControl {
    inner: Mutex<Inner>,
}

impl InMemoryAccessControl {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 10_000,
                ..Inner::default()
            }),
        }
    }

    // Poisoning can only happen when a test panics mid-call; the state is
    // still usable for the assertions that follow.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a group
    pub fn add_group(&self, id: i64, name: &str, description: &str) {
        self.lock().groups.insert(
            id,
            GroupState {
                name: name.to_string(),
                description: description.to_string(),
                parent: None,
                members: HashMap::new(),
            },
        );
    }

    /// Seed a project
    pub fn add_project(&self, id: i64) {
        self.lock().projects.insert(id, HashMap::new());
    }

    /// Seed a permission level without recording a change
    pub fn set_level(&self, resource: Resource, principal: i64, level: PermissionLevel) {
        let mut inner = self.lock();
        match resource {
            Resource::Group(id) => {
                if let Some(group) = inner.groups.get_mut(&id) {
                    group.members.insert(principal, level);
                }
            }
            Resource::Project(id) => {
                inner.projects.entry(id).or_default().insert(principal, level);
            }
        }
    }

    /// Current level as seen by assertions (no-member reads as `NoAccess`)
    pub fn level(&self, resource: Resource, principal: i64) -> PermissionLevel {
        let inner = self.lock();
        match resource {
            Resource::Group(id) => inner
                .groups
                .get(&id)
                .and_then(|g| g.members.get(&principal).copied())
                .unwrap_or_default(),
            Resource::Project(id) => inner
                .projects
                .get(&id)
                .and_then(|m| m.get(&principal).copied())
                .unwrap_or_default(),
        }
    }

    /// Whether a group currently exists
    pub fn group_exists(&self, id: i64) -> bool {
        self.lock().groups.contains_key(&id)
    }

    /// Every `change_access_level` call in order of arrival
    pub fn changes(&self) -> Vec<(Resource, i64, PermissionLevel)> {
        self.lock().changes.clone()
    }

    /// Number of `change_access_level` calls so far
    pub fn change_count(&self) -> usize {
        self.lock().changes.len()
    }
}

impl Default for InMemoryAccessControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessControl for InMemoryAccessControl {
    async fn get_access_level(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<PermissionLevel, AccessError> {
        let inner = self.lock();
        match resource {
            Resource::Group(id) => match inner.groups.get(&id) {
                Some(group) => Ok(group.members.get(&principal).copied().unwrap_or_default()),
                None => Err(AccessError::NotFound(format!("{}", resource))),
            },
            Resource::Project(id) => match inner.projects.get(&id) {
                Some(members) => Ok(members.get(&principal).copied().unwrap_or_default()),
                None => Err(AccessError::NotFound(format!("{}", resource))),
            },
        }
    }

    async fn change_access_level(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        let mut inner = self.lock();
        inner.changes.push((resource, principal, level));
        match resource {
            Resource::Group(id) => {
                let group = inner
                    .groups
                    .get_mut(&id)
                    .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;
                if level == PermissionLevel::NoAccess {
                    group.members.remove(&principal);
                } else {
                    group.members.insert(principal, level);
                }
            }
            Resource::Project(id) => {
                let members = inner
                    .projects
                    .get_mut(&id)
                    .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;
                if level == PermissionLevel::NoAccess {
                    members.remove(&principal);
                } else {
                    members.insert(principal, level);
                }
            }
        }
        Ok(())
    }

    async fn create_subgroup(
        &self,
        name: &str,
        parent: Resource,
        _visibility: Visibility,
        description: &str,
    ) -> Result<Group, AccessError> {
        let mut inner = self.lock();
        let parent_id = parent.id();
        if !inner.groups.contains_key(&parent_id) {
            return Err(AccessError::NotFound(format!("{}", parent)));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.groups.insert(
            id,
            GroupState {
                name: name.to_string(),
                description: description.to_string(),
                parent: Some(parent_id),
                members: HashMap::new(),
            },
        );

        Ok(Group {
            id,
            name: name.to_string(),
            full_path: format!("{}/{}", parent_id, name),
        })
    }

    async fn delete_group(&self, resource: Resource) -> Result<(), AccessError> {
        let mut inner = self.lock();
        inner
            .groups
            .remove(&resource.id())
            .map(|_| ())
            .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))
    }

    async fn add_user_to_group(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        let mut inner = self.lock();
        let group = inner
            .groups
            .get_mut(&resource.id())
            .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;
        group.members.insert(principal, level);
        Ok(())
    }

    async fn remove_user_from_group(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<(), AccessError> {
        let mut inner = self.lock();
        let group = inner
            .groups
            .get_mut(&resource.id())
            .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;
        group.members.remove(&principal);
        Ok(())
    }

    async fn get_group_members(&self, resource: Resource) -> Result<Vec<GroupMember>, AccessError> {
        let inner = self.lock();
        let group = inner
            .groups
            .get(&resource.id())
            .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;

        let mut members: Vec<GroupMember> = group
            .members
            .iter()
            .map(|(user_id, level)| GroupMember {
                user_id: *user_id,
                level: *level,
            })
            .collect();
        members.sort_by_key(|m| m.user_id);
        Ok(members)
    }

    async fn get_group_details(&self, resource: Resource) -> Result<GroupDetails, AccessError> {
        let inner = self.lock();
        let group = inner
            .groups
            .get(&resource.id())
            .ok_or_else(|| AccessError::NotFound(format!("{}", resource)))?;
        Ok(GroupDetails {
            name: group.name.clone(),
            description: group.description.clone(),
        })
    }
}
