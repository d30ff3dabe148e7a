//! REST implementation of the access-control client
//!
//! Talks to the platform's v4 HTTP API with an admin-scoped token. Kept
//! deliberately thin: one request per trait call, no pagination beyond a
//! single large page, no token refresh.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{AccessControl, AccessError};
use crate::level::{Group, GroupDetails, GroupMember, PermissionLevel, Resource, Visibility};

/// Reqwest-backed implementation of [`AccessControl`]
pub struct RestAccessControl {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MemberDto {
    id: i64,
    access_level: u8,
}

#[derive(Debug, Deserialize)]
struct GroupDto {
    id: i64,
    name: String,
    full_path: String,
    #[serde(default)]
    description: String,
}

/// API path of a member collection ("groups/7/members")
fn members_path(resource: Resource) -> String {
    match resource {
        Resource::Group(id) => format!("groups/{}/members", id),
        Resource::Project(id) => format!("projects/{}/members", id),
    }
}

/// URL-safe path fragment derived from a display name
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl RestAccessControl {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("PRIVATE-TOKEN", &self.token)
    }

    /// Map a non-success response to the error taxonomy
    async fn error_for(&self, response: reqwest::Response) -> AccessError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        match status {
            404 => AccessError::NotFound(message),
            401 | 403 => AccessError::PermissionDenied(message),
            _ => AccessError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for AccessError {
    fn from(err: reqwest::Error) -> Self {
        AccessError::Transport(err.to_string())
    }
}

#[async_trait]
impl AccessControl for RestAccessControl {
    async fn get_access_level(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<PermissionLevel, AccessError> {
        let path = format!("{}/{}", members_path(resource), principal);
        let response = self.request(reqwest::Method::GET, &path).send().await?;

        // A missing membership reads as no access
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(PermissionLevel::NoAccess);
        }
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let member: MemberDto = response.json().await?;
        PermissionLevel::from_u8(member.access_level).ok_or_else(|| AccessError::Api {
            status: 200,
            message: format!("unknown access level {}", member.access_level),
        })
    }

    async fn change_access_level(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        debug!(%resource, principal, %level, "Changing access level");

        let member_path = format!("{}/{}", members_path(resource), principal);

        // The platform has no level-0 member; dropping to no access means
        // removing the membership.
        if level == PermissionLevel::NoAccess {
            let response = self
                .request(reqwest::Method::DELETE, &member_path)
                .send()
                .await?;
            if !response.status().is_success()
                && response.status() != reqwest::StatusCode::NOT_FOUND
            {
                return Err(self.error_for(response).await);
            }
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::PUT, &member_path)
            .json(&json!({ "access_level": level.as_u8() }))
            .send()
            .await?;

        // Not yet a member: add instead of update
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return self.add_user_to_group(resource, principal, level).await;
        }
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        Ok(())
    }

    async fn create_subgroup(
        &self,
        name: &str,
        parent: Resource,
        visibility: Visibility,
        description: &str,
    ) -> Result<Group, AccessError> {
        debug!(name, %parent, "Creating subgroup");

        let response = self
            .request(reqwest::Method::POST, "groups")
            .json(&json!({
                "name": name,
                "path": slugify(name),
                "parent_id": parent.id(),
                "visibility": visibility.as_str(),
                "description": description,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let group: GroupDto = response.json().await?;
        Ok(Group {
            id: group.id,
            name: group.name,
            full_path: group.full_path,
        })
    }

    async fn delete_group(&self, resource: Resource) -> Result<(), AccessError> {
        debug!(%resource, "Deleting group");

        let path = format!("groups/{}", resource.id());
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        Ok(())
    }

    async fn add_user_to_group(
        &self,
        resource: Resource,
        principal: i64,
        level: PermissionLevel,
    ) -> Result<(), AccessError> {
        let response = self
            .request(reqwest::Method::POST, &members_path(resource))
            .json(&json!({
                "user_id": principal,
                "access_level": level.as_u8(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        Ok(())
    }

    async fn remove_user_from_group(
        &self,
        resource: Resource,
        principal: i64,
    ) -> Result<(), AccessError> {
        let path = format!("{}/{}", members_path(resource), principal);
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }
        Ok(())
    }

    async fn get_group_members(&self, resource: Resource) -> Result<Vec<GroupMember>, AccessError> {
        let path = format!("{}?per_page=100", members_path(resource));
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let members: Vec<MemberDto> = response.json().await?;
        Ok(members
            .into_iter()
            .filter_map(|m| {
                PermissionLevel::from_u8(m.access_level).map(|level| GroupMember {
                    user_id: m.id,
                    level,
                })
            })
            .collect())
    }

    async fn get_group_details(&self, resource: Resource) -> Result<GroupDetails, AccessError> {
        let path = format!("groups/{}", resource.id());
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let group: GroupDto = response.json().await?;
        Ok(GroupDetails {
            name: group.name,
            description: group.description,
        })
    }
}
