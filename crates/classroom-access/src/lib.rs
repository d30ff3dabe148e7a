//! Access-control platform surface
//!
//! This crate defines the operations the classroom service needs from the
//! external platform that hosts groups, projects, and per-user permission
//! levels. The `AccessControl` trait is the seam: the service core only
//! talks to the trait, with a REST implementation for production and an
//! in-memory implementation for tests and local development.

mod client;
mod level;
mod memory;
mod rest;

pub use client::{AccessControl, AccessError};
pub use level::{Group, GroupDetails, GroupMember, PermissionLevel, Resource, Visibility};
pub use memory::InMemoryAccessControl;
pub use rest::RestAccessControl;
