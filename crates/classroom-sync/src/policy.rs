//! Role transition policy
//!
//! Maps a role change to the permission level the member must end up with
//! on the classroom group. `None` means the transition requires no
//! permission change.

use classroom_access::PermissionLevel;
use classroom_db::entities::membership::Role;

/// Permission level required on the classroom group after a role change
///
/// Transitions between the same role never reach this table; callers
/// reject them first. With `students_view_all_projects` enabled, the
/// `Moderator↔Student` transitions keep the member's current access: a
/// member who can view all projects already holds the level the new role
/// needs.
pub fn resolve(
    old_role: Role,
    new_role: Role,
    students_view_all_projects: bool,
) -> Option<PermissionLevel> {
    match (old_role, new_role, students_view_all_projects) {
        (Role::Owner, Role::Student, false) => Some(PermissionLevel::Guest),
        (Role::Owner, Role::Student, true) => Some(PermissionLevel::Reporter),
        (Role::Owner, Role::Moderator, _) => Some(PermissionLevel::Reporter),
        (Role::Moderator, Role::Student, false) => Some(PermissionLevel::Guest),
        (Role::Moderator, Role::Student, true) => None,
        (Role::Moderator, Role::Owner, _) => Some(PermissionLevel::Owner),
        (Role::Student, Role::Moderator, false) => Some(PermissionLevel::Reporter),
        (Role::Student, Role::Moderator, true) => None,
        (Role::Student, Role::Owner, _) => Some(PermissionLevel::Owner),
        _ => None,
    }
}
