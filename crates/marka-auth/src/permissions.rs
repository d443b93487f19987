//! Role and ACL primitives for access control
//!
//! Privileges are plain scope strings ("role:admin", "user:<uuid>",
//! arbitrary grants). Resources describe their access rules as an ordered
//! ACL; evaluation walks the list and the first entry whose permission
//! matches and whose scope is held decides the outcome. No matching entry
//! means access is denied.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "role:admin";
pub const ROLE_MANAGER: &str = "role:manager";
pub const ROLE_EMPLOYEE: &str = "role:employee";
pub const ROLE_CLIENT: &str = "role:client";
pub const ROLE_USER: &str = "role:user";

pub const SCOPE_EVERYONE: &str = "system:everyone";
pub const SCOPE_AUTHENTICATED: &str = "system:authenticated";

/// Scope string identifying a specific user
pub fn user_scope(user_id: Uuid) -> String {
    format!("user:{}", user_id)
}

/// Built-in roles, ordered from least to most privileged
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Client,
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn as_scope(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Employee => ROLE_EMPLOYEE,
            Role::Client => ROLE_CLIENT,
            Role::User => ROLE_USER,
        }
    }

    pub fn from_scope(scope: &str) -> Option<Self> {
        match scope {
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_MANAGER => Some(Role::Manager),
            ROLE_EMPLOYEE => Some(Role::Employee),
            ROLE_CLIENT => Some(Role::Client),
            ROLE_USER => Some(Role::User),
            _ => None,
        }
    }

    pub fn all() -> Vec<Role> {
        vec![
            Role::Admin,
            Role::Manager,
            Role::Employee,
            Role::Client,
            Role::User,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_scope())
    }
}

/// Permission classes an ACL entry can cover. `All` matches every
/// requested permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AclPermission {
    All,
    List,
    Create,
    Read,
    ReadRelated,
    Update,
    UpdateRelated,
    Delete,
    DeleteRelated,
}

impl AclPermission {
    /// Whether this ACL entry covers the requested permission
    pub fn covers(&self, requested: &AclPermission) -> bool {
        matches!(self, AclPermission::All) || self == requested
    }

    /// The weaker variant granted through a relationship with the resource
    /// (client membership or self), if the permission has one. Creating a
    /// sub-resource counts as updating the parent's collection.
    pub fn related(&self) -> Option<AclPermission> {
        match self {
            AclPermission::Read | AclPermission::List => Some(AclPermission::ReadRelated),
            AclPermission::Create | AclPermission::Update => Some(AclPermission::UpdateRelated),
            AclPermission::Delete => Some(AclPermission::DeleteRelated),
            _ => None,
        }
    }
}

impl std::fmt::Display for AclPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AclPermission::All => "all",
            AclPermission::List => "list",
            AclPermission::Create => "create",
            AclPermission::Read => "read",
            AclPermission::ReadRelated => "read_related",
            AclPermission::Update => "update",
            AclPermission::UpdateRelated => "update_related",
            AclPermission::Delete => "delete",
            AclPermission::DeleteRelated => "delete_related",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AclAction {
    Allow,
    Deny,
}

/// One ordered ACL rule: action, scope that must be held, permission covered
#[derive(Debug, Clone)]
pub struct AclEntry {
    pub action: AclAction,
    pub scope: String,
    pub permission: AclPermission,
}

impl AclEntry {
    pub fn allow(scope: impl Into<String>, permission: AclPermission) -> Self {
        Self {
            action: AclAction::Allow,
            scope: scope.into(),
            permission,
        }
    }

    pub fn deny(scope: impl Into<String>, permission: AclPermission) -> Self {
        Self {
            action: AclAction::Deny,
            scope: scope.into(),
            permission,
        }
    }
}

/// Access rules for a resource, evaluated first-match-wins with a deny-all
/// fallback.
pub trait ResourceAcl {
    fn acl(&self) -> Vec<AclEntry>;

    fn check_access(&self, privileges: &[String], permission: &AclPermission) -> bool {
        for entry in self.acl() {
            if entry.permission.covers(permission)
                && privileges.iter().any(|held| held == &entry.scope)
            {
                return entry.action == AclAction::Allow;
            }
        }
        false
    }
}

/// Privilege set for a user: their identity scope, role scopes, and any
/// explicit grants. Superusers implicitly hold the admin role, and only
/// active users hold `system:authenticated`.
pub fn privileges_for_user(user: &marka_entities::users::Model) -> Vec<String> {
    let mut privileges = vec![user_scope(user.id), SCOPE_EVERYONE.to_string()];

    if user.is_active {
        privileges.push(SCOPE_AUTHENTICATED.to_string());
    }
    if user.is_superuser {
        privileges.push(ROLE_ADMIN.to_string());
    }

    if let Some(roles) = user.roles.as_array() {
        for role in roles.iter().filter_map(|v| v.as_str()) {
            if !privileges.iter().any(|p| p == role) {
                privileges.push(role.to_string());
            }
        }
    }
    if let Some(scopes) = user.scopes.as_array() {
        for scope in scopes.iter().filter_map(|v| v.as_str()) {
            if !privileges.iter().any(|p| p == scope) {
                privileges.push(scope.to_string());
            }
        }
    }

    privileges
}

/// Highest built-in role held in a privilege set; defaults to `Role::User`
pub fn effective_role(privileges: &[String]) -> Role {
    privileges
        .iter()
        .filter_map(|scope| Role::from_scope(scope))
        .max()
        .unwrap_or(Role::User)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestResource {
        entries: Vec<AclEntry>,
    }

    impl ResourceAcl for TestResource {
        fn acl(&self) -> Vec<AclEntry> {
            self.entries.clone()
        }
    }

    fn privileges(scopes: &[&str]) -> Vec<String> {
        scopes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_role_scope_round_trip() {
        for role in Role::all() {
            assert_eq!(Role::from_scope(role.as_scope()), Some(role));
        }
        assert_eq!(Role::from_scope("role:unknown"), None);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::Manager);
        assert!(Role::Manager > Role::Employee);
        assert!(Role::Employee > Role::Client);
        assert!(Role::Client > Role::User);
    }

    #[test]
    fn test_all_permission_covers_everything() {
        assert!(AclPermission::All.covers(&AclPermission::Delete));
        assert!(AclPermission::All.covers(&AclPermission::List));
        assert!(!AclPermission::Read.covers(&AclPermission::Update));
        assert!(AclPermission::Read.covers(&AclPermission::Read));
    }

    #[test]
    fn test_first_match_wins() {
        let resource = TestResource {
            entries: vec![
                AclEntry::deny(ROLE_USER, AclPermission::Delete),
                AclEntry::allow(ROLE_USER, AclPermission::All),
            ],
        };

        let held = privileges(&[ROLE_USER]);
        // The deny entry matches first for delete
        assert!(!resource.check_access(&held, &AclPermission::Delete));
        // Other permissions fall through to the allow-all entry
        assert!(resource.check_access(&held, &AclPermission::Read));
    }

    #[test]
    fn test_default_deny() {
        let resource = TestResource {
            entries: vec![AclEntry::allow(ROLE_ADMIN, AclPermission::All)],
        };

        assert!(!resource.check_access(&privileges(&[ROLE_USER]), &AclPermission::Read));
        assert!(resource.check_access(&privileges(&[ROLE_ADMIN]), &AclPermission::Read));
    }

    #[test]
    fn test_unheld_scope_is_skipped() {
        let resource = TestResource {
            entries: vec![
                AclEntry::deny(ROLE_MANAGER, AclPermission::All),
                AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::List),
            ],
        };

        // The deny rule targets a scope the caller does not hold
        let held = privileges(&[SCOPE_AUTHENTICATED]);
        assert!(resource.check_access(&held, &AclPermission::List));
        assert!(!resource.check_access(&held, &AclPermission::Create));
    }

    #[test]
    fn test_effective_role_picks_highest() {
        let held = privileges(&[ROLE_USER, ROLE_MANAGER, "custom:grant"]);
        assert_eq!(effective_role(&held), Role::Manager);
        assert_eq!(effective_role(&privileges(&["custom:grant"])), Role::User);
    }
}
