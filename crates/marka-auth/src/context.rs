use marka_entities::users;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::{self, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthSource {
    ApiKey {
        user: users::Model,
        /// Role scope override carried by the key, if any
        role: Option<Role>,
        /// Extra privilege scopes granted to the key
        scopes: Option<Vec<String>>,
        key_name: String,
        key_id: Uuid,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user: users::Model,
    pub source: AuthSource,
    pub effective_role: Role,
    /// Resolved privilege set: `user:<id>`, system scopes, roles, grants
    pub privileges: Vec<String>,
}

impl AuthContext {
    pub fn new_api_key(
        user: users::Model,
        role: Option<Role>,
        scopes: Option<Vec<String>>,
        key_name: String,
        key_id: Uuid,
    ) -> Self {
        let mut privileges = permissions::privileges_for_user(&user);

        // A role override on the key replaces the user's role scopes
        if let Some(key_role) = role {
            privileges.retain(|scope| Role::from_scope(scope).is_none());
            privileges.push(key_role.as_scope().to_string());
        }
        if let Some(ref extra) = scopes {
            for scope in extra {
                if !privileges.iter().any(|p| p == scope) {
                    privileges.push(scope.clone());
                }
            }
        }

        let effective_role = permissions::effective_role(&privileges);

        Self {
            user: user.clone(),
            source: AuthSource::ApiKey {
                user,
                role,
                scopes,
                key_name,
                key_id,
            },
            effective_role,
            privileges,
        }
    }

    pub fn has_privilege(&self, scope: &str) -> bool {
        self.privileges.iter().any(|held| held == scope)
    }

    pub fn has_role(&self, role: &Role) -> bool {
        &self.effective_role == role
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_superuser || self.has_privilege(permissions::ROLE_ADMIN)
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn api_key_info(&self) -> (String, Uuid) {
        match &self.source {
            AuthSource::ApiKey {
                key_name, key_id, ..
            } => (key_name.clone(), *key_id),
        }
    }

    /// Evaluate a resource ACL against this context's privilege set
    pub fn can(
        &self,
        resource: &impl crate::permissions::ResourceAcl,
        permission: &crate::permissions::AclPermission,
    ) -> bool {
        resource.check_access(&self.privileges, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{ROLE_ADMIN, ROLE_MANAGER, ROLE_USER, SCOPE_AUTHENTICATED};

    fn test_user(is_active: bool, is_superuser: bool, roles: Vec<&str>) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            auth_id: "auth0|test".to_string(),
            email: "test@example.com".to_string(),
            username: "test".to_string(),
            is_active,
            is_verified: true,
            is_superuser,
            roles: serde_json::json!(roles),
            scopes: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_privileges_include_identity_scope() {
        let user = test_user(true, false, vec![ROLE_USER]);
        let ctx = AuthContext::new_api_key(user.clone(), None, None, "key".into(), Uuid::new_v4());

        assert!(ctx.has_privilege(&format!("user:{}", user.id)));
        assert!(ctx.has_privilege(SCOPE_AUTHENTICATED));
        assert_eq!(ctx.effective_role, Role::User);
    }

    #[test]
    fn test_superuser_holds_admin_role() {
        let user = test_user(true, true, vec![ROLE_USER]);
        let ctx = AuthContext::new_api_key(user, None, None, "key".into(), Uuid::new_v4());

        assert!(ctx.is_admin());
        assert!(ctx.has_privilege(ROLE_ADMIN));
        assert_eq!(ctx.effective_role, Role::Admin);
    }

    #[test]
    fn test_inactive_user_not_authenticated() {
        let user = test_user(false, false, vec![ROLE_USER]);
        let ctx = AuthContext::new_api_key(user, None, None, "key".into(), Uuid::new_v4());

        assert!(!ctx.has_privilege(SCOPE_AUTHENTICATED));
    }

    #[test]
    fn test_key_role_override_replaces_user_roles() {
        let user = test_user(true, false, vec![ROLE_MANAGER]);
        let ctx = AuthContext::new_api_key(
            user,
            Some(Role::User),
            None,
            "restricted".into(),
            Uuid::new_v4(),
        );

        assert!(!ctx.has_privilege(ROLE_MANAGER));
        assert_eq!(ctx.effective_role, Role::User);
    }

    #[test]
    fn test_key_scopes_are_added() {
        let user = test_user(true, false, vec![ROLE_USER]);
        let ctx = AuthContext::new_api_key(
            user,
            None,
            Some(vec!["reports:export".to_string()]),
            "exports".into(),
            Uuid::new_v4(),
        );

        assert!(ctx.has_privilege("reports:export"));
    }
}
