//! Access rules for the domain resources
//!
//! Each target resource carries an ordered ACL in the style of the role
//! primitives in `permissions`. Admins and managers hold their grants
//! directly; other users reach `*Related` grants only when `AccessControl`
//! has confirmed the relationship (client membership or self).

use marka_entities::{clients, tracking_links, users, websites};

use crate::permissions::{
    user_scope, AclEntry, AclPermission, ResourceAcl, ROLE_ADMIN, ROLE_MANAGER,
    SCOPE_AUTHENTICATED,
};

impl ResourceAcl for users::Model {
    fn acl(&self) -> Vec<AclEntry> {
        vec![
            AclEntry::allow(ROLE_ADMIN, AclPermission::All),
            AclEntry::allow(ROLE_MANAGER, AclPermission::List),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Read),
            AclEntry::allow(user_scope(self.id), AclPermission::Read),
            AclEntry::allow(user_scope(self.id), AclPermission::Update),
        ]
    }
}

impl ResourceAcl for clients::Model {
    fn acl(&self) -> Vec<AclEntry> {
        vec![
            AclEntry::allow(ROLE_ADMIN, AclPermission::All),
            AclEntry::allow(ROLE_MANAGER, AclPermission::List),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Create),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Read),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Update),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::ReadRelated),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::UpdateRelated),
        ]
    }
}

impl ResourceAcl for websites::Model {
    fn acl(&self) -> Vec<AclEntry> {
        vec![
            AclEntry::allow(ROLE_ADMIN, AclPermission::All),
            AclEntry::allow(ROLE_MANAGER, AclPermission::List),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Create),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Read),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Update),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::ReadRelated),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::UpdateRelated),
        ]
    }
}

impl ResourceAcl for tracking_links::Model {
    fn acl(&self) -> Vec<AclEntry> {
        vec![
            AclEntry::allow(ROLE_ADMIN, AclPermission::All),
            AclEntry::allow(ROLE_MANAGER, AclPermission::List),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Create),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Read),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Update),
            AclEntry::allow(ROLE_MANAGER, AclPermission::Delete),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::ReadRelated),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::UpdateRelated),
            AclEntry::allow(SCOPE_AUTHENTICATED, AclPermission::DeleteRelated),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_model(id: Uuid) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id,
            auth_id: "auth0|acl".to_string(),
            email: "acl@example.com".to_string(),
            username: "acl".to_string(),
            is_active: true,
            is_verified: true,
            is_superuser: false,
            roles: serde_json::json!([]),
            scopes: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    fn client_model() -> clients::Model {
        let now = chrono::Utc::now();
        clients::Model {
            id: Uuid::new_v4(),
            slug: "acl-co".to_string(),
            title: "Acl Co".to_string(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_may_update_themselves_but_not_others() {
        let me = Uuid::new_v4();
        let held = vec![user_scope(me)];

        assert!(user_model(me).check_access(&held, &AclPermission::Update));
        assert!(!user_model(Uuid::new_v4()).check_access(&held, &AclPermission::Update));
    }

    #[test]
    fn test_manager_reads_users_but_does_not_update_them() {
        let held = vec![ROLE_MANAGER.to_string()];
        let other = user_model(Uuid::new_v4());

        assert!(other.check_access(&held, &AclPermission::Read));
        assert!(!other.check_access(&held, &AclPermission::Update));
        assert!(!other.check_access(&held, &AclPermission::Delete));
    }

    #[test]
    fn test_client_related_grants_require_the_related_variant() {
        let client = client_model();
        let held = vec![SCOPE_AUTHENTICATED.to_string()];

        // Direct permissions stay reserved for admins and managers
        assert!(!client.check_access(&held, &AclPermission::Read));
        assert!(client.check_access(&held, &AclPermission::ReadRelated));
        assert!(!client.check_access(&held, &AclPermission::DeleteRelated));
    }

    #[test]
    fn test_admin_holds_everything() {
        let held = vec![ROLE_ADMIN.to_string()];
        assert!(client_model().check_access(&held, &AclPermission::Delete));
        assert!(user_model(Uuid::new_v4()).check_access(&held, &AclPermission::Delete));
    }
}
