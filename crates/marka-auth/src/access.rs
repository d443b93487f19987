//! Tenant-scoped access checks
//!
//! Every target resource carries an ordered ACL (`acls` module). A check
//! first evaluates the requested permission against the caller's privilege
//! set; when that is denied, the permission's `*Related` variant is
//! evaluated instead, but only after the relationship to the resource
//! (client membership, or the resource's owning client) is confirmed
//! against the database.

use std::sync::Arc;

use marka_core::{ServiceError, ServiceResult};
use marka_entities::{client_websites, clients, tracking_links, user_clients, users, websites};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::context::AuthContext;
use crate::permissions::{AclPermission, ResourceAcl};

/// The resource an access check is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum AccessTarget {
    User(Uuid),
    Client(Uuid),
    Website(Uuid),
    TrackingLink(Uuid),
}

pub struct AccessControl {
    db: Arc<DatabaseConnection>,
}

impl AccessControl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Verify the requester may perform `permission` on the target resource.
    ///
    /// Returns `ServiceError::NotFound` for unknown targets and
    /// `ServiceError::PermissionDenied` when no ACL rule grants access.
    pub async fn verify_user_can_access(
        &self,
        auth: &AuthContext,
        permission: AclPermission,
        target: AccessTarget,
    ) -> ServiceResult<()> {
        if auth.is_admin() {
            return Ok(());
        }

        let granted = match target {
            AccessTarget::User(user_id) => {
                let user = users::Entity::find_by_id(user_id)
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?
                    .ok_or_else(|| ServiceError::not_found("User"))?;

                // Self access flows through the identity scope in the ACL
                auth.can(&user, &permission)
            }
            AccessTarget::Client(client_id) => {
                let client = clients::Entity::find_by_id(client_id)
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?
                    .ok_or_else(|| ServiceError::not_found("Client"))?;

                if auth.can(&client, &permission) {
                    true
                } else {
                    self.related_access(auth, &client, &permission, || {
                        self.is_member_of_client(auth.user_id(), client.id)
                    })
                    .await?
                }
            }
            AccessTarget::Website(website_id) => {
                let website = websites::Entity::find_by_id(website_id)
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?
                    .ok_or_else(|| ServiceError::not_found("Website"))?;

                if auth.can(&website, &permission) {
                    true
                } else {
                    self.related_access(auth, &website, &permission, || {
                        self.is_member_of_website_client(auth.user_id(), website.id)
                    })
                    .await?
                }
            }
            AccessTarget::TrackingLink(link_id) => {
                let link = tracking_links::Entity::find_by_id(link_id)
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?
                    .ok_or_else(|| ServiceError::not_found("Tracking link"))?;

                if auth.can(&link, &permission) {
                    true
                } else {
                    self.related_access(auth, &link, &permission, || async {
                        match link.client_id {
                            Some(client_id) => {
                                self.is_member_of_client(auth.user_id(), client_id).await
                            }
                            // Unassigned links have no related users
                            None => Ok(false),
                        }
                    })
                    .await?
                }
            }
        };

        if granted {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied {
                action: format!("{} {:?}", permission, target),
            })
        }
    }

    /// Evaluate the `*Related` variant of a permission: the resource's ACL
    /// must grant it AND the requester must actually be related.
    async fn related_access<R, F, Fut>(
        &self,
        auth: &AuthContext,
        resource: &R,
        permission: &AclPermission,
        is_related: F,
    ) -> ServiceResult<bool>
    where
        R: ResourceAcl,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ServiceResult<bool>>,
    {
        let Some(related_permission) = permission.related() else {
            return Ok(false);
        };
        if !auth.can(resource, &related_permission) {
            return Ok(false);
        }
        is_related().await
    }

    async fn is_member_of_client(&self, user_id: Uuid, client_id: Uuid) -> ServiceResult<bool> {
        let count = user_clients::Entity::find()
            .filter(user_clients::Column::UserId.eq(user_id))
            .filter(user_clients::Column::ClientId.eq(client_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn is_member_of_website_client(
        &self,
        user_id: Uuid,
        website_id: Uuid,
    ) -> ServiceResult<bool> {
        let associations = client_websites::Entity::find()
            .filter(client_websites::Column::WebsiteId.eq(website_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        for association in associations {
            if self
                .is_member_of_client(user_id, association.client_id)
                .await?
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
