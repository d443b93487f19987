use std::sync::Arc;

use marka_core::{ServiceError, ServiceResult};
use marka_entities::users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, Model as User,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::permissions::{Role, ROLE_USER};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// External identity provider subject
    pub auth_id: String,
    pub email: String,
    pub username: String,
    /// Role scopes to assign; defaults to ["role:user"]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub auth_id: String,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub roles: Vec<String>,
    pub scopes: Vec<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: marka_core::DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: marka_core::DbDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let roles = serde_json::from_value(user.roles.clone()).unwrap_or_default();
        let scopes = serde_json::from_value(user.scopes.clone()).unwrap_or_default();

        Self {
            id: user.id,
            auth_id: user.auth_id,
            email: user.email,
            username: user.username,
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_superuser: user.is_superuser,
            roles,
            scopes,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> ServiceResult<User> {
        if request.username.trim().is_empty() {
            return Err(ServiceError::validation("Username must not be empty"));
        }
        if !request.email.contains('@') {
            return Err(ServiceError::validation("Email address is invalid"));
        }

        let roles = request
            .roles
            .unwrap_or_else(|| vec![ROLE_USER.to_string()]);
        for role in &roles {
            if Role::from_scope(role).is_none() {
                return Err(ServiceError::validation(format!(
                    "Invalid role scope: {}",
                    role
                )));
            }
        }

        let existing = UserEntity::find()
            .filter(
                UserColumn::AuthId
                    .eq(&request.auth_id)
                    .or(UserColumn::Username.eq(&request.username)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("User"));
        }

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            auth_id: Set(request.auth_id),
            email: Set(request.email),
            username: Set(request.username),
            is_active: Set(true),
            is_verified: Set(false),
            is_superuser: Set(false),
            roles: Set(serde_json::json!(roles)),
            scopes: Set(serde_json::json!([])),
            ..Default::default()
        };

        user.insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_users(&self, page: u64, size: u64) -> ServiceResult<(Vec<User>, u64)> {
        let paginator = UserEntity::find()
            .order_by_asc(UserColumn::Username)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let users = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((users, total))
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        UserEntity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn get_user_by_auth_id(&self, auth_id: &str) -> ServiceResult<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::AuthId.eq(auth_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn get_user_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> ServiceResult<User> {
        let user = self.get_user(user_id).await?;

        if let Some(ref username) = request.username {
            if username != &user.username {
                let taken = UserEntity::find()
                    .filter(UserColumn::Username.eq(username))
                    .filter(UserColumn::Id.ne(user_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;
                if taken.is_some() {
                    return Err(ServiceError::already_exists("Username"));
                }
            }
        }

        let mut active: UserActiveModel = user.into();
        if let Some(email) = request.email {
            if !email.contains('@') {
                return Err(ServiceError::validation("Email address is invalid"));
            }
            active.email = Set(email);
        }
        if let Some(username) = request.username {
            active.username = Set(username);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Add a role scope to the user's roles list; idempotent
    pub async fn assign_role(&self, user_id: Uuid, role: Role) -> ServiceResult<User> {
        let user = self.get_user(user_id).await?;
        let mut roles: Vec<String> =
            serde_json::from_value(user.roles.clone()).unwrap_or_default();

        if !roles.iter().any(|r| r == role.as_scope()) {
            roles.push(role.as_scope().to_string());
        }

        let mut active: UserActiveModel = user.into();
        active.roles = Set(serde_json::json!(roles));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn remove_role(&self, user_id: Uuid, role: Role) -> ServiceResult<User> {
        let user = self.get_user(user_id).await?;
        let mut roles: Vec<String> =
            serde_json::from_value(user.roles.clone()).unwrap_or_default();
        roles.retain(|r| r != role.as_scope());

        let mut active: UserActiveModel = user.into();
        active.roles = Set(serde_json::json!(roles));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Add an explicit privilege scope to the user; idempotent
    pub async fn grant_scope(&self, user_id: Uuid, scope: &str) -> ServiceResult<User> {
        if scope.trim().is_empty() {
            return Err(ServiceError::validation("Scope must not be empty"));
        }

        let user = self.get_user(user_id).await?;
        let mut scopes: Vec<String> =
            serde_json::from_value(user.scopes.clone()).unwrap_or_default();

        if !scopes.iter().any(|s| s == scope) {
            scopes.push(scope.to_string());
        }

        let mut active: UserActiveModel = user.into();
        active.scopes = Set(serde_json::json!(scopes));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn revoke_scope(&self, user_id: Uuid, scope: &str) -> ServiceResult<User> {
        let user = self.get_user(user_id).await?;
        let mut scopes: Vec<String> =
            serde_json::from_value(user.scopes.clone()).unwrap_or_default();
        scopes.retain(|s| s != scope);

        let mut active: UserActiveModel = user.into();
        active.scopes = Set(serde_json::json!(scopes));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn set_active(&self, user_id: Uuid, is_active: bool) -> ServiceResult<User> {
        let user = self.get_user(user_id).await?;
        let mut active: UserActiveModel = user.into();
        active.is_active = Set(is_active);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_user(&self, user_id: Uuid) -> ServiceResult<()> {
        let user = self.get_user(user_id).await?;
        UserEntity::delete_by_id(user.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}
