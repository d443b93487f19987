use std::sync::Arc;

use marka_core::error_builder;
use marka_core::problemdetails::Problem;
use marka_core::DbDateTime;
use marka_entities::api_keys::{
    ActiveModel as ApiKeyActiveModel, Column as ApiKeyColumn, Entity as ApiKeyEntity,
};
use marka_entities::users;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::permissions::Role;

/// API key prefix, visible in every issued key
pub const API_KEY_PREFIX: &str = "mk_";

/// Random characters following the prefix
const API_KEY_RANDOM_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum ApiKeyServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl ApiKeyServiceError {
    pub fn to_problem(&self) -> Problem {
        match self {
            ApiKeyServiceError::NotFound(msg) => {
                error_builder::not_found().detail(msg.clone()).build()
            }
            ApiKeyServiceError::Conflict(msg) => {
                error_builder::conflict().detail(msg.clone()).build()
            }
            ApiKeyServiceError::Validation(msg) => error_builder::unprocessable_entity()
                .detail(msg.clone())
                .build(),
            ApiKeyServiceError::Unauthorized(msg) => {
                error_builder::unauthorized().detail(msg.clone()).build()
            }
            ApiKeyServiceError::Database(err) => {
                tracing::error!("API key database error: {}", err);
                error_builder::internal_server_error().build()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// Role scope override for the key, e.g. "role:user"; when unset the
    /// key inherits the owning user's roles
    pub role: Option<String>,
    /// Extra privilege scopes granted to the key
    pub scopes: Option<Vec<String>>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2026-12-31T23:59:59Z")]
    pub expires_at: Option<DbDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateApiKeyRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2026-12-31T23:59:59Z")]
    pub expires_at: Option<DbDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub role: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub is_active: bool,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub expires_at: Option<DbDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_used_at: Option<DbDateTime>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub role: Option<String>,
    pub scopes: Option<Vec<String>>,
    /// The full key, returned only on creation
    pub api_key: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub expires_at: Option<DbDateTime>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
}

impl From<marka_entities::api_keys::Model> for ApiKeyResponse {
    fn from(model: marka_entities::api_keys::Model) -> Self {
        let scopes = model
            .scopes
            .as_ref()
            .and_then(|json| serde_json::from_value(json.clone()).ok());

        Self {
            id: model.id,
            name: model.name,
            key_prefix: model.key_prefix,
            role: model.role,
            scopes,
            is_active: model.is_active,
            expires_at: model.expires_at,
            last_used_at: model.last_used_at,
            created_at: model.created_at,
        }
    }
}

/// Credential validated from a bearer token
pub struct ValidatedApiKey {
    pub user: users::Model,
    pub role: Option<Role>,
    pub scopes: Option<Vec<String>>,
    pub key_name: String,
    pub key_id: Uuid,
}

pub struct ApiKeyService {
    db: Arc<DatabaseConnection>,
}

impl ApiKeyService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn generate_api_key(&self) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(API_KEY_RANDOM_LEN)
            .map(char::from)
            .collect();
        format!("{}{}", API_KEY_PREFIX, random)
    }

    fn hash_api_key(&self, api_key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn create_api_key(
        &self,
        user_id: Uuid,
        request: CreateApiKeyRequest,
    ) -> Result<CreateApiKeyResponse, ApiKeyServiceError> {
        if request.name.trim().is_empty() {
            return Err(ApiKeyServiceError::Validation(
                "API key name must not be empty".to_string(),
            ));
        }

        if let Some(ref role) = request.role {
            if Role::from_scope(role).is_none() {
                return Err(ApiKeyServiceError::Validation(format!(
                    "Invalid role scope: {}. Valid roles are: role:admin, role:manager, \
                     role:employee, role:client, role:user",
                    role
                )));
            }
        }

        // Key names are unique per user
        let existing_key = ApiKeyEntity::find()
            .filter(ApiKeyColumn::UserId.eq(user_id))
            .filter(ApiKeyColumn::Name.eq(&request.name))
            .one(self.db.as_ref())
            .await?;

        if existing_key.is_some() {
            return Err(ApiKeyServiceError::Conflict(
                "API key with this name already exists".to_string(),
            ));
        }

        let api_key = self.generate_api_key();
        let key_hash = self.hash_api_key(&api_key);
        let key_prefix = api_key.chars().take(8).collect::<String>();

        let now = chrono::Utc::now();
        let expires_at = request
            .expires_at
            .or_else(|| Some(now + chrono::Duration::days(365)));

        let scopes_json = request
            .scopes
            .as_ref()
            .map(|scopes| serde_json::json!(scopes));

        let new_api_key = ApiKeyActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            key_hash: Set(key_hash),
            key_prefix: Set(key_prefix.clone()),
            user_id: Set(user_id),
            role: Set(request.role.clone()),
            scopes: Set(scopes_json),
            is_active: Set(true),
            expires_at: Set(expires_at),
            last_used_at: Set(None),
            ..Default::default()
        };

        let api_key_model = new_api_key.insert(self.db.as_ref()).await?;

        Ok(CreateApiKeyResponse {
            id: api_key_model.id,
            name: api_key_model.name,
            key_prefix,
            role: api_key_model.role,
            scopes: request.scopes,
            api_key, // Only returned on creation
            expires_at: api_key_model.expires_at,
            created_at: api_key_model.created_at,
        })
    }

    pub async fn list_api_keys(
        &self,
        user_id: Uuid,
        page: u64,
        size: u64,
    ) -> Result<(Vec<ApiKeyResponse>, u64), ApiKeyServiceError> {
        let paginator = ApiKeyEntity::find()
            .filter(ApiKeyColumn::UserId.eq(user_id))
            .order_by_desc(ApiKeyColumn::CreatedAt)
            .paginate(self.db.as_ref(), size);

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(ApiKeyResponse::from).collect(), total))
    }

    pub async fn get_api_key(
        &self,
        user_id: Uuid,
        api_key_id: Uuid,
    ) -> Result<ApiKeyResponse, ApiKeyServiceError> {
        let api_key = ApiKeyEntity::find_by_id(api_key_id)
            .filter(ApiKeyColumn::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ApiKeyServiceError::NotFound("API key not found".to_string()))?;

        Ok(ApiKeyResponse::from(api_key))
    }

    pub async fn update_api_key(
        &self,
        user_id: Uuid,
        api_key_id: Uuid,
        request: UpdateApiKeyRequest,
    ) -> Result<ApiKeyResponse, ApiKeyServiceError> {
        let api_key = ApiKeyEntity::find_by_id(api_key_id)
            .filter(ApiKeyColumn::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ApiKeyServiceError::NotFound("API key not found".to_string()))?;

        if let Some(ref new_name) = request.name {
            if new_name != &api_key.name {
                let existing_key = ApiKeyEntity::find()
                    .filter(ApiKeyColumn::UserId.eq(user_id))
                    .filter(ApiKeyColumn::Name.eq(new_name))
                    .filter(ApiKeyColumn::Id.ne(api_key_id))
                    .one(self.db.as_ref())
                    .await?;

                if existing_key.is_some() {
                    return Err(ApiKeyServiceError::Conflict(
                        "API key with this name already exists".to_string(),
                    ));
                }
            }
        }

        let mut api_key_active: ApiKeyActiveModel = api_key.into();

        if let Some(name) = request.name {
            api_key_active.name = Set(name);
        }
        if let Some(is_active) = request.is_active {
            api_key_active.is_active = Set(is_active);
        }
        if let Some(expires_at) = request.expires_at {
            api_key_active.expires_at = Set(Some(expires_at));
        }

        let updated = api_key_active.update(self.db.as_ref()).await?;

        Ok(ApiKeyResponse::from(updated))
    }

    pub async fn delete_api_key(
        &self,
        user_id: Uuid,
        api_key_id: Uuid,
    ) -> Result<(), ApiKeyServiceError> {
        let api_key = ApiKeyEntity::find_by_id(api_key_id)
            .filter(ApiKeyColumn::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ApiKeyServiceError::NotFound("API key not found".to_string()))?;

        ApiKeyEntity::delete_by_id(api_key.id)
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    /// Resolve a bearer token into the owning user and key grants.
    ///
    /// Checks hash and prefix, rejects inactive or expired keys, and
    /// records the key's last use.
    pub async fn validate_api_key(
        &self,
        api_key: &str,
    ) -> Result<ValidatedApiKey, ApiKeyServiceError> {
        let key_hash = self.hash_api_key(api_key);
        let key_prefix = api_key.chars().take(8).collect::<String>();

        let api_key_model = ApiKeyEntity::find()
            .filter(ApiKeyColumn::KeyHash.eq(&key_hash))
            .filter(ApiKeyColumn::KeyPrefix.eq(&key_prefix))
            .filter(ApiKeyColumn::IsActive.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ApiKeyServiceError::Unauthorized("Invalid API key".to_string()))?;

        if let Some(expires_at) = api_key_model.expires_at {
            if expires_at <= chrono::Utc::now() {
                return Err(ApiKeyServiceError::Unauthorized(
                    "API key has expired".to_string(),
                ));
            }
        }

        let user = users::Entity::find_by_id(api_key_model.user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ApiKeyServiceError::NotFound("User not found".to_string()))?;

        let role = api_key_model
            .role
            .as_deref()
            .and_then(Role::from_scope);
        let scopes: Option<Vec<String>> = api_key_model
            .scopes
            .as_ref()
            .and_then(|json| serde_json::from_value(json.clone()).ok());

        // Update last_used_at; don't fail validation if this fails
        let mut api_key_active: ApiKeyActiveModel = api_key_model.clone().into();
        api_key_active.last_used_at = Set(Some(chrono::Utc::now()));
        if let Err(e) = api_key_active.update(self.db.as_ref()).await {
            tracing::warn!("Failed to record API key usage: {}", e);
        }

        Ok(ValidatedApiKey {
            user,
            role,
            scopes,
            key_name: api_key_model.name,
            key_id: api_key_model.id,
        })
    }
}
