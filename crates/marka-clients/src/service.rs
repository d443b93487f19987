use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::clients::{
    ActiveModel as ClientActiveModel, Column as ClientColumn, Entity as ClientEntity,
    Model as Client,
};
use marka_entities::{client_websites, user_clients, users, websites};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 96;
pub const DESCRIPTION_MAX_LEN: usize = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            slug: client.slug,
            title: client.title,
            description: client.description,
            is_active: client.is_active,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

fn validate_title(title: &str) -> ServiceResult<()> {
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(ServiceError::validation(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN_LEN, TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: &Option<String>) -> ServiceResult<()> {
    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(ServiceError::validation(format!(
                "Description must not exceed {} characters",
                DESCRIPTION_MAX_LEN
            )));
        }
    }
    Ok(())
}

pub struct ClientService {
    db: Arc<DatabaseConnection>,
}

impl ClientService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_client(&self, request: CreateClientRequest) -> ServiceResult<Client> {
        validate_title(&request.title)?;
        validate_description(&request.description)?;

        let slug = slug::slugify(&request.title);

        let existing = ClientEntity::find()
            .filter(
                ClientColumn::Title
                    .eq(&request.title)
                    .or(ClientColumn::Slug.eq(&slug)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Client"));
        }

        let client = ClientActiveModel {
            id: Set(Uuid::new_v4()),
            slug: Set(slug),
            title: Set(request.title),
            description: Set(request.description),
            is_active: Set(true),
            ..Default::default()
        };

        client
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_clients(&self, page: u64, size: u64) -> ServiceResult<(Vec<Client>, u64)> {
        let paginator = ClientEntity::find()
            .order_by_asc(ClientColumn::Title)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let clients = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((clients, total))
    }

    /// Clients the given user is associated with
    pub async fn list_clients_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<Client>, u64)> {
        let paginator = ClientEntity::find()
            .join(
                JoinType::InnerJoin,
                marka_entities::clients::Relation::UserClients.def(),
            )
            .filter(user_clients::Column::UserId.eq(user_id))
            .order_by_asc(ClientColumn::Title)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let clients = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((clients, total))
    }

    pub async fn get_client(&self, client_id: Uuid) -> ServiceResult<Client> {
        ClientEntity::find_by_id(client_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Client"))
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> ServiceResult<Client> {
        let client = self.get_client(client_id).await?;

        let mut active: ClientActiveModel = client.clone().into();

        if let Some(title) = request.title {
            if title != client.title {
                validate_title(&title)?;
                let slug = slug::slugify(&title);

                let existing = ClientEntity::find()
                    .filter(
                        ClientColumn::Title
                            .eq(&title)
                            .or(ClientColumn::Slug.eq(&slug)),
                    )
                    .filter(ClientColumn::Id.ne(client_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;

                if existing.is_some() {
                    return Err(ServiceError::already_exists("Client"));
                }

                active.title = Set(title);
                active.slug = Set(slug);
            }
        }
        if let Some(description) = request.description {
            let description = Some(description);
            validate_description(&description)?;
            active.description = Set(description);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Soft delete: mark the client inactive but keep its data
    pub async fn deactivate_client(&self, client_id: Uuid) -> ServiceResult<Client> {
        let client = self.get_client(client_id).await?;
        let mut active: ClientActiveModel = client.into();
        active.is_active = Set(false);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Hard delete: removes the client and cascades its associations
    pub async fn delete_client(&self, client_id: Uuid) -> ServiceResult<()> {
        let client = self.get_client(client_id).await?;
        ClientEntity::delete_by_id(client.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    /// Associate a user with a client; idempotent
    pub async fn assign_user(
        &self,
        client_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<user_clients::Model> {
        self.get_client(client_id).await?;
        users::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let existing = user_clients::Entity::find_by_id((user_id, client_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if let Some(association) = existing {
            return Ok(association);
        }

        let association = user_clients::ActiveModel {
            user_id: Set(user_id),
            client_id: Set(client_id),
            ..Default::default()
        };

        association
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn remove_user(&self, client_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        let association = user_clients::Entity::find_by_id((user_id, client_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("User association"))?;

        association
            .delete(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_users(&self, client_id: Uuid) -> ServiceResult<Vec<users::Model>> {
        let client = self.get_client(client_id).await?;
        client
            .find_related(users::Entity)
            .order_by_asc(users::Column::Username)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Associate a website with a client; idempotent
    pub async fn assign_website(
        &self,
        client_id: Uuid,
        website_id: Uuid,
    ) -> ServiceResult<client_websites::Model> {
        self.get_client(client_id).await?;
        websites::Entity::find_by_id(website_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Website"))?;

        let existing = client_websites::Entity::find_by_id((client_id, website_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if let Some(association) = existing {
            return Ok(association);
        }

        let association = client_websites::ActiveModel {
            client_id: Set(client_id),
            website_id: Set(website_id),
            ..Default::default()
        };

        association
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn remove_website(&self, client_id: Uuid, website_id: Uuid) -> ServiceResult<()> {
        let association = client_websites::Entity::find_by_id((client_id, website_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Website association"))?;

        association
            .delete(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_websites(&self, client_id: Uuid) -> ServiceResult<Vec<websites::Model>> {
        let client = self.get_client(client_id).await?;
        client
            .find_related(websites::Entity)
            .order_by_asc(websites::Column::Domain)
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}
