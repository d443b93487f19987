use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::tracking_links::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as LinkEntity, Model as Link,
};
use marka_entities::user_clients;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::parser::parse_tracking_url;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTrackingLinkRequest {
    /// Full URL to track; the server decomposes it into its parts
    pub url: String,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTrackingLinkRequest {
    /// Replacement URL; triggers a full re-parse
    pub url: Option<String>,
    pub client_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Query filters for the tracking link listing
#[derive(Debug, Default, Clone, Serialize, Deserialize, utoipa::IntoParams)]
pub struct TrackingLinkFilter {
    pub client_id: Option<Uuid>,
    pub scheme: Option<String>,
    pub domain: Option<String>,
    pub destination: Option<String>,
    pub url_path: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_source: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackingLinkResponse {
    pub id: Uuid,
    pub url_hash: String,
    pub url: String,
    pub scheme: String,
    pub domain: String,
    pub destination: String,
    pub url_path: String,
    pub utm_campaign: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_source: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub is_active: bool,
    pub client_id: Option<Uuid>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Link> for TrackingLinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url_hash: link.url_hash,
            url: link.url,
            scheme: link.scheme,
            domain: link.domain,
            destination: link.destination,
            url_path: link.url_path,
            utm_campaign: link.utm_campaign,
            utm_medium: link.utm_medium,
            utm_source: link.utm_source,
            utm_content: link.utm_content,
            utm_term: link.utm_term,
            is_active: link.is_active,
            client_id: link.client_id,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

pub struct TrackingLinkService {
    db: Arc<DatabaseConnection>,
}

impl TrackingLinkService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn require_client(&self, client_id: Uuid) -> ServiceResult<()> {
        marka_entities::clients::Entity::find_by_id(client_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Client"))?;
        Ok(())
    }

    pub async fn create_link(&self, request: CreateTrackingLinkRequest) -> ServiceResult<Link> {
        let parsed = parse_tracking_url(&request.url)?;

        if let Some(client_id) = request.client_id {
            self.require_client(client_id).await?;
        }

        let existing = LinkEntity::find()
            .filter(LinkColumn::UrlHash.eq(&parsed.url_hash))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Tracking link"));
        }

        let link = LinkActiveModel {
            id: Set(Uuid::new_v4()),
            url_hash: Set(parsed.url_hash),
            url: Set(parsed.url),
            scheme: Set(parsed.scheme),
            domain: Set(parsed.domain),
            destination: Set(parsed.destination),
            url_path: Set(parsed.url_path),
            utm_campaign: Set(parsed.utm_campaign),
            utm_medium: Set(parsed.utm_medium),
            utm_source: Set(parsed.utm_source),
            utm_content: Set(parsed.utm_content),
            utm_term: Set(parsed.utm_term),
            is_active: Set(true),
            client_id: Set(request.client_id),
            ..Default::default()
        };

        link.insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Lists links matching the filter; when `allowed_clients` is given the
    /// listing is additionally restricted to links of those clients.
    pub async fn list_links(
        &self,
        filter: &TrackingLinkFilter,
        allowed_clients: Option<&[Uuid]>,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<Link>, u64)> {
        let mut query = LinkEntity::find();

        if let Some(client_id) = filter.client_id {
            query = query.filter(LinkColumn::ClientId.eq(client_id));
        }
        if let Some(scheme) = &filter.scheme {
            query = query.filter(LinkColumn::Scheme.eq(scheme));
        }
        if let Some(domain) = &filter.domain {
            query = query.filter(LinkColumn::Domain.eq(domain));
        }
        if let Some(destination) = &filter.destination {
            query = query.filter(LinkColumn::Destination.eq(destination));
        }
        if let Some(url_path) = &filter.url_path {
            query = query.filter(LinkColumn::UrlPath.eq(url_path));
        }
        if let Some(utm_campaign) = &filter.utm_campaign {
            query = query.filter(LinkColumn::UtmCampaign.eq(utm_campaign));
        }
        if let Some(utm_medium) = &filter.utm_medium {
            query = query.filter(LinkColumn::UtmMedium.eq(utm_medium));
        }
        if let Some(utm_source) = &filter.utm_source {
            query = query.filter(LinkColumn::UtmSource.eq(utm_source));
        }
        if let Some(utm_content) = &filter.utm_content {
            query = query.filter(LinkColumn::UtmContent.eq(utm_content));
        }
        if let Some(utm_term) = &filter.utm_term {
            query = query.filter(LinkColumn::UtmTerm.eq(utm_term));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(LinkColumn::IsActive.eq(is_active));
        }
        if let Some(allowed) = allowed_clients {
            query = query.filter(LinkColumn::ClientId.is_in(allowed.iter().copied()));
        }

        let paginator = query
            .order_by_asc(LinkColumn::Url)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let links = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((links, total))
    }

    /// Clients the given user belongs to, for restricting non-admin listings
    pub async fn clients_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let memberships = user_clients::Entity::find()
            .filter(user_clients::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(memberships.into_iter().map(|m| m.client_id).collect())
    }

    pub async fn get_link(&self, link_id: Uuid) -> ServiceResult<Link> {
        LinkEntity::find_by_id(link_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Tracking link"))
    }

    pub async fn update_link(
        &self,
        link_id: Uuid,
        request: UpdateTrackingLinkRequest,
    ) -> ServiceResult<Link> {
        let link = self.get_link(link_id).await?;
        let mut active: LinkActiveModel = link.clone().into();

        if let Some(url) = request.url {
            let parsed = parse_tracking_url(&url)?;
            if parsed.url_hash != link.url_hash {
                let existing = LinkEntity::find()
                    .filter(LinkColumn::UrlHash.eq(&parsed.url_hash))
                    .filter(LinkColumn::Id.ne(link_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;

                if existing.is_some() {
                    return Err(ServiceError::already_exists("Tracking link"));
                }

                active.url_hash = Set(parsed.url_hash);
                active.url = Set(parsed.url);
                active.scheme = Set(parsed.scheme);
                active.domain = Set(parsed.domain);
                active.destination = Set(parsed.destination);
                active.url_path = Set(parsed.url_path);
                active.utm_campaign = Set(parsed.utm_campaign);
                active.utm_medium = Set(parsed.utm_medium);
                active.utm_source = Set(parsed.utm_source);
                active.utm_content = Set(parsed.utm_content);
                active.utm_term = Set(parsed.utm_term);
            }
        }
        if let Some(client_id) = request.client_id {
            self.require_client(client_id).await?;
            active.client_id = Set(Some(client_id));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_link(&self, link_id: Uuid) -> ServiceResult<()> {
        let link = self.get_link(link_id).await?;
        LinkEntity::delete_by_id(link.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}
