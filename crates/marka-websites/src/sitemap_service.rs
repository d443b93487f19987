use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::website_maps::{
    ActiveModel as SitemapActiveModel, Column as SitemapColumn, Entity as SitemapEntity,
    Model as Sitemap,
};
use marka_entities::websites;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const SITEMAP_URL_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSitemapRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSitemapRequest {
    pub url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SitemapResponse {
    pub id: Uuid,
    pub url: String,
    pub is_active: bool,
    pub website_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Sitemap> for SitemapResponse {
    fn from(sitemap: Sitemap) -> Self {
        Self {
            id: sitemap.id,
            url: sitemap.url,
            is_active: sitemap.is_active,
            website_id: sitemap.website_id,
            created_at: sitemap.created_at,
            updated_at: sitemap.updated_at,
        }
    }
}

fn validate_sitemap_url(url: &str) -> ServiceResult<()> {
    if url.is_empty() || url.len() > SITEMAP_URL_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Sitemap URL must be between 1 and {} characters",
            SITEMAP_URL_MAX_LEN
        )));
    }
    Ok(())
}

pub struct SitemapService {
    db: Arc<DatabaseConnection>,
}

impl SitemapService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn require_website(&self, website_id: Uuid) -> ServiceResult<()> {
        websites::Entity::find_by_id(website_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Website"))?;
        Ok(())
    }

    pub async fn create_sitemap(
        &self,
        website_id: Uuid,
        request: CreateSitemapRequest,
    ) -> ServiceResult<Sitemap> {
        validate_sitemap_url(&request.url)?;
        self.require_website(website_id).await?;

        let existing = SitemapEntity::find()
            .filter(SitemapColumn::WebsiteId.eq(website_id))
            .filter(SitemapColumn::Url.eq(&request.url))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Sitemap"));
        }

        let sitemap = SitemapActiveModel {
            id: Set(Uuid::new_v4()),
            url: Set(request.url),
            is_active: Set(true),
            website_id: Set(website_id),
            ..Default::default()
        };

        sitemap
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_sitemaps(
        &self,
        website_id: Uuid,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<Sitemap>, u64)> {
        self.require_website(website_id).await?;

        let paginator = SitemapEntity::find()
            .filter(SitemapColumn::WebsiteId.eq(website_id))
            .order_by_asc(SitemapColumn::Url)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let sitemaps = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((sitemaps, total))
    }

    pub async fn get_sitemap(&self, sitemap_id: Uuid) -> ServiceResult<Sitemap> {
        SitemapEntity::find_by_id(sitemap_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Sitemap"))
    }

    pub async fn update_sitemap(
        &self,
        sitemap_id: Uuid,
        request: UpdateSitemapRequest,
    ) -> ServiceResult<Sitemap> {
        let sitemap = self.get_sitemap(sitemap_id).await?;
        let mut active: SitemapActiveModel = sitemap.clone().into();

        if let Some(url) = request.url {
            if url != sitemap.url {
                validate_sitemap_url(&url)?;

                let existing = SitemapEntity::find()
                    .filter(SitemapColumn::WebsiteId.eq(sitemap.website_id))
                    .filter(SitemapColumn::Url.eq(&url))
                    .filter(SitemapColumn::Id.ne(sitemap_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;

                if existing.is_some() {
                    return Err(ServiceError::already_exists("Sitemap"));
                }

                active.url = Set(url);
            }
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_sitemap(&self, sitemap_id: Uuid) -> ServiceResult<()> {
        let sitemap = self.get_sitemap(sitemap_id).await?;
        SitemapEntity::delete_by_id(sitemap.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}
