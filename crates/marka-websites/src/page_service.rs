use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::website_pages::{
    ActiveModel as PageActiveModel, Column as PageColumn, Entity as PageEntity, Model as Page,
};
use marka_entities::{website_maps, websites};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const PAGE_URL_MAX_LEN: usize = 2048;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePageRequest {
    pub url: String,
    /// HTTP status observed for the page, defaults to 200
    pub status: Option<i32>,
    /// Sitemap priority, 0.0 to 1.0, defaults to 0.5
    pub priority: Option<f64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_modified: Option<DbDateTime>,
    pub change_frequency: Option<String>,
    pub sitemap_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePageRequest {
    pub url: Option<String>,
    pub status: Option<i32>,
    pub priority: Option<f64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_modified: Option<DbDateTime>,
    pub change_frequency: Option<String>,
    pub sitemap_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponse {
    pub id: Uuid,
    pub url: String,
    pub status: i32,
    pub priority: f64,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_modified: Option<DbDateTime>,
    pub change_frequency: Option<String>,
    pub is_active: bool,
    pub website_id: Uuid,
    pub sitemap_id: Option<Uuid>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            url: page.url,
            status: page.status,
            priority: page.priority,
            last_modified: page.last_modified,
            change_frequency: page.change_frequency,
            is_active: page.is_active,
            website_id: page.website_id,
            sitemap_id: page.sitemap_id,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

fn validate_page_url(url: &str) -> ServiceResult<()> {
    if url.is_empty() || url.len() > PAGE_URL_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Page URL must be between 1 and {} characters",
            PAGE_URL_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_priority(priority: f64) -> ServiceResult<()> {
    if !(0.0..=1.0).contains(&priority) {
        return Err(ServiceError::validation(
            "Priority must be between 0.0 and 1.0",
        ));
    }
    Ok(())
}

fn validate_status(status: i32) -> ServiceResult<()> {
    if !(100..=599).contains(&status) {
        return Err(ServiceError::validation(
            "Status must be a valid HTTP status code",
        ));
    }
    Ok(())
}

pub struct PageService {
    db: Arc<DatabaseConnection>,
}

impl PageService {
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

    /// The sitemap must exist and belong to the same website
    async fn require_sitemap(&self, sitemap_id: Uuid, website_id: Uuid) -> ServiceResult<()> {
        let sitemap = website_maps::Entity::find_by_id(sitemap_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Sitemap"))?;

        if sitemap.website_id != website_id {
            return Err(ServiceError::validation(
                "Sitemap does not belong to this website",
            ));
        }
        Ok(())
    }

    pub async fn create_page(
        &self,
        website_id: Uuid,
        request: CreatePageRequest,
    ) -> ServiceResult<Page> {
        validate_page_url(&request.url)?;
        self.require_website(website_id).await?;

        let status = request.status.unwrap_or(200);
        validate_status(status)?;
        let priority = request.priority.unwrap_or(0.5);
        validate_priority(priority)?;

        if let Some(sitemap_id) = request.sitemap_id {
            self.require_sitemap(sitemap_id, website_id).await?;
        }

        let existing = PageEntity::find()
            .filter(PageColumn::WebsiteId.eq(website_id))
            .filter(PageColumn::Url.eq(&request.url))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Page"));
        }

        let page = PageActiveModel {
            id: Set(Uuid::new_v4()),
            url: Set(request.url),
            status: Set(status),
            priority: Set(priority),
            last_modified: Set(request.last_modified),
            change_frequency: Set(request.change_frequency),
            is_active: Set(true),
            website_id: Set(website_id),
            sitemap_id: Set(request.sitemap_id),
            ..Default::default()
        };

        page.insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_pages(
        &self,
        website_id: Uuid,
        sitemap_id: Option<Uuid>,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<Page>, u64)> {
        self.require_website(website_id).await?;

        let mut query = PageEntity::find().filter(PageColumn::WebsiteId.eq(website_id));
        if let Some(sitemap_id) = sitemap_id {
            query = query.filter(PageColumn::SitemapId.eq(sitemap_id));
        }

        let paginator = query
            .order_by_asc(PageColumn::Url)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let pages = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((pages, total))
    }

    pub async fn get_page(&self, page_id: Uuid) -> ServiceResult<Page> {
        PageEntity::find_by_id(page_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Page"))
    }

    pub async fn update_page(
        &self,
        page_id: Uuid,
        request: UpdatePageRequest,
    ) -> ServiceResult<Page> {
        let page = self.get_page(page_id).await?;
        let mut active: PageActiveModel = page.clone().into();

        if let Some(url) = request.url {
            if url != page.url {
                validate_page_url(&url)?;

                let existing = PageEntity::find()
                    .filter(PageColumn::WebsiteId.eq(page.website_id))
                    .filter(PageColumn::Url.eq(&url))
                    .filter(PageColumn::Id.ne(page_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;

                if existing.is_some() {
                    return Err(ServiceError::already_exists("Page"));
                }

                active.url = Set(url);
            }
        }
        if let Some(status) = request.status {
            validate_status(status)?;
            active.status = Set(status);
        }
        if let Some(priority) = request.priority {
            validate_priority(priority)?;
            active.priority = Set(priority);
        }
        if let Some(last_modified) = request.last_modified {
            active.last_modified = Set(Some(last_modified));
        }
        if let Some(change_frequency) = request.change_frequency {
            active.change_frequency = Set(Some(change_frequency));
        }
        if let Some(sitemap_id) = request.sitemap_id {
            self.require_sitemap(sitemap_id, page.website_id).await?;
            active.sitemap_id = Set(Some(sitemap_id));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_page(&self, page_id: Uuid) -> ServiceResult<()> {
        let page = self.get_page(page_id).await?;
        PageEntity::delete_by_id(page.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_bounds() {
        assert!(validate_priority(0.0).is_ok());
        assert!(validate_priority(0.5).is_ok());
        assert!(validate_priority(1.0).is_ok());
        assert!(validate_priority(-0.1).is_err());
        assert!(validate_priority(1.1).is_err());
    }

    #[test]
    fn test_status_bounds() {
        assert!(validate_status(200).is_ok());
        assert!(validate_status(404).is_ok());
        assert!(validate_status(99).is_err());
        assert!(validate_status(600).is_err());
    }
}
