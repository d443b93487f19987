use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::websites::{
    ActiveModel as WebsiteActiveModel, Column as WebsiteColumn, Entity as WebsiteEntity,
    Model as Website,
};
use marka_entities::{client_websites, websites};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DOMAIN_MAX_LEN: usize = 253;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWebsiteRequest {
    pub domain: String,
    #[serde(default)]
    pub is_secure: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWebsiteRequest {
    pub domain: Option<String>,
    pub is_secure: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebsiteResponse {
    pub id: Uuid,
    pub domain: String,
    pub is_secure: bool,
    pub is_active: bool,
    /// Full base URL derived from the scheme and domain
    pub link: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Website> for WebsiteResponse {
    fn from(website: Website) -> Self {
        let link = website.get_link();
        Self {
            id: website.id,
            domain: website.domain,
            is_secure: website.is_secure,
            is_active: website.is_active,
            link,
            created_at: website.created_at,
            updated_at: website.updated_at,
        }
    }
}

/// Validates a bare domain name (no scheme, no path): dot-separated labels
/// of letters, digits, and inner hyphens.
pub fn validate_domain(domain: &str) -> ServiceResult<()> {
    if domain.is_empty() || domain.len() > DOMAIN_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Domain must be between 1 and {} characters",
            DOMAIN_MAX_LEN
        )));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(ServiceError::validation(
            "Domain must contain at least one dot",
        ));
    }

    for label in labels {
        let valid = !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(ServiceError::validation(format!(
                "Invalid domain label '{}'",
                label
            )));
        }
    }

    Ok(())
}

pub struct WebsiteService {
    db: Arc<DatabaseConnection>,
}

impl WebsiteService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_website(&self, request: CreateWebsiteRequest) -> ServiceResult<Website> {
        let domain = request.domain.trim().to_lowercase();
        validate_domain(&domain)?;

        let existing = WebsiteEntity::find()
            .filter(WebsiteColumn::Domain.eq(&domain))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Website"));
        }

        let website = WebsiteActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(domain),
            is_secure: Set(request.is_secure.unwrap_or(true)),
            is_active: Set(true),
            ..Default::default()
        };

        website
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Lists websites, optionally limited to those owned by a client
    pub async fn list_websites(
        &self,
        page: u64,
        size: u64,
        client_id: Option<Uuid>,
    ) -> ServiceResult<(Vec<Website>, u64)> {
        let mut query = WebsiteEntity::find();

        if let Some(client_id) = client_id {
            query = query
                .join(
                    JoinType::InnerJoin,
                    websites::Relation::ClientWebsites.def(),
                )
                .filter(client_websites::Column::ClientId.eq(client_id));
        }

        let paginator = query
            .order_by_asc(WebsiteColumn::Domain)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let websites = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((websites, total))
    }

    pub async fn get_website(&self, website_id: Uuid) -> ServiceResult<Website> {
        WebsiteEntity::find_by_id(website_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Website"))
    }

    pub async fn update_website(
        &self,
        website_id: Uuid,
        request: UpdateWebsiteRequest,
    ) -> ServiceResult<Website> {
        let website = self.get_website(website_id).await?;
        let mut active: WebsiteActiveModel = website.clone().into();

        if let Some(domain) = request.domain {
            let domain = domain.trim().to_lowercase();
            if domain != website.domain {
                validate_domain(&domain)?;

                let existing = WebsiteEntity::find()
                    .filter(WebsiteColumn::Domain.eq(&domain))
                    .filter(WebsiteColumn::Id.ne(website_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;

                if existing.is_some() {
                    return Err(ServiceError::already_exists("Website"));
                }

                active.domain = Set(domain);
            }
        }
        if let Some(is_secure) = request.is_secure {
            active.is_secure = Set(is_secure);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_website(&self, website_id: Uuid) -> ServiceResult<()> {
        let website = self.get_website(website_id).await?;
        WebsiteEntity::delete_by_id(website.id)
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
    fn test_valid_domains() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("sub.example.co.uk").is_ok());
        assert!(validate_domain("my-site.example.com").is_ok());
        assert!(validate_domain("123.example.com").is_ok());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(validate_domain("").is_err());
        assert!(validate_domain("localhost").is_err());
        assert!(validate_domain("exa mple.com").is_err());
        assert!(validate_domain("-leading.example.com").is_err());
        assert!(validate_domain("trailing-.example.com").is_err());
        assert!(validate_domain("UPPER.example.com").is_err());
        assert!(validate_domain("https://example.com").is_err());
        assert!(validate_domain("example..com").is_err());
    }
}
