use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::gsc_metrics::{
    ActiveModel as MetricActiveModel, Column as MetricColumn, Entity as MetricEntity,
    Model as GscMetric,
};
use marka_entities::gsc_properties::{
    ActiveModel as PropertyActiveModel, Column as PropertyColumn, Entity as PropertyEntity,
    Model as GscProperty,
};
use marka_entities::{clients, websites};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const TITLE_MAX_LEN: usize = 96;

/// Search Console report dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    SearchAppearance,
    Query,
    Page,
    Device,
    Country,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::SearchAppearance => "searchappearance",
            MetricType::Query => "query",
            MetricType::Page => "page",
            MetricType::Device => "device",
            MetricType::Country => "country",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "searchappearance" => Ok(MetricType::SearchAppearance),
            "query" => Ok(MetricType::Query),
            "page" => Ok(MetricType::Page),
            "device" => Ok(MetricType::Device),
            "country" => Ok(MetricType::Country),
            other => Err(ServiceError::validation(format!(
                "Unknown metric type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGscPropertyRequest {
    pub title: String,
    pub client_id: Uuid,
    pub website_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGscPropertyRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GscPropertyResponse {
    pub id: Uuid,
    pub title: String,
    pub client_id: Uuid,
    pub website_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<GscProperty> for GscPropertyResponse {
    fn from(property: GscProperty) -> Self {
        Self {
            id: property.id,
            title: property.title,
            client_id: property.client_id,
            website_id: property.website_id,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGscMetricRequest {
    pub metric_type: MetricType,
    /// Dimension key reported by Search Console (query text, page URL, ...)
    pub keys: String,
    pub clicks: i32,
    pub impressions: i32,
    pub ctr: f64,
    pub position: f64,
    #[schema(value_type = String, format = "date-time")]
    pub date_start: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub date_end: DbDateTime,
}

/// Query filters for the metric listing
#[derive(Debug, Default, Clone, Serialize, Deserialize, utoipa::IntoParams)]
pub struct GscMetricFilter {
    pub metric_type: Option<String>,
    #[param(value_type = Option<String>, format = "date-time")]
    pub date_from: Option<DbDateTime>,
    #[param(value_type = Option<String>, format = "date-time")]
    pub date_to: Option<DbDateTime>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GscMetricResponse {
    pub id: Uuid,
    pub metric_type: String,
    pub keys: String,
    pub clicks: i32,
    pub impressions: i32,
    pub ctr: f64,
    pub position: f64,
    #[schema(value_type = String, format = "date-time")]
    pub date_start: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub date_end: DbDateTime,
    pub gsc_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
}

impl From<GscMetric> for GscMetricResponse {
    fn from(metric: GscMetric) -> Self {
        Self {
            id: metric.id,
            metric_type: metric.metric_type,
            keys: metric.keys,
            clicks: metric.clicks,
            impressions: metric.impressions,
            ctr: metric.ctr,
            position: metric.position,
            date_start: metric.date_start,
            date_end: metric.date_end,
            gsc_id: metric.gsc_id,
            created_at: metric.created_at,
        }
    }
}

fn validate_title(title: &str) -> ServiceResult<()> {
    if title.is_empty() || title.len() > TITLE_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Title must be between 1 and {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}

pub struct GscService {
    db: Arc<DatabaseConnection>,
}

impl GscService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_property(
        &self,
        request: CreateGscPropertyRequest,
    ) -> ServiceResult<GscProperty> {
        validate_title(&request.title)?;

        clients::Entity::find_by_id(request.client_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Client"))?;
        websites::Entity::find_by_id(request.website_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Website"))?;

        let existing = PropertyEntity::find()
            .filter(PropertyColumn::Title.eq(&request.title))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("GSC property"));
        }

        let property = PropertyActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            client_id: Set(request.client_id),
            website_id: Set(request.website_id),
            ..Default::default()
        };

        property
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_properties(
        &self,
        page: u64,
        size: u64,
        client_id: Option<Uuid>,
    ) -> ServiceResult<(Vec<GscProperty>, u64)> {
        let mut query = PropertyEntity::find();
        if let Some(client_id) = client_id {
            query = query.filter(PropertyColumn::ClientId.eq(client_id));
        }

        let paginator = query
            .order_by_asc(PropertyColumn::Title)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let properties = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((properties, total))
    }

    pub async fn get_property(&self, property_id: Uuid) -> ServiceResult<GscProperty> {
        PropertyEntity::find_by_id(property_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("GSC property"))
    }

    pub async fn update_property(
        &self,
        property_id: Uuid,
        request: UpdateGscPropertyRequest,
    ) -> ServiceResult<GscProperty> {
        let property = self.get_property(property_id).await?;
        let mut active: PropertyActiveModel = property.clone().into();

        if let Some(title) = request.title {
            if title != property.title {
                validate_title(&title)?;
                let existing = PropertyEntity::find()
                    .filter(PropertyColumn::Title.eq(&title))
                    .filter(PropertyColumn::Id.ne(property_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;
                if existing.is_some() {
                    return Err(ServiceError::already_exists("GSC property"));
                }
                active.title = Set(title);
            }
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_property(&self, property_id: Uuid) -> ServiceResult<()> {
        let property = self.get_property(property_id).await?;
        PropertyEntity::delete_by_id(property.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn create_metric(
        &self,
        gsc_id: Uuid,
        request: CreateGscMetricRequest,
    ) -> ServiceResult<GscMetric> {
        self.get_property(gsc_id).await?;

        if request.date_end < request.date_start {
            return Err(ServiceError::validation(
                "date_end must not precede date_start",
            ));
        }
        if !(0.0..=1.0).contains(&request.ctr) {
            return Err(ServiceError::validation("CTR must be between 0.0 and 1.0"));
        }

        let metric = MetricActiveModel {
            id: Set(Uuid::new_v4()),
            metric_type: Set(request.metric_type.as_str().to_string()),
            keys: Set(request.keys),
            clicks: Set(request.clicks),
            impressions: Set(request.impressions),
            ctr: Set(request.ctr),
            position: Set(request.position),
            date_start: Set(request.date_start),
            date_end: Set(request.date_end),
            gsc_id: Set(gsc_id),
            ..Default::default()
        };

        metric
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_metrics(
        &self,
        gsc_id: Uuid,
        filter: &GscMetricFilter,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<GscMetric>, u64)> {
        self.get_property(gsc_id).await?;

        let mut query = MetricEntity::find().filter(MetricColumn::GscId.eq(gsc_id));

        if let Some(metric_type) = &filter.metric_type {
            let metric_type: MetricType = metric_type.parse()?;
            query = query.filter(MetricColumn::MetricType.eq(metric_type.as_str()));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(MetricColumn::DateStart.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(MetricColumn::DateEnd.lte(date_to));
        }

        let paginator = query
            .order_by_asc(MetricColumn::DateStart)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let metrics = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((metrics, total))
    }

    pub async fn get_metric(&self, metric_id: Uuid) -> ServiceResult<GscMetric> {
        MetricEntity::find_by_id(metric_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("GSC metric"))
    }

    pub async fn delete_metric(&self, metric_id: Uuid) -> ServiceResult<()> {
        let metric = self.get_metric(metric_id).await?;
        MetricEntity::delete_by_id(metric.id)
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
    fn test_metric_type_round_trip() {
        for (text, variant) in [
            ("searchappearance", MetricType::SearchAppearance),
            ("query", MetricType::Query),
            ("page", MetricType::Page),
            ("device", MetricType::Device),
            ("country", MetricType::Country),
        ] {
            assert_eq!(text.parse::<MetricType>().unwrap(), variant);
            assert_eq!(variant.as_str(), text);
        }
    }

    #[test]
    fn test_unknown_metric_type_rejected() {
        assert!("clicks".parse::<MetricType>().is_err());
        assert!("".parse::<MetricType>().is_err());
    }
}
