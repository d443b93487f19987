use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::ga4_properties::{
    ActiveModel as PropertyActiveModel, Column as PropertyColumn, Entity as PropertyEntity,
    Model as Ga4Property,
};
use marka_entities::ga4_streams::{
    ActiveModel as StreamActiveModel, Column as StreamColumn, Entity as StreamEntity,
    Model as Ga4Stream,
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

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGa4PropertyRequest {
    pub title: String,
    pub property_id: String,
    /// Measurement ID, e.g. "G-XXXXXXXXXX"
    pub measurement_id: String,
    pub client_id: Uuid,
    pub website_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGa4PropertyRequest {
    pub title: Option<String>,
    pub property_id: Option<String>,
    pub measurement_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ga4PropertyResponse {
    pub id: Uuid,
    pub title: String,
    pub property_id: String,
    pub measurement_id: String,
    pub client_id: Uuid,
    pub website_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Ga4Property> for Ga4PropertyResponse {
    fn from(property: Ga4Property) -> Self {
        Self {
            id: property.id,
            title: property.title,
            property_id: property.property_id,
            measurement_id: property.measurement_id,
            client_id: property.client_id,
            website_id: property.website_id,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGa4StreamRequest {
    pub title: String,
    pub stream_id: String,
    pub measurement_id: String,
    /// Defaults to the parent property's website
    pub website_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGa4StreamRequest {
    pub title: Option<String>,
    pub stream_id: Option<String>,
    pub measurement_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Ga4StreamResponse {
    pub id: Uuid,
    pub title: String,
    pub stream_id: String,
    pub measurement_id: String,
    pub ga4_id: Uuid,
    pub website_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Ga4Stream> for Ga4StreamResponse {
    fn from(stream: Ga4Stream) -> Self {
        Self {
            id: stream.id,
            title: stream.title,
            stream_id: stream.stream_id,
            measurement_id: stream.measurement_id,
            ga4_id: stream.ga4_id,
            website_id: stream.website_id,
            created_at: stream.created_at,
            updated_at: stream.updated_at,
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

pub struct Ga4Service {
    db: Arc<DatabaseConnection>,
}

impl Ga4Service {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_property(
        &self,
        request: CreateGa4PropertyRequest,
    ) -> ServiceResult<Ga4Property> {
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
            .filter(
                PropertyColumn::Title
                    .eq(&request.title)
                    .or(PropertyColumn::MeasurementId.eq(&request.measurement_id)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("GA4 property"));
        }

        let property = PropertyActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            property_id: Set(request.property_id),
            measurement_id: Set(request.measurement_id),
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
    ) -> ServiceResult<(Vec<Ga4Property>, u64)> {
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

    pub async fn get_property(&self, property_id: Uuid) -> ServiceResult<Ga4Property> {
        PropertyEntity::find_by_id(property_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("GA4 property"))
    }

    pub async fn update_property(
        &self,
        property_id: Uuid,
        request: UpdateGa4PropertyRequest,
    ) -> ServiceResult<Ga4Property> {
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
                    return Err(ServiceError::already_exists("GA4 property"));
                }
                active.title = Set(title);
            }
        }
        if let Some(measurement_id) = request.measurement_id {
            if measurement_id != property.measurement_id {
                let existing = PropertyEntity::find()
                    .filter(PropertyColumn::MeasurementId.eq(&measurement_id))
                    .filter(PropertyColumn::Id.ne(property_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;
                if existing.is_some() {
                    return Err(ServiceError::already_exists("GA4 property"));
                }
                active.measurement_id = Set(measurement_id);
            }
        }
        if let Some(property_ref) = request.property_id {
            active.property_id = Set(property_ref);
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

    pub async fn create_stream(
        &self,
        ga4_id: Uuid,
        request: CreateGa4StreamRequest,
    ) -> ServiceResult<Ga4Stream> {
        validate_title(&request.title)?;
        let property = self.get_property(ga4_id).await?;

        let website_id = match request.website_id {
            Some(website_id) => {
                websites::Entity::find_by_id(website_id)
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?
                    .ok_or_else(|| ServiceError::not_found("Website"))?;
                website_id
            }
            None => property.website_id,
        };

        let existing = StreamEntity::find()
            .filter(StreamColumn::Title.eq(&request.title))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("GA4 stream"));
        }

        let stream = StreamActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(request.title),
            stream_id: Set(request.stream_id),
            measurement_id: Set(request.measurement_id),
            ga4_id: Set(ga4_id),
            website_id: Set(website_id),
            ..Default::default()
        };

        stream
            .insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_streams(
        &self,
        ga4_id: Uuid,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<Ga4Stream>, u64)> {
        self.get_property(ga4_id).await?;

        let paginator = StreamEntity::find()
            .filter(StreamColumn::Ga4Id.eq(ga4_id))
            .order_by_asc(StreamColumn::Title)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let streams = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((streams, total))
    }

    pub async fn get_stream(&self, stream_id: Uuid) -> ServiceResult<Ga4Stream> {
        StreamEntity::find_by_id(stream_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("GA4 stream"))
    }

    pub async fn update_stream(
        &self,
        stream_id: Uuid,
        request: UpdateGa4StreamRequest,
    ) -> ServiceResult<Ga4Stream> {
        let stream = self.get_stream(stream_id).await?;
        let mut active: StreamActiveModel = stream.clone().into();

        if let Some(title) = request.title {
            if title != stream.title {
                validate_title(&title)?;
                let existing = StreamEntity::find()
                    .filter(StreamColumn::Title.eq(&title))
                    .filter(StreamColumn::Id.ne(stream_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;
                if existing.is_some() {
                    return Err(ServiceError::already_exists("GA4 stream"));
                }
                active.title = Set(title);
            }
        }
        if let Some(stream_ref) = request.stream_id {
            active.stream_id = Set(stream_ref);
        }
        if let Some(measurement_id) = request.measurement_id {
            active.measurement_id = Set(measurement_id);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_stream(&self, stream_id: Uuid) -> ServiceResult<()> {
        let stream = self.get_stream(stream_id).await?;
        StreamEntity::delete_by_id(stream.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}
