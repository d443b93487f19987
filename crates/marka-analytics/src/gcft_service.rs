use std::sync::Arc;

use marka_core::{DbDateTime, ServiceError, ServiceResult};
use marka_entities::clients;
use marka_entities::gcft_snaps::{
    ActiveModel as SnapActiveModel, Column as SnapColumn, Entity as SnapEntity, Model as GcftSnap,
};
use marka_entities::gcfts::{
    ActiveModel as GcftActiveModel, Column as GcftColumn, Entity as GcftEntity, Model as Gcft,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const GROUP_NAME_MAX_LEN: usize = 255;
pub const SLUG_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGcftRequest {
    pub group_name: String,
    pub group_slug: String,
    pub client_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGcftRequest {
    pub group_name: Option<String>,
    pub group_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GcftResponse {
    pub id: Uuid,
    pub group_name: String,
    pub group_slug: String,
    pub client_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<Gcft> for GcftResponse {
    fn from(tour: Gcft) -> Self {
        Self {
            id: tour.id,
            group_name: tour.group_name,
            group_slug: tour.group_slug,
            client_id: tour.client_id,
            created_at: tour.created_at,
            updated_at: tour.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGcftSnapRequest {
    pub snap_name: String,
    /// Short slug embedded in shared snap URLs, unique across all tours
    pub snap_slug: String,
    /// Camera altitude in meters, defaults to ground level
    pub altitude: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGcftSnapRequest {
    pub snap_name: Option<String>,
    pub snap_slug: Option<String>,
    pub altitude: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GcftSnapResponse {
    pub id: Uuid,
    pub snap_name: String,
    pub snap_slug: String,
    pub altitude: i32,
    pub gcft_id: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DbDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DbDateTime,
}

impl From<GcftSnap> for GcftSnapResponse {
    fn from(snap: GcftSnap) -> Self {
        Self {
            id: snap.id,
            snap_name: snap.snap_name,
            snap_slug: snap.snap_slug,
            altitude: snap.altitude,
            gcft_id: snap.gcft_id,
            created_at: snap.created_at,
            updated_at: snap.updated_at,
        }
    }
}

fn validate_name(name: &str) -> ServiceResult<()> {
    if name.is_empty() || name.len() > GROUP_NAME_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Name must be between 1 and {} characters",
            GROUP_NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> ServiceResult<()> {
    if slug.is_empty() || slug.len() > SLUG_MAX_LEN {
        return Err(ServiceError::validation(format!(
            "Slug must be between 1 and {} characters",
            SLUG_MAX_LEN
        )));
    }
    Ok(())
}

pub struct GcftService {
    db: Arc<DatabaseConnection>,
}

impl GcftService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create_tour(&self, request: CreateGcftRequest) -> ServiceResult<Gcft> {
        validate_name(&request.group_name)?;
        validate_slug(&request.group_slug)?;

        clients::Entity::find_by_id(request.client_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Client"))?;

        let tour = GcftActiveModel {
            id: Set(Uuid::new_v4()),
            group_name: Set(request.group_name),
            group_slug: Set(request.group_slug),
            client_id: Set(request.client_id),
            ..Default::default()
        };

        tour.insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_tours(
        &self,
        page: u64,
        size: u64,
        client_id: Option<Uuid>,
    ) -> ServiceResult<(Vec<Gcft>, u64)> {
        let mut query = GcftEntity::find();
        if let Some(client_id) = client_id {
            query = query.filter(GcftColumn::ClientId.eq(client_id));
        }

        let paginator = query
            .order_by_asc(GcftColumn::GroupName)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let tours = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((tours, total))
    }

    pub async fn get_tour(&self, tour_id: Uuid) -> ServiceResult<Gcft> {
        GcftEntity::find_by_id(tour_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Flythrough tour"))
    }

    pub async fn update_tour(
        &self,
        tour_id: Uuid,
        request: UpdateGcftRequest,
    ) -> ServiceResult<Gcft> {
        let tour = self.get_tour(tour_id).await?;
        let mut active: GcftActiveModel = tour.into();

        if let Some(group_name) = request.group_name {
            validate_name(&group_name)?;
            active.group_name = Set(group_name);
        }
        if let Some(group_slug) = request.group_slug {
            validate_slug(&group_slug)?;
            active.group_slug = Set(group_slug);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_tour(&self, tour_id: Uuid) -> ServiceResult<()> {
        let tour = self.get_tour(tour_id).await?;
        GcftEntity::delete_by_id(tour.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn create_snap(
        &self,
        tour_id: Uuid,
        request: CreateGcftSnapRequest,
    ) -> ServiceResult<GcftSnap> {
        validate_name(&request.snap_name)?;
        validate_slug(&request.snap_slug)?;
        self.get_tour(tour_id).await?;

        let existing = SnapEntity::find()
            .filter(SnapColumn::SnapSlug.eq(&request.snap_slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(ServiceError::already_exists("Flythrough snap"));
        }

        let snap = SnapActiveModel {
            id: Set(Uuid::new_v4()),
            snap_name: Set(request.snap_name),
            snap_slug: Set(request.snap_slug),
            altitude: Set(request.altitude.unwrap_or(0)),
            gcft_id: Set(tour_id),
            ..Default::default()
        };

        snap.insert(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn list_snaps(
        &self,
        tour_id: Uuid,
        page: u64,
        size: u64,
    ) -> ServiceResult<(Vec<GcftSnap>, u64)> {
        self.get_tour(tour_id).await?;

        let paginator = SnapEntity::find()
            .filter(SnapColumn::GcftId.eq(tour_id))
            .order_by_asc(SnapColumn::SnapName)
            .paginate(self.db.as_ref(), size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let snaps = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok((snaps, total))
    }

    pub async fn get_snap(&self, snap_id: Uuid) -> ServiceResult<GcftSnap> {
        SnapEntity::find_by_id(snap_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::not_found("Flythrough snap"))
    }

    pub async fn update_snap(
        &self,
        snap_id: Uuid,
        request: UpdateGcftSnapRequest,
    ) -> ServiceResult<GcftSnap> {
        let snap = self.get_snap(snap_id).await?;
        let mut active: SnapActiveModel = snap.clone().into();

        if let Some(snap_name) = request.snap_name {
            validate_name(&snap_name)?;
            active.snap_name = Set(snap_name);
        }
        if let Some(snap_slug) = request.snap_slug {
            if snap_slug != snap.snap_slug {
                validate_slug(&snap_slug)?;
                let existing = SnapEntity::find()
                    .filter(SnapColumn::SnapSlug.eq(&snap_slug))
                    .filter(SnapColumn::Id.ne(snap_id))
                    .one(self.db.as_ref())
                    .await
                    .map_err(|e| ServiceError::Database(e.to_string()))?;
                if existing.is_some() {
                    return Err(ServiceError::already_exists("Flythrough snap"));
                }
                active.snap_slug = Set(snap_slug);
            }
        }
        if let Some(altitude) = request.altitude {
            active.altitude = Set(altitude);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn delete_snap(&self, snap_id: Uuid) -> ServiceResult<()> {
        let snap = self.get_snap(snap_id).await?;
        SnapEntity::delete_by_id(snap.id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        Ok(())
    }
}
