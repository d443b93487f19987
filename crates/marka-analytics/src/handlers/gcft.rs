use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use marka_auth::permission_guard;
use marka_auth::permissions::{AclPermission, ROLE_ADMIN, ROLE_MANAGER};
use marka_auth::{AccessTarget, ExtractRequestMetadata, RequireAuth};
use marka_core::problemdetails::Problem;
use marka_core::{audit::AuditContext, PageParams, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::audit::{
    GcftCreatedAudit, GcftDeletedAudit, GcftSnapCreatedAudit, GcftSnapDeletedAudit,
    GcftSnapUpdatedAudit, GcftUpdatedAudit,
};
use crate::gcft_service::{
    CreateGcftRequest, CreateGcftSnapRequest, GcftResponse, GcftSnapResponse, UpdateGcftRequest,
    UpdateGcftSnapRequest,
};
use crate::handlers::AnalyticsState;
use marka_auth::audit_or_warn;

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct ListGcftsQuery {
    /// Restrict results to tours of this client
    pub client_id: Option<Uuid>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/gcft/tours",
    request_body = CreateGcftRequest,
    responses(
        (status = 201, description = "Flythrough tour created successfully", body = GcftResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn create_gcft(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Json(request): Json<CreateGcftRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let tour = state.gcft_service.create_tour(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gcft_id: tour.id,
            group_name: tour.group_name.clone(),
            client_id: tour.client_id,
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(GcftResponse::from(tour))))
}

#[utoipa::path(
    get,
    path = "/gcft/tours",
    params(ListGcftsQuery),
    responses(
        (status = 200, description = "Flythrough tours retrieved successfully", body = Paginated<GcftResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn list_gcfts(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Query(query): Query<ListGcftsQuery>,
) -> Result<impl IntoResponse, Problem> {
    match query.client_id {
        Some(client_id) => {
            state
                .access_control
                .verify_user_can_access(&auth, AclPermission::List, AccessTarget::Client(client_id))
                .await?;
        }
        None => {
            permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);
        }
    }

    let (page, size) = PageParams {
        page: query.page,
        size: query.size,
    }
    .normalize();

    let (tours, total) = state
        .gcft_service
        .list_tours(page, size, query.client_id)
        .await?;

    let results = tours.into_iter().map(GcftResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/gcft/tours/{id}",
    params(("id" = Uuid, Path, description = "Flythrough tour ID")),
    responses(
        (status = 200, description = "Flythrough tour retrieved successfully", body = GcftResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn get_gcft(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let tour = state.gcft_service.get_tour(tour_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(tour.client_id),
        )
        .await?;

    Ok(Json(GcftResponse::from(tour)))
}

#[utoipa::path(
    patch,
    path = "/gcft/tours/{id}",
    params(("id" = Uuid, Path, description = "Flythrough tour ID")),
    request_body = UpdateGcftRequest,
    responses(
        (status = 200, description = "Flythrough tour updated successfully", body = GcftResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn update_gcft(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(tour_id): Path<Uuid>,
    Json(request): Json<UpdateGcftRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let tour = state.gcft_service.update_tour(tour_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gcft_id: tour.id,
            group_name: tour.group_name.clone(),
        },
    )
    .await;

    Ok(Json(GcftResponse::from(tour)))
}

#[utoipa::path(
    delete,
    path = "/gcft/tours/{id}",
    params(("id" = Uuid, Path, description = "Flythrough tour ID")),
    responses(
        (status = 204, description = "Flythrough tour deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn delete_gcft(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(tour_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let tour = state.gcft_service.get_tour(tour_id).await?;
    state.gcft_service.delete_tour(tour_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gcft_id: tour.id,
            group_name: tour.group_name,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/gcft/tours/{gcft_id}/snaps",
    params(("gcft_id" = Uuid, Path, description = "Flythrough tour ID")),
    request_body = CreateGcftSnapRequest,
    responses(
        (status = 201, description = "Snap created successfully", body = GcftSnapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Flythrough tour not found"),
        (status = 409, description = "Snap with this slug already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn create_gcft_snap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(gcft_id): Path<Uuid>,
    Json(request): Json<CreateGcftSnapRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let snap = state.gcft_service.create_snap(gcft_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftSnapCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            snap_id: snap.id,
            gcft_id: snap.gcft_id,
            snap_name: snap.snap_name.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(GcftSnapResponse::from(snap))))
}

#[utoipa::path(
    get,
    path = "/gcft/tours/{gcft_id}/snaps",
    params(
        ("gcft_id" = Uuid, Path, description = "Flythrough tour ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Snaps retrieved successfully", body = Paginated<GcftSnapResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Flythrough tour not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn list_gcft_snaps(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(gcft_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    let tour = state.gcft_service.get_tour(gcft_id).await?;
    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::List,
            AccessTarget::Client(tour.client_id),
        )
        .await?;

    let (page, size) = params.normalize();
    let (snaps, total) = state.gcft_service.list_snaps(gcft_id, page, size).await?;

    let results = snaps.into_iter().map(GcftSnapResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/gcft/snaps/{id}",
    params(("id" = Uuid, Path, description = "Snap ID")),
    responses(
        (status = 200, description = "Snap retrieved successfully", body = GcftSnapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn get_gcft_snap(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(snap_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let snap = state.gcft_service.get_snap(snap_id).await?;
    let tour = state.gcft_service.get_tour(snap.gcft_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(tour.client_id),
        )
        .await?;

    Ok(Json(GcftSnapResponse::from(snap)))
}

#[utoipa::path(
    patch,
    path = "/gcft/snaps/{id}",
    params(("id" = Uuid, Path, description = "Snap ID")),
    request_body = UpdateGcftSnapRequest,
    responses(
        (status = 200, description = "Snap updated successfully", body = GcftSnapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Snap with this slug already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn update_gcft_snap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(snap_id): Path<Uuid>,
    Json(request): Json<UpdateGcftSnapRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let snap = state.gcft_service.update_snap(snap_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftSnapUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            snap_id: snap.id,
            snap_name: snap.snap_name.clone(),
        },
    )
    .await;

    Ok(Json(GcftSnapResponse::from(snap)))
}

#[utoipa::path(
    delete,
    path = "/gcft/snaps/{id}",
    params(("id" = Uuid, Path, description = "Snap ID")),
    responses(
        (status = 204, description = "Snap deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GCFT",
    security(("bearer_auth" = []))
)]
pub async fn delete_gcft_snap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(snap_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let snap = state.gcft_service.get_snap(snap_id).await?;
    state.gcft_service.delete_snap(snap_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GcftSnapDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            snap_id: snap.id,
            gcft_id: snap.gcft_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_gcft,
        list_gcfts,
        get_gcft,
        update_gcft,
        delete_gcft,
        create_gcft_snap,
        list_gcft_snaps,
        get_gcft_snap,
        update_gcft_snap,
        delete_gcft_snap,
    ),
    components(schemas(
        CreateGcftRequest,
        UpdateGcftRequest,
        GcftResponse,
        CreateGcftSnapRequest,
        UpdateGcftSnapRequest,
        GcftSnapResponse,
    )),
    tags(
        (name = "GCFT", description = "Guided content flythrough tour and snap endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct GcftApiDoc;
