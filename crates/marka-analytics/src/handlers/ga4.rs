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
    Ga4PropertyCreatedAudit, Ga4PropertyDeletedAudit, Ga4PropertyUpdatedAudit,
    Ga4StreamCreatedAudit, Ga4StreamDeletedAudit, Ga4StreamUpdatedAudit,
};
use crate::ga4_service::{
    CreateGa4PropertyRequest, CreateGa4StreamRequest, Ga4PropertyResponse, Ga4StreamResponse,
    UpdateGa4PropertyRequest, UpdateGa4StreamRequest,
};
use crate::handlers::AnalyticsState;
use marka_auth::audit_or_warn;

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct ListGa4PropertiesQuery {
    /// Restrict results to properties of this client
    pub client_id: Option<Uuid>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/ga4/properties",
    request_body = CreateGa4PropertyRequest,
    responses(
        (status = 201, description = "GA4 property created successfully", body = Ga4PropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client or website not found"),
        (status = 409, description = "GA4 property with this title or measurement ID already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn create_ga4_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Json(request): Json<CreateGa4PropertyRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state.ga4_service.create_property(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4PropertyCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            ga4_id: property.id,
            title: property.title.clone(),
            measurement_id: property.measurement_id.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(Ga4PropertyResponse::from(property))))
}

#[utoipa::path(
    get,
    path = "/ga4/properties",
    params(ListGa4PropertiesQuery),
    responses(
        (status = 200, description = "GA4 properties retrieved successfully", body = Paginated<Ga4PropertyResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn list_ga4_properties(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Query(query): Query<ListGa4PropertiesQuery>,
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

    let (properties, total) = state
        .ga4_service
        .list_properties(page, size, query.client_id)
        .await?;

    let results = properties
        .into_iter()
        .map(Ga4PropertyResponse::from)
        .collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/ga4/properties/{id}",
    params(("id" = Uuid, Path, description = "GA4 property ID")),
    responses(
        (status = 200, description = "GA4 property retrieved successfully", body = Ga4PropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn get_ga4_property(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let property = state.ga4_service.get_property(property_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    Ok(Json(Ga4PropertyResponse::from(property)))
}

#[utoipa::path(
    patch,
    path = "/ga4/properties/{id}",
    params(("id" = Uuid, Path, description = "GA4 property ID")),
    request_body = UpdateGa4PropertyRequest,
    responses(
        (status = 200, description = "GA4 property updated successfully", body = Ga4PropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "GA4 property with this title or measurement ID already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn update_ga4_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
    Json(request): Json<UpdateGa4PropertyRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state
        .ga4_service
        .update_property(property_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4PropertyUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            ga4_id: property.id,
            title: property.title.clone(),
        },
    )
    .await;

    Ok(Json(Ga4PropertyResponse::from(property)))
}

#[utoipa::path(
    delete,
    path = "/ga4/properties/{id}",
    params(("id" = Uuid, Path, description = "GA4 property ID")),
    responses(
        (status = 204, description = "GA4 property deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn delete_ga4_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state.ga4_service.get_property(property_id).await?;
    state.ga4_service.delete_property(property_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4PropertyDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            ga4_id: property.id,
            title: property.title,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/ga4/properties/{ga4_id}/streams",
    params(("ga4_id" = Uuid, Path, description = "GA4 property ID")),
    request_body = CreateGa4StreamRequest,
    responses(
        (status = 201, description = "GA4 stream created successfully", body = Ga4StreamResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "GA4 property not found"),
        (status = 409, description = "GA4 stream with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn create_ga4_stream(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(ga4_id): Path<Uuid>,
    Json(request): Json<CreateGa4StreamRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let stream = state.ga4_service.create_stream(ga4_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4StreamCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            stream_id: stream.id,
            ga4_id: stream.ga4_id,
            title: stream.title.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(Ga4StreamResponse::from(stream))))
}

#[utoipa::path(
    get,
    path = "/ga4/properties/{ga4_id}/streams",
    params(
        ("ga4_id" = Uuid, Path, description = "GA4 property ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "GA4 streams retrieved successfully", body = Paginated<Ga4StreamResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "GA4 property not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn list_ga4_streams(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(ga4_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    let property = state.ga4_service.get_property(ga4_id).await?;
    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::List,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    let (page, size) = params.normalize();
    let (streams, total) = state.ga4_service.list_streams(ga4_id, page, size).await?;

    let results = streams.into_iter().map(Ga4StreamResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/ga4/streams/{id}",
    params(("id" = Uuid, Path, description = "GA4 stream ID")),
    responses(
        (status = 200, description = "GA4 stream retrieved successfully", body = Ga4StreamResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn get_ga4_stream(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(stream_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let stream = state.ga4_service.get_stream(stream_id).await?;
    let property = state.ga4_service.get_property(stream.ga4_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    Ok(Json(Ga4StreamResponse::from(stream)))
}

#[utoipa::path(
    patch,
    path = "/ga4/streams/{id}",
    params(("id" = Uuid, Path, description = "GA4 stream ID")),
    request_body = UpdateGa4StreamRequest,
    responses(
        (status = 200, description = "GA4 stream updated successfully", body = Ga4StreamResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "GA4 stream with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn update_ga4_stream(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(stream_id): Path<Uuid>,
    Json(request): Json<UpdateGa4StreamRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let stream = state.ga4_service.update_stream(stream_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4StreamUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            stream_id: stream.id,
            title: stream.title.clone(),
        },
    )
    .await;

    Ok(Json(Ga4StreamResponse::from(stream)))
}

#[utoipa::path(
    delete,
    path = "/ga4/streams/{id}",
    params(("id" = Uuid, Path, description = "GA4 stream ID")),
    responses(
        (status = 204, description = "GA4 stream deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GA4",
    security(("bearer_auth" = []))
)]
pub async fn delete_ga4_stream(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(stream_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let stream = state.ga4_service.get_stream(stream_id).await?;
    state.ga4_service.delete_stream(stream_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &Ga4StreamDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            stream_id: stream.id,
            title: stream.title,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_ga4_property,
        list_ga4_properties,
        get_ga4_property,
        update_ga4_property,
        delete_ga4_property,
        create_ga4_stream,
        list_ga4_streams,
        get_ga4_stream,
        update_ga4_stream,
        delete_ga4_stream,
    ),
    components(schemas(
        CreateGa4PropertyRequest,
        UpdateGa4PropertyRequest,
        Ga4PropertyResponse,
        CreateGa4StreamRequest,
        UpdateGa4StreamRequest,
        Ga4StreamResponse,
    )),
    tags(
        (name = "GA4", description = "Google Analytics 4 property and stream endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct Ga4ApiDoc;
