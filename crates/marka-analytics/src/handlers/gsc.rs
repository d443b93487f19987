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
    GscMetricCreatedAudit, GscMetricDeletedAudit, GscPropertyCreatedAudit,
    GscPropertyDeletedAudit, GscPropertyUpdatedAudit,
};
use crate::gsc_service::{
    CreateGscMetricRequest, CreateGscPropertyRequest, GscMetricFilter, GscMetricResponse,
    GscPropertyResponse, UpdateGscPropertyRequest,
};
use crate::handlers::AnalyticsState;
use marka_auth::audit_or_warn;

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct ListGscPropertiesQuery {
    /// Restrict results to properties of this client
    pub client_id: Option<Uuid>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/gsc/properties",
    request_body = CreateGscPropertyRequest,
    responses(
        (status = 201, description = "GSC property created successfully", body = GscPropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client or website not found"),
        (status = 409, description = "GSC property with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn create_gsc_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Json(request): Json<CreateGscPropertyRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state.gsc_service.create_property(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GscPropertyCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gsc_id: property.id,
            title: property.title.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(GscPropertyResponse::from(property))))
}

#[utoipa::path(
    get,
    path = "/gsc/properties",
    params(ListGscPropertiesQuery),
    responses(
        (status = 200, description = "GSC properties retrieved successfully", body = Paginated<GscPropertyResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn list_gsc_properties(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Query(query): Query<ListGscPropertiesQuery>,
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
        .gsc_service
        .list_properties(page, size, query.client_id)
        .await?;

    let results = properties
        .into_iter()
        .map(GscPropertyResponse::from)
        .collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/gsc/properties/{id}",
    params(("id" = Uuid, Path, description = "GSC property ID")),
    responses(
        (status = 200, description = "GSC property retrieved successfully", body = GscPropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn get_gsc_property(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let property = state.gsc_service.get_property(property_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    Ok(Json(GscPropertyResponse::from(property)))
}

#[utoipa::path(
    patch,
    path = "/gsc/properties/{id}",
    params(("id" = Uuid, Path, description = "GSC property ID")),
    request_body = UpdateGscPropertyRequest,
    responses(
        (status = 200, description = "GSC property updated successfully", body = GscPropertyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "GSC property with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn update_gsc_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
    Json(request): Json<UpdateGscPropertyRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state
        .gsc_service
        .update_property(property_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GscPropertyUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gsc_id: property.id,
            title: property.title.clone(),
        },
    )
    .await;

    Ok(Json(GscPropertyResponse::from(property)))
}

#[utoipa::path(
    delete,
    path = "/gsc/properties/{id}",
    params(("id" = Uuid, Path, description = "GSC property ID")),
    responses(
        (status = 204, description = "GSC property deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn delete_gsc_property(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let property = state.gsc_service.get_property(property_id).await?;
    state.gsc_service.delete_property(property_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GscPropertyDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            gsc_id: property.id,
            title: property.title,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/gsc/properties/{gsc_id}/metrics",
    params(("gsc_id" = Uuid, Path, description = "GSC property ID")),
    request_body = CreateGscMetricRequest,
    responses(
        (status = 201, description = "GSC metric created successfully", body = GscMetricResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "GSC property not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn create_gsc_metric(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(gsc_id): Path<Uuid>,
    Json(request): Json<CreateGscMetricRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let metric = state.gsc_service.create_metric(gsc_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GscMetricCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            metric_id: metric.id,
            gsc_id: metric.gsc_id,
            metric_type: metric.metric_type.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(GscMetricResponse::from(metric))))
}

#[utoipa::path(
    get,
    path = "/gsc/properties/{gsc_id}/metrics",
    params(
        ("gsc_id" = Uuid, Path, description = "GSC property ID"),
        GscMetricFilter
    ),
    responses(
        (status = 200, description = "GSC metrics retrieved successfully", body = Paginated<GscMetricResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "GSC property not found"),
        (status = 405, description = "Insufficient permissions"),
        (status = 422, description = "Unknown metric type")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn list_gsc_metrics(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(gsc_id): Path<Uuid>,
    Query(filter): Query<GscMetricFilter>,
) -> Result<impl IntoResponse, Problem> {
    let property = state.gsc_service.get_property(gsc_id).await?;
    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::List,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    let (page, size) = PageParams {
        page: filter.page,
        size: filter.size,
    }
    .normalize();

    let (metrics, total) = state
        .gsc_service
        .list_metrics(gsc_id, &filter, page, size)
        .await?;

    let results = metrics.into_iter().map(GscMetricResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/gsc/metrics/{id}",
    params(("id" = Uuid, Path, description = "GSC metric ID")),
    responses(
        (status = 200, description = "GSC metric retrieved successfully", body = GscMetricResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn get_gsc_metric(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AnalyticsState>>,
    Path(metric_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let metric = state.gsc_service.get_metric(metric_id).await?;
    let property = state.gsc_service.get_property(metric.gsc_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Client(property.client_id),
        )
        .await?;

    Ok(Json(GscMetricResponse::from(metric)))
}

#[utoipa::path(
    delete,
    path = "/gsc/metrics/{id}",
    params(("id" = Uuid, Path, description = "GSC metric ID")),
    responses(
        (status = 204, description = "GSC metric deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "GSC",
    security(("bearer_auth" = []))
)]
pub async fn delete_gsc_metric(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AnalyticsState>>,
    Path(metric_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let metric = state.gsc_service.get_metric(metric_id).await?;
    state.gsc_service.delete_metric(metric_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &GscMetricDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            metric_id: metric.id,
            gsc_id: metric.gsc_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_gsc_property,
        list_gsc_properties,
        get_gsc_property,
        update_gsc_property,
        delete_gsc_property,
        create_gsc_metric,
        list_gsc_metrics,
        get_gsc_metric,
        delete_gsc_metric,
    ),
    components(schemas(
        CreateGscPropertyRequest,
        UpdateGscPropertyRequest,
        GscPropertyResponse,
        CreateGscMetricRequest,
        GscMetricResponse,
        crate::gsc_service::MetricType,
    )),
    tags(
        (name = "GSC", description = "Google Search Console property and metric endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct GscApiDoc;
