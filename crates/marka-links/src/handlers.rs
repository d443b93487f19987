use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use marka_auth::permission_guard;
use marka_auth::permissions::{AclPermission, ROLE_ADMIN, ROLE_MANAGER};
use marka_auth::{AccessControl, AccessTarget, ExtractRequestMetadata, RequireAuth};
use marka_core::problemdetails::Problem;
use marka_core::{audit::AuditContext, AuditLogger, PageParams, Paginated};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::audit::{
    TrackingLinkCreatedAudit, TrackingLinkDeletedAudit, TrackingLinkUpdatedAudit,
};
use crate::service::{
    CreateTrackingLinkRequest, TrackingLinkFilter, TrackingLinkResponse, TrackingLinkService,
    UpdateTrackingLinkRequest,
};
use marka_auth::audit_or_warn;

pub struct TrackingLinkState {
    pub link_service: Arc<TrackingLinkService>,
    pub access_control: Arc<AccessControl>,
    pub audit_service: Arc<dyn AuditLogger>,
}

#[utoipa::path(
    post,
    path = "/tracking-links",
    request_body = CreateTrackingLinkRequest,
    responses(
        (status = 201, description = "Tracking link created successfully", body = TrackingLinkResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Client not found"),
        (status = 405, description = "Insufficient permissions"),
        (status = 409, description = "Tracking link for this URL already exists"),
        (status = 422, description = "Invalid URL")
    ),
    tag = "Tracking Links",
    security(("bearer_auth" = []))
)]
pub async fn create_tracking_link(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<TrackingLinkState>>,
    Json(request): Json<CreateTrackingLinkRequest>,
) -> Result<impl IntoResponse, Problem> {
    // Members of the owning client may create links for it
    if let Some(client_id) = request.client_id {
        state
            .access_control
            .verify_user_can_access(&auth, AclPermission::Create, AccessTarget::Client(client_id))
            .await?;
    } else {
        permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);
    }

    let link = state.link_service.create_link(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &TrackingLinkCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            link_id: link.id,
            url: link.url.clone(),
            client_id: link.client_id,
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(TrackingLinkResponse::from(link))))
}

#[utoipa::path(
    get,
    path = "/tracking-links",
    params(TrackingLinkFilter),
    responses(
        (status = 200, description = "Tracking links retrieved successfully", body = Paginated<TrackingLinkResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Tracking Links",
    security(("bearer_auth" = []))
)]
pub async fn list_tracking_links(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<TrackingLinkState>>,
    Query(filter): Query<TrackingLinkFilter>,
) -> Result<impl IntoResponse, Problem> {
    let (page, size) = PageParams {
        page: filter.page,
        size: filter.size,
    }
    .normalize();

    // Non-admins only see links belonging to their clients
    let allowed_clients = if auth.is_admin() || auth.has_privilege(ROLE_MANAGER) {
        None
    } else {
        Some(state.link_service.clients_for_user(auth.user_id()).await?)
    };

    let (links, total) = state
        .link_service
        .list_links(&filter, allowed_clients.as_deref(), page, size)
        .await?;

    let results = links.into_iter().map(TrackingLinkResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/tracking-links/{id}",
    params(("id" = Uuid, Path, description = "Tracking link ID")),
    responses(
        (status = 200, description = "Tracking link retrieved successfully", body = TrackingLinkResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Tracking Links",
    security(("bearer_auth" = []))
)]
pub async fn get_tracking_link(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<TrackingLinkState>>,
    Path(link_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Read, AccessTarget::TrackingLink(link_id))
        .await?;

    let link = state.link_service.get_link(link_id).await?;
    Ok(Json(TrackingLinkResponse::from(link)))
}

#[utoipa::path(
    patch,
    path = "/tracking-links/{id}",
    params(("id" = Uuid, Path, description = "Tracking link ID")),
    request_body = UpdateTrackingLinkRequest,
    responses(
        (status = 200, description = "Tracking link updated successfully", body = TrackingLinkResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions"),
        (status = 409, description = "Tracking link for this URL already exists"),
        (status = 422, description = "Invalid URL")
    ),
    tag = "Tracking Links",
    security(("bearer_auth" = []))
)]
pub async fn update_tracking_link(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<TrackingLinkState>>,
    Path(link_id): Path<Uuid>,
    Json(request): Json<UpdateTrackingLinkRequest>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Update, AccessTarget::TrackingLink(link_id))
        .await?;

    let link = state.link_service.update_link(link_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &TrackingLinkUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            link_id: link.id,
            url: link.url.clone(),
        },
    )
    .await;

    Ok(Json(TrackingLinkResponse::from(link)))
}

#[utoipa::path(
    delete,
    path = "/tracking-links/{id}",
    params(("id" = Uuid, Path, description = "Tracking link ID")),
    responses(
        (status = 204, description = "Tracking link deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Tracking Links",
    security(("bearer_auth" = []))
)]
pub async fn delete_tracking_link(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<TrackingLinkState>>,
    Path(link_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Delete, AccessTarget::TrackingLink(link_id))
        .await?;

    let link = state.link_service.get_link(link_id).await?;
    state.link_service.delete_link(link_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &TrackingLinkDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            link_id: link.id,
            url: link.url,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_tracking_link,
        list_tracking_links,
        get_tracking_link,
        update_tracking_link,
        delete_tracking_link,
    ),
    components(schemas(
        CreateTrackingLinkRequest,
        UpdateTrackingLinkRequest,
        TrackingLinkResponse,
    )),
    tags(
        (name = "Tracking Links", description = "UTM tracking link management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct TrackingLinkApiDoc;
