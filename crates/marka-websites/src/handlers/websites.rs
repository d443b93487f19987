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

use crate::audit::{WebsiteCreatedAudit, WebsiteDeletedAudit, WebsiteUpdatedAudit};
use crate::handlers::WebsiteState;
use crate::website_service::{CreateWebsiteRequest, UpdateWebsiteRequest, WebsiteResponse};
use marka_auth::audit_or_warn;

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct ListWebsitesQuery {
    /// Restrict results to websites owned by this client
    pub client_id: Option<Uuid>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/websites",
    request_body = CreateWebsiteRequest,
    responses(
        (status = 201, description = "Website created successfully", body = WebsiteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Website with this domain already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Websites",
    security(("bearer_auth" = []))
)]
pub async fn create_website(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Json(request): Json<CreateWebsiteRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let website = state.website_service.create_website(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &WebsiteCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            website_id: website.id,
            domain: website.domain.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(WebsiteResponse::from(website))))
}

#[utoipa::path(
    get,
    path = "/websites",
    params(ListWebsitesQuery),
    responses(
        (status = 200, description = "Websites retrieved successfully", body = Paginated<WebsiteResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Websites",
    security(("bearer_auth" = []))
)]
pub async fn list_websites(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Query(query): Query<ListWebsitesQuery>,
) -> Result<impl IntoResponse, Problem> {
    let (page, size) = PageParams {
        page: query.page,
        size: query.size,
    }
    .normalize();

    // Listing across all clients requires an elevated role; a client-scoped
    // listing only requires membership of that client.
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

    let (websites, total) = state
        .website_service
        .list_websites(page, size, query.client_id)
        .await?;

    let results = websites.into_iter().map(WebsiteResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/websites/{id}",
    params(("id" = Uuid, Path, description = "Website ID")),
    responses(
        (status = 200, description = "Website retrieved successfully", body = WebsiteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Websites",
    security(("bearer_auth" = []))
)]
pub async fn get_website(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Read, AccessTarget::Website(website_id))
        .await?;

    let website = state.website_service.get_website(website_id).await?;
    Ok(Json(WebsiteResponse::from(website)))
}

#[utoipa::path(
    patch,
    path = "/websites/{id}",
    params(("id" = Uuid, Path, description = "Website ID")),
    request_body = UpdateWebsiteRequest,
    responses(
        (status = 200, description = "Website updated successfully", body = WebsiteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Website with this domain already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Websites",
    security(("bearer_auth" = []))
)]
pub async fn update_website(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
    Json(request): Json<UpdateWebsiteRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let website = state
        .website_service
        .update_website(website_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &WebsiteUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            website_id: website.id,
            domain: website.domain.clone(),
        },
    )
    .await;

    Ok(Json(WebsiteResponse::from(website)))
}

#[utoipa::path(
    delete,
    path = "/websites/{id}",
    params(("id" = Uuid, Path, description = "Website ID")),
    responses(
        (status = 204, description = "Website deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Websites",
    security(("bearer_auth" = []))
)]
pub async fn delete_website(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let website = state.website_service.get_website(website_id).await?;
    state.website_service.delete_website(website_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &WebsiteDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            website_id: website.id,
            domain: website.domain,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_website,
        list_websites,
        get_website,
        update_website,
        delete_website,
    ),
    components(schemas(CreateWebsiteRequest, UpdateWebsiteRequest, WebsiteResponse)),
    tags(
        (name = "Websites", description = "Website management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct WebsiteApiDoc;
