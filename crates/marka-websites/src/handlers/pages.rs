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

use crate::audit::{PageCreatedAudit, PageDeletedAudit, PageUpdatedAudit};
use crate::handlers::WebsiteState;
use crate::page_service::{CreatePageRequest, PageResponse, UpdatePageRequest};
use marka_auth::audit_or_warn;

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct ListPagesQuery {
    /// Restrict results to pages belonging to this sitemap
    pub sitemap_id: Option<Uuid>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/websites/{website_id}/pages",
    params(("website_id" = Uuid, Path, description = "Website ID")),
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created successfully", body = PageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Website not found"),
        (status = 409, description = "Page with this URL already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Website Pages",
    security(("bearer_auth" = []))
)]
pub async fn create_page(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
    Json(request): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let page = state.page_service.create_page(website_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &PageCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            page_id: page.id,
            website_id: page.website_id,
            url: page.url.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(PageResponse::from(page))))
}

#[utoipa::path(
    get,
    path = "/websites/{website_id}/pages",
    params(
        ("website_id" = Uuid, Path, description = "Website ID"),
        ListPagesQuery
    ),
    responses(
        (status = 200, description = "Pages retrieved successfully", body = Paginated<PageResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Website not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Website Pages",
    security(("bearer_auth" = []))
)]
pub async fn list_pages(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
    Query(query): Query<ListPagesQuery>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::List, AccessTarget::Website(website_id))
        .await?;

    let (page, size) = PageParams {
        page: query.page,
        size: query.size,
    }
    .normalize();

    let (pages, total) = state
        .page_service
        .list_pages(website_id, query.sitemap_id, page, size)
        .await?;

    let results = pages.into_iter().map(PageResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    responses(
        (status = 200, description = "Page retrieved successfully", body = PageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Website Pages",
    security(("bearer_auth" = []))
)]
pub async fn get_page(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Path(page_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let page = state.page_service.get_page(page_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Website(page.website_id),
        )
        .await?;

    Ok(Json(PageResponse::from(page)))
}

#[utoipa::path(
    patch,
    path = "/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Page updated successfully", body = PageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Page with this URL already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Website Pages",
    security(("bearer_auth" = []))
)]
pub async fn update_page(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(page_id): Path<Uuid>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let page = state.page_service.update_page(page_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &PageUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            page_id: page.id,
            website_id: page.website_id,
        },
    )
    .await;

    Ok(Json(PageResponse::from(page)))
}

#[utoipa::path(
    delete,
    path = "/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Website Pages",
    security(("bearer_auth" = []))
)]
pub async fn delete_page(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(page_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let page = state.page_service.get_page(page_id).await?;
    state.page_service.delete_page(page_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &PageDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            page_id: page.id,
            website_id: page.website_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(create_page, list_pages, get_page, update_page, delete_page),
    components(schemas(CreatePageRequest, UpdatePageRequest, PageResponse)),
    tags(
        (name = "Website Pages", description = "Website page management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct PageApiDoc;
