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
use utoipa::OpenApi;
use uuid::Uuid;

use crate::audit::{SitemapCreatedAudit, SitemapDeletedAudit, SitemapUpdatedAudit};
use crate::handlers::WebsiteState;
use crate::sitemap_service::{CreateSitemapRequest, SitemapResponse, UpdateSitemapRequest};
use marka_auth::audit_or_warn;

#[utoipa::path(
    post,
    path = "/websites/{website_id}/sitemaps",
    params(("website_id" = Uuid, Path, description = "Website ID")),
    request_body = CreateSitemapRequest,
    responses(
        (status = 201, description = "Sitemap created successfully", body = SitemapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Website not found"),
        (status = 409, description = "Sitemap with this URL already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Sitemaps",
    security(("bearer_auth" = []))
)]
pub async fn create_sitemap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
    Json(request): Json<CreateSitemapRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let sitemap = state
        .sitemap_service
        .create_sitemap(website_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &SitemapCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            sitemap_id: sitemap.id,
            website_id: sitemap.website_id,
            url: sitemap.url.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(SitemapResponse::from(sitemap))))
}

#[utoipa::path(
    get,
    path = "/websites/{website_id}/sitemaps",
    params(
        ("website_id" = Uuid, Path, description = "Website ID"),
        PageParams
    ),
    responses(
        (status = 200, description = "Sitemaps retrieved successfully", body = Paginated<SitemapResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Website not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Sitemaps",
    security(("bearer_auth" = []))
)]
pub async fn list_sitemaps(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Path(website_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::List, AccessTarget::Website(website_id))
        .await?;

    let (page, size) = params.normalize();
    let (sitemaps, total) = state
        .sitemap_service
        .list_sitemaps(website_id, page, size)
        .await?;

    let results = sitemaps.into_iter().map(SitemapResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/sitemaps/{id}",
    params(("id" = Uuid, Path, description = "Sitemap ID")),
    responses(
        (status = 200, description = "Sitemap retrieved successfully", body = SitemapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Sitemaps",
    security(("bearer_auth" = []))
)]
pub async fn get_sitemap(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<WebsiteState>>,
    Path(sitemap_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let sitemap = state.sitemap_service.get_sitemap(sitemap_id).await?;

    state
        .access_control
        .verify_user_can_access(
            &auth,
            AclPermission::Read,
            AccessTarget::Website(sitemap.website_id),
        )
        .await?;

    Ok(Json(SitemapResponse::from(sitemap)))
}

#[utoipa::path(
    patch,
    path = "/sitemaps/{id}",
    params(("id" = Uuid, Path, description = "Sitemap ID")),
    request_body = UpdateSitemapRequest,
    responses(
        (status = 200, description = "Sitemap updated successfully", body = SitemapResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Sitemap with this URL already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Sitemaps",
    security(("bearer_auth" = []))
)]
pub async fn update_sitemap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(sitemap_id): Path<Uuid>,
    Json(request): Json<UpdateSitemapRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let sitemap = state
        .sitemap_service
        .update_sitemap(sitemap_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &SitemapUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            sitemap_id: sitemap.id,
            website_id: sitemap.website_id,
        },
    )
    .await;

    Ok(Json(SitemapResponse::from(sitemap)))
}

#[utoipa::path(
    delete,
    path = "/sitemaps/{id}",
    params(("id" = Uuid, Path, description = "Sitemap ID")),
    responses(
        (status = 204, description = "Sitemap deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Sitemaps",
    security(("bearer_auth" = []))
)]
pub async fn delete_sitemap(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<WebsiteState>>,
    Path(sitemap_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let sitemap = state.sitemap_service.get_sitemap(sitemap_id).await?;
    state.sitemap_service.delete_sitemap(sitemap_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &SitemapDeletedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            sitemap_id: sitemap.id,
            website_id: sitemap.website_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_sitemap,
        list_sitemaps,
        get_sitemap,
        update_sitemap,
        delete_sitemap,
    ),
    components(schemas(CreateSitemapRequest, UpdateSitemapRequest, SitemapResponse)),
    tags(
        (name = "Sitemaps", description = "Sitemap management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct SitemapApiDoc;
