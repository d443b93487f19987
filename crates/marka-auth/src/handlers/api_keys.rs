use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use marka_core::problemdetails::Problem;
use marka_core::{PageParams, Paginated};
use utoipa::OpenApi;
use uuid::Uuid;

use super::audit_context;
use crate::apikey_service::{
    ApiKeyResponse, CreateApiKeyRequest, CreateApiKeyResponse, UpdateApiKeyRequest,
};
use crate::audit::{ApiKeyCreatedAudit, ApiKeyRevokedAudit, ApiKeyUpdatedAudit};
use crate::audit_logger::audit_or_warn;
use crate::extractors::{ExtractRequestMetadata, RequireAuth};
use crate::state::AuthState;

#[utoipa::path(
    post,
    path = "/api-keys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created successfully", body = CreateApiKeyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Conflict - API key name already exists"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "API Keys",
    security(("bearer_auth" = []))
)]
pub async fn create_api_key(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<impl IntoResponse, Problem> {
    let response = state
        .api_key_service
        .create_api_key(auth.user_id(), request)
        .await
        .map_err(|e| e.to_problem())?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ApiKeyCreatedAudit {
            context: audit_context(&auth, &metadata),
            key_id: response.id,
            key_name: response.name.clone(),
            role: response.role.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api-keys",
    params(PageParams),
    responses(
        (status = 200, description = "API keys retrieved successfully", body = Paginated<ApiKeyResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "API Keys",
    security(("bearer_auth" = []))
)]
pub async fn list_api_keys(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AuthState>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    let (page, size) = params.normalize();
    let (keys, total) = state
        .api_key_service
        .list_api_keys(auth.user_id(), page, size)
        .await
        .map_err(|e| e.to_problem())?;

    Ok(Json(Paginated::new(page, size, total, keys)))
}

#[utoipa::path(
    get,
    path = "/api-keys/{id}",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 200, description = "API key retrieved successfully", body = ApiKeyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "API Keys",
    security(("bearer_auth" = []))
)]
pub async fn get_api_key(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AuthState>>,
    Path(api_key_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let api_key = state
        .api_key_service
        .get_api_key(auth.user_id(), api_key_id)
        .await
        .map_err(|e| e.to_problem())?;

    Ok(Json(api_key))
}

#[utoipa::path(
    patch,
    path = "/api-keys/{id}",
    params(("id" = Uuid, Path, description = "API key ID")),
    request_body = UpdateApiKeyRequest,
    responses(
        (status = 200, description = "API key updated successfully", body = ApiKeyResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Conflict - API key name already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "API Keys",
    security(("bearer_auth" = []))
)]
pub async fn update_api_key(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(api_key_id): Path<Uuid>,
    Json(request): Json<UpdateApiKeyRequest>,
) -> Result<impl IntoResponse, Problem> {
    let api_key = state
        .api_key_service
        .update_api_key(auth.user_id(), api_key_id, request)
        .await
        .map_err(|e| e.to_problem())?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ApiKeyUpdatedAudit {
            context: audit_context(&auth, &metadata),
            key_id: api_key.id,
            key_name: api_key.name.clone(),
        },
    )
    .await;

    Ok(Json(api_key))
}

#[utoipa::path(
    delete,
    path = "/api-keys/{id}",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 204, description = "API key revoked successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "API Keys",
    security(("bearer_auth" = []))
)]
pub async fn delete_api_key(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(api_key_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    let api_key = state
        .api_key_service
        .get_api_key(auth.user_id(), api_key_id)
        .await
        .map_err(|e| e.to_problem())?;

    state
        .api_key_service
        .delete_api_key(auth.user_id(), api_key_id)
        .await
        .map_err(|e| e.to_problem())?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ApiKeyRevokedAudit {
            context: audit_context(&auth, &metadata),
            key_id: api_key.id,
            key_name: api_key.name,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_api_key,
        list_api_keys,
        get_api_key,
        update_api_key,
        delete_api_key,
    ),
    components(schemas(
        CreateApiKeyRequest,
        UpdateApiKeyRequest,
        ApiKeyResponse,
        CreateApiKeyResponse,
    )),
    tags(
        (name = "API Keys", description = "API key management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct ApiKeyApiDoc;
