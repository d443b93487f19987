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
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::audit::{
    ClientCreatedAudit, ClientDeactivatedAudit, ClientDeletedAudit, ClientUpdatedAudit,
    ClientUserAssignedAudit, ClientUserRemovedAudit, ClientWebsiteAssignedAudit,
    ClientWebsiteRemovedAudit,
};
use crate::service::{ClientResponse, ClientService, CreateClientRequest, UpdateClientRequest};
use marka_auth::audit_or_warn;

pub struct ClientState {
    pub client_service: Arc<ClientService>,
    pub access_control: Arc<AccessControl>,
    pub audit_service: Arc<dyn AuditLogger>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignUserRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignWebsiteRequest {
    pub website_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, utoipa::IntoParams)]
pub struct DeleteClientQuery {
    /// Hard-delete the client instead of deactivating it (admin only)
    pub permanent: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientUserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientWebsiteResponse {
    pub id: Uuid,
    pub domain: String,
    pub is_secure: bool,
    pub is_active: bool,
}

#[utoipa::path(
    post,
    path = "/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created successfully", body = ClientResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Client with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let client = state.client_service.create_client(request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientCreatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id: client.id,
            title: client.title.clone(),
            slug: client.slug.clone(),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

#[utoipa::path(
    get,
    path = "/clients",
    params(PageParams),
    responses(
        (status = 200, description = "Clients retrieved successfully", body = Paginated<ClientResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<ClientState>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    let (page, size) = params.normalize();

    // Admins and managers see everything; other users only their clients
    let (clients, total) = if auth.is_admin() || auth.has_privilege(ROLE_MANAGER) {
        state.client_service.list_clients(page, size).await?
    } else {
        state
            .client_service
            .list_clients_for_user(auth.user_id(), page, size)
            .await?
    };

    let results = clients.into_iter().map(ClientResponse::from).collect();
    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client retrieved successfully", body = ClientResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn get_client(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Read, AccessTarget::Client(client_id))
        .await?;

    let client = state.client_service.get_client(client_id).await?;
    Ok(Json(ClientResponse::from(client)))
}

#[utoipa::path(
    patch,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated successfully", body = ClientResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Client with this title already exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let client = state
        .client_service
        .update_client(client_id, request)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientUpdatedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id: client.id,
            title: client.title.clone(),
        },
    )
    .await;

    Ok(Json(ClientResponse::from(client)))
}

#[utoipa::path(
    delete,
    path = "/clients/{id}",
    params(
        ("id" = Uuid, Path, description = "Client ID"),
        DeleteClientQuery
    ),
    responses(
        (status = 200, description = "Client deactivated", body = ClientResponse),
        (status = 204, description = "Client permanently deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn delete_client(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<DeleteClientQuery>,
) -> Result<axum::response::Response, Problem> {
    let context = AuditContext::from_request(Some(auth.user_id()), &metadata);

    if query.permanent.unwrap_or(false) {
        // Hard deletion is reserved for admins
        permission_guard!(auth, ROLE_ADMIN);

        let client = state.client_service.get_client(client_id).await?;
        state.client_service.delete_client(client_id).await?;

        audit_or_warn(
            state.audit_service.as_ref(),
            &ClientDeletedAudit {
                context,
                client_id: client.id,
                title: client.title,
            },
        )
        .await;

        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

        let client = state.client_service.deactivate_client(client_id).await?;

        audit_or_warn(
            state.audit_service.as_ref(),
            &ClientDeactivatedAudit {
                context,
                client_id: client.id,
                title: client.title.clone(),
            },
        )
        .await;

        Ok(Json(ClientResponse::from(client)).into_response())
    }
}

#[utoipa::path(
    get,
    path = "/clients/{id}/users",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client users retrieved successfully", body = Vec<ClientUserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn list_client_users(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::List, AccessTarget::Client(client_id))
        .await?;

    let users = state.client_service.list_users(client_id).await?;
    let response: Vec<ClientUserResponse> = users
        .into_iter()
        .map(|user| ClientUserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/clients/{id}/users",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = AssignUserRequest,
    responses(
        (status = 200, description = "User assigned to client"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn assign_client_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<AssignUserRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let association = state
        .client_service
        .assign_user(client_id, request.user_id)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientUserAssignedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id,
            target_user_id: association.user_id,
        },
    )
    .await;

    Ok(Json(association))
}

#[utoipa::path(
    delete,
    path = "/clients/{id}/users/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Client ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User removed from client"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn remove_client_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path((client_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    state.client_service.remove_user(client_id, user_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientUserRemovedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id,
            target_user_id: user_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/clients/{id}/websites",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client websites retrieved successfully", body = Vec<ClientWebsiteResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn list_client_websites(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::List, AccessTarget::Client(client_id))
        .await?;

    let websites = state.client_service.list_websites(client_id).await?;
    let response: Vec<ClientWebsiteResponse> = websites
        .into_iter()
        .map(|website| ClientWebsiteResponse {
            id: website.id,
            domain: website.domain,
            is_secure: website.is_secure,
            is_active: website.is_active,
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/clients/{id}/websites",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = AssignWebsiteRequest,
    responses(
        (status = 200, description = "Website assigned to client"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn assign_client_website(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<AssignWebsiteRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let association = state
        .client_service
        .assign_website(client_id, request.website_id)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientWebsiteAssignedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id,
            website_id: association.website_id,
        },
    )
    .await;

    Ok(Json(association))
}

#[utoipa::path(
    delete,
    path = "/clients/{id}/websites/{website_id}",
    params(
        ("id" = Uuid, Path, description = "Client ID"),
        ("website_id" = Uuid, Path, description = "Website ID")
    ),
    responses(
        (status = 204, description = "Website removed from client"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Clients",
    security(("bearer_auth" = []))
)]
pub async fn remove_client_website(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<ClientState>>,
    Path((client_id, website_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    state
        .client_service
        .remove_website(client_id, website_id)
        .await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &ClientWebsiteRemovedAudit {
            context: AuditContext::from_request(Some(auth.user_id()), &metadata),
            client_id,
            website_id,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_client,
        list_clients,
        get_client,
        update_client,
        delete_client,
        list_client_users,
        assign_client_user,
        remove_client_user,
        list_client_websites,
        assign_client_website,
        remove_client_website,
    ),
    components(schemas(
        CreateClientRequest,
        UpdateClientRequest,
        ClientResponse,
        AssignUserRequest,
        AssignWebsiteRequest,
        ClientUserResponse,
        ClientWebsiteResponse,
    )),
    tags(
        (name = "Clients", description = "Client (tenant) management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct ClientApiDoc;
