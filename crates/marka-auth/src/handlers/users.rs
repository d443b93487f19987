use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use marka_core::problemdetails::Problem;
use marka_core::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use super::audit_context;
use crate::access::AccessTarget;
use crate::audit::{
    RoleAssignedAudit, RoleRemovedAudit, ScopeGrantedAudit, ScopeRevokedAudit,
    UserActivationAudit, UserDeletedAudit, UserUpdatedAudit,
};
use crate::audit_logger::audit_or_warn;
use crate::extractors::{ExtractRequestMetadata, RequireAuth};
use crate::permission_guard;
use crate::permissions::{AclPermission, Role, ROLE_ADMIN, ROLE_MANAGER};
use crate::state::AuthState;
use crate::user_service::{UpdateUserRequest, UserResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrivilegeRequest {
    /// Privilege scope, e.g. "role:manager" or an explicit grant
    pub scope: String,
}

#[utoipa::path(
    get,
    path = "/users",
    params(PageParams),
    responses(
        (status = 200, description = "Users retrieved successfully", body = Paginated<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AuthState>>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN, ROLE_MANAGER);

    let (page, size) = params.normalize();
    let (users, total) = state.user_service.list_users(page, size).await?;
    let results = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(Paginated::new(page, size, total, results)))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
    Json(UserResponse::from(auth.user))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    RequireAuth(auth): RequireAuth,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Read, AccessTarget::User(user_id))
        .await?;

    let user = state.user_service.get_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 405, description = "Insufficient permissions"),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, Problem> {
    state
        .access_control
        .verify_user_can_access(&auth, AclPermission::Update, AccessTarget::User(user_id))
        .await?;

    let new_email = request.email.clone();
    let new_username = request.username.clone();
    let user = state.user_service.update_user(user_id, request).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &UserUpdatedAudit {
            context: audit_context(&auth, &metadata),
            target_user_id: user.id,
            username: user.username.clone(),
            new_email,
            new_username,
        },
    )
    .await;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/users/{id}/activate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User activated successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn activate_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let user = state.user_service.set_active(user_id, true).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &UserActivationAudit {
            context: audit_context(&auth, &metadata),
            target_user_id: user.id,
            username: user.username.clone(),
            is_active: true,
        },
    )
    .await;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/users/{id}/deactivate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let user = state.user_service.set_active(user_id, false).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &UserActivationAudit {
            context: audit_context(&auth, &metadata),
            target_user_id: user.id,
            username: user.username.clone(),
            is_active: false,
        },
    )
    .await;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let user = state.user_service.get_user(user_id).await?;
    state.user_service.delete_user(user_id).await?;

    audit_or_warn(
        state.audit_service.as_ref(),
        &UserDeletedAudit {
            context: audit_context(&auth, &metadata),
            target_user_id: user.id,
            username: user.username,
            email: user.email,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users/{id}/privileges",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = PrivilegeRequest,
    responses(
        (status = 200, description = "Privilege granted successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn grant_privilege(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<PrivilegeRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let context = audit_context(&auth, &metadata);

    // Role scopes go into the roles list, everything else is a grant
    let user = if let Some(role) = Role::from_scope(&request.scope) {
        let user = state.user_service.assign_role(user_id, role).await?;
        audit_or_warn(
            state.audit_service.as_ref(),
            &RoleAssignedAudit {
                context,
                target_user_id: user.id,
                username: user.username.clone(),
                role: request.scope,
            },
        )
        .await;
        user
    } else {
        let user = state.user_service.grant_scope(user_id, &request.scope).await?;
        audit_or_warn(
            state.audit_service.as_ref(),
            &ScopeGrantedAudit {
                context,
                target_user_id: user.id,
                scope: request.scope,
            },
        )
        .await;
        user
    };

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/privileges",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = PrivilegeRequest,
    responses(
        (status = 200, description = "Privilege revoked successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn revoke_privilege(
    RequireAuth(auth): RequireAuth,
    ExtractRequestMetadata(metadata): ExtractRequestMetadata,
    State(state): State<Arc<AuthState>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<PrivilegeRequest>,
) -> Result<impl IntoResponse, Problem> {
    permission_guard!(auth, ROLE_ADMIN);

    let context = audit_context(&auth, &metadata);

    let user = if let Some(role) = Role::from_scope(&request.scope) {
        let user = state.user_service.remove_role(user_id, role).await?;
        audit_or_warn(
            state.audit_service.as_ref(),
            &RoleRemovedAudit {
                context,
                target_user_id: user.id,
                username: user.username.clone(),
                role: request.scope,
            },
        )
        .await;
        user
    } else {
        let user = state
            .user_service
            .revoke_scope(user_id, &request.scope)
            .await?;
        audit_or_warn(
            state.audit_service.as_ref(),
            &ScopeRevokedAudit {
                context,
                target_user_id: user.id,
                scope: request.scope,
            },
        )
        .await;
        user
    };

    Ok(Json(UserResponse::from(user)))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        get_current_user,
        get_user,
        update_user,
        activate_user,
        deactivate_user,
        delete_user,
        grant_privilege,
        revoke_privilege,
    ),
    components(schemas(UserResponse, UpdateUserRequest, PrivilegeRequest)),
    tags(
        (name = "Users", description = "User management endpoints")
    ),
    security(("bearer_auth" = []))
)]
pub struct UserApiDoc;
