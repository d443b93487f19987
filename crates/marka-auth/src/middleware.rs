use std::sync::Arc;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use marka_core::RequestMetadata;

use crate::apikey_service::API_KEY_PREFIX;
use crate::context::AuthContext;
use crate::state::AuthState;

/// Resolves bearer API keys into an `AuthContext` request extension and
/// records request metadata for auditing.
///
/// Requests without a valid credential pass through without a context; the
/// `RequireAuth` extractor rejects them later with a 401 problem.
pub async fn auth_middleware(
    state: Arc<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // The request body is not Sync, so the token must be detached from the
    // request as an owned string before the validation await.
    let auth_context = match bearer_token(&req) {
        Ok(token) => validate_bearer_token(&token, &state).await.ok(),
        Err(_) => None,
    };

    let host = req
        .headers()
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string();

    let scheme = if req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        == Some("https")
    {
        "https"
    } else {
        "http"
    };
    let is_secure = scheme == "https";
    let base_url = format!("{}://{}", scheme, host);

    let metadata = RequestMetadata {
        ip_address: req
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .unwrap_or("unknown")
            .trim()
            .to_string(),
        user_agent: req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
        headers: req.headers().clone(),
        base_url,
        scheme: scheme.to_string(),
        host,
        is_secure,
    };

    req.extensions_mut().insert(metadata);
    if let Some(auth_ctx) = auth_context {
        req.extensions_mut().insert(auth_ctx);
    }

    Ok(next.run(req).await)
}

/// Pull the bearer API key out of the request headers as an owned string
pub fn bearer_token(req: &Request) -> Result<String, AuthError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::Unauthorized("Expected a bearer token".to_string()))?;

    if !token.starts_with(API_KEY_PREFIX) {
        return Err(AuthError::Unauthorized(
            "Unrecognized credential format".to_string(),
        ));
    }

    Ok(token.to_string())
}

/// Validate an API key and resolve it into an `AuthContext`.
///
/// Deactivated users are rejected even while their key is still valid.
pub async fn validate_bearer_token(
    token: &str,
    state: &AuthState,
) -> Result<AuthContext, AuthError> {
    let validated = state.api_key_service.validate_api_key(token).await?;

    if !validated.user.is_active {
        return Err(AuthError::Unauthorized(
            "User account is deactivated".to_string(),
        ));
    }

    Ok(AuthContext::new_api_key(
        validated.user,
        validated.role,
        validated.scopes,
        validated.key_name,
        validated.key_id,
    ))
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized(String),
    InternalServerError(String),
}

impl From<crate::apikey_service::ApiKeyServiceError> for AuthError {
    fn from(err: crate::apikey_service::ApiKeyServiceError) -> Self {
        match err {
            crate::apikey_service::ApiKeyServiceError::Unauthorized(msg) => {
                AuthError::Unauthorized(msg)
            }
            _ => AuthError::InternalServerError(err.to_string()),
        }
    }
}
