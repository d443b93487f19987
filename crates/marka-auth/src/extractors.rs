use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use marka_core::error_builder::ErrorBuilder;
use marka_core::RequestMetadata;

use crate::context::AuthContext;

/// Extractor that rejects the request with a 401 problem when the auth
/// middleware did not resolve a valid credential.
pub struct RequireAuth(pub AuthContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| {
                ErrorBuilder::new(StatusCode::UNAUTHORIZED)
                    .type_("https://marka.sh/probs/authentication-required")
                    .title("Authentication Required")
                    .detail("This operation requires authentication")
                    .build()
                    .into_response()
            })
    }
}

/// Extractor for the per-request metadata the auth middleware records
pub struct ExtractRequestMetadata(pub RequestMetadata);

impl<S> FromRequestParts<S> for ExtractRequestMetadata
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestMetadata>()
            .cloned()
            .map(ExtractRequestMetadata)
            .ok_or_else(|| {
                ErrorBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .type_("https://marka.sh/probs/internal-server-error")
                    .title("Internal Server Error")
                    .detail("Request metadata was not recorded for this request")
                    .build()
                    .into_response()
            })
    }
}
