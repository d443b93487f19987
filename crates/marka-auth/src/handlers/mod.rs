pub mod api_keys;
pub mod users;

use marka_core::{AuditContext, RequestMetadata};

use crate::context::AuthContext;

/// Build the audit context for a mutating operation
pub(crate) fn audit_context(auth: &AuthContext, metadata: &RequestMetadata) -> AuditContext {
    AuditContext::from_request(Some(auth.user_id()), metadata)
}
