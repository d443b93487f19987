use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

/// Context information common to all audit events
#[derive(Debug, Clone, Serialize)]
pub struct AuditContext {
    pub user_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl AuditContext {
    /// Build the audit context for a request handled on behalf of a user
    pub fn from_request(user_id: Option<Uuid>, metadata: &crate::RequestMetadata) -> Self {
        Self {
            user_id,
            ip_address: Some(metadata.ip_address.clone()),
            user_agent: metadata.user_agent.clone(),
        }
    }
}

/// Trait for audit operations with serialization and context accessors
pub trait AuditOperation: Send + Sync {
    /// Returns the operation type (e.g., "CLIENT_CREATED", "TRACKING_LINK_DELETED")
    fn operation_type(&self) -> String;

    /// Returns the user ID who performed the operation, if any
    fn user_id(&self) -> Option<Uuid>;

    /// Returns the IP address if available
    fn ip_address(&self) -> Option<String>;

    /// Returns the user agent string
    fn user_agent(&self) -> &str;

    /// Serializes the operation to JSON
    fn serialize(&self) -> Result<String>;
}

/// Trait for services that can create audit logs
#[async_trait::async_trait]
pub trait AuditLogger: Send + Sync {
    /// Creates an audit log entry for the given operation
    async fn create_audit_log(&self, operation: &dyn AuditOperation) -> Result<()>;
}

/// Implements [`AuditOperation`] for an audit payload struct with a
/// `context: AuditContext` field and a fixed operation type.
#[macro_export]
macro_rules! impl_audit_operation {
    ($type:ty, $operation:expr) => {
        impl $crate::AuditOperation for $type {
            fn operation_type(&self) -> String {
                $operation.to_string()
            }

            fn user_id(&self) -> Option<$crate::uuid::Uuid> {
                self.context.user_id
            }

            fn ip_address(&self) -> Option<String> {
                self.context.ip_address.clone()
            }

            fn user_agent(&self) -> &str {
                &self.context.user_agent
            }

            fn serialize(&self) -> $crate::anyhow::Result<String> {
                $crate::serde_json::to_string(self).map_err($crate::anyhow::Error::from)
            }
        }
    };
}
