use std::sync::Arc;

use anyhow::Result;
use marka_core::{AuditLogger, AuditOperation};
use marka_entities::audit_logs::ActiveModel as AuditLogActiveModel;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// Audit logger that persists events to the audit_logs table
pub struct DbAuditLogger {
    db: Arc<DatabaseConnection>,
}

impl DbAuditLogger {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AuditLogger for DbAuditLogger {
    async fn create_audit_log(&self, operation: &dyn AuditOperation) -> Result<()> {
        let details: serde_json::Value = serde_json::from_str(&operation.serialize()?)?;

        let entry = AuditLogActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(operation.user_id()),
            operation_type: Set(operation.operation_type()),
            details: Set(details),
            ip_address: Set(operation.ip_address()),
            user_agent: Set(operation.user_agent().to_string()),
            ..Default::default()
        };

        entry.insert(self.db.as_ref()).await?;
        Ok(())
    }
}

/// Record an audit event, logging instead of failing on errors.
///
/// Mutating handlers must never fail because auditing failed.
pub async fn audit_or_warn(logger: &dyn AuditLogger, operation: &dyn AuditOperation) {
    if let Err(e) = logger.create_audit_log(operation).await {
        tracing::warn!(
            operation = %operation.operation_type(),
            "Failed to write audit log: {}",
            e
        );
    }
}
