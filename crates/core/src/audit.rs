//! Audit trail records written alongside allocation and posting changes.

use chrono::{DateTime, Utc};
use ledgerwise_shared::types::{CompanyId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity deleted.
    Delete,
    /// Entity posted to the ledger.
    Post,
    /// Bank line matched.
    Match,
}

string_enum!(AuditAction {
    Create => "create",
    Delete => "delete",
    Post => "post",
    Match => "match",
});

/// One audit log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row identifier.
    pub id: Uuid,
    /// Owning company.
    pub company_id: CompanyId,
    /// Acting user, when known.
    pub user_id: Option<UserId>,
    /// Entity kind, e.g. `payment_allocation`.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: Uuid,
    /// Action taken.
    pub action: AuditAction,
    /// Free-form details.
    pub details: serde_json::Value,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Builds an entry stamped with the current time.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        user_id: Option<UserId>,
        entity_type: &str,
        entity_id: Uuid,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            company_id,
            user_id,
            entity_type: entity_type.to_string(),
            entity_id,
            action,
            details,
            created_at: Utc::now(),
        }
    }
}
