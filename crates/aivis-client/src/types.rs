//! Wire types for the backend's site-audit and billing endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Pending,
    Running,
    Complete,
    Failed,
}

impl AuditStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, AuditStatus::Complete | AuditStatus::Failed)
    }
}

/// One AI-readiness check run against the audited site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditCheck {
    pub name: String,
    pub passed: bool,
    pub severity: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteAudit {
    pub id: String,
    pub url: String,
    pub status: AuditStatus,
    /// Overall AI-readiness score, 0..=100, once the audit completes.
    pub score: Option<f64>,
    pub checks: Vec<AuditCheck>,
    pub recommendations: Vec<String>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SiteAuditRequest<'a> {
    pub url: &'a str,
}

/// Subscription state. Defaults to the free tier: one report, none used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingStatus {
    pub has_subscription: bool,
    pub reports_used: u32,
    pub reports_limit: u32,
}

impl Default for BillingStatus {
    fn default() -> Self {
        Self {
            has_subscription: false,
            reports_used: 0,
            reports_limit: 1,
        }
    }
}

impl BillingStatus {
    #[must_use]
    pub fn reports_remaining(&self) -> u32 {
        self.reports_limit.saturating_sub(self.reports_used)
    }

    /// Subscribers are never blocked; free users are blocked once their
    /// reports are used up.
    #[must_use]
    pub fn can_create_report(&self) -> bool {
        self.has_subscription || self.reports_remaining() > 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutRequest<'a> {
    pub price_id: &'a str,
}

/// Hosted billing page to send the user to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUrl {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_status_reads_camel_case() {
        let status: BillingStatus = serde_json::from_str(
            r#"{"hasSubscription": false, "reportsUsed": 1, "reportsLimit": 1}"#,
        )
        .unwrap();
        assert_eq!(status.reports_remaining(), 0);
        assert!(!status.can_create_report());
    }

    #[test]
    fn free_tier_default_allows_one_report() {
        let status = BillingStatus::default();
        assert_eq!(status.reports_limit, 1);
        assert!(status.can_create_report());
    }

    #[test]
    fn audit_payload_tolerates_missing_fields() {
        let audit: SiteAudit =
            serde_json::from_str(r#"{"id": "a1", "status": "running"}"#).unwrap();
        assert_eq!(audit.status, AuditStatus::Running);
        assert!(!audit.status.is_terminal());
        assert!(audit.checks.is_empty());
    }
}
