//! Tenant domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tenora_shared::types::TenantId;

/// Lifecycle status of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Tenant may use the platform.
    Active,
    /// Tenant has been switched off by an administrator.
    Inactive,
    /// Tenant is temporarily blocked (e.g. unpaid).
    Suspended,
}

impl TenantStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level isolation boundary. Owns one or more organizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier.
    pub id: TenantId,
    /// Display name.
    pub name: String,
    /// Unique subdomain, e.g. `acme` for `acme.example.com`.
    pub subdomain: String,
    /// Optional unique custom domain, e.g. `erp.acme.com`.
    pub domain: Option<String>,
    /// Lifecycle status.
    pub status: TenantStatus,
    /// When the tenant's access ends, if ever.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Tenant {
    /// Returns true if the tenant is active at `now`.
    ///
    /// Active means status `active` and either no expiry or an expiry
    /// strictly in the future.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TenantStatus::Active && self.expires_at.is_none_or(|expiry| expiry > now)
    }
}
