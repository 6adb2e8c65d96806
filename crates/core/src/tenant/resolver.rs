//! Tenant resolution chain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use tenora_shared::types::TenantId;

use super::error::TenantError;
use super::host::{host_subdomain, normalize_host};
use super::types::Tenant;

/// Header carrying an explicit tenant primary key.
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Header carrying an explicit tenant subdomain.
pub const TENANT_SUBDOMAIN_HEADER: &str = "x-tenant-subdomain";

/// Read access to stored tenants.
///
/// The `find_active_*` lookups must only return tenants that are active at
/// `now`; `find_by_id` returns the tenant whatever its status.
#[async_trait]
pub trait TenantSource: Send + Sync {
    /// Finds a tenant by primary key.
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError>;

    /// Finds an active tenant by subdomain.
    async fn find_active_by_subdomain(
        &self,
        subdomain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError>;

    /// Finds an active tenant by exact custom-domain match.
    async fn find_active_by_domain(
        &self,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError>;
}

/// The parts of a request the resolver looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveRequest<'a> {
    /// Value of the `X-Tenant-ID` header.
    pub tenant_id: Option<&'a str>,
    /// Value of the `X-Tenant-Subdomain` header.
    pub subdomain: Option<&'a str>,
    /// Request host, possibly with a port.
    pub host: &'a str,
}

/// Which step of the chain matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    /// `X-Tenant-ID` header.
    IdHeader,
    /// `X-Tenant-Subdomain` header.
    SubdomainHeader,
    /// First label of a host with three or more labels.
    HostSubdomain,
    /// Exact custom-domain match on the host.
    CustomDomain,
}

impl ResolvedBy {
    /// Returns the string representation of the step.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IdHeader => "id_header",
            Self::SubdomainHeader => "subdomain_header",
            Self::HostSubdomain => "host_subdomain",
            Self::CustomDomain => "custom_domain",
        }
    }
}

/// The tenant a single request is scoped to.
///
/// Built once per request and carried in that request's context; it is
/// never shared between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    /// The resolved, active tenant.
    pub tenant: Tenant,
    /// The step that found it.
    pub resolved_by: ResolvedBy,
}

impl TenantContext {
    /// Returns the tenant ID.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant.id
    }
}

/// Resolves requests to tenants using a [`TenantSource`].
#[derive(Debug, Clone)]
pub struct TenantResolver<S> {
    source: S,
}

impl<S: TenantSource> TenantResolver<S> {
    /// Creates a resolver over the given source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Walks the lookup chain and returns the first match.
    ///
    /// Only the ID header step may return an inactive tenant; every other
    /// step ignores tenants that are not active at `now`, even if the source
    /// hands one back.
    pub async fn identify(
        &self,
        request: &ResolveRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<Option<(Tenant, ResolvedBy)>, TenantError> {
        if let Some(id) = request
            .tenant_id
            .and_then(|raw| TenantId::from_str(raw.trim()).ok())
            && let Some(tenant) = self.source.find_by_id(id).await?
        {
            return Ok(Some((tenant, ResolvedBy::IdHeader)));
        }

        if let Some(subdomain) = request.subdomain.map(str::trim).filter(|s| !s.is_empty()) {
            let found = self
                .source
                .find_active_by_subdomain(&subdomain.to_ascii_lowercase(), now)
                .await?;
            if let Some(tenant) = active_at(found, now) {
                return Ok(Some((tenant, ResolvedBy::SubdomainHeader)));
            }
        }

        let host = normalize_host(request.host);
        if host.is_empty() {
            return Ok(None);
        }

        if let Some(subdomain) = host_subdomain(&host) {
            let found = self.source.find_active_by_subdomain(subdomain, now).await?;
            if let Some(tenant) = active_at(found, now) {
                return Ok(Some((tenant, ResolvedBy::HostSubdomain)));
            }
        }

        let found = self.source.find_active_by_domain(&host, now).await?;
        Ok(active_at(found, now).map(|tenant| (tenant, ResolvedBy::CustomDomain)))
    }

    /// Resolves the request and enforces the activity rule.
    ///
    /// # Errors
    ///
    /// - `TenantError::TenantNotFound` if no step matched
    /// - `TenantError::TenantInactive` if the matched tenant is not active
    /// - `TenantError::Store` if the source failed
    pub async fn resolve(
        &self,
        request: &ResolveRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<TenantContext, TenantError> {
        let (tenant, resolved_by) = self
            .identify(request, now)
            .await?
            .ok_or(TenantError::TenantNotFound)?;

        if !tenant.is_active_at(now) {
            return Err(TenantError::TenantInactive(tenant.id.into_inner()));
        }

        Ok(TenantContext {
            tenant,
            resolved_by,
        })
    }
}

fn active_at(found: Option<Tenant>, now: DateTime<Utc>) -> Option<Tenant> {
    found.filter(|tenant| tenant.is_active_at(now))
}

#[async_trait]
impl<T: TenantSource + ?Sized> TenantSource for std::sync::Arc<T> {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError> {
        (**self).find_by_id(id).await
    }

    async fn find_active_by_subdomain(
        &self,
        subdomain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        (**self).find_active_by_subdomain(subdomain, now).await
    }

    async fn find_active_by_domain(
        &self,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        (**self).find_active_by_domain(domain, now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::types::TenantStatus;
    use chrono::Duration;
    use std::sync::Mutex;

    /// In-memory tenant store that records which lookups were made.
    #[derive(Default)]
    struct MemorySource {
        tenants: Vec<Tenant>,
        calls: Mutex<Vec<&'static str>>,
        /// Return tenants from `find_active_*` without checking activity.
        leaky: bool,
    }

    impl MemorySource {
        fn with(tenants: Vec<Tenant>) -> Self {
            Self {
                tenants,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn visible(&self, tenant: &Tenant, now: DateTime<Utc>) -> bool {
            self.leaky || tenant.is_active_at(now)
        }
    }

    #[async_trait]
    impl TenantSource for MemorySource {
        async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError> {
            self.record("id");
            Ok(self.tenants.iter().find(|t| t.id == id).cloned())
        }

        async fn find_active_by_subdomain(
            &self,
            subdomain: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<Tenant>, TenantError> {
            self.record("subdomain");
            Ok(self
                .tenants
                .iter()
                .find(|t| t.subdomain == subdomain && self.visible(t, now))
                .cloned())
        }

        async fn find_active_by_domain(
            &self,
            domain: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<Tenant>, TenantError> {
            self.record("domain");
            Ok(self
                .tenants
                .iter()
                .find(|t| t.domain.as_deref() == Some(domain) && self.visible(t, now))
                .cloned())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TenantSource for FailingSource {
        async fn find_by_id(&self, _id: TenantId) -> Result<Option<Tenant>, TenantError> {
            Err(TenantError::Store("down".to_string()))
        }

        async fn find_active_by_subdomain(
            &self,
            _subdomain: &str,
            _now: DateTime<Utc>,
        ) -> Result<Option<Tenant>, TenantError> {
            Err(TenantError::Store("down".to_string()))
        }

        async fn find_active_by_domain(
            &self,
            _domain: &str,
            _now: DateTime<Utc>,
        ) -> Result<Option<Tenant>, TenantError> {
            Err(TenantError::Store("down".to_string()))
        }
    }

    fn tenant(subdomain: &str, domain: Option<&str>, status: TenantStatus) -> Tenant {
        Tenant {
            id: TenantId::new(),
            name: subdomain.to_uppercase(),
            subdomain: subdomain.to_string(),
            domain: domain.map(str::to_string),
            status,
            expires_at: None,
        }
    }

    fn request<'a>(
        tenant_id: Option<&'a str>,
        subdomain: Option<&'a str>,
        host: &'a str,
    ) -> ResolveRequest<'a> {
        ResolveRequest {
            tenant_id,
            subdomain,
            host,
        }
    }

    #[tokio::test]
    async fn test_id_header_wins_over_everything() {
        let target = tenant("target", Some("target.io"), TenantStatus::Active);
        let other = tenant("tenant1", Some("other.io"), TenantStatus::Active);
        let id = target.id.to_string();
        let resolver = TenantResolver::new(MemorySource::with(vec![target.clone(), other]));

        let ctx = resolver
            .resolve(&request(Some(&id), Some("tenant1"), "tenant1.example.com"), Utc::now())
            .await
            .unwrap();

        assert_eq!(ctx.tenant, target);
        assert_eq!(ctx.resolved_by, ResolvedBy::IdHeader);
    }

    #[tokio::test]
    async fn test_id_header_returns_inactive_tenant_then_rejects_it() {
        let suspended = tenant("sleepy", None, TenantStatus::Suspended);
        let id = suspended.id.to_string();
        let resolver = TenantResolver::new(MemorySource::with(vec![suspended.clone()]));
        let now = Utc::now();

        let found = resolver
            .identify(&request(Some(&id), None, "example.com"), now)
            .await
            .unwrap();
        assert_eq!(found, Some((suspended.clone(), ResolvedBy::IdHeader)));

        let err = resolver
            .resolve(&request(Some(&id), None, "example.com"), now)
            .await
            .unwrap_err();
        assert_eq!(err, TenantError::TenantInactive(suspended.id.into_inner()));
    }

    #[tokio::test]
    async fn test_expired_tenant_is_inactive() {
        let mut expired = tenant("old", None, TenantStatus::Active);
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        let id = expired.id.to_string();
        let resolver = TenantResolver::new(MemorySource::with(vec![expired]));

        let err = resolver
            .resolve(&request(Some(&id), None, "example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::TenantInactive(_)));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_id_falls_through() {
        let acme = tenant("acme", None, TenantStatus::Active);
        let source = MemorySource::with(vec![acme.clone()]);
        let resolver = TenantResolver::new(source);
        let unknown = TenantId::new().to_string();

        for header in [unknown.as_str(), "42", ""] {
            let ctx = resolver
                .resolve(&request(Some(header), Some("acme"), "example.com"), Utc::now())
                .await
                .unwrap();
            assert_eq!(ctx.tenant, acme);
            assert_eq!(ctx.resolved_by, ResolvedBy::SubdomainHeader);
        }
    }

    #[tokio::test]
    async fn test_subdomain_header_ignores_inactive_and_falls_through() {
        let inactive = tenant("acme", None, TenantStatus::Inactive);
        let host_match = tenant("tenant1", None, TenantStatus::Active);
        let resolver = TenantResolver::new(MemorySource::with(vec![inactive, host_match.clone()]));

        let ctx = resolver
            .resolve(&request(None, Some("acme"), "tenant1.example.com"), Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.tenant, host_match);
        assert_eq!(ctx.resolved_by, ResolvedBy::HostSubdomain);
    }

    #[tokio::test]
    async fn test_subdomain_header_is_case_insensitive() {
        let acme = tenant("acme", None, TenantStatus::Active);
        let resolver = TenantResolver::new(MemorySource::with(vec![acme.clone()]));

        let ctx = resolver
            .resolve(&request(None, Some(" ACME "), "localhost"), Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.tenant, acme);
    }

    #[tokio::test]
    async fn test_host_with_three_labels_resolves_by_subdomain() {
        let t1 = tenant("tenant1", None, TenantStatus::Active);
        let resolver = TenantResolver::new(MemorySource::with(vec![t1.clone()]));

        let ctx = resolver
            .resolve(&request(None, None, "tenant1.example.com"), Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.tenant, t1);
        assert_eq!(ctx.resolved_by, ResolvedBy::HostSubdomain);
        assert_eq!(ctx.tenant_id(), t1.id);
    }

    #[tokio::test]
    async fn test_two_label_host_skips_subdomain_step() {
        let custom = tenant("example", Some("example.com"), TenantStatus::Active);
        let source = MemorySource::with(vec![custom.clone()]);
        let resolver = TenantResolver::new(source);

        let ctx = resolver
            .resolve(&request(None, None, "Example.com:443"), Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.tenant, custom);
        assert_eq!(ctx.resolved_by, ResolvedBy::CustomDomain);
        assert_eq!(resolver.source.calls(), vec!["domain"]);
    }

    #[tokio::test]
    async fn test_unmatched_host_subdomain_falls_back_to_custom_domain() {
        let custom = tenant("acme", Some("erp.acme.io"), TenantStatus::Active);
        let resolver = TenantResolver::new(MemorySource::with(vec![custom.clone()]));

        let ctx = resolver
            .resolve(&request(None, None, "erp.acme.io"), Utc::now())
            .await
            .unwrap();
        assert_eq!(ctx.tenant, custom);
        assert_eq!(ctx.resolved_by, ResolvedBy::CustomDomain);
        assert_eq!(resolver.source.calls(), vec!["subdomain", "domain"]);
    }

    #[tokio::test]
    async fn test_nothing_matches() {
        let resolver = TenantResolver::new(MemorySource::with(vec![tenant(
            "acme",
            None,
            TenantStatus::Active,
        )]));

        let err = resolver
            .resolve(&request(None, None, "unknown.example.com"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, TenantError::TenantNotFound);
    }

    #[tokio::test]
    async fn test_empty_host_is_not_found() {
        let resolver = TenantResolver::new(MemorySource::default());
        let err = resolver
            .resolve(&request(None, None, ""), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, TenantError::TenantNotFound);
        assert!(resolver.source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_tenant_never_leaks_through_host_lookups() {
        let mut source = MemorySource::with(vec![tenant(
            "tenant1",
            Some("tenant1.example.com"),
            TenantStatus::Suspended,
        )]);
        source.leaky = true;
        let resolver = TenantResolver::new(source);

        let err = resolver
            .resolve(&request(None, Some("tenant1"), "tenant1.example.com"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, TenantError::TenantNotFound);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let resolver = TenantResolver::new(FailingSource);
        let err = resolver
            .resolve(&request(None, None, "tenant1.example.com"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, TenantError::Store(_)));
    }
}
