//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tenora_api::{AppState, create_router};
use tenora_core::tenant::{Tenant, TenantError, TenantSource, TenantStatus};
use tenora_shared::types::TenantId;
use tenora_shared::{JwtConfig, JwtService};
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "router-test-secret";

/// Tenants held in memory, with the activity rule applied like the database does.
#[derive(Default)]
pub struct MemoryTenants(pub Vec<Tenant>);

#[async_trait]
impl TenantSource for MemoryTenants {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantError> {
        Ok(self.0.iter().find(|t| t.id == id).cloned())
    }

    async fn find_active_by_subdomain(
        &self,
        subdomain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        Ok(self
            .0
            .iter()
            .find(|t| t.subdomain.eq_ignore_ascii_case(subdomain) && t.is_active_at(now))
            .cloned())
    }

    async fn find_active_by_domain(
        &self,
        domain: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Tenant>, TenantError> {
        Ok(self
            .0
            .iter()
            .find(|t| t.domain.as_deref() == Some(domain) && t.is_active_at(now))
            .cloned())
    }
}

pub fn tenant(subdomain: &str, status: TenantStatus) -> Tenant {
    Tenant {
        id: TenantId::new(),
        name: format!("{subdomain} Ltd"),
        subdomain: subdomain.to_string(),
        domain: Some(format!("erp.{subdomain}.com")),
        status,
        expires_at: None,
    }
}

pub fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: SECRET.to_string(),
        access_token_expires_minutes: 15,
    })
}

pub fn token_for(tenant: &Tenant) -> String {
    jwt_service()
        .generate_access_token(Uuid::new_v4(), tenant.id.into_inner())
        .unwrap()
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn app(tenants: Vec<Tenant>, db: DatabaseConnection) -> Router {
    create_router(AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service()),
        tenants: Arc::new(MemoryTenants(tenants)),
    })
}

pub async fn send(app: Router, request: Request<Body>) -> (Response<Body>, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (Response::from_parts(parts, Body::empty()), json)
}
