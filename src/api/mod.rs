//! API module - HTTP handlers and middleware.

pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use sqlx::PgPool;
use std::sync::Arc;

use crate::audit::{AuditMode, AuditRecorder};
use crate::config::Config;
use crate::error::Result;
use crate::services::{
    AuthService, InMemoryStore, KeyedStore, Mailer, PendingCode, TenantCheckClient,
    VerificationService,
};
use crate::storage::StorageBackend;
use crate::store::{EntityStore, NewUser};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    /// Entity write path, chosen once from configuration
    pub store: Arc<dyn EntityStore>,
    pub audit: AuditRecorder,
    pub audit_mode: AuditMode,
    pub auth: AuthService,
    pub verification: VerificationService,
    /// Signups waiting for email verification
    pub pending_signups: Arc<dyn KeyedStore<NewUser>>,
    pub mailer: Mailer,
    pub storage: Arc<dyn StorageBackend>,
    pub tenant_check: TenantCheckClient,
}

impl AppState {
    pub fn new(config: Config, db: PgPool) -> Result<Self> {
        let codes: Arc<dyn KeyedStore<PendingCode>> = Arc::new(InMemoryStore::new());

        Ok(Self {
            store: crate::store::from_config(config.use_stored_procedures),
            audit: AuditRecorder::new(db.clone()),
            audit_mode: config.audit_mode,
            auth: AuthService::new(&config),
            verification: VerificationService::new(codes, config.verification_code_ttl_secs),
            pending_signups: Arc::new(InMemoryStore::new()),
            mailer: Mailer::from_config(&config)?,
            storage: crate::storage::from_config(&config)?,
            tenant_check: TenantCheckClient::from_config(&config)?,
            config,
            db,
        })
    }
}

pub type SharedState = Arc<AppState>;
