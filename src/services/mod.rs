//! Domain services.

pub mod auth_service;
pub mod mailer;
pub mod tenant_check;
pub mod verification;

pub use auth_service::{AuthService, Claims, TokenPair};
pub use mailer::Mailer;
pub use tenant_check::TenantCheckClient;
pub use verification::{InMemoryStore, KeyedStore, PendingCode, VerificationService};
