//! HTTP clients for the analysis backend and the brand-validation model.

pub mod backend;
pub mod error;
pub mod poll;
pub mod types;
pub mod validate;

pub use backend::BackendClient;
pub use error::ClientError;
pub use poll::PollPolicy;
pub use types::{AuditCheck, AuditStatus, BillingStatus, SessionUrl, SiteAudit};
pub use validate::{parse_validation, BrandValidation, BrandValidator, EntityKind};
