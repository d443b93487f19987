pub mod ga4;
pub mod gcft;
pub mod gsc;

use std::sync::Arc;

use marka_auth::AccessControl;
use marka_core::AuditLogger;

use crate::ga4_service::Ga4Service;
use crate::gcft_service::GcftService;
use crate::gsc_service::GscService;

pub struct AnalyticsState {
    pub ga4_service: Arc<Ga4Service>,
    pub gcft_service: Arc<GcftService>,
    pub gsc_service: Arc<GscService>,
    pub access_control: Arc<AccessControl>,
    pub audit_service: Arc<dyn AuditLogger>,
}
