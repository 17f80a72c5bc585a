pub mod auth;
pub mod crm_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod invitation_service;
pub mod membership_service;
pub mod organization_service;
pub mod sales_service;

pub use crm_service::LeadService;
pub use dashboard_service::DashboardService;
pub use inventory_service::VehicleService;
pub use invitation_service::InvitationService;
pub use membership_service::MembershipService;
pub use organization_service::OrganizationService;
pub use sales_service::SaleService;
