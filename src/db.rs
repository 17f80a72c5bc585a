pub mod user_repo;
pub use user_repo::UserRepository;
pub mod organization_store;
pub use organization_store::OrganizationStore;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod inventory_repo;
pub use inventory_repo::VehicleRepository;
pub mod crm_repo;
pub use crm_repo::LeadRepository;
pub mod sales_repo;
pub use sales_repo::SaleRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod ownership;
pub use ownership::{OwnershipRepository, RecordOwnership};

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub use memory_store::InMemoryOrganizationStore;
#[cfg(test)]
pub use ownership::InMemoryOwnership;
