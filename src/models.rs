pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod inventory;
pub mod organization;
pub mod sales;
