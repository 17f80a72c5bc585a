pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod inventory;
pub mod invitations;
pub mod members;
pub mod organizations;
pub mod sales;
