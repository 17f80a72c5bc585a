// src/db/ownership.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, VehicleRepository},
};

/// Posse dos registros que leads e vendas podem referenciar.
#[async_trait]
pub trait RecordOwnership: Send + Sync {
    async fn owns_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError>;
    async fn owns_lead(&self, user_id: Uuid, lead_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct OwnershipRepository {
    vehicle_repo: VehicleRepository,
    lead_repo: LeadRepository,
}

impl OwnershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicle_repo: VehicleRepository::new(pool.clone()),
            lead_repo: LeadRepository::new(pool),
        }
    }
}

#[async_trait]
impl RecordOwnership for OwnershipRepository {
    async fn owns_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError> {
        self.vehicle_repo.exists(user_id, vehicle_id).await
    }

    async fn owns_lead(&self, user_id: Uuid, lead_id: Uuid) -> Result<bool, AppError> {
        self.lead_repo.exists(user_id, lead_id).await
    }
}

// Versão em memória para os testes dos serviços de leads e vendas
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryOwnership {
    vehicles: std::collections::HashSet<(Uuid, Uuid)>,
    leads: std::collections::HashSet<(Uuid, Uuid)>,
}

#[cfg(test)]
impl InMemoryOwnership {
    pub fn with_vehicle(mut self, user_id: Uuid, vehicle_id: Uuid) -> Self {
        self.vehicles.insert((user_id, vehicle_id));
        self
    }

    pub fn with_lead(mut self, user_id: Uuid, lead_id: Uuid) -> Self {
        self.leads.insert((user_id, lead_id));
        self
    }
}

#[cfg(test)]
#[async_trait]
impl RecordOwnership for InMemoryOwnership {
    async fn owns_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError> {
        Ok(self.vehicles.contains(&(user_id, vehicle_id)))
    }

    async fn owns_lead(&self, user_id: Uuid, lead_id: Uuid) -> Result<bool, AppError> {
        Ok(self.leads.contains(&(user_id, lead_id)))
    }
}
