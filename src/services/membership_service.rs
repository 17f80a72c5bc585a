// src/services/membership_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrganizationStore,
    models::organization::{MemberProfile, MemberRole, Membership},
};

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn OrganizationStore>,
}

impl MembershipService {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, caller: &Membership) -> Result<Vec<MemberProfile>, AppError> {
        self.store.list_members(caller.organization_id).await
    }

    /// Remove um membro da organização de quem chama, seguindo a matriz
    /// de `MemberRole::can_remove`.
    pub async fn remove(&self, caller: &Membership, member_id: Uuid) -> Result<(), AppError> {
        let target = self
            .store
            .find_member(caller.organization_id, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        if target.role == MemberRole::Owner {
            return Err(AppError::OwnerIsImmutable);
        }
        if !caller.role.can_remove(target.role) {
            tracing::warn!(
                "Usuário {} ({}) tentou remover o membro {} ({}).",
                caller.user_id,
                caller.role,
                target.id,
                target.role
            );
            return Err(AppError::InsufficientRole);
        }

        if !self.store.delete_member(caller.organization_id, member_id).await? {
            return Err(AppError::MemberNotFound);
        }

        tracing::info!(
            "👋 Membro {} removido da organização {} por {}.",
            member_id,
            caller.organization_id,
            caller.user_id
        );
        Ok(())
    }

    /// Só o dono troca cargos, e só para os cargos atribuíveis.
    pub async fn set_role(
        &self,
        caller: &Membership,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Membership, AppError> {
        if caller.role != MemberRole::Owner {
            return Err(AppError::InsufficientRole);
        }
        if !role.is_assignable() {
            return Err(AppError::RoleNotAssignable(role));
        }

        let target = self
            .store
            .find_member(caller.organization_id, member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        if !caller.role.can_change_role_of(target.role) {
            return Err(AppError::OwnerIsImmutable);
        }

        let updated = self
            .store
            .update_member_role(caller.organization_id, member_id, role)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        tracing::info!("🔑 Membro {} agora é {}.", updated.id, updated.role);
        Ok(updated)
    }
}
