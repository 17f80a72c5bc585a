// src/db/organization_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        organization::{
            Invitation, InvitationDetails, MemberProfile, MemberRole, Membership, NewInvitation,
            NewOrganization, Organization, UpdateOrganizationRequest,
        },
    },
};

/// Persistência de organizações, membros e convites.
///
/// As operações compostas (`create_with_owner`, `issue_invitation`,
/// `redeem_invitation`) são atômicas: ou tudo é gravado, ou nada.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Cria a organização e o vínculo de dono numa única transação.
    /// Retorna `AppError::SlugAlreadyExists` se o slug colidir.
    async fn create_with_owner(
        &self,
        new: NewOrganization,
        owner_id: Uuid,
    ) -> Result<(Organization, Membership), AppError>;

    async fn find_membership_by_user(&self, user_id: Uuid) -> Result<Option<Membership>, AppError>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    async fn update_organization(
        &self,
        id: Uuid,
        changes: &UpdateOrganizationRequest,
    ) -> Result<Organization, AppError>;

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<MemberProfile>, AppError>;

    async fn find_member(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Membership>, AppError>;

    /// Nunca remove o dono. Retorna `false` se nada foi removido.
    async fn delete_member(&self, organization_id: Uuid, member_id: Uuid) -> Result<bool, AppError>;

    /// Nunca altera o dono. Retorna `None` se nada foi alterado.
    async fn update_member_role(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Membership>, AppError>;

    async fn list_pending_invitations(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, AppError>;

    /// Checa capacidade, membro existente e convite pendente e insere,
    /// tudo sob o mesmo lock da organização.
    async fn issue_invitation(
        &self,
        new: NewInvitation,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AppError>;

    async fn delete_invitation(
        &self,
        organization_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<bool, AppError>;

    async fn find_invitation_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InvitationDetails>, AppError>;

    /// Valida o convite para o usuário, cria o vínculo e apaga o convite.
    async fn redeem_invitation(
        &self,
        token: &str,
        caller: &User,
        now: DateTime<Utc>,
    ) -> Result<Membership, AppError>;
}
