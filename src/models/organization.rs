// src/models/organization.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// ---
// 1. Cargos (Mapeia o CREATE TYPE member_role do banco)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Vendedor,
    Rh,
    Contabilidade,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Vendedor => "vendedor",
            MemberRole::Rh => "rh",
            MemberRole::Contabilidade => "contabilidade",
            MemberRole::Member => "member",
        }
    }

    /// Dono e administradores editam a organização e gerem convites.
    pub fn can_manage_organization(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    /// Únicos cargos alcançáveis por convite ou por troca de cargo.
    pub fn is_assignable(self) -> bool {
        matches!(self, MemberRole::Admin | MemberRole::Member)
    }

    /// Matriz de remoção: ninguém remove o dono; admin remove quem não é admin;
    /// dono remove qualquer um; os demais cargos não removem ninguém.
    pub fn can_remove(self, target: MemberRole) -> bool {
        match (self, target) {
            (_, MemberRole::Owner) => false,
            (MemberRole::Owner, _) => true,
            (MemberRole::Admin, MemberRole::Admin) => false,
            (MemberRole::Admin, _) => true,
            _ => false,
        }
    }

    pub fn can_change_role_of(self, target: MemberRole) -> bool {
        self == MemberRole::Owner && target != MemberRole::Owner
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// 2. Organization (A "Concessionária")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,

    #[schema(example = "Auto Center São Paulo")]
    pub name: String,

    #[schema(example = "auto-center-sao-paulo-k3x9a")]
    pub slug: String,

    pub owner_id: Uuid,

    #[schema(example = "11987654321")]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,

    #[schema(example = "free")]
    pub plan: String,

    #[schema(example = 5)]
    pub max_members: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Membros + convites pendentes não podem atingir `max_members`.
    pub fn ensure_capacity(&self, members: i64, pending_invitations: i64) -> Result<(), AppError> {
        if members + pending_invitations >= i64::from(self.max_members) {
            return Err(AppError::MemberLimitReached(self.max_members));
        }
        Ok(())
    }
}

// Dados para o INSERT (slug já calculado pelo serviço)
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub slug: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub max_members: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
}

// ---
// 3. Membership (A "Ponte" Usuário-Organização)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub invited_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Membro + perfil de exibição
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub invited_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

// ---
// 4. Invitation (O "Convite")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub organization_id: Uuid,

    #[schema(example = "novo.vendedor@gmail.com")]
    pub email: String,

    pub role: MemberRole,

    // Credencial do tipo "bearer": só sai na URL do convite
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token: String,

    // Fica nulo se quem convidou apagar a conta
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.email.trim().to_lowercase() == email.trim().to_lowercase()
    }

    /// Regras de resgate: o e-mail do convite precisa ser o do usuário autenticado
    /// e o usuário não pode pertencer a nenhuma organização.
    pub fn ensure_redeemable_by(
        &self,
        caller_email: &str,
        current_organization: Option<&OrganizationSummary>,
    ) -> Result<(), AppError> {
        if !self.is_addressed_to(caller_email) {
            return Err(AppError::InvitationEmailMismatch);
        }
        if let Some(org) = current_organization {
            return Err(AppError::AlreadyInOrganization(Some(org.name.clone())));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub organization_id: Uuid,
    pub email: String,
    pub role: MemberRole,
    pub token: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Ordem das checagens na emissão: capacidade, membro existente, convite pendente.
pub fn ensure_invitation_allowed(
    organization: &Organization,
    members: i64,
    pending_invitations: i64,
    email_is_member: bool,
    email_has_pending_invitation: bool,
    email: &str,
) -> Result<(), AppError> {
    organization.ensure_capacity(members, pending_invitations)?;

    if email_is_member {
        return Err(AppError::UserAlreadyMember(email.to_string()));
    }
    if email_has_pending_invitation {
        return Err(AppError::InvitationAlreadyPending(email.to_string()));
    }
    Ok(())
}

// O que a página pública /invite/{token} mostra
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDetails {
    pub email: String,
    pub role: MemberRole,
    pub organization: OrganizationSummary,
    pub expires_at: DateTime<Utc>,
}

// Resposta do POST /invite
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationIssued {
    pub invitation: Invitation,
    #[schema(example = "http://localhost:3000/invite/9f86d081884c7d659a2feaa0c55ad015...")]
    pub invite_url: String,
    pub message: String,
}

// Resposta do POST /accept
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationAccepted {
    pub membership: Membership,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Resposta do GET /api/organizations
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationOverview {
    pub organization: Organization,
    pub members: Vec<MemberProfile>,
    pub invitations: Vec<Invitation>,
    pub role: MemberRole,
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 120, message = "O nome da organização é obrigatório."))]
    #[schema(example = "Auto Center São Paulo")]
    pub name: String,

    #[schema(example = "(11) 98765-4321")]
    pub phone: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 120, message = "O nome da organização não pode ser vazio."))]
    pub name: Option<String>,
    pub phone: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "novo.vendedor@gmail.com")]
    pub email: String,

    #[schema(example = "member")]
    pub role: MemberRole,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    pub member_id: Uuid,
    #[schema(example = "admin")]
    pub role: MemberRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use MemberRole::*;

    const ALL: [MemberRole; 6] = [Owner, Admin, Vendedor, Rh, Contabilidade, Member];

    fn organization(max_members: i32) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Org".into(),
            slug: "org-abcde".into(),
            owner_id: Uuid::new_v4(),
            phone: None,
            email: None,
            website: None,
            address: None,
            logo_url: None,
            plan: "free".into(),
            max_members,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nobody_removes_the_owner() {
        for caller in ALL {
            assert!(!caller.can_remove(Owner), "{caller} removed the owner");
            assert!(!caller.can_change_role_of(Owner));
        }
    }

    #[test]
    fn removal_matrix() {
        for target in [Admin, Vendedor, Rh, Contabilidade, Member] {
            assert!(Owner.can_remove(target));
        }

        assert!(!Admin.can_remove(Admin));
        for target in [Vendedor, Rh, Contabilidade, Member] {
            assert!(Admin.can_remove(target));
        }

        for caller in [Vendedor, Rh, Contabilidade, Member] {
            for target in ALL {
                assert!(!caller.can_remove(target));
            }
        }
    }

    #[test]
    fn only_owner_changes_roles() {
        for caller in [Admin, Vendedor, Rh, Contabilidade, Member] {
            for target in ALL {
                assert!(!caller.can_change_role_of(target));
            }
        }
        assert!(Owner.can_change_role_of(Admin));
        assert!(Owner.can_change_role_of(Member));
    }

    #[test]
    fn only_generic_roles_are_assignable() {
        let assignable: Vec<_> = ALL.into_iter().filter(|r| r.is_assignable()).collect();
        assert_eq!(assignable, vec![Admin, Member]);
    }

    #[test]
    fn capacity_counts_pending_invitations() {
        let org = organization(3);
        assert!(org.ensure_capacity(2, 0).is_ok());
        assert!(matches!(org.ensure_capacity(2, 1), Err(AppError::MemberLimitReached(3))));
        assert!(matches!(org.ensure_capacity(3, 0), Err(AppError::MemberLimitReached(3))));
    }

    #[test]
    fn capacity_is_checked_before_duplicates() {
        let org = organization(2);
        let err = ensure_invitation_allowed(&org, 1, 1, true, true, "a@b.com").unwrap_err();
        assert!(matches!(err, AppError::MemberLimitReached(2)));

        let org = organization(10);
        let err = ensure_invitation_allowed(&org, 1, 1, true, true, "a@b.com").unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyMember(_)));

        let err = ensure_invitation_allowed(&org, 1, 1, false, true, "a@b.com").unwrap_err();
        assert!(matches!(err, AppError::InvitationAlreadyPending(_)));
    }

    #[test]
    fn redemption_compares_email_case_insensitively() {
        let invitation = Invitation {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            email: "Maria@Loja.com".into(),
            role: Member,
            token: "t".into(),
            invited_by: Some(Uuid::new_v4()),
            expires_at: Utc::now(),
            created_at: Utc::now(),
        };

        assert!(invitation.ensure_redeemable_by("maria@loja.COM", None).is_ok());
        assert!(matches!(
            invitation.ensure_redeemable_by("outra@loja.com", None),
            Err(AppError::InvitationEmailMismatch)
        ));

        let current = OrganizationSummary {
            id: Uuid::new_v4(),
            name: "Org1".into(),
            slug: "org1-aaaaa".into(),
            logo_url: None,
        };
        match invitation.ensure_redeemable_by("maria@loja.com", Some(&current)) {
            Err(AppError::AlreadyInOrganization(Some(name))) => assert_eq!(name, "Org1"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
