// src/services/invitation_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrganizationStore,
    models::{
        auth::User,
        organization::{
            Invitation, InvitationDetails, InviteMemberRequest, Membership, NewInvitation,
        },
    },
};

const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn OrganizationStore>,
    app_url: String,
    expiry: Duration,
}

impl InvitationService {
    pub fn new(store: Arc<dyn OrganizationStore>, app_url: &str, expiry_days: i64) -> Self {
        Self {
            store,
            app_url: app_url.trim_end_matches('/').to_string(),
            expiry: Duration::days(expiry_days),
        }
    }

    pub fn invite_url(&self, token: &str) -> String {
        format!("{}/invite/{}", self.app_url, token)
    }

    /// Emite um convite para a organização de quem chama.
    /// Retorna o convite e a URL que deve ser enviada ao convidado.
    pub async fn invite(
        &self,
        inviter: &Membership,
        request: InviteMemberRequest,
    ) -> Result<(Invitation, String), AppError> {
        if !inviter.role.can_manage_organization() {
            tracing::warn!(
                "Usuário {} ({}) tentou convidar para a organização {}.",
                inviter.user_id,
                inviter.role,
                inviter.organization_id
            );
            return Err(AppError::InsufficientRole);
        }
        if !request.role.is_assignable() {
            return Err(AppError::RoleNotAssignable(request.role));
        }

        let email = request.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }

        let now = Utc::now();
        let new = NewInvitation {
            organization_id: inviter.organization_id,
            email,
            role: request.role,
            token: generate_token(),
            invited_by: inviter.user_id,
            expires_at: now + self.expiry,
        };

        let invitation = self.store.issue_invitation(new, now).await?;
        let url = self.invite_url(&invitation.token);

        tracing::info!(
            "✉️ Convite {} emitido para a organização {} (cargo {}).",
            invitation.id,
            invitation.organization_id,
            invitation.role
        );

        Ok((invitation, url))
    }

    pub async fn revoke(&self, revoker: &Membership, invitation_id: Uuid) -> Result<(), AppError> {
        if !revoker.role.can_manage_organization() {
            return Err(AppError::InsufficientRole);
        }

        // Convite de outra organização é tratado como inexistente
        if !self
            .store
            .delete_invitation(revoker.organization_id, invitation_id)
            .await?
        {
            return Err(AppError::InvitationNotFound);
        }

        tracing::info!("✉️ Convite {} revogado por {}.", invitation_id, revoker.user_id);
        Ok(())
    }

    /// Consulta pública: qualquer um com o token vê os dados do convite.
    pub async fn details(&self, token: &str) -> Result<InvitationDetails, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvitationInvalid);
        }

        self.store
            .find_invitation_by_token(token, Utc::now())
            .await?
            .ok_or(AppError::InvitationInvalid)
    }

    pub async fn accept(&self, caller: &User, token: &str) -> Result<Membership, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvitationInvalid);
        }

        let membership = self
            .store
            .redeem_invitation(token, caller, Utc::now())
            .await?;

        tracing::info!(
            "🤝 Usuário {} entrou na organização {} como {}.",
            caller.id,
            membership.organization_id,
            membership.role
        );

        Ok(membership)
    }
}

// 32 bytes aleatórios em hexadecimal (64 caracteres)
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryOrganizationStore;
    use crate::models::organization::{CreateOrganizationRequest, MemberRole};
    use crate::services::OrganizationService;

    struct Fixture {
        store: Arc<InMemoryOrganizationStore>,
        invitations: InvitationService,
        owner: User,
        owner_membership: Membership,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryOrganizationStore::new());
        let organizations = OrganizationService::new(store.clone(), 5);
        let invitations = InvitationService::new(store.clone(), "http://localhost:3000/", 7);

        let owner = store.add_user("dono@loja.com", "Dono");
        create_org(&organizations, &owner, "Org1").await;
        let owner_membership = store.find_membership_by_user(owner.id).await.unwrap().unwrap();

        Fixture { store, invitations, owner, owner_membership }
    }

    async fn create_org(service: &OrganizationService, user: &User, name: &str) {
        let request = CreateOrganizationRequest {
            name: name.into(),
            phone: None,
            email: None,
            website: None,
            address: None,
            logo_url: None,
        };
        service.create(user, request).await.unwrap();
    }

    fn invite(email: &str, role: MemberRole) -> InviteMemberRequest {
        InviteMemberRequest { email: email.into(), role }
    }

    #[tokio::test]
    async fn invite_returns_url_with_random_token() {
        let f = fixture().await;

        let (invitation, url) = f
            .invitations
            .invite(&f.owner_membership, invite("  Maria@Loja.com ", MemberRole::Member))
            .await
            .unwrap();

        assert_eq!(invitation.email, "maria@loja.com");
        assert_eq!(invitation.token.len(), 64);
        assert!(invitation.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(url, format!("http://localhost:3000/invite/{}", invitation.token));
        assert_eq!(invitation.invited_by, Some(f.owner.id));
        assert!(invitation.expires_at > Utc::now() + Duration::days(6));
    }

    #[tokio::test]
    async fn invite_rejects_non_assignable_roles() {
        let f = fixture().await;

        for role in [MemberRole::Owner, MemberRole::Vendedor, MemberRole::Rh] {
            let err = f
                .invitations
                .invite(&f.owner_membership, invite("x@loja.com", role))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::RoleNotAssignable(r) if r == role));
        }
    }

    #[tokio::test]
    async fn plain_members_cannot_invite() {
        let f = fixture().await;
        let mut member = f.owner_membership.clone();
        member.role = MemberRole::Member;

        let err = f
            .invitations
            .invite(&member, invite("x@loja.com", MemberRole::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientRole));
    }

    #[tokio::test]
    async fn capacity_counts_pending_invitations() {
        let f = fixture().await;
        f.store.set_max_members(f.owner_membership.organization_id, 3);

        for email in ["a@loja.com", "b@loja.com"] {
            f.invitations
                .invite(&f.owner_membership, invite(email, MemberRole::Member))
                .await
                .unwrap();
        }

        let err = f
            .invitations
            .invite(&f.owner_membership, invite("c@loja.com", MemberRole::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MemberLimitReached(3)));
    }

    #[tokio::test]
    async fn two_members_and_one_pending_fill_three_seats() {
        let f = fixture().await;
        f.store.set_max_members(f.owner_membership.organization_id, 3);
        let maria = f.store.add_user("maria@loja.com", "Maria");

        let (invitation, _) = f
            .invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Member))
            .await
            .unwrap();
        f.invitations.accept(&maria, &invitation.token).await.unwrap();
        f.invitations
            .invite(&f.owner_membership, invite("joao@loja.com", MemberRole::Member))
            .await
            .unwrap();

        let err = f
            .invitations
            .invite(&f.owner_membership, invite("ana@loja.com", MemberRole::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MemberLimitReached(3)));
        assert_eq!(f.store.member_count(f.owner_membership.organization_id), 2);
    }

    #[tokio::test]
    async fn duplicate_pending_invitation_is_rejected() {
        let f = fixture().await;
        f.invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Member))
            .await
            .unwrap();

        let err = f
            .invitations
            .invite(&f.owner_membership, invite("MARIA@loja.com", MemberRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvitationAlreadyPending(_)));
    }

    #[tokio::test]
    async fn existing_member_cannot_be_invited() {
        let f = fixture().await;

        let err = f
            .invitations
            .invite(&f.owner_membership, invite("dono@loja.com", MemberRole::Member))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyMember(_)));
    }

    #[tokio::test]
    async fn accepted_token_cannot_be_fetched_again() {
        let f = fixture().await;
        let maria = f.store.add_user("maria@loja.com", "Maria");

        let (invitation, _) = f
            .invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Admin))
            .await
            .unwrap();

        let details = f.invitations.details(&invitation.token).await.unwrap();
        assert_eq!(details.email, "maria@loja.com");
        assert_eq!(details.organization.name, "Org1");

        let membership = f.invitations.accept(&maria, &invitation.token).await.unwrap();
        assert_eq!(membership.role, MemberRole::Admin);
        assert_eq!(membership.organization_id, f.owner_membership.organization_id);
        assert_eq!(membership.invited_by, Some(f.owner.id));

        let err = f.invitations.details(&invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvitationInvalid));

        let err = f.invitations.accept(&maria, &invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvitationInvalid));
    }

    #[tokio::test]
    async fn accept_requires_matching_email() {
        let f = fixture().await;
        let intruso = f.store.add_user("intruso@loja.com", "Intruso");

        let (invitation, _) = f
            .invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Member))
            .await
            .unwrap();

        let err = f.invitations.accept(&intruso, &invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvitationEmailMismatch));
        assert!(f.invitations.details(&invitation.token).await.is_ok());
    }

    #[tokio::test]
    async fn owner_of_another_organization_cannot_accept() {
        let f = fixture().await;
        let organizations = OrganizationService::new(f.store.clone(), 5);
        let other_owner = f.store.add_user("outro@loja.com", "Outro");
        create_org(&organizations, &other_owner, "Org2").await;

        let (invitation, _) = f
            .invitations
            .invite(&f.owner_membership, invite("outro@loja.com", MemberRole::Member))
            .await
            .unwrap();

        match f.invitations.accept(&other_owner, &invitation.token).await {
            Err(AppError::AlreadyInOrganization(Some(name))) => assert_eq!(name, "Org2"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(f.store.member_count(f.owner_membership.organization_id), 1);
    }

    #[tokio::test]
    async fn invitation_without_inviter_is_still_redeemable() {
        let f = fixture().await;
        let maria = f.store.add_user("maria@loja.com", "Maria");

        f.store.insert_invitation(Invitation {
            id: Uuid::new_v4(),
            organization_id: f.owner_membership.organization_id,
            email: "maria@loja.com".into(),
            role: MemberRole::Admin,
            token: "orfao".into(),
            invited_by: None,
            expires_at: Utc::now() + Duration::days(1),
            created_at: Utc::now(),
        });

        let membership = f.invitations.accept(&maria, "orfao").await.unwrap();
        assert_eq!(membership.role, MemberRole::Admin);
        assert_eq!(membership.invited_by, None);
    }

    #[tokio::test]
    async fn expired_invitation_is_invalid() {
        let f = fixture().await;
        let maria = f.store.add_user("maria@loja.com", "Maria");
        let past = Utc::now() - Duration::days(1);

        f.store.insert_invitation(Invitation {
            id: Uuid::new_v4(),
            organization_id: f.owner_membership.organization_id,
            email: "maria@loja.com".into(),
            role: MemberRole::Member,
            token: "vencido".into(),
            invited_by: Some(f.owner.id),
            expires_at: past,
            created_at: past - Duration::days(7),
        });

        assert!(matches!(
            f.invitations.details("vencido").await,
            Err(AppError::InvitationInvalid)
        ));
        assert!(matches!(
            f.invitations.accept(&maria, "vencido").await,
            Err(AppError::InvitationInvalid)
        ));

        // O convite vencido não conta nem bloqueia um novo
        f.invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Member))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn revoke_only_touches_own_organization() {
        let f = fixture().await;
        let organizations = OrganizationService::new(f.store.clone(), 5);
        let other_owner = f.store.add_user("outro@loja.com", "Outro");
        create_org(&organizations, &other_owner, "Org2").await;
        let other_membership = f.store.find_membership_by_user(other_owner.id).await.unwrap().unwrap();

        let (invitation, _) = f
            .invitations
            .invite(&f.owner_membership, invite("maria@loja.com", MemberRole::Member))
            .await
            .unwrap();

        let err = f.invitations.revoke(&other_membership, invitation.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvitationNotFound));

        f.invitations.revoke(&f.owner_membership, invitation.id).await.unwrap();
        assert!(matches!(
            f.invitations.details(&invitation.token).await,
            Err(AppError::InvitationInvalid)
        ));
    }
}
