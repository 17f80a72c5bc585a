// src/db/memory_store.rs
//
// Implementação em memória do OrganizationStore para os testes dos serviços.
// Um único Mutex faz o papel da transação: cada operação composta roda inteira
// com o lock tomado.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::organization_store::OrganizationStore,
    models::{
        auth::User,
        organization::{
            ensure_invitation_allowed, Invitation, InvitationDetails, MemberProfile, MemberRole,
            Membership, NewInvitation, NewOrganization, Organization, OrganizationSummary,
            UpdateOrganizationRequest,
        },
    },
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    memberships: HashMap<Uuid, Membership>,
    invitations: HashMap<Uuid, Invitation>,
}

impl MemoryState {
    fn summary(&self, organization_id: Uuid) -> Option<OrganizationSummary> {
        self.organizations.get(&organization_id).map(|o| OrganizationSummary {
            id: o.id,
            name: o.name.clone(),
            slug: o.slug.clone(),
            logo_url: o.logo_url.clone(),
        })
    }

    fn membership_of(&self, user_id: Uuid) -> Option<&Membership> {
        self.memberships.values().find(|m| m.user_id == user_id)
    }
}

#[derive(Default)]
pub struct InMemoryOrganizationStore {
    state: Mutex<MemoryState>,
}

impl InMemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("lock poisoned")))
    }

    /// Cadastra um usuário de teste (o "provedor de identidade").
    pub fn add_user(&self, email: &str, full_name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: String::new(),
            full_name: Some(full_name.to_string()),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .expect("lock poisoned")
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Insere um convite sem passar pelas regras (ex.: um convite já vencido).
    pub fn insert_invitation(&self, invitation: Invitation) {
        self.state
            .lock()
            .expect("lock poisoned")
            .invitations
            .insert(invitation.id, invitation);
    }

    pub fn set_max_members(&self, organization_id: Uuid, max_members: i32) {
        if let Some(org) = self
            .state
            .lock()
            .expect("lock poisoned")
            .organizations
            .get_mut(&organization_id)
        {
            org.max_members = max_members;
        }
    }

    pub fn member_count(&self, organization_id: Uuid) -> usize {
        self.state
            .lock()
            .expect("lock poisoned")
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .count()
    }

    pub fn owner_count(&self, organization_id: Uuid) -> usize {
        self.state
            .lock()
            .expect("lock poisoned")
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id && m.role == MemberRole::Owner)
            .count()
    }
}

#[async_trait]
impl OrganizationStore for InMemoryOrganizationStore {
    async fn create_with_owner(
        &self,
        new: NewOrganization,
        owner_id: Uuid,
    ) -> Result<(Organization, Membership), AppError> {
        let mut state = self.lock()?;

        if state.organizations.values().any(|o| o.slug == new.slug) {
            return Err(AppError::SlugAlreadyExists);
        }
        if state.membership_of(owner_id).is_some() {
            return Err(AppError::AlreadyInOrganization(None));
        }

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: new.name,
            slug: new.slug,
            owner_id,
            phone: new.phone,
            email: new.email,
            website: new.website,
            address: new.address,
            logo_url: new.logo_url,
            plan: "free".to_string(),
            max_members: new.max_members,
            created_at: now,
            updated_at: now,
        };
        let membership = Membership {
            id: Uuid::new_v4(),
            organization_id: organization.id,
            user_id: owner_id,
            role: MemberRole::Owner,
            invited_by: None,
            created_at: now,
        };

        state.organizations.insert(organization.id, organization.clone());
        state.memberships.insert(membership.id, membership.clone());

        Ok((organization, membership))
    }

    async fn find_membership_by_user(&self, user_id: Uuid) -> Result<Option<Membership>, AppError> {
        Ok(self.lock()?.membership_of(user_id).cloned())
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        Ok(self.lock()?.organizations.get(&id).cloned())
    }

    async fn update_organization(
        &self,
        id: Uuid,
        changes: &UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let mut state = self.lock()?;
        let org = state.organizations.get_mut(&id).ok_or(AppError::NoOrganization)?;

        if let Some(name) = &changes.name {
            org.name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            org.phone = Some(phone.clone());
        }
        if let Some(email) = &changes.email {
            org.email = Some(email.clone());
        }
        if let Some(website) = &changes.website {
            org.website = Some(website.clone());
        }
        if let Some(address) = &changes.address {
            org.address = Some(address.clone());
        }
        if let Some(logo_url) = &changes.logo_url {
            org.logo_url = Some(logo_url.clone());
        }
        org.updated_at = Utc::now();

        Ok(org.clone())
    }

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<MemberProfile>, AppError> {
        let state = self.lock()?;
        let mut members: Vec<MemberProfile> = state
            .memberships
            .values()
            .filter(|m| m.organization_id == organization_id)
            .filter_map(|m| {
                state.users.get(&m.user_id).map(|u| MemberProfile {
                    id: m.id,
                    organization_id: m.organization_id,
                    user_id: m.user_id,
                    role: m.role,
                    invited_by: m.invited_by,
                    created_at: m.created_at,
                    email: u.email.clone(),
                    full_name: u.full_name.clone(),
                    avatar_url: u.avatar_url.clone(),
                })
            })
            .collect();
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }

    async fn find_member(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        Ok(self
            .lock()?
            .memberships
            .get(&member_id)
            .filter(|m| m.organization_id == organization_id)
            .cloned())
    }

    async fn delete_member(&self, organization_id: Uuid, member_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let removable = state
            .memberships
            .get(&member_id)
            .is_some_and(|m| m.organization_id == organization_id && m.role != MemberRole::Owner);

        if removable {
            state.memberships.remove(&member_id);
        }
        Ok(removable)
    }

    async fn update_member_role(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Membership>, AppError> {
        let mut state = self.lock()?;
        match state.memberships.get_mut(&member_id) {
            Some(m) if m.organization_id == organization_id && m.role != MemberRole::Owner => {
                m.role = role;
                Ok(Some(m.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_pending_invitations(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, AppError> {
        let state = self.lock()?;
        let mut invitations: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|i| i.organization_id == organization_id && i.is_pending(now))
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn issue_invitation(
        &self,
        new: NewInvitation,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let mut state = self.lock()?;

        let organization = state
            .organizations
            .get(&new.organization_id)
            .cloned()
            .ok_or(AppError::NoOrganization)?;

        state
            .invitations
            .retain(|_, i| i.organization_id != new.organization_id || i.is_pending(now));

        let members = state
            .memberships
            .values()
            .filter(|m| m.organization_id == new.organization_id)
            .count() as i64;

        let pending: Vec<&Invitation> = state
            .invitations
            .values()
            .filter(|i| i.organization_id == new.organization_id)
            .collect();

        let email_is_member = state.memberships.values().any(|m| {
            m.organization_id == new.organization_id
                && state
                    .users
                    .get(&m.user_id)
                    .is_some_and(|u| u.email.to_lowercase() == new.email.to_lowercase())
        });
        let email_has_pending_invitation = pending.iter().any(|i| i.is_addressed_to(&new.email));

        ensure_invitation_allowed(
            &organization,
            members,
            pending.len() as i64,
            email_is_member,
            email_has_pending_invitation,
            &new.email,
        )?;

        let invitation = Invitation {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            email: new.email,
            role: new.role,
            token: new.token,
            invited_by: Some(new.invited_by),
            expires_at: new.expires_at,
            created_at: now,
        };
        state.invitations.insert(invitation.id, invitation.clone());

        Ok(invitation)
    }

    async fn delete_invitation(
        &self,
        organization_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let owned = state
            .invitations
            .get(&invitation_id)
            .is_some_and(|i| i.organization_id == organization_id);

        if owned {
            state.invitations.remove(&invitation_id);
        }
        Ok(owned)
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InvitationDetails>, AppError> {
        let state = self.lock()?;
        let details = state
            .invitations
            .values()
            .find(|i| i.token == token && i.is_pending(now))
            .and_then(|i| {
                state.summary(i.organization_id).map(|organization| InvitationDetails {
                    email: i.email.clone(),
                    role: i.role,
                    organization,
                    expires_at: i.expires_at,
                })
            });
        Ok(details)
    }

    async fn redeem_invitation(
        &self,
        token: &str,
        caller: &User,
        now: DateTime<Utc>,
    ) -> Result<Membership, AppError> {
        let mut state = self.lock()?;

        let invitation = state
            .invitations
            .values()
            .find(|i| i.token == token && i.is_pending(now))
            .cloned()
            .ok_or(AppError::InvitationInvalid)?;

        let current = state
            .membership_of(caller.id)
            .and_then(|m| state.summary(m.organization_id));

        invitation.ensure_redeemable_by(&caller.email, current.as_ref())?;

        let membership = Membership {
            id: Uuid::new_v4(),
            organization_id: invitation.organization_id,
            user_id: caller.id,
            role: invitation.role,
            invited_by: invitation.invited_by,
            created_at: now,
        };
        state.memberships.insert(membership.id, membership.clone());
        state.invitations.remove(&invitation.id);

        Ok(membership)
    }
}
