// src/services/organization_service.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::{
        error::AppError,
        formatting::{normalize_phone, organization_slug},
    },
    db::OrganizationStore,
    models::{
        auth::User,
        organization::{
            CreateOrganizationRequest, Membership, NewOrganization, Organization,
            OrganizationOverview, UpdateOrganizationRequest,
        },
    },
};

const SLUG_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn OrganizationStore>,
    default_max_members: i32,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn OrganizationStore>, default_max_members: i32) -> Self {
        Self { store, default_max_members }
    }

    /// LÓGICA DE NEGÓCIO: Cria uma nova organização e, atomicamente,
    /// torna o usuário que a criou o seu dono.
    pub async fn create(
        &self,
        caller: &User,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::OrganizationNameRequired);
        }

        // Um usuário pertence a no máximo uma organização
        if let Some(current) = self.store.find_membership_by_user(caller.id).await? {
            let current_name = self
                .store
                .find_organization(current.organization_id)
                .await?
                .map(|o| o.name);
            return Err(AppError::AlreadyInOrganization(current_name));
        }

        let phone = request.phone.as_deref().map(normalize_phone).transpose()?;

        for _ in 0..SLUG_ATTEMPTS {
            let new = NewOrganization {
                name: name.clone(),
                slug: organization_slug(&name),
                phone: phone.clone(),
                email: request.email.as_ref().map(|e| e.trim().to_lowercase()),
                website: request.website.clone(),
                address: request.address.clone(),
                logo_url: request.logo_url.clone(),
                max_members: self.default_max_members,
            };

            match self.store.create_with_owner(new, caller.id).await {
                Ok((organization, _owner)) => {
                    tracing::info!(
                        "🏢 Organização '{}' ({}) criada por {}.",
                        organization.slug,
                        organization.id,
                        caller.id
                    );
                    return Ok(organization);
                }
                Err(AppError::SlugAlreadyExists) => {
                    tracing::warn!("Slug repetido para '{}', gerando outro sufixo.", name);
                }
                Err(e) => return Err(e),
            }
        }

        Err(anyhow::anyhow!("não foi possível gerar um slug único para '{}'", name).into())
    }

    /// A organização do usuário com membros, convites pendentes e o cargo dele.
    pub async fn overview(&self, membership: &Membership) -> Result<OrganizationOverview, AppError> {
        let organization = self
            .store
            .find_organization(membership.organization_id)
            .await?
            .ok_or(AppError::NoOrganization)?;

        let members = self.store.list_members(organization.id).await?;
        let invitations = self
            .store
            .list_pending_invitations(organization.id, Utc::now())
            .await?;

        Ok(OrganizationOverview {
            organization,
            members,
            invitations,
            role: membership.role,
        })
    }

    /// Sempre atualiza a organização do próprio usuário.
    pub async fn update(
        &self,
        membership: &Membership,
        mut changes: UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        if !membership.role.can_manage_organization() {
            tracing::warn!(
                "Usuário {} ({}) tentou editar a organização {}.",
                membership.user_id,
                membership.role,
                membership.organization_id
            );
            return Err(AppError::InsufficientRole);
        }

        if let Some(name) = &changes.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(AppError::OrganizationNameRequired);
            }
            changes.name = Some(trimmed.to_string());
        }
        changes.phone = changes.phone.as_deref().map(normalize_phone).transpose()?;
        changes.email = changes.email.map(|e| e.trim().to_lowercase());

        let organization = self
            .store
            .update_organization(membership.organization_id, &changes)
            .await?;

        tracing::info!("🏢 Organização {} atualizada por {}.", organization.id, membership.user_id);

        Ok(organization)
    }
}
