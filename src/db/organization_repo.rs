// src/db/organization_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::is_unique_violation, error::AppError},
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

const SLUG_CONSTRAINT: &str = "organizations_slug_key";
const PENDING_EMAIL_INDEX: &str = "organization_invitations_org_email_idx";

// Linha "achatada" do JOIN convite + organização
#[derive(FromRow)]
struct InvitationDetailsRow {
    email: String,
    role: MemberRole,
    expires_at: DateTime<Utc>,
    organization_id: Uuid,
    organization_name: String,
    organization_slug: String,
    organization_logo_url: Option<String>,
}

impl From<InvitationDetailsRow> for InvitationDetails {
    fn from(row: InvitationDetailsRow) -> Self {
        InvitationDetails {
            email: row.email,
            role: row.role,
            expires_at: row.expires_at,
            organization: OrganizationSummary {
                id: row.organization_id,
                name: row.organization_name,
                slug: row.organization_slug,
                logo_url: row.organization_logo_url,
            },
        }
    }
}

// O repositório de organizações, responsável pelas tabelas
// 'organizations', 'memberships' e 'organization_invitations'
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn create_with_owner(
        &self,
        new: NewOrganization,
        owner_id: Uuid,
    ) -> Result<(Organization, Membership), AppError> {
        // 1. Inicia a transação: organização e dono nascem juntos ou não nascem
        let mut tx = self.pool.begin().await?;

        // 2. Cria a organização
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, slug, owner_id, phone, email, website, address, logo_url, max_members)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(owner_id)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.website)
        .bind(&new.address)
        .bind(&new.logo_url)
        .bind(new.max_members)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some(SLUG_CONSTRAINT)) {
                return AppError::SlugAlreadyExists;
            }
            e.into()
        })?;

        // 3. Vincula o criador como dono (se falhar, o drop do tx faz rollback)
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(organization.id)
        .bind(owner_id)
        .bind(MemberRole::Owner)
        .fetch_one(&mut *tx)
        .await?;

        // 4. Commit
        tx.commit().await?;

        Ok((organization, membership))
    }

    async fn find_membership_by_user(&self, user_id: Uuid) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(membership)
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(organization)
    }

    async fn update_organization(
        &self,
        id: Uuid,
        changes: &UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        // Só os campos enviados mudam
        sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                website = COALESCE($5, website),
                address = COALESCE($6, address),
                logo_url = COALESCE($7, logo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(&changes.website)
        .bind(&changes.address)
        .bind(&changes.logo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NoOrganization)
    }

    async fn list_members(&self, organization_id: Uuid) -> Result<Vec<MemberProfile>, AppError> {
        let members = sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.role, m.invited_by, m.created_at,
                   u.email, u.full_name, u.avatar_url
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn find_member(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE id = $1 AND organization_id = $2",
        )
        .bind(member_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn delete_member(&self, organization_id: Uuid, member_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM memberships WHERE id = $1 AND organization_id = $2 AND role <> 'owner'",
        )
        .bind(member_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_member_role(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships SET role = $3
            WHERE id = $1 AND organization_id = $2 AND role <> 'owner'
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(organization_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn list_pending_invitations(
        &self,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, AppError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT * FROM organization_invitations
            WHERE organization_id = $1 AND expires_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    async fn issue_invitation(
        &self,
        new: NewInvitation,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a organização: emissões concorrentes fazem fila aqui
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(new.organization_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NoOrganization)?;

        // 2. Convites vencidos dessa organização são lixo
        sqlx::query("DELETE FROM organization_invitations WHERE organization_id = $1 AND expires_at <= $2")
            .bind(new.organization_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        // 3. Contagens para a regra de capacidade
        let (members, pending): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM memberships WHERE organization_id = $1),
                (SELECT COUNT(*) FROM organization_invitations WHERE organization_id = $1 AND expires_at > $2)
            "#,
        )
        .bind(new.organization_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let email_is_member: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM memberships m
                JOIN users u ON u.id = m.user_id
                WHERE m.organization_id = $1 AND lower(u.email) = lower($2)
            )
            "#,
        )
        .bind(new.organization_id)
        .bind(&new.email)
        .fetch_one(&mut *tx)
        .await?;

        let email_has_pending_invitation: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM organization_invitations
                WHERE organization_id = $1 AND lower(email) = lower($2) AND expires_at > $3
            )
            "#,
        )
        .bind(new.organization_id)
        .bind(&new.email)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        ensure_invitation_allowed(
            &organization,
            members,
            pending,
            email_is_member,
            email_has_pending_invitation,
            &new.email,
        )?;

        // 4. Insere (o índice único é a última barreira)
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO organization_invitations (organization_id, email, role, token, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.organization_id)
        .bind(&new.email)
        .bind(new.role)
        .bind(&new.token)
        .bind(new.invited_by)
        .bind(new.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some(PENDING_EMAIL_INDEX)) {
                return AppError::InvitationAlreadyPending(new.email.clone());
            }
            e.into()
        })?;

        tx.commit().await?;

        Ok(invitation)
    }

    async fn delete_invitation(
        &self,
        organization_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<bool, AppError> {
        // O filtro por organização impede revogar convite alheio com um id adivinhado
        let result = sqlx::query("DELETE FROM organization_invitations WHERE id = $1 AND organization_id = $2")
            .bind(invitation_id)
            .bind(organization_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InvitationDetails>, AppError> {
        let row = sqlx::query_as::<_, InvitationDetailsRow>(
            r#"
            SELECT i.email, i.role, i.expires_at,
                   o.id AS organization_id,
                   o.name AS organization_name,
                   o.slug AS organization_slug,
                   o.logo_url AS organization_logo_url
            FROM organization_invitations i
            JOIN organizations o ON o.id = i.organization_id
            WHERE i.token = $1 AND i.expires_at > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InvitationDetails::from))
    }

    async fn redeem_invitation(
        &self,
        token: &str,
        caller: &User,
        now: DateTime<Utc>,
    ) -> Result<Membership, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava o convite (dois aceites simultâneos não passam juntos)
        let invitation = sqlx::query_as::<_, Invitation>(
            "SELECT * FROM organization_invitations WHERE token = $1 AND expires_at > $2 FOR UPDATE",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::InvitationInvalid)?;

        // 2. Organização atual do usuário, se houver
        let current = sqlx::query_as::<_, OrganizationSummary>(
            r#"
            SELECT o.id, o.name, o.slug, o.logo_url
            FROM memberships m
            JOIN organizations o ON o.id = m.organization_id
            WHERE m.user_id = $1
            "#,
        )
        .bind(caller.id)
        .fetch_optional(&mut *tx)
        .await?;

        invitation.ensure_redeemable_by(&caller.email, current.as_ref())?;

        // 3. Cria o vínculo com o cargo do convite
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (organization_id, user_id, role, invited_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(invitation.organization_id)
        .bind(caller.id)
        .bind(invitation.role)
        .bind(invitation.invited_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, None) {
                return AppError::AlreadyInOrganization(None);
            }
            e.into()
        })?;

        // 4. O convite é consumido
        sqlx::query("DELETE FROM organization_invitations WHERE id = $1")
            .bind(invitation.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(membership)
    }
}
