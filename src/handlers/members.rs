// src/handlers/members.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        extract::{AppJson, AppQuery},
        i18n::Locale,
        tenancy::OrganizationContext,
    },
    models::organization::{ChangeRoleRequest, MemberProfile, Membership, MessageResponse},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberIdQuery {
    /// ID do vínculo (membership), não do usuário
    pub id: Uuid,
}

// GET /api/organizations/members
#[utoipa::path(
    get,
    path = "/api/organizations/members",
    tag = "Members",
    responses(
        (status = 200, description = "Membros com perfil", body = Vec<MemberProfile>),
        (status = 404, description = "Usuário sem organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .membership_service
        .list(&membership)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(members)))
}

// DELETE /api/organizations/members?id=
#[utoipa::path(
    delete,
    path = "/api/organizations/members",
    tag = "Members",
    params(MemberIdQuery),
    responses(
        (status = 200, description = "Membro removido", body = MessageResponse),
        (status = 403, description = "Cargo insuficiente ou alvo é o dono"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
    AppQuery(query): AppQuery<MemberIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .membership_service
        .remove(&membership, query.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = locale.lang().pick("Membro removido.", "Member removed.");
    Ok((StatusCode::OK, Json(MessageResponse { message })))
}

// PATCH /api/organizations/members
#[utoipa::path(
    patch,
    path = "/api/organizations/members",
    tag = "Members",
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Cargo alterado", body = Membership),
        (status = 400, description = "Cargo não atribuível"),
        (status = 403, description = "Apenas o dono altera cargos; o dono não pode ser alterado"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_member_role(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
    AppJson(payload): AppJson<ChangeRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .membership_service
        .set_role(&membership, payload.member_id, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(updated)))
}
