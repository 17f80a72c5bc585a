// src/handlers/invitations.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        extract::{AppJson, AppQuery},
        i18n::{Lang, Locale},
        tenancy::OrganizationContext,
    },
    models::organization::{
        AcceptInvitationRequest, InvitationAccepted, InvitationDetails, InvitationIssued,
        InviteMemberRequest, MessageResponse,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvitationIdQuery {
    /// ID do convite
    pub id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvitationTokenQuery {
    /// Token recebido na URL do convite
    pub token: String,
}

// POST /api/organizations/invite
#[utoipa::path(
    post,
    path = "/api/organizations/invite",
    tag = "Invitations",
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Convite emitido", body = InvitationIssued),
        (status = 400, description = "E-mail/cargo inválido, limite de membros, membro ou convite já existente"),
        (status = 403, description = "Apenas dono ou admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_member(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
    AppJson(payload): AppJson<InviteMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let (invitation, invite_url) = app_state
        .invitation_service
        .invite(&membership, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = match locale.lang() {
        Lang::Pt => format!("Convite enviado para {}.", invitation.email),
        Lang::En => format!("Invitation sent to {}.", invitation.email),
    };

    Ok((
        StatusCode::CREATED,
        Json(InvitationIssued { invitation, invite_url, message }),
    ))
}

// DELETE /api/organizations/invite?id=
#[utoipa::path(
    delete,
    path = "/api/organizations/invite",
    tag = "Invitations",
    params(InvitationIdQuery),
    responses(
        (status = 200, description = "Convite revogado", body = MessageResponse),
        (status = 403, description = "Apenas dono ou admin"),
        (status = 404, description = "Convite não encontrado nesta organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
    AppQuery(query): AppQuery<InvitationIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .invitation_service
        .revoke(&membership, query.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = locale.lang().pick("Convite revogado.", "Invitation revoked.");
    Ok((StatusCode::OK, Json(MessageResponse { message })))
}

// GET /api/organizations/accept?token= (público)
#[utoipa::path(
    get,
    path = "/api/organizations/accept",
    tag = "Invitations",
    params(InvitationTokenQuery),
    responses(
        (status = 200, description = "Dados do convite", body = InvitationDetails),
        (status = 400, description = "Convite inválido ou expirado")
    )
)]
pub async fn get_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<InvitationTokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let details = app_state
        .invitation_service
        .details(&query.token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(details)))
}

// POST /api/organizations/accept
#[utoipa::path(
    post,
    path = "/api/organizations/accept",
    tag = "Invitations",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Convite aceito", body = InvitationAccepted),
        (status = 400, description = "Convite inválido/expirado ou usuário já pertence a uma organização"),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Convite destinado a outro e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_invitation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .invitation_service
        .accept(&user, &payload.token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let message = locale
        .lang()
        .pick("Bem-vindo à organização!", "Welcome to the organization!");

    Ok((StatusCode::OK, Json(InvitationAccepted { membership, message })))
}
