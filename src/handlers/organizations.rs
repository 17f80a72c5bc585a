// src/handlers/organizations.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser, extract::AppJson, i18n::Locale, tenancy::OrganizationContext,
    },
    models::organization::{
        CreateOrganizationRequest, Organization, OrganizationOverview, UpdateOrganizationRequest,
    },
};

// GET /api/organizations
#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Organizations",
    responses(
        (status = 200, description = "Organização do usuário, membros, convites pendentes e cargo", body = OrganizationOverview),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Usuário sem organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .organization_service
        .overview(&membership)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(overview)))
}

// POST /api/organizations
#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organização criada; o usuário vira o dono", body = Organization),
        (status = 400, description = "Nome vazio ou usuário já pertence a uma organização"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Nome em branco tem mensagem própria; o resto passa pelo validator
    if payload.name.trim().is_empty() {
        return Err(AppError::OrganizationNameRequired.to_api_error(&locale));
    }
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let organization = app_state
        .organization_service
        .create(&user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(organization)))
}

// PUT /api/organizations
#[utoipa::path(
    put,
    path = "/api/organizations",
    tag = "Organizations",
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organização atualizada", body = Organization),
        (status = 403, description = "Apenas dono ou admin"),
        (status = 404, description = "Usuário sem organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    OrganizationContext(membership): OrganizationContext,
    AppJson(payload): AppJson<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let organization = app_state
        .organization_service
        .update(&membership, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(organization)))
}
