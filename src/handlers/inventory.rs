// src/handlers/inventory.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        extract::{AppJson, AppPath, AppQuery},
        i18n::Locale,
    },
    models::inventory::{VehicleView, VehicleFilter, VehiclePayload},
};

// POST /api/vehicles
#[utoipa::path(
    post,
    path = "/api/vehicles",
    tag = "Vehicles",
    request_body = VehiclePayload,
    responses(
        (status = 201, description = "Veículo cadastrado", body = VehicleView),
        (status = 400, description = "Dados inválidos (placa, preço, campos obrigatórios)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let vehicle = app_state
        .vehicle_service
        .create(user.id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(VehicleView::from(vehicle))))
}

// GET /api/vehicles?status=
#[utoipa::path(
    get,
    path = "/api/vehicles",
    tag = "Vehicles",
    params(VehicleFilter),
    responses(
        (status = 200, description = "Veículos do usuário, mais recentes primeiro", body = Vec<VehicleView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vehicles(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppQuery(filter): AppQuery<VehicleFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicles = app_state
        .vehicle_service
        .list(user.id, filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(vehicles.into_iter().map(VehicleView::from).collect::<Vec<_>>())))
}

// GET /api/vehicles/{id}
#[utoipa::path(
    get,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 200, description = "Veículo", body = VehicleView),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = app_state
        .vehicle_service
        .get(user.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(VehicleView::from(vehicle))))
}

// PUT /api/vehicles/{id}
#[utoipa::path(
    put,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    request_body = VehiclePayload,
    responses(
        (status = 200, description = "Veículo atualizado (apenas os campos enviados)", body = VehicleView),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<VehiclePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let vehicle = app_state
        .vehicle_service
        .update(user.id, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(VehicleView::from(vehicle))))
}

// DELETE /api/vehicles/{id}
#[utoipa::path(
    delete,
    path = "/api/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = Uuid, Path, description = "ID do veículo")),
    responses(
        (status = 204, description = "Veículo removido"),
        (status = 404, description = "Veículo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .vehicle_service
        .delete(user.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
