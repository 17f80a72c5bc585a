// src/services/inventory_service.rs

use uuid::Uuid;

use crate::{
    common::{error::AppError, formatting::{non_blank, normalize_plate}},
    db::VehicleRepository,
    models::inventory::{Vehicle, VehicleFields, VehiclePayload, VehicleStatus},
};

#[derive(Clone)]
pub struct VehicleService {
    repo: VehicleRepository,
}

impl VehicleService {
    pub fn new(repo: VehicleRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, payload: VehiclePayload) -> Result<Vehicle, AppError> {
        let fields = vehicle_fields(payload)?;

        // Obrigatórios só no cadastro
        if fields.brand.is_none() {
            return Err(AppError::MissingField("brand"));
        }
        if fields.model.is_none() {
            return Err(AppError::MissingField("model"));
        }
        if fields.year.is_none() {
            return Err(AppError::MissingField("year"));
        }
        if fields.price.is_none() {
            return Err(AppError::MissingField("price"));
        }

        let vehicle = self.repo.create(user_id, &fields).await?;
        tracing::info!("🚗 Veículo {} cadastrado por {}.", vehicle.id, user_id);
        Ok(vehicle)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<VehicleStatus>,
    ) -> Result<Vec<Vehicle>, AppError> {
        self.repo.list(user_id, status).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Vehicle, AppError> {
        self.repo
            .find(user_id, id)
            .await?
            .ok_or(AppError::RecordNotFound("Veículo"))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        payload: VehiclePayload,
    ) -> Result<Vehicle, AppError> {
        let fields = vehicle_fields(payload)?;
        self.repo
            .update(user_id, id, &fields)
            .await?
            .ok_or(AppError::RecordNotFound("Veículo"))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(user_id, id).await? {
            return Err(AppError::RecordNotFound("Veículo"));
        }
        tracing::info!("🚗 Veículo {} removido por {}.", id, user_id);
        Ok(())
    }
}

// Texto vazio vira "não informado"
/// Normaliza o payload do formulário (placa e preço mascarados).
fn vehicle_fields(payload: VehiclePayload) -> Result<VehicleFields, AppError> {
    let plate = non_blank(payload.plate)
        .map(|p| normalize_plate(&p))
        .transpose()?;
    let price = payload.price.map(|p| p.to_decimal()).transpose()?;

    let images = payload.images.map(|urls| {
        urls.into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect()
    });

    Ok(VehicleFields {
        brand: non_blank(payload.brand),
        model: non_blank(payload.model),
        year: payload.year,
        plate,
        color: non_blank(payload.color),
        mileage: payload.mileage,
        price,
        status: payload.status,
        fuel: non_blank(payload.fuel),
        transmission: non_blank(payload.transmission),
        description: non_blank(payload.description),
        images,
    })
}
