// src/db/inventory_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Vehicle, VehicleFields, VehicleStatus},
};

// Estoque de veículos. Tudo é filtrado pelo dono do registro.
#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, fields: &VehicleFields) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                user_id, brand, model, year, plate, color, mileage, price,
                status, fuel, transmission, description, images
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                COALESCE($9, 'available'::vehicle_status), $10, $11, $12, COALESCE($13, '{}'::text[])
            )
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&fields.brand)
        .bind(&fields.model)
        .bind(fields.year)
        .bind(&fields.plate)
        .bind(&fields.color)
        .bind(fields.mileage)
        .bind(fields.price)
        .bind(fields.status)
        .bind(&fields.fuel)
        .bind(&fields.transmission)
        .bind(&fields.description)
        .bind(&fields.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Mais novos primeiro; `status` opcional filtra a vitrine.
    pub async fn list(&self, user_id: Uuid, status: Option<VehicleStatus>) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE user_id = $1 AND ($2::vehicle_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: &VehicleFields,
    ) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                year = COALESCE($5, year),
                plate = COALESCE($6, plate),
                color = COALESCE($7, color),
                mileage = COALESCE($8, mileage),
                price = COALESCE($9, price),
                status = COALESCE($10, status),
                fuel = COALESCE($11, fuel),
                transmission = COALESCE($12, transmission),
                description = COALESCE($13, description),
                images = COALESCE($14, images),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&fields.brand)
        .bind(&fields.model)
        .bind(fields.year)
        .bind(&fields.plate)
        .bind(&fields.color)
        .bind(fields.mileage)
        .bind(fields.price)
        .bind(fields.status)
        .bind(&fields.fuel)
        .bind(&fields.transmission)
        .bind(&fields.description)
        .bind(&fields.images)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM vehicles WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
