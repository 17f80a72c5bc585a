// src/db/crm_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Lead, LeadFields, LeadStatus},
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, fields: &LeadFields) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                user_id, name, email, phone, cpf, cep, address,
                vehicle_id, source, notes, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'new'::lead_status))
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.cpf)
        .bind(&fields.cep)
        .bind(&fields.address)
        .bind(fields.vehicle_id)
        .bind(&fields.source)
        .bind(&fields.notes)
        .bind(fields.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn list(&self, user_id: Uuid, status: Option<LeadStatus>) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE user_id = $1 AND ($2::lead_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, fields: &LeadFields) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                cpf = COALESCE($6, cpf),
                cep = COALESCE($7, cep),
                address = COALESCE($8, address),
                vehicle_id = COALESCE($9, vehicle_id),
                source = COALESCE($10, source),
                notes = COALESCE($11, notes),
                status = COALESCE($12, status),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.cpf)
        .bind(&fields.cep)
        .bind(&fields.address)
        .bind(fields.vehicle_id)
        .bind(&fields.source)
        .bind(&fields.notes)
        .bind(fields.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lead)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM leads WHERE id = $1 AND user_id = $2)")
            .bind(id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
