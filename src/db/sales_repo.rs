// src/db/sales_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{Sale, SaleFields},
};

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, fields: &SaleFields) -> Result<Sale, AppError> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (
                user_id, vehicle_id, lead_id, customer_name, customer_cpf,
                sale_price, payment_method, sale_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, CURRENT_DATE), $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(fields.vehicle_id)
        .bind(fields.lead_id)
        .bind(&fields.customer_name)
        .bind(&fields.customer_cpf)
        .bind(fields.sale_price)
        .bind(&fields.payment_method)
        .bind(fields.sale_date)
        .bind(&fields.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(sale)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE user_id = $1 ORDER BY sale_date DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> Result<Option<Sale>, AppError> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, fields: &SaleFields) -> Result<Option<Sale>, AppError> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET
                vehicle_id = COALESCE($3, vehicle_id),
                lead_id = COALESCE($4, lead_id),
                customer_name = COALESCE($5, customer_name),
                customer_cpf = COALESCE($6, customer_cpf),
                sale_price = COALESCE($7, sale_price),
                payment_method = COALESCE($8, payment_method),
                sale_date = COALESCE($9, sale_date),
                notes = COALESCE($10, notes)
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(fields.vehicle_id)
        .bind(fields.lead_id)
        .bind(&fields.customer_name)
        .bind(&fields.customer_cpf)
        .bind(fields.sale_price)
        .bind(&fields.payment_method)
        .bind(fields.sale_date)
        .bind(&fields.notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
