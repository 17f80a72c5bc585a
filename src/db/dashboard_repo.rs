// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{DashboardCounts, SalesChartEntry},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Contagens gerais (uma ida ao banco, snapshot consistente)
    pub async fn get_counts(&self, user_id: Uuid) -> Result<DashboardCounts, AppError> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM vehicles WHERE user_id = $1 AND status = 'available') AS available_vehicles,
                (SELECT COUNT(*) FROM vehicles WHERE user_id = $1 AND status = 'reserved')  AS reserved_vehicles,
                (SELECT COUNT(*) FROM vehicles WHERE user_id = $1 AND status = 'sold')      AS sold_vehicles,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'new')          AS new_leads,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'contacted')    AS contacted_leads,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'interested')   AS interested_leads,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'negotiating')  AS negotiating_leads,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'closed')       AS closed_leads,
                (SELECT COUNT(*) FROM leads WHERE user_id = $1 AND status = 'lost')         AS lost_leads,
                (SELECT COUNT(*) FROM sales WHERE user_id = $1)                             AS total_sales,
                (SELECT COALESCE(SUM(sale_price), 0) FROM sales WHERE user_id = $1)         AS revenue
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    // 2. Vendas por dia nos últimos 30 dias
    pub async fn get_sales_last_30_days(&self, user_id: Uuid) -> Result<Vec<SalesChartEntry>, AppError> {
        let entries = sqlx::query_as::<_, SalesChartEntry>(
            r#"
            SELECT
                to_char(sale_date, 'YYYY-MM-DD') AS date,
                COALESCE(SUM(sale_price), 0) AS total,
                COUNT(*) AS count
            FROM sales
            WHERE user_id = $1
              AND sale_date >= CURRENT_DATE - INTERVAL '30 days'
            GROUP BY sale_date
            ORDER BY sale_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
