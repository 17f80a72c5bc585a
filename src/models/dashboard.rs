// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Contagens brutas vindas do banco
#[derive(Debug, Default, FromRow)]
pub struct DashboardCounts {
    pub available_vehicles: i64,
    pub reserved_vehicles: i64,
    pub sold_vehicles: i64,

    pub new_leads: i64,
    pub contacted_leads: i64,
    pub interested_leads: i64,
    pub negotiating_leads: i64,
    pub closed_leads: i64,
    pub lost_leads: i64,

    pub total_sales: i64,
    pub revenue: Decimal,
}

// 1. Os Cards do Topo
#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_vehicles: i64,
    pub available_vehicles: i64,
    pub reserved_vehicles: i64,
    pub sold_vehicles: i64,

    pub total_leads: i64,
    pub open_leads: i64,
    pub closed_leads: i64,
    pub lost_leads: i64,

    pub total_sales: i64,
    pub revenue: Decimal,
    pub average_ticket: Decimal,

    #[schema(example = "R$ 137.700,00")]
    pub revenue_formatted: String,
    #[schema(example = "R$ 45.900,00")]
    pub average_ticket_formatted: String,
}

// 2. Gráfico de Vendas (Últimos 30 dias)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesChartEntry {
    #[schema(example = "2026-10-17")]
    pub date: String,
    pub total: Decimal,
    pub count: i64,
}
