// src/models/sales.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::formatting::{format_cpf, format_currency},
    models::inventory::MoneyInput,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    pub vehicle_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,

    #[schema(example = "Maria da Silva")]
    pub customer_name: String,
    #[schema(example = "52998224725")]
    pub customer_cpf: Option<String>,

    #[schema(example = 45900.00)]
    pub sale_price: Decimal,

    #[schema(example = "financiamento")]
    pub payment_method: Option<String>,

    #[schema(value_type = String, format = Date, example = "2026-10-17")]
    pub sale_date: NaiveDate,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: Sale,
    #[schema(example = "R$ 45.900,00")]
    pub sale_price_formatted: String,
    #[schema(example = "529.982.247-25")]
    pub customer_cpf_formatted: Option<String>,
}

impl From<Sale> for SaleView {
    fn from(sale: Sale) -> Self {
        Self {
            sale_price_formatted: format_currency(sale.sale_price),
            customer_cpf_formatted: sale.customer_cpf.as_deref().map(format_cpf),
            sale,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    pub vehicle_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,

    #[validate(length(min = 1, max = 120, message = "Nome do cliente inválido."))]
    pub customer_name: Option<String>,

    #[schema(example = "529.982.247-25")]
    pub customer_cpf: Option<String>,

    #[schema(value_type = Option<String>, example = "R$ 45.900,00")]
    pub sale_price: Option<MoneyInput>,

    pub payment_method: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-17")]
    pub sale_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFields {
    pub vehicle_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_cpf: Option<String>,
    pub sale_price: Option<Decimal>,
    pub payment_method: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
