// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::formatting::{format_currency, parse_currency, FormatError};

// --- ENUMS ---

// Mapeia o CREATE TYPE vehicle_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Available,
    Reserved,
    Sold,
}

// Valor monetário vindo do formulário: número puro ou o texto da máscara ("R$ 45.900,00")
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Amount(Decimal),
    Text(String),
}

impl MoneyInput {
    pub fn to_decimal(&self) -> Result<Decimal, FormatError> {
        match self {
            MoneyInput::Amount(value) if value.is_sign_negative() => Err(FormatError::Currency),
            MoneyInput::Amount(value) => Ok(value.round_dp(2)),
            MoneyInput::Text(text) => parse_currency(text),
        }
    }
}

// --- VEÍCULO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Volkswagen")]
    pub brand: String,
    #[schema(example = "Gol 1.0")]
    pub model: String,
    #[schema(example = 2020)]
    pub year: i32,

    #[schema(example = "BRA2E19")]
    pub plate: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i32>,

    #[schema(example = 45900.00)]
    pub price: Decimal,

    pub status: VehicleStatus,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub description: Option<String>,

    // URLs das fotos (o arquivo em si vive no storage externo)
    pub images: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleView {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    #[schema(example = "R$ 45.900,00")]
    pub price_formatted: String,
}

impl From<Vehicle> for VehicleView {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            price_formatted: format_currency(vehicle.price),
            vehicle,
        }
    }
}

// Payload usado tanto no POST quanto no PUT (no PUT tudo é opcional)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePayload {
    #[validate(length(min = 1, max = 60, message = "Marca inválida."))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 80, message = "Modelo inválido."))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "Ano inválido."))]
    pub year: Option<i32>,

    pub plate: Option<String>,
    pub color: Option<String>,

    #[validate(range(min = 0, message = "A quilometragem não pode ser negativa."))]
    pub mileage: Option<i32>,

    #[schema(value_type = Option<String>, example = "R$ 45.900,00")]
    pub price: Option<MoneyInput>,

    pub status: Option<VehicleStatus>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

// Campos já normalizados, prontos para o repositório
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFields {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub price: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VehicleFilter {
    /// available | reserved | sold
    pub status: Option<VehicleStatus>,
}
