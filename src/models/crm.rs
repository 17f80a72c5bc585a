// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::formatting::{format_cep, format_cpf, format_phone};

// Mapeia o CREATE TYPE lead_status do banco.
// O frontend move o lead livremente entre as etapas (sem validação de transição).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Interested,
    Negotiating,
    Closed,
    Lost,
}

impl LeadStatus {
    pub fn is_open(self) -> bool {
        !matches!(self, LeadStatus::Closed | LeadStatus::Lost)
    }
}

// --- LEAD (O Interessado) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub name: String,
    pub email: Option<String>,

    // Guardados só com dígitos; a máscara é do frontend
    #[schema(example = "11987654321")]
    pub phone: Option<String>,
    #[schema(example = "52998224725")]
    pub cpf: Option<String>,
    #[schema(example = "01310100")]
    pub cep: Option<String>,
    pub address: Option<String>,

    // Veículo de interesse
    pub vehicle_id: Option<Uuid>,

    #[schema(example = "instagram")]
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: LeadStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O lead com os documentos já mascarados para exibição
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: Lead,
    #[schema(example = "(11) 98765-4321")]
    pub phone_formatted: Option<String>,
    #[schema(example = "529.982.247-25")]
    pub cpf_formatted: Option<String>,
    #[schema(example = "01310-100")]
    pub cep_formatted: Option<String>,
}

impl From<Lead> for LeadView {
    fn from(lead: Lead) -> Self {
        Self {
            phone_formatted: lead.phone.as_deref().map(format_phone),
            cpf_formatted: lead.cpf.as_deref().map(format_cpf),
            cep_formatted: lead.cep.as_deref().map(format_cep),
            lead,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    #[validate(length(min = 1, max = 120, message = "Nome inválido."))]
    #[schema(example = "Maria da Silva")]
    pub name: Option<String>,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    #[schema(example = "(11) 98765-4321")]
    pub phone: Option<String>,
    #[schema(example = "529.982.247-25")]
    pub cpf: Option<String>,
    #[schema(example = "01310-100")]
    pub cep: Option<String>,
    pub address: Option<String>,
    pub vehicle_id: Option<Uuid>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub cep: Option<String>,
    pub address: Option<String>,
    pub vehicle_id: Option<Uuid>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    /// new | contacted | interested | negotiating | closed | lost
    pub status: Option<LeadStatus>,
}
