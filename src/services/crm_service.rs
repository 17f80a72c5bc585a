// src/services/crm_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        formatting::{non_blank, normalize_cep, normalize_cpf, normalize_phone},
    },
    db::{LeadRepository, RecordOwnership},
    models::crm::{Lead, LeadFields, LeadPayload, LeadStatus},
};

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    ownership: Arc<dyn RecordOwnership>,
}

impl LeadService {
    pub fn new(repo: LeadRepository, ownership: Arc<dyn RecordOwnership>) -> Self {
        Self { repo, ownership }
    }

    pub async fn create(&self, user_id: Uuid, payload: LeadPayload) -> Result<Lead, AppError> {
        let fields = lead_fields(payload)?;
        if fields.name.is_none() {
            return Err(AppError::MissingField("name"));
        }
        self.check_vehicle(user_id, fields.vehicle_id).await?;

        let lead = self.repo.create(user_id, &fields).await?;
        tracing::info!("📇 Lead {} cadastrado por {}.", lead.id, user_id);
        Ok(lead)
    }

    pub async fn list(&self, user_id: Uuid, status: Option<LeadStatus>) -> Result<Vec<Lead>, AppError> {
        self.repo.list(user_id, status).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Lead, AppError> {
        self.repo
            .find(user_id, id)
            .await?
            .ok_or(AppError::RecordNotFound("Lead"))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, payload: LeadPayload) -> Result<Lead, AppError> {
        let fields = lead_fields(payload)?;
        self.check_vehicle(user_id, fields.vehicle_id).await?;

        self.repo
            .update(user_id, id, &fields)
            .await?
            .ok_or(AppError::RecordNotFound("Lead"))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(user_id, id).await? {
            return Err(AppError::RecordNotFound("Lead"));
        }
        tracing::info!("📇 Lead {} removido por {}.", id, user_id);
        Ok(())
    }

    // Veículo de interesse precisa ser do mesmo usuário
    async fn check_vehicle(&self, user_id: Uuid, vehicle_id: Option<Uuid>) -> Result<(), AppError> {
        match vehicle_id {
            Some(id) if !self.ownership.owns_vehicle(user_id, id).await? => {
                Err(AppError::InvalidReference("Veículo"))
            }
            _ => Ok(()),
        }
    }
}

/// Telefone, CPF e CEP chegam mascarados e são guardados só com dígitos.
fn lead_fields(payload: LeadPayload) -> Result<LeadFields, AppError> {
    let phone = non_blank(payload.phone).map(|p| normalize_phone(&p)).transpose()?;
    let cpf = non_blank(payload.cpf).map(|c| normalize_cpf(&c)).transpose()?;
    let cep = non_blank(payload.cep).map(|c| normalize_cep(&c)).transpose()?;

    Ok(LeadFields {
        name: non_blank(payload.name),
        email: non_blank(payload.email).map(|e| e.to_lowercase()),
        phone,
        cpf,
        cep,
        address: non_blank(payload.address),
        vehicle_id: payload.vehicle_id,
        source: non_blank(payload.source),
        notes: non_blank(payload.notes),
        status: payload.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::formatting::FormatError;
    use crate::db::InMemoryOwnership;
    use sqlx::postgres::PgPoolOptions;

    // O pool nunca conecta: a checagem de posse roda antes de qualquer SQL
    fn service(ownership: InMemoryOwnership) -> LeadService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        LeadService::new(LeadRepository::new(pool), Arc::new(ownership))
    }

    #[tokio::test]
    async fn vehicle_of_another_user_is_rejected() {
        let (seller, other) = (Uuid::new_v4(), Uuid::new_v4());
        let vehicle_id = Uuid::new_v4();
        let leads = service(InMemoryOwnership::default().with_vehicle(other, vehicle_id));

        let payload = LeadPayload {
            name: Some("Maria".into()),
            vehicle_id: Some(vehicle_id),
            ..Default::default()
        };

        assert!(matches!(
            leads.create(seller, payload.clone()).await,
            Err(AppError::InvalidReference("Veículo"))
        ));
        assert!(matches!(
            leads.update(seller, Uuid::new_v4(), payload).await,
            Err(AppError::InvalidReference("Veículo"))
        ));
    }

    #[tokio::test]
    async fn own_vehicle_or_none_passes() {
        let seller = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let leads = service(InMemoryOwnership::default().with_vehicle(seller, vehicle_id));

        assert!(leads.check_vehicle(seller, Some(vehicle_id)).await.is_ok());
        assert!(leads.check_vehicle(seller, None).await.is_ok());
        assert!(leads.check_vehicle(Uuid::new_v4(), Some(vehicle_id)).await.is_err());
    }

    #[test]
    fn masks_are_stripped() {
        let payload = LeadPayload {
            name: Some("Maria da Silva".into()),
            email: Some("Maria@Gmail.com".into()),
            phone: Some("+55 (11) 98765-4321".into()),
            cpf: Some("529.982.247-25".into()),
            cep: Some("01310-100".into()),
            ..Default::default()
        };

        let fields = lead_fields(payload).unwrap();

        assert_eq!(fields.email.as_deref(), Some("maria@gmail.com"));
        assert_eq!(fields.phone.as_deref(), Some("11987654321"));
        assert_eq!(fields.cpf.as_deref(), Some("52998224725"));
        assert_eq!(fields.cep.as_deref(), Some("01310100"));
    }

    #[test]
    fn blank_optional_fields_are_ignored() {
        let payload = LeadPayload {
            name: Some("Maria".into()),
            cpf: Some("  ".into()),
            phone: Some("".into()),
            ..Default::default()
        };

        let fields = lead_fields(payload).unwrap();
        assert_eq!(fields.cpf, None);
        assert_eq!(fields.phone, None);
    }

    #[test]
    fn invalid_documents_are_rejected() {
        let bad_cpf = LeadPayload {
            cpf: Some("111.111.111-11".into()),
            ..Default::default()
        };
        assert!(matches!(
            lead_fields(bad_cpf),
            Err(AppError::InvalidFormat(FormatError::Cpf))
        ));

        let bad_phone = LeadPayload {
            phone: Some("9876-432".into()),
            ..Default::default()
        };
        assert!(matches!(
            lead_fields(bad_phone),
            Err(AppError::InvalidFormat(FormatError::Phone))
        ));

        let bad_cep = LeadPayload {
            cep: Some("0131-010".into()),
            ..Default::default()
        };
        assert!(matches!(
            lead_fields(bad_cep),
            Err(AppError::InvalidFormat(FormatError::Cep))
        ));
    }
}
