// src/services/sales_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, formatting::{non_blank, normalize_cpf}},
    db::{RecordOwnership, SaleRepository},
    models::sales::{Sale, SaleFields, SalePayload},
};

#[derive(Clone)]
pub struct SaleService {
    repo: SaleRepository,
    ownership: Arc<dyn RecordOwnership>,
}

impl SaleService {
    pub fn new(repo: SaleRepository, ownership: Arc<dyn RecordOwnership>) -> Self {
        Self { repo, ownership }
    }

    pub async fn create(&self, user_id: Uuid, payload: SalePayload) -> Result<Sale, AppError> {
        let fields = sale_fields(payload)?;
        if fields.customer_name.is_none() {
            return Err(AppError::MissingField("customerName"));
        }
        if fields.sale_price.is_none() {
            return Err(AppError::MissingField("salePrice"));
        }
        self.check_references(user_id, &fields).await?;

        let sale = self.repo.create(user_id, &fields).await?;
        tracing::info!("💰 Venda {} registrada por {}.", sale.id, user_id);
        Ok(sale)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Sale>, AppError> {
        self.repo.list(user_id).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Sale, AppError> {
        self.repo
            .find(user_id, id)
            .await?
            .ok_or(AppError::RecordNotFound("Venda"))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, payload: SalePayload) -> Result<Sale, AppError> {
        let fields = sale_fields(payload)?;
        self.check_references(user_id, &fields).await?;

        self.repo
            .update(user_id, id, &fields)
            .await?
            .ok_or(AppError::RecordNotFound("Venda"))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(user_id, id).await? {
            return Err(AppError::RecordNotFound("Venda"));
        }
        tracing::info!("💰 Venda {} removida por {}.", id, user_id);
        Ok(())
    }

    // Veículo e lead referenciados precisam ser do mesmo usuário
    async fn check_references(&self, user_id: Uuid, fields: &SaleFields) -> Result<(), AppError> {
        if let Some(vehicle_id) = fields.vehicle_id {
            if !self.ownership.owns_vehicle(user_id, vehicle_id).await? {
                return Err(AppError::InvalidReference("Veículo"));
            }
        }
        if let Some(lead_id) = fields.lead_id {
            if !self.ownership.owns_lead(user_id, lead_id).await? {
                return Err(AppError::InvalidReference("Lead"));
            }
        }
        Ok(())
    }
}

fn sale_fields(payload: SalePayload) -> Result<SaleFields, AppError> {
    let customer_cpf = non_blank(payload.customer_cpf)
        .map(|c| normalize_cpf(&c))
        .transpose()?;
    let sale_price = payload.sale_price.map(|p| p.to_decimal()).transpose()?;

    Ok(SaleFields {
        vehicle_id: payload.vehicle_id,
        lead_id: payload.lead_id,
        customer_name: non_blank(payload.customer_name),
        customer_cpf,
        sale_price,
        payment_method: non_blank(payload.payment_method),
        sale_date: payload.sale_date,
        notes: non_blank(payload.notes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::formatting::FormatError;
    use crate::db::InMemoryOwnership;
    use crate::models::inventory::MoneyInput;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    // O pool nunca conecta: a checagem de posse roda antes de qualquer SQL
    fn service(ownership: InMemoryOwnership) -> SaleService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        SaleService::new(SaleRepository::new(pool), Arc::new(ownership))
    }

    fn sale(vehicle_id: Option<Uuid>, lead_id: Option<Uuid>) -> SalePayload {
        SalePayload {
            customer_name: Some("João".into()),
            sale_price: Some(MoneyInput::Text("R$ 45.900,00".into())),
            vehicle_id,
            lead_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn references_of_another_user_are_rejected() {
        let (seller, other) = (Uuid::new_v4(), Uuid::new_v4());
        let (own_vehicle, foreign_vehicle) = (Uuid::new_v4(), Uuid::new_v4());
        let foreign_lead = Uuid::new_v4();
        let sales = service(
            InMemoryOwnership::default()
                .with_vehicle(seller, own_vehicle)
                .with_vehicle(other, foreign_vehicle)
                .with_lead(other, foreign_lead),
        );

        assert!(matches!(
            sales.create(seller, sale(Some(foreign_vehicle), None)).await,
            Err(AppError::InvalidReference("Veículo"))
        ));
        assert!(matches!(
            sales.create(seller, sale(Some(own_vehicle), Some(foreign_lead))).await,
            Err(AppError::InvalidReference("Lead"))
        ));
        assert!(matches!(
            sales.update(seller, Uuid::new_v4(), sale(None, Some(foreign_lead))).await,
            Err(AppError::InvalidReference("Lead"))
        ));
    }

    #[tokio::test]
    async fn own_references_pass() {
        let seller = Uuid::new_v4();
        let (vehicle_id, lead_id) = (Uuid::new_v4(), Uuid::new_v4());
        let sales = service(
            InMemoryOwnership::default()
                .with_vehicle(seller, vehicle_id)
                .with_lead(seller, lead_id),
        );

        let fields = sale_fields(sale(Some(vehicle_id), Some(lead_id))).unwrap();
        assert!(sales.check_references(seller, &fields).await.is_ok());

        let without_references = sale_fields(sale(None, None)).unwrap();
        assert!(sales.check_references(seller, &without_references).await.is_ok());
    }

    #[test]
    fn price_and_cpf_are_normalized() {
        let payload = SalePayload {
            customer_name: Some(" João ".into()),
            customer_cpf: Some("529.982.247-25".into()),
            sale_price: Some(MoneyInput::Text("R$ 1.234,56".into())),
            ..Default::default()
        };

        let fields = sale_fields(payload).unwrap();

        assert_eq!(fields.customer_name.as_deref(), Some("João"));
        assert_eq!(fields.customer_cpf.as_deref(), Some("52998224725"));
        assert_eq!(fields.sale_price, Some(Decimal::new(123456, 2)));
    }

    #[test]
    fn negative_price_is_rejected() {
        let payload = SalePayload {
            sale_price: Some(MoneyInput::Amount(Decimal::new(-100, 0))),
            ..Default::default()
        };
        assert!(matches!(
            sale_fields(payload),
            Err(AppError::InvalidFormat(FormatError::Currency))
        ));
    }
}
