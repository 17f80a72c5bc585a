// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        DashboardRepository, LeadRepository, OrganizationRepository, OrganizationStore,
        OwnershipRepository, RecordOwnership, SaleRepository, UserRepository, VehicleRepository,
    },
    services::{
        auth::AuthService, DashboardService, InvitationService, LeadService, MembershipService,
        OrganizationService, SaleService, VehicleService,
    },
};

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Base das URLs de convite (`{app_url}/invite/{token}`)
    pub app_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub invite_expiry_days: i64,
    pub default_max_members: i32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê a configuração de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        let config = Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            app_url: lookup("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            invite_expiry_days: parse_or(&lookup, "INVITE_EXPIRY_DAYS", 7)?,
            default_max_members: parse_or(&lookup, "DEFAULT_MAX_MEMBERS", 5)?,
        };

        if config.invite_expiry_days < 1 {
            anyhow::bail!("INVITE_EXPIRY_DAYS deve ser pelo menos 1");
        }
        if config.default_max_members < 1 {
            anyhow::bail!("DEFAULT_MAX_MEMBERS deve ser pelo menos 1");
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub organization_service: OrganizationService,
    pub invitation_service: InvitationService,
    pub membership_service: MembershipService,
    pub organization_store: Arc<dyn OrganizationStore>,
    pub vehicle_service: VehicleService,
    pub lead_service: LeadService,
    pub sale_service: SaleService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let store: Arc<dyn OrganizationStore> = Arc::new(OrganizationRepository::new(db_pool.clone()));
        Ok(Self::from_parts(db_pool, config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(db_pool: PgPool, config: AppConfig, store: Arc<dyn OrganizationStore>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let vehicle_repo = VehicleRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let ownership: Arc<dyn RecordOwnership> = Arc::new(OwnershipRepository::new(db_pool.clone()));

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let organization_service = OrganizationService::new(store.clone(), config.default_max_members);
        let invitation_service =
            InvitationService::new(store.clone(), &config.app_url, config.invite_expiry_days);
        let membership_service = MembershipService::new(store.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            organization_service,
            invitation_service,
            membership_service,
            organization_store: store,
            vehicle_service: VehicleService::new(vehicle_repo),
            lead_service: LeadService::new(lead_repo, ownership.clone()),
            sale_service: SaleService::new(sale_repo, ownership),
            dashboard_service: DashboardService::new(dashboard_repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/concessionaria"),
        ("JWT_SECRET", "segredo"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.invite_expiry_days, 7);
        assert_eq!(config.default_max_members, 5);
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("APP_URL", "https://app.concessionaria.com.br"),
            ("INVITE_EXPIRY_DAYS", "3"),
            ("DEFAULT_MAX_MEMBERS", " 10 "),
        ]);

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.app_url, "https://app.concessionaria.com.br");
        assert_eq!(config.invite_expiry_days, 3);
        assert_eq!(config.default_max_members, 10);
    }

    #[test]
    fn missing_secret_fails() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_number_fails_with_key_name() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DB_MAX_CONNECTIONS", "muitas"));

        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DEFAULT_MAX_MEMBERS", "0"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
