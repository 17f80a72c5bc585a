// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::organization::Membership,
};

// A organização "ativa" é sempre a do vínculo do usuário, resolvida a cada
// requisição (não existe seleção guardada no cliente).
#[derive(Debug, Clone)]
pub struct OrganizationContext(pub Membership);

impl<S> FromRequestParts<S> for OrganizationContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let locale = Locale::from_parts(parts);

        let membership = AppState::from_ref(state)
            .organization_store
            .find_membership_by_user(user.id)
            .await
            .and_then(|found| found.ok_or(AppError::NoOrganization))
            .map_err(|e| e.to_api_error(&locale))?;

        Ok(OrganizationContext(membership))
    }
}
