// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    // Organização, convites e membros.
    // Sem layer: o GET /accept é público e os extratores autenticam o resto.
    let organization_routes = Router::new()
        .route(
            "/api/organizations",
            get(handlers::organizations::get_organization)
                .post(handlers::organizations::create_organization)
                .put(handlers::organizations::update_organization),
        )
        .route(
            "/api/organizations/invite",
            post(handlers::invitations::invite_member)
                .delete(handlers::invitations::revoke_invitation),
        )
        .route(
            "/api/organizations/accept",
            get(handlers::invitations::get_invitation)
                .post(handlers::invitations::accept_invitation),
        )
        .route(
            "/api/organizations/members",
            get(handlers::members::list_members)
                .delete(handlers::members::remove_member)
                .patch(handlers::members::change_member_role),
        );

    // Rotas protegidas pelo auth_guard
    let protected_routes = Router::new()
        .route("/api/users/me", get(handlers::auth::get_me))
        .route(
            "/api/vehicles",
            post(handlers::inventory::create_vehicle).get(handlers::inventory::list_vehicles),
        )
        .route(
            "/api/vehicles/{id}",
            get(handlers::inventory::get_vehicle)
                .put(handlers::inventory::update_vehicle)
                .delete(handlers::inventory::delete_vehicle),
        )
        .route(
            "/api/leads",
            post(handlers::crm::create_lead).get(handlers::crm::list_leads),
        )
        .route(
            "/api/leads/{id}",
            get(handlers::crm::get_lead)
                .put(handlers::crm::update_lead)
                .delete(handlers::crm::delete_lead),
        )
        .route(
            "/api/sales",
            post(handlers::sales::create_sale).get(handlers::sales::list_sales),
        )
        .route(
            "/api/sales/{id}",
            get(handlers::sales::get_sale)
                .put(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        )
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/api/dashboard/sales-chart", get(handlers::dashboard::get_sales_chart))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(organization_routes)
        .merge(protected_routes)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
