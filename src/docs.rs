// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Organizations ---
        handlers::organizations::get_organization,
        handlers::organizations::create_organization,
        handlers::organizations::update_organization,

        // --- Invitations ---
        handlers::invitations::invite_member,
        handlers::invitations::revoke_invitation,
        handlers::invitations::get_invitation,
        handlers::invitations::accept_invitation,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::remove_member,
        handlers::members::change_member_role,

        // --- Vehicles ---
        handlers::inventory::create_vehicle,
        handlers::inventory::list_vehicles,
        handlers::inventory::get_vehicle,
        handlers::inventory::update_vehicle,
        handlers::inventory::delete_vehicle,

        // --- Leads ---
        handlers::crm::create_lead,
        handlers::crm::list_leads,
        handlers::crm::get_lead,
        handlers::crm::update_lead,
        handlers::crm::delete_lead,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_sales_chart,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Organizations ---
            models::organization::MemberRole,
            models::organization::Organization,
            models::organization::OrganizationSummary,
            models::organization::Membership,
            models::organization::MemberProfile,
            models::organization::Invitation,
            models::organization::InvitationDetails,
            models::organization::InvitationIssued,
            models::organization::InvitationAccepted,
            models::organization::OrganizationOverview,
            models::organization::MessageResponse,
            models::organization::CreateOrganizationRequest,
            models::organization::UpdateOrganizationRequest,
            models::organization::InviteMemberRequest,
            models::organization::AcceptInvitationRequest,
            models::organization::ChangeRoleRequest,

            // --- Vehicles ---
            models::inventory::VehicleStatus,
            models::inventory::Vehicle,
            models::inventory::VehicleView,
            models::inventory::VehiclePayload,

            // --- Leads ---
            models::crm::LeadStatus,
            models::crm::Lead,
            models::crm::LeadView,
            models::crm::LeadPayload,

            // --- Sales ---
            models::sales::Sale,
            models::sales::SaleView,
            models::sales::SalePayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::SalesChartEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Organizations", description = "A Concessionária (organização) do usuário"),
        (name = "Invitations", description = "Convites por e-mail para entrar na organização"),
        (name = "Members", description = "Membros e cargos"),
        (name = "Vehicles", description = "Estoque de Veículos"),
        (name = "Leads", description = "Funil de Interessados (CRM)"),
        (name = "Sales", description = "Vendas"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
