//! OpenAPI document assembly.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tenant Console API",
        description = "Multi-tenant administration backend with change auditing"
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::login,
        handlers::auth::verify_login_code,
        handlers::auth::resend_code,
        handlers::auth::forgot_password,
        handlers::auth::verify_reset_code,
        handlers::auth::reset_password,
        handlers::auth::resend_pass_code,
        handlers::auth::refresh_token,
        handlers::roles::create_role,
        handlers::roles::update_role,
        handlers::roles::delete_role,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::sites::create_site,
        handlers::sites::update_site,
        handlers::sites::delete_site,
        handlers::project_types::create_project_type,
        handlers::project_types::update_project_type,
        handlers::project_types::delete_project_type,
        handlers::access::create_access,
        handlers::access::update_access,
        handlers::access::delete_access,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::users::create_user,
        handlers::users::verify_email,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::events::create_event,
        handlers::events::get_events,
        handlers::admin::all_projects,
        handlers::admin::project_by_id,
        handlers::admin::all_project_types,
        handlers::admin::project_type_by_id,
        handlers::admin::all_sites,
        handlers::admin::site_by_id,
        handlers::admin::all_companies,
        handlers::admin::all_roles,
        handlers::admin::all_access,
        handlers::admin::all_logs,
    ),
    components(schemas(
        handlers::auth::LoginRequest,
        handlers::auth::VerifyCodeRequest,
        handlers::auth::EmailRequest,
        handlers::auth::VerifyResetCodeRequest,
        handlers::auth::ResetPasswordRequest,
        handlers::auth::TokenRequest,
        handlers::auth::RefreshTokenRequest,
        handlers::roles::CreateRoleRequest,
        handlers::roles::UpdateRoleRequest,
        handlers::companies::CreateCompanyRequest,
        handlers::companies::UpdateCompanyRequest,
        handlers::sites::CreateSiteRequest,
        handlers::sites::UpdateSiteRequest,
        handlers::project_types::CreateProjectTypeRequest,
        handlers::project_types::UpdateProjectTypeRequest,
        handlers::access::CreateAccessRequest,
        handlers::access::UpdateAccessRequest,
        handlers::users::CreateUserRequest,
        handlers::users::VerifyEmailRequest,
        handlers::users::UpdateUserRequest,
        handlers::events::CreateEventRequest,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Build the OpenAPI spec once at startup
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
