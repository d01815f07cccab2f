//! OpenAPI documentation served through Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, customer_handler};
use crate::domain::{Customer, CustomerCategory, CustomerInput, ProfileResponse, Title};
use crate::services::{AccessToken, TokenPair};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Customer Manager API",
        version = "0.1.0",
        description = "Customer records with branch-scoped visibility"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        auth_handler::obtain_token,
        auth_handler::refresh_token,
        auth_handler::profile,
        customer_handler::list_customers,
        customer_handler::create_customer,
        customer_handler::list_customers_by_team,
        customer_handler::update_customer,
        customer_handler::delete_customer,
    ),
    components(
        schemas(
            Title,
            CustomerCategory,
            Customer,
            CustomerInput,
            ProfileResponse,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            TokenPair,
            AccessToken,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Token issuance and profile"),
        (name = "Customers", description = "Customer record management")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by protected paths
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
                        .description(Some("Access token obtained from /api/auth/token/"))
                        .build(),
                ),
            );
        }
    }
}
