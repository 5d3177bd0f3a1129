use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AutoShop API",
        version = "0.2.0",
        description = r#"
# AutoShop Repair Management API

A REST API for running an automotive repair shop: customers and their
vehicles, the parts inventory, the mechanic roster, a service catalog,
and service tickets with labor lines, consumed parts, and mechanic
assignments.

## Authentication

Registration and login are open; everything else requires a bearer
token obtained from `/api/v1/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

## Money

All monetary amounts are integer cents. Ticket totals are computed
per line with half-up rounding before summation.

## Rate Limiting

Requests are rate-limited per client. Check the response headers:
- `X-RateLimit-Limit`: Maximum requests per window
- `X-RateLimit-Remaining`: Remaining requests in current window
- `X-RateLimit-Reset`: Seconds until the window resets

## Pagination

List endpoints accept `page` (default: 1) and `limit` (default: 20,
capped by server configuration).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Registration, login, and identity"),
        (name = "customers", description = "Customer account management"),
        (name = "vehicles", description = "Vehicles registered to customers"),
        (name = "mechanics", description = "Mechanic roster, specializations, and certifications"),
        (name = "inventory", description = "Parts inventory and stock adjustments"),
        (name = "catalog", description = "Service catalog and discounted packages"),
        (name = "tickets", description = "Service tickets, lines, parts, and assignments"),
        (name = "meta", description = "Health and status probes")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        // Vehicles
        crate::handlers::vehicles::list_vehicles,
        crate::handlers::vehicles::create_vehicle,
        crate::handlers::vehicles::get_vehicle,
        crate::handlers::vehicles::update_vehicle,
        crate::handlers::vehicles::delete_vehicle,

        // Mechanics
        crate::handlers::mechanics::list_mechanics,
        crate::handlers::mechanics::create_mechanic,
        crate::handlers::mechanics::get_mechanic,
        crate::handlers::mechanics::update_mechanic,
        crate::handlers::mechanics::list_certifications,
        crate::handlers::mechanics::record_certification,
        crate::handlers::mechanics::list_specializations,
        crate::handlers::mechanics::create_specialization,

        // Inventory
        crate::handlers::inventory::list_parts,
        crate::handlers::inventory::create_part,
        crate::handlers::inventory::list_low_stock,
        crate::handlers::inventory::get_part,
        crate::handlers::inventory::update_part,
        crate::handlers::inventory::adjust_quantity,
        crate::handlers::inventory::delete_part,

        // Catalog
        crate::handlers::catalog::list_services,
        crate::handlers::catalog::create_service,
        crate::handlers::catalog::get_service,
        crate::handlers::catalog::list_packages,
        crate::handlers::catalog::create_package,
        crate::handlers::catalog::get_package,

        // Tickets
        crate::handlers::tickets::list_tickets,
        crate::handlers::tickets::create_ticket,
        crate::handlers::tickets::get_ticket,
        crate::handlers::tickets::update_status,
        crate::handlers::tickets::get_total,
        crate::handlers::tickets::list_line_items,
        crate::handlers::tickets::create_line_item,
        crate::handlers::tickets::list_part_usages,
        crate::handlers::tickets::attach_part,
        crate::handlers::tickets::assign_mechanic,
        crate::handlers::tickets::remove_mechanic,
        crate::handlers::tickets::list_assignments,
        crate::handlers::tickets::bulk_edit_assignments,

        // Meta
        crate::api_status,
        crate::health_check,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,
            crate::errors::ErrorResponse,

            // Entities
            crate::entities::customer::Model,
            crate::entities::vehicle::Model,
            crate::entities::mechanic::Model,
            crate::entities::part::Model,
            crate::entities::service::Model,
            crate::entities::service_package::Model,
            crate::entities::service_package_item::Model,
            crate::entities::specialization::Model,
            crate::entities::mechanic_certification::Model,
            crate::entities::service_ticket::Model,
            crate::entities::ticket_line_item::Model,
            crate::entities::ticket_part_usage::Model,
            crate::entities::ticket_assignment::Model,

            // Auth types
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,

            // Customer / vehicle types
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,
            crate::services::vehicles::CreateVehicleRequest,
            crate::services::vehicles::UpdateVehicleRequest,

            // Mechanic types
            crate::services::mechanics::CreateMechanicRequest,
            crate::services::mechanics::UpdateMechanicRequest,
            crate::services::mechanics::CreateSpecializationRequest,
            crate::services::mechanics::RecordCertificationRequest,

            // Inventory types
            crate::services::inventory::CreatePartRequest,
            crate::services::inventory::UpdatePartRequest,
            crate::services::inventory::AdjustQuantityRequest,
            crate::services::inventory::QuantityAdjustment,

            // Catalog types
            crate::services::catalog::CreateServiceRequest,
            crate::services::catalog::CreatePackageRequest,
            crate::services::catalog::PackageItemRequest,
            crate::services::catalog::PackageDetail,

            // Ticket types
            crate::services::tickets::TicketStatus,
            crate::services::tickets::CreateTicketRequest,
            crate::services::tickets::UpdateTicketStatusRequest,
            crate::services::tickets::CreateLineItemRequest,
            crate::services::tickets::AttachPartRequest,
            crate::services::tickets::AssignMechanicRequest,
            crate::services::tickets::AssignmentEdit,
            crate::services::tickets::BulkEditAssignmentsRequest,
            crate::services::ticket_cost::TicketTotal,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
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

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_renders() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).expect("document should serialize");
        assert!(json.contains("AutoShop API"));
        assert!(json.contains("/api/v1/tickets"));
        assert!(json.contains("Bearer"));
    }
}
