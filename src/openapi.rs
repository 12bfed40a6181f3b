//! OpenAPI document served by Swagger UI at `/docs`.

use utoipa::OpenApi;

use crate::domain::{Order, OrderStatus, Product};
use crate::handlers::orders::CreateOrderRequest;
use crate::handlers::products::CreateProductRequest;
use crate::handlers::webhook::{PaymentWebhook, PaymentWebhookResponse};
use crate::handlers::{HealthStatus, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orders & Inventory API",
        description = "Product inventory, stock-reserving order placement and payment webhooks."
    ),
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::list_products,
        crate::handlers::products::list_product_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::webhook::payment,
    ),
    components(schemas(
        Product,
        Order,
        OrderStatus,
        CreateProductRequest,
        CreateOrderRequest,
        PaymentWebhook,
        PaymentWebhookResponse,
        HealthStatus,
        MessageResponse,
    )),
    tags(
        (name = "Products", description = "Inventory records"),
        (name = "Orders", description = "Stock reservation"),
        (name = "Webhooks", description = "Out-of-band payment notifications")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_public_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/products",
            "/products/{id}",
            "/products/{id}/orders",
            "/orders",
            "/orders/{id}",
            "/webhooks/payment",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn document_registers_domain_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("Product"));
        assert!(schemas.contains_key("Order"));
        assert!(schemas.contains_key("OrderStatus"));
    }
}
