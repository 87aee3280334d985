use utoipa::OpenApi;

// The nest macro rejects an empty string literal, but an expression that
// evaluates to "" is accepted and nests the API with no path prefix.
const ROOT_PATH: &str = "";

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "E-commerce catalog backend: categories, products and the admin management surface"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = ROOT_PATH, api = domain_catalog::ApiDoc)
    )
)]
pub struct ApiDoc;
