//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the hn-stories REST API
///
/// Served at `/openapi.json`, and through Swagger UI at `/swagger-ui` when enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "hn-stories REST API",
        description = "Best stories from the Hacker News API, ranked by score",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        crate::api::routes::get_best_stories,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::StoryRecord,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "stories", description = "Ranked story retrieval"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
