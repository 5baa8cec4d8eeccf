//! OpenAPI documentation for the sampling API.

use utoipa::OpenApi;

use crate::handlers::SampleResponse;

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::sample::sample_handler),
    components(schemas(SampleResponse)),
    tags(
        (name = "sample", description = "Verifiable random sampling of advertised content identifiers")
    ),
    info(
        title = "Randex Sampling API",
        description = "Probabilistic retrievability audits over a content-address index"
    )
)]
pub struct ApiDoc;
