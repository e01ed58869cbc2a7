//! REST API for the load planner.
//!
//! A stateless wrapper around [`plan_load_with_config`]: each request carries
//! the truck, the product specs it references and the trip's line items.
//! Uses Axum as the web framework and allows cross-origin calls.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use crate::catalog::{InMemoryCatalog, resolve_line_items};
use crate::config::{ApiConfig, PlannerSettings};
use crate::error::PlanError;
use crate::model::{OrderLineItem, ProductSpec, TruckSpec};
use crate::planner::{LoadPlanResult, PlanSummary, plan_load_with_config};
use crate::sequencer::SequencedUnit;
use crate::utilization::BindingConstraint;

#[derive(Clone)]
struct ApiState {
    planner: PlannerSettings,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>load-planner API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request body of `POST /plan`.
///
/// `products` must contain every product referenced by `lineItems`; extra
/// products are allowed and ignored.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "truck": {
            "id": "truck-3t",
            "lengthCm": 443.0,
            "widthCm": 250.0,
            "heightCm": 210.0,
            "ratedToneCapacity": 3.0
        },
        "products": [
            {
                "id": "sofa-3",
                "name": "Three-seat sofa",
                "packageLengthCm": 107.0,
                "packageWidthCm": 88.0,
                "packageHeightCm": 53.0,
                "weightKg": 45.0
            }
        ],
        "lineItems": [
            {
                "orderId": "ORD-1001",
                "productId": "sofa-3",
                "quantity": 1,
                "scheduledDeliveryTime": "2024-05-02T09:00:00Z"
            }
        ]
    })
)]
pub struct PlanRequest {
    pub truck: TruckSpec,
    #[serde(default)]
    pub products: Vec<ProductSpec>,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
}

impl PlanRequest {
    fn line_item_count(&self) -> usize {
        self.line_items.len()
    }
}

#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    pub plan: LoadPlanResult,
    pub summary: PlanSummary,
}

impl PlanResponse {
    pub fn from_plan(plan: LoadPlanResult) -> Self {
        let summary = plan.summary();
        Self { plan, summary }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
    #[schema(nullable = true)]
    code: Option<String>,
    #[schema(nullable = true)]
    field: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    version: String,
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorResponse {
            error: "Invalid JSON data".to_string(),
            details: err.body_text(),
            code: None,
            field: None,
        },
    )
}

fn plan_error(err: &PlanError) -> Response {
    let error = match err {
        PlanError::InvalidTruckSpec { .. } => "Invalid truck configuration",
        PlanError::UnknownProduct { .. }
        | PlanError::UnknownTruck { .. }
        | PlanError::DuplicateCatalogEntry { .. } => "Invalid catalog data",
        PlanError::MalformedLineItem { .. } | PlanError::TooManyUnits { .. } => {
            "Invalid input data"
        }
    };
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorResponse {
            error: error.to_string(),
            details: err.to_string(),
            code: Some(err.code().to_string()),
            field: err.field().map(str::to_string),
        },
    )
}

fn build_plan(request: PlanRequest, settings: &PlannerSettings) -> Result<LoadPlanResult, PlanError> {
    let PlanRequest {
        truck,
        products,
        line_items,
    } = request;
    let truck_id = truck.id.clone();
    let catalog = InMemoryCatalog::new([truck], products)?;
    let input = resolve_line_items(&catalog, &truck_id, line_items)?;
    plan_load_with_config(&input, settings.planner_config())
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_plan, handle_health),
    components(
        schemas(
            PlanRequest,
            PlanResponse,
            ErrorResponse,
            HealthResponse,
            TruckSpec,
            ProductSpec,
            OrderLineItem,
            LoadPlanResult,
            SequencedUnit,
            PlanSummary,
            BindingConstraint
        )
    ),
    tags((name = "planning", description = "Truck load planning"))
)]
struct ApiDoc;

fn router(settings: PlannerSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { planner: settings };

    Router::new()
        .route("/plan", post(handle_plan))
        .route("/health", get(handle_health))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(config: ApiConfig, settings: PlannerSettings) -> std::io::Result<()> {
    let app = router(settings);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        error!(%addr, "could not bind API server: {err}");
        err
    })?;

    info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("Local access: http://localhost:{}", config.port());
    }
    info!("Endpoints: POST /plan, GET /health, GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /plan.
///
/// Resolves the line items against the supplied products, then returns the
/// utilization figures and the unit-by-unit loading sequence.
#[utoipa::path(
    post,
    path = "/plan",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Load plan computed", body = PlanResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid truck, catalog or line item data",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_plan(
    State(state): State<ApiState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    info!(
        truck_id = %request.truck.id,
        line_items = request.line_item_count(),
        "new plan request"
    );

    match build_plan(request, &state.planner) {
        Ok(plan) => {
            let response = PlanResponse::from_plan(plan);
            info!(
                units = response.summary.unit_count,
                max_pct = response.plan.max_utilization_pct,
                overloaded = response.summary.overloaded,
                "plan ready"
            );
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            info!(code = err.code(), "plan request rejected: {err}");
            plan_error(&err)
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "planning"
)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerConfig;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Request, header};
    use serde_json::Value;

    fn state() -> ApiState {
        ApiState {
            planner: PlannerSettings::default(),
        }
    }

    fn request(json: Value) -> PlanRequest {
        serde_json::from_value(json).expect("Should parse valid request JSON")
    }

    fn sample_json() -> Value {
        json!({
            "truck": {
                "id": "truck-3t",
                "lengthCm": 443.0,
                "widthCm": 250.0,
                "heightCm": 210.0,
                "ratedToneCapacity": 3.0
            },
            "products": [
                {
                    "id": "sofa",
                    "name": "Sofa",
                    "packageLengthCm": 107.0,
                    "packageWidthCm": 88.0,
                    "packageHeightCm": 53.0,
                    "weightKg": 45.0
                },
                {
                    "id": "mirror",
                    "name": "Mirror",
                    "packageLengthCm": 80.0,
                    "packageWidthCm": 5.0,
                    "packageHeightCm": 120.0,
                    "weightKg": 12.0,
                    "fragile": true
                }
            ],
            "lineItems": [
                {
                    "orderId": "ORD-1",
                    "productId": "sofa",
                    "quantity": 1,
                    "scheduledDeliveryTime": "2024-05-02T09:00:00Z"
                },
                {
                    "orderId": "ORD-1",
                    "productId": "mirror",
                    "quantity": 2,
                    "scheduledDeliveryTime": "2024-05-02T09:00:00Z",
                    "loadingPositionHint": "rear-left"
                }
            ]
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        assert!(
            paths.contains_key("/plan"),
            "OpenAPI documentation is missing the /plan path"
        );
        assert!(
            paths.contains_key("/health"),
            "OpenAPI documentation is missing the /health path"
        );
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        for name in ["PlanRequest", "PlanResponse", "ErrorResponse", "SequencedUnit"] {
            assert!(
                components.schemas.contains_key(name),
                "Expected schema '{}' is missing from OpenAPI spec",
                name
            );
        }
    }

    #[test]
    fn plan_request_defaults_missing_lists() {
        let request = request(json!({
            "truck": {
                "id": "T1",
                "lengthCm": 100.0,
                "widthCm": 100.0,
                "heightCm": 100.0,
                "ratedToneCapacity": 1.0
            }
        }));
        assert!(request.products.is_empty());
        assert!(request.line_items.is_empty());
    }

    #[tokio::test]
    async fn plan_endpoint_returns_sequence_and_summary() {
        let response = handle_plan(State(state()), Ok(Json(request(sample_json())))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let units = body["plan"]["sequencedItems"].as_array().unwrap();
        let ids: Vec<_> = units
            .iter()
            .map(|u| u["product"]["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["mirror", "mirror", "sofa"]);
        assert_eq!(units[0]["loadPosition"], 1);
        assert_eq!(units[0]["lineItem"]["loadingPositionHint"], "rear-left");
        assert_eq!(body["summary"]["unitCount"], 3);
        assert_eq!(body["summary"]["fragileUnits"], 2);
        assert_eq!(body["summary"]["bindingConstraint"], "volume");
        assert_eq!(body["plan"]["truckId"], "truck-3t");
    }

    #[tokio::test]
    async fn invalid_truck_maps_to_unprocessable() {
        let mut json = sample_json();
        json["truck"]["heightCm"] = json!(0.0);
        let response = handle_plan(State(state()), Ok(Json(request(json)))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "invalid_truck_spec");
        assert_eq!(body["field"], "heightCm");
    }

    #[tokio::test]
    async fn unknown_product_maps_to_unprocessable() {
        let mut json = sample_json();
        json["lineItems"][1]["productId"] = json!("lamp");
        let response = handle_plan(State(state()), Ok(Json(request(json)))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "unknown_product");
        assert_eq!(body["field"], "productId");
    }

    #[tokio::test]
    async fn zero_quantity_maps_to_unprocessable() {
        let mut json = sample_json();
        json["lineItems"][0]["quantity"] = json!(0);
        let response = handle_plan(State(state()), Ok(Json(request(json)))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "malformed_line_item");
        assert_eq!(body["field"], "quantity");
    }

    #[tokio::test]
    async fn unit_limit_comes_from_settings() {
        let limited = ApiState {
            planner: PlannerConfig::builder().max_units(2).build().into(),
        };
        let response = handle_plan(State(limited), Ok(Json(request(sample_json())))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "too_many_units");

        let plan = build_plan(request(sample_json()), &PlannerSettings::default()).unwrap();
        assert_eq!(plan.unit_count(), 3);
    }

    async fn rejection_for(json: Value) -> JsonRejection {
        let req = Request::builder()
            .method("POST")
            .uri("/plan")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build");
        match Json::<PlanRequest>::from_request(req, &()).await {
            Ok(_) => panic!("request should be rejected"),
            Err(rejection) => rejection,
        }
    }

    #[tokio::test]
    async fn missing_required_field_is_invalid_json() {
        let mut json = sample_json();
        json["truck"]
            .as_object_mut()
            .expect("truck is an object")
            .remove("heightCm");
        let rejection = rejection_for(json).await;

        let response = handle_plan(State(state()), Err(rejection)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid JSON data");
        assert!(body["details"].as_str().unwrap().contains("heightCm"));
        assert!(body["code"].is_null());
        assert!(body["field"].is_null());
    }

    #[tokio::test]
    async fn non_finite_product_volume_is_rejected() {
        let mut json = sample_json();
        for axis in ["packageLengthCm", "packageWidthCm", "packageHeightCm"] {
            json["products"][0][axis] = json!(1e200);
        }
        let response = handle_plan(State(state()), Ok(Json(request(json)))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "malformed_line_item");
        assert_eq!(body["field"], "unitVolumeM3");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(health) = handle_health().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
