//! HTTP routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use pokearena_domain::{
    BatchSize, ElementType, GeneratedBatch, LookupError, RecordSummary, SessionState, Terrain,
    ValidationError, NO_DOMINANT_TYPE,
};

use crate::app::App;
use crate::use_cases::arena::{BattleReport, ContenderRejection, NarrationError};
use crate::use_cases::lab::{CompanionReport, GenerationError, RecommendationError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/terrains", get(list_terrains))
        .route("/api/element-types", get(list_element_types))
        .route("/api/arena/contenders", post(submit_contenders))
        .route("/api/arena/battle", post(start_battle))
        .route("/api/lab/batch", post(generate_batch))
        .route("/api/lab/companion", post(recommend_companion))
        .route("/api/session", get(get_session))
        .route("/api/session/reset", post(reset_session))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Reference data
// =============================================================================

#[derive(Debug, Serialize)]
struct TerrainInfo {
    name: Terrain,
    favoured_types: &'static [ElementType],
    default: bool,
}

async fn list_terrains() -> Json<Vec<TerrainInfo>> {
    let default = Terrain::default();
    Json(
        Terrain::all()
            .iter()
            .map(|&terrain| TerrainInfo {
                name: terrain,
                favoured_types: terrain.favoured_types(),
                default: terrain == default,
            })
            .collect(),
    )
}

#[derive(Debug, Serialize)]
struct ElementTypeList {
    types: &'static [ElementType],
    /// Label meaning "no dominant type" in batch requests.
    none: &'static str,
}

async fn list_element_types() -> Json<ElementTypeList> {
    Json(ElementTypeList {
        types: ElementType::all(),
        none: NO_DOMINANT_TYPE,
    })
}

// =============================================================================
// Arena
// =============================================================================

/// Each contender is JSON text, or a JSON object taken as-is.
#[derive(Debug, Deserialize)]
struct ContendersRequest {
    champion: Value,
    adversary: Value,
    terrain: Option<String>,
}

#[derive(Debug, Serialize)]
struct ContendersResponse {
    champion: RecordSummary,
    adversary: RecordSummary,
    terrain: Terrain,
}

fn submitted_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

async fn submit_contenders(
    State(app): State<Arc<App>>,
    Json(request): Json<ContendersRequest>,
) -> Result<Json<ContendersResponse>, ApiError> {
    let terrain = match request.terrain.as_deref() {
        Some(label) => label.parse::<Terrain>()?,
        None => Terrain::default(),
    };

    let champion = submitted_text(request.champion);
    let adversary = submitted_text(request.adversary);

    let mut session = app.session.lock().await;
    let validated = app
        .use_cases
        .arena
        .validate_contenders
        .execute(&mut session, &champion, &adversary, terrain)?;

    Ok(Json(ContendersResponse {
        champion: validated.champion.summary(),
        adversary: validated.adversary.summary(),
        terrain: validated.terrain,
    }))
}

async fn start_battle(State(app): State<Arc<App>>) -> Result<Json<BattleReport>, ApiError> {
    let session = app.session.lock().await;
    let report = app.use_cases.arena.narrate_battle.execute(&session).await?;
    Ok(Json(report))
}

// =============================================================================
// Lab
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct BatchRequest {
    size: Option<i64>,
    dominant_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    count: usize,
    columns: Vec<String>,
    records: GeneratedBatch,
}

impl From<GeneratedBatch> for BatchResponse {
    fn from(batch: GeneratedBatch) -> Self {
        Self {
            count: batch.len(),
            columns: batch.columns().into_iter().map(str::to_string).collect(),
            records: batch,
        }
    }
}

async fn generate_batch(
    State(app): State<Arc<App>>,
    request: Option<Json<BatchRequest>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = request.unwrap_or_default();

    let size = match request.size {
        Some(size) => BatchSize::new(size)?,
        None => app.default_batch_size,
    };
    let dominant_type = match request.dominant_type.as_deref() {
        Some(label) => ElementType::parse_dominant(label)?,
        None => None,
    };

    let mut session = app.session.lock().await;
    let batch = app
        .use_cases
        .lab
        .generate_batch
        .execute(&mut session, size, dominant_type)
        .await?;

    Ok(Json(batch.into()))
}

#[derive(Debug, Deserialize)]
struct CompanionRequest {
    description: String,
}

async fn recommend_companion(
    State(app): State<Arc<App>>,
    Json(request): Json<CompanionRequest>,
) -> Result<Json<CompanionReport>, ApiError> {
    let mut session = app.session.lock().await;
    let report = app
        .use_cases
        .lab
        .recommend_companion
        .execute(&mut session, &request.description)
        .await?;
    Ok(Json(report))
}

// =============================================================================
// Session
// =============================================================================

async fn get_session(State(app): State<Arc<App>>) -> Json<SessionState> {
    Json(app.session.snapshot().await)
}

async fn reset_session(State(app): State<Arc<App>>) -> StatusCode {
    app.session.reset().await;
    StatusCode::NO_CONTENT
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// At least one contender failed validation.
    Rejected(ContenderRejection),
    /// The LLM failed or replied with something unusable.
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Rejected(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": rejection.to_string(),
                    "champion": rejection.champion.as_ref().map(ToString::to_string),
                    "adversary": rejection.adversary.as_ref().map(ToString::to_string),
                }),
            ),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ContenderRejection> for ApiError {
    fn from(e: ContenderRejection) -> Self {
        ApiError::Rejected(e)
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound(_) => ApiError::NotFound(e.to_string()),
            LookupError::NoBatch
            | LookupError::NoNameColumn { .. }
            | LookupError::AmbiguousName { .. } => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<NarrationError> for ApiError {
    fn from(e: NarrationError) -> Self {
        match e {
            NarrationError::MissingContenders => ApiError::Conflict(e.to_string()),
            NarrationError::Service(_) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        ApiError::BadGateway(e.to_string())
    }
}

impl From<RecommendationError> for ApiError {
    fn from(e: RecommendationError) -> Self {
        match e {
            RecommendationError::EmptyDescription => ApiError::BadRequest(e.to_string()),
            RecommendationError::NoBatch => ApiError::Conflict(e.to_string()),
            RecommendationError::Lookup(lookup) => lookup.into(),
            RecommendationError::Service(_) | RecommendationError::Extraction(_) => {
                ApiError::BadGateway(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::infrastructure::ports::{LlmError, LlmResponse, MockLlmPort};

    fn router(llm: MockLlmPort) -> Router {
        let app = Arc::new(App::new(Arc::new(llm), BatchSize::default()));
        routes().with_state(app)
    }

    fn idle_llm() -> MockLlmPort {
        let mut llm = MockLlmPort::new();
        llm.expect_generate().never();
        llm
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn contenders_body() -> Value {
        json!({
            "champion": r#"{"nom":"Flamgeist","type":"Feu"}"#,
            "adversary": {"Nom": "Aquashock", "Type": "Eau"},
            "terrain": "Volcan"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let router = router(idle_llm());
        let response = router
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reference_lists() {
        let router = router(idle_llm());

        let (status, terrains) =
            send(&router, Request::get("/api/terrains").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(terrains[0]["name"], "Volcan");
        assert_eq!(terrains[0]["default"], true);
        assert_eq!(terrains[0]["favoured_types"][0], "Feu");

        let (_, types) =
            send(&router, Request::get("/api/element-types").body(Body::empty()).unwrap()).await;
        assert_eq!(types["none"], "Aucun");
        assert_eq!(types["types"].as_array().map(Vec::len), Some(18));
    }

    #[tokio::test]
    async fn test_contenders_accepted() {
        let router = router(idle_llm());
        let (status, body) = send(&router, post_json("/api/arena/contenders", contenders_body())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["champion"]["name"], "Flamgeist");
        assert_eq!(body["adversary"]["type"], "Eau");
        assert_eq!(body["terrain"], "Volcan");
    }

    #[tokio::test]
    async fn test_contenders_rejected_per_side() {
        let router = router(idle_llm());
        let (status, body) = send(
            &router,
            post_json(
                "/api/arena/contenders",
                json!({"champion": "{oops", "adversary": r#"{"Name":"B","Type":"Sol"}"#}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["champion"].is_string());
        assert!(body["adversary"].is_null());

        let (_, session) =
            send(&router, Request::get("/api/session").body(Body::empty()).unwrap()).await;
        assert!(session["champion"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_terrain() {
        let router = router(idle_llm());
        let mut body = contenders_body();
        body["terrain"] = json!("Lune");
        let (status, _) = send(&router, post_json("/api/arena/contenders", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_battle_before_contenders_conflicts() {
        let router = router(idle_llm());
        let (status, body) = send(&router, post_json("/api/arena/battle", json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_battle_service_failure_is_bad_gateway() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::MissingApiKey));
        let router = router(llm);

        send(&router, post_json("/api/arena/contenders", contenders_body())).await;
        let (status, body) = send(&router, post_json("/api/arena/battle", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap_or_default().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_batch_size_validated_before_llm() {
        let router = router(idle_llm());
        let (status, _) = send(&router, post_json("/api/lab/batch", json!({"size": 11}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &router,
            post_json("/api/lab/batch", json!({"dominant_type": "Plasma"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_then_companion() {
        let mut llm = MockLlmPort::new();
        let mut seq = mockall::Sequence::new();
        llm.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(LlmResponse::text(
                    r#"{"pokemon":[{"Nom":"Aquashock","Type":"Eau"},{"Nom":"Flamgeist","Type":"Feu"},{"Nom":"Terragon","Type":"Sol"}]}"#,
                ))
            });
        llm.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(LlmResponse::text(r#"{"choix":"Flamgeist"}"#)));
        let router = router(llm);

        let (status, batch) = send(
            &router,
            post_json("/api/lab/batch", json!({"dominant_type": "Aucun"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(batch["count"], 3);
        assert_eq!(batch["columns"], json!(["nom", "type"]));
        assert_eq!(batch["records"][1]["nom"], "Flamgeist");

        let (status, companion) = send(
            &router,
            post_json("/api/lab/companion", json!({"description": "Fougueux"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(companion["choice"], "Flamgeist");
        assert!(companion["identity_card"]
            .as_str()
            .unwrap_or_default()
            .contains("\"type\": \"Feu\""));

        let (_, session) =
            send(&router, Request::get("/api/session").body(Body::empty()).unwrap()).await;
        assert_eq!(session["companion"]["name"], "Flamgeist");
    }

    #[tokio::test]
    async fn test_companion_without_batch_conflicts() {
        let router = router(idle_llm());
        let (status, _) = send(
            &router,
            post_json("/api/lab/companion", json!({"description": "Calme"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_session_reset() {
        let router = router(idle_llm());
        send(&router, post_json("/api/arena/contenders", contenders_body())).await;

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/session/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (_, session) =
            send(&router, Request::get("/api/session").body(Body::empty()).unwrap()).await;
        assert!(session["champion"].is_null());
        assert!(session["terrain"].is_null());
    }
}
