use crate::api::{BuildOptions, GraphBuild, RepographError, ReportInput, build_graph};
use crate::config::Config;
use crate::model::{Graph, GraphOrigin};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Application state shared across handlers
pub struct AppState {
    /// Graph built at startup, served from `/api/graph`.
    pub build: GraphBuild,
    /// Configuration for on-demand builds. A target's own `.repograph.toml`
    /// is never read, so its analyzer command never runs.
    pub config: Config,
    /// Limit for each on-demand build.
    pub timeout: Duration,
    /// Browser origins allowed to call `/api/analyze`. Empty means
    /// same-origin only.
    pub analyze_origins: Vec<HeaderValue>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub path: PathBuf,
    /// Dependency report file to try before scanning.
    #[serde(default)]
    pub report: Option<PathBuf>,
    /// Run the configured analyzer before scanning.
    #[serde(default)]
    pub analyzer: bool,
}

#[derive(Debug, Serialize)]
struct GraphResponse<'a> {
    origin: GraphOrigin,
    #[serde(flatten)]
    graph: &'a Graph,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<RepographError> for ApiError {
    fn from(err: RepographError) -> Self {
        let status = match err {
            RepographError::PathNotFound(_) => StatusCode::NOT_FOUND,
            RepographError::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RepographError::Scan(_) | RepographError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    // The startup graph is read-only and may be fetched from anywhere.
    let public_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(health_handler))
        .route("/api/graph", get(graph_handler))
        .layer(public_cors);

    // Analyze reads arbitrary local paths; only listed origins get CORS.
    let mut analyze = Router::new().route("/api/analyze", post(analyze_handler));
    if !state.analyze_origins.is_empty() {
        analyze = analyze.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(state.analyze_origins.clone()))
                .allow_methods([Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    public.merge(analyze).with_state(state)
}

/// Start the HTTP server for the graph API
pub async fn serve(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(Arc::new(state));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn graph_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(GraphResponse {
        origin: state.build.origin,
        graph: &state.build.graph,
    })
    .into_response()
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    let report = match (request.report, request.analyzer) {
        (Some(file), _) => ReportInput::File(file),
        (None, true) => ReportInput::Analyzer,
        (None, false) => ReportInput::None,
    };
    let options = BuildOptions {
        report,
        config: Some(state.config.clone()),
    };
    let path = request.path;

    // The build is synchronous; a timeout drops the whole result.
    let task = tokio::task::spawn_blocking(move || build_graph(&path, &options));
    let build = match tokio::time::timeout(state.timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => {
            return Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Build task failed: {}", join_err),
            });
        }
        Err(_) => {
            return Err(ApiError {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: format!("Build exceeded {:?}", state.timeout),
            });
        }
    };

    Ok(Json(GraphResponse {
        origin: build.origin,
        graph: &build.graph,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(config: Config, analyze_origins: Vec<HeaderValue>) -> Arc<AppState> {
        Arc::new(AppState {
            build: GraphBuild {
                graph: Graph::default(),
                origin: GraphOrigin::Scan,
            },
            config,
            timeout: Duration::from_secs(30),
            analyze_origins,
        })
    }

    fn state() -> Arc<AppState> {
        state_with(Config::default(), Vec::new())
    }

    fn preflight(uri: &str, origin: &str, method: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_graph_handler_returns_origin_and_graph() {
        let response = graph_handler(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["origin"], "scan");
        assert!(json["nodes"].as_array().unwrap().is_empty());
        assert!(json["edges"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_handler_scans_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("lib/a.js"), "require('./b');\n").unwrap();
        std::fs::write(dir.path().join("lib/b.js"), "").unwrap();

        let request = AnalyzeRequest {
            path: dir.path().to_path_buf(),
            report: None,
            analyzer: false,
        };
        let response = analyze_handler(State(state()), Json(request)).await.unwrap();
        let json = body_json(response).await;

        assert_eq!(json["origin"], "scan");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["edges"][0]["source"], "lib/a.js");
        assert_eq!(json["edges"][0]["target"], "lib/b.js");
    }

    #[tokio::test]
    async fn test_analyze_handler_missing_path_is_not_found() {
        let request = AnalyzeRequest {
            path: PathBuf::from("/nonexistent/repograph/project"),
            report: None,
            analyzer: false,
        };
        let err = analyze_handler(State(state()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graph_endpoint_allows_any_origin() {
        let app = router(state());
        let response = app
            .oneshot(preflight("/api/graph", "http://example.com", "GET"))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_analyze_endpoint_rejects_unlisted_origins() {
        let app = router(state());
        let response = app
            .oneshot(preflight("/api/analyze", "http://example.com", "POST"))
            .await
            .unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        let listed = HeaderValue::from_static("http://localhost:5173");
        let app = router(state_with(Config::default(), vec![listed.clone()]));
        let allowed = app
            .clone()
            .oneshot(preflight("/api/analyze", "http://localhost:5173", "POST"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&listed)
        );

        let other = app
            .oneshot(preflight("/api/analyze", "http://example.com", "POST"))
            .await
            .unwrap();
        assert!(other.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_ignores_target_analyzer_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        std::fs::write(
            dir.path().join(".repograph.toml"),
            format!(
                "[report]\ncommand = [\"sh\", \"-c\", \"touch {}\"]\n",
                marker.display()
            ),
        )
        .unwrap();
        std::fs::write(dir.path().join("a.js"), "").unwrap();

        let mut config = Config::default();
        config.report.command = vec!["repograph-no-such-analyzer".to_string()];
        let request = AnalyzeRequest {
            path: dir.path().to_path_buf(),
            report: None,
            analyzer: true,
        };
        let response = analyze_handler(State(state_with(config, Vec::new())), Json(request))
            .await
            .unwrap();
        let json = body_json(response).await;

        assert!(!marker.exists());
        assert_eq!(json["origin"], "scan");
    }
}
