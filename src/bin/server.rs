use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use load_planner::catalog::{VehicleCatalog, VehicleSelection, VehicleTypeSpec};
use load_planner::input::{self, InputOptions, LoadRecord};
use load_planner::planner::Planner;
use load_planner::report::PlanReport;
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct PlanRequest {
    loads: Vec<LoadRecord>,
    #[serde(default)]
    trailers: Vec<String>,
    #[serde(default)]
    containers: Vec<String>,
    #[serde(flatten)]
    options: InputOptions,
    /// Replaces the built-in catalog for this request.
    #[serde(default)]
    catalog: Option<Vec<VehicleTypeSpec>>,
}

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn catalog() -> Json<Vec<VehicleTypeSpec>> {
    Json(VehicleCatalog::default().iter().cloned().collect())
}

async fn plan(Json(req): Json<PlanRequest>) -> Result<Json<PlanReport>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /plan"
    );

    let catalog = match req.catalog {
        Some(types) => VehicleCatalog::new(types).map_err(bad_request)?,
        None => VehicleCatalog::default(),
    };

    let mut selection = VehicleSelection {
        trailers: req.trailers,
        containers: req.containers,
    };
    if selection.is_empty() {
        selection = catalog.select_all();
    }

    let loads = input::loads_from_records(req.loads, &req.options).map_err(bad_request)?;
    let planner = Planner::new(&catalog, &selection).map_err(bad_request)?;
    let result = planner.plan(&loads).map_err(bad_request)?;

    Ok(Json(PlanReport::from(&result)))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to open development.log: {}", e);
            std::process::exit(1);
        });

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    // Reads SENTRY_DSN; reporting stays off without it.
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/catalog", get(catalog))
        .route("/plan", post(plan))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        eprintln!("Error: cannot bind {addr}: {e}");
        std::process::exit(1);
    });
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
