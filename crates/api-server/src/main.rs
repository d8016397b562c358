use anyhow::Result;
use application::TeamApp;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use config::Config;
use domain::{DomainError, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
struct AppState {
    team_app: Arc<TeamApp>,
    assets_dir: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    email: String,
    #[serde(default)]
    specialties: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateEmailRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct AddSpecialtyRequest {
    specialty: String,
}

#[derive(Debug, Serialize)]
struct UserInfo {
    user_id: i32,
    username: String,
    email: String,
    specialties: Vec<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id.unwrap_or_default(),
            username: user.username,
            email: user.email,
            specialties: user.specialties,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    message: String,
    version: String,
    environment: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("api_server=debug,tower_http=debug")
        .init();

    info!("🚀 Starting WTUS Team System API Server");

    // Load configuration from environment
    let config = Config::from_env(None);

    info!("💾 Using database: {}", config.database_path);
    info!(
        "🌐 API server will bind to: {}:{}",
        config.api_host, config.api_port
    );

    let team_app = Arc::new(
        TeamApp::new(&config.database_path)
            .map_err(|e| anyhow::anyhow!("failed to initialize application: {e}"))?,
    );
    let app_state = AppState {
        team_app,
        assets_dir: config.assets_dir.clone(),
    };

    let app = app(app_state);

    // Run the server
    let bind_address = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🌐 API Server listening on http://{}", bind_address);
    info!("📖 API Documentation:");
    info!("   POST   /users                          - Create user");
    info!("   GET    /users/:id                      - Get user");
    info!("   PUT    /users/:id/email                - Update user email");
    info!("   POST   /users/:id/specialties          - Add specialty");
    info!("   DELETE /users/:id/specialties/:value   - Remove specialty");
    info!("   GET    /assets                         - List downloadable assets");
    info!("   GET    /assets/:filename               - Download asset (stub)");
    info!("   *      /schedules, /tasks              - Stubs");
    info!("   GET    /status                         - System status");
    info!("   GET    /health                         - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // User directory endpoints
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/email", put(update_email))
        .route("/users/:id/specialties", post(add_specialty))
        .route("/users/:id/specialties/:value", delete(remove_specialty))
        // Downloadable assets
        .route("/assets", get(list_assets))
        .route("/assets/:filename", get(not_implemented))
        // Schedule and task endpoints are stubs, as in the original system
        .route("/schedules", get(not_implemented).post(not_implemented))
        .route("/schedules/:id", get(not_implemented).put(not_implemented).delete(not_implemented))
        .route("/tasks", get(not_implemented).post(not_implemented))
        .route("/tasks/:id", put(not_implemented).delete(not_implemented))
        // System info endpoints
        .route("/status", get(get_system_status))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn domain_error_response(e: DomainError) -> Response {
    let status = match &e {
        DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
        DomainError::Gone(_) => StatusCode::GONE,
        DomainError::DataIntegrity(_)
        | DomainError::SchemaError(_)
        | DomainError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

fn user_not_found(id: i32) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("user {id} not found") })),
    )
        .into_response()
}

// Handler functions
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Response {
    match state
        .team_app
        .user_service
        .create_user(payload.username, payload.email, payload.specialties)
        .await
    {
        Ok(user) => {
            info!("✅ Created user: {}", user.username);
            (StatusCode::CREATED, Json(UserInfo::from(user))).into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    match state.team_app.user_service.get_user(id).await {
        Ok(Some(user)) => Json(UserInfo::from(user)).into_response(),
        Ok(None) => user_not_found(id),
        Err(e) => domain_error_response(e),
    }
}

async fn update_email(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEmailRequest>,
) -> Response {
    let mut user = match state.team_app.user_service.get_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return user_not_found(id),
        Err(e) => return domain_error_response(e),
    };

    match state
        .team_app
        .user_service
        .update_email(&mut user, &payload.email)
        .await
    {
        Ok(()) => Json(UserInfo::from(user)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

async fn add_specialty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AddSpecialtyRequest>,
) -> Response {
    let mut user = match state.team_app.user_service.get_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return user_not_found(id),
        Err(e) => return domain_error_response(e),
    };

    match state
        .team_app
        .user_service
        .add_specialty(&mut user, &payload.specialty)
        .await
    {
        Ok(()) => Json(UserInfo::from(user)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

async fn remove_specialty(
    State(state): State<AppState>,
    Path((id, value)): Path<(i32, String)>,
) -> Response {
    let mut user = match state.team_app.user_service.get_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return user_not_found(id),
        Err(e) => return domain_error_response(e),
    };

    match state
        .team_app
        .user_service
        .remove_specialty(&mut user, &value)
        .await
    {
        Ok(()) => Json(UserInfo::from(user)).into_response(),
        Err(e) => domain_error_response(e),
    }
}

async fn list_assets(State(state): State<AppState>) -> Response {
    let mut entries = match tokio::fs::read_dir(&state.assets_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        files.push(entry.file_name().to_string_lossy().into_owned());
    }
    files.sort();
    Json(files).into_response()
}

async fn not_implemented() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "error": "Not Implemented" })),
    )
        .into_response()
}

async fn get_system_status() -> Response {
    let status = StatusResponse {
        message: "WTUS Team System API Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: std::env::var("ENV").unwrap_or_else(|_| "development".to_string()),
    };
    Json(status).into_response()
}

async fn health_check() -> Response {
    Json(serde_json::json!({ "status": "healthy" })).into_response()
}
