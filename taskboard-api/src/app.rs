/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::Stores;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Stores::memory(), config);
/// let app = build_router(state);
/// # let _ = app;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::auth::{middleware::authenticate, session::SessionKeys};
use taskboard_shared::clock::{Clock, SystemClock};
use taskboard_shared::events::ChangeFeed;
use taskboard_shared::repository::{TaskRepository, UserDirectory};
use taskboard_shared::store::Stores;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, Level};

/// Shared application state
///
/// Cloned into each handler via Axum's `State` extractor; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Task operations
    pub tasks: TaskRepository,

    /// User profile operations
    pub users: UserDirectory,

    /// Session token verification keys
    pub sessions: SessionKeys,

    /// Application configuration
    pub config: Arc<Config>,

    /// Cancelled on shutdown; live streams end with it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// State on the system clock
    pub fn new(stores: Stores, config: Config) -> Self {
        Self::with_clock(stores, config, Arc::new(SystemClock))
    }

    /// State with an injected clock
    pub fn with_clock(stores: Stores, config: Config, clock: Arc<dyn Clock>) -> Self {
        let sessions = SessionKeys::new(&config.session.secret, config.session.issuer.clone());

        Self {
            tasks: TaskRepository::new(stores.tasks, clock.clone(), ChangeFeed::default()),
            users: UserDirectory::new(stores.users, clock),
            sessions,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                     # Liveness + store connectivity (public)
/// └── /v1/                        # Session-authenticated
///     ├── /tasks
///     │   ├── GET    /            # List (?completed=&priority=)
///     │   ├── POST   /            # Create
///     │   ├── GET    /stats       # Dashboard counters
///     │   ├── GET    /stream      # Live snapshots (SSE)
///     │   ├── GET    /:id         # Get
///     │   ├── PATCH  /:id         # Partial update
///     │   ├── DELETE /:id         # Delete
///     │   └── POST   /:id/toggle  # Flip completion
///     └── /users/me
///         ├── GET    /            # Own profile
///         ├── PUT    /            # Sync profile from session claims
///         └── POST   /seen        # Touch last_seen
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session authentication (`/v1` only)
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/stats", get(routes::tasks::task_stats))
        .route("/stream", get(routes::stream::stream_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::patch_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/toggle", post(routes::tasks::toggle_task));

    let user_routes = Router::new()
        .route(
            "/me",
            get(routes::users::get_me).put(routes::users::sync_me),
        )
        .route("/me/seen", post(routes::users::touch_me));

    let v1_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/users", user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Verifies the bearer token and injects the `SessionContext`
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let session = authenticate(req.headers(), &state.sessions)?;
    debug!(user_id = %session.user_id, "Session verified");

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
