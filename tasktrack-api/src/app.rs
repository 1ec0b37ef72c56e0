/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktrack_api::{app::AppState, config::Config};
/// use tasktrack_shared::store::PgStore;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = tasktrack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tasktrack_shared::{
    auth::{authenticator::Authenticator, middleware::verify_request},
    store::{CredentialStore, TaskRepository},
    tasks::TaskService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub authenticator: Authenticator,

    /// Task operations
    pub tasks: TaskService,

    /// Identity lookups and store health
    pub credentials: Arc<dyn CredentialStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over a store implementing both traits
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: CredentialStore + TaskRepository + 'static,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let tasks: Arc<dyn TaskRepository> = store;

        Self {
            authenticator: Authenticator::new(credentials.clone(), config.jwt.secret.as_str()),
            tasks: TaskService::new(tasks),
            credentials,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health             # Health check (public)
/// ├── POST   /register           # Public
/// ├── POST   /login              # Public
/// ├── POST   /logout             # Authenticated
/// ├── GET    /profile            # Authenticated
/// ├── POST   /createtask         # Authenticated
/// ├── GET    /dashboard          # Authenticated
/// ├── GET    /assigned-tasks     # Authenticated
/// ├── PATCH  /tasks/:id/status   # Authenticated
/// └── DELETE /tasks/:id          # Authenticated, owner only
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer token verification (authenticated routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/profile", get(routes::profile::get_profile))
        .route("/createtask", post(routes::tasks::create_task))
        .route("/dashboard", get(routes::tasks::dashboard))
        .route("/assigned-tasks", get(routes::tasks::assigned_tasks))
        .route("/tasks/:id/status", patch(routes::tasks::update_status))
        .route("/tasks/:id", delete(routes::tasks::delete_task))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = if state.config.cors_permissive() {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

/// Bearer token verification layer
///
/// Validates the session token and injects `AuthContext` into request
/// extensions. The credential store is not consulted.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = verify_request(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
