//! Shared application state and the HTTP router.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{require_caller, ApiResponse};
use crate::services::{
    AuthService, ChapterContentStore, ChapterService, CharacterService, MiscService, NovelService,
    SnapshotService, TokenBlacklistService, WorldEventService, WorldViewService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub content: Arc<ChapterContentStore>,
    pub tokens: Arc<TokenIssuer>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn Store>,
        content: Arc<ChapterContentStore>,
    ) -> Result<Self, TokenError> {
        let hasher = PasswordHasher::new(
            config.security.password_hash_iterations,
            config.security.password_hash_concurrency,
        );
        Self::with_hasher(config, store, content, hasher)
    }

    /// Same as [`AppState::new`] with an explicit hasher (tests use cheap ones)
    pub fn with_hasher(
        config: Arc<AppConfig>,
        store: Arc<dyn Store>,
        content: Arc<ChapterContentStore>,
        hasher: PasswordHasher,
    ) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenIssuer::new(&config.security)?);
        Ok(Self {
            config,
            store,
            content,
            tokens,
            hasher,
        })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn blacklist(&self) -> TokenBlacklistService {
        TokenBlacklistService::new(self.store.clone())
    }

    pub fn world_views(&self) -> WorldViewService {
        WorldViewService::new(self.store.clone(), self.content.clone())
    }

    pub fn characters(&self) -> CharacterService {
        CharacterService::new(self.store.clone())
    }

    pub fn snapshots(&self) -> SnapshotService {
        SnapshotService::new(self.store.clone())
    }

    pub fn miscs(&self) -> MiscService {
        MiscService::new(self.store.clone())
    }

    pub fn world_events(&self) -> WorldEventService {
        WorldEventService::new(self.store.clone())
    }

    pub fn novels(&self) -> NovelService {
        NovelService::new(self.store.clone(), self.content.clone())
    }

    pub fn chapters(&self) -> ChapterService {
        ChapterService::new(self.store.clone(), self.content.clone())
    }
}

/// Full application: prefixed API, health and root, envelope fallback
pub fn router(state: AppState) -> Router {
    let prefix = state.config.server.api_prefix.clone();
    let cors = cors_layer(&state.config.server.cors_origins);

    let api = public_routes().merge(protected_routes(state.clone()));
    let api = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, chapters, characters, miscs, novels, snapshots, world_events, world_views};

    Router::new()
        .route("/auth/userinfo", get(auth::userinfo))
        .route("/auth/logout", post(auth::logout))
        .route("/worldviews", get(world_views::list).post(world_views::create))
        .route(
            "/worldviews/:id",
            get(world_views::show).put(world_views::update).delete(world_views::remove),
        )
        .route("/characters", get(characters::list).post(characters::create))
        .route(
            "/characters/:id",
            get(characters::show).put(characters::update).delete(characters::remove),
        )
        .route(
            "/character-snapshots",
            get(snapshots::list).post(snapshots::create),
        )
        .route(
            "/character-snapshots/:id",
            get(snapshots::show).put(snapshots::update).delete(snapshots::remove),
        )
        .route("/miscs", get(miscs::list).post(miscs::create))
        .route(
            "/miscs/:id",
            get(miscs::show).put(miscs::update).delete(miscs::remove),
        )
        .route("/world-events", get(world_events::list).post(world_events::create))
        .route(
            "/world-events/list/:world_view_id",
            get(world_events::timeline),
        )
        .route(
            "/world-events/:id",
            get(world_events::show).put(world_events::update).delete(world_events::remove),
        )
        .route("/novels", get(novels::list).post(novels::create))
        .route(
            "/novels/:id",
            get(novels::show).put(novels::update).delete(novels::remove),
        )
        .route(
            "/novels/:novel_id/chapters",
            get(chapters::list).post(chapters::create),
        )
        .route(
            "/novels/:novel_id/chapters/:id",
            get(chapters::show).put(chapters::update).delete(chapters::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, require_caller))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(CorsAny);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(CorsAny);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("handler panicked: {}", detail);
    ApiError::internal_server_error("An error occurred while processing your request").into_response()
}

async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

async fn root() -> ApiResponse<serde_json::Value> {
    ApiResponse::success(json!({
        "name": "TaleArc API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    match state.store.ping().await {
        Ok(()) => Ok(ApiResponse::success(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
