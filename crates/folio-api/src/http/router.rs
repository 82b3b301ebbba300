//! Router construction and server host.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    middleware,
    routing::{MethodRouter, get, post, put},
};
use folio_core::media::MAX_UPLOAD_BYTES;
use folio_core::model::{Goal, HeroBadge, NavigationLink, Project, Skill, SocialLink, Tool};
use folio_telemetry::build_sha;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::Span;

use crate::http::admin::{collections, content, dashboard, media, pages};
use crate::http::auth::{login, login_page, logout, require_session};
use crate::http::constants::{HEADER_FILE_NAME, HEADER_LAST_EVENT_ID, HEADER_REQUEST_ID};
use crate::http::health::{health, metrics};
use crate::http::public::{home, project, projects};
use crate::http::sse::stream_events;
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::{AdminCollection, ApiState};

/// Axum router wrapper that hosts the Folio site and HQ.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the server over `state`, serving uploaded files from
    /// `media_root` under `/media`.
    #[must_use]
    pub fn new(state: Arc<ApiState>, media_root: &Path) -> Self {
        let telemetry = state.telemetry.clone();
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                HeaderName::from_static(HEADER_LAST_EVENT_ID),
                HeaderName::from_static(HEADER_FILE_NAME),
            ]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(folio_telemetry::propagate_request_id_layer())
            .layer(folio_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::build_router(&state)
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state)
            .nest_service("/media", ServeDir::new(media_root));

        Self { router }
    }

    fn build_router(state: &Arc<ApiState>) -> Router<Arc<ApiState>> {
        Self::public_routes().merge(Self::admin_routes(state))
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/", get(home))
            .route("/projects", get(projects))
            .route("/projects/{id}", get(project))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/admin/login", get(login_page).post(login))
    }

    fn admin_routes(state: &Arc<ApiState>) -> Router<Arc<ApiState>> {
        let guard = middleware::from_fn_with_state(state.clone(), require_session);
        // Bodies past this cap are still answered as oversized uploads.
        let upload_limit = || DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 4);

        let router = Router::new()
            .route("/admin", get(dashboard::dashboard))
            .route("/admin/logout", post(logout))
            .route("/admin/events", get(stream_events))
            .route(
                "/admin/profile",
                get(pages::profile).put(pages::save_profile),
            )
            .route(
                "/admin/profile/avatar",
                post(media::upload_avatar).layer(upload_limit()),
            )
            .route(
                "/admin/content",
                get(content::content).put(content::save_hero),
            )
            .route("/admin/appearance", get(pages::appearance))
            .route("/admin/appearance/theme", put(pages::save_theme))
            .route("/admin/appearance/sections", put(pages::save_sections))
            .route(
                "/admin/appearance/sections/order",
                put(pages::reorder_sections),
            )
            .route(
                "/admin/navigation/navbar",
                get(pages::navbar).put(pages::save_navbar),
            )
            .route(
                "/admin/settings",
                get(pages::site_settings).put(pages::save_site_settings),
            )
            .route("/admin/github", get(dashboard::github))
            .route(
                "/admin/media",
                get(media::list_media)
                    .post(media::upload_media)
                    .layer(upload_limit()),
            );

        let router = mount_collection::<Project>(router, "/admin/projects");
        let router = mount_collection::<Skill>(router, "/admin/skills");
        let router = mount_collection::<Goal>(router, "/admin/goals");
        let router = mount_collection::<Tool>(router, "/admin/tools");
        let router = mount_collection::<NavigationLink>(router, "/admin/navigation");
        let router = mount_batch_collection::<HeroBadge>(router, "/admin/content/badges");
        let router = mount_batch_collection::<SocialLink>(router, "/admin/content/social-links");

        router.route_layer(guard)
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        tracing::info!("Starting Folio on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// The assembled router, for in-process requests.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Page, add, edit, delete, visibility and order routes for one collection.
fn mount_collection<R: AdminCollection>(
    router: Router<Arc<ApiState>>,
    base: &str,
) -> Router<Arc<ApiState>> {
    let page: MethodRouter<Arc<ApiState>> =
        get(collections::page::<R>).post(collections::create::<R>);
    router
        .route(base, page)
        .route(&format!("{base}/order"), put(collections::reorder::<R>))
        .route(
            &format!("{base}/{{id}}"),
            put(collections::update::<R>).delete(collections::remove::<R>),
        )
        .route(
            &format!("{base}/{{id}}/visibility"),
            post(collections::toggle_visibility::<R>),
        )
}

/// Collection routes plus the batch editor save on `PUT base`.
fn mount_batch_collection<R: AdminCollection>(
    router: Router<Arc<ApiState>>,
    base: &str,
) -> Router<Arc<ApiState>> {
    let page: MethodRouter<Arc<ApiState>> = get(collections::page::<R>)
        .post(collections::create::<R>)
        .put(collections::save_all::<R>);
    router
        .route(base, page)
        .route(&format!("{base}/order"), put(collections::reorder::<R>))
        .route(
            &format!("{base}/{{id}}"),
            put(collections::update::<R>).delete(collections::remove::<R>),
        )
        .route(
            &format!("{base}/{{id}}/visibility"),
            post(collections::toggle_visibility::<R>),
        )
}
