mod config;
mod models;
mod routes;
mod services;
mod store;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use tokio::sync::{watch, RwLock};
use tower_http::cors::{AllowHeaders, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use models::family::FamilyDocument;
use services::mailer::Mailer;
use services::relay::RelayClient;
use store::Store;

/// Application state shared across all handlers and the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub doc: Arc<RwLock<FamilyDocument>>,
    pub store: Arc<Store>,
    pub config: Arc<Config>,
    pub relay: Arc<RelayClient>,
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    /// Persist the current snapshot. Mutations call this after releasing the
    /// write lock; a failed save is logged and the in-memory state stands.
    pub async fn save_snapshot(&self) {
        let doc = self.doc.read().await.clone();
        if let Err(e) = self.store.save(&doc).await {
            warn!("Failed to persist snapshot: {e:#}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let store = Arc::new(Store::open(&config).await?);
    let doc = store.load().await?;
    info!(
        "Loaded family snapshot: {} event(s), {} task(s), {} member(s), {} reminder(s)",
        doc.events.len(),
        doc.tasks.len(),
        doc.members.len(),
        doc.reminders.len()
    );

    let mailer = Mailer::from_config(&config).map(Arc::new);
    if mailer.is_some() {
        info!("SendGrid configured — SMS relay enabled");
    } else {
        info!("SendGrid not configured — relay endpoint will refuse sends");
    }

    let relay = Arc::new(RelayClient::new(
        config.relay_endpoint(),
        config.relay_api_key.clone(),
    ));

    let state = AppState {
        doc: Arc::new(RwLock::new(doc)),
        store,
        config: config.clone(),
        relay,
        mailer,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    services::dispatcher::start(state.clone(), shutdown_rx);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ]))
        .allow_origin(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Relay
        .route("/send-reminder", post(routes::relay::send_reminder))
        .route("/send-reminder/test", post(routes::relay::test_relay))
        // Family
        .route(
            "/family",
            get(routes::family::get_family).post(routes::family::join_family),
        )
        .route("/overview", get(routes::overview::get_overview))
        // Events
        .route(
            "/events",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route(
            "/events/{id}",
            put(routes::events::update_event).delete(routes::events::delete_event),
        )
        .route("/events/{id}/notify", post(routes::events::notify_event))
        // Tasks
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/{id}/toggle", post(routes::tasks::toggle_task))
        .route("/tasks/{id}/notify", post(routes::tasks::notify_task))
        // Members
        .route(
            "/members",
            get(routes::members::list_members).post(routes::members::create_member),
        )
        .route("/members/{id}", delete(routes::members::delete_member))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Family Hub API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = shutdown_tx.send(true);
    info!("Shut down cleanly");

    Ok(())
}
