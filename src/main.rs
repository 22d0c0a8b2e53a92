mod engine;
mod handlers;
mod middleware;
mod models;
mod remote;
mod state;
mod store;
mod sync;

use std::env;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use log::info;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::active_trip_id;
use crate::remote::SheetClient;
use crate::state::{AppContext, AppData, AppState};
use crate::store::LocalStore;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let sheet_url = env::var("SHEET_URL").expect("SHEET_URL must be set");
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let sync_interval: u64 = env::var("SYNC_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);

    let local_store = LocalStore::new(&data_dir).expect("Failed to create data directory");
    let loaded = local_store.load();
    let active = active_trip_id(&loaded.trips).unwrap_or_default();
    info!(
        "loaded local state: {} records, {} trips, {} types, {} users",
        loaded.records.len(),
        loaded.trips.len(),
        loaded.pallet_types.len(),
        loaded.users.len()
    );

    let app_state = AppContext::new(
        AppData {
            users: loaded.users,
            pallet_types: loaded.pallet_types,
            records: loaded.records,
            trips: loaded.trips,
            active_trip_id: active,
            sheet_url,
            last_sync_time: None,
            last_sync_error: None,
        },
        local_store,
        SheetClient::new(),
    );

    // Background silent sync: the first tick fires immediately, covering the
    // on-startup fetch, then every sync_interval seconds.
    tokio::spawn(sync::run_periodic(app_state.clone(), sync_interval));

    let app = create_router(app_state);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    info!("pallettrack listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/api/state", get(handlers::app_state))
        .route("/api/status", get(handlers::sync_status))
        .route("/api/scan", post(handlers::scan::scan))
        .route("/api/trips", post(handlers::trips::create_trip))
        .route("/api/sync", post(handlers::settings::manual_sync))
        // Admin settings
        .route("/api/settings/types", post(handlers::settings::add_type))
        .route("/api/settings/types/:id", post(handlers::settings::update_type))
        .route("/api/settings/types/:id/delete", post(handlers::settings::delete_type))
        .route("/api/settings/users", post(handlers::settings::replace_users))
        .route("/api/settings/sheet-url", post(handlers::settings::set_sheet_url))
        .route("/api/reset", post(handlers::settings::reset_all_data))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                // Inspection photos arrive as base64 data URIs
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .with_state(app_state)
}
