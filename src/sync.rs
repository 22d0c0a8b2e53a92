//! Sync orchestration: periodic fetch-and-merge against the sheet, and the
//! fire-and-forget push that follows every local mutation.

use std::time::Duration;

use log::{info, warn};

use crate::engine::merge;
use crate::models::{active_trip_id, InventoryRecord};
use crate::state::AppState;

/// Periodic silent sync, the same fixed cadence the clients always ran. No
/// backoff: a failed tick just waits for the next one.
pub async fn run_periodic(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        fetch_and_merge(&state).await;
    }
}

/// Fetch the full remote snapshot and reconcile it into the in-memory state.
///
/// Skipped (not queued) when a fetch or push is already in flight or a reset
/// is running. On failure the previous state is left untouched and a short
/// status string is recorded for the UI.
pub async fn fetch_and_merge(state: &AppState) {
    if !state.begin_fetch() {
        return;
    }

    let endpoint = state.data.lock().unwrap().sheet_url.clone();
    let fetched = state.client.fetch_all(&endpoint).await;

    {
        let mut data = state.data.lock().unwrap();
        match fetched {
            Ok(snapshot) => {
                if let Some(users) = snapshot.users {
                    data.users = users;
                }
                if let Some(types) = snapshot.types {
                    data.pallet_types = types;
                }
                if let Some(trips) = snapshot.trips {
                    if let Some(active) = active_trip_id(&trips) {
                        data.active_trip_id = active;
                    }
                    data.trips = trips;
                }
                let remote: Vec<InventoryRecord> = snapshot
                    .records
                    .unwrap_or_default()
                    .into_iter()
                    .map(InventoryRecord::from)
                    .collect();
                data.records = merge(&data.records, remote);
                data.last_sync_time = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                data.last_sync_error = None;
                state.persist(&data);
            }
            Err(e) => {
                warn!("sync fetch failed: {e}");
                data.last_sync_error = Some("Connection error".to_string());
            }
        }
    }

    state.end_fetch();
}

/// Spawn a push of the current full snapshot. Fire-and-forget: callers get
/// their local result immediately and the push settles in the background.
pub fn spawn_push(state: &AppState) {
    let state = state.clone();
    tokio::spawn(async move {
        push_snapshot(&state).await;
    });
}

async fn push_snapshot(state: &AppState) {
    if !state.begin_push() {
        return;
    }

    let (endpoint, types, records, trips, users) = {
        let data = state.data.lock().unwrap();
        (
            data.sheet_url.clone(),
            data.pallet_types.clone(),
            data.records.clone(),
            data.trips.clone(),
            data.users.clone(),
        )
    };

    let result = state
        .client
        .push_all(&endpoint, &types, &records, &trips, &users)
        .await;

    {
        let mut data = state.data.lock().unwrap();
        match result {
            Ok(()) => {
                info!("pushed snapshot: {} records, {} trips", records.len(), trips.len());
                data.last_sync_time = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                data.last_sync_error = None;
            }
            Err(e) => {
                warn!("sync push failed: {e}");
                data.last_sync_error = Some("Sync failed".to_string());
            }
        }
    }

    state.end_push();
}
