//! Process-wide application state: the four collections behind one mutex,
//! plus the sync guards.
//!
//! All mutations are copy-on-write: the engines take slices and return new
//! vectors, and handlers swap whole collections while holding the lock, so
//! nothing observes a collection mid-update. The lock is a `std` mutex held
//! only for short, await-free sections.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::debug;

use crate::models::{InventoryRecord, PalletType, Trip, UserCredentials};
use crate::remote::SheetClient;
use crate::store::LocalStore;

pub struct AppData {
    pub users: Vec<UserCredentials>,
    pub pallet_types: Vec<PalletType>,
    pub records: Vec<InventoryRecord>,
    pub trips: Vec<Trip>,
    /// Id of the trip currently accepting loaded pallets; empty when none.
    pub active_trip_id: String,
    /// Remote sheet endpoint; admin-editable at runtime.
    pub sheet_url: String,
    pub last_sync_time: Option<String>,
    pub last_sync_error: Option<String>,
}

pub struct AppContext {
    pub data: Mutex<AppData>,
    pub store: LocalStore,
    pub client: SheetClient,
    fetch_in_flight: AtomicBool,
    push_in_flight: AtomicBool,
    resetting: AtomicBool,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    pub fn new(data: AppData, store: LocalStore, client: SheetClient) -> AppState {
        Arc::new(Self {
            data: Mutex::new(data),
            store,
            client,
            fetch_in_flight: AtomicBool::new(false),
            push_in_flight: AtomicBool::new(false),
            resetting: AtomicBool::new(false),
        })
    }

    /// Try to start a fetch. Refused while another fetch is running, while a
    /// push is mid-flight (the merge must not run against a state the push
    /// has not settled) or during a reset. Overlapping attempts are skipped,
    /// never queued.
    pub fn begin_fetch(&self) -> bool {
        if self.resetting.load(Ordering::SeqCst) || self.push_in_flight.load(Ordering::SeqCst) {
            return false;
        }
        let acquired = self
            .fetch_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !acquired {
            debug!("fetch already in flight, skipping");
        }
        acquired
    }

    pub fn end_fetch(&self) {
        self.fetch_in_flight.store(false, Ordering::SeqCst);
    }

    pub fn begin_push(&self) -> bool {
        if self.resetting.load(Ordering::SeqCst) {
            return false;
        }
        let acquired = self
            .push_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !acquired {
            debug!("push already in flight, skipping");
        }
        acquired
    }

    pub fn end_push(&self) {
        self.push_in_flight.store(false, Ordering::SeqCst);
    }

    /// Suspend all fetch/push activity for the duration of a destructive
    /// reset.
    pub fn begin_reset(&self) {
        self.resetting.store(true, Ordering::SeqCst);
    }

    pub fn end_reset(&self) {
        self.resetting.store(false, Ordering::SeqCst);
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting.load(Ordering::SeqCst)
    }

    pub fn is_syncing(&self) -> bool {
        self.fetch_in_flight.load(Ordering::SeqCst) || self.push_in_flight.load(Ordering::SeqCst)
    }

    /// Rewrite the local blobs from the current in-memory state. Skipped
    /// during a reset, which clears the blobs first and must not see them
    /// resurrected by a late writer.
    pub fn persist(&self, data: &AppData) {
        if self.is_resetting() {
            return;
        }
        self.store.save(&data.pallet_types, &data.records, &data.trips, &data.users);
    }
}

/// Epoch milliseconds, the record timestamp unit shared with the sheet.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Fresh seeded state over a scratch data directory. The tempdir is returned
/// alongside the state and must stay alive for the duration of the test.
#[cfg(test)]
pub fn test_context(sheet_url: &str) -> (AppState, tempfile::TempDir) {
    use crate::models::{default_pallet_types, default_users};

    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    let data = AppData {
        users: default_users(),
        pallet_types: default_pallet_types(),
        records: Vec::new(),
        trips: Vec::new(),
        active_trip_id: String::new(),
        sheet_url: sheet_url.to_string(),
        last_sync_time: None,
        last_sync_error: None,
    };
    (AppContext::new(data, store, SheetClient::new()), dir)
}
