//! Local persistence: four independently-keyed JSON blobs under the data
//! directory, read once at startup and rewritten after every successful
//! mutation. A broken or missing blob falls back to defaults; local disk is
//! a cache of the sheet, not the source of truth.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    default_pallet_types, default_users, InventoryRecord, PalletType, Trip, UserCredentials,
};

const TYPES_FILE: &str = "types.json";
const RECORDS_FILE: &str = "records.json";
const TRIPS_FILE: &str = "trips.json";
const USERS_FILE: &str = "users.json";

#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

/// The four collections as loaded at startup.
pub struct LoadedState {
    pub pallet_types: Vec<PalletType>,
    pub records: Vec<InventoryRecord>,
    pub trips: Vec<Trip>,
    pub users: Vec<UserCredentials>,
}

impl LocalStore {
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir: dir.as_ref().to_path_buf() })
    }

    pub fn load(&self) -> LoadedState {
        LoadedState {
            pallet_types: self.read_or(TYPES_FILE, default_pallet_types),
            records: self.read_or(RECORDS_FILE, Vec::new),
            trips: self.read_or(TRIPS_FILE, Vec::new),
            users: self.read_or(USERS_FILE, default_users),
        }
    }

    /// Rewrite all four blobs. Failures are logged and swallowed: a full
    /// in-memory state with a stale cache beats a crashed service.
    pub fn save(
        &self,
        types: &[PalletType],
        records: &[InventoryRecord],
        trips: &[Trip],
        users: &[UserCredentials],
    ) {
        self.write(TYPES_FILE, &types);
        self.write(RECORDS_FILE, &records);
        self.write(TRIPS_FILE, &trips);
        self.write(USERS_FILE, &users);
    }

    /// Drop the records and trips blobs, the first step of a system reset.
    /// Types and users survive a reset.
    pub fn clear_shipment_data(&self) {
        for name in [RECORDS_FILE, TRIPS_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    error!("failed to remove {}: {e}", path.display());
                }
            }
        }
    }

    fn read_or<T: DeserializeOwned>(&self, name: &str, fallback: impl FnOnce() -> T) -> T {
        let path = self.dir.join(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return fallback(),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("ignoring unreadable blob {}: {e}", path.display());
                fallback()
            }
        }
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) {
        let path = self.dir.join(name);
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(e) = fs::write(&path, raw) {
                    error!("failed to write {}: {e}", path.display());
                }
            }
            Err(e) => error!("failed to encode {name}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripStatus;

    #[test]
    fn missing_blobs_fall_back_to_seed_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let state = store.load();
        assert_eq!(state.pallet_types.len(), 12);
        assert_eq!(state.users.len(), 7);
        assert!(state.records.is_empty());
        assert!(state.trips.is_empty());
    }

    #[test]
    fn saved_state_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        let trip = Trip {
            id: "t1".to_string(),
            trip_number: "0001".to_string(),
            trip_barcode: "OPKDMM0001".to_string(),
            press_code: "OPK".to_string(),
            center_code: "DMM".to_string(),
            start_date: 1,
            status: TripStatus::Active,
        };
        store.save(&default_pallet_types(), &[], &[trip.clone()], &default_users());

        let state = store.load();
        assert_eq!(state.trips, vec![trip]);
    }

    #[test]
    fn corrupt_blob_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("users.json"), "{{{ not json").unwrap();
        assert_eq!(store.load().users.len(), 7);
    }

    #[test]
    fn clearing_shipment_data_keeps_types_and_users() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();
        store.save(&default_pallet_types(), &[], &[], &default_users());
        store.clear_shipment_data();
        assert!(!dir.path().join("records.json").exists());
        assert!(dir.path().join("types.json").exists());
    }
}
