//! Trip creation: one new shipment batch plus its pallet records, with
//! deterministic barcodes.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    InventoryRecord, PalletStatus, PalletType, Trip, TripStatus, UserRole,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSelection {
    pub type_id: String,
    pub count: u32,
}

/// The full collections after a trip creation, plus the trip that was added.
#[derive(Debug)]
pub struct TripOutcome {
    pub trips: Vec<Trip>,
    pub records: Vec<InventoryRecord>,
    pub new_trip: Trip,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TripError {
    #[error("at least one pallet type with a count above zero is required")]
    EmptySelection,
}

/// Create a new trip and its batch of pending records.
///
/// The trip number continues the client-observed trip count, zero-padded to
/// four digits, and every prior trip is marked completed so the new one is
/// the single active trip. Pallet barcodes are stage code + press + a 4-digit
/// sequence continuing from the global record count + semester + year. An
/// unknown type id produces an empty stage-code segment; the sheet has rows
/// like that from before type deletion was guarded, so the behavior is kept
/// rather than rejected here.
pub fn create_trip(
    trips: &[Trip],
    records: &[InventoryRecord],
    types: &[PalletType],
    press: &str,
    center: &str,
    selections: &[TripSelection],
    semester: &str,
    year: &str,
    now: i64,
) -> Result<TripOutcome, TripError> {
    if !selections.iter().any(|s| s.count > 0) {
        return Err(TripError::EmptySelection);
    }

    let trip_id = Uuid::new_v4().to_string();
    let trip_number = format!("{:04}", trips.len() + 1);
    let new_trip = Trip {
        id: trip_id.clone(),
        trip_number: trip_number.clone(),
        trip_barcode: format!("{press}{center}{trip_number}"),
        press_code: press.to_string(),
        center_code: center.to_string(),
        start_date: now,
        status: TripStatus::Active,
    };

    let mut new_records: Vec<InventoryRecord> = Vec::new();
    for sel in selections {
        let stage_code = types
            .iter()
            .find(|t| t.id == sel.type_id)
            .map(|t| t.stage_code.as_str())
            .unwrap_or_default();
        for _ in 0..sel.count {
            let seq = format!("{:04}", records.len() + new_records.len() + 1);
            new_records.push(InventoryRecord {
                id: Uuid::new_v4().to_string(),
                pallet_type_id: sel.type_id.clone(),
                pallet_barcode: format!("{stage_code}{press}{seq}{semester}{year}"),
                trip_id: trip_id.clone(),
                truck_id: "1".to_string(),
                status: PalletStatus::Pending,
                timestamp: now,
                factory_timestamp: None,
                center_timestamp: None,
                scanned_by: UserRole::Factory,
                destination: center.to_string(),
                condition: None,
                external_damage_qty: None,
                internal_damage_qty: None,
                photos: Vec::new(),
                notes: None,
                damage_details: None,
            });
        }
    }

    let mut all_trips: Vec<Trip> = trips
        .iter()
        .cloned()
        .map(|mut t| {
            t.status = TripStatus::Completed;
            t
        })
        .collect();
    all_trips.push(new_trip.clone());

    let mut all_records = new_records;
    all_records.extend(records.iter().cloned());

    Ok(TripOutcome { trips: all_trips, records: all_records, new_trip })
}
