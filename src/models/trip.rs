use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Active,
    Completed,
}

/// One shipment batch from one press to one center. At most one trip is
/// active at a time from this client's perspective: creating a new trip
/// marks every prior trip completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    /// 4-digit zero-padded sequence over the trips this client has seen.
    pub trip_number: String,
    /// Press code, center code and trip number concatenated.
    pub trip_barcode: String,
    pub press_code: String,
    pub center_code: String,
    /// Creation time, epoch milliseconds.
    pub start_date: i64,
    pub status: TripStatus,
}

/// Id of the trip currently accepting loaded pallets, if any.
pub fn active_trip_id(trips: &[Trip]) -> Option<String> {
    trips
        .iter()
        .find(|t| t.status == TripStatus::Active)
        .map(|t| t.id.clone())
}
