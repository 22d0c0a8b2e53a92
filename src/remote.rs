//! Client for the spreadsheet-backed remote store: one endpoint, two verbs
//! (`getAll` and `syncAll`), whole-collection snapshots in both directions.
//!
//! The sheet types record photos as a plain cell, so they come back either as
//! a native JSON list or as a JSON-encoded string and must be pushed as a
//! string. The wire types here absorb that so the rest of the system only
//! ever sees a list.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    InventoryRecord, PalletCondition, PalletStatus, PalletType, Trip, UserCredentials, UserRole,
};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Photos as the sheet sends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoField {
    List(Vec<String>),
    Raw(String),
}

impl PhotoField {
    /// Canonical list form. A raw string is JSON-decoded; if that fails it is
    /// kept as a single legacy entry when it looks like an embedded image,
    /// otherwise discarded.
    pub fn normalize(self) -> Vec<String> {
        match self {
            PhotoField::List(list) => list,
            PhotoField::Raw(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
                Ok(_) => Vec::new(),
                Err(_) if raw.starts_with("data:image") => vec![raw],
                Err(_) => Vec::new(),
            },
        }
    }
}

/// An inventory record in sheet form. Identical to [`InventoryRecord`] except
/// for the photos field typing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRecord {
    pub id: String,
    pub pallet_type_id: String,
    pub pallet_barcode: String,
    pub trip_id: String,
    pub truck_id: String,
    pub status: PalletStatus,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_timestamp: Option<i64>,
    pub scanned_by: UserRole,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PalletCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_damage_qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_damage_qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<PhotoField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_details: Option<String>,
}

impl From<SheetRecord> for InventoryRecord {
    fn from(rec: SheetRecord) -> Self {
        InventoryRecord {
            id: rec.id,
            pallet_type_id: rec.pallet_type_id,
            pallet_barcode: rec.pallet_barcode,
            trip_id: rec.trip_id,
            truck_id: rec.truck_id,
            status: rec.status,
            timestamp: rec.timestamp,
            factory_timestamp: rec.factory_timestamp,
            center_timestamp: rec.center_timestamp,
            scanned_by: rec.scanned_by,
            destination: rec.destination,
            condition: rec.condition,
            external_damage_qty: rec.external_damage_qty,
            internal_damage_qty: rec.internal_damage_qty,
            photos: rec.photos.map(PhotoField::normalize).unwrap_or_default(),
            notes: rec.notes,
            damage_details: rec.damage_details,
        }
    }
}

impl From<&InventoryRecord> for SheetRecord {
    /// Push-side form: photos become a JSON string, mirroring what the sheet
    /// tolerates on receive.
    fn from(rec: &InventoryRecord) -> Self {
        let photos = serde_json::to_string(&rec.photos).unwrap_or_else(|_| "[]".to_string());
        SheetRecord {
            id: rec.id.clone(),
            pallet_type_id: rec.pallet_type_id.clone(),
            pallet_barcode: rec.pallet_barcode.clone(),
            trip_id: rec.trip_id.clone(),
            truck_id: rec.truck_id.clone(),
            status: rec.status,
            timestamp: rec.timestamp,
            factory_timestamp: rec.factory_timestamp,
            center_timestamp: rec.center_timestamp,
            scanned_by: rec.scanned_by,
            destination: rec.destination.clone(),
            condition: rec.condition,
            external_damage_qty: rec.external_damage_qty,
            internal_damage_qty: rec.internal_damage_qty,
            photos: Some(PhotoField::Raw(photos)),
            notes: rec.notes.clone(),
            damage_details: rec.damage_details.clone(),
        }
    }
}

/// Everything `getAll` returns. Collections the sheet does not return are
/// left alone locally, matching how the original client treated a partial
/// payload.
#[derive(Debug, Default, Deserialize)]
pub struct SheetSnapshot {
    #[serde(default)]
    pub users: Option<Vec<UserCredentials>>,
    #[serde(default)]
    pub types: Option<Vec<PalletType>>,
    #[serde(default)]
    pub trips: Option<Vec<Trip>>,
    #[serde(default)]
    pub records: Option<Vec<SheetRecord>>,
}

#[derive(Serialize)]
struct PushPayload<'a> {
    action: &'static str,
    types: &'a [PalletType],
    records: Vec<SheetRecord>,
    trips: &'a [Trip],
    users: &'a [UserCredentials],
}

#[derive(Clone)]
pub struct SheetClient {
    http: reqwest::Client,
}

impl SheetClient {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    pub async fn fetch_all(&self, endpoint: &str) -> Result<SheetSnapshot, RemoteError> {
        let resp = self
            .http
            .get(endpoint)
            .query(&[("action", "getAll")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    pub async fn push_all(
        &self,
        endpoint: &str,
        types: &[PalletType],
        records: &[InventoryRecord],
        trips: &[Trip],
        users: &[UserCredentials],
    ) -> Result<(), RemoteError> {
        let payload = PushPayload {
            action: "syncAll",
            types,
            records: records.iter().map(SheetRecord::from).collect(),
            trips,
            users,
        };
        // The Apps Script endpoint only accepts simple requests, so the JSON
        // body goes out declared as text/plain.
        let resp = self
            .http
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(serde_json::to_string(&payload)?)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status()));
        }
        Ok(())
    }
}

impl Default for SheetClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_list_passes_through() {
        let photos = PhotoField::List(vec!["data:image/png;base64,AA".to_string()]);
        assert_eq!(photos.normalize(), vec!["data:image/png;base64,AA".to_string()]);
    }

    #[test]
    fn json_encoded_string_is_decoded() {
        let photos = PhotoField::Raw(r#"["data:image/png;base64,AA","data:image/png;base64,BB"]"#.to_string());
        assert_eq!(photos.normalize().len(), 2);
    }

    #[test]
    fn bare_data_uri_becomes_a_single_entry() {
        let photos = PhotoField::Raw("data:image/jpeg;base64,CC".to_string());
        assert_eq!(photos.normalize(), vec!["data:image/jpeg;base64,CC".to_string()]);
    }

    #[test]
    fn garbage_and_non_array_json_are_discarded() {
        assert!(PhotoField::Raw("not json at all".to_string()).normalize().is_empty());
        assert!(PhotoField::Raw(r#"{"a":1}"#.to_string()).normalize().is_empty());
        assert!(PhotoField::Raw("\"just a string\"".to_string()).normalize().is_empty());
    }

    #[test]
    fn sheet_record_decodes_string_photos_and_missing_timestamp() {
        let json = r#"{
            "id": "a",
            "palletTypeId": "p1",
            "palletBarcode": "G01OPK000116",
            "tripId": "t1",
            "truckId": "1",
            "status": "received",
            "scannedBy": "center",
            "destination": "DMM",
            "photos": "[\"data:image/png;base64,AA\"]"
        }"#;
        let rec: SheetRecord = serde_json::from_str(json).unwrap();
        let rec = InventoryRecord::from(rec);
        assert_eq!(rec.timestamp, 0);
        assert_eq!(rec.photos, vec!["data:image/png;base64,AA".to_string()]);
        assert_eq!(rec.status, PalletStatus::Received);
    }

    #[test]
    fn push_side_record_serializes_photos_as_a_json_string() {
        let rec = InventoryRecord {
            id: "a".to_string(),
            pallet_type_id: "p1".to_string(),
            pallet_barcode: "G01OPK000116".to_string(),
            trip_id: "t1".to_string(),
            truck_id: "1".to_string(),
            status: PalletStatus::Received,
            timestamp: 5,
            factory_timestamp: None,
            center_timestamp: Some(5),
            scanned_by: UserRole::Center,
            destination: "DMM".to_string(),
            condition: Some(PalletCondition::Intact),
            external_damage_qty: Some(0),
            internal_damage_qty: Some(0),
            photos: vec!["data:image/png;base64,AA".to_string()],
            notes: Some(String::new()),
            damage_details: Some(String::new()),
        };
        let wire = serde_json::to_value(SheetRecord::from(&rec)).unwrap();
        assert_eq!(
            wire["photos"],
            serde_json::json!("[\"data:image/png;base64,AA\"]")
        );
        assert_eq!(wire["status"], serde_json::json!("received"));
        assert_eq!(wire["palletBarcode"], serde_json::json!("G01OPK000116"));
    }
}
