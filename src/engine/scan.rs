//! Pallet status transitions driven by barcode scans, plus validation of the
//! inspection data captured at the receiving dock.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{InventoryRecord, PalletCondition, PalletStatus, UserCredentials, UserRole};

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub success: bool,
    pub message: String,
}

/// Scan-time session context: which trip the factory is loading and which
/// truck the pallet goes on.
pub struct ScanContext<'a> {
    pub active_trip_id: &'a str,
    pub truck_id: &'a str,
}

/// Inspection payload applied at the transition into `received`. Defaults
/// describe an uninspected, intact pallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionData {
    pub condition: PalletCondition,
    pub external_damage_qty: u32,
    pub internal_damage_qty: u32,
    pub photos: Vec<String>,
    pub notes: String,
    pub damage_details: String,
}

impl Default for InspectionData {
    fn default() -> Self {
        Self {
            condition: PalletCondition::Intact,
            external_damage_qty: 0,
            internal_damage_qty: 0,
            photos: Vec::new(),
            notes: String::new(),
            damage_details: String::new(),
        }
    }
}

/// Apply a scan to the record collection, returning the new collection and
/// the outcome reported to the scanner.
///
/// Factory actors move a pending pallet of the active trip to `in_transit`;
/// a barcode from any other trip fails even if it exists. Center actors move
/// any non-received pallet to `received`, stamping the inspection payload.
/// Receiving deliberately ignores the trip so a center can accept late
/// pallets from completed trips. Every other case fails without mutating
/// anything.
pub fn apply_scan(
    records: &[InventoryRecord],
    actor: &UserCredentials,
    ctx: &ScanContext<'_>,
    barcode: &str,
    inspection: Option<InspectionData>,
    now: i64,
) -> (Vec<InventoryRecord>, ScanOutcome) {
    let barcode = barcode.trim().to_uppercase();
    let mut outcome: Option<ScanOutcome> = None;

    let updated: Vec<InventoryRecord> = records
        .iter()
        .map(|r| match actor.role {
            UserRole::Factory
                if r.pallet_barcode == barcode
                    && r.trip_id == ctx.active_trip_id
                    && r.status == PalletStatus::Pending =>
            {
                outcome = Some(ScanOutcome {
                    success: true,
                    message: format!("Loaded: {barcode}"),
                });
                let mut rec = r.clone();
                rec.status = PalletStatus::InTransit;
                rec.timestamp = now;
                rec.factory_timestamp = Some(now);
                rec.truck_id = ctx.truck_id.to_string();
                rec
            }
            UserRole::Center
                if r.pallet_barcode == barcode && r.status != PalletStatus::Received =>
            {
                let data = inspection.clone().unwrap_or_default();
                outcome = Some(ScanOutcome {
                    success: true,
                    message: format!("Receipt confirmed: {barcode}"),
                });
                let mut rec = r.clone();
                rec.status = PalletStatus::Received;
                rec.timestamp = now;
                rec.center_timestamp = Some(now);
                rec.scanned_by = UserRole::Center;
                rec.condition = Some(data.condition);
                rec.external_damage_qty = Some(data.external_damage_qty);
                rec.internal_damage_qty = Some(data.internal_damage_qty);
                rec.photos = data.photos;
                rec.notes = Some(data.notes);
                rec.damage_details = Some(data.damage_details);
                rec
            }
            _ => r.clone(),
        })
        .collect();

    match outcome {
        Some(outcome) => (updated, outcome),
        None => (
            records.to_vec(),
            ScanOutcome {
                success: false,
                message: "Barcode not found or already used".to_string(),
            },
        ),
    }
}

/// Raw inspection input as captured at the dock, before classification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInput {
    pub is_damaged: bool,
    #[serde(default)]
    pub external_damage: bool,
    #[serde(default)]
    pub internal_damage: bool,
    #[serde(default)]
    pub external_qty: u32,
    #[serde(default)]
    pub internal_qty: u32,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("select the damage type")]
    MissingDamageKind,
    #[error("enter the externally damaged carton count")]
    MissingExternalQty,
    #[error("enter the internally damaged carton count")]
    MissingInternalQty,
}

/// Classify raw capture input into the inspection payload.
///
/// Two independent flags decide the condition: both set means `both`, one
/// set means the corresponding single-damage condition, none set (or the
/// pallet not marked damaged at all) means `intact`. A set flag must carry a
/// positive carton count.
pub fn build_inspection(input: CaptureInput) -> Result<InspectionData, CaptureError> {
    if !input.is_damaged {
        return Ok(InspectionData {
            photos: input.photos,
            notes: input.notes,
            ..InspectionData::default()
        });
    }

    if !input.external_damage && !input.internal_damage {
        return Err(CaptureError::MissingDamageKind);
    }
    if input.external_damage && input.external_qty == 0 {
        return Err(CaptureError::MissingExternalQty);
    }
    if input.internal_damage && input.internal_qty == 0 {
        return Err(CaptureError::MissingInternalQty);
    }

    let (condition, details) = if input.external_damage && input.internal_damage {
        (
            PalletCondition::Both,
            format!(
                "double carton damage: external ({}), internal ({})",
                input.external_qty, input.internal_qty
            ),
        )
    } else if input.external_damage {
        (
            PalletCondition::ExternalBoxDamage,
            format!("external carton damage: ({})", input.external_qty),
        )
    } else {
        (
            PalletCondition::InternalContentDamage,
            format!("internal carton damage: ({})", input.internal_qty),
        )
    };

    Ok(InspectionData {
        condition,
        external_damage_qty: if input.external_damage { input.external_qty } else { 0 },
        internal_damage_qty: if input.internal_damage { input.internal_qty } else { 0 },
        photos: input.photos,
        notes: input.notes,
        damage_details: details,
    })
}
