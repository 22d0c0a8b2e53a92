use serde::{Deserialize, Serialize};

use super::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletStatus {
    Pending,
    InTransit,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletCondition {
    Intact,
    Damaged,
    ExternalBoxDamage,
    InternalContentDamage,
    Both,
}

/// A book-stage definition, managed only through admin settings. Inventory
/// records reference it by id; deleting a type leaves dangling references
/// that display as an unknown type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletType {
    pub id: String,
    pub stage_code: String,
    pub stage_name: String,
    pub cartons_per_pallet: u32,
}

/// One physical pallet. `pallet_barcode` is the natural business key;
/// `timestamp` is the last-mutation time in epoch milliseconds and drives
/// last-write-wins during merge. Condition, damage quantities, photos and
/// notes are populated exactly once, at the transition into `received`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
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
    /// Center code the pallet is addressed to.
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PalletCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_damage_qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_damage_qty: Option<u32>,
    /// Encoded image payloads (data URIs), in capture order.
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_details: Option<String>,
}

impl InventoryRecord {
    /// A record carries damage evidence when it has at least one photo or a
    /// condition other than intact.
    pub fn has_damage_data(&self) -> bool {
        !self.photos.is_empty() || self.condition.is_some_and(|c| c != PalletCondition::Intact)
    }
}

/// Book-stage catalogue seeded on first run: primary grades on 24-carton
/// pallets, intermediate on 20, secondary on 18.
pub fn default_pallet_types() -> Vec<PalletType> {
    let ptype = |id: &str, code: &str, name: &str, cartons: u32| PalletType {
        id: id.to_string(),
        stage_code: code.to_string(),
        stage_name: name.to_string(),
        cartons_per_pallet: cartons,
    };
    vec![
        ptype("p1", "G01", "Grade 1 Primary", 24),
        ptype("p2", "G02", "Grade 2 Primary", 24),
        ptype("p3", "G03", "Grade 3 Primary", 24),
        ptype("p4", "G04", "Grade 4 Primary", 24),
        ptype("p5", "G05", "Grade 5 Primary", 24),
        ptype("p6", "G06", "Grade 6 Primary", 24),
        ptype("m1", "G07", "Grade 1 Intermediate", 20),
        ptype("m2", "G08", "Grade 2 Intermediate", 20),
        ptype("m3", "G09", "Grade 3 Intermediate", 20),
        ptype("s1", "G11", "Grade 1 Secondary", 18),
        ptype("s2", "G12", "Grade 2 Secondary", 18),
        ptype("s3", "G13", "Grade 3 Secondary", 18),
    ]
}
