//! Reconciliation of the local record snapshot against a freshly fetched
//! remote one. Pure and deterministic: same inputs in the same order always
//! produce the same output, and no record is ever deleted by a merge.

use crate::models::{InventoryRecord, PalletStatus};

/// Merge remote records into the local snapshot.
///
/// Remote records with no local counterpart are appended; another actor
/// created or progressed them. For matched records (by id, falling back to
/// the pallet barcode for records created offline under a different id):
///
/// - If the local record is already received and carries damage evidence the
///   remote copy lacks, the remote copy wins for every field except the
///   damage ones. Photos captured at the receiving dock may not have reached
///   the sheet yet and must never be dropped by a stale remote snapshot.
/// - Otherwise last-write-wins: the remote copy replaces the local record
///   when its timestamp is equal or newer, and is ignored when strictly
///   older.
pub fn merge(local: &[InventoryRecord], remote: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    let mut merged = local.to_vec();
    for rem in remote {
        let found = merged
            .iter()
            .position(|l| l.id == rem.id || l.pallet_barcode == rem.pallet_barcode);
        let idx = match found {
            Some(idx) => idx,
            None => {
                merged.push(rem);
                continue;
            }
        };

        let loc = &merged[idx];
        let keep_local_damage =
            loc.has_damage_data() && !rem.has_damage_data() && loc.status == PalletStatus::Received;

        if keep_local_damage {
            let loc = loc.clone();
            let mut rec = rem;
            rec.photos = loc.photos;
            rec.condition = loc.condition;
            rec.external_damage_qty = loc.external_damage_qty;
            rec.internal_damage_qty = loc.internal_damage_qty;
            rec.notes = loc.notes;
            rec.damage_details = loc.damage_details;
            merged[idx] = rec;
        } else if rem.timestamp >= loc.timestamp {
            merged[idx] = rem;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PalletCondition, UserRole};

    fn record(id: &str, barcode: &str, timestamp: i64) -> InventoryRecord {
        InventoryRecord {
            id: id.to_string(),
            pallet_type_id: "p1".to_string(),
            pallet_barcode: barcode.to_string(),
            trip_id: "t1".to_string(),
            truck_id: "1".to_string(),
            status: PalletStatus::Pending,
            timestamp,
            factory_timestamp: None,
            center_timestamp: None,
            scanned_by: UserRole::Factory,
            destination: "DMM".to_string(),
            condition: None,
            external_damage_qty: None,
            internal_damage_qty: None,
            photos: Vec::new(),
            notes: None,
            damage_details: None,
        }
    }

    #[test]
    fn merging_identical_snapshots_changes_nothing() {
        let snapshot = vec![record("a", "G01OPK000116", 100), record("b", "G01OPK000216", 200)];
        assert_eq!(merge(&snapshot, snapshot.clone()), snapshot);
    }

    #[test]
    fn unknown_remote_records_are_appended() {
        let local = vec![record("a", "G01OPK000116", 100)];
        let other = record("b", "G01OPK000216", 50);
        let merged = merge(&local, vec![other.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], other);
    }

    #[test]
    fn newer_remote_replaces_local_wholesale() {
        let local = vec![record("a", "G01OPK000116", 100)];
        let mut rem = record("a", "G01OPK000116", 150);
        rem.status = PalletStatus::InTransit;
        rem.truck_id = "7".to_string();
        let merged = merge(&local, vec![rem.clone()]);
        assert_eq!(merged, vec![rem]);
    }

    #[test]
    fn strictly_older_remote_is_ignored() {
        let mut local_rec = record("a", "G01OPK000116", 200);
        local_rec.status = PalletStatus::InTransit;
        let mut rem = record("a", "G01OPK000116", 199);
        rem.status = PalletStatus::Pending;
        let merged = merge(&[local_rec.clone()], vec![rem]);
        assert_eq!(merged, vec![local_rec]);
    }

    #[test]
    fn equal_timestamps_favor_remote() {
        let local = vec![record("a", "G01OPK000116", 100)];
        let mut rem = record("a", "G01OPK000116", 100);
        rem.truck_id = "9".to_string();
        let merged = merge(&local, vec![rem.clone()]);
        assert_eq!(merged, vec![rem]);
    }

    #[test]
    fn barcode_matches_records_created_under_different_ids() {
        let local = vec![record("local-uuid", "G01OPK000116", 100)];
        let rem = record("remote-uuid", "G01OPK000116", 500);
        let merged = merge(&local, vec![rem.clone()]);
        assert_eq!(merged, vec![rem]);
    }

    #[test]
    fn local_damage_evidence_survives_a_remote_snapshot_without_it() {
        let mut local_rec = record("a", "G01OPK000116", 300);
        local_rec.status = PalletStatus::Received;
        local_rec.photos = vec!["data:image/jpeg;base64,AAA".to_string()];
        local_rec.condition = Some(PalletCondition::ExternalBoxDamage);
        local_rec.external_damage_qty = Some(3);
        local_rec.internal_damage_qty = Some(0);
        local_rec.notes = Some("torn shrink wrap".to_string());
        local_rec.damage_details = Some("external carton damage: (3)".to_string());

        // Remote caught the receive but not the inspection payload, and also
        // corrected the truck id.
        let mut rem = record("a", "G01OPK000116", 400);
        rem.status = PalletStatus::Received;
        rem.condition = Some(PalletCondition::Intact);
        rem.truck_id = "5".to_string();

        let merged = merge(&[local_rec.clone()], vec![rem]);
        assert_eq!(merged.len(), 1);
        let rec = &merged[0];
        assert_eq!(rec.truck_id, "5");
        assert_eq!(rec.timestamp, 400);
        assert_eq!(rec.photos, local_rec.photos);
        assert_eq!(rec.condition, Some(PalletCondition::ExternalBoxDamage));
        assert_eq!(rec.external_damage_qty, Some(3));
        assert_eq!(rec.notes, local_rec.notes);
        assert_eq!(rec.damage_details, local_rec.damage_details);
    }

    #[test]
    fn damage_preservation_requires_received_status() {
        // Evidence on a record still in transit does not block a newer
        // remote copy.
        let mut local_rec = record("a", "G01OPK000116", 100);
        local_rec.status = PalletStatus::InTransit;
        local_rec.photos = vec!["data:image/jpeg;base64,AAA".to_string()];
        let rem = record("a", "G01OPK000116", 200);
        let merged = merge(&[local_rec], vec![rem.clone()]);
        assert_eq!(merged, vec![rem]);
    }

    #[test]
    fn remote_damage_data_wins_over_local_damage_data_by_timestamp() {
        let mut local_rec = record("a", "G01OPK000116", 100);
        local_rec.status = PalletStatus::Received;
        local_rec.condition = Some(PalletCondition::InternalContentDamage);
        let mut rem = record("a", "G01OPK000116", 200);
        rem.status = PalletStatus::Received;
        rem.condition = Some(PalletCondition::Both);
        rem.photos = vec!["data:image/png;base64,BBB".to_string()];
        let merged = merge(&[local_rec], vec![rem.clone()]);
        assert_eq!(merged, vec![rem]);
    }

    #[test]
    fn merge_never_deletes_local_records() {
        let local = vec![record("a", "G01OPK000116", 100), record("b", "G01OPK000216", 100)];
        let merged = merge(&local, Vec::new());
        assert_eq!(merged, local);
    }
}
